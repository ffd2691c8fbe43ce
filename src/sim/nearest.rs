//! Nearest point on a boundary curve
//!
//! A B-spline has no closed-form inverse, so the closest point is found by
//! evaluating the curve at `NUM_SAMPLES` evenly spaced parameters and keeping
//! the best sample. The normal at the winning parameter is the normalized
//! tangent rotated a quarter turn counter-clockwise, `(-t.y, t.x)`.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::spline;
use crate::consts::{DEGENERATE_TANGENT_SQ, MIN_POINTS_PER_CURVE, NUM_SAMPLES};

/// Result of a nearest-point query
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ClosestPointInfo {
    /// Closest point found
    pub point: Vec2,
    /// Global curve parameter, `None` when the curve is not a spline (raw point fallback)
    pub parameter: Option<f32>,
    /// Distance from the query point; `f32::MAX` when invalid
    pub distance: f32,
    /// Left-hand unit normal; zero when the tangent is degenerate
    pub normal: Vec2,
    /// Segment containing `parameter`
    pub segment_index: Option<usize>,
    pub valid: bool,
}

impl ClosestPointInfo {
    pub fn invalid() -> Self {
        Self {
            point: Vec2::ZERO,
            parameter: None,
            distance: f32::MAX,
            normal: Vec2::ZERO,
            segment_index: None,
            valid: false,
        }
    }

    /// Signed distance of `p` along the normal, measured from the closest point.
    ///
    /// Positive is outside on the left curve; negative is outside on the right curve.
    #[inline]
    pub fn signed_offset(&self, p: Vec2) -> f32 {
        (p - self.point).dot(self.normal)
    }

    /// Whether the normal can be trusted for inside/outside tests
    #[inline]
    pub fn has_direction(&self) -> bool {
        self.normal != Vec2::ZERO
    }
}

/// Parameter of the `i`-th nearest-point sample
#[inline]
pub fn sample_parameter(i: usize) -> f32 {
    i as f32 / (NUM_SAMPLES - 1) as f32
}

/// Left-hand normal of a tangent, zero if the tangent is degenerate
#[inline]
pub fn left_normal(tangent: Vec2) -> Vec2 {
    if tangent.length_squared() < DEGENERATE_TANGENT_SQ {
        return Vec2::ZERO;
    }
    let t = tangent.normalize();
    Vec2::new(-t.y, t.x)
}

/// Approximate the point on the curve through `points` closest to `query`
pub fn closest_point(points: &[Vec2], looped: bool, query: Vec2) -> ClosestPointInfo {
    if points.is_empty() {
        return ClosestPointInfo::invalid();
    }

    if points.len() < MIN_POINTS_PER_CURVE {
        return closest_raw_point(points, query);
    }

    let num_segments = spline::segment_count(points.len(), looped);
    if num_segments == 0 {
        let first = points[0];
        return ClosestPointInfo {
            point: first,
            parameter: Some(0.0),
            distance: first.distance(query),
            normal: Vec2::ZERO,
            segment_index: Some(0),
            valid: true,
        };
    }

    let mut best_t = 0.0;
    let mut best_point = points[0];
    let mut best_dist_sq = f32::MAX;
    for i in 0..NUM_SAMPLES {
        let t = sample_parameter(i);
        let Some(p) = spline::point_at(points, looped, t) else {
            continue;
        };
        let d = p.distance_squared(query);
        if d < best_dist_sq {
            best_dist_sq = d;
            best_point = p;
            best_t = t;
        }
    }

    let segment_index = spline::locate(best_t, num_segments).map(|loc| loc.index);
    let normal = spline::tangent_at(points, looped, best_t)
        .map(left_normal)
        .unwrap_or(Vec2::ZERO);

    ClosestPointInfo {
        point: best_point,
        parameter: Some(best_t),
        distance: best_dist_sq.sqrt(),
        normal,
        segment_index,
        valid: true,
    }
}

/// Nearest control point by linear scan; used when the curve is not yet a spline
fn closest_raw_point(points: &[Vec2], query: Vec2) -> ClosestPointInfo {
    let nearest = points
        .iter()
        .copied()
        .min_by(|a, b| a.distance_squared(query).total_cmp(&b.distance_squared(query)));

    match nearest {
        Some(point) => ClosestPointInfo {
            point,
            parameter: None,
            distance: point.distance(query),
            normal: Vec2::ZERO,
            segment_index: None,
            valid: true,
        },
        None => ClosestPointInfo::invalid(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::track::{CurveSide, Track};
    use proptest::prelude::*;

    #[test]
    fn test_query_on_sample_returns_zero_distance() {
        let track = Track::rectangle_course();
        let points = track.control_points(CurveSide::Right);
        for i in [0, 17, 99, 150, NUM_SAMPLES - 1] {
            let on_curve = spline::point_at(points, true, sample_parameter(i)).unwrap();
            let info = track.find_closest_point_on_curve(on_curve, CurveSide::Right);
            assert!(info.valid);
            assert!(info.distance < 1e-3, "sample {} distance {}", i, info.distance);
            assert!((info.point - on_curve).length() < 1e-3);
        }
    }

    #[test]
    fn test_point_between_curves_is_inside() {
        let track = Track::rectangle_course();
        // Between the top of the outer curve (y ~ 213) and the inner curve (y ~ 305)
        let p = Vec2::new(640.0, 260.0);

        let left = track.find_closest_point_on_curve(p, CurveSide::Left);
        let right = track.find_closest_point_on_curve(p, CurveSide::Right);
        assert!(left.signed_offset(p) <= 0.0);
        assert!(right.signed_offset(p) >= 0.0);
    }

    #[test]
    fn test_point_outside_left_has_positive_projection() {
        let track = Track::rectangle_course();
        let left = track.find_closest_point_on_curve(Vec2::new(640.0, 260.0), CurveSide::Left);
        // 50 px past the left curve, along its outward normal
        let outside = left.point + left.normal * 50.0;
        let info = track.find_closest_point_on_curve(outside, CurveSide::Left);
        assert!(info.signed_offset(outside) > 0.0);
        assert!((info.signed_offset(outside) - 50.0).abs() < 2.0);
    }

    #[test]
    fn test_point_outside_right_has_negative_projection() {
        let track = Track::rectangle_course();
        let p = Vec2::new(640.0, 150.0);
        let info = track.find_closest_point_on_curve(p, CurveSide::Right);
        assert!(info.signed_offset(p) < 0.0);
    }

    #[test]
    fn test_raw_point_fallback() {
        let pts = [Vec2::new(0.0, 0.0), Vec2::new(100.0, 0.0), Vec2::new(50.0, 80.0)];
        let info = closest_point(&pts, true, Vec2::new(90.0, 5.0));
        assert!(info.valid);
        assert_eq!(info.point, Vec2::new(100.0, 0.0));
        assert_eq!(info.parameter, None);
        assert_eq!(info.segment_index, None);
        assert_eq!(info.normal, Vec2::ZERO);
    }

    #[test]
    fn test_empty_curve_is_invalid() {
        let info = closest_point(&[], true, Vec2::ZERO);
        assert!(!info.valid);
        assert_eq!(info.distance, f32::MAX);
    }

    #[test]
    fn test_coincident_points_give_zero_normal() {
        let pts = [Vec2::splat(5.0); 4];
        let info = closest_point(&pts, true, Vec2::new(10.0, 10.0));
        assert!(info.valid);
        assert!(!info.has_direction());
        assert!((info.point - Vec2::splat(5.0)).length() < 1e-4);
    }

    #[test]
    fn test_segment_index_matches_parameter() {
        let track = Track::rectangle_course();
        let info = track.find_closest_point_on_curve(Vec2::new(1100.0, 360.0), CurveSide::Right);
        let t = info.parameter.unwrap();
        assert_eq!(info.segment_index, Some(((t * 4.0) as usize).min(3)));
        // Right side of the rectangle is driven by segment 0 or 1
        assert!(info.point.x > 1000.0);
    }

    proptest! {
        #[test]
        fn prop_closest_is_no_farther_than_any_sample(x in 0.0f32..1280.0, y in 0.0f32..720.0) {
            let track = Track::rectangle_course();
            let q = Vec2::new(x, y);
            let info = track.find_closest_point_on_curve(q, CurveSide::Left);
            let points = track.control_points(CurveSide::Left);
            for i in (0..NUM_SAMPLES).step_by(7) {
                let p = spline::point_at(points, true, sample_parameter(i)).unwrap();
                prop_assert!(info.distance <= p.distance(q) + 1e-3);
            }
        }
    }
}
