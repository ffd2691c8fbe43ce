//! Collision detection against the track boundary
//!
//! Both boundary curves are classified with a single rule: project the probe
//! onto the normal at the nearest curve point.
//! - left curve: a positive projection is outside (into the infield)
//! - right curve: a negative projection is outside (past the outer wall)
//!
//! The tank is an oriented rectangle tested by its four corners against the
//! nearest points of its *centre*. Projectiles are circles tested at their
//! current position and, when they moved farther than their radius, at
//! intermediate points along the step.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::nearest::ClosestPointInfo;
use super::track::{CurveSide, Track};
use crate::consts::{MAX_TUNNEL_SAMPLES, MIN_TUNNEL_SAMPLES};
use crate::rect_corners;

/// Result of a collision check
#[derive(Debug, Clone)]
pub struct CollisionResult {
    /// Whether a collision occurred
    pub hit: bool,
    /// Boundary that was crossed
    pub side: Option<CurveSide>,
    /// Closest boundary point used for the test
    pub point: Vec2,
    /// Boundary normal at `point` (left-hand rotation of the tangent)
    pub normal: Vec2,
    /// How far the probe is past the boundary
    pub penetration: f32,
}

impl CollisionResult {
    pub fn miss() -> Self {
        Self {
            hit: false,
            side: None,
            point: Vec2::ZERO,
            normal: Vec2::ZERO,
            penetration: 0.0,
        }
    }

    fn boundary(side: CurveSide, info: &ClosestPointInfo, penetration: f32) -> Self {
        Self {
            hit: true,
            side: Some(side),
            point: info.point,
            normal: info.normal,
            penetration,
        }
    }
}

/// Check an oriented rectangle against both boundaries.
///
/// Only the centre is queried for the nearest curve points; the corners are
/// then projected onto those normals. A corner can slip past a tight bend
/// unnoticed when the centre's nearest point is far along the curve.
pub fn rect_boundary_collision(
    track: Option<&Track>,
    center: Vec2,
    half_extents: Vec2,
    angle: f32,
) -> CollisionResult {
    let Some(track) = track else {
        return CollisionResult::miss();
    };

    let corners = rect_corners(center, half_extents, angle);

    let left = track.find_closest_point_on_curve(center, CurveSide::Left);
    if left.valid {
        let max_proj = corners
            .iter()
            .map(|&c| left.signed_offset(c))
            .fold(f32::MIN, f32::max);
        if max_proj > 0.0 {
            return CollisionResult::boundary(CurveSide::Left, &left, max_proj);
        }
    }

    let right = track.find_closest_point_on_curve(center, CurveSide::Right);
    if right.valid {
        let min_proj = corners
            .iter()
            .map(|&c| right.signed_offset(c))
            .fold(f32::MAX, f32::min);
        if min_proj < 0.0 {
            return CollisionResult::boundary(CurveSide::Right, &right, -min_proj);
        }
    }

    CollisionResult::miss()
}

/// Check a circle at `pos` against the collision margin of each boundary.
///
/// Left hit when `0 < projection < radius`, right hit when `projection < 0`
/// and `|projection| < radius`. Left is checked first.
pub fn point_boundary_contact(track: Option<&Track>, pos: Vec2, radius: f32) -> CollisionResult {
    let Some(track) = track else {
        return CollisionResult::miss();
    };

    let left = track.find_closest_point_on_curve(pos, CurveSide::Left);
    if left.valid {
        let proj = left.signed_offset(pos);
        if proj > 0.0 && proj < radius {
            return CollisionResult::boundary(CurveSide::Left, &left, radius - proj);
        }
    }

    let right = track.find_closest_point_on_curve(pos, CurveSide::Right);
    if right.valid {
        let proj = right.signed_offset(pos);
        if proj < 0.0 && proj.abs() < radius {
            return CollisionResult::boundary(CurveSide::Right, &right, radius - proj.abs());
        }
    }

    CollisionResult::miss()
}

/// How many intermediate points the tunneling guard samples
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TunnelSampling {
    /// Always `MIN_TUNNEL_SAMPLES`
    Fixed,
    /// `max(MIN_TUNNEL_SAMPLES, ceil(travel / (radius / 2)))`, capped
    #[default]
    Adaptive,
}

impl TunnelSampling {
    pub fn sample_count(self, travel: f32, radius: f32) -> usize {
        match self {
            TunnelSampling::Fixed => MIN_TUNNEL_SAMPLES,
            TunnelSampling::Adaptive => {
                if radius <= 0.0 || !travel.is_finite() {
                    return MIN_TUNNEL_SAMPLES;
                }
                let needed = (travel / (radius * 0.5)).ceil() as usize;
                needed.clamp(MIN_TUNNEL_SAMPLES, MAX_TUNNEL_SAMPLES)
            }
        }
    }
}

/// Boundary check for a circle that moved from `prev` to `pos` this step.
///
/// The current position is tested first. If the step was longer than the
/// radius, points strictly between `prev` and `pos` are tested in order,
/// earliest first. The first hit wins.
pub fn swept_point_boundary_collision(
    track: Option<&Track>,
    prev: Vec2,
    pos: Vec2,
    radius: f32,
    sampling: TunnelSampling,
) -> CollisionResult {
    if track.is_none() {
        return CollisionResult::miss();
    }

    let result = point_boundary_contact(track, pos, radius);
    if result.hit {
        return result;
    }

    let step = pos - prev;
    let travel = step.length();
    if travel <= radius {
        return result;
    }

    let samples = sampling.sample_count(travel, radius);
    for i in 1..samples {
        let sample = prev + step * (i as f32 / samples as f32);
        let result = point_boundary_contact(track, sample, radius);
        if result.hit {
            log::trace!("tunneling guard hit at sample {}/{}", i, samples);
            return result;
        }
    }

    CollisionResult::miss()
}

/// Circle-circle overlap test
#[inline]
pub fn circles_overlap(a: Vec2, ra: f32, b: Vec2, rb: f32) -> bool {
    let r = ra + rb;
    a.distance_squared(b) < r * r
}

/// Whether a ray from `origin` along unit `dir` passes within `radius` of `center`.
///
/// Circles whose centre projects behind the origin or past `length` are missed.
pub fn ray_hits_circle(origin: Vec2, dir: Vec2, length: f32, center: Vec2, radius: f32) -> bool {
    let along = (center - origin).dot(dir);
    if !(0.0..=length).contains(&along) {
        return false;
    }
    let closest = origin + dir * along;
    closest.distance_squared(center) <= radius * radius
}

/// Whether any corner of the oriented rectangle lies inside the circle
pub fn any_corner_in_circle(
    center: Vec2,
    half_extents: Vec2,
    angle: f32,
    circle: Vec2,
    radius: f32,
) -> bool {
    let r_sq = radius * radius;
    rect_corners(center, half_extents, angle)
        .iter()
        .any(|c| c.distance_squared(circle) <= r_sq)
}
