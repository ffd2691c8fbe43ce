//! Cubic uniform B-spline evaluation
//!
//! A curve is a list of control points split into segments of four
//! consecutive points. A global parameter t in [0, 1] spans the whole curve:
//! - looped curves have N segments and wrap indices modulo N
//! - open curves have N - 3 segments and never wrap

use glam::Vec2;

use crate::consts::SPLINE_DEGREE;

/// Basis weights (b0, b1, b2, b3) at local parameter `t`
#[inline]
pub fn basis(t: f32) -> [f32; 4] {
    let t2 = t * t;
    let t3 = t2 * t;
    let u = 1.0 - t;
    [
        u * u * u / 6.0,
        (3.0 * t3 - 6.0 * t2 + 4.0) / 6.0,
        (-3.0 * t3 + 3.0 * t2 + 3.0 * t + 1.0) / 6.0,
        t3 / 6.0,
    ]
}

/// First derivatives of the basis weights at local parameter `t`
#[inline]
pub fn basis_derivative(t: f32) -> [f32; 4] {
    let t2 = t * t;
    let u = 1.0 - t;
    [
        -0.5 * u * u,
        (3.0 * t2 - 4.0 * t) / 2.0,
        (-3.0 * t2 + 2.0 * t + 1.0) / 2.0,
        0.5 * t2,
    ]
}

/// Point on one segment. `t` is not clamped.
#[inline]
pub fn segment_point(t: f32, p: [Vec2; 4]) -> Vec2 {
    let [b0, b1, b2, b3] = basis(t);
    p[0] * b0 + p[1] * b1 + p[2] * b2 + p[3] * b3
}

/// Tangent (dP/dt, not normalized) on one segment
#[inline]
pub fn segment_tangent(t: f32, p: [Vec2; 4]) -> Vec2 {
    let [d0, d1, d2, d3] = basis_derivative(t);
    p[0] * d0 + p[1] * d1 + p[2] * d2 + p[3] * d3
}

/// Number of segments for `count` control points, or 0 if no segment can be formed
#[inline]
pub fn segment_count(count: usize, looped: bool) -> usize {
    if looped {
        count
    } else {
        count.saturating_sub(SPLINE_DEGREE)
    }
}

/// Where a global parameter lands on the curve
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SegmentLocation {
    /// Segment index in [0, num_segments)
    pub index: usize,
    /// Parameter within the segment
    pub t_local: f32,
}

/// Map a global parameter onto a segment.
///
/// The segment index is clamped, so t = 1 lands at the end of the last
/// segment with t_local = 1. Returns `None` when there are no segments.
pub fn locate(t_global: f32, num_segments: usize) -> Option<SegmentLocation> {
    if num_segments == 0 {
        return None;
    }
    let t_scaled = t_global * num_segments as f32;
    let index = (t_scaled.floor().max(0.0) as usize).min(num_segments - 1);
    Some(SegmentLocation {
        index,
        t_local: t_scaled - index as f32,
    })
}

/// The four control points driving `segment`.
///
/// Open curves index directly; the caller guarantees `segment + 3 < len`.
#[inline]
pub fn control_quad(points: &[Vec2], segment: usize, looped: bool) -> [Vec2; 4] {
    let n = points.len();
    if looped {
        std::array::from_fn(|k| points[(segment + k) % n])
    } else {
        std::array::from_fn(|k| points[segment + k])
    }
}

/// Position at a global parameter, or `None` when the list forms no segment
pub fn point_at(points: &[Vec2], looped: bool, t_global: f32) -> Option<Vec2> {
    let loc = locate(t_global, segment_count(points.len(), looped))?;
    Some(segment_point(loc.t_local, control_quad(points, loc.index, looped)))
}

/// Tangent at a global parameter, or `None` when the list forms no segment
pub fn tangent_at(points: &[Vec2], looped: bool, t_global: f32) -> Option<Vec2> {
    let loc = locate(t_global, segment_count(points.len(), looped))?;
    Some(segment_tangent(loc.t_local, control_quad(points, loc.index, looped)))
}
