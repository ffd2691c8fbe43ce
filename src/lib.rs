//! Spline Tank - A tank arena on a B-spline race track
//!
//! Core modules:
//! - `sim`: Deterministic simulation (curve geometry, collisions, entities, game state)
//! - `settings`: Data-driven tuning loaded from JSON

pub mod settings;
pub mod sim;

pub use settings::{Difficulty, Settings};

use glam::Vec2;

/// Game configuration constants
pub mod consts {
    /// B-spline degree (cubic, fixed)
    pub const SPLINE_DEGREE: usize = 3;
    /// A curve needs this many control points before it is evaluated as a spline
    pub const MIN_POINTS_PER_CURVE: usize = 4;
    /// Upper bound on control points per curve
    pub const MAX_POINTS: usize = 20;
    /// Squared pick radius for selecting a control point (10 px)
    pub const SELECT_RADIUS_SQ: f32 = 100.0;

    /// Uniform samples per nearest-point query
    pub const NUM_SAMPLES: usize = 200;
    /// Tangents shorter than this (squared) give a zero normal
    pub const DEGENERATE_TANGENT_SQ: f32 = 1e-6;
    /// Line subdivisions per segment handed to the renderer
    pub const RENDER_STEPS_PER_SEGMENT: usize = 20;

    /// Tank rebound after a boundary hit
    pub const COLLISION_REBOUND_FRAMES: u32 = 90;
    pub const REBOUND_SPEED_FACTOR: f32 = 0.3;
    /// Post-hit invulnerability window
    pub const INVULNERABILITY_FRAMES: u32 = 60;

    /// Minimum sub-samples for the projectile tunneling guard
    pub const MIN_TUNNEL_SAMPLES: usize = 5;
    pub const MAX_TUNNEL_SAMPLES: usize = 64;

    /// Targets per level
    pub const NUM_TARGETS: usize = 5;
    /// Laser beam reach and on-screen lifetime
    pub const LASER_RANGE: f32 = 2000.0;
    pub const LASER_MAX_DURATION: u32 = 45;
}

/// Wrap an angle into [0, 2π)
#[inline]
pub fn wrap_angle(angle: f32) -> f32 {
    angle.rem_euclid(std::f32::consts::TAU)
}

/// Shortest signed rotation from `from` to `to`, in [-π, π)
#[inline]
pub fn shortest_angle_delta(from: f32, to: f32) -> f32 {
    use std::f32::consts::{PI, TAU};
    (to - from + PI).rem_euclid(TAU) - PI
}

/// Unit vector pointing along `angle`
#[inline]
pub fn direction_from_angle(angle: f32) -> Vec2 {
    Vec2::new(angle.cos(), angle.sin())
}

/// Corners of a rectangle centred on `center`, rotated by `angle`.
///
/// Order: (-w,-h), (w,-h), (w,h), (-w,h) in local space.
pub fn rect_corners(center: Vec2, half_extents: Vec2, angle: f32) -> [Vec2; 4] {
    let rot = Vec2::from_angle(angle);
    let (hw, hh) = (half_extents.x, half_extents.y);
    [
        Vec2::new(-hw, -hh),
        Vec2::new(hw, -hh),
        Vec2::new(hw, hh),
        Vec2::new(-hw, hh),
    ]
    .map(|local| center + rot.rotate(local))
}
