//! Deterministic simulation module
//!
//! All gameplay logic lives here. This module must be pure and deterministic:
//! - Fixed step only
//! - Seeded RNG only
//! - Stable iteration order (vector order)
//! - No rendering or platform dependencies

pub mod collision;
pub mod nearest;
pub mod powerup;
pub mod projectile;
pub mod spline;
pub mod state;
pub mod tank;
pub mod target;
pub mod tick;
pub mod track;

pub use collision::{
    CollisionResult, TunnelSampling, point_boundary_contact, rect_boundary_collision,
    swept_point_boundary_collision,
};
pub use nearest::{ClosestPointInfo, closest_point};
pub use powerup::{LaserEffect, PowerUp, PowerUpKind};
pub use projectile::Projectile;
pub use state::{GameEvent, GamePhase, GameState};
pub use tank::{HitOutcome, Tank, TankInput};
pub use target::{Target, TargetClass, TargetKind};
pub use tick::{EditCommand, TickInput, tick};
pub use track::{CurveSide, Selection, Track};
