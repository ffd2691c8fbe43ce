//! Shells and enemy bullets
//!
//! A projectile flies in a straight line, expires after its lifetime and is
//! stopped by either boundary. Dead projectiles stay in their owner's list
//! with `active == false` until the owner compacts it.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::collision::{TunnelSampling, swept_point_boundary_collision};
use super::track::Track;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Projectile {
    pub position: Vec2,
    /// Position before the last `update`, for the tunneling guard
    pub previous_position: Vec2,
    pub velocity: Vec2,
    pub active: bool,
    /// Steps left before expiry
    pub lifetime: u32,
    pub collision_radius: f32,
    pub sampling: TunnelSampling,
}

impl Projectile {
    pub fn new(position: Vec2, velocity: Vec2, collision_radius: f32, lifetime: u32) -> Self {
        Self {
            position,
            previous_position: position,
            velocity,
            active: true,
            lifetime,
            collision_radius,
            sampling: TunnelSampling::default(),
        }
    }

    pub fn with_sampling(mut self, sampling: TunnelSampling) -> Self {
        self.sampling = sampling;
        self
    }

    /// Advance one step
    pub fn update(&mut self) {
        if !self.active {
            return;
        }
        self.previous_position = self.position;
        self.position += self.velocity;

        self.lifetime = self.lifetime.saturating_sub(1);
        if self.lifetime == 0 {
            self.active = false;
        }
    }

    /// Deactivate on boundary contact. Returns whether this call stopped the projectile.
    pub fn check_track_collision(&mut self, track: Option<&Track>) -> bool {
        if !self.active {
            return false;
        }
        let result = swept_point_boundary_collision(
            track,
            self.previous_position,
            self.position,
            self.collision_radius,
            self.sampling,
        );
        if result.hit {
            self.active = false;
        }
        result.hit
    }
}

/// Update, collide and compact a projectile list
pub fn step_all(projectiles: &mut Vec<Projectile>, track: Option<&Track>) {
    for p in projectiles.iter_mut().filter(|p| p.active) {
        p.update();
        p.check_track_collision(track);
    }
    projectiles.retain(|p| p.active);
}
