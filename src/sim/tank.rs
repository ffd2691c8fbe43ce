//! The player tank
//!
//! The hull always drives forward; input only turns it. Each step the tank
//! remembers where it started, moves, and on boundary contact snaps back to
//! that spot and reverses slowly for `COLLISION_REBOUND_FRAMES` steps. The
//! turret tracks the aim point at a capped angular speed, including while
//! rebounding.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::collision::{TunnelSampling, rect_boundary_collision};
use super::projectile::{self, Projectile};
use super::track::Track;
use crate::consts::{COLLISION_REBOUND_FRAMES, INVULNERABILITY_FRAMES, REBOUND_SPEED_FACTOR};
use crate::settings::Settings;
use crate::{direction_from_angle, rect_corners, shortest_angle_delta, wrap_angle};

/// Per-step controls for the tank
#[derive(Debug, Clone, Copy, Default)]
pub struct TankInput {
    pub rotate_left: bool,
    pub rotate_right: bool,
    /// World-space point the turret turns toward
    pub aim: Vec2,
}

/// What happened when the tank was hit
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum HitOutcome {
    /// Already invulnerable
    Ignored,
    /// A held shield absorbed the hit
    Blocked,
    Damaged,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Tank {
    pub position: Vec2,
    /// Position at the start of the current step; restored on boundary contact
    pub last_safe_position: Vec2,
    /// Hull heading in [0, 2π)
    pub base_angle: f32,
    /// Turret heading in [0, 2π)
    pub turret_angle: f32,

    pub speed: f32,
    pub rotation_rate: f32,
    pub turret_rotation_speed: f32,
    pub base_width: f32,
    pub base_height: f32,
    /// Turret disc size for drawing; collisions use the hull only
    pub turret_radius: f32,
    pub cannon_length: f32,

    /// Rebounding off a boundary
    pub colliding: bool,
    pub rebound_timer: u32,

    pub fire_cooldown: u32,
    pub fire_cooldown_reset: u32,
    pub projectile_speed: f32,
    pub projectile_radius: f32,
    pub projectile_lifetime: u32,
    pub tunnel_sampling: TunnelSampling,
    pub projectiles: Vec<Projectile>,

    pub health: i32,
    pub max_health: i32,
    pub invulnerable: bool,
    pub invulnerability_timer: u32,
    /// Current invulnerability came from a shield rather than damage
    pub shield_invulnerable: bool,
    pub has_shield: bool,
}

impl Tank {
    pub fn new(position: Vec2, settings: &Settings) -> Self {
        let t = &settings.tank;
        Self {
            position,
            last_safe_position: position,
            base_angle: 0.0,
            turret_angle: 0.0,
            speed: t.speed,
            rotation_rate: t.rotation_rate,
            turret_rotation_speed: t.turret_rotation_speed,
            base_width: t.base_width,
            base_height: t.base_height,
            turret_radius: t.turret_radius,
            cannon_length: t.cannon_length,
            colliding: false,
            rebound_timer: 0,
            fire_cooldown: 0,
            fire_cooldown_reset: t.fire_cooldown,
            projectile_speed: t.projectile_speed,
            projectile_radius: settings.projectile.radius,
            projectile_lifetime: settings.projectile.lifetime,
            tunnel_sampling: settings.projectile.tunnel_sampling,
            projectiles: Vec::new(),
            health: t.max_health,
            max_health: t.max_health,
            invulnerable: false,
            invulnerability_timer: 0,
            shield_invulnerable: false,
            has_shield: false,
        }
    }

    #[inline]
    pub fn forward(&self) -> Vec2 {
        direction_from_angle(self.base_angle)
    }

    #[inline]
    pub fn half_extents(&self) -> Vec2 {
        Vec2::new(self.base_width, self.base_height) * 0.5
    }

    /// Radius used for pickups and bullet hits
    #[inline]
    pub fn contact_radius(&self) -> f32 {
        self.base_width * 0.5
    }

    pub fn corners(&self) -> [Vec2; 4] {
        rect_corners(self.position, self.half_extents(), self.base_angle)
    }

    pub fn cannon_tip(&self) -> Vec2 {
        self.position + direction_from_angle(self.turret_angle) * self.cannon_length
    }

    pub fn is_alive(&self) -> bool {
        self.health > 0
    }

    /// Advance one step. Returns true if the tank hit a boundary this step.
    pub fn update(&mut self, input: &TankInput, track: Option<&Track>) -> bool {
        self.fire_cooldown = self.fire_cooldown.saturating_sub(1);

        projectile::step_all(&mut self.projectiles, track);

        if self.colliding {
            self.position -= self.forward() * self.speed * REBOUND_SPEED_FACTOR;
            self.rebound_timer = self.rebound_timer.saturating_sub(1);
            if self.rebound_timer == 0 {
                self.colliding = false;
            }
            self.steer_turret(input.aim);
            return false;
        }

        self.last_safe_position = self.position;

        if input.rotate_left {
            self.base_angle -= self.rotation_rate;
        }
        if input.rotate_right {
            self.base_angle += self.rotation_rate;
        }
        self.base_angle = wrap_angle(self.base_angle);

        self.position += self.forward() * self.speed;
        let hit = self.check_boundary(track);

        self.steer_turret(input.aim);
        hit
    }

    /// Roll back and start a rebound if the hull crosses a boundary
    fn check_boundary(&mut self, track: Option<&Track>) -> bool {
        let result = rect_boundary_collision(track, self.position, self.half_extents(), self.base_angle);
        if !result.hit {
            return false;
        }

        self.colliding = true;
        self.rebound_timer = COLLISION_REBOUND_FRAMES;
        self.position = self.last_safe_position;

        let outcome = self.apply_hit(self.max_health / 4);
        log::debug!(
            "Tank hit {:?} boundary (depth {:.1}): {:?}, health {}/{}",
            result.side,
            result.penetration,
            outcome,
            self.health,
            self.max_health
        );
        true
    }

    /// Turn the turret toward `aim`, at most `turret_rotation_speed` per step
    fn steer_turret(&mut self, aim: Vec2) {
        let to_aim = aim - self.position;
        let target = to_aim.y.atan2(to_aim.x);
        let delta = shortest_angle_delta(self.turret_angle, target);

        if delta.abs() <= self.turret_rotation_speed {
            self.turret_angle = target;
        } else {
            self.turret_angle += self.turret_rotation_speed.copysign(delta);
        }
        self.turret_angle = wrap_angle(self.turret_angle);
    }

    /// Fire a shell from the cannon tip. Returns false while reloading.
    pub fn fire(&mut self) -> bool {
        if self.fire_cooldown > 0 {
            return false;
        }

        let velocity = direction_from_angle(self.turret_angle) * self.projectile_speed;
        let shell = Projectile::new(
            self.cannon_tip(),
            velocity,
            self.projectile_radius,
            self.projectile_lifetime,
        )
        .with_sampling(self.tunnel_sampling);
        self.projectiles.push(shell);
        self.fire_cooldown = self.fire_cooldown_reset;
        true
    }

    /// Take a hit of `damage`. A held shield is consumed instead of health.
    pub fn apply_hit(&mut self, damage: i32) -> HitOutcome {
        if self.invulnerable {
            return HitOutcome::Ignored;
        }

        self.invulnerable = true;
        self.invulnerability_timer = INVULNERABILITY_FRAMES;

        if self.has_shield {
            self.has_shield = false;
            self.shield_invulnerable = true;
            HitOutcome::Blocked
        } else {
            self.health = (self.health - damage).max(0);
            self.shield_invulnerable = false;
            HitOutcome::Damaged
        }
    }

    /// Count down post-hit invulnerability
    pub fn tick_invulnerability(&mut self) {
        if !self.invulnerable {
            return;
        }
        self.invulnerability_timer = self.invulnerability_timer.saturating_sub(1);
        if self.invulnerability_timer == 0 {
            self.invulnerable = false;
            self.shield_invulnerable = false;
        }
    }

    pub fn heal(&mut self, amount: i32) {
        self.health = (self.health + amount).min(self.max_health);
    }

    /// Place the tank at a start pose, clearing motion state and live shells
    pub fn reset_to(&mut self, position: Vec2, angle: f32) {
        self.position = position;
        self.last_safe_position = position;
        self.base_angle = wrap_angle(angle);
        self.turret_angle = self.base_angle;
        self.colliding = false;
        self.rebound_timer = 0;
        self.fire_cooldown = 0;
        self.projectiles.clear();
    }

    /// Full health, no invulnerability, no shield
    pub fn restore(&mut self) {
        self.health = self.max_health;
        self.invulnerable = false;
        self.invulnerability_timer = 0;
        self.shield_invulnerable = false;
        self.has_shield = false;
    }
}
