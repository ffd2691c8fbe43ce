//! Power-ups and the laser beam
//!
//! One pickup sits on the track at a time. Driving over it stores its kind;
//! using the stored kind applies it once.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::collision::{circles_overlap, ray_hits_circle};
use super::tank::Tank;
use super::target::Target;
use crate::consts::{LASER_MAX_DURATION, LASER_RANGE};
use crate::direction_from_angle;

/// Pickup collection radius
pub const POWER_UP_RADIUS: f32 = 15.0;
/// Pickup spin per step (radians)
const SPIN_PER_STEP: f32 = 0.02;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PowerUpKind {
    /// Restore half of max health
    Health,
    /// Absorb the next hit
    Shield,
    /// Instant-kill beam from the cannon
    Laser,
}

impl PowerUpKind {
    pub const ALL: [PowerUpKind; 3] = [PowerUpKind::Health, PowerUpKind::Shield, PowerUpKind::Laser];

    pub fn name(&self) -> &'static str {
        match self {
            PowerUpKind::Health => "Health (+)",
            PowerUpKind::Shield => "Shield (Triangle)",
            PowerUpKind::Laser => "Laser Beam (X)",
        }
    }
}

/// A pickup waiting on the track
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PowerUp {
    pub position: Vec2,
    pub kind: PowerUpKind,
    pub radius: f32,
    /// Spin angle; only read by a renderer, gameplay ignores it
    pub spin: f32,
}

impl PowerUp {
    pub fn new(position: Vec2, kind: PowerUpKind) -> Self {
        Self {
            position,
            kind,
            radius: POWER_UP_RADIUS,
            spin: 0.0,
        }
    }

    pub fn update(&mut self) {
        self.spin = crate::wrap_angle(self.spin + SPIN_PER_STEP);
    }

    /// Whether a circle at `pos` with `radius` picks this up
    pub fn check_collection(&self, pos: Vec2, radius: f32) -> bool {
        circles_overlap(self.position, self.radius, pos, radius)
    }
}

/// Laser beam kept on screen for a few steps after firing
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LaserEffect {
    pub active: bool,
    pub remaining: u32,
    pub start: Vec2,
    pub end: Vec2,
}

impl LaserEffect {
    pub fn fire(&mut self, start: Vec2, end: Vec2) {
        self.active = true;
        self.remaining = LASER_MAX_DURATION;
        self.start = start;
        self.end = end;
    }

    pub fn tick(&mut self) {
        if !self.active {
            return;
        }
        self.remaining = self.remaining.saturating_sub(1);
        if self.remaining == 0 {
            self.active = false;
        }
    }

    /// Fade factor in [0, 1] for drawing the beam; gameplay never reads it
    pub fn alpha(&self) -> f32 {
        if !self.active {
            return 0.0;
        }
        self.remaining as f32 / LASER_MAX_DURATION as f32
    }
}

pub fn apply_health(tank: &mut Tank) {
    tank.heal(tank.max_health / 2);
    log::info!("Health restored: {}/{}", tank.health, tank.max_health);
}

pub fn apply_shield(tank: &mut Tank) {
    tank.has_shield = true;
    log::info!("Shield armed; next hit is blocked");
}

/// Fire the laser along the turret. Returns the indices of destroyed targets.
pub fn fire_laser(tank: &Tank, targets: &mut [Target], laser: &mut LaserEffect) -> Vec<usize> {
    let dir = direction_from_angle(tank.turret_angle);
    let start = tank.cannon_tip();
    laser.fire(start, start + dir * LASER_RANGE);

    let mut destroyed = Vec::new();
    for (i, target) in targets.iter_mut().enumerate() {
        if target.active && ray_hits_circle(start, dir, LASER_RANGE, target.position, target.radius) {
            target.active = false;
            destroyed.push(i);
        }
    }
    log::info!("Laser destroyed {} target(s)", destroyed.len());
    destroyed
}
