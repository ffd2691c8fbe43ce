//! Enemy targets
//!
//! Three kinds share position, radius and health:
//! - `Basic`: stationary
//! - `Shooter`: aims at the tank and fires bullets when it is in range
//! - `Star`: spins and drifts toward the tank once it is close enough

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::collision::any_corner_in_circle;
use super::projectile::{self, Projectile};
use super::track::Track;
use crate::settings::Settings;
use crate::wrap_angle;

/// Kind tag used when rolling spawns
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TargetClass {
    Basic,
    Shooter,
    Star,
}

impl TargetClass {
    pub fn as_str(&self) -> &'static str {
        match self {
            TargetClass::Basic => "Basic",
            TargetClass::Shooter => "Shooter",
            TargetClass::Star => "Star",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ShooterState {
    /// Current facing toward the tank
    pub aim_angle: f32,
    pub range: f32,
    pub cooldown: u32,
    pub cooldown_reset: u32,
    pub bullet_speed: f32,
    pub bullet_radius: f32,
    pub bullet_lifetime: u32,
    pub bullets: Vec<Projectile>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StarState {
    pub move_speed: f32,
    pub detection_radius: f32,
    /// Spin per step (radians)
    pub spin: f32,
    pub rotation: f32,
    pub chasing: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum TargetKind {
    Basic,
    Shooter(ShooterState),
    Star(StarState),
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Target {
    pub position: Vec2,
    pub radius: f32,
    pub health: i32,
    pub max_health: i32,
    pub active: bool,
    pub kind: TargetKind,
}

impl Target {
    /// Build a target of `class` with stats scaled for `level` (1-based)
    pub fn new(position: Vec2, class: TargetClass, level: u32, settings: &Settings) -> Self {
        let ts = &settings.targets;
        let level_bonus = level.saturating_sub(1) as i32;
        let lv = level as f32;

        let (kind, extra_health) = match class {
            TargetClass::Basic => (TargetKind::Basic, 0),
            TargetClass::Shooter => (
                TargetKind::Shooter(ShooterState {
                    aim_angle: 0.0,
                    range: ts.shooter_range,
                    cooldown: 0,
                    cooldown_reset: ts.shooter_cooldown,
                    bullet_speed: ts.bullet_speed,
                    bullet_radius: ts.bullet_radius,
                    bullet_lifetime: settings.projectile.lifetime,
                    bullets: Vec::new(),
                }),
                1,
            ),
            TargetClass::Star => (
                TargetKind::Star(StarState {
                    move_speed: ts.star_base_speed + lv * ts.star_speed_per_level,
                    detection_radius: ts.star_base_detection + lv * ts.star_detection_per_level,
                    spin: ts.star_base_spin + level_bonus as f32 * ts.star_spin_per_level,
                    rotation: 0.0,
                    chasing: false,
                }),
                2,
            ),
        };

        let max_health = ts.base_health + level_bonus + extra_health;
        Self {
            position,
            radius: ts.radius,
            health: max_health,
            max_health,
            active: true,
            kind,
        }
    }

    pub fn class(&self) -> TargetClass {
        match self.kind {
            TargetKind::Basic => TargetClass::Basic,
            TargetKind::Shooter(_) => TargetClass::Shooter,
            TargetKind::Star(_) => TargetClass::Star,
        }
    }

    pub fn is_star(&self) -> bool {
        matches!(self.kind, TargetKind::Star(_))
    }

    /// Advance one step relative to the tank
    pub fn update(&mut self, tank_pos: Vec2, track: Option<&Track>) {
        if !self.active {
            return;
        }

        let position = self.position;
        let radius = self.radius;
        match &mut self.kind {
            TargetKind::Basic => {}
            TargetKind::Shooter(s) => {
                let to_tank = tank_pos - position;
                s.aim_angle = to_tank.y.atan2(to_tank.x);
                s.cooldown = s.cooldown.saturating_sub(1);

                if s.cooldown == 0 && to_tank.length_squared() <= s.range * s.range {
                    if let Some(bullet) = fire_at(s, position, radius, tank_pos) {
                        s.bullets.push(bullet);
                        s.cooldown = s.cooldown_reset;
                    }
                }

                projectile::step_all(&mut s.bullets, track);
            }
            TargetKind::Star(s) => {
                s.rotation = wrap_angle(s.rotation + s.spin);

                let to_tank = tank_pos - position;
                let dist_sq = to_tank.length_squared();
                if dist_sq <= s.detection_radius * s.detection_radius {
                    s.chasing = true;
                    let dist = dist_sq.sqrt();
                    if dist > 0.1 {
                        self.position += to_tank / dist * s.move_speed;
                    }
                }
            }
        }
    }

    /// Point inside the target circle
    pub fn contains_point(&self, point: Vec2) -> bool {
        self.active && self.position.distance_squared(point) <= self.radius * self.radius
    }

    /// Any corner of the tank hull inside the target circle
    pub fn hits_rect(&self, center: Vec2, half_extents: Vec2, angle: f32) -> bool {
        self.active && any_corner_in_circle(center, half_extents, angle, self.position, self.radius)
    }

    /// Returns true if this hit destroyed the target
    pub fn take_damage(&mut self, amount: i32) -> bool {
        if !self.active {
            return false;
        }
        self.health -= amount;
        if self.health <= 0 {
            self.health = 0;
            self.active = false;
            return true;
        }
        false
    }

    /// Live enemy bullets, empty for non-shooters
    pub fn bullets_mut(&mut self) -> &mut [Projectile] {
        match &mut self.kind {
            TargetKind::Shooter(s) => &mut s.bullets,
            _ => &mut [],
        }
    }

    pub fn bullets(&self) -> &[Projectile] {
        match &self.kind {
            TargetKind::Shooter(s) => &s.bullets,
            _ => &[],
        }
    }
}

/// Bullet aimed at `aim`, spawned at the shooter's nose
fn fire_at(s: &ShooterState, position: Vec2, radius: f32, aim: Vec2) -> Option<Projectile> {
    let dir = (aim - position).try_normalize()?;
    let spawn = position + dir * (radius * 1.5);
    Some(Projectile::new(spawn, dir * s.bullet_speed, s.bullet_radius, s.bullet_lifetime))
}
