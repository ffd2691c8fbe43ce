//! Game state and level setup
//!
//! Everything the step function mutates lives in `GameState`. Placement and
//! spawn rolls draw from a seeded `Pcg32`, so a seed plus an input script
//! reproduces a session exactly.

use glam::Vec2;
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::powerup::{LaserEffect, PowerUp, PowerUpKind};
use super::tank::{HitOutcome, Tank};
use super::target::{Target, TargetClass};
use super::track::{CurveSide, Track};
use crate::consts::NUM_TARGETS;
use crate::settings::Settings;

/// Placement tries before settling for the last candidate
pub const MAX_PLACEMENT_ATTEMPTS: u32 = 100;
/// Spawns keep at least this far from the tank (150 px, squared)
pub const MIN_TANK_DISTANCE_SQ: f32 = 150.0 * 150.0;
/// Targets keep at least this far from each other (50 px, squared)
pub const MIN_TARGET_SPACING_SQ: f32 = 50.0 * 50.0;
/// Spawn band across the track, as a left-to-right blend
pub const SPAWN_BLEND_MIN: f32 = 0.2;
pub const SPAWN_BLEND_SPAN: f32 = 0.6;

/// Points per target kill
pub const SCORE_PER_KILL: u64 = 100;
/// Points when a star rams the tank
pub const SCORE_PER_STAR: u64 = 150;

/// Current phase of play
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GamePhase {
    /// Driving and fighting
    Playing,
    /// Editing the track; the simulation is frozen
    Editor,
    /// Tank destroyed
    GameOver,
}

/// Notable things that happened during a step, for renderers and effects
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum GameEvent {
    BoundaryHit { position: Vec2 },
    TankHit { outcome: HitOutcome },
    ShotFired { position: Vec2 },
    TargetDestroyed { position: Vec2, class: TargetClass },
    PowerUpCollected { kind: PowerUpKind },
    PowerUpUsed { kind: PowerUpKind },
    LevelUp { level: u32 },
    GameOver { score: u64 },
}

fn unseeded_rng() -> Pcg32 {
    Pcg32::seed_from_u64(0)
}

/// Complete game state
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GameState {
    /// Run seed for reproducibility
    pub seed: u64,
    #[serde(skip, default = "unseeded_rng")]
    rng: Pcg32,
    pub settings: Settings,
    pub track: Track,
    pub tank: Tank,
    pub targets: Vec<Target>,
    /// Pickup waiting on the track
    pub power_up: Option<PowerUp>,
    /// Pickup collected but not yet used
    pub stored_power_up: Option<PowerUpKind>,
    pub laser: LaserEffect,
    pub score: u64,
    /// Current level (1-based)
    pub level: u32,
    /// Targets destroyed this level
    pub destroyed_targets: usize,
    pub phase: GamePhase,
    /// Simulation tick counter
    pub time_ticks: u64,
    /// Events from the last step
    #[serde(skip)]
    pub events: Vec<GameEvent>,
}

impl GameState {
    /// Create a new game on the default circuit
    pub fn new(seed: u64, settings: Settings) -> Self {
        let track = Track::new(settings.track.looped);
        Self::with_track(seed, settings, track)
    }

    /// Create a new game on a given track
    pub fn with_track(seed: u64, settings: Settings, track: Track) -> Self {
        let tank = Tank::new(Vec2::ZERO, &settings);
        let mut state = Self {
            seed,
            rng: Pcg32::seed_from_u64(seed),
            settings,
            track,
            tank,
            targets: Vec::new(),
            power_up: None,
            stored_power_up: None,
            laser: LaserEffect::default(),
            score: 0,
            level: 1,
            destroyed_targets: 0,
            phase: GamePhase::Playing,
            time_ticks: 0,
            events: Vec::new(),
        };
        state.reset_tank_to_start();
        state.spawn_targets();
        state
    }

    /// Move the tank to the track's start pose
    pub fn reset_tank_to_start(&mut self) {
        match self.track.start_pose() {
            Some((position, angle)) => {
                self.tank.reset_to(position, angle);
                log::info!(
                    "Tank placed at ({:.1}, {:.1}), heading {:.2} rad",
                    position.x,
                    position.y,
                    angle
                );
            }
            None => log::warn!("Track has an empty side; tank left where it was"),
        }
    }

    /// Score, level and health back to a fresh game on the current track
    pub fn restart(&mut self) {
        self.score = 0;
        self.level = 1;
        self.destroyed_targets = 0;
        self.tank.restore();
        self.power_up = None;
        self.stored_power_up = None;
        self.laser = LaserEffect::default();
        self.phase = GamePhase::Playing;
        self.reset_tank_to_start();
        self.spawn_targets();
        log::info!("Game restarted");
    }

    /// Replace all targets with a fresh wave for the current level
    pub fn spawn_targets(&mut self) {
        self.targets.clear();
        self.destroyed_targets = 0;

        for i in 0..NUM_TARGETS {
            let position = self.random_track_position();
            let roll: f32 = self.rng.random();
            let class = roll_target_class(self.level, i, roll);
            self.targets
                .push(Target::new(position, class, self.level, &self.settings));
        }

        let shooters = self.count_class(TargetClass::Shooter);
        let stars = self.count_class(TargetClass::Star);
        log::info!(
            "Level {} started with {} targets ({} shooters, {} stars)",
            self.level,
            NUM_TARGETS,
            shooters,
            stars
        );

        self.spawn_power_up();
    }

    fn count_class(&self, class: TargetClass) -> usize {
        self.targets.iter().filter(|t| t.class() == class).count()
    }

    /// Place a random pickup if none is on the track or held
    pub fn spawn_power_up(&mut self) {
        if self.power_up.is_some() || self.stored_power_up.is_some() {
            return;
        }
        if !self.track.is_playable() {
            log::warn!("Cannot spawn power-up: track is not playable");
            return;
        }

        let position = self.random_track_position();
        let kind = PowerUpKind::ALL[self.rng.random_range(0..PowerUpKind::ALL.len())];
        log::info!(
            "Power-up spawned: {} at ({:.1}, {:.1})",
            kind.name(),
            position.x,
            position.y
        );
        self.power_up = Some(PowerUp::new(position, kind));
    }

    /// Random point between the curves, away from the tank and live targets.
    ///
    /// Gives up after `MAX_PLACEMENT_ATTEMPTS` and returns the last candidate.
    pub fn random_track_position(&mut self) -> Vec2 {
        let avoid = self.tank.position;
        let mut position = Vec2::ZERO;

        for _ in 0..MAX_PLACEMENT_ATTEMPTS {
            let t: f32 = self.rng.random();
            let blend = SPAWN_BLEND_MIN + SPAWN_BLEND_SPAN * self.rng.random::<f32>();
            position = self.track.point_between(t, blend);

            if position.distance_squared(avoid) < MIN_TANK_DISTANCE_SQ {
                continue;
            }
            let crowded = self
                .targets
                .iter()
                .any(|t| t.active && t.position.distance_squared(position) < MIN_TARGET_SPACING_SQ);
            if !crowded {
                return position;
            }
        }

        log::warn!(
            "No clear spawn point after {} attempts, using ({:.1}, {:.1})",
            MAX_PLACEMENT_ATTEMPTS,
            position.x,
            position.y
        );
        position
    }

    /// Count a kill and advance the level once the wave is cleared
    pub fn record_kill(&mut self, position: Vec2, class: TargetClass, points: u64) {
        self.score += points;
        self.destroyed_targets += 1;
        self.events.push(GameEvent::TargetDestroyed { position, class });

        if self.destroyed_targets >= NUM_TARGETS {
            self.level += 1;
            log::info!("Level cleared; advancing to level {}", self.level);
            self.events.push(GameEvent::LevelUp { level: self.level });
            self.spawn_targets();
        }
    }

    /// Boundary polyline for a renderer, using the configured resolution
    pub fn boundary_polyline(&self, side: CurveSide) -> Vec<Vec2> {
        self.track
            .boundary_polyline(side, self.settings.track.render_steps_per_segment)
    }
}

/// Pick the kind of the `index`-th target of a wave
///
/// From level 3 the last target is a star, from level 2 the one before it a
/// shooter. Other slots roll: stars at 30% from level 4, else shooters at 40%
/// from level 2.
pub fn roll_target_class(level: u32, index: usize, roll: f32) -> TargetClass {
    if level >= 3 && index == NUM_TARGETS - 1 {
        TargetClass::Star
    } else if level >= 2 && index == NUM_TARGETS - 2 {
        TargetClass::Shooter
    } else if level >= 4 && roll < 0.3 {
        TargetClass::Star
    } else if level >= 2 && roll < 0.4 {
        TargetClass::Shooter
    } else {
        TargetClass::Basic
    }
}
