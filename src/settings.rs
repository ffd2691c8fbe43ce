//! Game settings and tuning
//!
//! Loaded from a JSON file named by `SPLINE_TANK_SETTINGS`. Missing fields
//! keep their defaults, so a file only needs the values it changes.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::sim::collision::TunnelSampling;

/// Environment variable naming the settings file
pub const SETTINGS_ENV: &str = "SPLINE_TANK_SETTINGS";

/// Difficulty preset levels
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum Difficulty {
    Easy,
    #[default]
    Normal,
    Hard,
}

impl Difficulty {
    pub fn as_str(&self) -> &'static str {
        match self {
            Difficulty::Easy => "Easy",
            Difficulty::Normal => "Normal",
            Difficulty::Hard => "Hard",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "easy" => Some(Difficulty::Easy),
            "normal" | "medium" => Some(Difficulty::Normal),
            "hard" => Some(Difficulty::Hard),
            _ => None,
        }
    }

    /// Tank health multiplier
    pub fn health_scale(&self) -> f32 {
        match self {
            Difficulty::Easy => 1.5,
            Difficulty::Normal => 1.0,
            Difficulty::Hard => 0.75,
        }
    }

    /// Enemy bullet speed multiplier
    pub fn bullet_speed_scale(&self) -> f32 {
        match self {
            Difficulty::Easy => 0.8,
            Difficulty::Normal => 1.0,
            Difficulty::Hard => 1.2,
        }
    }
}

/// Boundary curves
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TrackSettings {
    /// Closed circuit or open course
    pub looped: bool,
    /// Polyline subdivisions per segment for rendering
    pub render_steps_per_segment: usize,
}

impl Default for TrackSettings {
    fn default() -> Self {
        Self {
            looped: true,
            render_steps_per_segment: crate::consts::RENDER_STEPS_PER_SEGMENT,
        }
    }
}

/// Player tank
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TankSettings {
    /// Forward speed (px/step)
    pub speed: f32,
    /// Hull rotation (rad/step)
    pub rotation_rate: f32,
    /// Turret rotation (rad/step)
    pub turret_rotation_speed: f32,
    pub base_width: f32,
    pub base_height: f32,
    pub turret_radius: f32,
    pub cannon_length: f32,
    /// Steps between shots
    pub fire_cooldown: u32,
    /// Shell speed (px/step)
    pub projectile_speed: f32,
    pub max_health: i32,
}

impl Default for TankSettings {
    fn default() -> Self {
        Self {
            speed: 0.7,
            rotation_rate: 0.02,
            turret_rotation_speed: 0.05,
            base_width: 60.0,
            base_height: 40.0,
            turret_radius: 15.0,
            cannon_length: 40.0,
            fire_cooldown: 45,
            projectile_speed: 3.5,
            max_health: 100,
        }
    }
}

/// Shells and bullets
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ProjectileSettings {
    /// Steps before a shell expires
    pub lifetime: u32,
    /// Tank shell collision radius
    pub radius: f32,
    pub tunnel_sampling: TunnelSampling,
}

impl Default for ProjectileSettings {
    fn default() -> Self {
        Self {
            lifetime: 300,
            radius: 8.0,
            tunnel_sampling: TunnelSampling::Adaptive,
        }
    }
}

/// Enemy targets
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TargetSettings {
    pub radius: f32,
    /// Health at level 1; grows by one per level
    pub base_health: i32,

    // === Shooter ===
    pub shooter_range: f32,
    pub shooter_cooldown: u32,
    pub bullet_speed: f32,
    pub bullet_radius: f32,

    // === Star ===
    pub star_base_speed: f32,
    pub star_speed_per_level: f32,
    pub star_base_detection: f32,
    pub star_detection_per_level: f32,
    pub star_base_spin: f32,
    pub star_spin_per_level: f32,
}

impl Default for TargetSettings {
    fn default() -> Self {
        Self {
            radius: 12.0,
            base_health: 2,

            shooter_range: 200.0,
            shooter_cooldown: 90,
            bullet_speed: 2.5,
            bullet_radius: 5.0,

            star_base_speed: 0.5,
            star_speed_per_level: 0.1,
            star_base_detection: 150.0,
            star_detection_per_level: 25.0,
            star_base_spin: 0.05,
            star_spin_per_level: 0.01,
        }
    }
}

/// All tuning for a session
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub difficulty: Difficulty,
    pub track: TrackSettings,
    pub tank: TankSettings,
    pub projectile: ProjectileSettings,
    pub targets: TargetSettings,
}

impl Settings {
    /// Create settings from a difficulty preset
    pub fn from_preset(difficulty: Difficulty) -> Self {
        let mut settings = Self::default();
        settings.apply_preset(difficulty);
        settings
    }

    /// Apply a difficulty preset on top of the current values
    pub fn apply_preset(&mut self, difficulty: Difficulty) {
        self.difficulty = difficulty;
        let base = TankSettings::default().max_health as f32;
        self.tank.max_health = (base * difficulty.health_scale()).round() as i32;
        self.targets.bullet_speed = TargetSettings::default().bullet_speed * difficulty.bullet_speed_scale();
    }

    /// Parse settings from JSON.
    ///
    /// The `difficulty` preset is applied first, then every field present in
    /// the file overrides it. Absent fields keep the preset's values.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        let overrides: Value = serde_json::from_str(json)?;
        let difficulty = match overrides.get("difficulty") {
            Some(d) => Difficulty::deserialize(d)?,
            None => Difficulty::default(),
        };

        let mut merged = serde_json::to_value(Self::from_preset(difficulty))?;
        merge_json(&mut merged, overrides);
        serde_json::from_value(merged)
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Load settings from the file named by `SPLINE_TANK_SETTINGS` (native only)
    #[cfg(not(target_arch = "wasm32"))]
    pub fn load() -> Self {
        let Ok(path) = std::env::var(SETTINGS_ENV) else {
            log::info!("Using default settings");
            return Self::default();
        };

        match std::fs::read_to_string(&path) {
            Ok(json) => match Self::from_json(&json) {
                Ok(settings) => {
                    log::info!("Loaded settings from {}", path);
                    settings
                }
                Err(e) => {
                    log::warn!("Invalid settings in {}: {}; using defaults", path, e);
                    Self::default()
                }
            },
            Err(e) => {
                log::warn!("Could not read {}: {}; using defaults", path, e);
                Self::default()
            }
        }
    }

    #[cfg(target_arch = "wasm32")]
    pub fn load() -> Self {
        Self::default()
    }
}

/// Overlay `overrides` onto `base`, recursing into objects
fn merge_json(base: &mut Value, overrides: Value) {
    match (base, overrides) {
        (Value::Object(base), Value::Object(overrides)) => {
            for (key, value) in overrides {
                match base.get_mut(&key) {
                    Some(slot) => merge_json(slot, value),
                    None => {
                        base.insert(key, value);
                    }
                }
            }
        }
        (slot, value) => *slot = value,
    }
}
