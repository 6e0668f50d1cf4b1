//! Game configuration: tick rate, seed and gameplay tuning.
//!
//! Every field has a default, so a config file only needs the values it
//! overrides:
//!
//! ```
//! use stn_engine::config::GameConfig;
//!
//! let config = GameConfig::from_json_str(r#"{ "seed": 7, "tuning": { "playerSpeed": 80.0 } }"#)
//!     .unwrap();
//! assert_eq!(config.seed, 7);
//! assert_eq!(config.tuning.player_speed, 80.0);
//! assert_eq!(config.tuning.bullet_speed, 500.0);
//! ```

use std::path::Path;

use anyhow::Context;
use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// ConfigError
// ---------------------------------------------------------------------------

/// A config that failed to parse or validate.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to parse config: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("fixed_dt must be positive and finite, got {fixed_dt}")]
    InvalidFixedDt { fixed_dt: f64 },

    #[error("tuning value '{field}' must be non-negative and finite, got {value}")]
    InvalidTuning { field: &'static str, value: f64 },

    #[error("inventory must have at least one slot")]
    NoInventorySlots,
}

// ---------------------------------------------------------------------------
// TickConfig
// ---------------------------------------------------------------------------

/// Configuration for the fixed-timestep loop.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TickConfig {
    /// Fixed time step in seconds per tick. Must be positive and finite.
    pub fixed_dt: f64,
}

impl Default for TickConfig {
    /// Defaults to 30 Hz.
    fn default() -> Self {
        Self {
            fixed_dt: 1.0 / 30.0,
        }
    }
}

// ---------------------------------------------------------------------------
// Tuning
// ---------------------------------------------------------------------------

/// Gameplay constants captured by the assembly functions at spawn time.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Tuning {
    pub bullet_speed: f64,
    pub bullet_max_travel: f64,
    pub player_speed: f64,
    /// Seconds between shots.
    pub fire_cooldown: f64,
    pub zombie_speed: f64,
    /// Center-to-center distance at which a zombie can hit a player.
    pub zombie_attack_radius: f64,
    pub zombie_attack_cooldown: f64,
    /// Radius within which a zombie notices a player.
    pub zombie_sight_radius: f64,
    pub inventory_slots: usize,
    /// Center-to-center reach of the player's interact action.
    pub interact_radius: f64,
    /// Seconds a fire burns before going out.
    pub fire_lifetime: f64,
}

impl Default for Tuning {
    fn default() -> Self {
        Self {
            bullet_speed: 500.0,
            bullet_max_travel: 400.0,
            player_speed: 60.0,
            fire_cooldown: 0.4,
            zombie_speed: 35.0,
            zombie_attack_radius: 24.0,
            zombie_attack_cooldown: 1.0,
            zombie_sight_radius: 200.0,
            inventory_slots: 8,
            interact_radius: 20.0,
            fire_lifetime: 5.0,
        }
    }
}

impl Tuning {
    fn validate(&self) -> Result<(), ConfigError> {
        let fields = [
            ("bulletSpeed", self.bullet_speed),
            ("bulletMaxTravel", self.bullet_max_travel),
            ("playerSpeed", self.player_speed),
            ("fireCooldown", self.fire_cooldown),
            ("zombieSpeed", self.zombie_speed),
            ("zombieAttackRadius", self.zombie_attack_radius),
            ("zombieAttackCooldown", self.zombie_attack_cooldown),
            ("zombieSightRadius", self.zombie_sight_radius),
            ("interactRadius", self.interact_radius),
            ("fireLifetime", self.fire_lifetime),
        ];
        for (field, value) in fields {
            if !(value >= 0.0 && value.is_finite()) {
                return Err(ConfigError::InvalidTuning { field, value });
            }
        }
        if self.inventory_slots == 0 {
            return Err(ConfigError::NoInventorySlots);
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// GameConfig
// ---------------------------------------------------------------------------

/// Top-level configuration.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    pub tick: TickConfig,
    /// Seed for all simulation randomness.
    pub seed: u64,
    pub tuning: Tuning,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            tick: TickConfig::default(),
            seed: 0x5EED,
            tuning: Tuning::default(),
        }
    }
}

impl GameConfig {
    /// Parse and validate a JSON config.
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        let config: GameConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Read, parse and validate a JSON config file.
    pub fn load(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config file {}", path.display()))?;
        let config = Self::from_json_str(&text)
            .with_context(|| format!("invalid config file {}", path.display()))?;
        tracing::info!(path = %path.display(), seed = config.seed, "loaded game config");
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let dt = self.tick.fixed_dt;
        if !(dt > 0.0 && dt.is_finite()) {
            return Err(ConfigError::InvalidFixedDt { fixed_dt: dt });
        }
        self.tuning.validate()
    }
}
