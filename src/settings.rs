//! Match settings
//!
//! Loaded from JSON (or defaulted) before the engine starts. Validation is the
//! only place the engine reports an error; everything after construction is
//! game flow.

use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::sim::terrain::MAX_FIELD_SIDE;

/// Construction-time invariant violations
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid field dimensions {width}x{height}")]
    InvalidDimensions { width: u32, height: u32 },
    #[error("invalid team layout: {0}")]
    InvalidTeamLayout(String),
    #[error("invalid range for {name}: {min}..{max}")]
    InvalidRange { name: &'static str, min: f64, max: f64 },
    #[error("failed to parse settings: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("failed to read settings: {0}")]
    Io(#[from] std::io::Error),
}

/// Procedural terrain parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TerrainSettings {
    /// Hill count is drawn from [min_hills, max_hills)
    pub min_hills: u32,
    pub max_hills: u32,
    pub min_hill_height: f64,
    pub max_hill_height: f64,
    pub min_hill_width: f64,
    pub max_hill_width: f64,
    /// Flat ground level as a fraction of the field height (from the top)
    pub base_level: f64,
}

impl Default for TerrainSettings {
    fn default() -> Self {
        Self {
            min_hills: 3,
            max_hills: 6,
            min_hill_height: 40.0,
            max_hill_height: 120.0,
            min_hill_width: 100.0,
            max_hill_width: 300.0,
            base_level: 0.7,
        }
    }
}

/// Everything that shapes a match besides the seed and the players' actions
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MatchSettings {
    // === Field ===
    pub width: u32,
    pub height: u32,
    pub terrain: TerrainSettings,

    // === Teams ===
    pub units_per_team: u32,
    pub max_health: u32,
    /// Distance of the outermost unit from the field edge
    pub spawn_margin: f32,
    /// Horizontal gap between teammates
    pub spawn_spacing: f32,

    // === Turn timing ===
    pub turn_time_ms: u64,
    /// Pause between a resolved turn and the next one
    pub turn_delay_ms: u64,
    /// Self-damage on timeout, percent of max health (rounded up)
    pub timeout_penalty_percent: u32,
    /// Charge time for full power
    pub max_charge_ms: u64,
}

impl Default for MatchSettings {
    fn default() -> Self {
        Self {
            width: 800,
            height: 600,
            terrain: TerrainSettings::default(),

            units_per_team: 2,
            max_health: 100,
            spawn_margin: 100.0,
            spawn_spacing: 80.0,

            turn_time_ms: 10_000,
            turn_delay_ms: 1_000,
            timeout_penalty_percent: 25,
            max_charge_ms: 2_000,
        }
    }
}

impl MatchSettings {
    /// Parse and validate
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let settings: Self = serde_json::from_str(json)?;
        settings.validate()?;
        Ok(settings)
    }

    /// Read, parse and validate a settings file
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let json = std::fs::read_to_string(path)?;
        let settings = Self::from_json(&json)?;
        log::info!("Loaded match settings ({}x{})", settings.width, settings.height);
        Ok(settings)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.width == 0
            || self.height == 0
            || self.width > MAX_FIELD_SIDE
            || self.height > MAX_FIELD_SIDE
        {
            return Err(ConfigError::InvalidDimensions {
                width: self.width,
                height: self.height,
            });
        }
        if self.units_per_team == 0 {
            return Err(ConfigError::InvalidTeamLayout(
                "each team needs at least one unit".into(),
            ));
        }
        if self.max_health == 0 {
            return Err(ConfigError::InvalidTeamLayout("max health must be positive".into()));
        }
        // Both rows must fit on their half of the field
        let row = self.spawn_margin + (self.units_per_team - 1) as f32 * self.spawn_spacing;
        if self.spawn_margin < 0.0 || self.spawn_spacing < 0.0 || row * 2.0 >= self.width as f32 {
            return Err(ConfigError::InvalidTeamLayout(format!(
                "{} units per team do not fit in a field {} wide",
                self.units_per_team, self.width
            )));
        }

        let t = &self.terrain;
        check_range("hills", f64::from(t.min_hills), f64::from(t.max_hills))?;
        check_range("hill height", t.min_hill_height, t.max_hill_height)?;
        check_range("hill width", t.min_hill_width, t.max_hill_width)?;
        if t.min_hill_width <= 0.0 {
            return Err(ConfigError::InvalidRange {
                name: "hill width",
                min: t.min_hill_width,
                max: t.max_hill_width,
            });
        }
        check_range("base level", t.base_level, 1.0)?;
        Ok(())
    }

    /// Timeout self-damage for a unit with `max_health`
    pub fn timeout_penalty(&self, max_health: u32) -> u32 {
        let penalty =
            (u64::from(max_health) * u64::from(self.timeout_penalty_percent)).div_ceil(100);
        penalty.min(u64::from(max_health)) as u32
    }
}

fn check_range(name: &'static str, min: f64, max: f64) -> Result<(), ConfigError> {
    if min.is_finite() && max.is_finite() && min <= max && min >= 0.0 {
        Ok(())
    } else {
        Err(ConfigError::InvalidRange { name, min, max })
    }
}
