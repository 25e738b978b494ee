//! Run configuration
//!
//! Everything a shell may tune per run without touching archetype tables.

use serde::{Deserialize, Serialize};

use crate::consts::{ROOMS_PER_FLOOR, TOTAL_FLOORS};

/// Cosmetic quality tier. Only the particle budget reads it; particles
/// draw from their own RNG, so the tier never reaches gameplay.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum QualityPreset {
    Low,
    #[default]
    Medium,
    High,
}

impl QualityPreset {
    pub const ALL: [QualityPreset; 3] = [QualityPreset::Low, QualityPreset::Medium, QualityPreset::High];

    /// Live particle budget
    pub fn max_particles(self) -> usize {
        match self {
            QualityPreset::Low => 100,
            QualityPreset::Medium => 500,
            QualityPreset::High => 2000,
        }
    }
}

impl std::fmt::Display for QualityPreset {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            QualityPreset::Low => "low",
            QualityPreset::Medium => "medium",
            QualityPreset::High => "high",
        };
        f.write_str(name)
    }
}

impl std::str::FromStr for QualityPreset {
    type Err = String;

    /// Case-insensitive, accepts "med" for medium
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "low" => Ok(QualityPreset::Low),
            "medium" | "med" => Ok(QualityPreset::Medium),
            "high" => Ok(QualityPreset::High),
            other => Err(format!("unknown quality preset '{other}'")),
        }
    }
}

/// Per-run configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RunConfig {
    /// Rooms per floor, the last one being the boss room
    pub rooms_per_floor: usize,
    /// Floors in a full run
    pub total_floors: u32,
    /// How many buffs are offered after a boss kill
    pub reward_choices: usize,
    /// Cosmetic quality (caps particle count)
    pub quality: QualityPreset,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            rooms_per_floor: ROOMS_PER_FLOOR,
            total_floors: TOTAL_FLOORS,
            reward_choices: 3,
            quality: QualityPreset::Medium,
        }
    }
}

impl RunConfig {
    /// Parse a config from JSON; missing fields take their defaults
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        let mut config: Self = serde_json::from_str(json)?;
        // A floor needs at least an entry room and a boss room
        config.rooms_per_floor = config.rooms_per_floor.max(2);
        config.total_floors = config.total_floors.max(1);
        config.reward_choices = config.reward_choices.max(1);
        Ok(config)
    }

    /// Parse a config, falling back to defaults on malformed input
    pub fn from_json_or_default(json: &str) -> Self {
        match Self::from_json(json) {
            Ok(config) => {
                log::info!("Loaded run config");
                config
            }
            Err(e) => {
                log::warn!("Ignoring malformed run config: {}", e);
                Self::default()
            }
        }
    }

    pub fn max_particles(&self) -> usize {
        self.quality.max_particles()
    }

    pub fn total_rooms(&self) -> usize {
        self.rooms_per_floor * self.total_floors as usize
    }
}
