use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Upper bounds accepted by `MatchConfig::validate`
pub const MAX_QUARTERS: u32 = 8;
pub const MAX_QUARTER_MINUTES: u32 = 60;
pub const MAX_PER_POSITION: u32 = 11;

/// Durations of the two outfield waves inside a quarter, in minutes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct WaveDurations {
    pub first: u32,
    pub second: u32,
}

/// Slots per position. DEF/ATT are per wave, GK is per quarter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PositionCounts {
    pub gk: u32,
    pub def: u32,
    pub att: u32,
}

impl PositionCounts {
    /// Outfield players on the pitch during one wave
    pub fn outfield_per_wave(&self) -> usize {
        (self.def + self.att) as usize
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FairnessRules {
    /// Largest allowed gap between the most and least minutes played
    pub max_variance_minutes: u32,
    /// Every goalkeeper must also get a first-wave outfield slot
    pub gk_requires_outfield: bool,
}

/// Shape of a match. Immutable for the lifetime of an allocation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MatchConfig {
    pub quarter_count: u32,
    pub quarter_duration_minutes: u32,
    pub waves: WaveDurations,
    pub positions: PositionCounts,
    pub fairness: FairnessRules,
}

impl Default for MatchConfig {
    fn default() -> Self {
        MatchConfig {
            quarter_count: 4,
            quarter_duration_minutes: 10,
            waves: WaveDurations { first: 5, second: 5 },
            positions: PositionCounts { gk: 1, def: 2, att: 2 },
            fairness: FairnessRules {
                max_variance_minutes: 10,
                gk_requires_outfield: true,
            },
        }
    }
}

impl MatchConfig {
    /// Checks the constraints a team-specific override must satisfy
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.quarter_count == 0 {
            return Err(ConfigError::NoQuarters);
        }
        check_limit("quarter_count", self.quarter_count, MAX_QUARTERS)?;
        check_limit("quarter_duration_minutes", self.quarter_duration_minutes, MAX_QUARTER_MINUTES)?;
        check_limit("positions.gk", self.positions.gk, MAX_PER_POSITION)?;
        check_limit("positions.def", self.positions.def, MAX_PER_POSITION)?;
        check_limit("positions.att", self.positions.att, MAX_PER_POSITION)?;
        if self.positions.gk == 0 {
            return Err(ConfigError::EmptyPosition("GK"));
        }
        if self.positions.def == 0 {
            return Err(ConfigError::EmptyPosition("DEF"));
        }
        if self.positions.att == 0 {
            return Err(ConfigError::EmptyPosition("ATT"));
        }
        if self.waves.first == 0 || self.waves.second == 0 {
            return Err(ConfigError::EmptyWave);
        }
        if self.waves.first.checked_add(self.waves.second) != Some(self.quarter_duration_minutes) {
            return Err(ConfigError::WaveMismatch {
                first: self.waves.first,
                second: self.waves.second,
                quarter: self.quarter_duration_minutes,
            });
        }
        Ok(())
    }

    /// Loads a config from JSON. Missing fields fall back to the defaults.
    pub fn from_json_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let raw = std::fs::read_to_string(path)?;
        let config: MatchConfig = serde_json::from_str(&raw)?;
        config.validate()?;
        Ok(config)
    }

    /// Player-minutes handed out per quarter (every concurrent role, full quarter)
    pub fn minutes_per_quarter(&self) -> u32 {
        self.positions.gk * self.quarter_duration_minutes
            + (self.positions.def + self.positions.att) * (self.waves.first + self.waves.second)
    }
}

fn check_limit(field: &'static str, value: u32, max: u32) -> Result<(), ConfigError> {
    if value > max {
        return Err(ConfigError::OutOfRange { field, value, max });
    }
    Ok(())
}
