//! Configuration loading and typed config structures for the Ageist simulation.
//!
//! The canonical configuration lives in `ageist-config.yaml` at the project
//! root. This module defines strongly-typed structs that mirror the YAML
//! structure, and provides a loader that reads and validates the file.
//! Every section and field has a default, so an empty file is valid.

use std::path::Path;

use ageist_growth::{GrowthConfig, GrowthError};
use ageist_types::{LifeStage, TICKS_PER_YEAR};
use serde::Deserialize;

/// Errors that can occur when loading configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Failed to read the configuration file from disk.
    #[error("failed to read config file: {source}")]
    Io {
        /// The underlying I/O error.
        #[from]
        source: std::io::Error,
    },

    /// Failed to parse YAML content.
    #[error("failed to parse config YAML: {source}")]
    Yaml {
        /// The underlying YAML parse error.
        source: serde_yml::Error,
    },

    /// The growth section is out of range.
    #[error("invalid growth config: {source}")]
    Growth {
        /// The underlying validation error.
        #[from]
        source: GrowthError,
    },

    /// A host-side value is out of range.
    #[error("invalid config: {reason}")]
    Invalid {
        /// Description of the offending value.
        reason: String,
    },
}

impl From<serde_yml::Error> for ConfigError {
    fn from(source: serde_yml::Error) -> Self {
        Self::Yaml { source }
    }
}

/// Top-level simulation configuration.
///
/// Mirrors the structure of `ageist-config.yaml`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct AgeistConfig {
    /// World-level settings (seed, step length, pacing).
    #[serde(default)]
    pub world: WorldConfig,

    /// Starting population parameters.
    #[serde(default)]
    pub population: PopulationConfig,

    /// Weather and raid parameters feeding the fear evaluators.
    #[serde(default)]
    pub environment: EnvironmentConfig,

    /// Growth engine parameters.
    #[serde(default)]
    pub growth: GrowthConfig,

    /// Logging configuration.
    #[serde(default)]
    pub logging: LoggingConfig,

    /// Simulation boundary parameters.
    #[serde(default)]
    pub simulation: SimulationBoundsConfig,
}

impl AgeistConfig {
    /// Load configuration from a YAML file at the given path.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Io`] if the file cannot be read,
    /// [`ConfigError::Yaml`] if the content is not valid YAML, or a
    /// validation error if a value is out of range.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        Self::parse(&contents)
    }

    /// Parse and validate configuration from a YAML string.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Yaml`] if the string is not valid YAML, or a
    /// validation error if a value is out of range.
    pub fn parse(yaml: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_yml::from_str(yaml)?;
        config.validate()?;
        Ok(config)
    }

    /// Check every section.
    ///
    /// # Errors
    ///
    /// Returns the first validation failure found.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.world.ticks_per_step == 0 {
            return Err(invalid("world.ticks_per_step must be at least 1"));
        }
        self.population.validate()?;
        self.environment.validate()?;
        self.growth.validate()?;
        Ok(())
    }
}

fn invalid(reason: &str) -> ConfigError {
    ConfigError::Invalid {
        reason: String::from(reason),
    }
}

// ---------------------------------------------------------------------------
// World
// ---------------------------------------------------------------------------

/// World-level configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct WorldConfig {
    /// Seed for the simulation's random source (default: 42).
    #[serde(default = "default_seed")]
    pub seed: u64,

    /// Game ticks advanced per simulation step (default: 2500).
    #[serde(default = "default_ticks_per_step")]
    pub ticks_per_step: u64,

    /// Real-time pause between steps in milliseconds (default: 0).
    #[serde(default)]
    pub tick_interval_ms: u64,
}

impl Default for WorldConfig {
    fn default() -> Self {
        Self {
            seed: default_seed(),
            ticks_per_step: default_ticks_per_step(),
            tick_interval_ms: 0,
        }
    }
}

const fn default_seed() -> u64 {
    42
}
const fn default_ticks_per_step() -> u64 {
    2500
}

// ---------------------------------------------------------------------------
// Population
// ---------------------------------------------------------------------------

/// Starting population configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct PopulationConfig {
    /// Number of colonists spawned at simulation start (default: 12).
    #[serde(default = "default_initial_agents")]
    pub initial_agents: u32,

    /// Youngest spawn age in years (default: 0).
    #[serde(default)]
    pub min_age_years: u64,

    /// Oldest spawn age in years, exclusive (default: 20).
    #[serde(default = "default_max_age_years")]
    pub max_age_years: u64,

    /// Minimum age in years for each host life stage, youngest first
    /// (default: `[0, 1, 4, 13, 18]`).
    #[serde(default = "default_life_stage_min_years")]
    pub life_stage_min_years: Vec<u64>,
}

impl Default for PopulationConfig {
    fn default() -> Self {
        Self {
            initial_agents: default_initial_agents(),
            min_age_years: 0,
            max_age_years: default_max_age_years(),
            life_stage_min_years: default_life_stage_min_years(),
        }
    }
}

impl PopulationConfig {
    /// Check the age range and stage thresholds.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] describing the first bad value.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.min_age_years >= self.max_age_years {
            return Err(invalid(
                "population.min_age_years must be below population.max_age_years",
            ));
        }
        if self.life_stage_min_years.len() != LifeStage::ALL.len() {
            return Err(invalid(
                "population.life_stage_min_years needs one entry per life stage",
            ));
        }
        if self.life_stage_min_years.first() != Some(&0) {
            return Err(invalid("population.life_stage_min_years must start at 0"));
        }
        if !self.life_stage_min_years.is_sorted() {
            return Err(invalid(
                "population.life_stage_min_years must be non-decreasing",
            ));
        }
        if self
            .max_age_years
            .checked_mul(TICKS_PER_YEAR)
            .is_none()
        {
            return Err(invalid("population.max_age_years overflows tick range"));
        }
        Ok(())
    }

    /// Host life-stage index for a biological age: the last stage whose
    /// minimum age has been reached.
    pub fn life_stage_index(&self, age_ticks: u64) -> usize {
        let years = age_ticks / TICKS_PER_YEAR;
        self.life_stage_min_years
            .iter()
            .filter(|min| **min <= years)
            .count()
            .saturating_sub(1)
    }
}

const fn default_initial_agents() -> u32 {
    12
}
const fn default_max_age_years() -> u64 {
    20
}
fn default_life_stage_min_years() -> Vec<u64> {
    vec![0, 1, 4, 13, 18]
}

// ---------------------------------------------------------------------------
// Environment
// ---------------------------------------------------------------------------

/// Weather and raid parameters.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct EnvironmentConfig {
    /// Chance per step, in percent, that clear weather turns to a
    /// thunderstorm (default: 2).
    #[serde(default = "default_thunderstorm_chance_pct")]
    pub thunderstorm_chance_pct: u32,

    /// Ticks a thunderstorm lasts (default: 30000).
    #[serde(default = "default_thunderstorm_duration_ticks")]
    pub thunderstorm_duration_ticks: u64,

    /// Chance per step, in percent, that a raid starts (default: 1).
    #[serde(default = "default_raid_chance_pct")]
    pub raid_chance_pct: u32,

    /// Ticks a raid lasts (default: 15000).
    #[serde(default = "default_raid_duration_ticks")]
    pub raid_duration_ticks: u64,

    /// Hostiles aiming near the colony during a raid (default: 3).
    #[serde(default = "default_raid_aimers")]
    pub raid_aimers: u32,

    /// Chance per night step, in percent, that a colonist is awake
    /// (default: 25).
    #[serde(default = "default_night_waking_pct")]
    pub night_waking_pct: u32,

    /// Whether nights are dark enough to feed the fear of the dark
    /// (default: true).
    #[serde(default = "default_true")]
    pub darkness_enabled: bool,
}

impl Default for EnvironmentConfig {
    fn default() -> Self {
        Self {
            thunderstorm_chance_pct: default_thunderstorm_chance_pct(),
            thunderstorm_duration_ticks: default_thunderstorm_duration_ticks(),
            raid_chance_pct: default_raid_chance_pct(),
            raid_duration_ticks: default_raid_duration_ticks(),
            raid_aimers: default_raid_aimers(),
            night_waking_pct: default_night_waking_pct(),
            darkness_enabled: true,
        }
    }
}

impl EnvironmentConfig {
    /// Check that every percentage is in range.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] describing the first bad value.
    pub fn validate(&self) -> Result<(), ConfigError> {
        for (name, pct) in [
            ("thunderstorm_chance_pct", self.thunderstorm_chance_pct),
            ("raid_chance_pct", self.raid_chance_pct),
            ("night_waking_pct", self.night_waking_pct),
        ] {
            if pct > 100 {
                return Err(ConfigError::Invalid {
                    reason: format!("environment.{name} must be between 0 and 100"),
                });
            }
        }
        Ok(())
    }
}

const fn default_thunderstorm_chance_pct() -> u32 {
    2
}
const fn default_thunderstorm_duration_ticks() -> u64 {
    30_000
}
const fn default_raid_chance_pct() -> u32 {
    1
}
const fn default_raid_duration_ticks() -> u64 {
    15_000
}
const fn default_raid_aimers() -> u32 {
    3
}
const fn default_night_waking_pct() -> u32 {
    25
}
const fn default_true() -> bool {
    true
}

// ---------------------------------------------------------------------------
// Logging and bounds
// ---------------------------------------------------------------------------

/// Logging configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct LoggingConfig {
    /// Default filter directive when `RUST_LOG` is unset (default: `info`).
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

fn default_log_level() -> String {
    String::from("info")
}

/// Simulation boundary configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct SimulationBoundsConfig {
    /// Stop after this many steps; 0 means run until no colonist is
    /// still growing (default: 5000).
    #[serde(default = "default_max_steps")]
    pub max_steps: u64,

    /// Write a snapshot to this path when the run ends (default: none).
    #[serde(default)]
    pub snapshot_path: Option<String>,
}

impl Default for SimulationBoundsConfig {
    fn default() -> Self {
        Self {
            max_steps: default_max_steps(),
            snapshot_path: None,
        }
    }
}

const fn default_max_steps() -> u64 {
    5000
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_yaml_gives_defaults() {
        let config = AgeistConfig::parse("{}").ok();
        assert_eq!(config, Some(AgeistConfig::default()));
    }

    #[test]
    fn default_values() {
        let config = AgeistConfig::default();
        assert_eq!(config.world.seed, 42);
        assert_eq!(config.world.ticks_per_step, 2500);
        assert_eq!(config.population.initial_agents, 12);
        assert_eq!(config.population.life_stage_min_years, vec![0, 1, 4, 13, 18]);
        assert_eq!(config.logging.level, "info");
        assert_eq!(config.simulation.max_steps, 5000);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn partial_sections_fill_defaults() {
        let yaml = "
world:
  seed: 7
growth:
  adult_trait_target: 4
  fear_chance_pct: 100
";
        let config = AgeistConfig::parse(yaml).ok();
        assert!(config.is_some());
        if let Some(config) = config {
            assert_eq!(config.world.seed, 7);
            assert_eq!(config.world.ticks_per_step, 2500);
            assert_eq!(config.growth.adult_trait_target, 4);
            assert_eq!(config.growth.fear_chance_pct, 100);
            assert_eq!(config.growth.child_trait_target, 2);
        }
    }

    #[test]
    fn invalid_yaml_is_rejected() {
        let result = AgeistConfig::parse("world: [unclosed");
        assert!(matches!(result, Err(ConfigError::Yaml { .. })));
    }

    #[test]
    fn invalid_growth_section_is_rejected() {
        let result = AgeistConfig::parse("growth:\n  skill_gain_passion_odds: 0\n");
        assert!(matches!(result, Err(ConfigError::Growth { .. })));
    }

    #[test]
    fn zero_step_length_is_rejected() {
        let result = AgeistConfig::parse("world:\n  ticks_per_step: 0\n");
        assert!(matches!(result, Err(ConfigError::Invalid { .. })));
    }

    #[test]
    fn stage_thresholds_must_cover_every_stage() {
        let result = AgeistConfig::parse("population:\n  life_stage_min_years: [0, 4, 13]\n");
        assert!(matches!(result, Err(ConfigError::Invalid { .. })));

        let result =
            AgeistConfig::parse("population:\n  life_stage_min_years: [0, 4, 1, 13, 18]\n");
        assert!(matches!(result, Err(ConfigError::Invalid { .. })));
    }

    #[test]
    fn stage_index_from_age() {
        let population = PopulationConfig::default();
        let at = |years: u64| population.life_stage_index(years * TICKS_PER_YEAR);
        assert_eq!(at(0), 0);
        assert_eq!(at(1), 1);
        assert_eq!(at(3), 1);
        assert_eq!(at(4), 2);
        assert_eq!(at(12), 2);
        assert_eq!(at(13), 3);
        assert_eq!(at(18), 4);
        assert_eq!(at(70), 4);
    }

    #[test]
    fn rejects_out_of_range_percentages() {
        let result = AgeistConfig::parse("environment:\n  raid_chance_pct: 101\n");
        assert!(matches!(result, Err(ConfigError::Invalid { .. })));
    }

    #[test]
    fn shipped_config_matches_defaults() {
        let yaml = include_str!("../../../ageist-config.yaml");
        let config = AgeistConfig::parse(yaml).ok();
        assert_eq!(config, Some(AgeistConfig::default()));
    }
}
