//! Tunable parameters for the growth engine.
//!
//! [`GrowthConfig`] bundles every knob the controller, the retrospective,
//! the passion scheduler and the fear registry read. It deserializes from
//! the `growth` section of `ageist-config.yaml`; every field has a default
//! so partial sections are valid.

use ageist_types::{TICKS_PER_YEAR, TraitId};
use serde::{Deserialize, Serialize};

use crate::error::GrowthError;

/// Configuration for the growth engine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GrowthConfig {
    /// Total trait count the retrospective aims for on Child entry (default: 2).
    #[serde(default = "default_child_trait_target")]
    pub child_trait_target: usize,

    /// Total trait count the retrospective aims for on Adolescent entry (default: 2).
    #[serde(default = "default_adolescent_trait_target")]
    pub adolescent_trait_target: usize,

    /// Total trait count the retrospective aims for on Adult entry (default: 3).
    #[serde(default = "default_adult_trait_target")]
    pub adult_trait_target: usize,

    /// Traits kept when growth first attaches to an adolescent (default: 2).
    #[serde(default = "default_adolescent_trait_limit")]
    pub adolescent_trait_limit: usize,

    /// Cap on random draws for one trait slot or one passion grant (default: 300).
    #[serde(default = "default_max_draw_attempts")]
    pub max_draw_attempts: u32,

    /// Fewest passion events seeded at bootstrap (default: 5).
    #[serde(default = "default_bootstrap_passions_min")]
    pub bootstrap_passions_min: u32,

    /// Most passion events seeded at bootstrap (default: 7).
    #[serde(default = "default_bootstrap_passions_max")]
    pub bootstrap_passions_max: u32,

    /// Earliest activation age of a bootstrap passion event, in years (default: 7).
    #[serde(default = "default_passion_window_min_years")]
    pub passion_window_min_years: u64,

    /// Activation ages are drawn below this many years (default: 14).
    #[serde(default = "default_passion_window_max_years")]
    pub passion_window_max_years: u64,

    /// Each gained skill level enqueues a passion event with odds 1 in N (default: 7).
    #[serde(default = "default_skill_gain_passion_odds")]
    pub skill_gain_passion_odds: u32,

    /// Chance in percent that a newly rolled fear sticks (default: 50).
    #[serde(default = "default_fear_chance_pct")]
    pub fear_chance_pct: u32,

    /// Whether inheritable traits are kept out of the random draft (default: true).
    #[serde(default = "default_true")]
    pub exclude_genetic_traits: bool,

    /// Traits that must be earned from history and are never drafted at random.
    #[serde(default = "default_never_drafted")]
    pub never_drafted: Vec<TraitId>,

    /// Trait marking a young agent, removed on Adolescent entry (default: `Wimp`).
    #[serde(default = "default_transient_trait")]
    pub transient_trait: TraitId,
}

impl Default for GrowthConfig {
    fn default() -> Self {
        Self {
            child_trait_target: default_child_trait_target(),
            adolescent_trait_target: default_adolescent_trait_target(),
            adult_trait_target: default_adult_trait_target(),
            adolescent_trait_limit: default_adolescent_trait_limit(),
            max_draw_attempts: default_max_draw_attempts(),
            bootstrap_passions_min: default_bootstrap_passions_min(),
            bootstrap_passions_max: default_bootstrap_passions_max(),
            passion_window_min_years: default_passion_window_min_years(),
            passion_window_max_years: default_passion_window_max_years(),
            skill_gain_passion_odds: default_skill_gain_passion_odds(),
            fear_chance_pct: default_fear_chance_pct(),
            exclude_genetic_traits: true,
            never_drafted: default_never_drafted(),
            transient_trait: default_transient_trait(),
        }
    }
}

impl GrowthConfig {
    /// Check that every range is non-empty and every ratio is well formed.
    ///
    /// # Errors
    ///
    /// Returns [`GrowthError::InvalidConfig`] naming the first bad value.
    pub fn validate(&self) -> Result<(), GrowthError> {
        if self.max_draw_attempts == 0 {
            return Err(invalid("max_draw_attempts must be at least 1"));
        }
        if self.bootstrap_passions_min > self.bootstrap_passions_max {
            return Err(invalid(
                "bootstrap_passions_min must not exceed bootstrap_passions_max",
            ));
        }
        if self.passion_window_min_years >= self.passion_window_max_years {
            return Err(invalid(
                "passion_window_min_years must be below passion_window_max_years",
            ));
        }
        if self.skill_gain_passion_odds == 0 {
            return Err(invalid("skill_gain_passion_odds must be at least 1"));
        }
        if self.fear_chance_pct > 100 {
            return Err(invalid("fear_chance_pct must be between 0 and 100"));
        }
        self.passion_window_ticks()?;
        Ok(())
    }

    /// The bootstrap activation window `[min, max)` converted to ticks.
    ///
    /// # Errors
    ///
    /// Returns [`GrowthError::ArithmeticOverflow`] if either bound overflows.
    pub fn passion_window_ticks(&self) -> Result<(u64, u64), GrowthError> {
        let min = self
            .passion_window_min_years
            .checked_mul(TICKS_PER_YEAR)
            .ok_or_else(|| GrowthError::ArithmeticOverflow {
                context: String::from("passion window lower bound"),
            })?;
        let max = self
            .passion_window_max_years
            .checked_mul(TICKS_PER_YEAR)
            .ok_or_else(|| GrowthError::ArithmeticOverflow {
                context: String::from("passion window upper bound"),
            })?;
        Ok((min, max))
    }
}

fn invalid(reason: &str) -> GrowthError {
    GrowthError::InvalidConfig {
        reason: String::from(reason),
    }
}

const fn default_child_trait_target() -> usize {
    2
}
const fn default_adolescent_trait_target() -> usize {
    2
}
const fn default_adult_trait_target() -> usize {
    3
}
const fn default_adolescent_trait_limit() -> usize {
    2
}
const fn default_max_draw_attempts() -> u32 {
    300
}
const fn default_bootstrap_passions_min() -> u32 {
    5
}
const fn default_bootstrap_passions_max() -> u32 {
    7
}
const fn default_passion_window_min_years() -> u64 {
    7
}
const fn default_passion_window_max_years() -> u64 {
    14
}
const fn default_skill_gain_passion_odds() -> u32 {
    7
}
const fn default_fear_chance_pct() -> u32 {
    50
}
const fn default_true() -> bool {
    true
}
fn default_never_drafted() -> Vec<TraitId> {
    ["Bloodlust", "Psychopath", "Cannibal", "Wimp"]
        .into_iter()
        .map(TraitId::from)
        .collect()
}
fn default_transient_trait() -> TraitId {
    TraitId::from("Wimp")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_values() {
        let cfg = GrowthConfig::default();
        assert_eq!(cfg.child_trait_target, 2);
        assert_eq!(cfg.adolescent_trait_target, 2);
        assert_eq!(cfg.adult_trait_target, 3);
        assert_eq!(cfg.max_draw_attempts, 300);
        assert_eq!(cfg.bootstrap_passions_min, 5);
        assert_eq!(cfg.bootstrap_passions_max, 7);
        assert_eq!(cfg.skill_gain_passion_odds, 7);
        assert_eq!(cfg.fear_chance_pct, 50);
        assert_eq!(cfg.transient_trait, TraitId::from("Wimp"));
        assert!(cfg.validate().is_ok());
    }

    #[test]
    fn passion_window_in_ticks() {
        let cfg = GrowthConfig::default();
        assert_eq!(
            cfg.passion_window_ticks().ok(),
            Some((7 * 3_600_000, 14 * 3_600_000))
        );
    }

    #[test]
    fn rejects_inverted_passion_count() {
        let cfg = GrowthConfig {
            bootstrap_passions_min: 8,
            ..GrowthConfig::default()
        };
        assert!(matches!(
            cfg.validate(),
            Err(GrowthError::InvalidConfig { .. })
        ));
    }

    #[test]
    fn rejects_empty_window() {
        let cfg = GrowthConfig {
            passion_window_min_years: 14,
            ..GrowthConfig::default()
        };
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn rejects_zero_odds_and_attempts() {
        let cfg = GrowthConfig {
            skill_gain_passion_odds: 0,
            ..GrowthConfig::default()
        };
        assert!(cfg.validate().is_err());

        let cfg = GrowthConfig {
            max_draw_attempts: 0,
            ..GrowthConfig::default()
        };
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn rejects_overflowing_window() {
        let cfg = GrowthConfig {
            passion_window_max_years: u64::MAX,
            ..GrowthConfig::default()
        };
        assert!(matches!(
            cfg.validate(),
            Err(GrowthError::ArithmeticOverflow { .. })
        ));
    }

    #[test]
    fn partial_section_fills_defaults() {
        let cfg: Result<GrowthConfig, _> =
            serde_json::from_str(r#"{ "adult_trait_target": 4, "fear_chance_pct": 80 }"#);
        let cfg = cfg.ok();
        assert_eq!(cfg.as_ref().map(|c| c.adult_trait_target), Some(4));
        assert_eq!(cfg.as_ref().map(|c| c.fear_chance_pct), Some(80));
        assert_eq!(cfg.map(|c| c.child_trait_target), Some(2));
    }
}
