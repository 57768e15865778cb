//! Colony surroundings that feed the fear evaluators.
//!
//! A deliberately small model: weather alternates between clear skies and
//! thunderstorms, and raids occasionally bring hostiles who aim at the
//! colony for a while. Day and night come from the [`WorldClock`].
//!
//! [`WorldClock`]: crate::clock::WorldClock

use rand::Rng;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::config::EnvironmentConfig;

/// Current weather.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum Weather {
    /// Nothing noteworthy.
    #[default]
    Clear,
    /// Thunder and lightning.
    Thunderstorm,
}

/// Weather and raid state shared by every colonist.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Environment {
    weather: Weather,
    weather_age_ticks: u64,
    raid_remaining_ticks: u64,
    raid_aimers: u32,
}

impl Environment {
    /// Clear skies, no raid.
    pub const fn new() -> Self {
        Self {
            weather: Weather::Clear,
            weather_age_ticks: 0,
            raid_remaining_ticks: 0,
            raid_aimers: 0,
        }
    }

    /// Advance weather and raids by `ticks`.
    pub fn advance(&mut self, config: &EnvironmentConfig, ticks: u64, rng: &mut impl Rng) {
        self.weather_age_ticks = self.weather_age_ticks.saturating_add(ticks);
        let storm_over = self.weather_age_ticks >= config.thunderstorm_duration_ticks;
        match self.weather {
            Weather::Thunderstorm if storm_over => {
                info!("Thunderstorm passed");
                self.set_weather(Weather::Clear);
            }
            Weather::Clear if roll_pct(config.thunderstorm_chance_pct, rng) => {
                info!("Thunderstorm started");
                self.set_weather(Weather::Thunderstorm);
            }
            Weather::Clear | Weather::Thunderstorm => {}
        }

        if self.raid_remaining_ticks > 0 {
            self.raid_remaining_ticks = self.raid_remaining_ticks.saturating_sub(ticks);
            if self.raid_remaining_ticks == 0 {
                info!("Raid ended");
                self.raid_aimers = 0;
            }
        } else if config.raid_aimers > 0 && roll_pct(config.raid_chance_pct, rng) {
            info!(aimers = config.raid_aimers, "Raid started");
            self.raid_remaining_ticks = config.raid_duration_ticks;
            self.raid_aimers = config.raid_aimers;
        }
    }

    /// Force the weather, resetting its age.
    pub const fn set_weather(&mut self, weather: Weather) {
        self.weather = weather;
        self.weather_age_ticks = 0;
    }

    /// Start a raid immediately.
    pub const fn start_raid(&mut self, aimers: u32, duration_ticks: u64) {
        self.raid_aimers = aimers;
        self.raid_remaining_ticks = duration_ticks;
    }

    /// Current weather.
    pub const fn weather(&self) -> Weather {
        self.weather
    }

    /// Ticks the current weather has lasted.
    pub const fn weather_age_ticks(&self) -> u64 {
        self.weather_age_ticks
    }

    /// Whether a thunderstorm is under way.
    pub const fn is_thunderstorm(&self) -> bool {
        matches!(self.weather, Weather::Thunderstorm)
    }

    /// Hostiles currently aiming at the colony.
    pub const fn hostile_aimers(&self) -> u32 {
        if self.raid_remaining_ticks > 0 {
            self.raid_aimers
        } else {
            0
        }
    }
}

fn roll_pct(pct: u32, rng: &mut impl Rng) -> bool {
    pct > 0 && rng.random_range(1..=100_u32) <= pct
}

#[cfg(test)]
mod tests {
    use rand::SeedableRng;
    use rand::rngs::SmallRng;

    use super::*;

    fn calm() -> EnvironmentConfig {
        EnvironmentConfig {
            thunderstorm_chance_pct: 0,
            raid_chance_pct: 0,
            ..EnvironmentConfig::default()
        }
    }

    #[test]
    fn calm_world_stays_calm() {
        let mut rng = SmallRng::seed_from_u64(42);
        let mut env = Environment::new();
        for _ in 0..100 {
            env.advance(&calm(), 2500, &mut rng);
        }
        assert_eq!(env.weather(), Weather::Clear);
        assert_eq!(env.hostile_aimers(), 0);
        assert_eq!(env.weather_age_ticks(), 250_000);
    }

    #[test]
    fn storm_ages_then_passes() {
        let mut rng = SmallRng::seed_from_u64(42);
        let config = calm();
        let mut env = Environment::new();
        env.set_weather(Weather::Thunderstorm);
        env.advance(&config, 2500, &mut rng);
        assert!(env.is_thunderstorm());
        assert_eq!(env.weather_age_ticks(), 2500);

        let steps = config.thunderstorm_duration_ticks / 2500;
        for _ in 0..steps {
            env.advance(&config, 2500, &mut rng);
        }
        assert_eq!(env.weather(), Weather::Clear);
    }

    #[test]
    fn certain_storm_chance_starts_storm() {
        let mut rng = SmallRng::seed_from_u64(42);
        let config = EnvironmentConfig {
            thunderstorm_chance_pct: 100,
            ..calm()
        };
        let mut env = Environment::new();
        env.advance(&config, 2500, &mut rng);
        assert!(env.is_thunderstorm());
        assert_eq!(env.weather_age_ticks(), 0);
    }

    #[test]
    fn raid_brings_aimers_until_it_ends() {
        let mut rng = SmallRng::seed_from_u64(42);
        let config = calm();
        let mut env = Environment::new();
        env.start_raid(4, 5000);
        assert_eq!(env.hostile_aimers(), 4);
        env.advance(&config, 2500, &mut rng);
        assert_eq!(env.hostile_aimers(), 4);
        env.advance(&config, 2500, &mut rng);
        assert_eq!(env.hostile_aimers(), 0);
    }

    #[test]
    fn certain_raid_chance_starts_raid() {
        let mut rng = SmallRng::seed_from_u64(42);
        let config = EnvironmentConfig {
            raid_chance_pct: 100,
            ..calm()
        };
        let mut env = Environment::new();
        env.advance(&config, 2500, &mut rng);
        assert_eq!(env.hostile_aimers(), config.raid_aimers);
    }
}
