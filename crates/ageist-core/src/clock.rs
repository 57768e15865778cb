//! World clock for the Ageist simulation.
//!
//! The simulation advances in steps; each step moves game time forward by
//! a fixed number of ticks (the same ticks agents age in). The clock owns
//! both counters and derives day/night from the game tick.
//!
//! All derivations use checked arithmetic (no silent overflow). The game
//! tick is the source of truth for time of day and is never stored
//! anywhere else.

use ageist_types::TICKS_PER_DAY;
use serde::{Deserialize, Serialize};

/// Tick of the day at which day begins.
const DAWN: u64 = TICKS_PER_DAY / 4;

/// Tick of the day at which night begins.
const DUSK: u64 = TICKS_PER_DAY - DAWN;

/// Errors that can occur during clock operations.
#[derive(Debug, thiserror::Error)]
pub enum ClockError {
    /// Step or tick counter would overflow.
    #[error("clock overflow: cannot advance beyond u64::MAX")]
    TickOverflow,

    /// Invalid clock configuration (e.g. zero ticks per step).
    #[error("invalid clock configuration: {reason}")]
    InvalidConfig {
        /// Explanation of what is wrong with the configuration.
        reason: String,
    },
}

/// Half of the day, derived from the game tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DayPhase {
    /// From dawn (a quarter into the day) until dusk (three quarters in).
    Day,
    /// From dusk until the next dawn.
    Night,
}

/// World clock tracking simulation steps and game ticks.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorldClock {
    /// Completed simulation steps.
    step: u64,

    /// Game ticks elapsed since the start of the simulation.
    game_tick: u64,

    /// Game ticks advanced per step (from configuration).
    ticks_per_step: u64,
}

impl WorldClock {
    /// Create a clock at step 0.
    ///
    /// # Errors
    ///
    /// Returns [`ClockError::InvalidConfig`] if `ticks_per_step` is 0.
    pub fn new(ticks_per_step: u64) -> Result<Self, ClockError> {
        Self::from_parts(0, 0, ticks_per_step)
    }

    /// Create a clock from explicit parameters (used for state restoration).
    ///
    /// # Errors
    ///
    /// Returns [`ClockError::InvalidConfig`] if `ticks_per_step` is 0.
    pub fn from_parts(step: u64, game_tick: u64, ticks_per_step: u64) -> Result<Self, ClockError> {
        if ticks_per_step == 0 {
            return Err(ClockError::InvalidConfig {
                reason: "ticks_per_step must be at least 1".to_owned(),
            });
        }
        Ok(Self {
            step,
            game_tick,
            ticks_per_step,
        })
    }

    /// Advance by one step. Returns the new step number.
    ///
    /// # Errors
    ///
    /// Returns [`ClockError::TickOverflow`] if either counter would exceed
    /// `u64::MAX`.
    pub fn advance(&mut self) -> Result<u64, ClockError> {
        let step = self.step.checked_add(1).ok_or(ClockError::TickOverflow)?;
        let game_tick = self
            .game_tick
            .checked_add(self.ticks_per_step)
            .ok_or(ClockError::TickOverflow)?;
        self.step = step;
        self.game_tick = game_tick;
        Ok(step)
    }

    /// Completed steps.
    pub const fn step(&self) -> u64 {
        self.step
    }

    /// Game ticks elapsed.
    pub const fn game_tick(&self) -> u64 {
        self.game_tick
    }

    /// Game ticks per step.
    pub const fn ticks_per_step(&self) -> u64 {
        self.ticks_per_step
    }

    /// Ticks into the current day.
    pub const fn tick_of_day(&self) -> u64 {
        self.game_tick % TICKS_PER_DAY
    }

    /// Day or night at the current game tick.
    pub const fn day_phase(&self) -> DayPhase {
        let tick = self.tick_of_day();
        if tick >= DAWN && tick < DUSK {
            DayPhase::Day
        } else {
            DayPhase::Night
        }
    }
}
