//! Simulation loop runner.
//!
//! [`run_simulation`] drives the step loop until one of:
//!
//! - **Step limit**: `max_steps` steps have run (0 means unbounded)
//! - **Nobody growing**: every colonist has reached adulthood and had its
//!   growth state detached
//!
//! The runner wraps the single-step [`run_tick`] function, paces it with
//! the configured step interval and reports each step to a callback.
//!
//! [`run_tick`]: crate::tick::run_tick

use tracing::{info, warn};

use crate::tick::{self, SimulationState, TickError, TickSummary};

/// Errors that can occur during the simulation run.
#[derive(Debug, thiserror::Error)]
pub enum RunnerError {
    /// A step execution failed.
    #[error("tick error: {source}")]
    Tick {
        /// The underlying tick error.
        #[from]
        source: TickError,
    },
}

/// Why the simulation stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SimulationEndReason {
    /// The configured step limit was reached.
    MaxStepsReached,
    /// No colonist carries growth state any more.
    NoneGrowing,
}

/// Result of the simulation run.
#[derive(Debug)]
pub struct SimulationResult {
    /// The reason the simulation ended.
    pub end_reason: SimulationEndReason,
    /// The last step summary, if any step completed.
    pub final_summary: Option<TickSummary>,
    /// Total number of steps executed.
    pub total_steps: u64,
}

/// Callback invoked after each step completes.
pub trait TickCallback: Send {
    /// Called after a step completes successfully.
    fn on_tick(&mut self, summary: &TickSummary, state: &SimulationState);
}

/// A no-op step callback for testing.
pub struct NoOpCallback;

impl TickCallback for NoOpCallback {
    fn on_tick(&mut self, _summary: &TickSummary, _state: &SimulationState) {}
}

/// Run the simulation loop until a termination condition is met.
///
/// # Errors
///
/// Returns [`RunnerError`] if a step fails unrecoverably.
pub async fn run_simulation(
    state: &mut SimulationState,
    callback: &mut dyn TickCallback,
) -> Result<SimulationResult, RunnerError> {
    let max_steps = state.config.simulation.max_steps;
    let interval_ms = state.config.world.tick_interval_ms;
    let mut last_summary: Option<TickSummary> = None;
    let mut total_steps: u64 = 0;

    info!(
        max_steps,
        interval_ms,
        colonists = state.colonists.len(),
        growing = state.growing_count(),
        "Simulation starting"
    );

    loop {
        // --- Check for anyone left to grow (before step) ---
        if state.growing_count() == 0 {
            info!(step = state.clock.step(), "No colonists left growing");
            return Ok(SimulationResult {
                end_reason: SimulationEndReason::NoneGrowing,
                final_summary: last_summary,
                total_steps,
            });
        }

        // --- Execute step ---
        let summary = tick::run_tick(state)?;
        total_steps = total_steps.saturating_add(1);

        callback.on_tick(&summary, state);

        // --- Check step limit (after step) ---
        if max_steps > 0 && total_steps >= max_steps {
            info!(step = summary.step, max_steps, "Step limit reached");
            return Ok(SimulationResult {
                end_reason: SimulationEndReason::MaxStepsReached,
                final_summary: Some(summary),
                total_steps,
            });
        }

        last_summary = Some(summary);

        if interval_ms > 0 {
            tokio::time::sleep(tokio::time::Duration::from_millis(interval_ms)).await;
        }
    }
}

/// Log the simulation end sequence.
pub fn log_simulation_end(result: &SimulationResult) {
    info!(
        reason = ?result.end_reason,
        total_steps = result.total_steps,
        final_step = result.final_summary.as_ref().map(|s| s.step),
        "Simulation ended"
    );

    if let Some(ref summary) = result.final_summary {
        info!(
            step = summary.step,
            game_tick = summary.game_tick,
            colonists = summary.colonists,
            growing = summary.growing,
            weather = ?summary.weather,
            "Final step summary"
        );
    } else {
        warn!("Simulation ended with no steps executed");
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::arithmetic_side_effects)]
mod tests {
    use ageist_growth::{TraitCatalog, default_catalog};
    use ageist_types::{AgentProfile, TICKS_PER_YEAR};

    use super::*;
    use crate::colonist::Colonist;
    use crate::config::AgeistConfig;

    fn catalog() -> TraitCatalog {
        default_catalog().unwrap()
    }

    fn make_state(max_steps: u64, age_years: u64) -> SimulationState {
        let mut config = AgeistConfig::default();
        config.simulation.max_steps = max_steps;
        let mut profile = AgentProfile::new("Nia");
        profile.age_biological_ticks = age_years * TICKS_PER_YEAR;
        profile.life_stage_index = config
            .population
            .life_stage_index(profile.age_biological_ticks);
        SimulationState::new(config, catalog(), vec![Colonist::new(profile)]).unwrap()
    }

    #[tokio::test]
    async fn bounded_by_max_steps() {
        let mut state = make_state(5, 2);
        let result = run_simulation(&mut state, &mut NoOpCallback).await.unwrap();
        assert_eq!(result.end_reason, SimulationEndReason::MaxStepsReached);
        assert_eq!(result.total_steps, 5);
        assert_eq!(state.clock.step(), 5);
    }

    #[tokio::test]
    async fn adults_only_stop_immediately() {
        let mut state = make_state(0, 40);
        let result = run_simulation(&mut state, &mut NoOpCallback).await.unwrap();
        assert_eq!(result.end_reason, SimulationEndReason::NoneGrowing);
        assert_eq!(result.total_steps, 0);
        assert!(result.final_summary.is_none());
    }

    #[tokio::test]
    async fn unbounded_run_ends_when_everyone_grew_up() {
        let mut state = make_state(0, 17);
        let result = run_simulation(&mut state, &mut NoOpCallback).await.unwrap();
        assert_eq!(result.end_reason, SimulationEndReason::NoneGrowing);
        // One year of 2500-tick steps.
        assert_eq!(result.total_steps, TICKS_PER_YEAR / 2500);
    }

    #[tokio::test]
    async fn tick_callback_is_called() {
        struct CountCallback {
            count: u64,
        }
        impl TickCallback for CountCallback {
            fn on_tick(&mut self, _summary: &TickSummary, _state: &SimulationState) {
                self.count = self.count.saturating_add(1);
            }
        }

        let mut state = make_state(3, 8);
        let mut cb = CountCallback { count: 0 };
        let _ = run_simulation(&mut state, &mut cb).await.unwrap();
        assert_eq!(cb.count, 3);
    }
}
