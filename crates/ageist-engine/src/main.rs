//! Engine binary for the Ageist simulation.
//!
//! Wires together configuration, the colonist spawner, the step loop and
//! snapshots, then runs until the step limit is reached or every colonist
//! has grown up.
//!
//! # Startup Sequence
//!
//! 1. Load configuration from `$AGEIST_CONFIG` or `ageist-config.yaml`
//! 2. Initialize structured logging (tracing)
//! 3. Build the trait catalog
//! 4. Restore from the configured snapshot, or spawn fresh colonists
//! 5. Run the simulation loop
//! 6. Write the final snapshot, if configured, and log the result

mod error;
mod progress_callback;
mod spawner;

use std::path::{Path, PathBuf};

use ageist_core::{AgeistConfig, SimulationState, read_snapshot, restore_snapshot, runner};
use ageist_growth::default_catalog;
use rand::SeedableRng;
use rand::rngs::StdRng;
use tracing::info;
use tracing_subscriber::EnvFilter;

use crate::error::EngineError;
use crate::progress_callback::ProgressCallback;

/// Environment variable naming the config file.
const CONFIG_ENV: &str = "AGEIST_CONFIG";

/// Config file used when [`CONFIG_ENV`] is unset.
const DEFAULT_CONFIG_PATH: &str = "ageist-config.yaml";

/// Steps between progress reports (one in-game day at the default step).
const REPORT_EVERY_STEPS: u64 = 24;

/// Application entry point for the engine.
///
/// # Errors
///
/// Returns an error if any initialization step or the simulation itself fails.
#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // 1. Load configuration.
    let config_path = config_path();
    let config = load_config(&config_path)?;

    // 2. Initialize structured logging.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(&config.logging.level)),
        )
        .with_target(true)
        .init();

    info!("ageist-engine starting");
    info!(
        path = %config_path.display(),
        found = config_path.exists(),
        seed = config.world.seed,
        ticks_per_step = config.world.ticks_per_step,
        max_steps = config.simulation.max_steps,
        "Configuration loaded"
    );

    // 3. Build the trait catalog.
    let catalog = default_catalog().map_err(EngineError::from)?;
    info!(traits = catalog.len(), "Trait catalog ready");

    // 4. Restore or spawn.
    let snapshot_path = config.simulation.snapshot_path.clone().map(PathBuf::from);
    let mut state = match snapshot_path.as_deref().filter(|p| p.exists()) {
        Some(path) => {
            let snapshot = read_snapshot(path).map_err(EngineError::from)?;
            let state = restore_snapshot(snapshot, config, catalog).map_err(EngineError::from)?;
            info!(
                path = %path.display(),
                step = state.clock.step(),
                colonists = state.colonists.len(),
                "Resumed from snapshot"
            );
            state
        }
        None => {
            let mut rng = StdRng::seed_from_u64(config.world.seed);
            let colonists = spawner::spawn_colonists(&config.population, &mut rng)?;
            info!(colonists = colonists.len(), "Colonists spawned");
            SimulationState::new(config, catalog, colonists).map_err(EngineError::from)?
        }
    };

    // 5. Run the simulation.
    let mut callback = ProgressCallback::new(REPORT_EVERY_STEPS);
    let result = runner::run_simulation(&mut state, &mut callback)
        .await
        .map_err(EngineError::from)?;

    // 6. Persist and log results.
    if let Some(path) = snapshot_path.as_deref() {
        ageist_core::write_snapshot(path, &state).map_err(EngineError::from)?;
    }
    runner::log_simulation_end(&result);

    let totals = callback.totals();
    info!(
        end_reason = ?result.end_reason,
        total_steps = result.total_steps,
        stages_entered = totals.stages_entered,
        traits_granted = totals.traits_granted,
        passions_gained = totals.passions_gained,
        fears_surfaced = totals.fears_surfaced,
        graduated = totals.graduated,
        "ageist-engine shutdown complete"
    );

    Ok(())
}

/// Config file path from [`CONFIG_ENV`], falling back to
/// [`DEFAULT_CONFIG_PATH`].
fn config_path() -> PathBuf {
    std::env::var_os(CONFIG_ENV).map_or_else(|| PathBuf::from(DEFAULT_CONFIG_PATH), PathBuf::from)
}

/// Load the simulation configuration, using defaults if the file is absent.
fn load_config(path: &Path) -> Result<AgeistConfig, EngineError> {
    if path.exists() {
        Ok(AgeistConfig::from_file(path)?)
    } else {
        Ok(AgeistConfig::default())
    }
}
