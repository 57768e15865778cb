//! Save and restore of simulation state.
//!
//! A snapshot carries everything needed to resume a run: clock counters,
//! weather and raid state, and every colonist including its growth state
//! (applied stage, bootstrap flag, fear registry, pending passion events).
//! Fear repeat buffers are transient and restart from zero.
//!
//! The random number generator is not serialized; a restored run reseeds
//! from the world seed mixed with the saved step.

use std::path::Path;

use ageist_growth::{GrowthEngine, TraitCatalog};
use rand::SeedableRng;
use rand::rngs::StdRng;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::clock::{ClockError, WorldClock};
use crate::colonist::Colonist;
use crate::config::{AgeistConfig, ConfigError};
use crate::environment::Environment;
use crate::tick::SimulationState;

/// Current snapshot format version.
pub const SNAPSHOT_VERSION: u32 = 1;

/// Errors that can occur while saving or restoring.
#[derive(Debug, thiserror::Error)]
pub enum PersistError {
    /// Snapshot JSON was malformed.
    #[error("snapshot JSON error: {source}")]
    Json {
        /// The underlying serde error.
        #[from]
        source: serde_json::Error,
    },

    /// Reading or writing the snapshot file failed.
    #[error("snapshot I/O error: {source}")]
    Io {
        /// The underlying I/O error.
        #[from]
        source: std::io::Error,
    },

    /// The saved clock counters were invalid.
    #[error("snapshot clock error: {source}")]
    Clock {
        /// The underlying clock error.
        #[from]
        source: ClockError,
    },

    /// The configuration used to restore was invalid.
    #[error("snapshot config error: {source}")]
    Config {
        /// The underlying configuration error.
        #[from]
        source: ConfigError,
    },

    /// The snapshot was written by an incompatible version.
    #[error("unsupported snapshot version {found} (expected {SNAPSHOT_VERSION})")]
    UnsupportedVersion {
        /// Version found in the snapshot.
        found: u32,
    },
}

/// Serialized simulation state.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Snapshot {
    /// Format version.
    pub version: u32,
    /// Completed steps.
    pub step: u64,
    /// Game tick at save time.
    pub game_tick: u64,
    /// Ticks per step at save time.
    pub ticks_per_step: u64,
    /// Weather and raid state.
    pub environment: Environment,
    /// Every colonist, in id order.
    pub colonists: Vec<Colonist>,
}

/// Capture the current state.
pub fn save_snapshot(state: &SimulationState) -> Snapshot {
    Snapshot {
        version: SNAPSHOT_VERSION,
        step: state.clock.step(),
        game_tick: state.clock.game_tick(),
        ticks_per_step: state.clock.ticks_per_step(),
        environment: state.environment.clone(),
        colonists: state.colonists.values().cloned().collect(),
    }
}

/// Rebuild a simulation from a snapshot.
///
/// # Errors
///
/// Returns [`PersistError`] for a version mismatch, bad clock counters,
/// or an invalid configuration or catalog.
pub fn restore_snapshot(
    snapshot: Snapshot,
    config: AgeistConfig,
    catalog: TraitCatalog,
) -> Result<SimulationState, PersistError> {
    if snapshot.version != SNAPSHOT_VERSION {
        return Err(PersistError::UnsupportedVersion {
            found: snapshot.version,
        });
    }
    config.validate()?;
    let clock = WorldClock::from_parts(snapshot.step, snapshot.game_tick, snapshot.ticks_per_step)?;
    let engine = GrowthEngine::new(catalog, config.growth.clone()).map_err(ConfigError::from)?;
    let rng = StdRng::seed_from_u64(config.world.seed.wrapping_add(snapshot.step));
    Ok(SimulationState {
        clock,
        engine,
        colonists: snapshot
            .colonists
            .into_iter()
            .map(|c| (c.id(), c))
            .collect(),
        environment: snapshot.environment,
        rng,
        config,
    })
}

/// Write a snapshot of `state` to `path` as pretty JSON.
///
/// # Errors
///
/// Returns [`PersistError`] if serialization or the write fails.
pub fn write_snapshot(path: &Path, state: &SimulationState) -> Result<(), PersistError> {
    let snapshot = save_snapshot(state);
    let json = serde_json::to_string_pretty(&snapshot)?;
    std::fs::write(path, json)?;
    info!(
        path = %path.display(),
        step = snapshot.step,
        colonists = snapshot.colonists.len(),
        "Snapshot written"
    );
    Ok(())
}

/// Read a snapshot from `path`.
///
/// # Errors
///
/// Returns [`PersistError`] if the read or deserialization fails.
pub fn read_snapshot(path: &Path) -> Result<Snapshot, PersistError> {
    let json = std::fs::read_to_string(path)?;
    Ok(serde_json::from_str(&json)?)
}

#[cfg(test)]
#[allow(
    clippy::unwrap_used,
    clippy::arithmetic_side_effects,
    clippy::indexing_slicing
)]
mod tests {
    use ageist_growth::{TraitCatalog, default_catalog};
    use ageist_types::{AgentProfile, TICKS_PER_YEAR};

    use super::*;
    use crate::tick::run_tick;

    fn catalog() -> TraitCatalog {
        default_catalog().unwrap()
    }

    fn state_with_child() -> SimulationState {
        let config = AgeistConfig::default();
        let mut profile = AgentProfile::new("Mira");
        profile.age_biological_ticks = 5 * TICKS_PER_YEAR;
        profile.life_stage_index = config.population.life_stage_index(5 * TICKS_PER_YEAR);
        SimulationState::new(config, catalog(), vec![Colonist::new(profile)]).unwrap()
    }

    #[test]
    fn restore_preserves_clock_and_growth() {
        let mut state = state_with_child();
        for _ in 0..10 {
            run_tick(&mut state).unwrap();
        }
        let snapshot = save_snapshot(&state);
        let json = serde_json::to_string(&snapshot).unwrap();
        let parsed: Snapshot = serde_json::from_str(&json).unwrap();
        let restored =
            restore_snapshot(parsed, AgeistConfig::default(), catalog()).unwrap();

        assert_eq!(restored.clock, state.clock);
        assert_eq!(restored.environment, state.environment);
        let before = state.colonists.values().next().unwrap();
        let after = restored.colonists.values().next().unwrap();
        assert_eq!(after.profile, before.profile);
        let (before, after) = (before.growth.as_ref().unwrap(), after.growth.as_ref().unwrap());
        assert_eq!(after.applied_stage(), before.applied_stage());
        assert_eq!(after.current_stage(), before.current_stage());
        assert_eq!(after.is_initialized(), before.is_initialized());
        assert_eq!(after.fears(), before.fears());
        assert_eq!(after.passions(), before.passions());
    }

    #[test]
    fn missing_fear_lists_restore_and_heal() {
        let mut state = state_with_child();
        run_tick(&mut state).unwrap();
        let mut value = serde_json::to_value(save_snapshot(&state)).unwrap();
        let fears = value["colonists"][0]["growth"]["fears"]
            .as_object_mut()
            .unwrap();
        fears.remove("known");
        let snapshot: Snapshot = serde_json::from_value(value).unwrap();

        let mut restored = restore_snapshot(snapshot, AgeistConfig::default(), catalog()).unwrap();
        let growth = |s: &SimulationState| s.colonists.values().next().unwrap().growth.clone();
        assert!(growth(&restored).unwrap().fears().is_corrupted());

        run_tick(&mut restored).unwrap();
        assert!(!growth(&restored).unwrap().fears().is_corrupted());
    }

    #[test]
    fn wrong_version_is_rejected() {
        let mut snapshot = save_snapshot(&state_with_child());
        snapshot.version = 99;
        let result = restore_snapshot(snapshot, AgeistConfig::default(), catalog());
        assert!(matches!(
            result,
            Err(PersistError::UnsupportedVersion { found: 99 })
        ));
    }

    #[test]
    fn mismatched_clock_is_rejected() {
        let mut snapshot = save_snapshot(&state_with_child());
        snapshot.ticks_per_step = 0;
        let result = restore_snapshot(snapshot, AgeistConfig::default(), catalog());
        assert!(matches!(result, Err(PersistError::Clock { .. })));
    }

    #[test]
    fn file_round_trip() {
        let mut state = state_with_child();
        run_tick(&mut state).unwrap();
        let name = format!("ageist-snapshot-{}.json", std::process::id());
        let path = std::env::temp_dir().join(name);
        write_snapshot(&path, &state).unwrap();
        let snapshot = read_snapshot(&path).unwrap();
        std::fs::remove_file(&path).unwrap();
        assert_eq!(snapshot.step, 1);
        assert_eq!(snapshot.colonists.len(), 1);
    }
}
