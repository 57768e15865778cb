//! World clock, step cycle, persistence and orchestration for the Ageist
//! simulation.
//!
//! This crate hosts colonists for the growth engine in `ageist-growth`:
//! it ages them, feeds their fear evaluators from a small environment
//! model, and persists the whole run.
//!
//! # Modules
//!
//! - [`activity`] -- Skill practice and chores for awake colonists.
//! - [`clock`] -- World clock with step counter and day/night derivation.
//! - [`colonist`] -- Host profile plus optional growth state.
//! - [`config`] -- Configuration loading from `ageist-config.yaml` into
//!   strongly-typed structs.
//! - [`environment`] -- Weather and raids.
//! - [`persist`] -- Snapshot save and restore.
//! - [`runner`] -- Bounded async simulation loop.
//! - [`tick`] -- The per-step cycle.

pub mod activity;
pub mod clock;
pub mod colonist;
pub mod config;
pub mod environment;
pub mod persist;
pub mod runner;
pub mod tick;

pub use colonist::Colonist;
pub use config::{AgeistConfig, ConfigError};
pub use persist::{
    PersistError, Snapshot, read_snapshot, restore_snapshot, save_snapshot, write_snapshot,
};
pub use runner::{
    NoOpCallback, RunnerError, SimulationEndReason, SimulationResult, TickCallback,
    run_simulation,
};
pub use tick::{SimulationState, TickError, TickSummary, run_tick};
