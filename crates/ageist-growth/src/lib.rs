//! Growth stage engine for the Ageist simulation.
//!
//! Attaches an age-progression model to humanoid agents: a tick-driven
//! stage controller with one-shot entry effects, the childhood
//! retrospective that turns accumulated history into traits and biography
//! text, a deferred passion scheduler, and a per-agent fear registry with
//! its stage-gated evaluators.
//!
//! Nothing here owns an agent. The host exposes its agents through
//! [`GrowthHost`] and injects the random source, so every pass is
//! reproducible from a seed.
//!
//! # Modules
//!
//! - [`catalog`] -- Statically registered trait definitions ([`TraitCatalog`])
//! - [`config`] -- Tunable parameters ([`GrowthConfig`])
//! - [`error`] -- Setup and validation errors ([`GrowthError`])
//! - [`evaluators`] -- Dark, thunder and gunfire fear evaluators
//! - [`fears`] -- Per-agent fear registry ([`FearRegistry`])
//! - [`growth`] -- Stage controller ([`GrowthEngine`], [`GrowthState`])
//! - [`host`] -- Collaborator seam ([`GrowthHost`])
//! - [`passions`] -- Deferred passion grants ([`PassionScheduler`])
//! - [`retrospective`] -- History-driven trait and biography generation

pub mod catalog;
pub mod config;
pub mod error;
pub mod evaluators;
pub mod fears;
pub mod growth;
pub mod host;
pub mod passions;
pub mod retrospective;

pub use catalog::{TraitCatalog, TraitDef, default_catalog};
pub use config::GrowthConfig;
pub use error::GrowthError;
pub use evaluators::{
    DarkFear, FearContext, FearEvaluator, FearEvaluators, FearThought, GunfireFear, ThunderFear,
    evaluate_fear,
};
pub use fears::{FearRegistry, FearRepair};
pub use growth::{
    EntryStep, GrowthEngine, GrowthEvent, GrowthState, TickOutcome, entry_steps, recompute_stage,
};
pub use host::GrowthHost;
pub use passions::{PassionEvent, PassionGrant, PassionScheduler};
pub use retrospective::{ChildhoodFeat, DescriptionBuilder, RetrospectiveOutcome, run_retrospective};
