//! Shared type definitions for the Ageist growth simulation.
//!
//! This crate is the single source of truth for data that crosses crate
//! boundaries: identifiers, life stages, skills, traits, biography slots,
//! history counters, and the host-side [`AgentProfile`].
//!
//! # Modules
//!
//! - [`ids`] -- Type-safe UUID wrappers for agent identifiers
//! - [`enums`] -- Life stages, skills, passion tiers, fear kinds
//! - [`structs`] -- Traits, skill records, biography, history, agent profile

pub mod enums;
pub mod ids;
pub mod structs;

// Re-export all public types at crate root for convenience.
pub use enums::{FearKind, LifeStage, Passion, Skill};
pub use ids::AgentId;
pub use structs::{
    AgentHistory, AgentProfile, Backstory, Biography, DAYS_PER_YEAR, SkillRecord, TICKS_PER_DAY,
    TICKS_PER_YEAR, Trait, TraitId,
};
