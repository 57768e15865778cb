//! Error types for the engine binary.
//!
//! [`EngineError`] is the top-level error type that wraps all possible
//! failure modes during startup, the simulation run and shutdown.

/// Top-level error for the engine binary.
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    /// Configuration loading failed.
    #[error("config error: {source}")]
    Config {
        /// The underlying config error.
        #[from]
        source: ageist_core::ConfigError,
    },

    /// The built-in trait catalog was inconsistent.
    #[error("catalog error: {source}")]
    Catalog {
        /// The underlying growth error.
        #[from]
        source: ageist_growth::GrowthError,
    },

    /// Saving or restoring a snapshot failed.
    #[error("snapshot error: {source}")]
    Persist {
        /// The underlying persistence error.
        #[from]
        source: ageist_core::PersistError,
    },

    /// Simulation runner failed.
    #[error("runner error: {source}")]
    Runner {
        /// The underlying runner error.
        #[from]
        source: ageist_core::RunnerError,
    },

    /// Colonist spawning failed.
    #[error("spawner error: {message}")]
    Spawner {
        /// Description of the spawner failure.
        message: String,
    },
}
