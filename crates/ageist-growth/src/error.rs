//! Error types for the ageist-growth crate.
//!
//! Nothing inside a growth tick returns these: per-tick failures degrade to
//! skipping the optional effect and are logged. These errors cover the
//! fallible setup paths around the tick: configuration and catalog
//! validation, and arithmetic that feeds persisted values.

use ageist_types::TraitId;

/// Errors that can occur while configuring or validating the growth engine.
#[derive(Debug, thiserror::Error)]
pub enum GrowthError {
    /// A trait identifier was not found in the catalog.
    #[error("unknown trait: {0}")]
    UnknownTrait(TraitId),

    /// A catalog entry declares a conflict with an unregistered trait.
    #[error("trait {owner} declares a conflict with unregistered trait {missing}")]
    DanglingConflict {
        /// The trait whose definition names the conflict.
        owner: TraitId,
        /// The conflict target missing from the catalog.
        missing: TraitId,
    },

    /// The same trait was registered twice.
    #[error("duplicate trait definition: {0}")]
    DuplicateTrait(TraitId),

    /// A configuration value is out of range.
    #[error("invalid growth config: {reason}")]
    InvalidConfig {
        /// Description of the offending value.
        reason: String,
    },

    /// An arithmetic overflow occurred.
    #[error("arithmetic overflow: {context}")]
    ArithmeticOverflow {
        /// Description of what was being computed.
        context: String,
    },
}
