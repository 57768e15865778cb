//! A colonist: the host profile plus its optional growth state.
//!
//! Growth state is attached only to colonists who are not yet adults and
//! is detached once the growth engine asks for removal. The fear
//! evaluators keep transient per-agent buffers and are not persisted.

use ageist_growth::{FearEvaluators, GrowthState};
use ageist_types::{AgentId, AgentProfile, LifeStage};
use serde::{Deserialize, Serialize};

/// One simulated colonist.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Colonist {
    /// Host-side profile the growth engine reads and mutates.
    pub profile: AgentProfile,

    /// Growth state while the colonist is still growing up.
    pub growth: Option<GrowthState>,

    /// Per-agent fear evaluators (repeat buffers are transient).
    #[serde(skip)]
    pub fears: FearEvaluators,

    /// Ticks since the colonist last stood in light.
    #[serde(default)]
    pub ticks_since_light: u64,
}

impl Colonist {
    /// Wrap a profile, attaching growth state unless it is already adult.
    pub fn new(profile: AgentProfile) -> Self {
        let growing = LifeStage::from_index(profile.life_stage_index) < LifeStage::Adult;
        Self {
            profile,
            growth: growing.then(GrowthState::new),
            fears: FearEvaluators::default(),
            ticks_since_light: 0,
        }
    }

    /// The colonist's identifier.
    pub const fn id(&self) -> AgentId {
        self.profile.id
    }

    /// Whether growth state is still attached.
    pub const fn is_growing(&self) -> bool {
        self.growth.is_some()
    }
}
