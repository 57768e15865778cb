//! The collaborator seam between the growth engine and the host simulation.
//!
//! The engine never owns an agent. Everything it reads (age, skills,
//! traits, history) and everything it mutates (skill table, trait set,
//! biography slots) goes through [`GrowthHost`], so any host can attach
//! growth to its own agent representation. [`AgentProfile`] is the
//! in-tree implementation used by `ageist-core` and by the tests.

use std::collections::BTreeMap;

use ageist_types::{
    AgentHistory, AgentId, AgentProfile, Biography, Skill, SkillRecord, TICKS_PER_DAY,
    TICKS_PER_YEAR, Trait, TraitId,
};

/// Host-side accessors the growth engine needs from an agent.
pub trait GrowthHost {
    /// Identifier used in log fields.
    fn agent_id(&self) -> AgentId;

    /// Short display name used in notifications and biography text.
    fn display_name(&self) -> &str;

    /// Biological age in ticks.
    fn age_biological_ticks(&self) -> u64;

    /// Life-stage index from the host's own lifecycle model.
    fn life_stage_index(&self) -> usize;

    /// The skill table.
    fn skills(&self) -> &BTreeMap<Skill, SkillRecord>;

    /// Mutable access to the skill table.
    fn skills_mut(&mut self) -> &mut BTreeMap<Skill, SkillRecord>;

    /// Held traits in acquisition order.
    fn traits(&self) -> &[Trait];

    /// Mutable access to the trait list.
    fn traits_mut(&mut self) -> &mut Vec<Trait>;

    /// Biography slots.
    fn biography(&self) -> &Biography;

    /// Mutable access to the biography slots.
    fn biography_mut(&mut self) -> &mut Biography;

    /// Aggregate history counters.
    fn history(&self) -> &AgentHistory;

    /// Whether the agent has any bionic or artificial part installed.
    fn has_bionic_part(&self) -> bool;

    /// Whether the agent is awake.
    fn is_awake(&self) -> bool;

    /// Whether the agent is in an exceptional mental state.
    fn in_mental_state(&self) -> bool;

    /// Biological age in whole years.
    fn age_biological_years(&self) -> u64 {
        self.age_biological_ticks() / TICKS_PER_YEAR
    }

    /// Biological age in whole days.
    fn age_biological_days(&self) -> u64 {
        self.age_biological_ticks() / TICKS_PER_DAY
    }

    /// Whether the agent holds a trait of the given definition.
    fn has_trait(&self, def: &TraitId) -> bool {
        self.traits().iter().any(|t| &t.def == def)
    }

    /// Sum of all skill levels, saturating.
    fn skill_total(&self) -> u32 {
        self.skills()
            .values()
            .fold(0_u32, |acc, record| acc.saturating_add(record.level))
    }
}

impl GrowthHost for AgentProfile {
    fn agent_id(&self) -> AgentId {
        self.id
    }

    fn display_name(&self) -> &str {
        &self.name
    }

    fn age_biological_ticks(&self) -> u64 {
        self.age_biological_ticks
    }

    fn life_stage_index(&self) -> usize {
        self.life_stage_index
    }

    fn skills(&self) -> &BTreeMap<Skill, SkillRecord> {
        &self.skills
    }

    fn skills_mut(&mut self) -> &mut BTreeMap<Skill, SkillRecord> {
        &mut self.skills
    }

    fn traits(&self) -> &[Trait] {
        &self.traits
    }

    fn traits_mut(&mut self) -> &mut Vec<Trait> {
        &mut self.traits
    }

    fn biography(&self) -> &Biography {
        &self.biography
    }

    fn biography_mut(&mut self) -> &mut Biography {
        &mut self.biography
    }

    fn history(&self) -> &AgentHistory {
        &self.history
    }

    fn has_bionic_part(&self) -> bool {
        self.bionic_parts > 0
    }

    fn is_awake(&self) -> bool {
        self.awake
    }

    fn in_mental_state(&self) -> bool {
        self.mental_state.is_some()
    }
}
