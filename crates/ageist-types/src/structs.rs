//! Core entity structs for the Ageist growth simulation.
//!
//! [`AgentProfile`] is the host-side view of a humanoid agent: biological
//! age, skill table, trait set, biography slots, and the aggregate history
//! counters the childhood retrospective reads. The growth engine never owns
//! an agent; it mutates one through the `GrowthHost` seam in
//! `ageist-growth`, which [`AgentProfile`] implements.

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

use crate::enums::{Passion, Skill};
use crate::ids::AgentId;

/// Simulation ticks in one in-game day.
pub const TICKS_PER_DAY: u64 = 60_000;

/// In-game days in one year.
pub const DAYS_PER_YEAR: u64 = 60;

/// Simulation ticks in one in-game year.
pub const TICKS_PER_YEAR: u64 = TICKS_PER_DAY * DAYS_PER_YEAR;

// ---------------------------------------------------------------------------
// Traits
// ---------------------------------------------------------------------------

/// Opaque identifier of a trait definition in the trait catalog.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TraitId(String);

impl TraitId {
    /// Create a trait identifier from its definition name.
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    /// The definition name.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl core::fmt::Display for TraitId {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for TraitId {
    fn from(name: &str) -> Self {
        Self::new(name)
    }
}

/// A trait held by an agent: a catalog definition plus its degree.
///
/// Single-degree traits use degree 0. Spectrum traits (nerves,
/// industriousness, ...) carry a signed degree drawn from the catalog.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Trait {
    /// The catalog definition this trait instantiates.
    pub def: TraitId,
    /// Position on the trait's spectrum.
    #[serde(default)]
    pub degree: i8,
}

impl Trait {
    /// A degree-0 trait of the given definition.
    pub fn new(def: impl Into<TraitId>) -> Self {
        Self {
            def: def.into(),
            degree: 0,
        }
    }

    /// A trait of the given definition and degree.
    pub fn with_degree(def: impl Into<TraitId>, degree: i8) -> Self {
        Self {
            def: def.into(),
            degree,
        }
    }
}

// ---------------------------------------------------------------------------
// Skills
// ---------------------------------------------------------------------------

/// One row of the agent's skill table.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SkillRecord {
    /// Current proficiency level.
    pub level: u32,
    /// Current passion tier.
    pub passion: Passion,
}

// ---------------------------------------------------------------------------
// Biography
// ---------------------------------------------------------------------------

/// A biography entry occupying one slot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Backstory {
    /// Full title.
    pub title: String,
    /// Short title.
    pub title_short: String,
    /// Narrative text.
    pub description: String,
}

/// The agent's two biography slots.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Biography {
    /// Childhood slot, written by the childhood retrospective.
    pub childhood: Option<Backstory>,
    /// Adulthood slot, cleared when growth first attaches.
    pub adulthood: Option<Backstory>,
}

// ---------------------------------------------------------------------------
// History
// ---------------------------------------------------------------------------

/// Aggregate counters maintained by other simulated systems.
///
/// The growth engine only reads these; combat, hauling, mining and the
/// rest of the simulation are responsible for incrementing them.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AgentHistory {
    /// Humanlike kills.
    pub kills_humanlike: u32,
    /// Times the agent entered a mental break.
    pub times_in_mental_state: u32,
    /// Cells mined.
    pub cells_mined: u32,
    /// Things hauled.
    pub things_hauled: u32,
    /// Fires extinguished.
    pub fires_extinguished: u32,
    /// Times the agent was set on fire.
    pub times_on_fire: u32,
    /// Shots fired with ranged weapons.
    pub shots_fired: u32,
    /// Total damage dealt.
    pub damage_dealt: u32,
    /// Drugs the agent has ever taken, by definition name.
    pub drugs_taken: BTreeSet<String>,
    /// Whether the agent has eaten humanlike meat.
    pub ate_humanlike_meat: bool,
}

impl AgentHistory {
    /// Whether the agent has ever taken any drug.
    pub fn has_taken_any_drug(&self) -> bool {
        !self.drugs_taken.is_empty()
    }
}

// ---------------------------------------------------------------------------
// Agent
// ---------------------------------------------------------------------------

/// Host-side state of one humanoid agent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AgentProfile {
    /// Unique agent identifier.
    pub id: AgentId,
    /// Short display name.
    pub name: String,
    /// Biological age in ticks.
    pub age_biological_ticks: u64,
    /// Life-stage index reported by the host's own lifecycle model.
    pub life_stage_index: usize,
    /// Skill table.
    pub skills: BTreeMap<Skill, SkillRecord>,
    /// Held traits in acquisition order.
    pub traits: Vec<Trait>,
    /// Biography slots.
    pub biography: Biography,
    /// Aggregate history counters.
    pub history: AgentHistory,
    /// Number of installed bionic or artificial body parts.
    pub bionic_parts: u32,
    /// Whether the agent is awake.
    pub awake: bool,
    /// Active mental state, if the agent is in one.
    pub mental_state: Option<String>,
}

impl AgentProfile {
    /// Create a newborn agent: age 0, every skill at level 0, no traits.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: AgentId::new(),
            name: name.into(),
            age_biological_ticks: 0,
            life_stage_index: 0,
            skills: Skill::ALL
                .into_iter()
                .map(|skill| (skill, SkillRecord::default()))
                .collect(),
            traits: Vec::new(),
            biography: Biography::default(),
            history: AgentHistory::default(),
            bionic_parts: 0,
            awake: true,
            mental_state: None,
        }
    }

    /// Biological age in whole years.
    pub const fn age_biological_years(&self) -> u64 {
        self.age_biological_ticks / TICKS_PER_YEAR
    }

    /// Biological age in whole days.
    pub const fn age_biological_days(&self) -> u64 {
        self.age_biological_ticks / TICKS_PER_DAY
    }

    /// Whether the agent holds a trait of the given definition.
    pub fn has_trait(&self, def: &TraitId) -> bool {
        self.traits.iter().any(|t| &t.def == def)
    }

    /// Sum of all skill levels, saturating at `u32::MAX`.
    pub fn skill_total(&self) -> u32 {
        self.skills
            .values()
            .fold(0_u32, |acc, record| acc.saturating_add(record.level))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn newborn_has_full_empty_skill_table() {
        let agent = AgentProfile::new("Ada");
        assert_eq!(agent.skills.len(), Skill::ALL.len());
        assert_eq!(agent.skill_total(), 0);
        assert!(agent.traits.is_empty());
        assert_eq!(agent.age_biological_years(), 0);
    }

    #[test]
    fn age_conversions() {
        let mut agent = AgentProfile::new("Ada");
        agent.age_biological_ticks = TICKS_PER_YEAR * 3 + TICKS_PER_DAY * 5;
        assert_eq!(agent.age_biological_years(), 3);
        assert_eq!(agent.age_biological_days(), 185);
    }

    #[test]
    fn has_trait_matches_definition_not_degree() {
        let mut agent = AgentProfile::new("Ada");
        agent.traits.push(Trait::with_degree("Nerves", -1));
        assert!(agent.has_trait(&TraitId::from("Nerves")));
        assert!(!agent.has_trait(&TraitId::from("Tough")));
    }

    #[test]
    fn skill_total_sums_levels() {
        let mut agent = AgentProfile::new("Ada");
        if let Some(record) = agent.skills.get_mut(&Skill::Mining) {
            record.level = 4;
        }
        if let Some(record) = agent.skills.get_mut(&Skill::Cooking) {
            record.level = 3;
        }
        assert_eq!(agent.skill_total(), 7);
    }

    #[test]
    fn drug_history() {
        let mut history = AgentHistory::default();
        assert!(!history.has_taken_any_drug());
        history.drugs_taken.insert(String::from("Beer"));
        assert!(history.has_taken_any_drug());
    }

    #[test]
    fn profile_roundtrip_serde() {
        let mut agent = AgentProfile::new("Ada");
        agent.traits.push(Trait::new("Tough"));
        agent.history.shots_fired = 12;
        let json = serde_json::to_string(&agent).ok();
        let restored: Option<AgentProfile> =
            json.as_deref().and_then(|j| serde_json::from_str(j).ok());
        assert_eq!(restored, Some(agent));
    }
}
