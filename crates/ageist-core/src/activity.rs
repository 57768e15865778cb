//! Everyday activity for awake colonists.
//!
//! A crude stand-in for work and combat: each step an awake colonist may
//! practise a skill (raising its level) and may do a chore that bumps one
//! of the history counters the childhood retrospective reads.

use ageist_types::{AgentProfile, Skill};
use rand::Rng;
use rand::seq::IndexedRandom;

/// Percent chance per step that an awake colonist gains a skill level.
pub const SKILL_GAIN_CHANCE_PCT: u32 = 20;

/// Skill levels never rise above this.
pub const MAX_SKILL_LEVEL: u32 = 20;

/// Percent chance per step that an awake colonist does a chore.
pub const CHORE_CHANCE_PCT: u32 = 10;

/// Work that leaves a mark in the history counters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Chore {
    /// Digging out rock.
    Mining,
    /// Carrying goods around.
    Hauling,
    /// Beating out a fire.
    Firefighting,
    /// Target practice.
    Shooting,
}

impl Chore {
    /// Every chore.
    pub const ALL: [Self; 4] = [Self::Mining, Self::Hauling, Self::Firefighting, Self::Shooting];
}

/// What a colonist did this step.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ActivityReport {
    /// Skill that gained a level, if any.
    pub skill_gained: Option<Skill>,
    /// Chore performed, if any.
    pub chore: Option<Chore>,
}

/// Let an awake colonist practise and work for one step.
///
/// Sleeping colonists and those in a mental state do nothing.
pub fn perform_activity(profile: &mut AgentProfile, rng: &mut impl Rng) -> ActivityReport {
    let mut report = ActivityReport::default();
    if !profile.awake || profile.mental_state.is_some() {
        return report;
    }

    if rng.random_range(1..=100_u32) <= SKILL_GAIN_CHANCE_PCT
        && let Some(&skill) = Skill::ALL.choose(rng)
    {
        let record = profile.skills.entry(skill).or_default();
        if record.level < MAX_SKILL_LEVEL {
            record.level = record.level.saturating_add(1);
            report.skill_gained = Some(skill);
        }
    }

    if rng.random_range(1..=100_u32) <= CHORE_CHANCE_PCT
        && let Some(&chore) = Chore::ALL.choose(rng)
    {
        do_chore(profile, chore);
        report.chore = Some(chore);
    }

    report
}

/// Apply a chore's effect on the history counters.
pub const fn do_chore(profile: &mut AgentProfile, chore: Chore) {
    let history = &mut profile.history;
    match chore {
        Chore::Mining => history.cells_mined = history.cells_mined.saturating_add(25),
        Chore::Hauling => history.things_hauled = history.things_hauled.saturating_add(10),
        Chore::Firefighting => {
            history.fires_extinguished = history.fires_extinguished.saturating_add(1);
        }
        Chore::Shooting => {
            history.shots_fired = history.shots_fired.saturating_add(5);
            history.damage_dealt = history.damage_dealt.saturating_add(12);
        }
    }
}

#[cfg(test)]
mod tests {
    use rand::SeedableRng;
    use rand::rngs::SmallRng;

    use super::*;

    #[test]
    fn sleepers_do_nothing() {
        let mut rng = SmallRng::seed_from_u64(42);
        let mut profile = AgentProfile::new("Dara");
        profile.awake = false;
        for _ in 0..200 {
            assert_eq!(perform_activity(&mut profile, &mut rng), ActivityReport::default());
        }
        assert_eq!(profile.skill_total(), 0);
    }

    #[test]
    fn awake_colonists_improve_over_time() {
        let mut rng = SmallRng::seed_from_u64(42);
        let mut profile = AgentProfile::new("Eli");
        profile.awake = true;
        for _ in 0..500 {
            perform_activity(&mut profile, &mut rng);
        }
        assert!(profile.skill_total() > 0);
        assert!(profile.skills.values().all(|r| r.level <= MAX_SKILL_LEVEL));
    }

    #[test]
    fn chores_bump_history() {
        let mut profile = AgentProfile::new("Fen");
        do_chore(&mut profile, Chore::Mining);
        do_chore(&mut profile, Chore::Firefighting);
        do_chore(&mut profile, Chore::Shooting);
        assert_eq!(profile.history.cells_mined, 25);
        assert_eq!(profile.history.fires_extinguished, 1);
        assert_eq!(profile.history.shots_fired, 5);
    }
}
