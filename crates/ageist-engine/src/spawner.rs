//! Colonist spawner for seeding a fresh simulation.
//!
//! At simulation start the spawner creates the configured number of
//! colonists with unique names, random ages inside the configured range,
//! a few skill levels, and a plausible history so the childhood
//! retrospective has something to read.

use ageist_core::Colonist;
use ageist_core::config::PopulationConfig;
use ageist_types::{AgentHistory, AgentProfile, DAYS_PER_YEAR, TICKS_PER_YEAR};
use rand::Rng;
use tracing::info;

use crate::error::EngineError;

// -----------------------------------------------------------------------
// Name pool
// -----------------------------------------------------------------------

/// Built-in pool of colonist names. The spawner picks randomly without
/// replacement from this list to ensure uniqueness.
const NAME_POOL: &[&str] = &[
    "Ada", "Bram", "Cleo", "Dara", "Eli", "Fen", "Gil", "Hana", "Ivo", "Jun", "Kai", "Lio",
    "Mira", "Nia", "Oda", "Pim", "Quin", "Rhea", "Sol", "Tam", "Uma", "Vik", "Wes", "Xan",
    "Yara", "Zed", "Arlo", "Bea", "Cass", "Dov", "Esme", "Finn", "Greta", "Hal", "Isla", "Jory",
    "Kit", "Lumi", "Milo", "Noor", "Otto", "Pia", "Rune", "Suki", "Teo", "Una", "Vera", "Wynn",
];

/// Highest skill level a spawned colonist can start with.
const MAX_STARTING_SKILL: u32 = 8;

/// Spawn the initial population.
///
/// # Errors
///
/// Returns [`EngineError::Spawner`] if more colonists are requested than
/// there are names, or the age range is empty or overflows the tick
/// counter.
pub fn spawn_colonists(
    config: &PopulationConfig,
    rng: &mut impl Rng,
) -> Result<Vec<Colonist>, EngineError> {
    let names = pick_unique_names(rng, config.initial_agents)?;
    let min_ticks = years_to_ticks(config.min_age_years)?;
    let max_ticks = years_to_ticks(config.max_age_years)?;
    if min_ticks >= max_ticks {
        return Err(EngineError::Spawner {
            message: format!(
                "empty age range {}..{} years",
                config.min_age_years, config.max_age_years
            ),
        });
    }

    let mut colonists = Vec::with_capacity(names.len());
    for name in names {
        let mut profile = AgentProfile::new(name);
        profile.age_biological_ticks = rng.random_range(min_ticks..max_ticks);
        profile.life_stage_index = config.life_stage_index(profile.age_biological_ticks);
        let years = profile.age_biological_years();
        randomize_skills(&mut profile, years, rng);
        profile.history = random_history(years, rng);

        let colonist = Colonist::new(profile);
        info!(
            agent_id = %colonist.id(),
            name = %colonist.profile.name,
            age_years = years,
            growing = colonist.is_growing(),
            "Spawned colonist"
        );
        colonists.push(colonist);
    }

    Ok(colonists)
}

fn years_to_ticks(years: u64) -> Result<u64, EngineError> {
    years
        .checked_mul(TICKS_PER_YEAR)
        .ok_or_else(|| EngineError::Spawner {
            message: format!("age of {years} years overflows the tick counter"),
        })
}

/// Pick `count` unique names from the name pool using random sampling.
fn pick_unique_names<R: Rng>(rng: &mut R, count: u32) -> Result<Vec<String>, EngineError> {
    let pool_len = NAME_POOL.len();
    let count_usize = usize::try_from(count).map_err(|_conversion_err| EngineError::Spawner {
        message: format!("colonist count {count} exceeds usize range"),
    })?;

    if count_usize > pool_len {
        return Err(EngineError::Spawner {
            message: format!("requested {count} names but pool only has {pool_len}"),
        });
    }

    // Partial Fisher-Yates: shuffle only the first `count` slots.
    let mut indices: Vec<usize> = (0..pool_len).collect();
    for i in 0..count_usize {
        let j = rng.random_range(i..pool_len);
        indices.swap(i, j);
    }

    indices
        .iter()
        .take(count_usize)
        .map(|&idx| {
            NAME_POOL
                .get(idx)
                .map(|s| String::from(*s))
                .ok_or_else(|| EngineError::Spawner {
                    message: format!("name pool index {idx} out of bounds"),
                })
        })
        .collect()
}

fn randomize_skills(profile: &mut AgentProfile, years: u64, rng: &mut impl Rng) {
    let cap = u32::try_from(years / 2)
        .unwrap_or(u32::MAX)
        .min(MAX_STARTING_SKILL);
    for record in profile.skills.values_mut() {
        record.level = rng.random_range(0..=cap);
    }
}

/// A history consistent with `years` of life. Most colonists are
/// unremarkable; a few carry the marks of a rough upbringing.
fn random_history(years: u64, rng: &mut impl Rng) -> AgentHistory {
    let years_u32 = u32::try_from(years).unwrap_or(u32::MAX);
    let days = years_u32.saturating_mul(u32::try_from(DAYS_PER_YEAR).unwrap_or(u32::MAX));

    let mut history = AgentHistory {
        cells_mined: rng.random_range(0..=years_u32.saturating_mul(2)),
        fires_extinguished: u32::from(rng.random_ratio(1, 4)),
        times_on_fire: u32::from(rng.random_ratio(1, 20)),
        ..AgentHistory::default()
    };
    if rng.random_ratio(1, 10) {
        history.kills_humanlike = rng.random_range(1..=years_u32.max(1));
        history.shots_fired = history.kills_humanlike.saturating_mul(30);
        history.damage_dealt = history.kills_humanlike.saturating_mul(120);
    }
    if rng.random_ratio(1, 10) {
        history.times_in_mental_state = rng.random_range(0..=years_u32.saturating_add(2));
    }
    if rng.random_ratio(1, 10) {
        history.things_hauled = rng.random_range(days..=days.saturating_mul(3));
    }
    if rng.random_ratio(1, 25) {
        history.drugs_taken.insert(String::from("smokeleaf"));
    }
    history.ate_humanlike_meat = rng.random_ratio(1, 30);
    history
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::collections::BTreeSet;

    use rand::SeedableRng;
    use rand::rngs::SmallRng;

    use super::*;

    #[test]
    fn spawns_correct_count() {
        let mut rng = SmallRng::seed_from_u64(42);
        let config = PopulationConfig {
            initial_agents: 7,
            ..PopulationConfig::default()
        };
        assert_eq!(spawn_colonists(&config, &mut rng).unwrap().len(), 7);
    }

    #[test]
    fn all_unique_names() {
        let mut rng = SmallRng::seed_from_u64(42);
        let config = PopulationConfig {
            initial_agents: 30,
            ..PopulationConfig::default()
        };
        let colonists = spawn_colonists(&config, &mut rng).unwrap();
        let names: BTreeSet<&str> = colonists.iter().map(|c| c.profile.name.as_str()).collect();
        assert_eq!(names.len(), 30, "all names must be unique");
    }

    #[test]
    fn ages_stay_in_range() {
        let mut rng = SmallRng::seed_from_u64(42);
        let config = PopulationConfig {
            initial_agents: 20,
            min_age_years: 3,
            max_age_years: 9,
            ..PopulationConfig::default()
        };
        for c in spawn_colonists(&config, &mut rng).unwrap() {
            let years = c.profile.age_biological_years();
            assert!((3..9).contains(&years));
            assert_eq!(
                c.profile.life_stage_index,
                config.life_stage_index(c.profile.age_biological_ticks)
            );
            assert!(c.is_growing());
        }
    }

    #[test]
    fn adults_spawn_without_growth() {
        let mut rng = SmallRng::seed_from_u64(42);
        let config = PopulationConfig {
            initial_agents: 5,
            min_age_years: 25,
            max_age_years: 40,
            ..PopulationConfig::default()
        };
        let colonists = spawn_colonists(&config, &mut rng).unwrap();
        assert!(colonists.iter().all(|c| !c.is_growing()));
    }

    #[test]
    fn too_many_colonists_returns_error() {
        let mut rng = SmallRng::seed_from_u64(42);
        let config = PopulationConfig {
            initial_agents: 500,
            ..PopulationConfig::default()
        };
        assert!(matches!(
            spawn_colonists(&config, &mut rng),
            Err(EngineError::Spawner { .. })
        ));
    }

    #[test]
    fn zero_colonists_returns_empty() {
        let mut rng = SmallRng::seed_from_u64(42);
        let config = PopulationConfig {
            initial_agents: 0,
            ..PopulationConfig::default()
        };
        assert!(spawn_colonists(&config, &mut rng).unwrap().is_empty());
    }

    #[test]
    fn empty_age_range_returns_error() {
        let mut rng = SmallRng::seed_from_u64(42);
        let config = PopulationConfig {
            min_age_years: 10,
            max_age_years: 10,
            ..PopulationConfig::default()
        };
        assert!(spawn_colonists(&config, &mut rng).is_err());
    }

    #[test]
    fn skills_are_capped() {
        let mut rng = SmallRng::seed_from_u64(42);
        let mut profile = AgentProfile::new("Tam");
        randomize_skills(&mut profile, 40, &mut rng);
        assert!(profile.skills.values().all(|r| r.level <= MAX_STARTING_SKILL));
        randomize_skills(&mut profile, 1, &mut rng);
        assert_eq!(profile.skill_total(), 0);
    }
}
