//! Step cycle: the loop that drives the Ageist simulation.
//!
//! Each step runs these phases in order:
//!
//! 1. **World** -- advance the clock, then the weather and raids.
//! 2. **Colonists** -- age every colonist, refresh its host life stage,
//!    decide whether it is awake and track how long it has been in the
//!    dark, then let it practise skills and do chores.
//! 3. **Growth** -- tick the growth engine for every colonist that still
//!    carries growth state, detaching it on request.
//! 4. **Fears** -- evaluate the fear kinds for colonists still growing.
//!
//! The step cycle is deterministic given the same initial state and seed.

use std::collections::BTreeMap;

use ageist_growth::{FearContext, FearThought, GrowthEngine, GrowthEvent, TraitCatalog};
use ageist_types::AgentId;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing::{debug, info};

use crate::activity;
use crate::clock::{ClockError, DayPhase, WorldClock};
use crate::colonist::Colonist;
use crate::config::{AgeistConfig, ConfigError};
use crate::environment::{Environment, Weather};

/// Errors that can occur during step execution.
#[derive(Debug, thiserror::Error)]
pub enum TickError {
    /// A clock operation failed.
    #[error("clock error: {source}")]
    Clock {
        /// The underlying clock error.
        #[from]
        source: ClockError,
    },

    /// A colonist's age would overflow.
    #[error("age overflow for {agent_id}")]
    AgeOverflow {
        /// The colonist whose age overflowed.
        agent_id: AgentId,
    },
}

/// Summary of a single step's execution.
#[derive(Debug, Clone)]
pub struct TickSummary {
    /// The step number that was executed.
    pub step: u64,
    /// Game tick at the end of the step.
    pub game_tick: u64,
    /// Day or night at the end of the step.
    pub day_phase: DayPhase,
    /// Weather at the end of the step.
    pub weather: Weather,
    /// Hostiles aiming at the colony.
    pub hostile_aimers: u32,
    /// Total colonists.
    pub colonists: u32,
    /// Colonists still carrying growth state at the end of the step.
    pub growing: u32,
    /// Colonists whose growth state was detached this step.
    pub graduated: Vec<AgentId>,
    /// Growth events, per colonist, in the order they happened.
    pub growth_events: Vec<(AgentId, GrowthEvent)>,
    /// Fear thoughts that surfaced this step.
    pub fear_thoughts: Vec<(AgentId, FearThought)>,
}

/// The mutable simulation state passed through the step cycle.
#[derive(Debug)]
pub struct SimulationState {
    /// The world clock.
    pub clock: WorldClock,
    /// Loaded configuration.
    pub config: AgeistConfig,
    /// Shared growth engine.
    pub engine: GrowthEngine,
    /// Colonists keyed by id.
    pub colonists: BTreeMap<AgentId, Colonist>,
    /// Weather and raids.
    pub environment: Environment,
    /// Simulation randomness, seeded from the world seed.
    pub rng: StdRng,
}

impl SimulationState {
    /// Build a fresh simulation at step 0.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if the configuration or catalog is invalid.
    pub fn new(
        config: AgeistConfig,
        catalog: TraitCatalog,
        colonists: Vec<Colonist>,
    ) -> Result<Self, ConfigError> {
        config.validate()?;
        let clock = WorldClock::new(config.world.ticks_per_step).map_err(|e| {
            ConfigError::Invalid {
                reason: e.to_string(),
            }
        })?;
        let engine = GrowthEngine::new(catalog, config.growth.clone())?;
        let rng = StdRng::seed_from_u64(config.world.seed);
        Ok(Self {
            clock,
            engine,
            colonists: colonists.into_iter().map(|c| (c.id(), c)).collect(),
            environment: Environment::new(),
            rng,
            config,
        })
    }

    /// Number of colonists still carrying growth state.
    pub fn growing_count(&self) -> u32 {
        count_u32(self.colonists.values().filter(|c| c.is_growing()).count())
    }
}

/// Execute one step of the simulation.
///
/// # Errors
///
/// Returns [`TickError`] if the clock or a colonist's age would overflow.
/// On error the step is abandoned part-way; callers should treat the
/// state as poisoned.
#[allow(clippy::too_many_lines)]
pub fn run_tick(state: &mut SimulationState) -> Result<TickSummary, TickError> {
    let SimulationState {
        clock,
        config,
        engine,
        colonists,
        environment,
        rng,
    } = state;

    // --- World ---
    let step = clock.advance()?;
    let game_tick = clock.game_tick();
    let step_ticks = clock.ticks_per_step();
    let day_phase = clock.day_phase();
    environment.advance(&config.environment, step_ticks, rng);

    let hostile_aimers = environment.hostile_aimers();
    let defenders = if hostile_aimers > 0 {
        count_u32(colonists.values().filter(|c| !c.is_growing()).count())
    } else {
        0
    };

    debug!(step, game_tick, ?day_phase, weather = ?environment.weather(), "Step starting");

    let mut graduated = Vec::new();
    let mut growth_events = Vec::new();
    let mut fear_thoughts = Vec::new();

    for (&agent_id, colonist) in &mut *colonists {
        // --- Colonists ---
        let profile = &mut colonist.profile;
        profile.age_biological_ticks = profile
            .age_biological_ticks
            .checked_add(step_ticks)
            .ok_or(TickError::AgeOverflow { agent_id })?;
        profile.life_stage_index = config
            .population
            .life_stage_index(profile.age_biological_ticks);
        profile.awake = match day_phase {
            DayPhase::Day => true,
            DayPhase::Night => rng.random_range(1..=100_u32) <= config.environment.night_waking_pct,
        };
        colonist.ticks_since_light =
            if config.environment.darkness_enabled && day_phase == DayPhase::Night {
                colonist.ticks_since_light.saturating_add(step_ticks)
            } else {
                0
            };
        activity::perform_activity(profile, rng);

        // --- Growth ---
        let Some(growth) = colonist.growth.as_mut() else {
            continue;
        };
        let outcome = engine.tick(growth, &mut colonist.profile, rng);
        for event in outcome.events {
            log_growth_event(agent_id, &colonist.profile.name, &event);
            growth_events.push((agent_id, event));
        }
        if outcome.remove {
            info!(
                agent_id = %agent_id,
                name = %colonist.profile.name,
                "Growth finished, detaching"
            );
            colonist.growth = None;
            graduated.push(agent_id);
            continue;
        }

        // --- Fears ---
        let ctx = FearContext {
            awake: colonist.profile.awake,
            ticks_since_light: colonist.ticks_since_light,
            thunderstorm: environment.is_thunderstorm(),
            weather_age_ticks: environment.weather_age_ticks(),
            self_aiming: false,
            nearby_aimers: hostile_aimers.saturating_add(defenders),
        };
        let chance_pct = engine.config().fear_chance_pct;
        for thought in colonist.fears.evaluate_all(growth, chance_pct, &ctx, rng) {
            debug!(
                agent_id = %agent_id,
                kind = ?thought.kind,
                stage = ?thought.stage,
                "Fear surfaced"
            );
            fear_thoughts.push((agent_id, thought));
        }
    }

    let summary = TickSummary {
        step,
        game_tick,
        day_phase,
        weather: environment.weather(),
        hostile_aimers,
        colonists: count_u32(colonists.len()),
        growing: count_u32(colonists.values().filter(|c| c.is_growing()).count()),
        graduated,
        growth_events,
        fear_thoughts,
    };

    debug!(
        step,
        growing = summary.growing,
        events = summary.growth_events.len(),
        fears = summary.fear_thoughts.len(),
        "Step complete"
    );

    Ok(summary)
}

fn log_growth_event(agent_id: AgentId, name: &str, event: &GrowthEvent) {
    match event {
        GrowthEvent::StageChanged {
            stage,
            severity_pct,
        } => debug!(agent_id = %agent_id, ?stage, severity_pct, "Stage changed"),
        GrowthEvent::Bootstrapped { passions_seeded } => {
            debug!(agent_id = %agent_id, passions_seeded, "Growth bootstrapped");
        }
        GrowthEvent::StageEntered { stage } => {
            info!(agent_id = %agent_id, name, ?stage, "Entered stage");
        }
        GrowthEvent::TraitsGranted { stage, traits } => {
            let names: Vec<&str> = traits.iter().map(|t| t.def.as_str()).collect();
            info!(agent_id = %agent_id, name, ?stage, traits = ?names, "Childhood traits granted");
        }
        GrowthEvent::PassionGained(grant) => {
            info!(agent_id = %agent_id, skill = ?grant.skill, "{}", grant.message);
        }
        GrowthEvent::RemovalRequested => {
            debug!(agent_id = %agent_id, "Growth removal requested");
        }
    }
}

fn count_u32(n: usize) -> u32 {
    u32::try_from(n).unwrap_or(u32::MAX)
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::arithmetic_side_effects)]
mod tests {
    use ageist_growth::{TraitCatalog, default_catalog};
    use ageist_types::{AgentProfile, LifeStage, TICKS_PER_YEAR};

    use super::*;

    fn catalog() -> TraitCatalog {
        default_catalog().unwrap()
    }

    fn quiet_config() -> AgeistConfig {
        let mut config = AgeistConfig::default();
        config.environment.thunderstorm_chance_pct = 0;
        config.environment.raid_chance_pct = 0;
        config
    }

    fn colonist_aged(name: &str, age_ticks: u64, config: &AgeistConfig) -> Colonist {
        let mut profile = AgentProfile::new(name);
        profile.age_biological_ticks = age_ticks;
        profile.life_stage_index = config.population.life_stage_index(age_ticks);
        Colonist::new(profile)
    }

    #[test]
    fn step_ages_colonists_and_advances_clock() {
        let config = quiet_config();
        let child = colonist_aged("Gil", 5 * TICKS_PER_YEAR, &config);
        let id = child.id();
        let mut state = SimulationState::new(config, catalog(), vec![child]).unwrap();

        let summary = run_tick(&mut state).unwrap();
        assert_eq!(summary.step, 1);
        assert_eq!(summary.game_tick, 2500);
        assert_eq!(summary.colonists, 1);
        assert_eq!(summary.growing, 1);
        assert_eq!(
            state.colonists[&id].profile.age_biological_ticks,
            5 * TICKS_PER_YEAR + 2500
        );
    }

    #[test]
    fn first_step_enters_current_stage() {
        let config = quiet_config();
        let child = colonist_aged("Hana", 6 * TICKS_PER_YEAR, &config);
        let id = child.id();
        let mut state = SimulationState::new(config, catalog(), vec![child]).unwrap();

        let summary = run_tick(&mut state).unwrap();
        assert!(summary.growth_events.iter().any(|(agent, event)| {
            *agent == id
                && *event
                    == GrowthEvent::StageEntered {
                        stage: LifeStage::Child,
                    }
        }));
    }

    #[test]
    fn adult_colonists_are_not_grown() {
        let config = quiet_config();
        let adult = colonist_aged("Ivo", 30 * TICKS_PER_YEAR, &config);
        let mut state = SimulationState::new(config, catalog(), vec![adult]).unwrap();

        let summary = run_tick(&mut state).unwrap();
        assert_eq!(summary.growing, 0);
        assert!(summary.growth_events.is_empty());
    }

    #[test]
    fn reaching_adulthood_detaches_growth() {
        let config = quiet_config();
        let almost = colonist_aged("Jun", 18 * TICKS_PER_YEAR - 1, &config);
        let id = almost.id();
        let mut state = SimulationState::new(config, catalog(), vec![almost]).unwrap();

        let summary = run_tick(&mut state).unwrap();
        assert_eq!(summary.graduated, vec![id]);
        assert!(!state.colonists[&id].is_growing());
        assert_eq!(state.growing_count(), 0);
    }

    #[test]
    fn age_overflow_is_an_error() {
        let config = quiet_config();
        let mut ancient = colonist_aged("Kai", 0, &config);
        ancient.profile.age_biological_ticks = u64::MAX;
        let mut state = SimulationState::new(config, catalog(), vec![ancient]).unwrap();
        assert!(matches!(
            run_tick(&mut state),
            Err(TickError::AgeOverflow { .. })
        ));
    }

    #[test]
    fn same_seed_same_history() {
        let run = || {
            let config = quiet_config();
            let mut profile = AgentProfile::new("Lio");
            profile.age_biological_ticks = 3 * TICKS_PER_YEAR;
            profile.life_stage_index = config.population.life_stage_index(3 * TICKS_PER_YEAR);
            let mut state =
                SimulationState::new(config, catalog(), vec![Colonist::new(profile)])
                    .unwrap();
            for _ in 0..200 {
                run_tick(&mut state).unwrap();
            }
            let colonist = state.colonists.values().next().unwrap();
            (colonist.profile.traits.clone(), colonist.profile.skills.clone())
        };
        assert_eq!(run(), run());
    }
}
