//! The growth stage controller.
//!
//! One [`GrowthState`] is attached to each young agent and ticked by the
//! host through a shared [`GrowthEngine`]. Every tick:
//!
//! 1. The stage is recomputed from biological age and never moves
//!    backwards. A change (or the first observation) emits
//!    [`GrowthEvent::StageChanged`] for the renderer.
//! 2. The first tick on a new agent runs the bootstrap: young-agent
//!    restrictions, passion reset and passion seeding.
//! 3. If the applied stage lags the current stage, the entry steps of each
//!    newly reached stage run once, then the applied stage catches up.
//! 4. The passion scheduler observes skill gains and fires ready events.
//!
//! The applied stage and the bootstrap flag are persisted, so a restored
//! agent never repeats a one-shot effect.

use ageist_types::{LifeStage, Passion, Trait};
use rand::Rng;
use serde::{Deserialize, Serialize};
use tracing::{debug, error, info, warn};

use crate::catalog::TraitCatalog;
use crate::config::GrowthConfig;
use crate::error::GrowthError;
use crate::fears::FearRegistry;
use crate::host::GrowthHost;
use crate::passions::{PassionGrant, PassionScheduler};
use crate::retrospective::run_retrospective;

// ---------------------------------------------------------------------------
// Stage derivation
// ---------------------------------------------------------------------------

/// Derive the growth stage from an agent's biological age.
///
/// Under one year is [`LifeStage::Infant`], under four is
/// [`LifeStage::Toddler`]. Older agents follow the host's life-stage index,
/// clamped to at least [`LifeStage::Child`] so the stage stays monotonic in
/// age even when the host's own model lags.
pub fn recompute_stage<H: GrowthHost + ?Sized>(host: &H) -> LifeStage {
    let years = host.age_biological_years();
    if years < 1 {
        LifeStage::Infant
    } else if years < 4 {
        LifeStage::Toddler
    } else {
        LifeStage::from_index(host.life_stage_index()).max(LifeStage::Child)
    }
}

// ---------------------------------------------------------------------------
// Events
// ---------------------------------------------------------------------------

/// Something a growth tick did that the host may want to react to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GrowthEvent {
    /// The visual stage changed; renderers should refresh the agent.
    StageChanged {
        /// The new stage.
        stage: LifeStage,
        /// Visual scale for the stage, in percent.
        severity_pct: u32,
    },
    /// First-attach bootstrap ran.
    Bootstrapped {
        /// Number of passion events seeded.
        passions_seeded: usize,
    },
    /// A stage's one-shot entry steps ran.
    StageEntered {
        /// The stage entered.
        stage: LifeStage,
    },
    /// A retrospective pass granted traits.
    TraitsGranted {
        /// The stage whose entry ran the pass.
        stage: LifeStage,
        /// Traits granted, in grant order.
        traits: Vec<Trait>,
    },
    /// A passion tier was raised.
    PassionGained(PassionGrant),
    /// Growth has finished; the host should detach it.
    RemovalRequested,
}

/// Result of one [`GrowthEngine::tick`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TickOutcome {
    /// Events in the order they happened.
    pub events: Vec<GrowthEvent>,
    /// Whether the host should detach growth after this tick.
    pub remove: bool,
}

// ---------------------------------------------------------------------------
// State
// ---------------------------------------------------------------------------

/// Per-agent growth state, persisted with the agent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GrowthState {
    current_stage: LifeStage,
    #[serde(default)]
    applied_stage: Option<LifeStage>,
    #[serde(default)]
    initialized_on_agent: bool,
    #[serde(default)]
    removal_requested: bool,
    #[serde(default)]
    fears: FearRegistry,
    #[serde(default)]
    passions: PassionScheduler,
    /// Set once the stage has been observed since creation or restore.
    #[serde(skip)]
    observed: bool,
}

impl Default for GrowthState {
    fn default() -> Self {
        Self::new()
    }
}

impl GrowthState {
    /// Fresh state for an agent growth has just been attached to.
    pub fn new() -> Self {
        Self::at_stage(LifeStage::Infant)
    }

    /// Fresh state whose current stage is already `stage`.
    pub fn at_stage(stage: LifeStage) -> Self {
        Self {
            current_stage: stage,
            applied_stage: None,
            initialized_on_agent: false,
            removal_requested: false,
            fears: FearRegistry::new(),
            passions: PassionScheduler::new(),
            observed: false,
        }
    }

    /// Stage used for visuals and fear eligibility.
    pub const fn current_stage(&self) -> LifeStage {
        self.current_stage
    }

    /// Last stage whose entry steps have run.
    pub const fn applied_stage(&self) -> Option<LifeStage> {
        self.applied_stage
    }

    /// Whether the bootstrap has run on this agent.
    pub const fn is_initialized(&self) -> bool {
        self.initialized_on_agent
    }

    /// Visual scale for the current stage, in percent.
    pub const fn severity_pct(&self) -> u32 {
        self.current_stage.severity_pct()
    }

    /// The fear registry.
    pub const fn fears(&self) -> &FearRegistry {
        &self.fears
    }

    /// Mutable access to the fear registry, for fear evaluators.
    pub const fn fears_mut(&mut self) -> &mut FearRegistry {
        &mut self.fears
    }

    /// The passion scheduler.
    pub const fn passions(&self) -> &PassionScheduler {
        &self.passions
    }

    /// Ask for growth to be detached regardless of stage.
    pub const fn request_removal(&mut self) {
        self.removal_requested = true;
    }

    /// Whether the host should detach growth from the agent.
    pub const fn should_remove(&self) -> bool {
        self.current_stage.is_terminal() || self.removal_requested
    }
}

// ---------------------------------------------------------------------------
// Stage entry table
// ---------------------------------------------------------------------------

/// One step of a stage's entry effects.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryStep {
    /// Remove the transient young-agent trait.
    RetireTransientTrait,
    /// Clear the fear registry.
    ForgetFears,
    /// Run a childhood retrospective up to the stage's trait target.
    Retrospective,
    /// Signal that growth is complete.
    RequestRemoval,
}

/// The entry steps for `stage`, in execution order.
pub const fn entry_steps(stage: LifeStage) -> &'static [EntryStep] {
    match stage {
        LifeStage::Infant | LifeStage::Toddler => &[],
        LifeStage::Child => &[EntryStep::Retrospective],
        LifeStage::Adolescent => &[
            EntryStep::RetireTransientTrait,
            EntryStep::ForgetFears,
            EntryStep::Retrospective,
        ],
        LifeStage::Adult => &[EntryStep::Retrospective, EntryStep::RequestRemoval],
    }
}

/// Stages whose entry steps are due when moving from `applied` to
/// `current`. A state that has applied nothing enters only `current`;
/// a jump across several stages enters each one in order.
fn stages_to_enter(applied: Option<LifeStage>, current: LifeStage) -> Vec<LifeStage> {
    match applied {
        None => vec![current],
        Some(applied) => LifeStage::ALL
            .into_iter()
            .filter(|stage| *stage > applied && *stage <= current)
            .collect(),
    }
}

// ---------------------------------------------------------------------------
// Engine
// ---------------------------------------------------------------------------

/// Shared, read-only driver for every agent's growth state.
#[derive(Debug, Clone)]
pub struct GrowthEngine {
    catalog: TraitCatalog,
    config: GrowthConfig,
}

impl GrowthEngine {
    /// Build an engine over a validated catalog and configuration.
    ///
    /// # Errors
    ///
    /// Returns [`GrowthError::InvalidConfig`] for out-of-range settings,
    /// [`GrowthError::UnknownTrait`] if the transient trait is not in the
    /// catalog, or any catalog consistency error.
    pub fn new(catalog: TraitCatalog, config: GrowthConfig) -> Result<Self, GrowthError> {
        config.validate()?;
        catalog.validate()?;
        if !catalog.contains(&config.transient_trait) {
            return Err(GrowthError::UnknownTrait(config.transient_trait.clone()));
        }
        Ok(Self { catalog, config })
    }

    /// The trait catalog.
    pub const fn catalog(&self) -> &TraitCatalog {
        &self.catalog
    }

    /// The configuration.
    pub const fn config(&self) -> &GrowthConfig {
        &self.config
    }

    /// Trait count a retrospective on entering `stage` aims for.
    pub const fn trait_target(&self, stage: LifeStage) -> usize {
        match stage {
            LifeStage::Infant | LifeStage::Toddler => 0,
            LifeStage::Child => self.config.child_trait_target,
            LifeStage::Adolescent => self.config.adolescent_trait_target,
            LifeStage::Adult => self.config.adult_trait_target,
        }
    }

    /// Advance one agent's growth by one tick.
    ///
    /// Never fails: exhausted draws and inconsistent state are logged and
    /// the affected optional effect is skipped.
    pub fn tick<H: GrowthHost + ?Sized>(
        &self,
        state: &mut GrowthState,
        host: &mut H,
        rng: &mut impl Rng,
    ) -> TickOutcome {
        let mut events = Vec::new();

        let previous = state.current_stage;
        let stage = recompute_stage(&*host).max(previous);
        if !state.observed || stage != previous {
            state.current_stage = stage;
            events.push(GrowthEvent::StageChanged {
                stage,
                severity_pct: stage.severity_pct(),
            });
        }
        state.observed = true;
        state.fears.repair(host.agent_id());

        if !state.initialized_on_agent {
            self.bootstrap(state, host, rng, &mut events);
            state.initialized_on_agent = true;
        }

        if state.applied_stage != Some(stage) {
            for entered in stages_to_enter(state.applied_stage, stage) {
                self.enter_stage(entered, state, host, rng, &mut events);
            }
            state.applied_stage = Some(stage);
        }

        state.passions.observe_skill_total(
            host.skill_total(),
            self.config.skill_gain_passion_odds,
            rng,
        );
        events.extend(
            state
                .passions
                .update(host, self.config.max_draw_attempts, rng)
                .into_iter()
                .map(GrowthEvent::PassionGained),
        );

        TickOutcome {
            events,
            remove: state.should_remove(),
        }
    }

    /// First-attach restrictions and passion seeding.
    fn bootstrap<H: GrowthHost + ?Sized>(
        &self,
        state: &mut GrowthState,
        host: &mut H,
        rng: &mut impl Rng,
        events: &mut Vec<GrowthEvent>,
    ) {
        let stage = state.current_stage;
        debug!(agent_id = ?host.agent_id(), %stage, "Bootstrapping growth on agent");

        host.biography_mut().adulthood = None;
        if stage <= LifeStage::Toddler {
            for record in host.skills_mut().values_mut() {
                record.level = 0;
            }
        }
        if stage <= LifeStage::Child {
            let transient = Trait::new(self.config.transient_trait.clone());
            let traits = host.traits_mut();
            traits.clear();
            traits.push(transient);
        } else if stage <= LifeStage::Adolescent {
            host.biography_mut().childhood = None;
            host.traits_mut().truncate(self.config.adolescent_trait_limit);
        }

        for record in host.skills_mut().values_mut() {
            record.passion = Passion::None;
        }
        state.fears = FearRegistry::new();
        state.passions = PassionScheduler::new();
        if let Err(err) = state.passions.seed(&self.config, rng) {
            error!(agent_id = ?host.agent_id(), %err, "Failed to seed passion events");
        }
        state.passions.resync_baseline(host.skill_total());

        events.push(GrowthEvent::Bootstrapped {
            passions_seeded: state.passions.events().len(),
        });
    }

    /// Run the entry table for one stage.
    fn enter_stage<H: GrowthHost + ?Sized>(
        &self,
        stage: LifeStage,
        state: &mut GrowthState,
        host: &mut H,
        rng: &mut impl Rng,
        events: &mut Vec<GrowthEvent>,
    ) {
        info!(agent_id = ?host.agent_id(), %stage, "Agent entered life stage");
        events.push(GrowthEvent::StageEntered { stage });

        for step in entry_steps(stage) {
            match step {
                EntryStep::RetireTransientTrait => self.retire_transient_trait(host),
                EntryStep::ForgetFears => state.fears.forget(),
                EntryStep::Retrospective => {
                    let outcome = run_retrospective(
                        &self.catalog,
                        &self.config,
                        stage,
                        self.trait_target(stage),
                        host,
                        rng,
                    );
                    if !outcome.granted.is_empty() {
                        events.push(GrowthEvent::TraitsGranted {
                            stage,
                            traits: outcome.granted,
                        });
                    }
                }
                EntryStep::RequestRemoval => {
                    debug!(agent_id = ?host.agent_id(), "Agent has grown up, requesting removal");
                    state.removal_requested = true;
                    events.push(GrowthEvent::RemovalRequested);
                }
            }
        }
    }

    fn retire_transient_trait<H: GrowthHost + ?Sized>(&self, host: &mut H) {
        let transient = &self.config.transient_trait;
        let traits = host.traits_mut();
        if let Some(pos) = traits.iter().position(|t| &t.def == transient) {
            traits.remove(pos);
        } else {
            warn!(
                agent_id = ?host.agent_id(),
                trait_id = %transient,
                "Reached adolescence without the transient trait to remove"
            );
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use ageist_types::{AgentProfile, Backstory, FearKind, Skill, TICKS_PER_YEAR, TraitId};
    use rand::SeedableRng;
    use rand::rngs::SmallRng;

    use super::*;
    use crate::catalog::default_catalog;

    fn engine() -> GrowthEngine {
        GrowthEngine::new(default_catalog().unwrap(), GrowthConfig::default()).unwrap()
    }

    fn agent(years: u64, stage_index: usize) -> AgentProfile {
        let mut profile = AgentProfile::new("Tam");
        profile.age_biological_ticks = years * TICKS_PER_YEAR;
        profile.life_stage_index = stage_index;
        profile
    }

    fn backstory(title: &str) -> Backstory {
        Backstory {
            title: String::from(title),
            title_short: String::from(title),
            description: String::new(),
        }
    }

    #[test]
    fn recompute_uses_age_then_host_index() {
        assert_eq!(recompute_stage(&agent(0, 0)), LifeStage::Infant);
        assert_eq!(recompute_stage(&agent(1, 0)), LifeStage::Toddler);
        assert_eq!(recompute_stage(&agent(3, 4)), LifeStage::Toddler);
        assert_eq!(recompute_stage(&agent(4, 2)), LifeStage::Child);
        assert_eq!(recompute_stage(&agent(13, 3)), LifeStage::Adolescent);
        assert_eq!(recompute_stage(&agent(20, 4)), LifeStage::Adult);
    }

    #[test]
    fn recompute_clamps_lagging_host_index() {
        assert_eq!(recompute_stage(&agent(5, 0)), LifeStage::Child);
        assert_eq!(recompute_stage(&agent(5, 99)), LifeStage::Adult);
    }

    #[test]
    fn entry_table_shape() {
        assert!(entry_steps(LifeStage::Infant).is_empty());
        assert!(entry_steps(LifeStage::Toddler).is_empty());
        assert_eq!(entry_steps(LifeStage::Child), &[EntryStep::Retrospective]);
        assert_eq!(
            entry_steps(LifeStage::Adult).last(),
            Some(&EntryStep::RequestRemoval)
        );
    }

    #[test]
    fn skipped_stages_enter_in_order() {
        assert_eq!(
            stages_to_enter(Some(LifeStage::Toddler), LifeStage::Adolescent),
            vec![LifeStage::Child, LifeStage::Adolescent]
        );
        assert_eq!(stages_to_enter(None, LifeStage::Child), vec![LifeStage::Child]);
        assert!(stages_to_enter(Some(LifeStage::Child), LifeStage::Child).is_empty());
    }

    #[test]
    fn engine_rejects_unknown_transient_trait() {
        let config = GrowthConfig {
            transient_trait: TraitId::from("Nonexistent"),
            ..GrowthConfig::default()
        };
        let result = GrowthEngine::new(default_catalog().unwrap(), config);
        assert!(matches!(result, Err(GrowthError::UnknownTrait(_))));
    }

    #[test]
    fn bootstrap_restricts_toddler() {
        let engine = engine();
        let mut rng = SmallRng::seed_from_u64(42);
        let mut profile = agent(2, 0);
        profile.traits = vec![Trait::new("Kind"), Trait::new("Greedy")];
        profile.biography.adulthood = Some(backstory("Soldier"));
        if let Some(record) = profile.skills.get_mut(&Skill::Shooting) {
            record.level = 8;
            record.passion = Passion::Major;
        }

        let mut state = GrowthState::new();
        let outcome = engine.tick(&mut state, &mut profile, &mut rng);

        assert!(state.is_initialized());
        assert_eq!(state.current_stage(), LifeStage::Toddler);
        assert_eq!(state.applied_stage(), Some(LifeStage::Toddler));
        assert_eq!(profile.traits, vec![Trait::new("Wimp")]);
        assert!(profile.biography.adulthood.is_none());
        assert_eq!(profile.skill_total(), 0);
        assert!(profile.skills.values().all(|r| r.passion == Passion::None));
        assert!((5..=7).contains(&state.passions().events().len()));
        assert!(matches!(
            outcome.events.first(),
            Some(GrowthEvent::StageChanged {
                stage: LifeStage::Toddler,
                severity_pct: 25
            })
        ));
        assert!(!outcome.remove);
    }

    #[test]
    fn bootstrap_trims_adolescent() {
        let engine = engine();
        let mut rng = SmallRng::seed_from_u64(42);
        let mut profile = agent(14, 3);
        profile.traits = vec![
            Trait::new("Kind"),
            Trait::new("Greedy"),
            Trait::new("Nimble"),
        ];
        profile.biography.childhood = Some(backstory("Urchin"));
        if let Some(record) = profile.skills.get_mut(&Skill::Mining) {
            record.level = 6;
        }

        let mut state = GrowthState::new();
        engine.tick(&mut state, &mut profile, &mut rng);

        // Earliest traits survive, skills are kept, and the Adolescent
        // retrospective finds the target already met.
        assert_eq!(
            profile.traits,
            vec![Trait::new("Kind"), Trait::new("Greedy")]
        );
        assert_eq!(profile.skill_total(), 6);
        assert_eq!(state.passions().skill_value_baseline(), 6);
        let childhood = profile.biography.childhood.unwrap();
        assert_eq!(childhood.title, "Child");
    }

    #[test]
    fn bootstrap_runs_once() {
        let engine = engine();
        let mut rng = SmallRng::seed_from_u64(42);
        let mut profile = agent(2, 0);
        let mut state = GrowthState::new();
        let mut bootstraps = 0;
        for _ in 0..50 {
            let outcome = engine.tick(&mut state, &mut profile, &mut rng);
            bootstraps += outcome
                .events
                .iter()
                .filter(|e| matches!(e, GrowthEvent::Bootstrapped { .. }))
                .count();
        }
        assert_eq!(bootstraps, 1);
    }

    #[test]
    fn child_entry_runs_once() {
        let engine = engine();
        let mut rng = SmallRng::seed_from_u64(42);
        let mut profile = agent(4, 2);
        let mut state = GrowthState::new();
        let mut entries = 0;
        for _ in 0..20 {
            let outcome = engine.tick(&mut state, &mut profile, &mut rng);
            entries += outcome
                .events
                .iter()
                .filter(|e| matches!(e, GrowthEvent::StageEntered { .. }))
                .count();
        }
        assert_eq!(entries, 1);
        assert_eq!(profile.traits.len(), 2);
        assert!(profile.has_trait(&TraitId::from("Wimp")));
    }

    #[test]
    fn stage_never_regresses() {
        let engine = engine();
        let mut rng = SmallRng::seed_from_u64(42);
        let mut profile = agent(13, 3);
        let mut state = GrowthState::new();
        engine.tick(&mut state, &mut profile, &mut rng);
        assert_eq!(state.current_stage(), LifeStage::Adolescent);

        profile.age_biological_ticks = 2 * TICKS_PER_YEAR;
        let outcome = engine.tick(&mut state, &mut profile, &mut rng);
        assert_eq!(state.current_stage(), LifeStage::Adolescent);
        assert!(outcome.events.is_empty());
    }

    #[test]
    fn adolescent_entry_retires_wimp_and_forgets_fears() {
        let engine = engine();
        let mut rng = SmallRng::seed_from_u64(42);
        let mut profile = agent(12, 2);
        let mut state = GrowthState::new();
        engine.tick(&mut state, &mut profile, &mut rng);
        state
            .fears_mut()
            .register(FearKind::Dark, 100, &mut rng);
        assert!(state.fears().has(FearKind::Dark));

        profile.age_biological_ticks = 13 * TICKS_PER_YEAR;
        profile.life_stage_index = 3;
        engine.tick(&mut state, &mut profile, &mut rng);

        assert!(!profile.has_trait(&TraitId::from("Wimp")));
        assert!(!state.fears().is_known(FearKind::Dark));
        assert_eq!(state.applied_stage(), Some(LifeStage::Adolescent));
    }

    #[test]
    fn tick_heals_restored_fear_registry() {
        let engine = engine();
        let mut rng = SmallRng::seed_from_u64(42);
        let mut profile = agent(8, 2);
        let mut state = GrowthState::new();
        engine.tick(&mut state, &mut profile, &mut rng);

        let mut value = serde_json::to_value(&state).unwrap();
        value["fears"] = serde_json::json!({ "active": ["Dark"] });
        let mut restored: GrowthState = serde_json::from_value(value).unwrap();
        assert!(restored.fears().is_corrupted());

        engine.tick(&mut restored, &mut profile, &mut rng);
        assert!(!restored.fears().is_corrupted());
        assert!(!restored.fears().has(FearKind::Dark));
        assert_eq!(restored.applied_stage(), state.applied_stage());
    }

    #[test]
    fn missing_wimp_is_tolerated() {
        let engine = engine();
        let mut rng = SmallRng::seed_from_u64(42);
        let mut profile = agent(12, 2);
        let mut state = GrowthState::new();
        engine.tick(&mut state, &mut profile, &mut rng);
        profile.traits.retain(|t| t.def.as_str() != "Wimp");

        profile.age_biological_ticks = 13 * TICKS_PER_YEAR;
        profile.life_stage_index = 3;
        engine.tick(&mut state, &mut profile, &mut rng);
        assert_eq!(state.applied_stage(), Some(LifeStage::Adolescent));
        assert!(profile.traits.len() >= 2);
    }

    #[test]
    fn adult_entry_requests_removal() {
        let engine = engine();
        let mut rng = SmallRng::seed_from_u64(42);
        let mut profile = agent(17, 3);
        let mut state = GrowthState::new();
        assert!(!engine.tick(&mut state, &mut profile, &mut rng).remove);

        profile.age_biological_ticks = 18 * TICKS_PER_YEAR;
        profile.life_stage_index = 4;
        let outcome = engine.tick(&mut state, &mut profile, &mut rng);
        assert!(outcome.remove);
        assert!(outcome.events.contains(&GrowthEvent::RemovalRequested));
        assert_eq!(profile.traits.len(), 3);
        assert_eq!(state.severity_pct(), 100);
    }

    #[test]
    fn explicit_removal_request() {
        let mut state = GrowthState::new();
        assert!(!state.should_remove());
        state.request_removal();
        assert!(state.should_remove());
    }

    #[test]
    fn restored_state_does_not_rebootstrap() {
        let engine = engine();
        let mut rng = SmallRng::seed_from_u64(42);
        let mut profile = agent(6, 2);
        let mut state = GrowthState::new();
        engine.tick(&mut state, &mut profile, &mut rng);
        let traits_before = profile.traits.clone();

        let json = serde_json::to_string(&state).unwrap();
        let mut restored: GrowthState = serde_json::from_str(&json).unwrap();
        let outcome = engine.tick(&mut restored, &mut profile, &mut rng);

        assert_eq!(profile.traits, traits_before);
        assert_eq!(restored.applied_stage(), Some(LifeStage::Child));
        // A restore re-announces the stage for renderers, nothing more.
        assert!(matches!(
            outcome.events.as_slice(),
            [GrowthEvent::StageChanged { .. }]
        ));
    }
}
