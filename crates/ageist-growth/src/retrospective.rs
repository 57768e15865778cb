//! Childhood retrospective: history-driven trait generation.
//!
//! On Child, Adolescent and Adult entry the engine looks back over what
//! the agent did while growing up and tops its trait set up to a target
//! count. A pass runs in four steps:
//!
//! 1. **Directed candidates.** Each [`HistoryRule`] independently checks
//!    one history threshold and may nominate a trait, optionally with a
//!    narrative [`ChildhoodFeat`].
//! 2. **Exclusions.** Traits already held or nominated, traits that must be
//!    earned rather than drafted, inheritable traits, traits contradicted
//!    by history, and traits conflicting with anything held.
//! 3. **Padding.** The pool grows with uniform draws from the catalog
//!    (minus exclusions) until it holds `max(2, 2 × directed)` entries.
//!    Each slot gets a bounded number of draws; an exhausted slot ends
//!    padding early.
//! 4. **Granting.** Uniform picks from the pool until the agent holds the
//!    target count or the pool runs dry. A pick that would duplicate or
//!    conflict with a held trait is discarded.
//!
//! Finally the feats are rendered against the final trait set and written
//! to the childhood biography slot.

use std::collections::BTreeSet;

use ageist_types::{AgentHistory, Backstory, LifeStage, Trait, TraitId};
use rand::Rng;
use rand::seq::IndexedRandom;
use tracing::{debug, warn};

use crate::catalog::TraitCatalog;
use crate::config::GrowthConfig;
use crate::host::GrowthHost;

/// Separator between feat fragments in the biography text.
pub const FEAT_SEPARATOR: &str = "\n\n";

// ---------------------------------------------------------------------------
// Feats
// ---------------------------------------------------------------------------

/// A narrative fragment tied to a trait.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChildhoodFeat {
    /// The trait whose presence selects the fragment.
    pub trait_id: TraitId,
    /// Text used when the agent ends up holding the trait.
    pub success: String,
    /// Text used otherwise. `None` contributes nothing.
    pub failure: Option<String>,
}

impl ChildhoodFeat {
    /// The fragment that applies to the given trait set, if any.
    pub fn describe(&self, held: &[Trait]) -> Option<&str> {
        if held.iter().any(|t| t.def == self.trait_id) {
            Some(&self.success)
        } else {
            self.failure.as_deref()
        }
    }
}

/// Collects feats during candidate selection and renders them afterwards.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DescriptionBuilder {
    feats: Vec<ChildhoodFeat>,
}

impl DescriptionBuilder {
    /// An empty builder.
    pub const fn new() -> Self {
        Self { feats: Vec::new() }
    }

    /// Append a feat.
    pub fn add(&mut self, feat: ChildhoodFeat) {
        self.feats.push(feat);
    }

    /// Number of feats collected.
    pub const fn len(&self) -> usize {
        self.feats.len()
    }

    /// Whether no feats were collected.
    pub const fn is_empty(&self) -> bool {
        self.feats.is_empty()
    }

    /// Render every applicable fragment joined by `separator`.
    pub fn build(&self, held: &[Trait], separator: &str) -> String {
        self.feats
            .iter()
            .filter_map(|feat| feat.describe(held))
            .collect::<Vec<_>>()
            .join(separator)
    }
}

// ---------------------------------------------------------------------------
// History rules
// ---------------------------------------------------------------------------

/// Stages during which a history rule is consulted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StageGate {
    /// Adolescent and Adult entries.
    AfterChild,
    /// Adolescent entry only.
    AdolescentOnly,
}

impl StageGate {
    /// Whether a pass for `stage` consults the rule.
    pub const fn admits(self, stage: LifeStage) -> bool {
        match self {
            Self::AfterChild => stage.index() > LifeStage::Child.index(),
            Self::AdolescentOnly => matches!(stage, LifeStage::Adolescent),
        }
    }
}

/// What a rule sees of the agent.
#[derive(Debug, Clone, Copy)]
pub struct HistoryView<'a> {
    /// Aggregate history counters.
    pub history: &'a AgentHistory,
    /// Biological age in whole years.
    pub age_years: u64,
    /// Biological age in whole days.
    pub age_days: u64,
}

/// Narrative text for a rule. `{name}` is replaced by the agent's name.
#[derive(Debug, Clone, Copy)]
pub struct FeatTemplate {
    /// Fragment when the trait is kept.
    pub success: &'static str,
    /// Fragment when it is not.
    pub failure: Option<&'static str>,
}

impl FeatTemplate {
    fn render(&self, trait_id: &TraitId, name: &str) -> ChildhoodFeat {
        ChildhoodFeat {
            trait_id: trait_id.clone(),
            success: self.success.replace("{name}", name),
            failure: self.failure.map(|text| text.replace("{name}", name)),
        }
    }
}

/// One history threshold that nominates a trait.
#[derive(Debug, Clone, Copy)]
pub struct HistoryRule {
    /// Trait nominated when the rule fires.
    pub trait_id: &'static str,
    /// Stages consulting the rule.
    pub gate: StageGate,
    /// The threshold test.
    pub qualifies: fn(&HistoryView<'_>) -> bool,
    /// Optional narrative.
    pub feat: Option<FeatTemplate>,
}

fn many_humanlike_kills(view: &HistoryView<'_>) -> bool {
    u64::from(view.history.kills_humanlike) >= view.age_years / 3
}

fn frequent_mental_breaks(view: &HistoryView<'_>) -> bool {
    u64::from(view.history.times_in_mental_state) >= view.age_years
}

const fn dug_a_lot(view: &HistoryView<'_>) -> bool {
    view.history.cells_mined > 10
}

fn hauled_every_day(view: &HistoryView<'_>) -> bool {
    u64::from(view.history.things_hauled) >= view.age_days.saturating_mul(2)
}

const fn ate_humanlike_meat(view: &HistoryView<'_>) -> bool {
    view.history.ate_humanlike_meat
}

const fn fought_fires(view: &HistoryView<'_>) -> bool {
    view.history.fires_extinguished > 0
}

/// The standard history rules, each evaluated independently.
pub const HISTORY_RULES: &[HistoryRule] = &[
    HistoryRule {
        trait_id: "Bloodlust",
        gate: StageGate::AfterChild,
        qualifies: many_humanlike_kills,
        feat: Some(FeatTemplate {
            success: "{name} struck many humans down. Perhaps it was out of necessity, but deep down, {name} enjoyed it.",
            failure: Some("{name} struck many humans down, but only did what was necessary."),
        }),
    },
    HistoryRule {
        trait_id: "Nerves",
        gate: StageGate::AfterChild,
        qualifies: frequent_mental_breaks,
        feat: None,
    },
    HistoryRule {
        trait_id: "Neurotic",
        gate: StageGate::AfterChild,
        qualifies: frequent_mental_breaks,
        feat: None,
    },
    HistoryRule {
        trait_id: "Psychopath",
        gate: StageGate::AfterChild,
        qualifies: frequent_mental_breaks,
        feat: Some(FeatTemplate {
            success: "{name} experienced life on a knife's edge, and their mental state suffered for it.",
            failure: Some(
                "{name} didn't have the healthiest upbringing, but pushed through relatively unscathed.",
            ),
        }),
    },
    HistoryRule {
        trait_id: "Undergrounder",
        gate: StageGate::AfterChild,
        qualifies: dug_a_lot,
        feat: None,
    },
    HistoryRule {
        trait_id: "Tough",
        gate: StageGate::AfterChild,
        qualifies: hauled_every_day,
        feat: Some(FeatTemplate {
            success: "Long days of hard work toughened {name}, and made them strong.",
            failure: None,
        }),
    },
    HistoryRule {
        trait_id: "Cannibal",
        gate: StageGate::AfterChild,
        qualifies: ate_humanlike_meat,
        feat: Some(FeatTemplate {
            success: "{name} had a taste of human meat, and enjoyed it.",
            failure: None,
        }),
    },
    HistoryRule {
        trait_id: "Pyromaniac",
        gate: StageGate::AdolescentOnly,
        qualifies: fought_fires,
        feat: Some(FeatTemplate {
            success: "{name} experienced fire, and enjoyed the flickering heat consuming everything they gave it.",
            failure: None,
        }),
    },
];

// ---------------------------------------------------------------------------
// Generator
// ---------------------------------------------------------------------------

/// What one retrospective pass did.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RetrospectiveOutcome {
    /// Traits granted, in grant order.
    pub granted: Vec<Trait>,
    /// The biography text written to the childhood slot.
    pub description: String,
    /// Whether padding stopped short of its goal.
    pub padding_abandoned: bool,
}

/// Run a retrospective pass for `stage`, topping the agent up to `target`
/// traits.
pub fn run_retrospective<H: GrowthHost + ?Sized>(
    catalog: &TraitCatalog,
    config: &GrowthConfig,
    stage: LifeStage,
    target: usize,
    host: &mut H,
    rng: &mut impl Rng,
) -> RetrospectiveOutcome {
    debug!(
        agent_id = ?host.agent_id(),
        %stage,
        target,
        held = host.traits().len(),
        "Running childhood retrospective"
    );

    let (mut pool, feats) = directed_candidates(stage, &*host);
    // Feats of candidates that clash with held traits still render their
    // failure text; the candidates themselves never reach the pool.
    pool.retain(|id| {
        let clashes = catalog.clashes_with_any(id, host.traits().iter().map(|t| &t.def));
        if clashes {
            debug!(
                agent_id = ?host.agent_id(),
                trait_id = %id,
                "Dropping clashing directed candidate"
            );
        }
        !clashes
    });
    let excluded = exclusions(catalog, config, &*host, &pool);
    let draftable: Vec<&TraitId> = catalog
        .iter()
        .map(|def| &def.id)
        .filter(|id| !excluded.contains(*id))
        .collect();
    let padding_abandoned = pad_pool(catalog, config, &draftable, &mut pool, rng);
    if padding_abandoned {
        warn!(
            agent_id = ?host.agent_id(),
            pool = pool.len(),
            "Could not pad retrospective pool, continuing with fewer candidates"
        );
    }
    let granted = grant_from_pool(catalog, config, target, host, pool, &draftable, rng);

    let description = feats.build(host.traits(), FEAT_SEPARATOR);
    host.biography_mut().childhood = Some(Backstory {
        title: String::from("Child"),
        title_short: String::from("child"),
        description: description.clone(),
    });

    debug!(
        agent_id = ?host.agent_id(),
        granted = granted.len(),
        "Childhood retrospective complete"
    );
    RetrospectiveOutcome {
        granted,
        description,
        padding_abandoned,
    }
}

/// Evaluate every history rule admitted at `stage`.
fn directed_candidates<H: GrowthHost + ?Sized>(
    stage: LifeStage,
    host: &H,
) -> (Vec<TraitId>, DescriptionBuilder) {
    let view = HistoryView {
        history: host.history(),
        age_years: host.age_biological_years(),
        age_days: host.age_biological_days(),
    };
    let name = host.display_name();
    let mut pool = Vec::new();
    let mut feats = DescriptionBuilder::new();
    for rule in HISTORY_RULES {
        let id = TraitId::from(rule.trait_id);
        if !rule.gate.admits(stage) || host.has_trait(&id) || !(rule.qualifies)(&view) {
            continue;
        }
        if let Some(template) = &rule.feat {
            feats.add(template.render(&id, name));
        }
        pool.push(id);
    }
    (pool, feats)
}

/// Traits that must never be drafted at random for this agent.
fn exclusions<H: GrowthHost + ?Sized>(
    catalog: &TraitCatalog,
    config: &GrowthConfig,
    host: &H,
    candidates: &[TraitId],
) -> BTreeSet<TraitId> {
    let history = host.history();
    let mut excluded: BTreeSet<TraitId> = config.never_drafted.iter().cloned().collect();
    excluded.extend(host.traits().iter().map(|t| t.def.clone()));
    excluded.extend(candidates.iter().cloned());
    if config.exclude_genetic_traits {
        excluded.extend(catalog.genetic_traits().cloned());
    }

    let mut contradicted = Vec::new();
    if host.has_bionic_part() {
        contradicted.push("BodyPurist");
    }
    if history.times_on_fire > 0 {
        contradicted.push("Pyromaniac");
    }
    if history.shots_fired == 0 || history.damage_dealt == 0 {
        contradicted.push("ShootingAccuracy");
    }
    if history.damage_dealt == 0 || history.shots_fired > 0 {
        contradicted.push("Brawler");
    }
    if !history.has_taken_any_drug() {
        contradicted.push("DrugDesire");
    }
    excluded.extend(contradicted.into_iter().map(TraitId::from));

    let held: Vec<&TraitId> = host.traits().iter().map(|t| &t.def).collect();
    excluded.extend(
        catalog
            .iter()
            .filter(|def| catalog.clashes_with_any(&def.id, held.iter().copied()))
            .map(|def| def.id.clone()),
    );
    excluded
}

/// Grow the pool with random drafts. Returns `true` if padding was
/// abandoned before reaching its goal.
fn pad_pool(
    catalog: &TraitCatalog,
    config: &GrowthConfig,
    draftable: &[&TraitId],
    pool: &mut Vec<TraitId>,
    rng: &mut impl Rng,
) -> bool {
    let goal = pool.len().saturating_mul(2).max(2);
    while pool.len() < goal {
        let Some(id) = draw_compatible(catalog, config, draftable, pool.iter(), rng) else {
            return true;
        };
        pool.push(id);
    }
    false
}

/// Draw a draftable trait that clashes with nothing in `against`, giving up
/// after `max_draw_attempts` draws.
fn draw_compatible<'a>(
    catalog: &TraitCatalog,
    config: &GrowthConfig,
    draftable: &[&TraitId],
    against: impl Iterator<Item = &'a TraitId> + Clone,
    rng: &mut impl Rng,
) -> Option<TraitId> {
    for _ in 0..config.max_draw_attempts {
        let &id = draftable.choose(rng)?;
        if !catalog.clashes_with_any(id, against.clone()) {
            return Some(id.clone());
        }
    }
    None
}

/// Grant uniformly picked candidates until the agent holds `target` traits.
/// When the pool runs dry first, further drafts are drawn against the traits
/// the agent now holds.
fn grant_from_pool<H: GrowthHost + ?Sized>(
    catalog: &TraitCatalog,
    config: &GrowthConfig,
    target: usize,
    host: &mut H,
    mut pool: Vec<TraitId>,
    draftable: &[&TraitId],
    rng: &mut impl Rng,
) -> Vec<Trait> {
    let mut granted = Vec::new();
    while host.traits().len() < target {
        let id = if pool.is_empty() {
            let held: Vec<TraitId> = host.traits().iter().map(|t| t.def.clone()).collect();
            let Some(id) = draw_compatible(catalog, config, draftable, held.iter(), rng) else {
                debug!(
                    agent_id = ?host.agent_id(),
                    held = held.len(),
                    target,
                    "No compatible draft left, stopping short of target"
                );
                break;
            };
            id
        } else {
            let pick = rng.random_range(0..pool.len());
            let id = pool.swap_remove(pick);
            pool.retain(|other| other != &id);
            id
        };
        if catalog.clashes_with_any(&id, host.traits().iter().map(|t| &t.def)) {
            debug!(agent_id = ?host.agent_id(), trait_id = %id, "Skipping clashing candidate");
            continue;
        }
        let granted_trait = catalog.instantiate(&id, rng);
        host.traits_mut().push(granted_trait.clone());
        granted.push(granted_trait);
    }
    granted
}
