//! Stage-gated fear evaluators.
//!
//! An evaluator decides, per agent and per evaluation, whether a fear
//! thought should surface. The flow for every kind is the same (see
//! [`evaluate_fear`]):
//!
//! 1. The agent's current growth stage must fall inside the evaluator's
//!    eligible range (Toddler through Child by default).
//! 2. The fear is registered with the agent's [`FearRegistry`], which rolls
//!    it once per epoch.
//! 3. If the fear is active, the evaluator's readiness condition decides.
//!
//! Readiness inputs come from the host as a [`FearContext`] snapshot.
//!
//! [`FearRegistry`]: crate::fears::FearRegistry

use core::ops::RangeInclusive;

use ageist_types::{FearKind, LifeStage};
use rand::Rng;

use crate::growth::GrowthState;

/// Ticks without light before fear of the dark triggers.
pub const DARK_TICKS_THRESHOLD: u64 = 1200;

/// Ticks a thunderstorm must have lasted before fear of thunder triggers.
pub const THUNDER_WEATHER_AGE_THRESHOLD: u64 = 1500;

/// Ceiling of the gunfire repeat buffer.
pub const GUNFIRE_MAX_REPEAT_BUFFER: u32 = 18;

/// The gunfire buffer must exceed this for the fear to surface.
pub const GUNFIRE_TRIGGER_LEVEL: u32 = 6;

/// Environmental inputs for one evaluation of one agent.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FearContext {
    /// Whether the agent is awake.
    pub awake: bool,
    /// Ticks since the agent last stood in light.
    pub ticks_since_light: u64,
    /// Whether a thunderstorm is the current weather.
    pub thunderstorm: bool,
    /// Ticks the current weather has lasted.
    pub weather_age_ticks: u64,
    /// Whether the agent itself is aiming at a target.
    pub self_aiming: bool,
    /// Number of nearby humanlikes currently aiming at something.
    pub nearby_aimers: u32,
}

/// A fear thought to be surfaced to the mood collaborator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FearThought {
    /// Which fear produced the thought.
    pub kind: FearKind,
    /// The growth stage the agent was in when the thought surfaced.
    pub stage: LifeStage,
}

/// A stage-gated fear with a domain-specific readiness condition.
pub trait FearEvaluator {
    /// The fear this evaluator manages.
    fn kind(&self) -> FearKind;

    /// Stages during which the fear can be rolled and surfaced.
    fn eligible_stages(&self) -> RangeInclusive<LifeStage> {
        LifeStage::Toddler..=LifeStage::Child
    }

    /// Whether the readiness condition currently holds.
    fn should_surface(&mut self, ctx: &FearContext) -> bool;
}

/// Fear of prolonged darkness.
#[derive(Debug, Clone, Copy, Default)]
pub struct DarkFear;

impl FearEvaluator for DarkFear {
    fn kind(&self) -> FearKind {
        FearKind::Dark
    }

    fn should_surface(&mut self, ctx: &FearContext) -> bool {
        ctx.awake && ctx.ticks_since_light > DARK_TICKS_THRESHOLD
    }
}

/// Fear of a sustained thunderstorm.
#[derive(Debug, Clone, Copy, Default)]
pub struct ThunderFear;

impl FearEvaluator for ThunderFear {
    fn kind(&self) -> FearKind {
        FearKind::Thunder
    }

    fn should_surface(&mut self, ctx: &FearContext) -> bool {
        ctx.thunderstorm && ctx.weather_age_ticks > THUNDER_WEATHER_AGE_THRESHOLD
    }
}

/// Fear of sustained nearby gunfire.
///
/// Keeps a per-agent repeat buffer: each nearby aimer bumps it (up to
/// [`GUNFIRE_MAX_REPEAT_BUFFER`]); an evaluation with no aimers decays it
/// by one. The fear surfaces while the buffer exceeds
/// [`GUNFIRE_TRIGGER_LEVEL`], so brief skirmishes pass unnoticed and the
/// fear lingers for a while after shooting stops.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct GunfireFear {
    repeat_buffer: u32,
}

impl GunfireFear {
    /// Current buffer level.
    pub const fn repeat_buffer(&self) -> u32 {
        self.repeat_buffer
    }
}

impl FearEvaluator for GunfireFear {
    fn kind(&self) -> FearKind {
        FearKind::Gunfire
    }

    fn should_surface(&mut self, ctx: &FearContext) -> bool {
        if ctx.self_aiming {
            return false;
        }
        if ctx.nearby_aimers == 0 {
            self.repeat_buffer = self.repeat_buffer.saturating_sub(1);
        } else {
            self.repeat_buffer = self
                .repeat_buffer
                .saturating_add(ctx.nearby_aimers)
                .min(GUNFIRE_MAX_REPEAT_BUFFER);
        }
        self.repeat_buffer > GUNFIRE_TRIGGER_LEVEL
    }
}

/// Run one evaluator against one agent's growth state.
///
/// Returns the thought to surface, if any. Agents outside the eligible
/// stage range are neither rolled nor evaluated.
pub fn evaluate_fear(
    evaluator: &mut dyn FearEvaluator,
    growth: &mut GrowthState,
    chance_pct: u32,
    ctx: &FearContext,
    rng: &mut impl Rng,
) -> Option<FearThought> {
    let stage = growth.current_stage();
    if !evaluator.eligible_stages().contains(&stage) {
        return None;
    }
    let kind = evaluator.kind();
    if !growth.fears_mut().register(kind, chance_pct, rng) {
        return None;
    }
    evaluator
        .should_surface(ctx)
        .then_some(FearThought { kind, stage })
}

/// The three standard evaluators for one agent.
#[derive(Debug, Clone, Copy, Default)]
pub struct FearEvaluators {
    /// Fear of the dark.
    pub dark: DarkFear,
    /// Fear of thunder.
    pub thunder: ThunderFear,
    /// Fear of gunfire, with its repeat buffer.
    pub gunfire: GunfireFear,
}

impl FearEvaluators {
    /// Evaluate every fear kind and collect the thoughts that surface.
    pub fn evaluate_all(
        &mut self,
        growth: &mut GrowthState,
        chance_pct: u32,
        ctx: &FearContext,
        rng: &mut impl Rng,
    ) -> Vec<FearThought> {
        let evaluators: [&mut dyn FearEvaluator; 3] =
            [&mut self.dark, &mut self.thunder, &mut self.gunfire];
        evaluators
            .into_iter()
            .filter_map(|evaluator| evaluate_fear(evaluator, growth, chance_pct, ctx, rng))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use rand::SeedableRng;
    use rand::rngs::SmallRng;

    use super::*;

    fn state_at(stage: LifeStage) -> GrowthState {
        GrowthState::at_stage(stage)
    }

    fn dark_ctx() -> FearContext {
        FearContext {
            awake: true,
            ticks_since_light: 5000,
            ..FearContext::default()
        }
    }

    #[test]
    fn dark_requires_awake_and_long_darkness() {
        let mut dark = DarkFear;
        assert!(dark.should_surface(&dark_ctx()));
        assert!(!dark.should_surface(&FearContext {
            awake: false,
            ..dark_ctx()
        }));
        assert!(!dark.should_surface(&FearContext {
            ticks_since_light: DARK_TICKS_THRESHOLD,
            ..dark_ctx()
        }));
    }

    #[test]
    fn thunder_requires_established_storm() {
        let mut thunder = ThunderFear;
        let storm = FearContext {
            thunderstorm: true,
            weather_age_ticks: 2000,
            ..FearContext::default()
        };
        assert!(thunder.should_surface(&storm));
        assert!(!thunder.should_surface(&FearContext {
            weather_age_ticks: 100,
            ..storm
        }));
        assert!(!thunder.should_surface(&FearContext {
            thunderstorm: false,
            ..storm
        }));
    }

    #[test]
    fn gunfire_buffer_builds_and_decays() {
        let mut gunfire = GunfireFear::default();
        let shooting = FearContext {
            nearby_aimers: 1,
            ..FearContext::default()
        };
        let quiet = FearContext::default();

        for _ in 0..6 {
            assert!(!gunfire.should_surface(&shooting));
        }
        assert!(gunfire.should_surface(&shooting));
        assert_eq!(gunfire.repeat_buffer(), 7);

        // Buffer caps at the maximum.
        for _ in 0..40 {
            gunfire.should_surface(&shooting);
        }
        assert_eq!(gunfire.repeat_buffer(), GUNFIRE_MAX_REPEAT_BUFFER);

        // Decays one step per quiet evaluation, never below zero.
        for _ in 0..11 {
            assert!(gunfire.should_surface(&quiet));
        }
        assert!(!gunfire.should_surface(&quiet));
        for _ in 0..40 {
            gunfire.should_surface(&quiet);
        }
        assert_eq!(gunfire.repeat_buffer(), 0);
    }

    #[test]
    fn gunfire_ignored_while_aiming() {
        let mut gunfire = GunfireFear::default();
        let ctx = FearContext {
            self_aiming: true,
            nearby_aimers: 5,
            ..FearContext::default()
        };
        assert!(!gunfire.should_surface(&ctx));
        assert_eq!(gunfire.repeat_buffer(), 0);
    }

    #[test]
    fn ineligible_stage_never_rolls() {
        let mut rng = SmallRng::seed_from_u64(42);
        for stage in [LifeStage::Infant, LifeStage::Adolescent, LifeStage::Adult] {
            let mut growth = state_at(stage);
            let thought = evaluate_fear(&mut DarkFear, &mut growth, 100, &dark_ctx(), &mut rng);
            assert_eq!(thought, None);
            assert!(!growth.fears().is_known(FearKind::Dark), "{stage}");
        }
    }

    #[test]
    fn eligible_stage_rolls_and_surfaces() {
        let mut rng = SmallRng::seed_from_u64(42);
        for stage in [LifeStage::Toddler, LifeStage::Child] {
            let mut growth = state_at(stage);
            let thought = evaluate_fear(&mut DarkFear, &mut growth, 100, &dark_ctx(), &mut rng);
            assert_eq!(
                thought,
                Some(FearThought {
                    kind: FearKind::Dark,
                    stage
                })
            );
        }
    }

    #[test]
    fn inactive_fear_never_surfaces() {
        let mut rng = SmallRng::seed_from_u64(42);
        let mut growth = state_at(LifeStage::Child);
        assert_eq!(
            evaluate_fear(&mut DarkFear, &mut growth, 0, &dark_ctx(), &mut rng),
            None
        );
        assert!(growth.fears().is_known(FearKind::Dark));
        // Already decided: a later certain chance does not re-roll.
        assert_eq!(
            evaluate_fear(&mut DarkFear, &mut growth, 100, &dark_ctx(), &mut rng),
            None
        );
    }

    #[test]
    fn evaluate_all_collects_ready_fears() {
        let mut rng = SmallRng::seed_from_u64(42);
        let mut growth = state_at(LifeStage::Toddler);
        let mut evaluators = FearEvaluators::default();
        let ctx = FearContext {
            thunderstorm: true,
            weather_age_ticks: 3000,
            ..dark_ctx()
        };
        let thoughts = evaluators.evaluate_all(&mut growth, 100, &ctx, &mut rng);
        let kinds: Vec<FearKind> = thoughts.iter().map(|t| t.kind).collect();
        assert_eq!(kinds, vec![FearKind::Dark, FearKind::Thunder]);
        assert!(growth.fears().is_known(FearKind::Gunfire));
    }
}
