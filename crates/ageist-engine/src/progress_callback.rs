//! Step callback that keeps running totals and logs progress.

use ageist_core::{SimulationState, TickCallback, TickSummary};
use ageist_growth::GrowthEvent;
use tracing::info;

/// Running totals across the whole run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct GrowthTotals {
    /// Stage entries applied.
    pub stages_entered: u64,
    /// Traits granted by childhood retrospectives.
    pub traits_granted: u64,
    /// Passion tiers raised.
    pub passions_gained: u64,
    /// Fear thoughts surfaced.
    pub fears_surfaced: u64,
    /// Colonists who finished growing up.
    pub graduated: u64,
}

/// Callback that logs a progress line every `report_every` steps.
pub struct ProgressCallback {
    report_every: u64,
    totals: GrowthTotals,
}

impl ProgressCallback {
    /// Report every `report_every` steps (0 disables periodic reports).
    pub const fn new(report_every: u64) -> Self {
        Self {
            report_every,
            totals: GrowthTotals {
                stages_entered: 0,
                traits_granted: 0,
                passions_gained: 0,
                fears_surfaced: 0,
                graduated: 0,
            },
        }
    }

    /// Totals accumulated so far.
    pub const fn totals(&self) -> GrowthTotals {
        self.totals
    }

    fn record(&mut self, summary: &TickSummary) {
        let t = &mut self.totals;
        for (_, event) in &summary.growth_events {
            match event {
                GrowthEvent::StageEntered { .. } => {
                    t.stages_entered = t.stages_entered.saturating_add(1);
                }
                GrowthEvent::TraitsGranted { traits, .. } => {
                    t.traits_granted = t.traits_granted.saturating_add(as_u64(traits.len()));
                }
                GrowthEvent::PassionGained(_) => {
                    t.passions_gained = t.passions_gained.saturating_add(1);
                }
                GrowthEvent::StageChanged { .. }
                | GrowthEvent::Bootstrapped { .. }
                | GrowthEvent::RemovalRequested => {}
            }
        }
        t.fears_surfaced = t
            .fears_surfaced
            .saturating_add(as_u64(summary.fear_thoughts.len()));
        t.graduated = t.graduated.saturating_add(as_u64(summary.graduated.len()));
    }
}

impl TickCallback for ProgressCallback {
    fn on_tick(&mut self, summary: &TickSummary, sim: &SimulationState) {
        self.record(summary);

        if self.report_every > 0 && summary.step.checked_rem(self.report_every) == Some(0) {
            let t = self.totals;
            info!(
                step = summary.step,
                day = sim.clock.game_tick() / ageist_types::TICKS_PER_DAY,
                growing = summary.growing,
                stages_entered = t.stages_entered,
                traits_granted = t.traits_granted,
                passions_gained = t.passions_gained,
                fears_surfaced = t.fears_surfaced,
                graduated = t.graduated,
                "Progress"
            );
        }
    }
}

fn as_u64(n: usize) -> u64 {
    u64::try_from(n).unwrap_or(u64::MAX)
}
