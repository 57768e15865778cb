//! Deferred passion grants.
//!
//! Bootstrap seeds a handful of [`PassionEvent`]s with activation ages
//! spread over late childhood. Gaining skill levels may enqueue more
//! events that are ready immediately. Each tick, every pending event whose
//! activation age has been reached fires once, provided the agent is awake
//! and not in a mental state, raising the passion tier of one skill.

use ageist_types::{Passion, Skill};
use rand::Rng;
use rand::seq::IndexedRandom;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::config::GrowthConfig;
use crate::error::GrowthError;
use crate::host::GrowthHost;

/// A one-shot passion grant scheduled for a biological age.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PassionEvent {
    /// Biological age in ticks at which the event becomes eligible.
    pub activation_age_ticks: u64,
    /// Whether the event has fired.
    pub applied: bool,
}

impl PassionEvent {
    /// A pending event activating at `activation_age_ticks`.
    pub const fn at(activation_age_ticks: u64) -> Self {
        Self {
            activation_age_ticks,
            applied: false,
        }
    }
}

/// Result of one successful passion grant.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PassionGrant {
    /// The skill whose passion was raised.
    pub skill: Skill,
    /// The new passion tier.
    pub passion: Passion,
    /// Player-facing notification text.
    pub message: String,
}

/// Per-agent queue of passion events plus the skill-total baseline used to
/// detect newly gained levels.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PassionScheduler {
    #[serde(default)]
    events: Vec<PassionEvent>,
    #[serde(default)]
    skill_value_baseline: u32,
}

impl PassionScheduler {
    /// An empty scheduler.
    pub const fn new() -> Self {
        Self {
            events: Vec::new(),
            skill_value_baseline: 0,
        }
    }

    /// Replace the queue with a fresh set of bootstrap events.
    ///
    /// Draws between `bootstrap_passions_min` and `bootstrap_passions_max`
    /// events (inclusive), each activating at a uniform age inside the
    /// configured window.
    ///
    /// # Errors
    ///
    /// Returns [`GrowthError::ArithmeticOverflow`] if the window does not
    /// fit in ticks.
    pub fn seed(&mut self, config: &GrowthConfig, rng: &mut impl Rng) -> Result<(), GrowthError> {
        let (window_min, window_max) = config.passion_window_ticks()?;
        let count = rng.random_range(config.bootstrap_passions_min..=config.bootstrap_passions_max);
        self.events = (0..count)
            .map(|_| PassionEvent::at(rng.random_range(window_min..window_max)))
            .collect();
        Ok(())
    }

    /// Queue an event that is ready as soon as the gate allows.
    pub fn enqueue_immediate(&mut self) {
        self.events.push(PassionEvent::at(0));
    }

    /// All events, applied and pending, in queue order.
    pub fn events(&self) -> &[PassionEvent] {
        &self.events
    }

    /// Number of events that have not fired.
    pub fn pending(&self) -> usize {
        self.events.iter().filter(|e| !e.applied).count()
    }

    /// Last observed skill total.
    pub const fn skill_value_baseline(&self) -> u32 {
        self.skill_value_baseline
    }

    /// Set the baseline without rolling for new events.
    pub const fn resync_baseline(&mut self, total: u32) {
        self.skill_value_baseline = total;
    }

    /// Compare the current skill total with the baseline.
    ///
    /// Every level gained since the last observation rolls 1 in `odds` to
    /// enqueue an immediate event. Losses roll nothing. The baseline always
    /// moves to `total`. Returns how many events were enqueued.
    pub fn observe_skill_total(&mut self, total: u32, odds: u32, rng: &mut impl Rng) -> u32 {
        let gained = total.saturating_sub(self.skill_value_baseline);
        self.skill_value_baseline = total;
        let mut enqueued = 0_u32;
        if odds == 0 {
            return enqueued;
        }
        for _ in 0..gained {
            if rng.random_ratio(1, odds) {
                self.enqueue_immediate();
                enqueued = enqueued.saturating_add(1);
            }
        }
        enqueued
    }

    /// Fire every eligible pending event.
    ///
    /// An event is eligible once the agent's biological age reaches its
    /// activation age while the agent is awake and not in a mental state.
    /// An event whose grant cannot find a skill below the top tier within
    /// `max_attempts` draws is abandoned: it is marked applied and never
    /// retried.
    pub fn update<H: GrowthHost + ?Sized>(
        &mut self,
        host: &mut H,
        max_attempts: u32,
        rng: &mut impl Rng,
    ) -> Vec<PassionGrant> {
        let mut grants = Vec::new();
        if !host.is_awake() || host.in_mental_state() {
            return grants;
        }
        let age = host.age_biological_ticks();
        for event in &mut self.events {
            if event.applied || age < event.activation_age_ticks {
                continue;
            }
            event.applied = true;
            if let Some(grant) = apply_passion(host, max_attempts, rng) {
                grants.push(grant);
            }
        }
        grants
    }
}

/// Raise the passion of one skill, favouring higher-level skills.
///
/// Skills are drawn with weight equal to their level (uniformly when every
/// level is zero). Draws landing on a skill already at the top tier are
/// discarded; after `max_attempts` draws the grant is abandoned.
fn apply_passion<H: GrowthHost + ?Sized>(
    host: &mut H,
    max_attempts: u32,
    rng: &mut impl Rng,
) -> Option<PassionGrant> {
    let candidates: Vec<(Skill, u32, Passion)> = host
        .skills()
        .iter()
        .map(|(skill, record)| (*skill, record.level, record.passion))
        .collect();

    let mut picked = None;
    for _ in 0..max_attempts {
        let draw = candidates
            .choose_weighted(rng, |(_, level, _)| *level)
            .ok()
            .or_else(|| candidates.choose(rng));
        if let Some(&(skill, _, passion)) = draw
            && let Some(next) = passion.next()
        {
            picked = Some((skill, next));
            break;
        }
    }

    let Some((skill, passion)) = picked else {
        warn!(
            agent_id = ?host.agent_id(),
            attempts = max_attempts,
            "No skill available for a passion grant, abandoning event"
        );
        return None;
    };

    if let Some(record) = host.skills_mut().get_mut(&skill) {
        record.passion = passion;
    }
    let message = format!(
        "{} has developed a {} passion for {}.",
        host.display_name(),
        passion,
        skill.label()
    );
    debug!(agent_id = ?host.agent_id(), %skill, %passion, "Passion granted");
    Some(PassionGrant {
        skill,
        passion,
        message,
    })
}
