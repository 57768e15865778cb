//! Per-agent fear registry.
//!
//! Each [`FearKind`] is decided at most once per "known" epoch: the first
//! registration rolls against a percentage chance and marks the kind known
//! regardless of the outcome, so later registrations are no-ops. Entering
//! adolescence forgets everything and starts a new epoch.
//!
//! Invariant: `active` is always a subset of `known`.
//!
//! Both sets are stored as `Option` so a save record with missing lists
//! restores as "absent" rather than failing. [`FearRegistry::repair`]
//! re-initialises such a registry to empty and logs an error against the
//! owning agent; mutations on an unrepaired registry heal it silently. The
//! agent loses its fear history but the registry stays consistent.

use std::collections::BTreeSet;

use ageist_types::{AgentId, FearKind};
use rand::Rng;
use serde::{Deserialize, Serialize};
use tracing::{error, warn};

/// What [`FearRegistry::repair`] had to fix.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FearRepair {
    /// Nothing was wrong.
    Intact,
    /// A list was missing and the registry was reset to empty.
    Reset,
    /// Active fears were missing from the known set and were added.
    KnownExtended,
}

/// The set of fears an agent has rolled, and the subset that stuck.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FearRegistry {
    #[serde(default)]
    known: Option<BTreeSet<FearKind>>,
    #[serde(default)]
    active: Option<BTreeSet<FearKind>>,
}

impl Default for FearRegistry {
    fn default() -> Self {
        Self {
            known: Some(BTreeSet::new()),
            active: Some(BTreeSet::new()),
        }
    }
}

impl FearRegistry {
    /// An empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Roll a fear once per epoch.
    ///
    /// If `kind` is already known this does nothing. Otherwise the fear
    /// becomes active with probability `chance_pct / 100` and is marked
    /// known either way. Returns whether the fear is active afterwards.
    pub fn register(&mut self, kind: FearKind, chance_pct: u32, rng: &mut impl Rng) -> bool {
        let (known, active) = self.sets_mut();
        if known.contains(&kind) {
            return active.contains(&kind);
        }
        let roll: u32 = rng.random_range(1..=100);
        if roll <= chance_pct {
            active.insert(kind);
        }
        known.insert(kind);
        active.contains(&kind)
    }

    /// Clear both sets, starting a new epoch.
    pub fn forget(&mut self) {
        let (known, active) = self.sets_mut();
        known.clear();
        active.clear();
    }

    /// Whether `kind` is an active fear.
    pub fn has(&self, kind: FearKind) -> bool {
        self.active.as_ref().is_some_and(|a| a.contains(&kind))
    }

    /// Whether `kind` has been rolled this epoch.
    pub fn is_known(&self, kind: FearKind) -> bool {
        self.known.as_ref().is_some_and(|k| k.contains(&kind))
    }

    /// Active fears in kind order.
    pub fn active(&self) -> impl Iterator<Item = FearKind> + '_ {
        self.active.iter().flatten().copied()
    }

    /// Known fears in kind order.
    pub fn known(&self) -> impl Iterator<Item = FearKind> + '_ {
        self.known.iter().flatten().copied()
    }

    /// Whether either list was missing (e.g. dropped from a save record).
    pub const fn is_corrupted(&self) -> bool {
        self.known.is_none() || self.active.is_none()
    }

    /// Re-establish the registry invariants for `agent_id`'s registry.
    ///
    /// Absent lists reset the whole registry to empty (logged as an error).
    /// Active fears missing from the known set are added to it (logged as a
    /// warning).
    pub fn repair(&mut self, agent_id: AgentId) -> FearRepair {
        let repaired = self.restore_invariants();
        match repaired {
            FearRepair::Reset => {
                error!(
                    agent_id = ?agent_id,
                    "Fear registry lists missing after restore, reinitialising to empty"
                );
            }
            FearRepair::KnownExtended => {
                warn!(agent_id = ?agent_id, "Active fears not marked known, repairing registry");
            }
            FearRepair::Intact => {}
        }
        repaired
    }

    fn restore_invariants(&mut self) -> FearRepair {
        if self.is_corrupted() {
            *self = Self::default();
            return FearRepair::Reset;
        }
        if let (Some(known), Some(active)) = (self.known.as_mut(), self.active.as_ref())
            && !active.is_subset(known)
        {
            known.extend(active.iter().copied());
            return FearRepair::KnownExtended;
        }
        FearRepair::Intact
    }

    fn sets_mut(&mut self) -> (&mut BTreeSet<FearKind>, &mut BTreeSet<FearKind>) {
        self.restore_invariants();
        let known = self.known.get_or_insert_with(BTreeSet::new);
        let active = self.active.get_or_insert_with(BTreeSet::new);
        (known, active)
    }
}
