//! Statically registered trait catalog.
//!
//! The retrospective draws random traits from "every known trait
//! definition". Instead of discovering definitions at runtime, the host
//! registers them up front in a [`TraitCatalog`] and passes it to the
//! engine. Each [`TraitDef`] declares its degrees, the traits it conflicts
//! with, and whether it is inheritable.
//!
//! Conflicts are symmetric: `a` conflicts with `b` when either definition
//! names the other.

use std::collections::BTreeMap;

use ageist_types::{Trait, TraitId};
use rand::Rng;
use rand::seq::IndexedRandom;
use serde::{Deserialize, Serialize};

use crate::error::GrowthError;

/// One trait definition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TraitDef {
    /// Definition identifier.
    pub id: TraitId,
    /// Degrees a granted instance may take. Empty means the single degree 0.
    #[serde(default)]
    pub degrees: Vec<i8>,
    /// Definitions this trait cannot coexist with.
    #[serde(default)]
    pub conflicts: Vec<TraitId>,
    /// Whether the trait is inherited rather than developed.
    #[serde(default)]
    pub genetic: bool,
}

impl TraitDef {
    /// A single-degree, non-genetic definition with no conflicts.
    pub fn new(id: impl Into<TraitId>) -> Self {
        Self {
            id: id.into(),
            degrees: Vec::new(),
            conflicts: Vec::new(),
            genetic: false,
        }
    }

    /// Set the spectrum of degrees.
    #[must_use]
    pub fn with_degrees(mut self, degrees: &[i8]) -> Self {
        self.degrees = degrees.to_vec();
        self
    }

    /// Add conflicting definitions.
    #[must_use]
    pub fn conflicting_with(mut self, others: &[&str]) -> Self {
        self.conflicts.extend(others.iter().map(|o| TraitId::from(*o)));
        self
    }

    /// Mark the definition as inheritable.
    #[must_use]
    pub const fn genetic(mut self) -> Self {
        self.genetic = true;
        self
    }
}

/// Registry of every trait definition the engine may grant.
///
/// Iteration order is registration order, which keeps seeded draws
/// reproducible.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TraitCatalog {
    defs: Vec<TraitDef>,
    index: BTreeMap<TraitId, usize>,
}

impl TraitCatalog {
    /// An empty catalog.
    pub const fn new() -> Self {
        Self {
            defs: Vec::new(),
            index: BTreeMap::new(),
        }
    }

    /// Build a catalog from a list of definitions.
    ///
    /// # Errors
    ///
    /// Returns [`GrowthError::DuplicateTrait`] if an identifier repeats, or
    /// [`GrowthError::DanglingConflict`] if a conflict names an unknown trait.
    pub fn from_defs(defs: impl IntoIterator<Item = TraitDef>) -> Result<Self, GrowthError> {
        let mut catalog = Self::new();
        for def in defs {
            catalog.register(def)?;
        }
        catalog.validate()?;
        Ok(catalog)
    }

    /// Register one definition.
    ///
    /// # Errors
    ///
    /// Returns [`GrowthError::DuplicateTrait`] if the identifier is taken.
    pub fn register(&mut self, def: TraitDef) -> Result<(), GrowthError> {
        if self.index.contains_key(&def.id) {
            return Err(GrowthError::DuplicateTrait(def.id));
        }
        self.index.insert(def.id.clone(), self.defs.len());
        self.defs.push(def);
        Ok(())
    }

    /// Check that every declared conflict names a registered trait.
    ///
    /// # Errors
    ///
    /// Returns [`GrowthError::DanglingConflict`] for the first bad reference.
    pub fn validate(&self) -> Result<(), GrowthError> {
        for def in &self.defs {
            if let Some(missing) = def.conflicts.iter().find(|c| !self.contains(c)) {
                return Err(GrowthError::DanglingConflict {
                    owner: def.id.clone(),
                    missing: missing.clone(),
                });
            }
        }
        Ok(())
    }

    /// Look up a definition.
    pub fn get(&self, id: &TraitId) -> Option<&TraitDef> {
        self.index.get(id).and_then(|&i| self.defs.get(i))
    }

    /// Whether the identifier is registered.
    pub fn contains(&self, id: &TraitId) -> bool {
        self.index.contains_key(id)
    }

    /// All definitions in registration order.
    pub fn iter(&self) -> impl Iterator<Item = &TraitDef> {
        self.defs.iter()
    }

    /// Number of registered definitions.
    pub const fn len(&self) -> usize {
        self.defs.len()
    }

    /// Whether the catalog is empty.
    pub const fn is_empty(&self) -> bool {
        self.defs.is_empty()
    }

    /// Identifiers of every inheritable trait.
    pub fn genetic_traits(&self) -> impl Iterator<Item = &TraitId> {
        self.defs.iter().filter(|d| d.genetic).map(|d| &d.id)
    }

    /// Whether two definitions conflict. Symmetric; a trait never conflicts
    /// with itself (duplicates are a separate check).
    pub fn conflicts_with(&self, a: &TraitId, b: &TraitId) -> bool {
        if a == b {
            return false;
        }
        let declares = |owner: &TraitId, other: &TraitId| {
            self.get(owner)
                .is_some_and(|def| def.conflicts.iter().any(|c| c == other))
        };
        declares(a, b) || declares(b, a)
    }

    /// Whether `candidate` duplicates or conflicts with any of `held`.
    pub fn clashes_with_any<'a>(
        &self,
        candidate: &TraitId,
        held: impl IntoIterator<Item = &'a TraitId>,
    ) -> bool {
        held.into_iter()
            .any(|h| h == candidate || self.conflicts_with(candidate, h))
    }

    /// Draw a degree for the definition. Unknown or single-degree traits get 0.
    pub fn random_degree(&self, id: &TraitId, rng: &mut impl Rng) -> i8 {
        self.get(id)
            .and_then(|def| def.degrees.choose(rng).copied())
            .unwrap_or(0)
    }

    /// Instantiate a trait with a randomly drawn degree.
    pub fn instantiate(&self, id: &TraitId, rng: &mut impl Rng) -> Trait {
        Trait::with_degree(id.clone(), self.random_degree(id, rng))
    }
}

/// The standard humanoid trait catalog.
///
/// # Errors
///
/// Returns a [`GrowthError`] only if the built-in table is inconsistent,
/// which the tests below rule out.
pub fn default_catalog() -> Result<TraitCatalog, GrowthError> {
    TraitCatalog::from_defs([
        TraitDef::new("Abrasive").conflicting_with(&["Kind"]),
        TraitDef::new("AnnoyingVoice").genetic(),
        TraitDef::new("Ascetic").conflicting_with(&["Greedy", "Jealous"]),
        TraitDef::new("Asexual").conflicting_with(&["Gay", "Bisexual"]),
        TraitDef::new("Beauty").with_degrees(&[-2, -1, 1, 2]).genetic(),
        TraitDef::new("Bisexual").conflicting_with(&["Gay"]),
        TraitDef::new("Bloodlust").conflicting_with(&["Kind"]),
        TraitDef::new("BodyPurist").conflicting_with(&["Transhumanist"]),
        TraitDef::new("Brawler").conflicting_with(&["ShootingAccuracy"]),
        TraitDef::new("Cannibal"),
        TraitDef::new("CreepyBreathing").genetic(),
        TraitDef::new("DislikesMen").conflicting_with(&["DislikesWomen"]),
        TraitDef::new("DislikesWomen"),
        TraitDef::new("DrugDesire").with_degrees(&[-1, 1, 2]),
        TraitDef::new("FastLearner"),
        TraitDef::new("Gay"),
        TraitDef::new("Gourmand"),
        TraitDef::new("Greedy"),
        TraitDef::new("Immunity").with_degrees(&[-1, 1]),
        TraitDef::new("Industriousness").with_degrees(&[-2, -1, 1, 2]),
        TraitDef::new("Jealous"),
        TraitDef::new("Kind").conflicting_with(&["Psychopath"]),
        TraitDef::new("Masochist"),
        TraitDef::new("NaturalMood").with_degrees(&[-2, -1, 1, 2]),
        TraitDef::new("Nerves").with_degrees(&[-2, -1, 1, 2]),
        TraitDef::new("Neurotic").with_degrees(&[1, 2]),
        TraitDef::new("NightOwl"),
        TraitDef::new("Nimble"),
        TraitDef::new("Nudist"),
        TraitDef::new("PsychicSensitivity")
            .with_degrees(&[-2, -1, 1, 2])
            .genetic(),
        TraitDef::new("Psychopath"),
        TraitDef::new("Pyromaniac"),
        TraitDef::new("QuickSleeper"),
        TraitDef::new("ShootingAccuracy").with_degrees(&[-1, 1]),
        TraitDef::new("SpeedOffset").with_degrees(&[-1, 1, 2]).genetic(),
        TraitDef::new("TooSmart"),
        TraitDef::new("Tough").conflicting_with(&["Wimp"]),
        TraitDef::new("Transhumanist"),
        TraitDef::new("Undergrounder"),
        TraitDef::new("Wimp"),
    ])
}
