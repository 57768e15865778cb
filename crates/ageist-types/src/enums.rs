//! Enumeration types for the Ageist growth simulation.
//!
//! Life stages, skills, passion tiers, and fear categories. Every enum is
//! totally ordered where ordering carries meaning (stages, passions) and
//! serializes by variant name.

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Life stages
// ---------------------------------------------------------------------------

/// An ordered phase of the age-progression lifecycle.
///
/// Declaration order is the lifecycle order, so `Infant < Toddler < ... <
/// Adult` holds under the derived [`Ord`]. `Adult` is terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum LifeStage {
    /// Younger than one year.
    Infant,
    /// One to four years.
    Toddler,
    /// From four years until the host reports adolescence.
    Child,
    /// From adolescence until adulthood.
    Adolescent,
    /// Grown up. Reaching this stage ends the growth effect.
    Adult,
}

impl LifeStage {
    /// Every stage in lifecycle order.
    pub const ALL: [Self; 5] = [
        Self::Infant,
        Self::Toddler,
        Self::Child,
        Self::Adolescent,
        Self::Adult,
    ];

    /// Map a host life-stage index onto a stage.
    ///
    /// Indices past the last stage saturate to [`LifeStage::Adult`].
    pub const fn from_index(index: usize) -> Self {
        match index {
            0 => Self::Infant,
            1 => Self::Toddler,
            2 => Self::Child,
            3 => Self::Adolescent,
            _ => Self::Adult,
        }
    }

    /// Position of this stage in [`LifeStage::ALL`].
    pub const fn index(self) -> usize {
        match self {
            Self::Infant => 0,
            Self::Toddler => 1,
            Self::Child => 2,
            Self::Adolescent => 3,
            Self::Adult => 4,
        }
    }

    /// Render severity for this stage, in percent.
    ///
    /// The rendering collaborator scales the agent's body by this value.
    pub const fn severity_pct(self) -> u32 {
        match self {
            Self::Infant => 10,
            Self::Toddler => 25,
            Self::Child => 50,
            Self::Adolescent => 75,
            Self::Adult => 100,
        }
    }

    /// Whether this is the terminal stage.
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Adult)
    }
}

impl core::fmt::Display for LifeStage {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::Infant => write!(f, "infant"),
            Self::Toddler => write!(f, "toddler"),
            Self::Child => write!(f, "child"),
            Self::Adolescent => write!(f, "adolescent"),
            Self::Adult => write!(f, "adult"),
        }
    }
}

// ---------------------------------------------------------------------------
// Skills and passions
// ---------------------------------------------------------------------------

/// A skill tracked in the agent's skill table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Skill {
    /// Ranged weapons.
    Shooting,
    /// Close combat.
    Melee,
    /// Building and repairing.
    Construction,
    /// Digging and drilling.
    Mining,
    /// Preparing meals.
    Cooking,
    /// Sowing and harvesting.
    Plants,
    /// Taming and training animals.
    Animals,
    /// Making items at workbenches.
    Crafting,
    /// Making art.
    Artistic,
    /// Tending and surgery.
    Medicine,
    /// Negotiation and recruitment.
    Social,
    /// Research.
    Intellectual,
}

impl Skill {
    /// Every skill, in table order.
    pub const ALL: [Self; 12] = [
        Self::Shooting,
        Self::Melee,
        Self::Construction,
        Self::Mining,
        Self::Cooking,
        Self::Plants,
        Self::Animals,
        Self::Crafting,
        Self::Artistic,
        Self::Medicine,
        Self::Social,
        Self::Intellectual,
    ];

    /// Lowercase human-readable label used in notifications.
    pub const fn label(self) -> &'static str {
        match self {
            Self::Shooting => "shooting",
            Self::Melee => "melee",
            Self::Construction => "construction",
            Self::Mining => "mining",
            Self::Cooking => "cooking",
            Self::Plants => "plants",
            Self::Animals => "animals",
            Self::Crafting => "crafting",
            Self::Artistic => "artistic",
            Self::Medicine => "medicine",
            Self::Social => "social",
            Self::Intellectual => "intellectual",
        }
    }
}

impl core::fmt::Display for Skill {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.label())
    }
}

/// Tiered affinity for a skill.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub enum Passion {
    /// No particular interest.
    #[default]
    None,
    /// Interested.
    Minor,
    /// Burning passion. The highest tier.
    Major,
}

impl Passion {
    /// The next tier up, or `None` when already at [`Passion::Major`].
    pub const fn next(self) -> Option<Self> {
        match self {
            Self::None => Some(Self::Minor),
            Self::Minor => Some(Self::Major),
            Self::Major => None,
        }
    }

    /// Whether this is the highest tier.
    pub const fn is_max(self) -> bool {
        matches!(self, Self::Major)
    }
}

impl core::fmt::Display for Passion {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::None => write!(f, "none"),
            Self::Minor => write!(f, "minor"),
            Self::Major => write!(f, "major"),
        }
    }
}

// ---------------------------------------------------------------------------
// Fears
// ---------------------------------------------------------------------------

/// A category of stage-gated fear.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum FearKind {
    /// Fear of prolonged darkness.
    Dark,
    /// Fear of thunderstorms.
    Thunder,
    /// Fear of nearby gunfire.
    Gunfire,
}

impl FearKind {
    /// Every fear kind.
    pub const ALL: [Self; 3] = [Self::Dark, Self::Thunder, Self::Gunfire];
}

impl core::fmt::Display for FearKind {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::Dark => write!(f, "dark"),
            Self::Thunder => write!(f, "thunder"),
            Self::Gunfire => write!(f, "gunfire"),
        }
    }
}
