//! # Core Types
//!
//! Closed vocabularies and plain value types shared by every observer.
//!
//! Every enumeration is a closed sum type with a strict string form:
//! parsing is exact (case-sensitive, no trimming, no coercion) and
//! serialization uses the same snake_case names the declaration
//! documents use.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;

/// Observation timestamps are always UTC.
pub type Timestamp = DateTime<Utc>;

// =============================================================================
// CLOSED VOCABULARIES
// =============================================================================

macro_rules! closed_vocabulary {
    (
        $(#[$meta:meta])*
        $name:ident { $($variant:ident => $text:literal),+ $(,)? }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        #[serde(rename_all = "snake_case")]
        pub enum $name {
            $($variant),+
        }

        impl $name {
            /// Every value, in declaration order.
            pub const ALL: &'static [$name] = &[$($name::$variant),+];

            /// The canonical string form.
            #[must_use]
            pub const fn as_str(self) -> &'static str {
                match self {
                    $($name::$variant => $text),+
                }
            }

            /// Strict parse of the canonical string form.
            ///
            /// Returns `None` for anything outside the closed set.
            #[must_use]
            pub fn parse(raw: &str) -> Option<Self> {
                match raw {
                    $($text => Some($name::$variant),)+
                    _ => None,
                }
            }

            /// Comma-separated list of accepted values, for rejections.
            #[must_use]
            pub fn expected() -> String {
                Self::ALL
                    .iter()
                    .map(|v| v.as_str())
                    .collect::<Vec<_>>()
                    .join(", ")
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }
    };
}

closed_vocabulary! {
    /// Declared lifespan class of a repository.
    Horizon {
        Ephemeral => "ephemeral",
        Seasonal => "seasonal",
        Perennial => "perennial",
        Generational => "generational",
    }
}

closed_vocabulary! {
    /// Declared role of a repository within the portfolio.
    Role {
        Infrastructure => "infrastructure",
        Application => "application",
        Library => "library",
        Experiment => "experiment",
        Documentation => "documentation",
        Stewardship => "stewardship",
        Civilizational => "civilizational",
    }
}

closed_vocabulary! {
    /// Declared current phase of a repository.
    Phase {
        Emerging => "emerging",
        Expanding => "expanding",
        Consolidating => "consolidating",
        Pruning => "pruning",
        Resting => "resting",
        Archival => "archival",
    }
}

closed_vocabulary! {
    /// Four-valued category derived from phase, and the value space of climate.
    Season {
        Expansion => "expansion",
        Consolidation => "consolidation",
        Pruning => "pruning",
        Dormancy => "dormancy",
    }
}

closed_vocabulary! {
    /// Which kind of dormancy a dormant season represents.
    DormancyMode {
        Hibernation => "hibernation",
        Survival => "survival",
    }
}

closed_vocabulary! {
    /// How a repository's season relates to the declared climate.
    ClimateRelation {
        Aligned => "aligned",
        Orthogonal => "orthogonal",
        Divergent => "divergent",
    }
}

closed_vocabulary! {
    /// Structural class derived from role.
    RoleClass {
        Foundational => "foundational",
        System => "system",
        Domain => "domain",
    }
}

closed_vocabulary! {
    /// Structural tier used only for ecosystem trigger evaluation.
    ///
    /// Seasonal-horizon repositories have no stratum (`Option::None`).
    Stratum {
        StructuralCore => "structural_core",
        LongArcDomain => "long_arc_domain",
        EphemeralField => "ephemeral_field",
    }
}

closed_vocabulary! {
    /// Ordered structural density tiers, sparse first.
    DensityTier {
        Sparse => "sparse",
        Rooting => "rooting",
        Thickening => "thickening",
        DenseCanopy => "dense_canopy",
        TangledThicket => "tangled_thicket",
    }
}

closed_vocabulary! {
    /// Kinds of ritual invitation.
    Ritual {
        Consolidation => "consolidation",
        StewardshipReaffirmation => "stewardship_reaffirmation",
        IntentRedeclaration => "intent_redeclaration",
        EcosystemBalance => "ecosystem_balance",
    }
}

/// Climate shares the season value space but is declared, never derived.
pub type Climate = Season;

impl DensityTier {
    /// Human-readable form with underscores replaced by spaces.
    #[must_use]
    pub fn label(self) -> String {
        self.as_str().replace('_', " ")
    }
}

// =============================================================================
// STRUCTURAL SIGNALS
// =============================================================================

/// Structural signals observed for one repository.
///
/// Every numeric field is independently optional. A missing value means
/// "not observed" and is never read as zero.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StructuralSignals {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file_count: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub commits_last_30d: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub commits_last_90d: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub manifests_observed: Option<BTreeSet<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ecosystem_dependency_count: Option<u64>,
    pub observed_at: Timestamp,
}

impl StructuralSignals {
    /// Signals with nothing observed yet.
    #[must_use]
    pub fn empty(observed_at: Timestamp) -> Self {
        Self {
            file_count: None,
            commits_last_30d: None,
            commits_last_90d: None,
            manifests_observed: None,
            ecosystem_dependency_count: None,
            observed_at,
        }
    }
}

// =============================================================================
// RITUAL INVITATION
// =============================================================================

/// A strictly observational invitation surfaced to the steward.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RitualInvitation {
    pub ritual: Ritual,
    pub observation: String,
}

impl RitualInvitation {
    #[must_use]
    pub fn new(ritual: Ritual, observation: impl Into<String>) -> Self {
        Self {
            ritual,
            observation: observation.into(),
        }
    }
}

// =============================================================================
// TESTS
// =============================================================================
