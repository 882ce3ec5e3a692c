//! # Density Classifier
//!
//! Weighted composite over structural signals, mapped to an ordered tier.
//!
//! Each present signal passes through a saturating curve `tanh(x / scale)`
//! so very large values approach 1 instead of growing without bound:
//!
//! ```text
//! surface      = tanh(files / 200)
//! tempo        = 0.6 * tanh(commits30 / 15) + 0.4 * tanh(commits90 / 40)
//! entanglement = tanh(ecosystem_deps / 5)
//! neglect      = 0                                      (interval not elapsed)
//!              = min(1, (days / interval - 1) * 0.5)
//!                * max(0.3, surface)                    (interval elapsed)
//!
//! composite    = 0.35 surface + 0.25 tempo + 0.15 entanglement + 0.25 neglect
//! ```
//!
//! This is the only place the engine uses floating point.

#![allow(clippy::float_arithmetic)]

use crate::consolidation::ConsolidationObservation;
use crate::types::{DensityTier, StructuralSignals};
use serde::{Deserialize, Serialize};

// =============================================================================
// WEIGHTS AND SCALES
// =============================================================================

const FILE_SCALE: f64 = 200.0;
const COMMITS_30D_SCALE: f64 = 15.0;
const COMMITS_90D_SCALE: f64 = 40.0;
const ECOSYSTEM_SCALE: f64 = 5.0;

const SURFACE_WEIGHT: f64 = 0.35;
const TEMPO_WEIGHT: f64 = 0.25;
const ENTANGLEMENT_WEIGHT: f64 = 0.15;
const NEGLECT_WEIGHT: f64 = 0.25;

const TEMPO_30D_SHARE: f64 = 0.6;
const TEMPO_90D_SHARE: f64 = 0.4;

const NEGLECT_RATE: f64 = 0.5;
const NEGLECT_SURFACE_FLOOR: f64 = 0.3;

/// Upper bounds (exclusive) of each tier but the last.
const TIER_CUTS: [(f64, DensityTier); 4] = [
    (0.2, DensityTier::Sparse),
    (0.4, DensityTier::Rooting),
    (0.6, DensityTier::Thickening),
    (0.8, DensityTier::DenseCanopy),
];

// =============================================================================
// OBSERVATION
// =============================================================================

/// A density tier with its fixed description and the signals it came from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DensityObservation {
    pub tier: DensityTier,
    pub description: String,
    pub signals: StructuralSignals,
}

/// Fixed, observational description of a tier.
#[must_use]
pub fn tier_description(tier: DensityTier) -> &'static str {
    match tier {
        DensityTier::Sparse => {
            "A spare structure with few files and little recent change observed."
        }
        DensityTier::Rooting => {
            "An establishing structure with some files present and modest observed activity."
        }
        DensityTier::Thickening => {
            "A developing structure with moderate file count and observable change."
        }
        DensityTier::DenseCanopy => {
            "A substantial structure with many files and sustained observed activity."
        }
        DensityTier::TangledThicket => {
            "A complex structure where high file count, frequent change and elapsed review intervals converge."
        }
    }
}

/// Observe structural density.
///
/// Returns `None` unless at least one of file count, 30-day commits or
/// 90-day commits is present. Absent signals contribute nothing; they are
/// not read as zero observations.
#[must_use]
pub fn observe_structural_density(
    signals: &StructuralSignals,
    consolidation: Option<&ConsolidationObservation>,
) -> Option<DensityObservation> {
    if signals.file_count.is_none()
        && signals.commits_last_30d.is_none()
        && signals.commits_last_90d.is_none()
    {
        return None;
    }

    let tier = classify_tier(composite_score(signals, consolidation));
    Some(DensityObservation {
        tier,
        description: tier_description(tier).to_string(),
        signals: signals.clone(),
    })
}

/// The weighted composite in `[0, 1)`.
#[must_use]
pub fn composite_score(
    signals: &StructuralSignals,
    consolidation: Option<&ConsolidationObservation>,
) -> f64 {
    let surface = saturate(signals.file_count, FILE_SCALE);
    let tempo = TEMPO_30D_SHARE * saturate(signals.commits_last_30d, COMMITS_30D_SCALE)
        + TEMPO_90D_SHARE * saturate(signals.commits_last_90d, COMMITS_90D_SCALE);
    let entanglement = saturate(signals.ecosystem_dependency_count, ECOSYSTEM_SCALE);
    let neglect = neglect(consolidation, surface);

    SURFACE_WEIGHT * surface
        + TEMPO_WEIGHT * tempo
        + ENTANGLEMENT_WEIGHT * entanglement
        + NEGLECT_WEIGHT * neglect
}

fn saturate(value: Option<u64>, scale: f64) -> f64 {
    value.map_or(0.0, |v| (v as f64 / scale).tanh())
}

/// Neglect only contributes once the review interval has elapsed, and
/// weighs more on larger structures.
fn neglect(consolidation: Option<&ConsolidationObservation>, surface: f64) -> f64 {
    let Some(observation) = consolidation.filter(|c| c.elapsed) else {
        return 0.0;
    };

    let ratio = observation.days_since_activity as f64 / f64::from(observation.interval_days);
    let overdue = ((ratio - 1.0) * NEGLECT_RATE).min(1.0);
    overdue * surface.max(NEGLECT_SURFACE_FLOOR)
}

fn classify_tier(composite: f64) -> DensityTier {
    TIER_CUTS
        .iter()
        .find(|(bound, _)| composite < *bound)
        .map_or(DensityTier::TangledThicket, |(_, tier)| *tier)
}

// =============================================================================
// TESTS
// =============================================================================
