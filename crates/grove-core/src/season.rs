//! # Season / Climate Relation
//!
//! Pure lookup tables: declared phase to season, and (season, climate)
//! to relation. No state, no defaults: an undeclared phase has no season.

use crate::types::{Climate, ClimateRelation, DormancyMode, Phase, Season};
use serde::{Deserialize, Serialize};

/// A season together with the phase it was derived from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeasonDerivation {
    pub season: Season,
    pub source_phase: Phase,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dormancy_mode: Option<DormancyMode>,
}

/// Derive the season for a declared phase.
///
/// Returns `None` when the phase is undeclared.
#[must_use]
pub fn derive_season(phase: Option<Phase>) -> Option<SeasonDerivation> {
    let phase = phase?;
    let (season, dormancy_mode) = match phase {
        Phase::Emerging | Phase::Expanding => (Season::Expansion, None),
        Phase::Consolidating => (Season::Consolidation, None),
        Phase::Pruning => (Season::Pruning, None),
        Phase::Resting => (Season::Dormancy, Some(DormancyMode::Hibernation)),
        Phase::Archival => (Season::Dormancy, Some(DormancyMode::Survival)),
    };
    Some(SeasonDerivation {
        season,
        source_phase: phase,
        dormancy_mode,
    })
}

/// Relate a season to the declared climate.
///
/// ```text
///                 season →  expansion    consolidation  pruning      dormancy
/// climate ↓
/// expansion                 aligned      orthogonal     divergent    divergent
/// consolidation             orthogonal   aligned        orthogonal   divergent
/// pruning                   divergent    orthogonal     aligned      orthogonal
/// dormancy                  divergent    divergent      orthogonal   aligned
/// ```
#[must_use]
pub fn derive_climate_relation(season: Season, climate: Climate) -> ClimateRelation {
    use ClimateRelation::{Aligned, Divergent, Orthogonal};
    use Season::{Consolidation, Dormancy, Expansion, Pruning};

    match (climate, season) {
        (Expansion, Expansion) => Aligned,
        (Expansion, Consolidation) => Orthogonal,
        (Expansion, Pruning | Dormancy) => Divergent,

        (Consolidation, Consolidation) => Aligned,
        (Consolidation, Expansion | Pruning) => Orthogonal,
        (Consolidation, Dormancy) => Divergent,

        (Pruning, Pruning) => Aligned,
        (Pruning, Consolidation | Dormancy) => Orthogonal,
        (Pruning, Expansion) => Divergent,

        (Dormancy, Dormancy) => Aligned,
        (Dormancy, Pruning) => Orthogonal,
        (Dormancy, Expansion | Consolidation) => Divergent,
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn undeclared_phase_has_no_season() {
        assert_eq!(derive_season(None), None);
    }

    #[test]
    fn every_phase_maps_to_a_season() {
        let expected = [
            (Phase::Emerging, Season::Expansion),
            (Phase::Expanding, Season::Expansion),
            (Phase::Consolidating, Season::Consolidation),
            (Phase::Pruning, Season::Pruning),
            (Phase::Resting, Season::Dormancy),
            (Phase::Archival, Season::Dormancy),
        ];
        for (phase, season) in expected {
            let derived = derive_season(Some(phase));
            assert_eq!(derived.map(|d| d.season), Some(season));
            assert_eq!(derived.map(|d| d.source_phase), Some(phase));
            assert_eq!(derive_season(Some(phase)), derived);
        }
    }

    #[test]
    fn dormancy_carries_its_mode() {
        let resting = derive_season(Some(Phase::Resting));
        let archival = derive_season(Some(Phase::Archival));
        let pruning = derive_season(Some(Phase::Pruning));
        assert_eq!(
            resting.and_then(|d| d.dormancy_mode),
            Some(DormancyMode::Hibernation)
        );
        assert_eq!(
            archival.and_then(|d| d.dormancy_mode),
            Some(DormancyMode::Survival)
        );
        assert_eq!(pruning.and_then(|d| d.dormancy_mode), None);
    }

    #[test]
    fn diagonal_is_always_aligned() {
        for season in Season::ALL {
            assert_eq!(
                derive_climate_relation(*season, *season),
                ClimateRelation::Aligned
            );
        }
    }

    #[test]
    fn off_diagonal_cells() {
        assert_eq!(
            derive_climate_relation(Season::Dormancy, Season::Expansion),
            ClimateRelation::Divergent
        );
        assert_eq!(
            derive_climate_relation(Season::Consolidation, Season::Expansion),
            ClimateRelation::Orthogonal
        );
        assert_eq!(
            derive_climate_relation(Season::Expansion, Season::Pruning),
            ClimateRelation::Divergent
        );
        assert_eq!(
            derive_climate_relation(Season::Pruning, Season::Dormancy),
            ClimateRelation::Orthogonal
        );
        assert_eq!(
            derive_climate_relation(Season::Consolidation, Season::Dormancy),
            ClimateRelation::Divergent
        );
    }
}
