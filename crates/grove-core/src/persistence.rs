//! # Persistence Assessment
//!
//! Sliding-window vote over a repository's recent season/climate
//! relations. Only the most recent [`PERSISTENCE_WINDOW_SIZE`] relations
//! count, and a short window never reads as consensus.

use crate::history::{History, SnapshotRow};
use crate::season::{derive_climate_relation, derive_season};
use crate::types::{Climate, ClimateRelation, Phase};
use serde::{Deserialize, Serialize};

/// Number of most recent observations evaluated.
pub const PERSISTENCE_WINDOW_SIZE: usize = 14;

/// Votes required within a full window to call a relation persistent.
pub const PERSISTENCE_THRESHOLD: usize = 9;

/// Vote tally over the most recent window of relations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct PersistenceAssessment {
    pub aligned_count: usize,
    pub divergent_count: usize,
    pub orthogonal_count: usize,
    pub undetermined_count: usize,
    pub total_snapshots: usize,
    pub persistently_aligned: bool,
    pub persistently_divergent: bool,
}

impl PersistenceAssessment {
    /// Whether the evaluated window is full.
    #[must_use]
    pub fn window_complete(&self) -> bool {
        self.total_snapshots >= PERSISTENCE_WINDOW_SIZE
    }
}

/// Relate a stored phase string to the climate.
///
/// Null or unrecognised phase strings are undetermined, never guessed.
#[must_use]
pub fn derive_snapshot_relation(phase: Option<&str>, climate: Climate) -> Option<ClimateRelation> {
    let phase = phase.and_then(Phase::parse)?;
    let season = derive_season(Some(phase))?.season;
    Some(derive_climate_relation(season, climate))
}

/// Map snapshot rows to their relations against `climate`.
#[must_use]
pub fn snapshot_relations(
    snapshots: &History<SnapshotRow>,
    climate: Climate,
) -> History<Option<ClimateRelation>> {
    snapshots.map(|row| derive_snapshot_relation(row.phase.as_deref(), climate))
}

/// Assess persistence over the newest [`PERSISTENCE_WINDOW_SIZE`] relations.
#[must_use]
pub fn assess_persistence(relations: &History<Option<ClimateRelation>>) -> PersistenceAssessment {
    let mut assessment = PersistenceAssessment::default();

    for relation in relations.newest_first_iter().take(PERSISTENCE_WINDOW_SIZE) {
        assessment.total_snapshots += 1;
        match relation {
            Some(ClimateRelation::Aligned) => assessment.aligned_count += 1,
            Some(ClimateRelation::Divergent) => assessment.divergent_count += 1,
            Some(ClimateRelation::Orthogonal) => assessment.orthogonal_count += 1,
            None => assessment.undetermined_count += 1,
        }
    }

    let full = assessment.window_complete();
    assessment.persistently_aligned = full && assessment.aligned_count >= PERSISTENCE_THRESHOLD;
    assessment.persistently_divergent =
        full && assessment.divergent_count >= PERSISTENCE_THRESHOLD;
    assessment
}

// =============================================================================
// TESTS
// =============================================================================
