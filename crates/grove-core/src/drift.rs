//! # Drift Detectors
//!
//! Two independent observations of drift since the current phase was
//! declared:
//!
//! - **Shape drift**: structural signals compared against a reference
//!   snapshot captured when the phase was declared.
//! - **Motion drift**: tension between the declared phase and the
//!   observed commit cadence.
//!
//! Silence is a valid result for both. Nothing here ranks or scores.

use crate::history::{History, SnapshotRow};
use crate::types::{DensityTier, Phase, StructuralSignals, Timestamp};
use serde::{Deserialize, Serialize};

// =============================================================================
// REFERENCE SNAPSHOT
// =============================================================================

/// Signals captured at (or nearest to) the moment the phase was declared.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReferenceSnapshot {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file_count: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ecosystem_dependency_count: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub density_tier: Option<DensityTier>,
    pub observed_at: Timestamp,
}

impl From<&SnapshotRow> for ReferenceSnapshot {
    fn from(row: &SnapshotRow) -> Self {
        Self {
            file_count: row.file_count,
            ecosystem_dependency_count: row.ecosystem_dependency_count,
            density_tier: row.density_tier,
            observed_at: row.observed_at,
        }
    }
}

/// Find the drift baseline for a phase declared at `phase_declared_at`.
///
/// Picks the snapshot closest to, but not before, the declaration. If
/// none qualifies, falls back to the nearest snapshot before it.
///
/// When the window is truncated and every row in it is later than the
/// declaration, the true closest snapshot may lie outside the window;
/// the lookup then returns `None` instead of a misleadingly recent row.
#[must_use]
pub fn find_reference_snapshot(
    phase_declared_at: Option<Timestamp>,
    snapshots: &History<SnapshotRow>,
) -> Option<ReferenceSnapshot> {
    let declared_at = phase_declared_at?;

    if !snapshots.is_complete()
        && snapshots
            .earliest()
            .is_some_and(|oldest| oldest.observed_at > declared_at)
    {
        return None;
    }

    // Newest-first: the last at-or-after row is the closest one, the
    // first row before the declaration is the nearest earlier one.
    let mut closest_at_or_after = None;
    let mut closest_before = None;
    for row in snapshots.newest_first_iter() {
        if row.observed_at >= declared_at {
            closest_at_or_after = Some(row);
        } else if closest_before.is_none() {
            closest_before = Some(row);
        }
    }

    closest_at_or_after
        .or(closest_before)
        .map(ReferenceSnapshot::from)
}

// =============================================================================
// SHAPE DRIFT
// =============================================================================

/// Structural shifts observed since the reference snapshot.
///
/// `descriptions` is never empty: no shift means no observation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShapeDriftObservation {
    pub reference: ReferenceSnapshot,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub current_file_count: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub current_ecosystem_dependency_count: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub current_density_tier: Option<DensityTier>,
    pub descriptions: Vec<String>,
}

/// Compare current signals against the reference snapshot.
///
/// Each of file count, ecosystem dependency count and density tier
/// yields one sentence when both values are present and differ.
#[must_use]
pub fn observe_shape_drift(
    reference: &ReferenceSnapshot,
    current: &StructuralSignals,
    current_tier: Option<DensityTier>,
) -> Option<ShapeDriftObservation> {
    let mut descriptions = Vec::new();

    if let Some((from, to)) = shifted(reference.file_count, current.file_count) {
        descriptions.push(format!(
            "File count has shifted from {} to {} since the current phase was declared.",
            from, to
        ));
    }

    if let Some((from, to)) = shifted(
        reference.ecosystem_dependency_count,
        current.ecosystem_dependency_count,
    ) {
        descriptions.push(format!(
            "Ecosystem dependency count has shifted from {} to {} since the current phase was declared.",
            from, to
        ));
    }

    if let Some((from, to)) = shifted(reference.density_tier, current_tier) {
        descriptions.push(format!(
            "Structural character has shifted from {} to {} since the current phase was declared.",
            from.label(),
            to.label()
        ));
    }

    if descriptions.is_empty() {
        return None;
    }

    Some(ShapeDriftObservation {
        reference: reference.clone(),
        current_file_count: current.file_count,
        current_ecosystem_dependency_count: current.ecosystem_dependency_count,
        current_density_tier: current_tier,
        descriptions,
    })
}

fn shifted<T: PartialEq>(reference: Option<T>, current: Option<T>) -> Option<(T, T)> {
    match (reference, current) {
        (Some(from), Some(to)) if from != to => Some((from, to)),
        _ => None,
    }
}

// =============================================================================
// MOTION DRIFT
// =============================================================================

/// Cadence each phase leads one to expect.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CadenceExpectation {
    ActivityExpected,
    QuietExpected,
    /// Ambiguous cadence is valid; never produces tension.
    ModerateExpected,
}

/// At or below this many commits in 30 days the cadence reads as quiet.
pub const QUIET_COMMITS_30D: u64 = 2;

/// At or above this many commits in 30 days the cadence reads as active.
pub const ACTIVE_COMMITS_30D: u64 = 16;

#[must_use]
pub fn cadence_expectation(phase: Phase) -> CadenceExpectation {
    match phase {
        Phase::Emerging | Phase::Expanding => CadenceExpectation::ActivityExpected,
        Phase::Consolidating | Phase::Pruning => CadenceExpectation::ModerateExpected,
        Phase::Resting | Phase::Archival => CadenceExpectation::QuietExpected,
    }
}

/// Tension between declared phase and observed cadence.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MotionDriftObservation {
    pub phase: Phase,
    pub commits_last_30d: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub commits_last_90d: Option<u64>,
    pub description: String,
}

/// Observe motion drift.
///
/// Returns `None` when the 30-day count is unknown, when the phase has a
/// moderate expectation, or when cadence and phase agree.
#[must_use]
pub fn observe_motion_drift(
    phase: Phase,
    commits_last_30d: Option<u64>,
    commits_last_90d: Option<u64>,
) -> Option<MotionDriftObservation> {
    let commits = commits_last_30d?;

    let description = match cadence_expectation(phase) {
        CadenceExpectation::ActivityExpected if commits <= QUIET_COMMITS_30D => format!(
            "This project is in the {} phase, but fewer than {} commits have been observed in the past 30 days. \
             The declared phase and observed cadence appear in tension.",
            phase,
            QUIET_COMMITS_30D + 1
        ),
        CadenceExpectation::QuietExpected if commits >= ACTIVE_COMMITS_30D => format!(
            "This project is in the {} phase, but {} commits have been observed in the past 30 days. \
             The declared phase and observed cadence appear in tension.",
            phase, commits
        ),
        _ => return None,
    };

    Some(MotionDriftObservation {
        phase,
        commits_last_30d: commits,
        commits_last_90d,
        description,
    })
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::history::Completeness;
    use crate::test_support::{assert_observational, ts};

    fn row(observed_at: &str, files: u64, ecosystem: u64, tier: DensityTier) -> SnapshotRow {
        SnapshotRow {
            observed_at: ts(observed_at),
            phase: Some(String::from("expanding")),
            file_count: Some(files),
            ecosystem_dependency_count: Some(ecosystem),
            density_tier: Some(tier),
        }
    }

    fn three_rows() -> Vec<SnapshotRow> {
        vec![
            row("2025-06-15T00:00:00Z", 300, 30, DensityTier::DenseCanopy),
            row("2025-06-05T00:00:00Z", 200, 20, DensityTier::Thickening),
            row("2025-05-15T00:00:00Z", 100, 10, DensityTier::Rooting),
        ]
    }

    fn current(files: Option<u64>, ecosystem: Option<u64>) -> StructuralSignals {
        StructuralSignals {
            file_count: files,
            ecosystem_dependency_count: ecosystem,
            ..StructuralSignals::empty(ts("2025-07-01T00:00:00Z"))
        }
    }

    #[test]
    fn reference_requires_timestamp_and_rows() {
        let rows = History::newest_first(three_rows(), Completeness::Complete);
        assert_eq!(find_reference_snapshot(None, &rows), None);
        assert_eq!(
            find_reference_snapshot(Some(ts("2025-06-01T00:00:00Z")), &History::empty()),
            None
        );
    }

    #[test]
    fn reference_is_closest_at_or_after_declaration() {
        let rows = History::newest_first(three_rows(), Completeness::Complete);
        let reference = find_reference_snapshot(Some(ts("2025-06-03T00:00:00Z")), &rows);
        assert_eq!(reference.as_ref().map(|r| r.file_count), Some(Some(200)));
        assert_eq!(
            reference.map(|r| r.observed_at),
            Some(ts("2025-06-05T00:00:00Z"))
        );
    }

    #[test]
    fn reference_accepts_exact_match() {
        let rows = History::newest_first(three_rows(), Completeness::Complete);
        let reference = find_reference_snapshot(Some(ts("2025-06-15T00:00:00Z")), &rows);
        assert_eq!(reference.map(|r| r.file_count), Some(Some(300)));
    }

    #[test]
    fn reference_falls_back_to_nearest_before() {
        let rows = History::newest_first(three_rows(), Completeness::Complete);
        let reference = find_reference_snapshot(Some(ts("2025-07-01T00:00:00Z")), &rows);
        assert_eq!(reference.map(|r| r.file_count), Some(Some(300)));
    }

    #[test]
    fn reference_suppressed_when_truncated_window_starts_after_declaration() {
        let truncated = History::newest_first(three_rows(), Completeness::Truncated);
        let declared = Some(ts("2025-05-01T00:00:00Z"));
        assert_eq!(find_reference_snapshot(declared, &truncated), None);

        // The same rows as a complete history do yield the oldest row.
        let complete = History::newest_first(three_rows(), Completeness::Complete);
        let reference = find_reference_snapshot(declared, &complete);
        assert_eq!(reference.map(|r| r.file_count), Some(Some(100)));
    }

    #[test]
    fn reference_found_in_truncated_window_that_spans_declaration() {
        let truncated = History::newest_first(three_rows(), Completeness::Truncated);
        let reference = find_reference_snapshot(Some(ts("2025-06-03T00:00:00Z")), &truncated);
        assert_eq!(reference.map(|r| r.file_count), Some(Some(200)));
    }

    #[test]
    fn shape_drift_silent_without_change() {
        let reference = ReferenceSnapshot::from(&three_rows()[1]);
        let same = current(Some(200), Some(20));
        assert_eq!(
            observe_shape_drift(&reference, &same, Some(DensityTier::Thickening)),
            None
        );
    }

    #[test]
    fn shape_drift_reports_each_shift() {
        let reference = ReferenceSnapshot::from(&three_rows()[1]);
        let grown = current(Some(450), Some(25));
        let drift = observe_shape_drift(&reference, &grown, Some(DensityTier::DenseCanopy));
        let descriptions = drift.map(|d| d.descriptions).unwrap_or_default();

        assert_eq!(descriptions.len(), 3);
        assert!(descriptions[0].contains("from 200 to 450"));
        assert!(descriptions[1].contains("from 20 to 25"));
        assert!(descriptions[2].contains("from thickening to dense canopy"));
        for description in &descriptions {
            assert_observational(description);
        }
    }

    #[test]
    fn shape_drift_ignores_missing_values() {
        let reference = ReferenceSnapshot {
            file_count: None,
            ecosystem_dependency_count: Some(4),
            density_tier: None,
            observed_at: ts("2025-06-01T00:00:00Z"),
        };
        let signals = current(Some(900), None);
        assert_eq!(
            observe_shape_drift(&reference, &signals, Some(DensityTier::Sparse)),
            None
        );
    }

    #[test]
    fn motion_drift_requires_30d_count() {
        assert_eq!(observe_motion_drift(Phase::Expanding, None, Some(0)), None);
    }

    #[test]
    fn quiet_cadence_in_active_phase() {
        let drift = observe_motion_drift(Phase::Emerging, Some(2), Some(5));
        assert!(drift.is_some());
        let text = drift.map(|d| d.description).unwrap_or_default();
        assert!(text.contains("emerging"));
        assert!(text.contains("fewer than 3 commits"));
        assert_observational(&text);

        assert_eq!(observe_motion_drift(Phase::Expanding, Some(3), None), None);
    }

    #[test]
    fn active_cadence_in_quiet_phase() {
        let drift = observe_motion_drift(Phase::Archival, Some(16), None);
        assert_eq!(drift.as_ref().map(|d| d.commits_last_30d), Some(16));
        assert!(drift.map(|d| d.description.contains("16 commits")).unwrap_or(false));

        assert_eq!(observe_motion_drift(Phase::Resting, Some(15), None), None);
    }

    #[test]
    fn moderate_phases_never_tense() {
        for commits in [0, 2, 16, 500] {
            assert_eq!(observe_motion_drift(Phase::Consolidating, Some(commits), None), None);
            assert_eq!(observe_motion_drift(Phase::Pruning, Some(commits), None), None);
        }
    }
}
