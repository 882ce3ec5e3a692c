//! # Phase Duration Observer
//!
//! How long the current phase has been declared, and whether that span
//! suggests a stewardship reaffirmation.

use crate::consolidation::days_between;
use crate::history::{DeclarationRow, History};
use crate::types::{Horizon, Phase, Timestamp};
use serde::{Deserialize, Serialize};

/// Default reaffirmation threshold when the horizon is undeclared.
pub const DEFAULT_REAFFIRMATION_DAYS: u64 = 365;

/// Elapsed time since the current phase was declared.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PhaseDurationObservation {
    pub phase: Phase,
    pub declared_at: Timestamp,
    /// Clamped at zero: a future-dated declaration reads as zero days.
    pub days_since_declared: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub horizon: Option<Horizon>,
}

/// Observe the duration of the current phase.
///
/// Returns `None` unless both the phase and its declaration time are known.
#[must_use]
pub fn observe_phase_duration(
    phase: Option<Phase>,
    declared_at: Option<Timestamp>,
    horizon: Option<Horizon>,
    now: Timestamp,
) -> Option<PhaseDurationObservation> {
    let phase = phase?;
    let declared_at = declared_at?;
    let days_since_declared = days_between(declared_at, now).max(0) as u64;

    Some(PhaseDurationObservation {
        phase,
        declared_at,
        days_since_declared,
        horizon,
    })
}

/// Horizon-proportional reaffirmation threshold in days.
///
/// Ephemeral projects have no threshold: they never reach reaffirmation.
#[must_use]
pub fn reaffirmation_threshold(horizon: Option<Horizon>) -> Option<u64> {
    match horizon {
        Some(Horizon::Ephemeral) => None,
        Some(Horizon::Seasonal) => Some(180),
        Some(Horizon::Perennial) | None => Some(DEFAULT_REAFFIRMATION_DAYS),
        Some(Horizon::Generational) => Some(730),
    }
}

/// Whether the phase duration suggests a stewardship reaffirmation.
///
/// A resting phase with a declared review interval is measured against
/// that interval; everything else against the horizon threshold.
/// Both boundaries are inclusive.
#[must_use]
pub fn suggests_reaffirmation(
    observation: &PhaseDurationObservation,
    review_interval_days: Option<u32>,
) -> bool {
    if observation.horizon == Some(Horizon::Ephemeral) {
        return false;
    }

    if let (Phase::Resting, Some(interval)) = (observation.phase, review_interval_days) {
        return observation.days_since_declared >= u64::from(interval);
    }

    reaffirmation_threshold(observation.horizon)
        .is_some_and(|threshold| observation.days_since_declared >= threshold)
}

/// Find when the current phase was declared.
///
/// Walks declaration rows newest-first and returns the timestamp of the
/// oldest row in the leading run that shares `current_phase`. A row just
/// past the window with another phase still closes the run. When the run
/// fills a truncated window and nothing closes it, the true start may
/// predate the window, so nothing is returned.
#[must_use]
pub fn find_phase_declaration_timestamp(
    current_phase: Option<Phase>,
    declarations: &History<DeclarationRow>,
) -> Option<Timestamp> {
    let current_phase = current_phase?;
    let in_phase = |row: &DeclarationRow| row.phase.as_deref() == Some(current_phase.as_str());

    let mut oldest = None;
    let mut run_ended = false;
    for row in declarations.newest_first_iter() {
        if in_phase(row) {
            oldest = Some(row.observed_at);
        } else {
            run_ended = true;
            break;
        }
    }

    if !run_ended {
        run_ended = declarations.beyond_window().is_some_and(|row| !in_phase(row));
    }

    if !run_ended && !declarations.is_complete() {
        return None;
    }
    oldest
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::history::Completeness;
    use crate::test_support::ts;

    fn observation(
        phase: Phase,
        days_since_declared: u64,
        horizon: Option<Horizon>,
    ) -> PhaseDurationObservation {
        PhaseDurationObservation {
            phase,
            declared_at: ts("2025-01-01T00:00:00Z"),
            days_since_declared,
            horizon,
        }
    }

    fn declaration_row(observed_at: &str, phase: Option<&str>) -> DeclarationRow {
        DeclarationRow {
            observed_at: ts(observed_at),
            classified: true,
            intent: Some(String::from("test")),
            horizon: None,
            role: None,
            phase: phase.map(String::from),
            steward: None,
            review_interval_days: None,
        }
    }

    #[test]
    fn none_without_phase_or_timestamp() {
        let now = ts("2026-01-01T00:00:00Z");
        assert_eq!(observe_phase_duration(None, Some(now), None, now), None);
        assert_eq!(
            observe_phase_duration(Some(Phase::Resting), None, None, now),
            None
        );
    }

    #[test]
    fn counts_whole_days() {
        let observed = observe_phase_duration(
            Some(Phase::Expanding),
            Some(ts("2025-12-01T00:00:00Z")),
            Some(Horizon::Seasonal),
            ts("2026-01-01T00:00:00Z"),
        );
        assert_eq!(observed.map(|o| o.days_since_declared), Some(31));
        assert_eq!(observed.and_then(|o| o.horizon), Some(Horizon::Seasonal));
    }

    #[test]
    fn future_declarations_clamp_to_zero() {
        let observed = observe_phase_duration(
            Some(Phase::Expanding),
            Some(ts("2026-03-01T00:00:00Z")),
            None,
            ts("2026-01-01T00:00:00Z"),
        );
        assert_eq!(observed.map(|o| o.days_since_declared), Some(0));
    }

    #[test]
    fn ephemeral_never_suggests_reaffirmation() {
        let long = observation(Phase::Consolidating, 10_000, Some(Horizon::Ephemeral));
        assert!(!suggests_reaffirmation(&long, None));

        let resting = observation(Phase::Resting, 10_000, Some(Horizon::Ephemeral));
        assert!(!suggests_reaffirmation(&resting, Some(30)));
    }

    #[test]
    fn horizon_thresholds_are_inclusive() {
        let cases = [
            (Some(Horizon::Seasonal), 180),
            (Some(Horizon::Perennial), 365),
            (Some(Horizon::Generational), 730),
            (None, 365),
        ];
        for (horizon, threshold) in cases {
            assert!(!suggests_reaffirmation(
                &observation(Phase::Expanding, threshold - 1, horizon),
                None
            ));
            assert!(suggests_reaffirmation(
                &observation(Phase::Expanding, threshold, horizon),
                None
            ));
        }
    }

    #[test]
    fn resting_uses_declared_interval() {
        let resting = observation(Phase::Resting, 45, Some(Horizon::Perennial));
        assert!(suggests_reaffirmation(&resting, Some(45)));
        assert!(!suggests_reaffirmation(&resting, Some(46)));
        // Without an interval, resting falls back to the horizon threshold.
        assert!(!suggests_reaffirmation(&resting, None));
    }

    #[test]
    fn interval_only_applies_to_resting() {
        let pruning = observation(Phase::Pruning, 45, Some(Horizon::Perennial));
        assert!(!suggests_reaffirmation(&pruning, Some(30)));
    }

    #[test]
    fn finds_oldest_row_of_current_run() {
        let history = History::newest_first(
            vec![
                declaration_row("2026-03-01T00:00:00Z", Some("resting")),
                declaration_row("2026-02-01T00:00:00Z", Some("resting")),
                declaration_row("2026-01-01T00:00:00Z", Some("expanding")),
            ],
            Completeness::Truncated,
        );
        assert_eq!(
            find_phase_declaration_timestamp(Some(Phase::Resting), &history),
            Some(ts("2026-02-01T00:00:00Z"))
        );
    }

    #[test]
    fn suppresses_when_run_fills_truncated_window() {
        let rows = vec![
            declaration_row("2026-03-01T00:00:00Z", Some("resting")),
            declaration_row("2026-02-01T00:00:00Z", Some("resting")),
        ];
        let truncated = History::newest_first(rows.clone(), Completeness::Truncated);
        assert_eq!(
            find_phase_declaration_timestamp(Some(Phase::Resting), &truncated),
            None
        );

        let complete = History::newest_first(rows, Completeness::Complete);
        assert_eq!(
            find_phase_declaration_timestamp(Some(Phase::Resting), &complete),
            Some(ts("2026-02-01T00:00:00Z"))
        );
    }

    #[test]
    fn row_past_the_window_closes_the_run() {
        let closed = History::from_fetch(
            vec![
                declaration_row("2026-03-01T00:00:00Z", Some("resting")),
                declaration_row("2026-02-01T00:00:00Z", Some("resting")),
                declaration_row("2026-01-01T00:00:00Z", Some("expanding")),
            ],
            2,
        );
        assert!(!closed.is_complete());
        assert_eq!(
            find_phase_declaration_timestamp(Some(Phase::Resting), &closed),
            Some(ts("2026-02-01T00:00:00Z"))
        );

        let open = History::from_fetch(
            vec![
                declaration_row("2026-03-01T00:00:00Z", Some("resting")),
                declaration_row("2026-02-01T00:00:00Z", Some("resting")),
                declaration_row("2026-01-01T00:00:00Z", Some("resting")),
            ],
            2,
        );
        assert_eq!(
            find_phase_declaration_timestamp(Some(Phase::Resting), &open),
            None
        );
    }

    #[test]
    fn no_timestamp_when_latest_row_has_another_phase() {
        let history = History::newest_first(
            vec![declaration_row("2026-03-01T00:00:00Z", Some("expanding"))],
            Completeness::Complete,
        );
        assert_eq!(
            find_phase_declaration_timestamp(Some(Phase::Resting), &history),
            None
        );
        assert_eq!(find_phase_declaration_timestamp(None, &history), None);
    }
}
