//! # Timeline Reconstructor
//!
//! Turns append-only snapshot and declaration history into a compressed,
//! most-recent-first sequence of entries.
//!
//! Density rows are walked oldest to newest. Every change of tier is a
//! transition; runs of two or more equal tiers collapse into a span. The
//! very first observation is only shown as "first observed" when the
//! snapshot window holds the complete history.

use crate::history::{DeclarationRow, History, SnapshotRow};
use crate::types::{DensityTier, Timestamp};
use serde::{Deserialize, Serialize};

/// Declaration fields diffed between consecutive rows, in output order.
pub const TRACKED_FIELDS: [&str; 6] = [
    "phase",
    "intent",
    "horizon",
    "role",
    "steward",
    "review_interval_days",
];

/// One changed declaration field. `None` means undeclared.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldChange {
    pub field: String,
    pub from: Option<String>,
    pub to: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum TimelineEntry {
    DensityTransition {
        observed_at: Timestamp,
        /// `None` marks the first observation.
        from_tier: Option<DensityTier>,
        to_tier: DensityTier,
        #[serde(default)]
        freshly_recorded: bool,
    },
    DensitySpan {
        observed_at: Timestamp,
        tier: DensityTier,
        span_end: Timestamp,
        observation_count: usize,
        #[serde(default)]
        freshly_recorded: bool,
    },
    DeclarationChange {
        observed_at: Timestamp,
        changes: Vec<FieldChange>,
    },
}

impl TimelineEntry {
    #[must_use]
    pub fn observed_at(&self) -> Timestamp {
        match self {
            Self::DensityTransition { observed_at, .. }
            | Self::DensitySpan { observed_at, .. }
            | Self::DeclarationChange { observed_at, .. } => *observed_at,
        }
    }

    fn mark_freshly_recorded(&mut self) {
        match self {
            Self::DensityTransition {
                freshly_recorded, ..
            }
            | Self::DensitySpan {
                freshly_recorded, ..
            } => *freshly_recorded = true,
            Self::DeclarationChange { .. } => {}
        }
    }
}

/// Build the timeline, most recent first.
///
/// Completeness of `snapshots` decides whether the first observation is
/// shown. `fresh_snapshot_recorded` flags the latest density entry.
/// Entries with equal timestamps keep density entries ahead of
/// declaration changes.
#[must_use]
pub fn build_timeline(
    snapshots: &History<SnapshotRow>,
    declarations: &History<DeclarationRow>,
    fresh_snapshot_recorded: bool,
) -> Vec<TimelineEntry> {
    let mut entries = density_entries(snapshots);

    if let Some(latest) = entries.last_mut().filter(|_| fresh_snapshot_recorded) {
        latest.mark_freshly_recorded();
    }

    entries.extend(declaration_entries(declarations));
    entries.sort_by(|a, b| b.observed_at().cmp(&a.observed_at()));
    entries
}

// =============================================================================
// DENSITY
// =============================================================================

struct Run {
    tier: DensityTier,
    start: Timestamp,
    end: Timestamp,
    count: usize,
}

impl Run {
    fn into_span(self) -> Option<TimelineEntry> {
        (self.count >= 2).then_some(TimelineEntry::DensitySpan {
            observed_at: self.start,
            tier: self.tier,
            span_end: self.end,
            observation_count: self.count,
            freshly_recorded: false,
        })
    }
}

fn density_entries(snapshots: &History<SnapshotRow>) -> Vec<TimelineEntry> {
    let mut tiered = snapshots
        .oldest_first_iter()
        .filter_map(|row| row.density_tier.map(|tier| (row.observed_at, tier)));

    let Some((first_at, first_tier)) = tiered.next() else {
        return Vec::new();
    };

    let mut entries = Vec::new();
    if snapshots.is_complete() {
        entries.push(TimelineEntry::DensityTransition {
            observed_at: first_at,
            from_tier: None,
            to_tier: first_tier,
            freshly_recorded: false,
        });
    }

    let mut run = Run {
        tier: first_tier,
        start: first_at,
        end: first_at,
        count: 1,
    };

    for (observed_at, tier) in tiered {
        if tier == run.tier {
            run.end = observed_at;
            run.count += 1;
            continue;
        }

        let previous = run.tier;
        entries.extend(run.into_span());
        entries.push(TimelineEntry::DensityTransition {
            observed_at,
            from_tier: Some(previous),
            to_tier: tier,
            freshly_recorded: false,
        });
        run = Run {
            tier,
            start: observed_at,
            end: observed_at,
            count: 1,
        };
    }

    entries.extend(run.into_span());
    entries
}

// =============================================================================
// DECLARATIONS
// =============================================================================

fn tracked_values(row: &DeclarationRow) -> [Option<String>; 6] {
    [
        row.phase.clone(),
        row.intent.clone(),
        row.horizon.clone(),
        row.role.clone(),
        row.steward.clone(),
        row.review_interval_days.map(|days| days.to_string()),
    ]
}

fn declaration_entries(declarations: &History<DeclarationRow>) -> Vec<TimelineEntry> {
    let ascending: Vec<&DeclarationRow> = declarations.oldest_first_iter().collect();

    ascending
        .windows(2)
        .filter_map(|pair| {
            let (previous, current) = (pair[0], pair[1]);
            let changes: Vec<FieldChange> = TRACKED_FIELDS
                .iter()
                .zip(tracked_values(previous).into_iter().zip(tracked_values(current)))
                .filter(|(_, (from, to))| from != to)
                .map(|(field, (from, to))| FieldChange {
                    field: (*field).to_string(),
                    from,
                    to,
                })
                .collect();

            (!changes.is_empty()).then(|| TimelineEntry::DeclarationChange {
                observed_at: current.observed_at,
                changes,
            })
        })
        .collect()
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::history::Completeness;
    use crate::test_support::ts;

    fn snapshot(observed_at: &str, tier: Option<DensityTier>) -> SnapshotRow {
        SnapshotRow {
            observed_at: ts(observed_at),
            phase: None,
            file_count: None,
            ecosystem_dependency_count: None,
            density_tier: tier,
        }
    }

    fn declaration(observed_at: &str, phase: &str, steward: Option<&str>) -> DeclarationRow {
        DeclarationRow {
            observed_at: ts(observed_at),
            classified: true,
            intent: Some(String::from("Shared storage")),
            horizon: Some(String::from("perennial")),
            role: Some(String::from("library")),
            phase: Some(phase.to_string()),
            steward: steward.map(String::from),
            review_interval_days: Some(90),
        }
    }

    fn ascending(rows: Vec<SnapshotRow>, completeness: Completeness) -> History<SnapshotRow> {
        History::oldest_first(rows, completeness)
    }

    fn spans(entries: &[TimelineEntry]) -> Vec<(DensityTier, usize)> {
        entries
            .iter()
            .filter_map(|e| match e {
                TimelineEntry::DensitySpan {
                    tier,
                    observation_count,
                    ..
                } => Some((*tier, *observation_count)),
                _ => None,
            })
            .collect()
    }

    fn transitions(entries: &[TimelineEntry]) -> Vec<(Option<DensityTier>, DensityTier)> {
        entries
            .iter()
            .filter_map(|e| match e {
                TimelineEntry::DensityTransition {
                    from_tier, to_tier, ..
                } => Some((*from_tier, *to_tier)),
                _ => None,
            })
            .collect()
    }

    #[test]
    fn empty_history_is_empty_timeline() {
        assert!(build_timeline(&History::empty(), &History::empty(), true).is_empty());
    }

    #[test]
    fn steady_run_collapses_into_span() {
        let snapshots = ascending(
            vec![
                snapshot("2026-01-01T00:00:00Z", Some(DensityTier::Thickening)),
                snapshot("2026-01-02T00:00:00Z", Some(DensityTier::Thickening)),
                snapshot("2026-01-03T00:00:00Z", Some(DensityTier::Thickening)),
            ],
            Completeness::Complete,
        );
        let timeline = build_timeline(&snapshots, &History::empty(), false);

        assert_eq!(spans(&timeline), vec![(DensityTier::Thickening, 3)]);
        // Only the first observation, no transition within the run.
        assert_eq!(transitions(&timeline), vec![(None, DensityTier::Thickening)]);

        let span_end = timeline.iter().find_map(|e| match e {
            TimelineEntry::DensitySpan { span_end, .. } => Some(*span_end),
            _ => None,
        });
        assert_eq!(span_end, Some(ts("2026-01-03T00:00:00Z")));
    }

    #[test]
    fn truncated_history_hides_first_observation() {
        let snapshots = ascending(
            vec![
                snapshot("2026-01-01T00:00:00Z", Some(DensityTier::Sparse)),
                snapshot("2026-01-02T00:00:00Z", Some(DensityTier::Rooting)),
            ],
            Completeness::Truncated,
        );
        let timeline = build_timeline(&snapshots, &History::empty(), false);
        assert_eq!(
            transitions(&timeline),
            vec![(Some(DensityTier::Sparse), DensityTier::Rooting)]
        );
    }

    #[test]
    fn transitions_and_spans_interleave() {
        let snapshots = ascending(
            vec![
                snapshot("2026-01-01T00:00:00Z", Some(DensityTier::Sparse)),
                snapshot("2026-01-02T00:00:00Z", Some(DensityTier::Sparse)),
                snapshot("2026-01-03T00:00:00Z", None),
                snapshot("2026-01-04T00:00:00Z", Some(DensityTier::Rooting)),
                snapshot("2026-01-05T00:00:00Z", Some(DensityTier::Thickening)),
                snapshot("2026-01-06T00:00:00Z", Some(DensityTier::Thickening)),
            ],
            Completeness::Complete,
        );
        let timeline = build_timeline(&snapshots, &History::empty(), false);

        assert_eq!(
            spans(&timeline),
            vec![(DensityTier::Thickening, 2), (DensityTier::Sparse, 2)]
        );
        assert_eq!(
            transitions(&timeline),
            vec![
                (Some(DensityTier::Rooting), DensityTier::Thickening),
                (Some(DensityTier::Sparse), DensityTier::Rooting),
                (None, DensityTier::Sparse),
            ]
        );
    }

    #[test]
    fn latest_density_entry_is_flagged_fresh() {
        let snapshots = ascending(
            vec![
                snapshot("2026-01-01T00:00:00Z", Some(DensityTier::Sparse)),
                snapshot("2026-01-02T00:00:00Z", Some(DensityTier::Rooting)),
            ],
            Completeness::Complete,
        );
        let timeline = build_timeline(&snapshots, &History::empty(), true);
        let fresh: Vec<_> = timeline
            .iter()
            .map(|e| match e {
                TimelineEntry::DensityTransition {
                    freshly_recorded, ..
                }
                | TimelineEntry::DensitySpan {
                    freshly_recorded, ..
                } => *freshly_recorded,
                TimelineEntry::DeclarationChange { .. } => false,
            })
            .collect();
        assert_eq!(fresh, vec![true, false]);
    }

    #[test]
    fn declaration_changes_list_each_field() {
        let declarations = History::newest_first(
            vec![
                declaration("2026-03-01T00:00:00Z", "resting", None),
                declaration("2026-02-01T00:00:00Z", "resting", Some("ops")),
                declaration("2026-01-01T00:00:00Z", "expanding", Some("ops")),
            ],
            Completeness::Complete,
        );
        let timeline = build_timeline(&History::empty(), &declarations, false);

        assert_eq!(timeline.len(), 2);
        assert_eq!(
            timeline[0],
            TimelineEntry::DeclarationChange {
                observed_at: ts("2026-03-01T00:00:00Z"),
                changes: vec![FieldChange {
                    field: String::from("steward"),
                    from: Some(String::from("ops")),
                    to: None,
                }],
            }
        );
        assert_eq!(
            timeline[1],
            TimelineEntry::DeclarationChange {
                observed_at: ts("2026-02-01T00:00:00Z"),
                changes: vec![FieldChange {
                    field: String::from("phase"),
                    from: Some(String::from("expanding")),
                    to: Some(String::from("resting")),
                }],
            }
        );
    }

    #[test]
    fn merged_entries_are_most_recent_first() {
        let snapshots = ascending(
            vec![
                snapshot("2026-01-01T00:00:00Z", Some(DensityTier::Sparse)),
                snapshot("2026-03-01T00:00:00Z", Some(DensityTier::Rooting)),
            ],
            Completeness::Complete,
        );
        let declarations = History::oldest_first(
            vec![
                declaration("2026-01-15T00:00:00Z", "emerging", None),
                declaration("2026-02-01T00:00:00Z", "expanding", None),
            ],
            Completeness::Complete,
        );
        let timeline = build_timeline(&snapshots, &declarations, false);
        let times: Vec<_> = timeline.iter().map(TimelineEntry::observed_at).collect();
        assert_eq!(
            times,
            vec![
                ts("2026-03-01T00:00:00Z"),
                ts("2026-02-01T00:00:00Z"),
                ts("2026-01-01T00:00:00Z"),
            ]
        );
    }

    #[test]
    fn serializes_with_kind_tag() {
        let entry = TimelineEntry::DensitySpan {
            observed_at: ts("2026-01-01T00:00:00Z"),
            tier: DensityTier::DenseCanopy,
            span_end: ts("2026-01-02T00:00:00Z"),
            observation_count: 2,
            freshly_recorded: false,
        };
        let yaml = serde_yaml::to_string(&entry).unwrap_or_default();
        assert!(yaml.contains("kind: density_span"));
        assert!(yaml.contains("tier: dense_canopy"));
    }
}
