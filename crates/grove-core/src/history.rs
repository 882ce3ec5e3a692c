//! # History Windows
//!
//! Typed, explicitly ordered row windows handed in by the persistence
//! collaborator.
//!
//! A `History<T>` always stores rows newest-first and always carries its
//! `Completeness`. Observers read it through `newest_first_iter()` or
//! `oldest_first_iter()`, so ascending input can never be silently mistaken
//! for descending input, and a truncated fetch can never be mistaken for
//! the whole record.

use crate::types::{Climate, DensityTier, Timestamp};
use serde::{Deserialize, Serialize};

// =============================================================================
// COMPLETENESS
// =============================================================================

/// Whether a fetched window holds the full history.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Completeness {
    /// Every row ever recorded is present.
    Complete,
    /// The fetch hit its limit; older rows may exist outside the window.
    Truncated,
}

impl Completeness {
    #[must_use]
    pub fn is_complete(self) -> bool {
        matches!(self, Completeness::Complete)
    }
}

// =============================================================================
// HISTORY
// =============================================================================

/// An owned row window, stored newest-first.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct History<T> {
    rows: Vec<T>,
    completeness: Completeness,
    /// First row past the window, when a fetch returned one.
    beyond: Option<T>,
}

impl<T> History<T> {
    /// Wrap rows that are already ordered most-recent-first.
    #[must_use]
    pub fn newest_first(rows: Vec<T>, completeness: Completeness) -> Self {
        Self {
            rows,
            completeness,
            beyond: None,
        }
    }

    /// Wrap rows ordered oldest-first. They are reversed on entry.
    #[must_use]
    pub fn oldest_first(mut rows: Vec<T>, completeness: Completeness) -> Self {
        rows.reverse();
        Self {
            rows,
            completeness,
            beyond: None,
        }
    }

    /// Wrap the result of a newest-first fetch of `limit + 1` rows.
    ///
    /// The window is complete iff no more than `limit` rows came back;
    /// at most `limit` rows are kept. Row `limit + 1` stays reachable
    /// through `beyond_window()`.
    #[must_use]
    pub fn from_fetch(mut rows: Vec<T>, limit: usize) -> Self {
        let completeness = if rows.len() <= limit {
            Completeness::Complete
        } else {
            Completeness::Truncated
        };
        let beyond = rows.split_off(limit.min(rows.len())).into_iter().next();
        Self {
            rows,
            completeness,
            beyond,
        }
    }

    /// Mark the window truncated regardless of its row count.
    ///
    /// Used when the collaborator reports an incomplete window itself.
    #[must_use]
    pub fn truncated(mut self) -> Self {
        self.completeness = Completeness::Truncated;
        self
    }

    /// An empty, complete history.
    #[must_use]
    pub fn empty() -> Self {
        Self {
            rows: Vec::new(),
            completeness: Completeness::Complete,
            beyond: None,
        }
    }

    /// Iterate most-recent-first.
    pub fn newest_first_iter(&self) -> impl DoubleEndedIterator<Item = &T> + ExactSizeIterator {
        self.rows.iter()
    }

    /// Iterate oldest-first.
    pub fn oldest_first_iter(&self) -> impl DoubleEndedIterator<Item = &T> + ExactSizeIterator {
        self.rows.iter().rev()
    }

    /// The most recent row, if any.
    #[must_use]
    pub fn latest(&self) -> Option<&T> {
        self.rows.first()
    }

    /// The oldest row inside the window, if any.
    #[must_use]
    pub fn earliest(&self) -> Option<&T> {
        self.rows.last()
    }

    /// The row just older than the window. Never part of iteration.
    #[must_use]
    pub fn beyond_window(&self) -> Option<&T> {
        self.beyond.as_ref()
    }

    #[must_use]
    pub fn completeness(&self) -> Completeness {
        self.completeness
    }

    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.completeness.is_complete()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Convert row types, preserving order and completeness.
    #[must_use]
    pub fn map<U>(&self, mut f: impl FnMut(&T) -> U) -> History<U> {
        History {
            rows: self.rows.iter().map(&mut f).collect(),
            completeness: self.completeness,
            beyond: self.beyond.as_ref().map(f),
        }
    }
}

impl<T> Default for History<T> {
    fn default() -> Self {
        Self::empty()
    }
}

// =============================================================================
// ROW CONTRACTS
// =============================================================================

/// One recorded ecology snapshot.
///
/// `phase` is stored loosely as whatever string was declared at the time;
/// it is bridged into a typed relation by `derive_snapshot_relation`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SnapshotRow {
    pub observed_at: Timestamp,
    #[serde(default)]
    pub phase: Option<String>,
    #[serde(default)]
    pub file_count: Option<u64>,
    #[serde(default)]
    pub ecosystem_dependency_count: Option<u64>,
    #[serde(default)]
    pub density_tier: Option<DensityTier>,
}

/// One recorded declaration, as stored (every field loosely typed).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeclarationRow {
    pub observed_at: Timestamp,
    #[serde(default)]
    pub classified: bool,
    #[serde(default)]
    pub intent: Option<String>,
    #[serde(default)]
    pub horizon: Option<String>,
    #[serde(default)]
    pub role: Option<String>,
    #[serde(default)]
    pub phase: Option<String>,
    #[serde(default)]
    pub steward: Option<String>,
    #[serde(default)]
    pub review_interval_days: Option<u32>,
}

/// One append-only climate declaration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClimateDeclaration {
    pub climate: Climate,
    pub declared_at: Timestamp,
    #[serde(default)]
    pub declared_by: Option<String>,
}

/// The climate currently in force: the newest declaration's value.
#[must_use]
pub fn current_climate(history: &History<ClimateDeclaration>) -> Option<Climate> {
    history.latest().map(|row| row.climate)
}

// =============================================================================
// TESTS
// =============================================================================
