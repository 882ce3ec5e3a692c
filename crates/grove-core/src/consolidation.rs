//! # Consolidation Observer
//!
//! Elapsed-time arithmetic against a declared review interval.

use crate::types::Timestamp;
use serde::{Deserialize, Serialize};

const MILLIS_PER_DAY: i64 = 24 * 60 * 60 * 1000;

/// Whole days from `from` to `to`, floored (negative when `from` is later).
#[must_use]
pub fn days_between(from: Timestamp, to: Timestamp) -> i64 {
    (to - from).num_milliseconds().div_euclid(MILLIS_PER_DAY)
}

/// Status of the declared review interval against observed activity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConsolidationObservation {
    pub interval_days: u32,
    pub days_since_activity: i64,
    pub elapsed: bool,
}

/// Observe whether the review interval has elapsed since the last activity.
///
/// Returns `None` unless both the interval and the last activity are known.
/// The boundary is inclusive: exactly `interval_days` days counts as elapsed.
#[must_use]
pub fn observe_consolidation(
    interval_days: Option<u32>,
    last_activity: Option<Timestamp>,
    now: Timestamp,
) -> Option<ConsolidationObservation> {
    let interval_days = interval_days?;
    let last_activity = last_activity?;
    let days_since_activity = days_between(last_activity, now);

    Some(ConsolidationObservation {
        interval_days,
        days_since_activity,
        elapsed: days_since_activity >= i64::from(interval_days),
    })
}

// =============================================================================
// TESTS
// =============================================================================
