//! # Ritual Invitation Surfacer
//!
//! Assembles invitation text from fixed templates. Every template uses
//! only observed counts, durations and names.

use crate::consolidation::ConsolidationObservation;
use crate::declaration::Declaration;
use crate::ecology::RepositoryEcology;
use crate::phase_duration::{PhaseDurationObservation, suggests_reaffirmation};
use crate::types::{Climate, Ritual, RitualInvitation, Season};
use std::collections::BTreeMap;

/// Undeclared optional fields at which intent redeclaration is invited.
pub const INTENT_REDECLARATION_MIN_UNDECLARED: usize = 2;

// =============================================================================
// PER REPOSITORY
// =============================================================================

/// Surface invitations for one repository.
///
/// Order is fixed: consolidation, stewardship reaffirmation, intent
/// redeclaration.
#[must_use]
pub fn surface_ritual_invitations(
    declaration: Option<&Declaration>,
    consolidation: Option<&ConsolidationObservation>,
    phase_duration: Option<&PhaseDurationObservation>,
) -> Vec<RitualInvitation> {
    let mut invitations = Vec::new();

    if let Some(observation) = consolidation.filter(|c| c.elapsed) {
        invitations.push(RitualInvitation::new(
            Ritual::Consolidation,
            format!(
                "The declared review interval of {} days has elapsed. \
                 This project may be ready for a consolidation review.",
                observation.interval_days
            ),
        ));
    }

    let review_interval_days = declaration.and_then(|d| d.review_interval_days);
    if let Some(duration) =
        phase_duration.filter(|d| suggests_reaffirmation(d, review_interval_days))
    {
        invitations.push(RitualInvitation::new(
            Ritual::StewardshipReaffirmation,
            format!(
                "This project has been in the {} phase for {} days. \
                 It may be a fitting moment to reaffirm its stewardship.",
                duration.phase, duration.days_since_declared
            ),
        ));
    }

    if let Some(undeclared) = declaration
        .map(Declaration::undeclared_count)
        .filter(|n| *n >= INTENT_REDECLARATION_MIN_UNDECLARED)
    {
        invitations.push(RitualInvitation::new(
            Ritual::IntentRedeclaration,
            format!(
                "{} ecology fields remain undeclared. \
                 This project may benefit from revisiting its declared intent.",
                undeclared
            ),
        ));
    }

    invitations
}

// =============================================================================
// PORTFOLIO
// =============================================================================

/// Surface portfolio-wide invitations.
///
/// Two mutually exclusive paths:
///
/// - at least half of the classified, seasoned repositories have a season
///   other than the climate: a general tension count;
/// - otherwise, when one non-climate season alone accounts for at least
///   three fifths of them: an invitation naming that season.
///
/// A dominant season's count never exceeds the tension count, so the
/// second path can only fire if the first one did not, which at these
/// thresholds does not happen. Both are kept with their thresholds.
#[must_use]
pub fn surface_ecosystem_invitations(
    climate: Option<Climate>,
    repositories: &[RepositoryEcology],
) -> Vec<RitualInvitation> {
    let Some(climate) = climate else {
        return Vec::new();
    };

    let seasons: Vec<Season> = repositories
        .iter()
        .filter(|repo| repo.classified)
        .filter_map(|repo| repo.season.map(|s| s.season))
        .collect();
    let total = seasons.len();
    if total == 0 {
        return Vec::new();
    }

    let tension = seasons.iter().filter(|season| **season != climate).count();

    // tension / total >= 1/2
    if tension * 2 >= total {
        return vec![RitualInvitation::new(
            Ritual::EcosystemBalance,
            format!(
                "{} of {} classified repositories have a derived season that diverges from the declared climate. \
                 The portfolio may be ready for an ecosystem balance review.",
                tension, total
            ),
        )];
    }

    // dominant / total >= 3/5
    if let Some((season, count)) = dominant_season(&seasons, climate)
        .filter(|(_, count)| count * 5 >= total * 3)
    {
        return vec![RitualInvitation::new(
            Ritual::EcosystemBalance,
            format!(
                "{} of {} classified repositories are in the {} season while the declared climate is {}. \
                 The portfolio may be ready for an ecosystem balance review.",
                count, total, season, climate
            ),
        )];
    }

    Vec::new()
}

/// Most common non-climate season; ties go to the smallest name.
fn dominant_season(seasons: &[Season], climate: Climate) -> Option<(Season, usize)> {
    let mut counts: BTreeMap<&'static str, (Season, usize)> = BTreeMap::new();
    for season in seasons.iter().filter(|season| **season != climate) {
        counts.entry(season.as_str()).or_insert((*season, 0)).1 += 1;
    }

    let mut dominant: Option<(Season, usize)> = None;
    for (_, (season, count)) in counts {
        if dominant.is_none_or(|(_, best)| count > best) {
            dominant = Some((season, count));
        }
    }
    dominant
}

// =============================================================================
// TESTS
// =============================================================================
