//! # Report Module
//!
//! Structured, transparent presentation of an observation.
//!
//! A report keeps three things apart:
//! - Every observed statement comes from an observer that had its inputs
//! - Every invitation is surfaced as-is, never as a directive
//! - Every unobserved aspect explains which input was missing
//!
//! "No observation available" is a displayable state, not an error.

use crate::observe::{PortfolioObservation, RepositoryObservation};
use crate::persistence::PERSISTENCE_WINDOW_SIZE;
use crate::types::RitualInvitation;
use serde::{Deserialize, Serialize};

/// A statement backed by observed inputs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Observed {
    /// What was observed.
    pub aspect: String,
    /// The observational statement.
    pub statement: String,
}

impl Observed {
    /// Create a new observed statement.
    #[must_use]
    pub fn new(aspect: impl Into<String>, statement: impl Into<String>) -> Self {
        Self {
            aspect: aspect.into(),
            statement: statement.into(),
        }
    }
}

/// An aspect that could not be observed.
///
/// Carries an explanation of which input was missing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Unobserved {
    /// The aspect that could not be observed.
    pub aspect: String,
    /// Which input was missing.
    pub explanation: String,
}

impl Unobserved {
    /// Create a new unobserved entry.
    #[must_use]
    pub fn new(aspect: impl Into<String>, explanation: impl Into<String>) -> Self {
        Self {
            aspect: aspect.into(),
            explanation: explanation.into(),
        }
    }
}

/// The complete observation report.
///
/// Contains OBSERVED, INVITATIONS and UNOBSERVED separated clearly.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ObservationReport {
    /// Title line, usually the repository or portfolio name.
    pub subject: String,
    /// Statements backed by observed inputs.
    pub observed: Vec<Observed>,
    /// Ritual invitations surfaced for the subject.
    pub invitations: Vec<RitualInvitation>,
    /// Aspects without enough input.
    pub unobserved: Vec<Unobserved>,
}

impl ObservationReport {
    /// Create an empty report for a subject.
    #[must_use]
    pub fn new(subject: impl Into<String>) -> Self {
        Self {
            subject: subject.into(),
            ..Self::default()
        }
    }

    /// Add an observed statement.
    pub fn observe(&mut self, aspect: &str, statement: impl Into<String>) {
        self.observed.push(Observed::new(aspect, statement));
    }

    /// Add an unobserved aspect.
    pub fn unobserved(&mut self, aspect: &str, explanation: impl Into<String>) {
        self.unobserved.push(Unobserved::new(aspect, explanation));
    }

    /// Check if the report has any content.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.observed.is_empty() && self.invitations.is_empty() && self.unobserved.is_empty()
    }

    /// Build the report for one repository.
    #[must_use]
    pub fn for_repository(observation: &RepositoryObservation) -> Self {
        let mut report = Self::new(observation.ecology.full_name.as_str());
        let ecology = &observation.ecology;

        match (&ecology.declaration, &ecology.rejection) {
            (Some(declaration), _) => {
                report.observe("intent", format!("Declared intent: {}", declaration.intent));
                let undeclared = declaration.undeclared_count();
                if undeclared > 0 {
                    report.observe(
                        "declaration",
                        format!("{} of 5 optional ecology fields are undeclared.", undeclared),
                    );
                }
            }
            (None, Some(rejection)) => {
                report.unobserved("declaration", format!("The declaration was rejected: {}", rejection));
            }
            (None, None) => report.unobserved("declaration", "No .grove.yaml document was found."),
        }

        match &ecology.season {
            Some(season) => {
                let mode = season
                    .dormancy_mode
                    .map(|mode| format!(", {}", mode))
                    .unwrap_or_default();
                report.observe(
                    "season",
                    format!(
                        "Season {} derived from the {} phase{}.",
                        season.season, season.source_phase, mode
                    ),
                );
            }
            None if ecology.classified => {
                report.unobserved("season", "No phase is declared.");
            }
            None => {}
        }

        match observation.classification {
            Some(classification) => {
                let stratum = classification
                    .stratum
                    .map_or_else(|| String::from("no stratum (seasonal horizon)"), |s| format!("stratum {}", s));
                report.observe(
                    "stratum",
                    format!("Role class {}, {}.", classification.role_class, stratum),
                );
            }
            None if ecology.classified => {
                report.unobserved("stratum", "Horizon or role is undeclared.");
            }
            None => {}
        }

        match &observation.density {
            Some(density) => report.observe(
                "density",
                format!("Structural density: {}. {}", density.tier.label(), density.description),
            ),
            None => report.unobserved("density", "No file count or commit activity was observed."),
        }

        match observation.consolidation {
            Some(consolidation) => report.observe(
                "consolidation",
                format!(
                    "{} days since last activity, against a review interval of {} days.",
                    consolidation.days_since_activity, consolidation.interval_days
                ),
            ),
            None => report.unobserved(
                "consolidation",
                "No review interval is declared, or no activity was recorded.",
            ),
        }

        match observation.phase_duration {
            Some(duration) => report.observe(
                "phase duration",
                format!(
                    "In the {} phase for {} days.",
                    duration.phase, duration.days_since_declared
                ),
            ),
            None => report.unobserved(
                "phase duration",
                "When the current phase was declared is not within the available history.",
            ),
        }

        match (&observation.reference_snapshot, &observation.shape_drift) {
            (_, Some(drift)) => {
                for description in &drift.descriptions {
                    report.observe("shape drift", description.as_str());
                }
            }
            (Some(_), None) => {}
            (None, None) => report.unobserved(
                "shape drift",
                "No snapshot from when the current phase was declared is available.",
            ),
        }

        if let Some(drift) = &observation.motion_drift {
            report.observe("motion drift", drift.description.as_str());
        }

        if !observation.timeline.is_empty() {
            report.observe(
                "timeline",
                format!("{} timeline entries reconstructed.", observation.timeline.len()),
            );
        }

        report.invitations = observation.ritual_invitations.clone();
        report
    }

    /// Build the report for a portfolio.
    #[must_use]
    pub fn for_portfolio(observation: &PortfolioObservation) -> Self {
        let mut report = Self::new("portfolio");

        report.observe(
            "repositories",
            format!(
                "{} classified and {} unclassified repositories.",
                observation.repositories.len(),
                observation.unclassified.len()
            ),
        );

        match observation.climate {
            Some(climate) => report.observe("climate", format!("Declared climate: {}.", climate)),
            None => report.unobserved("climate", "No climate has been declared."),
        }

        for tension in &observation.tensions {
            report.observe(
                "tension",
                format!(
                    "{} is in the {} season under a {} climate.",
                    tension.full_name, tension.season, tension.climate
                ),
            );
        }

        if let Some(triggers) = &observation.triggers {
            for ctx in &triggers.core_divergence {
                report.observe(
                    "core divergence",
                    format!(
                        "Structural core repository {} has been persistently divergent from the climate.",
                        ctx.repo_id
                    ),
                );
            }
            if triggers.core_split {
                report.observe(
                    "core split",
                    "The structural core holds both persistently aligned and persistently divergent repositories.",
                );
            }
            if let Some(season) = triggers.long_arc_drift.coherent_season {
                report.observe(
                    "long-arc drift",
                    format!(
                        "{} long-arc repositories are persistently divergent toward the {} season.",
                        triggers.long_arc_drift.repos.len(),
                        season
                    ),
                );
            }

            let incomplete = observation
                .persistence_contexts
                .iter()
                .filter(|ctx| !ctx.persistence.window_complete())
                .count();
            if incomplete > 0 {
                report.unobserved(
                    "persistence",
                    format!(
                        "{} repositories have fewer than {} recorded observations.",
                        incomplete, PERSISTENCE_WINDOW_SIZE
                    ),
                );
            }
        }

        report.invitations = observation.ecosystem_invitations.clone();
        report
    }

    /// Format as plain text with the standard template.
    #[must_use]
    pub fn to_text(&self) -> String {
        let mut output = String::new();

        output.push_str(&format!("{}\n", self.subject));
        output.push_str("┌─────────────────────────────────────┐\n");
        output.push_str("│ OBSERVED                            │\n");

        if self.observed.is_empty() {
            output.push_str("│ - (none)                            │\n");
        } else {
            for observed in &self.observed {
                output.push_str(&format!("│ - {}: {}\n", observed.aspect, observed.statement));
            }
        }

        output.push_str("├─────────────────────────────────────┤\n");
        output.push_str("│ INVITATIONS                         │\n");

        if self.invitations.is_empty() {
            output.push_str("│ - (none)                            │\n");
        } else {
            for invitation in &self.invitations {
                output.push_str(&format!(
                    "│ - [{}] {}\n",
                    invitation.ritual, invitation.observation
                ));
            }
        }

        output.push_str("├─────────────────────────────────────┤\n");
        output.push_str("│ UNOBSERVED (input missing)          │\n");

        if self.unobserved.is_empty() {
            output.push_str("│ - (none)                            │\n");
        } else {
            for unobserved in &self.unobserved {
                output.push_str(&format!(
                    "│ - {}: {}\n",
                    unobserved.aspect, unobserved.explanation
                ));
            }
        }

        output.push_str("└─────────────────────────────────────┘\n");

        output
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::history::{ClimateDeclaration, Completeness, History};
    use crate::observe::{PortfolioEntry, RepositoryInputs, observe_portfolio, observe_repository};
    use crate::test_support::{assert_observational, ts};
    use crate::types::{Ritual, Season, StructuralSignals};

    #[test]
    fn report_building() {
        let mut report = ObservationReport::new("acme/storage");
        assert!(report.is_empty());

        report.observe("density", "Structural density: sparse.");
        report.unobserved("consolidation", "No review interval is declared.");
        report
            .invitations
            .push(RitualInvitation::new(Ritual::Consolidation, "text"));

        assert!(!report.is_empty());
        assert_eq!(report.observed.len(), 1);
        assert_eq!(report.unobserved.len(), 1);
    }

    #[test]
    fn to_text_format() {
        let mut report = ObservationReport::new("acme/storage");
        report.observe("season", "Season expansion derived from the expanding phase.");
        report.unobserved("density", "No file count or commit activity was observed.");

        let text = report.to_text();
        assert!(text.starts_with("acme/storage\n"));
        assert!(text.contains("OBSERVED"));
        assert!(text.contains("INVITATIONS"));
        assert!(text.contains("UNOBSERVED"));
        assert!(text.contains("- season: Season expansion"));
        assert!(text.contains("- density: No file count"));
    }

    #[test]
    fn unclassified_repository_explains_missing_inputs() {
        let observation =
            observe_repository(&RepositoryInputs::new("acme/bare"), ts("2026-01-01T00:00:00Z"));
        let report = ObservationReport::for_repository(&observation);

        let aspects: Vec<_> = report.unobserved.iter().map(|u| u.aspect.as_str()).collect();
        assert!(aspects.contains(&"declaration"));
        assert!(aspects.contains(&"density"));
        assert!(aspects.contains(&"consolidation"));
        assert!(report.observed.is_empty());
        assert_observational(&report.to_text());
    }

    #[test]
    fn rejected_declaration_is_reported() {
        let inputs = RepositoryInputs {
            declaration_document: Some(String::from("grove:\n  intent: x\n  phase: sprinting\n")),
            ..RepositoryInputs::new("acme/odd")
        };
        let report =
            ObservationReport::for_repository(&observe_repository(&inputs, ts("2026-01-01T00:00:00Z")));
        assert!(
            report
                .unobserved
                .iter()
                .any(|u| u.explanation.contains("grove.phase"))
        );
    }

    #[test]
    fn classified_repository_report_is_observational() {
        let inputs = RepositoryInputs {
            declaration_document: Some(String::from(
                "grove:\n  intent: Notes\n  horizon: seasonal\n  role: documentation\n  phase: resting\n",
            )),
            signals: Some(StructuralSignals {
                file_count: Some(30),
                ..StructuralSignals::empty(ts("2026-01-01T00:00:00Z"))
            }),
            ..RepositoryInputs::new("acme/notes")
        };
        let report =
            ObservationReport::for_repository(&observe_repository(&inputs, ts("2026-01-01T00:00:00Z")));
        let text = report.to_text();

        assert!(text.contains("Season dormancy derived from the resting phase, hibernation."));
        assert!(text.contains("no stratum (seasonal horizon)"));
        assert!(text.contains("Structural density: sparse."));
        assert_observational(&text);
    }

    #[test]
    fn portfolio_report_without_climate() {
        let observation = observe_portfolio(&[], &History::empty());
        let report = ObservationReport::for_portfolio(&observation);
        assert!(report.unobserved.iter().any(|u| u.aspect == "climate"));
        assert!(report.invitations.is_empty());
    }

    #[test]
    fn portfolio_report_lists_climate() {
        let climate = History::newest_first(
            vec![ClimateDeclaration {
                climate: Season::Pruning,
                declared_at: ts("2026-01-01T00:00:00Z"),
                declared_by: None,
            }],
            Completeness::Complete,
        );
        let report = ObservationReport::for_portfolio(&observe_portfolio(&[], &climate));
        assert!(report.to_text().contains("Declared climate: pruning."));
    }

    #[test]
    fn portfolio_report_names_short_persistence_windows() {
        let climate = History::newest_first(
            vec![ClimateDeclaration {
                climate: Season::Expansion,
                declared_at: ts("2026-01-01T00:00:00Z"),
                declared_by: None,
            }],
            Completeness::Complete,
        );
        let entry = PortfolioEntry {
            full_name: String::from("acme/storage"),
            declaration_document: Some(String::from(
                "grove:\n  intent: x\n  horizon: perennial\n  role: library\n  phase: expanding\n",
            )),
            snapshots: History::empty(),
        };
        let report = ObservationReport::for_portfolio(&observe_portfolio(&[entry], &climate));

        let expected = format!(
            "1 repositories have fewer than {} recorded observations.",
            PERSISTENCE_WINDOW_SIZE
        );
        assert!(
            report
                .unobserved
                .iter()
                .any(|u| u.aspect == "persistence" && u.explanation == expected)
        );
    }
}
