//! # Observation Assembly
//!
//! Composes every observer into one value per repository and one per
//! portfolio. Callers supply the collaborator data (raw documents,
//! signals, history windows) and an injected `now`; nothing here fetches
//! or writes anything.

use crate::consolidation::{ConsolidationObservation, observe_consolidation};
use crate::density::{DensityObservation, observe_structural_density};
use crate::drift::{
    MotionDriftObservation, ReferenceSnapshot, ShapeDriftObservation, find_reference_snapshot,
    observe_motion_drift, observe_shape_drift,
};
use crate::ecology::{RepositoryEcology, classify_document};
use crate::history::{ClimateDeclaration, DeclarationRow, History, SnapshotRow, current_climate};
use crate::persistence::{assess_persistence, snapshot_relations};
use crate::phase_duration::{
    PhaseDurationObservation, find_phase_declaration_timestamp, observe_phase_duration,
};
use crate::rituals::{surface_ecosystem_invitations, surface_ritual_invitations};
use crate::stratum::{Classification, classify_repository};
use crate::tension::{ClimateTension, observe_climate_tension};
use crate::timeline::{TimelineEntry, build_timeline};
use crate::triggers::{
    EcosystemTriggerResult, RepoPersistenceContext, build_repo_persistence_context,
    evaluate_ecosystem_triggers,
};
use crate::types::{Climate, RitualInvitation, StructuralSignals, Timestamp};
use serde::Serialize;

// =============================================================================
// REPOSITORY
// =============================================================================

/// Everything known about one repository for one observation cycle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepositoryInputs {
    pub full_name: String,
    /// Raw `.grove.yaml` content, if the repository has one.
    pub declaration_document: Option<String>,
    pub signals: Option<StructuralSignals>,
    /// Most recent push or commit.
    pub last_activity: Option<Timestamp>,
    pub snapshots: History<SnapshotRow>,
    pub declarations: History<DeclarationRow>,
    /// Whether a snapshot was written for this cycle.
    pub fresh_snapshot_recorded: bool,
}

impl RepositoryInputs {
    /// Inputs with no document, no signals and no history.
    #[must_use]
    pub fn new(full_name: impl Into<String>) -> Self {
        Self {
            full_name: full_name.into(),
            declaration_document: None,
            signals: None,
            last_activity: None,
            snapshots: History::empty(),
            declarations: History::empty(),
            fresh_snapshot_recorded: false,
        }
    }
}

/// The full observation of one repository. Every part may be absent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RepositoryObservation {
    pub ecology: RepositoryEcology,
    pub classification: Option<Classification>,
    pub density: Option<DensityObservation>,
    pub consolidation: Option<ConsolidationObservation>,
    pub phase_declared_at: Option<Timestamp>,
    pub phase_duration: Option<PhaseDurationObservation>,
    pub reference_snapshot: Option<ReferenceSnapshot>,
    pub shape_drift: Option<ShapeDriftObservation>,
    pub motion_drift: Option<MotionDriftObservation>,
    pub ritual_invitations: Vec<RitualInvitation>,
    pub timeline: Vec<TimelineEntry>,
}

/// Observe one repository.
#[must_use]
pub fn observe_repository(inputs: &RepositoryInputs, now: Timestamp) -> RepositoryObservation {
    let ecology = classify_document(&inputs.full_name, inputs.declaration_document.as_deref());
    let declaration = ecology.declaration.as_ref();
    let phase = declaration.and_then(|d| d.phase);

    let consolidation = observe_consolidation(
        declaration.and_then(|d| d.review_interval_days),
        inputs.last_activity,
        now,
    );
    let density = inputs
        .signals
        .as_ref()
        .and_then(|signals| observe_structural_density(signals, consolidation.as_ref()));

    let phase_declared_at = find_phase_declaration_timestamp(phase, &inputs.declarations);
    let phase_duration = observe_phase_duration(
        phase,
        phase_declared_at,
        declaration.and_then(|d| d.horizon),
        now,
    );

    let reference_snapshot = find_reference_snapshot(phase_declared_at, &inputs.snapshots);
    let shape_drift = match (&reference_snapshot, &inputs.signals) {
        (Some(reference), Some(signals)) => {
            observe_shape_drift(reference, signals, density.as_ref().map(|d| d.tier))
        }
        _ => None,
    };
    let motion_drift = phase.and_then(|phase| {
        let signals = inputs.signals.as_ref()?;
        observe_motion_drift(phase, signals.commits_last_30d, signals.commits_last_90d)
    });

    let ritual_invitations =
        surface_ritual_invitations(declaration, consolidation.as_ref(), phase_duration.as_ref());
    let timeline = build_timeline(
        &inputs.snapshots,
        &inputs.declarations,
        inputs.fresh_snapshot_recorded,
    );

    RepositoryObservation {
        classification: classify_repository(&ecology),
        ecology,
        density,
        consolidation,
        phase_declared_at,
        phase_duration,
        reference_snapshot,
        shape_drift,
        motion_drift,
        ritual_invitations,
        timeline,
    }
}

// =============================================================================
// PORTFOLIO
// =============================================================================

/// One repository as seen at portfolio scope.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PortfolioEntry {
    pub full_name: String,
    pub declaration_document: Option<String>,
    pub snapshots: History<SnapshotRow>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PortfolioObservation {
    pub repositories: Vec<RepositoryEcology>,
    pub unclassified: Vec<RepositoryEcology>,
    pub climate: Option<Climate>,
    pub tensions: Vec<ClimateTension>,
    pub ecosystem_invitations: Vec<RitualInvitation>,
    pub persistence_contexts: Vec<RepoPersistenceContext>,
    /// Only evaluated when a climate is declared.
    pub triggers: Option<EcosystemTriggerResult>,
}

/// Observe a portfolio against its climate history.
///
/// Input order is preserved in every output list.
#[must_use]
pub fn observe_portfolio(
    entries: &[PortfolioEntry],
    climate_history: &History<ClimateDeclaration>,
) -> PortfolioObservation {
    let climate = current_climate(climate_history);

    let ecologies: Vec<RepositoryEcology> = entries
        .iter()
        .map(|entry| classify_document(&entry.full_name, entry.declaration_document.as_deref()))
        .collect();

    let persistence_contexts: Vec<RepoPersistenceContext> = match climate {
        Some(climate) => entries
            .iter()
            .zip(&ecologies)
            .filter_map(|(entry, ecology)| {
                let persistence = assess_persistence(&snapshot_relations(&entry.snapshots, climate));
                build_repo_persistence_context(ecology, persistence, climate)
            })
            .collect(),
        None => Vec::new(),
    };
    let triggers = climate.map(|_| evaluate_ecosystem_triggers(&persistence_contexts));

    let (repositories, unclassified): (Vec<_>, Vec<_>) =
        ecologies.into_iter().partition(|ecology| ecology.classified);

    PortfolioObservation {
        tensions: observe_climate_tension(climate, &repositories),
        ecosystem_invitations: surface_ecosystem_invitations(climate, &repositories),
        repositories,
        unclassified,
        climate,
        persistence_contexts,
        triggers,
    }
}

// =============================================================================
// TESTS
// =============================================================================
