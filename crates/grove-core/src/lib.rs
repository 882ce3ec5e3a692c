//! # Grove Core
//!
//! Deterministic observation and classification engine for repository
//! ecology.
//!
//! Every function here is pure and synchronous: identical inputs give
//! identical outputs, time is always injected, and nothing is logged or
//! written. Missing inputs produce "no observation" (`None`), never a
//! default and never an error. The only fallible operation is parsing a
//! declaration document.
//!
//! ## Layout
//!
//! - [`declaration`]: raw `.grove.yaml` to a typed [`Declaration`]
//! - [`season`]: phase to season, (season, climate) to relation
//! - [`density`]: structural signals to a density tier
//! - [`consolidation`], [`phase_duration`]: elapsed-time observers
//! - [`drift`]: shape and motion drift since the phase was declared
//! - [`persistence`]: windowed relation vote
//! - [`stratum`], [`triggers`]: ecosystem-wide pattern detection
//! - [`rituals`]: invitation text
//! - [`timeline`]: compressed history
//! - [`signals`]: raw listing reductions
//! - [`observe`], [`report`]: assembly and presentation

pub mod consolidation;
pub mod declaration;
pub mod density;
pub mod drift;
pub mod ecology;
pub mod error;
pub mod history;
pub mod observe;
pub mod persistence;
pub mod phase_duration;
pub mod report;
pub mod rituals;
pub mod season;
pub mod signals;
pub mod stratum;
pub mod tension;
pub mod timeline;
pub mod triggers;
pub mod types;

pub use consolidation::{ConsolidationObservation, days_between, observe_consolidation};
pub use declaration::{Declaration, parse_declaration};
pub use density::{DensityObservation, observe_structural_density};
pub use drift::{
    CadenceExpectation, MotionDriftObservation, ReferenceSnapshot, ShapeDriftObservation,
    find_reference_snapshot, observe_motion_drift, observe_shape_drift,
};
pub use ecology::{RepositoryEcology, classify_document};
pub use error::DeclarationError;
pub use history::{
    ClimateDeclaration, Completeness, DeclarationRow, History, SnapshotRow, current_climate,
};
pub use observe::{
    PortfolioEntry, PortfolioObservation, RepositoryInputs, RepositoryObservation,
    observe_portfolio, observe_repository,
};
pub use persistence::{
    PERSISTENCE_THRESHOLD, PERSISTENCE_WINDOW_SIZE, PersistenceAssessment, assess_persistence,
    derive_snapshot_relation, snapshot_relations,
};
pub use phase_duration::{
    PhaseDurationObservation, find_phase_declaration_timestamp, observe_phase_duration,
    suggests_reaffirmation,
};
pub use report::{ObservationReport, Observed, Unobserved};
pub use rituals::{surface_ecosystem_invitations, surface_ritual_invitations};
pub use season::{SeasonDerivation, derive_climate_relation, derive_season};
pub use signals::{
    CommitWindows, SourceListing, TreeEntry, TreeListing, TreeObservation, commit_windows,
    count_ecosystem_dependencies, observe_tree, reduce_source_listing,
};
pub use stratum::{Classification, classify_repository, classify_stratum, derive_role_class};
pub use tension::{ClimateTension, observe_climate_tension};
pub use timeline::{FieldChange, TimelineEntry, build_timeline};
pub use triggers::{
    EcosystemTriggerResult, LongArcDrift, RepoPersistenceContext, build_repo_persistence_context,
    evaluate_ecosystem_triggers,
};
pub use types::{
    Climate, ClimateRelation, DensityTier, DormancyMode, Horizon, Phase, Ritual,
    RitualInvitation, Role, RoleClass, Season, Stratum, StructuralSignals, Timestamp,
};

/// Evaluative words that must never appear in emitted text.
pub const FORBIDDEN_WORDS: [&str; 11] = [
    "success",
    "failure",
    "good",
    "bad",
    "healthy",
    "unhealthy",
    "underperforming",
    "productivity",
    "efficiency",
    "velocity",
    "optimize",
];

/// First forbidden word found in `text`, compared word by word and
/// case-insensitively.
#[must_use]
pub fn find_forbidden_word(text: &str) -> Option<&'static str> {
    text.split(|c: char| !c.is_alphanumeric())
        .filter(|word| !word.is_empty())
        .find_map(|word| {
            let lower = word.to_lowercase();
            FORBIDDEN_WORDS.iter().copied().find(|forbidden| *forbidden == lower)
        })
}

#[cfg(test)]
pub(crate) mod test_support {
    #![allow(clippy::unwrap_used, clippy::panic)]

    use crate::types::Timestamp;

    /// Parse an RFC 3339 timestamp.
    pub fn ts(raw: &str) -> Timestamp {
        raw.parse().unwrap()
    }

    /// Assert that emitted text carries no evaluative vocabulary.
    pub fn assert_observational(text: &str) {
        if let Some(word) = crate::find_forbidden_word(text) {
            panic!("evaluative word {:?} in {:?}", word, text);
        }
    }
}
