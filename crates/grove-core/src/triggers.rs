//! # Ecosystem Trigger Evaluator
//!
//! Cross-repository pattern detection over persistence contexts.
//!
//! Three patterns, evaluated only over contexts with a full window:
//!
//! - **Core divergence**: structural-core repositories persistently
//!   divergent from the climate.
//! - **Core split**: the structural core holds both persistently aligned
//!   and persistently divergent repositories at once.
//! - **Long-arc drift**: two or more long-arc-domain repositories
//!   persistently divergent toward the same season.
//!
//! Ephemeral-field and unstratified contexts are carried but never
//! trigger anything on their own.

use crate::ecology::RepositoryEcology;
use crate::persistence::PersistenceAssessment;
use crate::season::derive_climate_relation;
use crate::stratum::classify_repository;
use crate::types::{Climate, ClimateRelation, Season, Stratum};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Minimum group size for coherent long-arc drift.
pub const LONG_ARC_MIN_GROUP: usize = 2;

// =============================================================================
// CONTEXT
// =============================================================================

/// One repository's persistence, as seen by trigger evaluation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RepoPersistenceContext {
    pub repo_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stratum: Option<Stratum>,
    pub persistence: PersistenceAssessment,
    /// Set only when persistence flags divergence and the current season
    /// actually diverges from the climate.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub divergent_season: Option<Season>,
}

/// Build the context for one repository.
///
/// Returns `None` for repositories without a declared horizon and role.
#[must_use]
pub fn build_repo_persistence_context(
    repo: &RepositoryEcology,
    persistence: PersistenceAssessment,
    climate: Climate,
) -> Option<RepoPersistenceContext> {
    let classification = classify_repository(repo)?;

    let divergent_season = repo
        .season
        .map(|derivation| derivation.season)
        .filter(|season| {
            persistence.persistently_divergent
                && derive_climate_relation(*season, climate) == ClimateRelation::Divergent
        });

    Some(RepoPersistenceContext {
        repo_id: repo.full_name.clone(),
        stratum: classification.stratum,
        persistence,
        divergent_season,
    })
}

// =============================================================================
// EVALUATION
// =============================================================================

/// Long-arc repositories drifting coherently toward one season.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct LongArcDrift {
    pub repos: Vec<RepoPersistenceContext>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub coherent_season: Option<Season>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct EcosystemTriggerResult {
    pub core_divergence: Vec<RepoPersistenceContext>,
    pub core_split: bool,
    pub long_arc_drift: LongArcDrift,
    pub triggered: bool,
}

/// Evaluate ecosystem triggers.
///
/// Output order follows input order within each group, so identical
/// inputs always yield identical results.
#[must_use]
pub fn evaluate_ecosystem_triggers(contexts: &[RepoPersistenceContext]) -> EcosystemTriggerResult {
    let complete = contexts.iter().filter(|ctx| ctx.persistence.window_complete());

    let mut core = Vec::new();
    let mut long_arc = Vec::new();
    for ctx in complete {
        match ctx.stratum {
            Some(Stratum::StructuralCore) => core.push(ctx),
            Some(Stratum::LongArcDomain) => long_arc.push(ctx),
            Some(Stratum::EphemeralField) | None => {}
        }
    }

    let core_divergence: Vec<RepoPersistenceContext> = core
        .iter()
        .filter(|ctx| ctx.persistence.persistently_divergent)
        .map(|ctx| (*ctx).clone())
        .collect();

    let core_split = !core_divergence.is_empty()
        && core.iter().any(|ctx| ctx.persistence.persistently_aligned);

    let long_arc_drift = evaluate_long_arc_drift(&long_arc);

    let triggered = !core_divergence.is_empty() || core_split || !long_arc_drift.repos.is_empty();

    EcosystemTriggerResult {
        core_divergence,
        core_split,
        long_arc_drift,
        triggered,
    }
}

/// Largest coherent group wins; ties go to the lexicographically
/// smallest season name.
fn evaluate_long_arc_drift(long_arc: &[&RepoPersistenceContext]) -> LongArcDrift {
    let mut by_season: BTreeMap<&'static str, (Season, Vec<RepoPersistenceContext>)> =
        BTreeMap::new();

    for ctx in long_arc.iter().filter(|ctx| ctx.persistence.persistently_divergent) {
        if let Some(season) = ctx.divergent_season {
            by_season
                .entry(season.as_str())
                .or_insert_with(|| (season, Vec::new()))
                .1
                .push((*ctx).clone());
        }
    }

    // BTreeMap iterates names ascending; strict `>` keeps the first of equals.
    let mut best: Option<(Season, Vec<RepoPersistenceContext>)> = None;
    for (_, (season, group)) in by_season {
        if group.len() < LONG_ARC_MIN_GROUP {
            continue;
        }
        let larger = best.as_ref().is_none_or(|(_, current)| group.len() > current.len());
        if larger {
            best = Some((season, group));
        }
    }

    match best {
        Some((season, repos)) => LongArcDrift {
            repos,
            coherent_season: Some(season),
        },
        None => LongArcDrift::default(),
    }
}

// =============================================================================
// TESTS
// =============================================================================
