//! # Climate Tension
//!
//! Repositories whose derived season differs from the declared climate.

use crate::ecology::RepositoryEcology;
use crate::types::{Climate, Season};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClimateTension {
    pub full_name: String,
    pub climate: Climate,
    pub season: Season,
}

/// List every seasoned repository whose season differs from `climate`.
///
/// No climate, no tension.
#[must_use]
pub fn observe_climate_tension(
    climate: Option<Climate>,
    repositories: &[RepositoryEcology],
) -> Vec<ClimateTension> {
    let Some(climate) = climate else {
        return Vec::new();
    };

    repositories
        .iter()
        .filter_map(|repo| {
            let season = repo.season?.season;
            (season != climate).then(|| ClimateTension {
                full_name: repo.full_name.clone(),
                climate,
                season,
            })
        })
        .collect()
}

// =============================================================================
// TESTS
// =============================================================================
