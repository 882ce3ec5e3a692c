//! # Signal Reduction
//!
//! Pure reductions from raw source listings to [`StructuralSignals`].
//! Fetching is someone else's job; these functions only count.
//!
//! A listing that is missing a part yields signals with that part absent.
//! A truncated tree yields no file count, since a partial count would read
//! as a complete one.

use crate::types::{StructuralSignals, Timestamp};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Root-level dependency manifest file names that are recognised.
pub const KNOWN_MANIFESTS: [&str; 13] = [
    "package.json",
    "go.mod",
    "Cargo.toml",
    "pyproject.toml",
    "requirements.txt",
    "Gemfile",
    "pom.xml",
    "build.gradle",
    "build.gradle.kts",
    "composer.json",
    "mix.exs",
    "pubspec.yaml",
    "Package.swift",
];

/// Manifest whose dependencies are matched against the ecosystem.
pub const PACKAGE_MANIFEST: &str = "package.json";

/// Weekly buckets summed for the 30-day commit count.
pub const WEEKS_30D: usize = 4;

/// Weekly buckets summed for the 90-day commit count.
pub const WEEKS_90D: usize = 13;

// =============================================================================
// TREE
// =============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TreeEntry {
    pub path: String,
    /// `blob` for files; anything else is not counted.
    #[serde(rename = "type")]
    pub kind: String,
}

impl TreeEntry {
    fn is_blob(&self) -> bool {
        self.kind == "blob"
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct TreeListing {
    #[serde(default)]
    pub entries: Vec<TreeEntry>,
    #[serde(default)]
    pub truncated: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TreeObservation {
    pub file_count: Option<u64>,
    pub manifests: BTreeSet<String>,
}

impl TreeObservation {
    #[must_use]
    pub fn has_package_manifest(&self) -> bool {
        self.manifests.contains(PACKAGE_MANIFEST)
    }
}

/// Count files and collect root-level manifests.
#[must_use]
pub fn observe_tree(entries: &[TreeEntry], truncated: bool) -> TreeObservation {
    let blobs = entries.iter().filter(|entry| entry.is_blob());

    let mut file_count: u64 = 0;
    let mut manifests = BTreeSet::new();
    for entry in blobs {
        file_count += 1;
        if !entry.path.contains('/') && KNOWN_MANIFESTS.contains(&entry.path.as_str()) {
            manifests.insert(entry.path.clone());
        }
    }

    TreeObservation {
        file_count: (!truncated).then_some(file_count),
        manifests,
    }
}

// =============================================================================
// COMMITS
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommitWindows {
    pub commits_last_30d: u64,
    pub commits_last_90d: u64,
}

/// Sum the most recent weekly totals (oldest week first, newest last).
///
/// An empty series means the statistics were unavailable.
#[must_use]
pub fn commit_windows(weekly_totals: &[u64]) -> Option<CommitWindows> {
    if weekly_totals.is_empty() {
        return None;
    }

    let recent = |weeks: usize| -> u64 {
        weekly_totals
            .iter()
            .rev()
            .take(weeks)
            .fold(0u64, |sum, total| sum.saturating_add(*total))
    };

    Some(CommitWindows {
        commits_last_30d: recent(WEEKS_30D),
        commits_last_90d: recent(WEEKS_90D),
    })
}

// =============================================================================
// ECOSYSTEM
// =============================================================================

/// Short, lowercased name: `owner/name` or `@scope/name` become `name`.
fn short_name(name: &str) -> String {
    name.rsplit('/').next().unwrap_or(name).to_lowercase()
}

/// Count distinct dependencies whose short name matches an ecosystem
/// repository's short name, case-insensitively.
#[must_use]
pub fn count_ecosystem_dependencies<'a>(
    dependencies: impl IntoIterator<Item = &'a str>,
    ecosystem_repos: &[String],
) -> u64 {
    let ecosystem: BTreeSet<String> = ecosystem_repos.iter().map(|r| short_name(r)).collect();
    let distinct: BTreeSet<&str> = dependencies.into_iter().collect();

    let mut count: u64 = 0;
    for dependency in distinct {
        if ecosystem.contains(&short_name(dependency)) {
            count += 1;
        }
    }
    count
}

// =============================================================================
// LISTING
// =============================================================================

/// Everything the signal source gathered for one repository.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceListing {
    #[serde(default)]
    pub tree: Option<TreeListing>,
    /// Weekly commit totals, oldest first.
    #[serde(default)]
    pub weekly_commit_totals: Option<Vec<u64>>,
    /// Dependency names from the root package manifest, all sections.
    #[serde(default)]
    pub root_dependencies: Option<Vec<String>>,
    /// Full names of the other repositories in the portfolio.
    #[serde(default)]
    pub ecosystem_repos: Vec<String>,
    pub observed_at: Timestamp,
}

/// Reduce a listing to structural signals.
///
/// The ecosystem dependency count is only observed when the tree shows a
/// root package manifest, its dependencies were read, and the portfolio
/// has other repositories to match against.
#[must_use]
pub fn reduce_source_listing(listing: &SourceListing) -> StructuralSignals {
    let tree = listing
        .tree
        .as_ref()
        .map(|tree| observe_tree(&tree.entries, tree.truncated));
    let commits = listing
        .weekly_commit_totals
        .as_deref()
        .and_then(commit_windows);

    let ecosystem_dependency_count = match (&tree, &listing.root_dependencies) {
        (Some(tree), Some(dependencies))
            if tree.has_package_manifest() && !listing.ecosystem_repos.is_empty() =>
        {
            Some(count_ecosystem_dependencies(
                dependencies.iter().map(String::as_str),
                &listing.ecosystem_repos,
            ))
        }
        _ => None,
    };

    StructuralSignals {
        file_count: tree.as_ref().and_then(|t| t.file_count),
        commits_last_30d: commits.map(|c| c.commits_last_30d),
        commits_last_90d: commits.map(|c| c.commits_last_90d),
        manifests_observed: tree.map(|t| t.manifests),
        ecosystem_dependency_count,
        observed_at: listing.observed_at,
    }
}

// =============================================================================
// TESTS
// =============================================================================
