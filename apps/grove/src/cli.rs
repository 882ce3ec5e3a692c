//! # CLI Commands
//!
//! Each `cmd_*` reads its input files, runs the engine and prints the
//! result to stdout as text or JSON. The `*_file` functions do the same
//! work without printing, for callers that want the values.
//!
//! Input files stand in for the external collaborators: history rows are
//! given most recent first, each with an optional `*_complete` flag. A
//! window reported incomplete, or holding more rows than `history_limit`,
//! is treated as truncated.

use crate::config::{GroveConfig, OutputFormat};
use crate::error::{CliError, CliResult};
use grove_core::{
    ClimateDeclaration, Declaration, DeclarationError, DeclarationRow, History,
    ObservationReport, PortfolioEntry, PortfolioObservation, RepositoryInputs,
    RepositoryObservation, SnapshotRow, SourceListing, StructuralSignals, Timestamp,
    TimelineEntry, observe_portfolio, observe_repository, parse_declaration,
    reduce_source_listing,
};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::io::Write;
use std::path::Path;
use tracing::{debug, info, warn};

// =============================================================================
// INPUT CONTRACTS
// =============================================================================

/// One repository, as delivered by the signal source and persistence.
#[derive(Debug, Clone, Deserialize)]
pub struct RepositoryFile {
    pub full_name: String,
    /// Raw `.grove.yaml` content.
    #[serde(default)]
    pub declaration: Option<String>,
    #[serde(default)]
    pub signals: Option<StructuralSignals>,
    #[serde(default)]
    pub last_activity: Option<Timestamp>,
    /// Most recent first.
    #[serde(default)]
    pub snapshots: Vec<SnapshotRow>,
    /// Whether `snapshots` holds the full history, as reported.
    #[serde(default)]
    pub snapshots_complete: Option<bool>,
    /// Most recent first.
    #[serde(default)]
    pub declarations: Vec<DeclarationRow>,
    #[serde(default)]
    pub declarations_complete: Option<bool>,
    #[serde(default)]
    pub fresh_snapshot_recorded: bool,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PortfolioRepositoryFile {
    pub full_name: String,
    #[serde(default)]
    pub declaration: Option<String>,
    /// Most recent first.
    #[serde(default)]
    pub snapshots: Vec<SnapshotRow>,
    #[serde(default)]
    pub snapshots_complete: Option<bool>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PortfolioFile {
    /// Most recent first.
    #[serde(default)]
    pub climate_history: Vec<ClimateDeclaration>,
    #[serde(default)]
    pub climate_history_complete: Option<bool>,
    #[serde(default)]
    pub repositories: Vec<PortfolioRepositoryFile>,
}

/// Result of `grove parse`: a declaration or its structured rejection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ParseOutcome {
    Declaration(Declaration),
    Rejection {
        #[serde(skip_serializing_if = "Option::is_none")]
        field: Option<&'static str>,
        reason: String,
    },
}

impl From<Result<Declaration, DeclarationError>> for ParseOutcome {
    fn from(result: Result<Declaration, DeclarationError>) -> Self {
        match result {
            Ok(declaration) => Self::Declaration(declaration),
            Err(err) => Self::Rejection {
                field: err.field(),
                reason: err.to_string(),
            },
        }
    }
}

// =============================================================================
// HELPERS
// =============================================================================

/// Resolve the observation clock: `--now` if given, else the current time.
pub fn resolve_now(raw: Option<&str>) -> CliResult<Timestamp> {
    match raw {
        None => Ok(chrono::Utc::now()),
        Some(value) => chrono::DateTime::parse_from_rfc3339(value)
            .map(|t| t.with_timezone(&chrono::Utc))
            .map_err(|e| CliError::InvalidTimestamp {
                value: value.to_string(),
                reason: e.to_string(),
            }),
    }
}

fn read_file(path: &Path) -> CliResult<String> {
    std::fs::read_to_string(path).map_err(|source| CliError::Io {
        path: path.to_path_buf(),
        source,
    })
}

fn read_json<T: DeserializeOwned>(path: &Path) -> CliResult<T> {
    let raw = read_file(path)?;
    Ok(serde_json::from_str(&raw)?)
}

/// Build a history window from rows delivered most recent first.
///
/// A reported `complete: false` always wins. Otherwise the window is
/// complete iff it holds no more than `limit` rows.
fn window<T>(
    label: &str,
    owner: &str,
    rows: Vec<T>,
    complete: Option<bool>,
    observed_at: impl Fn(&T) -> Timestamp,
    limit: usize,
) -> CliResult<History<T>> {
    if rows.windows(2).any(|pair| observed_at(&pair[0]) < observed_at(&pair[1])) {
        return Err(CliError::InvalidInput(format!(
            "{} {} must be ordered most recent first",
            owner, label
        )));
    }

    let mut history = History::from_fetch(rows, limit);
    if complete == Some(false) {
        history = history.truncated();
    }
    if !history.is_complete() {
        warn!(repository = owner, window = label, limit, "history window truncated");
    }
    Ok(history)
}

fn emit<T: Serialize>(value: &T, text: impl FnOnce() -> String, format: OutputFormat) -> CliResult<()> {
    let mut stdout = std::io::stdout().lock();
    match format {
        OutputFormat::Json => {
            serde_json::to_writer_pretty(&mut stdout, value)?;
            writeln!(stdout)?;
        }
        OutputFormat::Text => write!(stdout, "{}", text())?,
    }
    Ok(())
}

// =============================================================================
// PARSE
// =============================================================================

/// Validate a `.grove.yaml` file.
pub fn parse_file(path: &Path) -> CliResult<ParseOutcome> {
    let raw = read_file(path)?;
    let result = parse_declaration(&raw);
    if let Err(err) = &result {
        warn!(path = %path.display(), "declaration rejected: {}", err);
    }
    Ok(result.into())
}

/// Print a parse outcome. A rejection is a routine outcome, not an error.
pub fn cmd_parse(path: &Path, config: &GroveConfig) -> CliResult<()> {
    info!(path = %path.display(), "parsing declaration");
    let outcome = parse_file(path)?;
    emit(&outcome, || render_parse_outcome(&outcome), config.output)
}

pub fn render_parse_outcome(outcome: &ParseOutcome) -> String {
    match outcome {
        ParseOutcome::Declaration(declaration) => {
            let mut text = String::from("Declaration is valid.\n");
            let undeclared = String::from("(undeclared)");
            let fields = [
                ("intent", Some(declaration.intent.clone())),
                ("horizon", declaration.horizon.map(|h| h.to_string())),
                ("role", declaration.role.map(|r| r.to_string())),
                ("phase", declaration.phase.map(|p| p.to_string())),
                ("steward", declaration.steward.clone()),
                (
                    "review_interval_days",
                    declaration.review_interval_days.map(|d| d.to_string()),
                ),
            ];
            for (name, value) in fields {
                text.push_str(&format!(
                    "  {:<22}{}\n",
                    name,
                    value.as_ref().unwrap_or(&undeclared)
                ));
            }
            text
        }
        ParseOutcome::Rejection { reason, .. } => {
            format!("Declaration was rejected.\n  {}\n", reason)
        }
    }
}

// =============================================================================
// OBSERVE / TIMELINE
// =============================================================================

/// Load a repository file into engine inputs.
pub fn load_repository(path: &Path, config: &GroveConfig) -> CliResult<RepositoryInputs> {
    let file: RepositoryFile = read_json(path)?;
    let name = file.full_name.clone();

    Ok(RepositoryInputs {
        snapshots: window(
            "snapshots",
            &name,
            file.snapshots,
            file.snapshots_complete,
            |row| row.observed_at,
            config.history_limit,
        )?,
        declarations: window(
            "declarations",
            &name,
            file.declarations,
            file.declarations_complete,
            |row| row.observed_at,
            config.history_limit,
        )?,
        full_name: file.full_name,
        declaration_document: file.declaration,
        signals: file.signals,
        last_activity: file.last_activity,
        fresh_snapshot_recorded: file.fresh_snapshot_recorded,
    })
}

/// Observe one repository file.
pub fn observe_file(
    path: &Path,
    config: &GroveConfig,
    now: Timestamp,
) -> CliResult<RepositoryObservation> {
    let inputs = load_repository(path, config)?;
    let observation = observe_repository(&inputs, now);

    if let Some(rejection) = &observation.ecology.rejection {
        warn!(
            repository = %observation.ecology.full_name,
            "declaration rejected, repository unclassified: {}",
            rejection
        );
    }
    debug!(
        repository = %observation.ecology.full_name,
        classified = observation.ecology.classified,
        invitations = observation.ritual_invitations.len(),
        timeline = observation.timeline.len(),
        "repository observed"
    );
    Ok(observation)
}

pub fn cmd_observe(path: &Path, config: &GroveConfig, now: Timestamp) -> CliResult<()> {
    info!(path = %path.display(), %now, "observing repository");
    let observation = observe_file(path, config, now)?;
    emit(
        &observation,
        || ObservationReport::for_repository(&observation).to_text(),
        config.output,
    )
}

pub fn cmd_timeline(path: &Path, config: &GroveConfig, now: Timestamp) -> CliResult<()> {
    info!(path = %path.display(), "reconstructing timeline");
    let observation = observe_file(path, config, now)?;
    let timeline = observation.timeline;
    emit(&timeline, || render_timeline(&timeline), config.output)
}

/// One line per entry, most recent first.
pub fn render_timeline(timeline: &[TimelineEntry]) -> String {
    if timeline.is_empty() {
        return String::from("No timeline entries.\n");
    }

    let mut text = String::new();
    for entry in timeline {
        text.push_str(&format!(
            "{}  {}\n",
            entry.observed_at().format("%Y-%m-%d"),
            describe_entry(entry)
        ));
    }
    text
}

fn describe_entry(entry: &TimelineEntry) -> String {
    let fresh = |flag: bool| if flag { " (freshly recorded)" } else { "" };
    match entry {
        TimelineEntry::DensityTransition {
            from_tier: None,
            to_tier,
            freshly_recorded,
            ..
        } => format!("first observed as {}{}", to_tier.label(), fresh(*freshly_recorded)),
        TimelineEntry::DensityTransition {
            from_tier: Some(from),
            to_tier,
            freshly_recorded,
            ..
        } => format!(
            "density shifted from {} to {}{}",
            from.label(),
            to_tier.label(),
            fresh(*freshly_recorded)
        ),
        TimelineEntry::DensitySpan {
            tier,
            span_end,
            observation_count,
            freshly_recorded,
            ..
        } => format!(
            "{} across {} observations until {}{}",
            tier.label(),
            observation_count,
            span_end.format("%Y-%m-%d"),
            fresh(*freshly_recorded)
        ),
        TimelineEntry::DeclarationChange { changes, .. } => {
            let shown = |value: &Option<String>| {
                value.clone().unwrap_or_else(|| String::from("(undeclared)"))
            };
            let parts: Vec<String> = changes
                .iter()
                .map(|c| format!("{} {} -> {}", c.field, shown(&c.from), shown(&c.to)))
                .collect();
            format!("declaration changed: {}", parts.join("; "))
        }
    }
}

// =============================================================================
// PORTFOLIO
// =============================================================================

/// Observe a portfolio file.
pub fn portfolio_file(path: &Path, config: &GroveConfig) -> CliResult<PortfolioObservation> {
    let file: PortfolioFile = read_json(path)?;

    let climate_history = window(
        "climate_history",
        "portfolio",
        file.climate_history,
        file.climate_history_complete,
        |row| row.declared_at,
        config.history_limit,
    )?;

    let entries = file
        .repositories
        .into_iter()
        .map(|repo| {
            let snapshots = window(
                "snapshots",
                &repo.full_name,
                repo.snapshots,
                repo.snapshots_complete,
                |row| row.observed_at,
                config.history_limit,
            )?;
            Ok(PortfolioEntry {
                full_name: repo.full_name,
                declaration_document: repo.declaration,
                snapshots,
            })
        })
        .collect::<CliResult<Vec<_>>>()?;

    let observation = observe_portfolio(&entries, &climate_history);
    for repo in observation.unclassified.iter().filter(|r| r.rejection.is_some()) {
        warn!(repository = %repo.full_name, "declaration rejected, repository unclassified");
    }
    debug!(
        classified = observation.repositories.len(),
        unclassified = observation.unclassified.len(),
        contexts = observation.persistence_contexts.len(),
        "portfolio observed"
    );
    Ok(observation)
}

pub fn cmd_portfolio(path: &Path, config: &GroveConfig) -> CliResult<()> {
    info!(path = %path.display(), "observing portfolio");
    let observation = portfolio_file(path, config)?;
    emit(
        &observation,
        || ObservationReport::for_portfolio(&observation).to_text(),
        config.output,
    )
}

// =============================================================================
// SIGNALS
// =============================================================================

/// Reduce a raw source listing file to structural signals.
pub fn signals_file(path: &Path) -> CliResult<StructuralSignals> {
    let listing: SourceListing = read_json(path)?;
    if listing.tree.as_ref().is_some_and(|tree| tree.truncated) {
        warn!(path = %path.display(), "tree listing truncated, file count not observed");
    }
    Ok(reduce_source_listing(&listing))
}

pub fn cmd_signals(path: &Path, config: &GroveConfig) -> CliResult<()> {
    info!(path = %path.display(), "reducing source listing");
    let signals = signals_file(path)?;
    let text = serde_yaml::to_string(&signals)?;
    emit(&signals, || text, config.output)
}
