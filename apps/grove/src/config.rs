//! # Configuration
//!
//! Layered, lowest precedence first: defaults, optional TOML file,
//! environment (`GROVE_HISTORY_LIMIT`, `GROVE_OUTPUT`), command-line flags
//! (`--output`, `--json`).
//!
//! ```toml
//! history_limit = 50
//! output = "json"
//! ```

use crate::error::{CliError, CliResult};
use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Default number of history rows passed to the engine.
pub const DEFAULT_HISTORY_LIMIT: usize = 50;

pub const ENV_HISTORY_LIMIT: &str = "GROVE_HISTORY_LIMIT";
pub const ENV_OUTPUT: &str = "GROVE_OUTPUT";

/// Output format for CLI commands
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Plain text report
    #[default]
    Text,
    /// Pretty-printed JSON
    Json,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GroveConfig {
    /// History rows kept per window. A fetch returning more marks the
    /// window truncated.
    pub history_limit: usize,
    pub output: OutputFormat,
}

impl Default for GroveConfig {
    fn default() -> Self {
        Self {
            history_limit: DEFAULT_HISTORY_LIMIT,
            output: OutputFormat::Text,
        }
    }
}

/// Keys accepted in the TOML file; all optional.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct FileConfig {
    history_limit: Option<usize>,
    output: Option<OutputFormat>,
}

impl GroveConfig {
    /// Load from an optional file and the process environment.
    pub fn load(path: Option<&Path>) -> CliResult<Self> {
        Self::load_with(path, |key| std::env::var(key).ok())
    }

    /// Load from an optional file and an environment lookup.
    pub fn load_with(
        path: Option<&Path>,
        env: impl Fn(&str) -> Option<String>,
    ) -> CliResult<Self> {
        let mut config = Self::default();

        if let Some(path) = path {
            let raw = std::fs::read_to_string(path).map_err(|source| CliError::Io {
                path: path.to_path_buf(),
                source,
            })?;
            let file: FileConfig = toml::from_str(&raw)?;
            if let Some(limit) = file.history_limit {
                config.history_limit = limit;
            }
            if let Some(output) = file.output {
                config.output = output;
            }
        }

        if let Some(raw) = env(ENV_HISTORY_LIMIT) {
            config.history_limit = raw.trim().parse().map_err(|_| {
                CliError::Config(format!("{} must be a positive integer, got {:?}", ENV_HISTORY_LIMIT, raw))
            })?;
        }
        if let Some(raw) = env(ENV_OUTPUT) {
            config.output = OutputFormat::from_str(raw.trim(), true).map_err(|_| {
                CliError::Config(format!("{} must be text or json, got {:?}", ENV_OUTPUT, raw))
            })?;
        }

        config.validate()?;
        Ok(config)
    }

    /// Apply `--output`.
    #[must_use]
    pub fn with_output(mut self, output: Option<OutputFormat>) -> Self {
        if let Some(output) = output {
            self.output = output;
        }
        self
    }

    /// Apply `--json`, shorthand for `--output json`.
    #[must_use]
    pub fn with_json(self, json: bool) -> Self {
        self.with_output(json.then_some(OutputFormat::Json))
    }

    fn validate(&self) -> CliResult<()> {
        if self.history_limit == 0 {
            return Err(CliError::Config(String::from(
                "history_limit must be at least 1",
            )));
        }
        Ok(())
    }
}
