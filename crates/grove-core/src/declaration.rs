//! # Declaration Parser
//!
//! Validates a raw `.grove.yaml` document into a typed `Declaration`.
//!
//! The document carries a top-level `grove` mapping. Known fields are
//! parsed strictly against their closed sets; unknown fields (at either
//! level) are discarded. Failure is all-or-nothing: either every known
//! field validates, or the whole document is rejected with the first
//! offending field named.
//!
//! ```yaml
//! grove:
//!   intent: Shared storage primitives
//!   horizon: perennial
//!   role: library
//!   phase: consolidating
//!   steward: alice
//!   review_interval_days: 90
//! ```

use crate::error::DeclarationError;
use crate::types::{Horizon, Phase, Role};
use serde::{Deserialize, Serialize};
use serde_yaml::{Mapping, Value};

/// Key of the top-level section holding the declaration.
pub const SECTION_KEY: &str = "grove";

/// Legacy spelling of `review_interval_days`, still accepted.
pub const LEGACY_INTERVAL_KEY: &str = "consolidation_interval_days";

// =============================================================================
// DECLARATION
// =============================================================================

/// A validated, immutable declaration.
///
/// An absent optional field means "undeclared" and is never defaulted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Declaration {
    pub intent: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub horizon: Option<Horizon>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<Role>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phase: Option<Phase>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub steward: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub review_interval_days: Option<u32>,
}

impl Declaration {
    /// A declaration with only the required intent.
    #[must_use]
    pub fn with_intent(intent: impl Into<String>) -> Self {
        Self {
            intent: intent.into(),
            horizon: None,
            role: None,
            phase: None,
            steward: None,
            review_interval_days: None,
        }
    }

    /// How many of the five optional fields are undeclared.
    #[must_use]
    pub fn undeclared_count(&self) -> usize {
        [
            self.horizon.is_none(),
            self.role.is_none(),
            self.phase.is_none(),
            self.steward.is_none(),
            self.review_interval_days.is_none(),
        ]
        .into_iter()
        .filter(|undeclared| *undeclared)
        .count()
    }
}

// =============================================================================
// PARSER
// =============================================================================

/// Parse and validate a raw declaration document.
pub fn parse_declaration(raw: &str) -> Result<Declaration, DeclarationError> {
    if raw.trim().is_empty() {
        return Err(DeclarationError::EmptyDocument);
    }

    let document: Value = serde_yaml::from_str(raw)
        .map_err(|e| DeclarationError::InvalidSyntax(e.to_string()))?;

    if document.is_null() {
        return Err(DeclarationError::EmptyDocument);
    }

    let section = match document.get(SECTION_KEY) {
        Some(Value::Mapping(section)) => section,
        _ => return Err(DeclarationError::MissingSection),
    };

    Ok(Declaration {
        intent: intent_field(section)?,
        horizon: closed_field(section, "horizon", Horizon::parse, Horizon::expected)?,
        role: closed_field(section, "role", Role::parse, Role::expected)?,
        phase: closed_field(section, "phase", Phase::parse, Phase::expected)?,
        steward: steward_field(section)?,
        review_interval_days: interval_field(section)?,
    })
}

fn intent_field(section: &Mapping) -> Result<String, DeclarationError> {
    match section.get("intent") {
        None => Err(DeclarationError::MissingField { field: "intent" }),
        Some(Value::String(intent)) if !intent.is_empty() => Ok(intent.clone()),
        Some(Value::String(_)) => Err(DeclarationError::invalid(
            "intent",
            "must be a non-empty string",
        )),
        Some(other) => Err(DeclarationError::invalid(
            "intent",
            format!("expected a string, found {}", kind_of(other)),
        )),
    }
}

fn closed_field<T>(
    section: &Mapping,
    field: &'static str,
    parse: fn(&str) -> Option<T>,
    expected: fn() -> String,
) -> Result<Option<T>, DeclarationError> {
    match section.get(field) {
        None => Ok(None),
        Some(Value::String(raw)) => parse(raw).map(Some).ok_or_else(|| {
            DeclarationError::invalid(
                field,
                format!("expected one of {}, found \"{}\"", expected(), raw),
            )
        }),
        Some(other) => Err(DeclarationError::invalid(
            field,
            format!("expected one of {}, found {}", expected(), kind_of(other)),
        )),
    }
}

fn steward_field(section: &Mapping) -> Result<Option<String>, DeclarationError> {
    match section.get("steward") {
        None => Ok(None),
        Some(Value::String(steward)) if !steward.is_empty() => Ok(Some(steward.clone())),
        Some(Value::String(_)) => Err(DeclarationError::invalid(
            "steward",
            "must be a non-empty string",
        )),
        Some(other) => Err(DeclarationError::invalid(
            "steward",
            format!("expected a string, found {}", kind_of(other)),
        )),
    }
}

fn interval_field(section: &Mapping) -> Result<Option<u32>, DeclarationError> {
    let (field, value) = match (section.get("review_interval_days"), section.get(LEGACY_INTERVAL_KEY)) {
        (Some(value), _) => ("review_interval_days", value),
        (None, Some(value)) => (LEGACY_INTERVAL_KEY, value),
        (None, None) => return Ok(None),
    };

    let days = match value {
        Value::Number(n) => n.as_u64(),
        _ => None,
    };

    match days {
        Some(days) if days > 0 => u32::try_from(days)
            .map(Some)
            .map_err(|_| DeclarationError::invalid(field, "is out of range")),
        _ => Err(DeclarationError::invalid(
            field,
            format!("must be a positive integer, found {}", describe(value)),
        )),
    }
}

fn kind_of(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Sequence(_) => "a sequence",
        Value::Mapping(_) => "a mapping",
        Value::Tagged(_) => "a tagged value",
    }
}

fn describe(value: &Value) -> String {
    match value {
        Value::Number(n) => n.to_string(),
        Value::String(s) => format!("\"{}\"", s),
        other => kind_of(other).to_string(),
    }
}

// =============================================================================
// TESTS
// =============================================================================
