//! # Errors
//!
//! The only failure the engine reports as an error is a rejected
//! declaration document. Every other insufficiency is an absent
//! observation (`None`), never an error.

use thiserror::Error;

/// Structured rejection of a declaration document.
///
/// Callers degrade the repository to unclassified; a rejection is a
/// routine outcome, not an exceptional one.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DeclarationError {
    /// The document is not valid YAML.
    #[error("invalid YAML syntax: {0}")]
    InvalidSyntax(String),

    /// The document holds no value at all.
    #[error("empty document")]
    EmptyDocument,

    /// No `grove` mapping at the top level.
    #[error("grove: expected a `grove` mapping at the top level")]
    MissingSection,

    /// A required field is absent.
    #[error("grove.{field}: required field is missing")]
    MissingField { field: &'static str },

    /// A field is present but violates its schema.
    #[error("grove.{field}: {reason}")]
    InvalidField { field: &'static str, reason: String },
}

impl DeclarationError {
    /// The offending field, when the rejection names one.
    #[must_use]
    pub fn field(&self) -> Option<&'static str> {
        match self {
            DeclarationError::MissingField { field }
            | DeclarationError::InvalidField { field, .. } => Some(*field),
            _ => None,
        }
    }

    pub(crate) fn invalid(field: &'static str, reason: impl Into<String>) -> Self {
        DeclarationError::InvalidField {
            field,
            reason: reason.into(),
        }
    }
}
