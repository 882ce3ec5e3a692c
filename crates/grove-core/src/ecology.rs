//! # Repository Ecology
//!
//! Classification of one repository from its raw declaration document.
//! A missing or invalid document is a routine outcome: the repository is
//! kept, marked unclassified, and carries the rejection for display.

use crate::declaration::{Declaration, parse_declaration};
use crate::error::DeclarationError;
use crate::season::{SeasonDerivation, derive_season};
use serde::{Deserialize, Serialize};

/// A repository with its declaration (if any) and derived season.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RepositoryEcology {
    pub full_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub declaration: Option<Declaration>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub season: Option<SeasonDerivation>,
    pub classified: bool,
    /// Why the declaration was rejected, when one was present but invalid.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rejection: Option<String>,
}

impl RepositoryEcology {
    /// A classified repository built from an already-validated declaration.
    #[must_use]
    pub fn classified(full_name: impl Into<String>, declaration: Declaration) -> Self {
        let season = derive_season(declaration.phase);
        Self {
            full_name: full_name.into(),
            declaration: Some(declaration),
            season,
            classified: true,
            rejection: None,
        }
    }

    /// An unclassified repository, optionally carrying why.
    #[must_use]
    pub fn unclassified(full_name: impl Into<String>, rejection: Option<&DeclarationError>) -> Self {
        Self {
            full_name: full_name.into(),
            declaration: None,
            season: None,
            classified: false,
            rejection: rejection.map(ToString::to_string),
        }
    }
}

/// Classify a repository from its raw declaration document, if it has one.
#[must_use]
pub fn classify_document(full_name: &str, raw_document: Option<&str>) -> RepositoryEcology {
    let Some(raw) = raw_document else {
        return RepositoryEcology::unclassified(full_name, None);
    };

    match parse_declaration(raw) {
        Ok(declaration) => RepositoryEcology::classified(full_name, declaration),
        Err(err) => RepositoryEcology::unclassified(full_name, Some(&err)),
    }
}

// =============================================================================
// TESTS
// =============================================================================
