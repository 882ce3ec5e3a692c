//! # Stratification
//!
//! Role to role class, and (horizon, role class) to stratum. Strata are
//! used only by ecosystem trigger evaluation.

use crate::ecology::RepositoryEcology;
use crate::types::{Horizon, Role, RoleClass, Stratum};
use serde::{Deserialize, Serialize};

#[must_use]
pub fn derive_role_class(role: Role) -> RoleClass {
    match role {
        Role::Infrastructure | Role::Civilizational => RoleClass::Foundational,
        Role::Stewardship | Role::Library => RoleClass::System,
        Role::Application | Role::Experiment | Role::Documentation => RoleClass::Domain,
    }
}

/// Stratum for a horizon and role class.
///
/// Seasonal horizons have no stratum.
#[must_use]
pub fn classify_stratum(horizon: Horizon, role_class: RoleClass) -> Option<Stratum> {
    match (horizon, role_class) {
        (Horizon::Ephemeral, _) => Some(Stratum::EphemeralField),
        (Horizon::Seasonal, _) => None,
        (Horizon::Perennial | Horizon::Generational, RoleClass::Foundational | RoleClass::System) => {
            Some(Stratum::StructuralCore)
        }
        (Horizon::Perennial | Horizon::Generational, RoleClass::Domain) => {
            Some(Stratum::LongArcDomain)
        }
    }
}

/// Role class and stratum of a classified repository.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Classification {
    pub role_class: RoleClass,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stratum: Option<Stratum>,
}

/// Classify a repository.
///
/// Returns `None` when horizon or role is undeclared: such repositories
/// are excluded from ecosystem evaluation entirely.
#[must_use]
pub fn classify_repository(repo: &RepositoryEcology) -> Option<Classification> {
    let declaration = repo.declaration.as_ref()?;
    let horizon = declaration.horizon?;
    let role_class = derive_role_class(declaration.role?);

    Some(Classification {
        role_class,
        stratum: classify_stratum(horizon, role_class),
    })
}

// =============================================================================
// TESTS
// =============================================================================
