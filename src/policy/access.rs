//! Admin authorization hierarchy.
//!
//! Three nested levels: any active admin, super admins, and the single
//! bootstrap super admin seeded at install time. Each administrative
//! capability maps to a minimum level in one table, and every mutating
//! operation calls [`authorize`] before touching storage. A denial carries no
//! information about which level would have sufficed.

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    Admin,
    SuperAdmin,
}

impl Role {
    #[must_use]
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "admin" => Some(Self::Admin),
            "super_admin" => Some(Self::SuperAdmin),
            _ => None,
        }
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Admin => "admin",
            Self::SuperAdmin => "super_admin",
        }
    }
}

/// The authenticated admin as carried in the session.
///
/// `is_bootstrap` is a persisted attribute set when the install-time admin is
/// seeded, rather than a comparison against a magic row id.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AdminIdentity {
    pub id: i32,
    pub role: Role,
    pub is_bootstrap: bool,
}

impl AdminIdentity {
    #[must_use]
    pub const fn level(&self) -> AccessLevel {
        if self.is_bootstrap {
            AccessLevel::Bootstrap
        } else {
            match self.role {
                Role::SuperAdmin => AccessLevel::SuperAdmin,
                Role::Admin => AccessLevel::Admin,
            }
        }
    }
}

/// Ordered so that a higher level satisfies every lower requirement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum AccessLevel {
    Admin,
    SuperAdmin,
    Bootstrap,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Capability {
    RegisterVoter,
    ManageAdmins,
    SetPartyVisibility,
    ManageElectionWindow,
    ManageRegistrationWindow,
    ManageParties,
    ResetSystem,
    ViewAuditLog,
}

/// The policy table: minimum level per capability.
#[must_use]
pub const fn required_level(capability: Capability) -> AccessLevel {
    match capability {
        Capability::RegisterVoter => AccessLevel::Admin,
        Capability::ManageAdmins | Capability::SetPartyVisibility => AccessLevel::SuperAdmin,
        Capability::ManageElectionWindow
        | Capability::ManageRegistrationWindow
        | Capability::ManageParties
        | Capability::ResetSystem
        | Capability::ViewAuditLog => AccessLevel::Bootstrap,
    }
}

/// Denials deliberately expose nothing beyond "insufficient privilege".
#[derive(Debug, Error, PartialEq, Eq)]
#[error("insufficient privilege")]
pub struct AccessDenied;

pub fn authorize(identity: &AdminIdentity, capability: Capability) -> Result<(), AccessDenied> {
    if identity.level() >= required_level(capability) {
        Ok(())
    } else {
        Err(AccessDenied)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ADMIN: AdminIdentity = AdminIdentity {
        id: 7,
        role: Role::Admin,
        is_bootstrap: false,
    };

    const SUPER: AdminIdentity = AdminIdentity {
        id: 3,
        role: Role::SuperAdmin,
        is_bootstrap: false,
    };

    const BOOTSTRAP: AdminIdentity = AdminIdentity {
        id: 1,
        role: Role::SuperAdmin,
        is_bootstrap: true,
    };

    #[test]
    fn test_admin_can_register_voters_only() {
        assert!(authorize(&ADMIN, Capability::RegisterVoter).is_ok());
        assert_eq!(
            authorize(&ADMIN, Capability::ManageParties),
            Err(AccessDenied)
        );
        assert_eq!(
            authorize(&ADMIN, Capability::ManageAdmins),
            Err(AccessDenied)
        );
    }

    #[test]
    fn test_super_admin_cannot_touch_windows() {
        assert!(authorize(&SUPER, Capability::ManageAdmins).is_ok());
        assert!(authorize(&SUPER, Capability::SetPartyVisibility).is_ok());
        assert_eq!(
            authorize(&SUPER, Capability::ManageElectionWindow),
            Err(AccessDenied)
        );
        assert_eq!(
            authorize(&SUPER, Capability::ResetSystem),
            Err(AccessDenied)
        );
    }

    #[test]
    fn test_bootstrap_satisfies_everything() {
        assert!(authorize(&BOOTSTRAP, Capability::RegisterVoter).is_ok());
        assert!(authorize(&BOOTSTRAP, Capability::ManageElectionWindow).is_ok());
        assert!(authorize(&BOOTSTRAP, Capability::ViewAuditLog).is_ok());
    }

    #[test]
    fn test_role_parse_round_trip() {
        assert_eq!(Role::parse("admin"), Some(Role::Admin));
        assert_eq!(Role::parse("super_admin"), Some(Role::SuperAdmin));
        assert_eq!(Role::parse("root"), None);
        assert_eq!(Role::SuperAdmin.as_str(), "super_admin");
    }
}
