use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{ServiceError, UnknownLabel};
use crate::ids::UserId;
use crate::store::text_column;

/// Account role, fixed at creation for self-registered students and companies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    Student,
    Company,
    Admin,
    Moderator,
    SuperAdmin,
}

impl Role {
    pub const ALL: [Role; 5] = [
        Role::Student,
        Role::Company,
        Role::Admin,
        Role::Moderator,
        Role::SuperAdmin,
    ];

    pub const fn label(self) -> &'static str {
        match self {
            Role::Student => "student",
            Role::Company => "company",
            Role::Admin => "admin",
            Role::Moderator => "moderator",
            Role::SuperAdmin => "super_admin",
        }
    }

    pub const fn is_admin(self) -> bool {
        matches!(self, Role::Admin | Role::SuperAdmin)
    }

    pub const fn is_staff(self) -> bool {
        matches!(self, Role::Admin | Role::SuperAdmin | Role::Moderator)
    }

    /// Portal a newly created account of this role signs in through.
    pub const fn home_portal(self) -> Portal {
        match self {
            Role::Student => Portal::Student,
            Role::Company => Portal::Company,
            Role::Admin | Role::Moderator | Role::SuperAdmin => Portal::Admin,
        }
    }
}

impl FromStr for Role {
    type Err = UnknownLabel;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let normalized = value.trim().to_ascii_lowercase();
        Role::ALL
            .into_iter()
            .find(|role| role.label() == normalized)
            .ok_or_else(|| UnknownLabel::new("role", value))
    }
}

/// Login surface that scopes which credentials are accepted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Portal {
    Student,
    Company,
    Admin,
}

impl Portal {
    pub const fn label(self) -> &'static str {
        match self {
            Portal::Student => "student",
            Portal::Company => "company",
            Portal::Admin => "admin",
        }
    }

    pub const fn admits(self, role: Role) -> bool {
        match self {
            Portal::Student => matches!(role, Role::Student),
            Portal::Company => matches!(role, Role::Company),
            Portal::Admin => role.is_staff(),
        }
    }
}

impl FromStr for Portal {
    type Err = UnknownLabel;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "student" => Ok(Portal::Student),
            "company" => Ok(Portal::Company),
            "admin" => Ok(Portal::Admin),
            _ => Err(UnknownLabel::new("portal", value)),
        }
    }
}

text_column!(Role, Portal);

/// Role sets an operation may declare as its requirement.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Capability {
    Student,
    Company,
    /// admin or super_admin
    Admin,
    /// admin, super_admin or moderator
    Staff,
}

impl Capability {
    pub const fn admits(self, role: Role) -> bool {
        match self {
            Capability::Student => matches!(role, Role::Student),
            Capability::Company => matches!(role, Role::Company),
            Capability::Admin => role.is_admin(),
            Capability::Staff => role.is_staff(),
        }
    }

    const fn describe(self) -> &'static str {
        match self {
            Capability::Student => "only students can perform this action",
            Capability::Company => "only companies can perform this action",
            Capability::Admin => "admin access required",
            Capability::Staff => "staff access required",
        }
    }
}

/// Authenticated caller of an operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Principal {
    pub user_id: UserId,
    pub email: String,
    pub role: Role,
}

impl Principal {
    pub fn new(user_id: UserId, email: impl Into<String>, role: Role) -> Self {
        Self {
            user_id,
            email: email.into(),
            role,
        }
    }

    /// Trusted local operator used by command-line maintenance tasks.
    pub fn operator() -> Self {
        Self::new(UserId::from("operator"), "operator@localhost", Role::SuperAdmin)
    }

    pub fn require(&self, capability: Capability) -> Result<(), ServiceError> {
        if capability.admits(self.role) {
            Ok(())
        } else {
            Err(ServiceError::forbidden(capability.describe()))
        }
    }

    pub fn is_admin(&self) -> bool {
        self.role.is_admin()
    }

    pub fn owns(&self, owner: &UserId) -> bool {
        &self.user_id == owner
    }

    /// Resource scoped to a creator: the creator or an admin may act on it.
    pub fn require_owner_or_admin(&self, owner: &UserId) -> Result<(), ServiceError> {
        if self.owns(owner) || self.is_admin() {
            Ok(())
        } else {
            Err(ServiceError::forbidden("not authorized for this resource"))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;

    fn principal(role: Role) -> Principal {
        Principal::new(UserId::from("user-1"), "user@example.com", role)
    }

    #[test]
    fn capabilities_admit_expected_roles() {
        assert!(Capability::Admin.admits(Role::SuperAdmin));
        assert!(!Capability::Admin.admits(Role::Moderator));
        assert!(Capability::Staff.admits(Role::Moderator));
        assert!(!Capability::Staff.admits(Role::Company));
        assert!(!Capability::Student.admits(Role::Company));
    }

    #[test]
    fn require_reports_forbidden() {
        let err = principal(Role::Student)
            .require(Capability::Company)
            .expect_err("student is not a company");
        assert_eq!(err.kind(), ErrorKind::Forbidden);
    }

    #[test]
    fn owner_or_admin_check() {
        let owner = UserId::from("user-1");
        let stranger = UserId::from("user-2");
        assert!(principal(Role::Company).require_owner_or_admin(&owner).is_ok());
        assert!(principal(Role::Company)
            .require_owner_or_admin(&stranger)
            .is_err());
        assert!(principal(Role::Admin)
            .require_owner_or_admin(&stranger)
            .is_ok());
        assert!(principal(Role::Moderator)
            .require_owner_or_admin(&stranger)
            .is_err());
    }

    #[test]
    fn portals_admit_their_roles() {
        assert!(Portal::Admin.admits(Role::Moderator));
        assert!(!Portal::Admin.admits(Role::Student));
        assert!(Portal::Company.admits(Role::Company));
        assert_eq!(Role::Moderator.home_portal(), Portal::Admin);
    }

    #[test]
    fn labels_parse_back() {
        for role in Role::ALL {
            assert_eq!(role.label().parse::<Role>(), Ok(role));
        }
        assert_eq!(" Company ".parse::<Role>(), Ok(Role::Company));
        assert!("owner".parse::<Role>().is_err());
        assert_eq!("ADMIN".parse::<Portal>(), Ok(Portal::Admin));
    }
}
