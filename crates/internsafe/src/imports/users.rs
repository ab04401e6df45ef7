use serde::Deserialize;

use crate::auth::Role;
use crate::error::ServiceError;

/// One `email,password,full_name,role` line.
#[derive(Debug, Clone, Deserialize)]
pub(crate) struct UserRow {
    pub(crate) email: String,
    pub(crate) password: String,
    pub(crate) full_name: String,
    pub(crate) role: String,
}

impl UserRow {
    /// Imports may create any role except the allow-listed super admin.
    pub(crate) fn role(&self) -> Result<Role, ServiceError> {
        match self.role.parse::<Role>()? {
            Role::SuperAdmin => Err(ServiceError::forbidden(
                "super_admin accounts cannot be imported",
            )),
            role => Ok(role),
        }
    }
}
