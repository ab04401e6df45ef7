use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::auth::{IssuedToken, Portal, Role};
use crate::companies::CompanyProfile;
use crate::error::ServiceError;
use crate::ids::UserId;

/// Account row shared by every role.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct User {
    pub id: UserId,
    pub email: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub full_name: String,
    pub role: Role,
    pub login_portal: Portal,
    pub is_active: bool,
    pub is_verified: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl User {
    pub fn new(email: String, password_hash: String, full_name: String, role: Role) -> Self {
        let now = Utc::now();
        Self {
            id: UserId::generate(),
            email,
            password_hash,
            full_name,
            role,
            login_portal: role.home_portal(),
            is_active: true,
            is_verified: false,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn is_super_admin(&self) -> bool {
        self.role == Role::SuperAdmin
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct StudentRegistration {
    pub email: String,
    pub password: String,
    pub full_name: String,
}

/// Company sign-up; the account and its profile are created together.
#[derive(Debug, Clone, Deserialize)]
pub struct CompanyRegistration {
    pub email: String,
    pub password: String,
    pub full_name: String,
    pub company_name: String,
    #[serde(default)]
    pub industry: Option<String>,
    #[serde(default)]
    pub website: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub city: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Credentials {
    pub email: String,
    pub password: String,
}

/// Fields a user may change on their own account.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AccountUpdate {
    #[serde(default)]
    pub full_name: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PasswordChange {
    pub current_password: String,
    pub new_password: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct AuthSession {
    #[serde(flatten)]
    pub token: IssuedToken,
    pub user: User,
}

#[derive(Debug, Clone, Serialize)]
pub struct CompanyRegistrationReceipt {
    pub user: User,
    pub profile: CompanyProfile,
    pub message: &'static str,
}

#[derive(Debug, Clone, Serialize)]
pub struct MeView {
    #[serde(flatten)]
    pub user: User,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub company_profile: Option<CompanyProfile>,
}

/// Trim and lowercase an address, rejecting anything without a local part and domain.
pub fn normalize_email(raw: &str) -> Result<String, ServiceError> {
    let email = raw.trim().to_ascii_lowercase();
    let valid = match email.split_once('@') {
        Some((local, domain)) => {
            !local.is_empty()
                && !domain.is_empty()
                && !domain.contains('@')
                && !email.chars().any(char::is_whitespace)
        }
        None => false,
    };

    if valid {
        Ok(email)
    } else {
        Err(ServiceError::validation(format!(
            "'{}' is not a valid email address",
            raw.trim()
        )))
    }
}

pub(crate) fn require_text(field: &str, value: &str) -> Result<String, ServiceError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        Err(ServiceError::validation(format!("{field} must not be empty")))
    } else {
        Ok(trimmed.to_string())
    }
}
