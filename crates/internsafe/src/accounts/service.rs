use std::sync::Arc;

use chrono::Utc;
use tracing::{info, warn};

use super::domain::{
    normalize_email, require_text, AccountUpdate, AuthSession, CompanyRegistration,
    CompanyRegistrationReceipt, Credentials, MeView, PasswordChange, StudentRegistration, User,
};
use super::repository::UserRepository;
use crate::auth::password::{
    hash_password, validate_password, verify_password, verify_unknown_account,
};
use crate::auth::{Portal, Principal, Role, TokenIssuer};
use crate::companies::{CompanyProfile, CompanyProfileRepository};
use crate::config::AuthConfig;
use crate::error::{AuthFailure, ServiceError};
use crate::ids::UserId;
use crate::store::Database;

/// Registration, login and self-service account operations.
pub struct AccountService {
    db: Arc<Database>,
    auth: Arc<AuthConfig>,
    tokens: TokenIssuer,
}

impl AccountService {
    pub fn new(db: Arc<Database>, auth: Arc<AuthConfig>) -> Self {
        let tokens = TokenIssuer::new(&auth);
        Self { db, auth, tokens }
    }

    /// Students are active immediately and receive a token.
    pub fn register_student(
        &self,
        registration: StudentRegistration,
    ) -> Result<AuthSession, ServiceError> {
        let email = self.admissible_email(&registration.email)?;
        validate_password(&registration.password)?;
        let full_name = require_text("full_name", &registration.full_name)?;

        let user = User::new(
            email,
            hash_password(&registration.password)?,
            full_name,
            Role::Student,
        );

        self.db.write(|tx| {
            let users = UserRepository::new(tx);
            if users.email_in_use(&user.email, None)? {
                return Err(ServiceError::conflict("email already registered"));
            }
            users.insert(&user)?;
            Ok(())
        })?;

        info!(user = %user.id, "student registered");
        self.session_for(user)
    }

    /// Companies start inactive and unverified; no token is issued until an
    /// admin approves the profile created alongside the account.
    pub fn register_company(
        &self,
        registration: CompanyRegistration,
    ) -> Result<CompanyRegistrationReceipt, ServiceError> {
        let email = self.admissible_email(&registration.email)?;
        validate_password(&registration.password)?;
        let full_name = require_text("full_name", &registration.full_name)?;
        let company_name = require_text("company_name", &registration.company_name)?;

        let mut user = User::new(
            email,
            hash_password(&registration.password)?,
            full_name,
            Role::Company,
        );
        user.is_active = false;

        let mut profile = CompanyProfile::new(user.id.clone(), company_name);
        profile.industry = registration.industry;
        profile.website = registration.website;
        profile.phone = registration.phone;
        profile.city = registration.city;

        self.db.write(|tx| {
            let users = UserRepository::new(tx);
            if users.email_in_use(&user.email, None)? {
                return Err(ServiceError::conflict("email already registered"));
            }
            users.insert(&user)?;
            CompanyProfileRepository::new(tx).insert(&profile)?;
            Ok(())
        })?;

        info!(user = %user.id, company = %profile.company_name, "company registered, awaiting approval");
        Ok(CompanyRegistrationReceipt {
            user,
            profile,
            message: "registration received; an administrator must approve the company before login",
        })
    }

    pub fn login(
        &self,
        portal: Portal,
        credentials: Credentials,
    ) -> Result<AuthSession, ServiceError> {
        let email =
            normalize_email(&credentials.email).map_err(|_| AuthFailure::InvalidCredentials)?;

        let existing = self
            .db
            .read(|conn| Ok::<_, ServiceError>(UserRepository::new(conn).find_by_email(&email)?))?;

        let user = match existing {
            Some(user) => user,
            None if portal == Portal::Admin && self.auth.is_super_admin_email(&email) => {
                self.bootstrap_super_admin(email, &credentials.password)?
            }
            None => {
                verify_unknown_account(&credentials.password);
                return Err(AuthFailure::InvalidCredentials.into());
            }
        };

        if !verify_password(&credentials.password, &user.password_hash) {
            return Err(AuthFailure::InvalidCredentials.into());
        }

        if user.login_portal != portal || !portal.admits(user.role) {
            warn!(user = %user.id, portal = portal.label(), "login attempted through the wrong portal");
            return Err(ServiceError::forbidden(format!(
                "access denied; use the {} portal",
                user.login_portal.label()
            )));
        }

        if !user.is_active {
            return Err(match portal {
                Portal::Company => AuthFailure::PendingApproval,
                Portal::Student | Portal::Admin => AuthFailure::AccountDisabled,
            }
            .into());
        }

        info!(user = %user.id, portal = portal.label(), "login succeeded");
        self.session_for(user)
    }

    /// Resolve a bearer token to the caller it was issued for.
    pub fn authenticate(&self, token: &str) -> Result<Principal, ServiceError> {
        let claims = self.tokens.verify(token)?;
        let user_id = UserId::from(claims.sub);
        let user = self
            .db
            .read(|conn| Ok::<_, ServiceError>(UserRepository::new(conn).fetch(&user_id)?))?
            .ok_or(AuthFailure::InvalidToken)?;

        if user.role != claims.role {
            return Err(AuthFailure::InvalidToken.into());
        }
        if !user.is_active {
            return Err(AuthFailure::AccountDisabled.into());
        }

        Ok(Principal::new(user.id, user.email, user.role))
    }

    pub fn me(&self, principal: &Principal) -> Result<MeView, ServiceError> {
        self.db.read(|conn| {
            let user = UserRepository::new(conn)
                .fetch(&principal.user_id)?
                .ok_or_else(|| ServiceError::not_found("user", &principal.user_id))?;
            let company_profile = if user.role == Role::Company {
                CompanyProfileRepository::new(conn).fetch_by_user(&user.id)?
            } else {
                None
            };
            Ok(MeView {
                user,
                company_profile,
            })
        })
    }

    pub fn update_me(
        &self,
        principal: &Principal,
        update: AccountUpdate,
    ) -> Result<User, ServiceError> {
        let full_name = update
            .full_name
            .as_deref()
            .map(|name| require_text("full_name", name))
            .transpose()?;
        let email = update.email.as_deref().map(normalize_email).transpose()?;

        self.db.write(|tx| {
            let users = UserRepository::new(tx);
            let mut user = users
                .fetch(&principal.user_id)?
                .ok_or_else(|| ServiceError::not_found("user", &principal.user_id))?;

            if let Some(email) = email {
                if email != user.email {
                    if self.auth.is_super_admin_email(&email) && !user.is_super_admin() {
                        return Err(ServiceError::forbidden("email address is reserved"));
                    }
                    if users.email_in_use(&email, Some(&user.id))? {
                        return Err(ServiceError::conflict("email already in use"));
                    }
                    user.email = email;
                }
            }
            if let Some(full_name) = full_name {
                user.full_name = full_name;
            }

            user.updated_at = Utc::now();
            users.update(&user)?;
            Ok(user)
        })
    }

    pub fn change_password(
        &self,
        principal: &Principal,
        change: PasswordChange,
    ) -> Result<(), ServiceError> {
        validate_password(&change.new_password)?;
        let new_hash = hash_password(&change.new_password)?;

        self.db.write(|tx| {
            let users = UserRepository::new(tx);
            let mut user = users
                .fetch(&principal.user_id)?
                .ok_or_else(|| ServiceError::not_found("user", &principal.user_id))?;

            if !verify_password(&change.current_password, &user.password_hash) {
                return Err(ServiceError::validation("current password is incorrect"));
            }

            user.password_hash = new_hash;
            user.updated_at = Utc::now();
            users.update(&user)?;
            Ok(())
        })?;

        info!(user = %principal.user_id, "password changed");
        Ok(())
    }

    fn admissible_email(&self, raw: &str) -> Result<String, ServiceError> {
        let email = normalize_email(raw)?;
        if self.auth.is_super_admin_email(&email) {
            return Err(ServiceError::forbidden("email address is reserved"));
        }
        Ok(email)
    }

    fn bootstrap_super_admin(&self, email: String, password: &str) -> Result<User, ServiceError> {
        validate_password(password).map_err(|_| AuthFailure::InvalidCredentials)?;

        let mut user = User::new(
            email,
            hash_password(password)?,
            "Super Admin".to_string(),
            Role::SuperAdmin,
        );
        user.is_verified = true;

        let user = self.db.write(|tx| {
            let users = UserRepository::new(tx);
            if let Some(existing) = users.find_by_email(&user.email)? {
                return Ok(existing);
            }
            users.insert(&user)?;
            Ok::<_, ServiceError>(user)
        })?;

        info!(user = %user.id, "super admin account bootstrapped from allow-list");
        Ok(user)
    }

    fn session_for(&self, user: User) -> Result<AuthSession, ServiceError> {
        let token = self.tokens.issue(&user.id, &user.email, user.role)?;
        Ok(AuthSession { token, user })
    }
}
