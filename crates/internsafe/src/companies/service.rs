use std::sync::Arc;

use chrono::Utc;
use rusqlite::Connection;
use serde::Serialize;
use tracing::info;

use super::domain::{CompanyListing, CompanyProfile, CompanyProfileUpdate, VerificationStatus};
use super::repository::CompanyProfileRepository;
use crate::accounts::{User, UserRepository};
use crate::auth::{Capability, Principal, Role};
use crate::error::ServiceError;
use crate::ids::UserId;
use crate::store::Database;

/// Account and profile state after a verification decision.
#[derive(Debug, Clone, Serialize)]
pub struct CompanyVerification {
    pub user: User,
    pub profile: CompanyProfile,
}

/// Company self-service profile plus admin verification actions.
pub struct CompanyService {
    db: Arc<Database>,
}

impl CompanyService {
    pub fn new(db: Arc<Database>) -> Self {
        Self { db }
    }

    pub fn own_profile(&self, principal: &Principal) -> Result<CompanyProfile, ServiceError> {
        principal.require(Capability::Company)?;
        self.db.read(|conn| {
            CompanyProfileRepository::new(conn)
                .fetch_by_user(&principal.user_id)?
                .ok_or_else(|| ServiceError::not_found("company profile", &principal.user_id))
        })
    }

    pub fn update_own_profile(
        &self,
        principal: &Principal,
        update: CompanyProfileUpdate,
    ) -> Result<CompanyProfile, ServiceError> {
        principal.require(Capability::Company)?;
        if let Some(name) = &update.company_name {
            if name.trim().is_empty() {
                return Err(ServiceError::validation("company_name must not be empty"));
            }
        }

        self.db.write(|tx| {
            let repo = CompanyProfileRepository::new(tx);
            let mut profile = repo
                .fetch_by_user(&principal.user_id)?
                .ok_or_else(|| ServiceError::not_found("company profile", &principal.user_id))?;
            profile.apply(update);
            repo.update(&profile)?;
            Ok(profile)
        })
    }

    pub fn list(
        &self,
        principal: &Principal,
        status: Option<VerificationStatus>,
    ) -> Result<Vec<CompanyListing>, ServiceError> {
        principal.require(Capability::Staff)?;
        self.db
            .read(|conn| Ok(CompanyProfileRepository::new(conn).list(status)?))
    }

    /// Verify the company and unlock its account. Safe to repeat.
    pub fn approve(
        &self,
        principal: &Principal,
        company_user_id: &UserId,
        notes: Option<String>,
    ) -> Result<CompanyVerification, ServiceError> {
        principal.require(Capability::Admin)?;
        let verification = self.db.write(|tx| {
            decide(tx, principal, company_user_id, VerificationStatus::Verified, |user, profile| {
                user.is_active = true;
                user.is_verified = true;
                profile.verified_by = Some(principal.user_id.clone());
                profile.verified_at = Some(Utc::now());
                profile.rejection_reason = None;
                if notes.is_some() {
                    profile.verification_notes = notes;
                }
            })
        })?;

        info!(company = %company_user_id, admin = %principal.user_id, "company approved");
        Ok(verification)
    }

    pub fn mark_under_review(
        &self,
        principal: &Principal,
        company_user_id: &UserId,
        notes: Option<String>,
    ) -> Result<CompanyVerification, ServiceError> {
        principal.require(Capability::Admin)?;
        let verification = self.db.write(|tx| {
            decide(tx, principal, company_user_id, VerificationStatus::UnderReview, |_, profile| {
                if notes.is_some() {
                    profile.verification_notes = notes;
                }
            })
        })?;

        info!(company = %company_user_id, "company moved under review");
        Ok(verification)
    }

    /// Reject verification and lock the account out of the company portal.
    pub fn reject(
        &self,
        principal: &Principal,
        company_user_id: &UserId,
        reason: String,
    ) -> Result<CompanyVerification, ServiceError> {
        principal.require(Capability::Admin)?;
        let reason = reason.trim().to_string();
        if reason.is_empty() {
            return Err(ServiceError::validation("a rejection reason is required"));
        }

        let verification = self.db.write(|tx| {
            decide(tx, principal, company_user_id, VerificationStatus::Rejected, |user, profile| {
                user.is_active = false;
                user.is_verified = false;
                profile.verified_at = None;
                profile.verified_by = None;
                profile.rejection_reason = Some(reason);
            })
        })?;

        info!(company = %company_user_id, "company rejected");
        Ok(verification)
    }
}

fn decide<F>(
    conn: &Connection,
    principal: &Principal,
    company_user_id: &UserId,
    next: VerificationStatus,
    mutate: F,
) -> Result<CompanyVerification, ServiceError>
where
    F: FnOnce(&mut User, &mut CompanyProfile),
{
    let users = UserRepository::new(conn);
    let profiles = CompanyProfileRepository::new(conn);

    let mut user = users
        .fetch(company_user_id)?
        .filter(|user| user.role == Role::Company)
        .ok_or_else(|| ServiceError::not_found("company", company_user_id))?;
    let mut profile = profiles
        .fetch_by_user(company_user_id)?
        .ok_or_else(|| ServiceError::not_found("company profile", company_user_id))?;

    let current = profile.verification_status;
    if !current.can_transition_to(next) {
        return Err(ServiceError::InvalidTransition {
            entity: "company verification",
            from: current.label(),
            to: next.label(),
        });
    }

    tracing::debug!(admin = %principal.user_id, from = current.label(), to = next.label(), "verification decision");
    let now = Utc::now();
    profile.verification_status = next;
    profile.updated_at = now;
    mutate(&mut user, &mut profile);
    user.updated_at = now;

    users.update(&user)?;
    profiles.update(&profile)?;
    Ok(CompanyVerification { user, profile })
}
