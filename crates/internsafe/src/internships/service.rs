use std::sync::Arc;

use chrono::Utc;
use rusqlite::Connection;
use serde::Deserialize;
use tracing::info;

use super::domain::{Internship, InternshipDraft, InternshipFilter, InternshipStatus, InternshipUpdate};
use super::repository::InternshipRepository;
use crate::auth::{Capability, Principal};
use crate::error::ServiceError;
use crate::ids::InternshipId;
use crate::store::Database;

/// Admin moderation verbs; each maps to one target status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ModerationAction {
    Approve,
    Reject,
    Activate,
    Deactivate,
}

impl ModerationAction {
    pub const fn target(self) -> InternshipStatus {
        match self {
            ModerationAction::Approve => InternshipStatus::Approved,
            ModerationAction::Reject => InternshipStatus::Rejected,
            ModerationAction::Activate => InternshipStatus::Active,
            ModerationAction::Deactivate => InternshipStatus::Paused,
        }
    }
}

/// Posting lifecycle: company authoring, public browsing and admin moderation.
pub struct InternshipService {
    db: Arc<Database>,
}

impl InternshipService {
    pub fn new(db: Arc<Database>) -> Self {
        Self { db }
    }

    pub fn create(
        &self,
        principal: &Principal,
        draft: InternshipDraft,
    ) -> Result<Internship, ServiceError> {
        principal.require(Capability::Company)?;
        let internship = Internship::from_draft(principal.user_id.clone(), draft)?;

        self.db.write(|tx| {
            InternshipRepository::new(tx).insert(&internship)?;
            Ok::<_, ServiceError>(())
        })?;

        info!(internship = %internship.id, company = %principal.user_id, "internship submitted for review");
        Ok(internship)
    }

    pub fn update(
        &self,
        principal: &Principal,
        id: &InternshipId,
        update: InternshipUpdate,
    ) -> Result<Internship, ServiceError> {
        let updated = self.db.write(|tx| {
            let repo = InternshipRepository::new(tx);
            let current = repo
                .fetch(id)?
                .ok_or_else(|| ServiceError::not_found("internship", id))?;
            principal.require_owner_or_admin(&current.company_id)?;

            let mut next = current.clone();
            next.apply(&update)?;
            if let Some(status) = update.status {
                if current.status.requires_admin(status) && !principal.is_admin() {
                    return Err(ServiceError::forbidden(
                        "only admins can approve or reject pending internships",
                    ));
                }
                next.move_to(status)?;
                if status == InternshipStatus::Approved && current.status == InternshipStatus::Pending {
                    next.approved_at = Some(Utc::now());
                    next.approved_by = Some(principal.user_id.clone());
                }
            }
            next.updated_at = Utc::now();
            repo.update(&next)?;
            Ok(next)
        })?;

        info!(internship = %id, status = updated.status.label(), "internship updated");
        Ok(updated)
    }

    /// Removes the posting together with every application made to it.
    pub fn delete(&self, principal: &Principal, id: &InternshipId) -> Result<(), ServiceError> {
        self.db.write(|tx| {
            let repo = InternshipRepository::new(tx);
            let internship = repo
                .fetch(id)?
                .ok_or_else(|| ServiceError::not_found("internship", id))?;
            principal.require_owner_or_admin(&internship.company_id)?;
            repo.delete(id)?;
            Ok::<_, ServiceError>(())
        })?;

        info!(internship = %id, by = %principal.user_id, "internship deleted");
        Ok(())
    }

    /// Public detail view; hidden postings read as missing and every hit counts a view.
    pub fn get_public(&self, id: &InternshipId) -> Result<Internship, ServiceError> {
        self.db.write(|tx| {
            let repo = InternshipRepository::new(tx);
            let mut internship = repo
                .fetch(id)?
                .filter(|internship| internship.is_active)
                .ok_or_else(|| ServiceError::not_found("internship", id))?;
            repo.record_view(id)?;
            internship.views += 1;
            Ok(internship)
        })
    }

    pub fn list_public(&self, filter: &InternshipFilter) -> Result<Vec<Internship>, ServiceError> {
        self.db
            .read(|conn| Ok(InternshipRepository::new(conn).list_public(filter)?))
    }

    pub fn list_mine(&self, principal: &Principal) -> Result<Vec<Internship>, ServiceError> {
        principal.require(Capability::Company)?;
        self.db
            .read(|conn| Ok(InternshipRepository::new(conn).list_by_company(&principal.user_id)?))
    }

    pub fn list_all(
        &self,
        principal: &Principal,
        status: Option<InternshipStatus>,
    ) -> Result<Vec<Internship>, ServiceError> {
        principal.require(Capability::Staff)?;
        self.db
            .read(|conn| Ok(InternshipRepository::new(conn).list(status)?))
    }

    pub fn moderate(
        &self,
        principal: &Principal,
        id: &InternshipId,
        action: ModerationAction,
        reason: Option<&str>,
    ) -> Result<Internship, ServiceError> {
        principal.require(Capability::Admin)?;
        let internship = self
            .db
            .write(|tx| moderate_in(tx, principal, id, action, reason))?;

        info!(
            internship = %id,
            admin = %principal.user_id,
            status = internship.status.label(),
            "internship moderated"
        );
        Ok(internship)
    }
}

/// Apply one moderation action on an open connection or savepoint.
pub(crate) fn moderate_in(
    conn: &Connection,
    principal: &Principal,
    id: &InternshipId,
    action: ModerationAction,
    reason: Option<&str>,
) -> Result<Internship, ServiceError> {
    principal.require(Capability::Admin)?;
    let repo = InternshipRepository::new(conn);
    let mut internship = repo
        .fetch(id)?
        .ok_or_else(|| ServiceError::not_found("internship", id))?;

    let reason = match action {
        ModerationAction::Reject => Some(
            reason
                .map(str::trim)
                .filter(|reason| !reason.is_empty())
                .ok_or_else(|| ServiceError::validation("a rejection reason is required"))?
                .to_string(),
        ),
        _ => None,
    };

    internship.move_to(action.target())?;
    match action {
        ModerationAction::Approve => {
            internship.approved_at = Some(Utc::now());
            internship.approved_by = Some(principal.user_id.clone());
            internship.rejection_reason = None;
        }
        ModerationAction::Reject => internship.rejection_reason = reason,
        ModerationAction::Activate | ModerationAction::Deactivate => {}
    }

    repo.update(&internship)?;
    Ok(internship)
}
