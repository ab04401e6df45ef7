use std::sync::Arc;

use tracing::info;

use super::domain::{
    Application, ApplicationDraft, ApplicationQuery, ApplicationStatus, ApplicationUpdate,
    ApplicationView, OfferDecision,
};
use super::repository::ApplicationRepository;
use crate::auth::{Capability, Principal};
use crate::error::ServiceError;
use crate::ids::ApplicationId;
use crate::internships::InternshipRepository;
use crate::store::Database;

/// Student applications and the company-driven hiring pipeline.
pub struct ApplicationService {
    db: Arc<Database>,
}

impl ApplicationService {
    pub fn new(db: Arc<Database>) -> Self {
        Self { db }
    }

    /// Submit an application and bump the posting's counter in the same transaction.
    pub fn apply(
        &self,
        principal: &Principal,
        draft: ApplicationDraft,
    ) -> Result<Application, ServiceError> {
        principal.require(Capability::Student)?;

        let application = self.db.write(|tx| {
            let internships = InternshipRepository::new(tx);
            let applications = ApplicationRepository::new(tx);

            let internship = internships
                .fetch(&draft.internship_id)?
                .filter(|internship| internship.is_active)
                .ok_or_else(|| ServiceError::not_found("internship", &draft.internship_id))?;

            if applications.exists_for(&principal.user_id, &internship.id)? {
                return Err(ServiceError::conflict(
                    "you have already applied to this internship",
                ));
            }

            let application = Application::submit(principal.user_id.clone(), &internship, draft);
            applications.insert(&application)?;
            internships.adjust_applications(&internship.id, 1)?;
            Ok(application)
        })?;

        info!(
            application = %application.id,
            internship = %application.internship_id,
            student = %principal.user_id,
            "application submitted"
        );
        Ok(application)
    }

    pub fn list_mine(&self, principal: &Principal) -> Result<Vec<ApplicationView>, ServiceError> {
        principal.require(Capability::Student)?;
        self.db.read(|conn| {
            Ok(ApplicationRepository::new(conn).list_for_student(&principal.user_id)?)
        })
    }

    pub fn list_for_company(
        &self,
        principal: &Principal,
        query: &ApplicationQuery,
    ) -> Result<Vec<ApplicationView>, ServiceError> {
        principal.require(Capability::Company)?;
        self.db.read(|conn| {
            Ok(ApplicationRepository::new(conn).list_for_company(&principal.user_id, query)?)
        })
    }

    pub fn get(
        &self,
        principal: &Principal,
        id: &ApplicationId,
    ) -> Result<ApplicationView, ServiceError> {
        let view = self.db.read(|conn| {
            ApplicationRepository::new(conn)
                .fetch_view(id)?
                .ok_or_else(|| ServiceError::not_found("application", id))
        })?;

        let application = &view.application;
        if principal.is_admin()
            || principal.owns(&application.student_id)
            || principal.owns(&application.company_id)
        {
            Ok(view)
        } else {
            Err(ServiceError::forbidden("not authorized for this application"))
        }
    }

    /// Company-side pipeline edits. Status changes follow the transition table.
    pub fn update(
        &self,
        principal: &Principal,
        id: &ApplicationId,
        update: ApplicationUpdate,
    ) -> Result<Application, ServiceError> {
        let application = self.db.write(|tx| {
            let repo = ApplicationRepository::new(tx);
            let mut application = repo
                .fetch(id)?
                .ok_or_else(|| ServiceError::not_found("application", id))?;
            principal.require_owner_or_admin(&application.company_id)?;

            application.apply(update)?;
            repo.update(&application)?;
            Ok::<_, ServiceError>(application)
        })?;

        info!(application = %id, status = application.status.label(), "application updated");
        Ok(application)
    }

    pub fn respond_to_offer(
        &self,
        principal: &Principal,
        id: &ApplicationId,
        decision: OfferDecision,
    ) -> Result<Application, ServiceError> {
        principal.require(Capability::Student)?;

        let application = self.db.write(|tx| {
            let repo = ApplicationRepository::new(tx);
            let mut application = repo
                .fetch(id)?
                .ok_or_else(|| ServiceError::not_found("application", id))?;
            if !principal.owns(&application.student_id) {
                return Err(ServiceError::forbidden("not authorized for this application"));
            }
            if application.status != ApplicationStatus::OfferMade {
                return Err(ServiceError::InvalidTransition {
                    entity: "application",
                    from: application.status.label(),
                    to: decision.target().label(),
                });
            }

            application.move_to(decision.target())?;
            repo.update(&application)?;
            Ok(application)
        })?;

        info!(application = %id, status = application.status.label(), "offer answered");
        Ok(application)
    }

    /// Delete the application and release its slot in the posting's counter.
    pub fn withdraw(&self, principal: &Principal, id: &ApplicationId) -> Result<(), ServiceError> {
        self.db.write(|tx| {
            let repo = ApplicationRepository::new(tx);
            let application = repo
                .fetch(id)?
                .ok_or_else(|| ServiceError::not_found("application", id))?;
            principal.require_owner_or_admin(&application.student_id)?;

            if !application.status.allows_withdrawal() {
                return Err(ServiceError::conflict(format!(
                    "cannot withdraw an application in '{}' state",
                    application.status.label()
                )));
            }

            repo.delete(id)?;
            InternshipRepository::new(tx).adjust_applications(&application.internship_id, -1)?;
            Ok(())
        })?;

        info!(application = %id, by = %principal.user_id, "application withdrawn");
        Ok(())
    }
}
