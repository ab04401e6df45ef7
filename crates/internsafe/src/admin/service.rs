use std::io::Read;
use std::sync::Arc;

use chrono::Utc;
use rusqlite::Connection;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use super::bulk::{
    each_in_savepoint, summarize, BulkInternshipAction, BulkOutcome, BulkUserAction, UserAction,
};
use crate::accounts::domain::require_text;
use crate::accounts::{normalize_email, User, UserRepository};
use crate::applications::ApplicationRepository;
use crate::auth::password::{hash_password, validate_password};
use crate::auth::{Capability, Principal, Role};
use crate::companies::{CompanyProfile, CompanyProfileRepository, VerificationStatus};
use crate::config::AuthConfig;
use crate::error::ServiceError;
use crate::ids::{InternshipId, UserId};
use crate::imports::{
    read_rows, ImportReport, InternshipRow, UserRow, INTERNSHIP_COLUMNS, USER_COLUMNS,
};
use crate::internships::service::moderate_in;
use crate::internships::{Internship, InternshipRepository, InternshipStatus};
use crate::store::Database;

const DEFAULT_PAGE: u32 = 100;
const MAX_PAGE: u32 = 500;

/// Platform-wide counters for the admin dashboard.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct DashboardStats {
    pub total_students: u64,
    pub total_companies: u64,
    pub total_staff: u64,
    pub pending_company_verifications: u64,
    pub total_internships: u64,
    pub pending_internships: u64,
    pub live_internships: u64,
    pub total_applications: u64,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct UserQuery {
    pub role: Option<Role>,
    pub skip: Option<u32>,
    pub limit: Option<u32>,
}

/// Staff operations over accounts, bulk actions and CSV imports.
pub struct AdminService {
    db: Arc<Database>,
    auth: Arc<AuthConfig>,
}

impl AdminService {
    pub fn new(db: Arc<Database>, auth: Arc<AuthConfig>) -> Self {
        Self { db, auth }
    }

    pub fn dashboard(&self, principal: &Principal) -> Result<DashboardStats, ServiceError> {
        principal.require(Capability::Staff)?;
        self.db.read(collect_stats)
    }

    pub fn list_users(
        &self,
        principal: &Principal,
        query: &UserQuery,
    ) -> Result<Vec<User>, ServiceError> {
        principal.require(Capability::Staff)?;
        let skip = query.skip.unwrap_or(0);
        let limit = query.limit.unwrap_or(DEFAULT_PAGE).clamp(1, MAX_PAGE);
        self.db
            .read(|conn| Ok(UserRepository::new(conn).list(query.role, skip, limit)?))
    }

    pub fn set_user_active(
        &self,
        principal: &Principal,
        id: &UserId,
        active: bool,
    ) -> Result<User, ServiceError> {
        principal.require(Capability::Admin)?;
        let user = self
            .db
            .write(|tx| set_active_in(tx, principal, id, active))?;

        info!(user = %id, admin = %principal.user_id, active, "account status changed");
        Ok(user)
    }

    pub fn delete_user(&self, principal: &Principal, id: &UserId) -> Result<(), ServiceError> {
        principal.require(Capability::Admin)?;
        self.db.write(|tx| delete_user_in(tx, principal, id))?;

        info!(user = %id, admin = %principal.user_id, "account deleted");
        Ok(())
    }

    pub fn bulk_users(
        &self,
        principal: &Principal,
        request: BulkUserAction,
    ) -> Result<BulkOutcome, ServiceError> {
        principal.require(Capability::Admin)?;
        let action = request.action;
        let ids = request.user_ids;

        let outcomes = self.db.write(|tx| {
            each_in_savepoint(tx, ids.iter(), |conn, raw| {
                let id = UserId::from(raw.as_str());
                match action {
                    UserAction::Suspend => set_active_in(conn, principal, &id, false).map(drop),
                    UserAction::Activate => set_active_in(conn, principal, &id, true).map(drop),
                    UserAction::Delete => delete_user_in(conn, principal, &id),
                }
            })
        })?;

        let summary = summarize(ids, outcomes);
        info!(?action, affected = summary.affected, failed = summary.errors.len(), "bulk user action");
        Ok(summary)
    }

    pub fn bulk_internships(
        &self,
        principal: &Principal,
        request: BulkInternshipAction,
    ) -> Result<BulkOutcome, ServiceError> {
        principal.require(Capability::Admin)?;
        let BulkInternshipAction {
            internship_ids,
            action,
            reason,
        } = request;

        let outcomes = self.db.write(|tx| {
            each_in_savepoint(tx, internship_ids.iter(), |conn, raw| {
                let id = InternshipId::from(raw.as_str());
                moderate_in(conn, principal, &id, action, reason.as_deref())
            })
        })?;

        let summary = summarize(internship_ids, outcomes);
        info!(?action, affected = summary.affected, failed = summary.errors.len(), "bulk internship action");
        Ok(summary)
    }

    /// Create accounts from `email,password,full_name,role` rows.
    ///
    /// Company rows also get a pending profile and start inactive, exactly as
    /// if the company had registered itself.
    pub fn import_users<R: Read>(
        &self,
        principal: &Principal,
        reader: R,
    ) -> Result<ImportReport, ServiceError> {
        principal.require(Capability::Admin)?;
        let rows = read_rows::<UserRow, _>(reader, &USER_COLUMNS)?;

        let outcomes = self.db.write(|tx| {
            each_in_savepoint(tx, rows, |conn, row| {
                let row = row.map_err(ServiceError::validation)?;
                self.import_user(conn, principal, row)
            })
        })?;

        let report = into_report(outcomes, |user: User| user.id.to_string());
        info!(created = report.created, failed = report.errors.len(), "user import finished");
        Ok(report)
    }

    /// Create postings from CSV. Imported postings are approved on arrival
    /// by the importing admin.
    pub fn import_internships<R: Read>(
        &self,
        principal: &Principal,
        reader: R,
    ) -> Result<ImportReport, ServiceError> {
        principal.require(Capability::Admin)?;
        let rows = read_rows::<InternshipRow, _>(reader, &INTERNSHIP_COLUMNS)?;

        let outcomes = self.db.write(|tx| {
            each_in_savepoint(tx, rows, |conn, row| {
                let row = row.map_err(ServiceError::validation)?;
                import_internship(conn, principal, row)
            })
        })?;

        let report = into_report(outcomes, |internship: Internship| internship.id.to_string());
        info!(created = report.created, failed = report.errors.len(), "internship import finished");
        Ok(report)
    }

    fn import_user(
        &self,
        conn: &Connection,
        principal: &Principal,
        row: UserRow,
    ) -> Result<User, ServiceError> {
        let role = row.role()?;
        if role.is_staff() && principal.role != Role::SuperAdmin {
            warn!(by = %principal.user_id, role = role.label(), "staff account import refused");
            return Err(ServiceError::forbidden(
                "only a super admin can import staff accounts",
            ));
        }
        let email = normalize_email(&row.email)?;
        if self.auth.is_super_admin_email(&email) {
            return Err(ServiceError::forbidden("email address is reserved"));
        }
        validate_password(&row.password)?;
        let full_name = require_text("full_name", &row.full_name)?;

        let users = UserRepository::new(conn);
        if users.email_in_use(&email, None)? {
            return Err(ServiceError::conflict(format!("email '{email}' already registered")));
        }

        let mut user = User::new(email, hash_password(&row.password)?, full_name, role);
        if role == Role::Company {
            user.is_active = false;
        }
        users.insert(&user)?;

        if role == Role::Company {
            let profile = CompanyProfile::new(user.id.clone(), user.full_name.clone());
            CompanyProfileRepository::new(conn).insert(&profile)?;
        }
        Ok(user)
    }
}

fn collect_stats(conn: &Connection) -> Result<DashboardStats, ServiceError> {
    let users = UserRepository::new(conn);
    let profiles = CompanyProfileRepository::new(conn);
    let internships = InternshipRepository::new(conn);

    Ok(DashboardStats {
        total_students: users.count_by_role(Role::Student)?,
        total_companies: users.count_by_role(Role::Company)?,
        total_staff: users.count_by_role(Role::Admin)?
            + users.count_by_role(Role::Moderator)?
            + users.count_by_role(Role::SuperAdmin)?,
        pending_company_verifications: profiles.count_by_status(VerificationStatus::Pending)?
            + profiles.count_by_status(VerificationStatus::UnderReview)?,
        total_internships: internships.count(None)?,
        pending_internships: internships.count(Some(InternshipStatus::Pending))?,
        live_internships: internships.count_live()?,
        total_applications: ApplicationRepository::new(conn).count()?,
    })
}

/// Super-admin accounts, the caller's own account and (for plain admins)
/// other admins are off limits.
fn guard_target(principal: &Principal, target: &User) -> Result<(), ServiceError> {
    if target.is_super_admin() {
        warn!(target = %target.id, by = %principal.user_id, "attempt to modify a super admin");
        return Err(ServiceError::forbidden(
            "super admin accounts cannot be modified",
        ));
    }
    if principal.owns(&target.id) {
        return Err(ServiceError::forbidden(
            "you cannot perform this action on your own account",
        ));
    }
    if target.role.is_admin() && principal.role != Role::SuperAdmin {
        return Err(ServiceError::forbidden(
            "only the super admin can modify admin accounts",
        ));
    }
    Ok(())
}

fn load_target(conn: &Connection, id: &UserId) -> Result<User, ServiceError> {
    UserRepository::new(conn)
        .fetch(id)?
        .ok_or_else(|| ServiceError::not_found("user", id))
}

pub(crate) fn set_active_in(
    conn: &Connection,
    principal: &Principal,
    id: &UserId,
    active: bool,
) -> Result<User, ServiceError> {
    principal.require(Capability::Admin)?;
    let mut user = load_target(conn, id)?;
    guard_target(principal, &user)?;

    user.is_active = active;
    user.updated_at = Utc::now();
    UserRepository::new(conn).update(&user)?;
    Ok(user)
}

/// Delete an account. Rows owned by it cascade; counters on postings the
/// user had applied to are released first.
pub(crate) fn delete_user_in(
    conn: &Connection,
    principal: &Principal,
    id: &UserId,
) -> Result<(), ServiceError> {
    principal.require(Capability::Admin)?;
    let user = load_target(conn, id)?;
    guard_target(principal, &user)?;

    let internships = InternshipRepository::new(conn);
    for internship_id in ApplicationRepository::new(conn).internships_applied_by(&user.id)? {
        internships.adjust_applications(&internship_id, -1)?;
    }

    UserRepository::new(conn).delete(&user.id)?;
    Ok(())
}

fn import_internship(
    conn: &Connection,
    principal: &Principal,
    row: InternshipRow,
) -> Result<Internship, ServiceError> {
    let (company_id, draft) = row.into_draft()?;
    UserRepository::new(conn)
        .fetch(&company_id)?
        .filter(|user| user.role == Role::Company)
        .ok_or_else(|| {
            ServiceError::validation(format!(
                "company_id '{company_id}' does not reference a company account"
            ))
        })?;

    let mut internship = Internship::from_draft(company_id, draft)?;
    internship.move_to(InternshipStatus::Approved)?;
    internship.approved_at = Some(Utc::now());
    internship.approved_by = Some(principal.user_id.clone());

    InternshipRepository::new(conn).insert(&internship)?;
    Ok(internship)
}

fn into_report<T, F>(outcomes: Vec<Result<T, ServiceError>>, id_of: F) -> ImportReport
where
    F: Fn(T) -> String,
{
    let mut report = ImportReport::default();
    for (index, outcome) in outcomes.into_iter().enumerate() {
        match outcome {
            Ok(value) => report.record_created(id_of(value)),
            Err(err) => report.record_error(index + 1, err),
        }
    }
    report
}
