use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use serde::Deserialize;

use super::bulk::{BulkOutcome, BulkUserAction};
use super::service::{DashboardStats, UserQuery};
use crate::accounts::User;
use crate::auth::Principal;
use crate::companies::{CompanyListing, CompanyVerification, VerificationStatus};
use crate::error::ServiceError;
use crate::http::{blocking, Marketplace};
use crate::ids::UserId;
use crate::imports::ImportReport;

#[derive(Debug, Default, Deserialize)]
struct CompanyQuery {
    verification_status: Option<VerificationStatus>,
}

#[derive(Debug, Default, Deserialize)]
struct VerificationNote {
    #[serde(default)]
    notes: Option<String>,
    #[serde(default)]
    reason: Option<String>,
}

pub fn admin_router() -> Router<Arc<Marketplace>> {
    Router::new()
        .route("/admin/dashboard", get(dashboard_handler))
        .route("/admin/users", get(list_users_handler))
        .route("/admin/users/bulk", post(bulk_users_handler))
        .route("/admin/users/import", post(import_users_handler))
        .route("/admin/users/:id", axum::routing::delete(delete_user_handler))
        .route("/admin/users/:id/suspend", post(suspend_user_handler))
        .route("/admin/users/:id/activate", post(activate_user_handler))
        .route("/admin/companies", get(list_companies_handler))
        .route("/admin/companies/:user_id/approve", post(approve_company_handler))
        .route("/admin/companies/:user_id/review", post(review_company_handler))
        .route("/admin/companies/:user_id/reject", post(reject_company_handler))
}

async fn dashboard_handler(
    State(market): State<Arc<Marketplace>>,
    principal: Principal,
) -> Result<Json<DashboardStats>, ServiceError> {
    let stats = blocking(&market, move |market| market.admin.dashboard(&principal)).await?;
    Ok(Json(stats))
}

async fn list_users_handler(
    State(market): State<Arc<Marketplace>>,
    principal: Principal,
    Query(query): Query<UserQuery>,
) -> Result<Json<Vec<User>>, ServiceError> {
    let users = blocking(&market, move |market| market.admin.list_users(&principal, &query)).await?;
    Ok(Json(users))
}

async fn suspend_user_handler(
    State(market): State<Arc<Marketplace>>,
    principal: Principal,
    Path(id): Path<String>,
) -> Result<Json<User>, ServiceError> {
    set_active(&market, principal, id, false).await
}

async fn activate_user_handler(
    State(market): State<Arc<Marketplace>>,
    principal: Principal,
    Path(id): Path<String>,
) -> Result<Json<User>, ServiceError> {
    set_active(&market, principal, id, true).await
}

async fn set_active(
    market: &Arc<Marketplace>,
    principal: Principal,
    id: String,
    active: bool,
) -> Result<Json<User>, ServiceError> {
    let id = UserId::from(id);
    let user = blocking(market, move |market| {
        market.admin.set_user_active(&principal, &id, active)
    })
    .await?;
    Ok(Json(user))
}

async fn delete_user_handler(
    State(market): State<Arc<Marketplace>>,
    principal: Principal,
    Path(id): Path<String>,
) -> Result<StatusCode, ServiceError> {
    let id = UserId::from(id);
    blocking(&market, move |market| market.admin.delete_user(&principal, &id)).await?;
    Ok(StatusCode::NO_CONTENT)
}

async fn bulk_users_handler(
    State(market): State<Arc<Marketplace>>,
    principal: Principal,
    Json(request): Json<BulkUserAction>,
) -> Result<Json<BulkOutcome>, ServiceError> {
    let outcome =
        blocking(&market, move |market| market.admin.bulk_users(&principal, request)).await?;
    Ok(Json(outcome))
}

/// Body is the raw CSV document.
async fn import_users_handler(
    State(market): State<Arc<Marketplace>>,
    principal: Principal,
    body: String,
) -> Result<Json<ImportReport>, ServiceError> {
    let report = blocking(&market, move |market| {
        market.admin.import_users(&principal, body.as_bytes())
    })
    .await?;
    Ok(Json(report))
}

async fn list_companies_handler(
    State(market): State<Arc<Marketplace>>,
    principal: Principal,
    Query(query): Query<CompanyQuery>,
) -> Result<Json<Vec<CompanyListing>>, ServiceError> {
    let listings = blocking(&market, move |market| {
        market.companies.list(&principal, query.verification_status)
    })
    .await?;
    Ok(Json(listings))
}

async fn approve_company_handler(
    State(market): State<Arc<Marketplace>>,
    principal: Principal,
    Path(user_id): Path<String>,
    note: Option<Json<VerificationNote>>,
) -> Result<Json<CompanyVerification>, ServiceError> {
    let notes = note.and_then(|Json(note)| note.notes);
    let user_id = UserId::from(user_id);
    let verification = blocking(&market, move |market| {
        market.companies.approve(&principal, &user_id, notes)
    })
    .await?;
    Ok(Json(verification))
}

async fn review_company_handler(
    State(market): State<Arc<Marketplace>>,
    principal: Principal,
    Path(user_id): Path<String>,
    note: Option<Json<VerificationNote>>,
) -> Result<Json<CompanyVerification>, ServiceError> {
    let notes = note.and_then(|Json(note)| note.notes);
    let user_id = UserId::from(user_id);
    let verification = blocking(&market, move |market| {
        market.companies.mark_under_review(&principal, &user_id, notes)
    })
    .await?;
    Ok(Json(verification))
}

async fn reject_company_handler(
    State(market): State<Arc<Marketplace>>,
    principal: Principal,
    Path(user_id): Path<String>,
    Json(note): Json<VerificationNote>,
) -> Result<Json<CompanyVerification>, ServiceError> {
    let user_id = UserId::from(user_id);
    let verification = blocking(&market, move |market| {
        market
            .companies
            .reject(&principal, &user_id, note.reason.unwrap_or_default())
    })
    .await?;
    Ok(Json(verification))
}
