use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::Deserialize;

use super::domain::{Internship, InternshipDraft, InternshipFilter, InternshipStatus, InternshipUpdate};
use super::service::ModerationAction;
use crate::admin::{BulkInternshipAction, BulkOutcome};
use crate::auth::Principal;
use crate::error::ServiceError;
use crate::http::{blocking, Marketplace};
use crate::ids::InternshipId;
use crate::imports::ImportReport;

#[derive(Debug, Default, Deserialize)]
pub(crate) struct StatusQuery {
    pub status: Option<InternshipStatus>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct RejectionNote {
    pub reason: String,
}

pub fn internship_router() -> Router<Arc<Marketplace>> {
    Router::new()
        .route("/internships", get(list_public_handler).post(create_handler))
        .route("/internships/mine", get(list_mine_handler))
        .route(
            "/internships/:id",
            get(get_public_handler)
                .put(update_handler)
                .delete(delete_handler),
        )
        .route("/internships/admin/all", get(list_all_handler))
        .route("/internships/admin/bulk", post(bulk_handler))
        .route("/internships/admin/import", post(import_handler))
        .route("/internships/admin/:id/approve", post(approve_handler))
        .route("/internships/admin/:id/reject", post(reject_handler))
        .route("/internships/admin/:id/activate", post(activate_handler))
        .route("/internships/admin/:id/deactivate", post(deactivate_handler))
}

async fn list_public_handler(
    State(market): State<Arc<Marketplace>>,
    Query(filter): Query<InternshipFilter>,
) -> Result<Json<Vec<Internship>>, ServiceError> {
    let listings = blocking(&market, move |market| market.internships.list_public(&filter)).await?;
    Ok(Json(listings))
}

async fn create_handler(
    State(market): State<Arc<Marketplace>>,
    principal: Principal,
    Json(draft): Json<InternshipDraft>,
) -> Result<Response, ServiceError> {
    let internship =
        blocking(&market, move |market| market.internships.create(&principal, draft)).await?;
    Ok((StatusCode::CREATED, Json(internship)).into_response())
}

async fn list_mine_handler(
    State(market): State<Arc<Marketplace>>,
    principal: Principal,
) -> Result<Json<Vec<Internship>>, ServiceError> {
    let listings = blocking(&market, move |market| market.internships.list_mine(&principal)).await?;
    Ok(Json(listings))
}

async fn get_public_handler(
    State(market): State<Arc<Marketplace>>,
    Path(id): Path<String>,
) -> Result<Json<Internship>, ServiceError> {
    let id = InternshipId::from(id);
    let internship = blocking(&market, move |market| market.internships.get_public(&id)).await?;
    Ok(Json(internship))
}

async fn update_handler(
    State(market): State<Arc<Marketplace>>,
    principal: Principal,
    Path(id): Path<String>,
    Json(update): Json<InternshipUpdate>,
) -> Result<Json<Internship>, ServiceError> {
    let id = InternshipId::from(id);
    let internship = blocking(&market, move |market| {
        market.internships.update(&principal, &id, update)
    })
    .await?;
    Ok(Json(internship))
}

async fn delete_handler(
    State(market): State<Arc<Marketplace>>,
    principal: Principal,
    Path(id): Path<String>,
) -> Result<StatusCode, ServiceError> {
    let id = InternshipId::from(id);
    blocking(&market, move |market| market.internships.delete(&principal, &id)).await?;
    Ok(StatusCode::NO_CONTENT)
}

async fn list_all_handler(
    State(market): State<Arc<Marketplace>>,
    principal: Principal,
    Query(query): Query<StatusQuery>,
) -> Result<Json<Vec<Internship>>, ServiceError> {
    let listings = blocking(&market, move |market| {
        market.internships.list_all(&principal, query.status)
    })
    .await?;
    Ok(Json(listings))
}

async fn approve_handler(
    State(market): State<Arc<Marketplace>>,
    principal: Principal,
    Path(id): Path<String>,
) -> Result<Json<Internship>, ServiceError> {
    moderate(&market, principal, id, ModerationAction::Approve, None).await
}

async fn reject_handler(
    State(market): State<Arc<Marketplace>>,
    principal: Principal,
    Path(id): Path<String>,
    Json(note): Json<RejectionNote>,
) -> Result<Json<Internship>, ServiceError> {
    moderate(
        &market,
        principal,
        id,
        ModerationAction::Reject,
        Some(note.reason),
    )
    .await
}

async fn activate_handler(
    State(market): State<Arc<Marketplace>>,
    principal: Principal,
    Path(id): Path<String>,
) -> Result<Json<Internship>, ServiceError> {
    moderate(&market, principal, id, ModerationAction::Activate, None).await
}

async fn deactivate_handler(
    State(market): State<Arc<Marketplace>>,
    principal: Principal,
    Path(id): Path<String>,
) -> Result<Json<Internship>, ServiceError> {
    moderate(&market, principal, id, ModerationAction::Deactivate, None).await
}

async fn moderate(
    market: &Arc<Marketplace>,
    principal: Principal,
    id: String,
    action: ModerationAction,
    reason: Option<String>,
) -> Result<Json<Internship>, ServiceError> {
    let id = InternshipId::from(id);
    let internship = blocking(market, move |market| {
        market
            .internships
            .moderate(&principal, &id, action, reason.as_deref())
    })
    .await?;
    Ok(Json(internship))
}

async fn bulk_handler(
    State(market): State<Arc<Marketplace>>,
    principal: Principal,
    Json(request): Json<BulkInternshipAction>,
) -> Result<Json<BulkOutcome>, ServiceError> {
    let outcome = blocking(&market, move |market| {
        market.admin.bulk_internships(&principal, request)
    })
    .await?;
    Ok(Json(outcome))
}

/// Body is the raw CSV document.
async fn import_handler(
    State(market): State<Arc<Marketplace>>,
    principal: Principal,
    body: String,
) -> Result<Json<ImportReport>, ServiceError> {
    let report = blocking(&market, move |market| {
        market.admin.import_internships(&principal, body.as_bytes())
    })
    .await?;
    Ok(Json(report))
}
