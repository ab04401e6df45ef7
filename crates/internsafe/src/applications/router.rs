use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};

use super::domain::{
    Application, ApplicationDraft, ApplicationQuery, ApplicationUpdate, ApplicationView,
    OfferResponse,
};
use crate::auth::Principal;
use crate::error::ServiceError;
use crate::http::{blocking, Marketplace};
use crate::ids::ApplicationId;

pub fn application_router() -> Router<Arc<Marketplace>> {
    Router::new()
        .route("/applications/apply", post(apply_handler))
        .route("/applications/mine", get(list_mine_handler))
        .route("/applications/company", get(list_company_handler))
        .route(
            "/applications/:id",
            get(get_handler).put(update_handler).delete(withdraw_handler),
        )
        .route("/applications/:id/respond", post(respond_handler))
}

async fn apply_handler(
    State(market): State<Arc<Marketplace>>,
    principal: Principal,
    Json(draft): Json<ApplicationDraft>,
) -> Result<Response, ServiceError> {
    let application =
        blocking(&market, move |market| market.applications.apply(&principal, draft)).await?;
    Ok((StatusCode::CREATED, Json(application)).into_response())
}

async fn list_mine_handler(
    State(market): State<Arc<Marketplace>>,
    principal: Principal,
) -> Result<Json<Vec<ApplicationView>>, ServiceError> {
    let views = blocking(&market, move |market| market.applications.list_mine(&principal)).await?;
    Ok(Json(views))
}

async fn list_company_handler(
    State(market): State<Arc<Marketplace>>,
    principal: Principal,
    Query(query): Query<ApplicationQuery>,
) -> Result<Json<Vec<ApplicationView>>, ServiceError> {
    let views = blocking(&market, move |market| {
        market.applications.list_for_company(&principal, &query)
    })
    .await?;
    Ok(Json(views))
}

async fn get_handler(
    State(market): State<Arc<Marketplace>>,
    principal: Principal,
    Path(id): Path<String>,
) -> Result<Json<ApplicationView>, ServiceError> {
    let id = ApplicationId::from(id);
    let view = blocking(&market, move |market| market.applications.get(&principal, &id)).await?;
    Ok(Json(view))
}

async fn update_handler(
    State(market): State<Arc<Marketplace>>,
    principal: Principal,
    Path(id): Path<String>,
    Json(update): Json<ApplicationUpdate>,
) -> Result<Json<Application>, ServiceError> {
    let id = ApplicationId::from(id);
    let application = blocking(&market, move |market| {
        market.applications.update(&principal, &id, update)
    })
    .await?;
    Ok(Json(application))
}

async fn respond_handler(
    State(market): State<Arc<Marketplace>>,
    principal: Principal,
    Path(id): Path<String>,
    Json(response): Json<OfferResponse>,
) -> Result<Json<Application>, ServiceError> {
    let id = ApplicationId::from(id);
    let application = blocking(&market, move |market| {
        market
            .applications
            .respond_to_offer(&principal, &id, response.decision)
    })
    .await?;
    Ok(Json(application))
}

async fn withdraw_handler(
    State(market): State<Arc<Marketplace>>,
    principal: Principal,
    Path(id): Path<String>,
) -> Result<StatusCode, ServiceError> {
    let id = ApplicationId::from(id);
    blocking(&market, move |market| market.applications.withdraw(&principal, &id)).await?;
    Ok(StatusCode::NO_CONTENT)
}
