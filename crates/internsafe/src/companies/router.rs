use std::sync::Arc;

use axum::{extract::State, routing::get, Json, Router};

use super::domain::{CompanyProfile, CompanyProfileUpdate};
use crate::auth::Principal;
use crate::error::ServiceError;
use crate::http::{blocking, Marketplace};

/// Self-service profile for company accounts. Verification routes live under `/admin`.
pub fn company_profile_router() -> Router<Arc<Marketplace>> {
    Router::new().route(
        "/profile/company",
        get(company_profile_handler).put(update_company_profile_handler),
    )
}

async fn company_profile_handler(
    State(market): State<Arc<Marketplace>>,
    principal: Principal,
) -> Result<Json<CompanyProfile>, ServiceError> {
    let profile = blocking(&market, move |market| market.companies.own_profile(&principal)).await?;
    Ok(Json(profile))
}

async fn update_company_profile_handler(
    State(market): State<Arc<Marketplace>>,
    principal: Principal,
    Json(update): Json<CompanyProfileUpdate>,
) -> Result<Json<CompanyProfile>, ServiceError> {
    let profile = blocking(&market, move |market| {
        market.companies.update_own_profile(&principal, update)
    })
    .await?;
    Ok(Json(profile))
}
