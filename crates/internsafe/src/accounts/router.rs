use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde_json::json;

use super::domain::{
    AccountUpdate, AuthSession, CompanyRegistration, Credentials, MeView, PasswordChange,
    StudentRegistration, User,
};
use crate::auth::{Portal, Principal};
use crate::error::ServiceError;
use crate::http::{blocking, Marketplace};

/// Registration, portal login and `/profile/me` endpoints.
pub fn account_router() -> Router<Arc<Marketplace>> {
    Router::new()
        .route("/auth/register/student", post(register_student_handler))
        .route("/auth/register/company", post(register_company_handler))
        .route("/auth/login/:portal", post(login_handler))
        .route("/profile/me", get(me_handler).put(update_me_handler))
        .route("/profile/change-password", post(change_password_handler))
}

pub(crate) async fn register_student_handler(
    State(market): State<Arc<Marketplace>>,
    Json(registration): Json<StudentRegistration>,
) -> Result<Response, ServiceError> {
    let session = blocking(&market, move |market| {
        market.accounts.register_student(registration)
    })
    .await?;
    Ok((StatusCode::CREATED, Json(session)).into_response())
}

pub(crate) async fn register_company_handler(
    State(market): State<Arc<Marketplace>>,
    Json(registration): Json<CompanyRegistration>,
) -> Result<Response, ServiceError> {
    let receipt = blocking(&market, move |market| {
        market.accounts.register_company(registration)
    })
    .await?;
    Ok((StatusCode::CREATED, Json(receipt)).into_response())
}

pub(crate) async fn login_handler(
    State(market): State<Arc<Marketplace>>,
    Path(portal): Path<String>,
    Json(credentials): Json<Credentials>,
) -> Result<Json<AuthSession>, ServiceError> {
    let portal: Portal = portal
        .parse()
        .map_err(|_| ServiceError::not_found("login portal", &portal))?;
    let session = blocking(&market, move |market| market.accounts.login(portal, credentials)).await?;
    Ok(Json(session))
}

async fn me_handler(
    State(market): State<Arc<Marketplace>>,
    principal: Principal,
) -> Result<Json<MeView>, ServiceError> {
    let me = blocking(&market, move |market| market.accounts.me(&principal)).await?;
    Ok(Json(me))
}

async fn update_me_handler(
    State(market): State<Arc<Marketplace>>,
    principal: Principal,
    Json(update): Json<AccountUpdate>,
) -> Result<Json<User>, ServiceError> {
    let user = blocking(&market, move |market| {
        market.accounts.update_me(&principal, update)
    })
    .await?;
    Ok(Json(user))
}

async fn change_password_handler(
    State(market): State<Arc<Marketplace>>,
    principal: Principal,
    Json(change): Json<PasswordChange>,
) -> Result<Json<serde_json::Value>, ServiceError> {
    blocking(&market, move |market| {
        market.accounts.change_password(&principal, change)
    })
    .await?;
    Ok(Json(json!({ "message": "password updated" })))
}
