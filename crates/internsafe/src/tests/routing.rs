use super::common::*;
use axum::body::Body;
use axum::extract::State;
use axum::http::{header, Method, Request, StatusCode};
use axum::response::IntoResponse;
use serde_json::json;
use tower::ServiceExt;

use crate::accounts::router::register_student_handler;
use crate::api_router;

#[tokio::test]
async fn register_handler_rejects_duplicates_with_conflict() {
    let market = marketplace();
    student(&market, "asha@example.com");

    let response = register_student_handler(
        State(market.clone()),
        axum::Json(student_registration("asha@example.com")),
    )
    .await
    .into_response();

    assert_eq!(response.status(), StatusCode::CONFLICT);
    let body = read_json_body(response).await;
    assert_eq!(body["code"], "conflict");
}

#[tokio::test]
async fn registered_student_reads_their_profile() {
    let market = marketplace();
    let router = api_router(market);

    let response = router
        .clone()
        .oneshot(json_request(
            Method::POST,
            "/api/v1/auth/register/student",
            None,
            Some(json!({
                "email": "asha@example.com",
                "password": PASSWORD,
                "full_name": "Asha Student",
            })),
        ))
        .await
        .expect("route responds");
    assert_eq!(response.status(), StatusCode::CREATED);
    let session = read_json_body(response).await;
    let token = session["token"]["access_token"]
        .as_str()
        .expect("token issued")
        .to_string();
    assert!(session["user"].get("password_hash").is_none());

    let response = router
        .oneshot(json_request(Method::GET, "/api/v1/profile/me", Some(&token), None))
        .await
        .expect("route responds");
    assert_eq!(response.status(), StatusCode::OK);
    let me = read_json_body(response).await;
    assert_eq!(me["email"], "asha@example.com");
}

#[tokio::test]
async fn protected_routes_require_a_bearer_token() {
    let router = api_router(marketplace());

    let response = router
        .clone()
        .oneshot(json_request(Method::GET, "/api/v1/profile/me", None, None))
        .await
        .expect("route responds");
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(read_json_body(response).await["code"], "missing_token");

    let response = router
        .oneshot(json_request(
            Method::GET,
            "/api/v1/profile/me",
            Some("not-a-jwt"),
            None,
        ))
        .await
        .expect("route responds");
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(read_json_body(response).await["code"], "invalid_token");
}

#[tokio::test]
async fn pending_company_login_is_reported_distinctly() {
    let market = marketplace();
    pending_company(&market, "hr@acme.test");
    let router = api_router(market);

    let response = router
        .oneshot(json_request(
            Method::POST,
            "/api/v1/auth/login/company",
            None,
            Some(json!({ "email": "hr@acme.test", "password": PASSWORD })),
        ))
        .await
        .expect("route responds");
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(read_json_body(response).await["code"], "pending_approval");
}

#[tokio::test]
async fn unknown_login_portal_is_not_found() {
    let router = api_router(marketplace());
    let response = router
        .oneshot(json_request(
            Method::POST,
            "/api/v1/auth/login/partner",
            None,
            Some(json!({ "email": "a@example.com", "password": PASSWORD })),
        ))
        .await
        .expect("route responds");
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn posted_status_is_ignored_on_create() {
    let market = marketplace();
    let company = approved_company(&market, "hr@acme.test");
    let token = market
        .accounts
        .login(crate::auth::Portal::Company, credentials("hr@acme.test"))
        .expect("login")
        .token
        .access_token;
    assert_eq!(company.email, "hr@acme.test");
    let router = api_router(market);

    let response = router
        .oneshot(json_request(
            Method::POST,
            "/api/v1/internships",
            Some(&token),
            Some(json!({
                "title": "Rust intern",
                "description": "Ship features",
                "stipend_amount": 15000,
                "duration_months": 6,
                "work_mode": "remote",
                "status": "active",
                "is_active": true,
            })),
        ))
        .await
        .expect("route responds");
    assert_eq!(response.status(), StatusCode::CREATED);
    let internship = read_json_body(response).await;
    assert_eq!(internship["status"], "pending");
    assert_eq!(internship["is_active"], false);
    assert_eq!(internship["stipend_currency"], "INR");
}

#[tokio::test]
async fn csv_import_route_reports_rows() {
    let market = marketplace();
    let admin_token = market
        .accounts
        .login(crate::auth::Portal::Admin, credentials(SUPER_ADMIN_EMAIL))
        .expect("bootstrap")
        .token
        .access_token;
    let router = api_router(market);

    let csv = format!(
        "Email,Password,Full_Name,Role\n\
         one@example.com,{PASSWORD},One,student\n\
         one@example.com,{PASSWORD},Again,student\n"
    );
    let request = Request::builder()
        .method(Method::POST)
        .uri("/api/v1/admin/users/import")
        .header(header::AUTHORIZATION, format!("Bearer {admin_token}"))
        .header(header::CONTENT_TYPE, "text/csv")
        .body(Body::from(csv))
        .expect("request builds");

    let response = router.oneshot(request).await.expect("route responds");
    assert_eq!(response.status(), StatusCode::OK);
    let report = read_json_body(response).await;
    assert_eq!(report["created"], 1);
    assert_eq!(report["errors"][0]["row"], 2);
}

#[tokio::test]
async fn students_cannot_reach_admin_routes() {
    let market = marketplace();
    let token = market
        .accounts
        .register_student(student_registration("asha@example.com"))
        .expect("registers")
        .token
        .access_token;
    let router = api_router(market);

    let response = router
        .oneshot(json_request(
            Method::GET,
            "/api/v1/admin/dashboard",
            Some(&token),
            None,
        ))
        .await
        .expect("route responds");
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn unknown_routes_fall_through_to_not_found() {
    let router = api_router(marketplace());
    let response = router
        .oneshot(json_request(Method::GET, "/api/v1/nowhere", None, None))
        .await
        .expect("route responds");
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

fn student_bearer(market: &crate::Marketplace, email: &str) -> String {
    market
        .accounts
        .register_student(student_registration(email))
        .expect("student registers")
        .token
        .access_token
}

fn company_bearer(market: &crate::Marketplace, email: &str) -> String {
    market
        .accounts
        .login(crate::auth::Portal::Company, credentials(email))
        .expect("company logs in")
        .token
        .access_token
}

#[tokio::test]
async fn application_pipeline_over_http() {
    let market = marketplace();
    let company = approved_company(&market, "hr@acme.test");
    let internship = live_internship(&market, &company, "Rust intern");
    let company_token = company_bearer(&market, "hr@acme.test");
    let student_token = student_bearer(&market, "asha@example.com");
    let router = api_router(market);
    let apply_body = json!({
        "internship_id": internship.id.to_string(),
        "cover_letter": "Keen on systems work",
    });

    let response = router
        .clone()
        .oneshot(json_request(
            Method::POST,
            "/api/v1/applications/apply",
            Some(&student_token),
            Some(apply_body.clone()),
        ))
        .await
        .expect("route responds");
    assert_eq!(response.status(), StatusCode::CREATED);
    let application = read_json_body(response).await;
    assert_eq!(application["status"], "submitted");
    let id = application["id"].as_str().expect("application id").to_string();
    let uri = format!("/api/v1/applications/{id}");

    let response = router
        .clone()
        .oneshot(json_request(
            Method::POST,
            "/api/v1/applications/apply",
            Some(&student_token),
            Some(apply_body),
        ))
        .await
        .expect("route responds");
    assert_eq!(response.status(), StatusCode::CONFLICT);
    let body = read_json_body(response).await;
    assert_eq!(body["code"], "conflict");
    assert!(body["error"].is_string());

    let response = router
        .clone()
        .oneshot(json_request(
            Method::PUT,
            &uri,
            Some(&company_token),
            Some(json!({ "status": "offer_made" })),
        ))
        .await
        .expect("route responds");
    assert_eq!(response.status(), StatusCode::CONFLICT);
    let body = read_json_body(response).await;
    assert_eq!(body["code"], "invalid_transition");
    assert_eq!(
        body["error"],
        "cannot move application from 'submitted' to 'offer_made'"
    );

    for status in ["shortlisted", "offer_made"] {
        let response = router
            .clone()
            .oneshot(json_request(
                Method::PUT,
                &uri,
                Some(&company_token),
                Some(json!({ "status": status })),
            ))
            .await
            .expect("route responds");
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(read_json_body(response).await["status"], status);
    }

    let response = router
        .clone()
        .oneshot(json_request(
            Method::POST,
            &format!("{uri}/respond"),
            Some(&student_token),
            Some(json!({ "decision": "accept" })),
        ))
        .await
        .expect("route responds");
    assert_eq!(response.status(), StatusCode::OK);
    let accepted = read_json_body(response).await;
    assert_eq!(accepted["id"], id.as_str());
    assert_eq!(accepted["status"], "accepted");
    assert!(accepted["responded_at"].is_string());

    let response = router
        .clone()
        .oneshot(json_request(
            Method::POST,
            &format!("{uri}/respond"),
            Some(&student_token),
            Some(json!({ "decision": "decline" })),
        ))
        .await
        .expect("route responds");
    assert_eq!(response.status(), StatusCode::CONFLICT);
    assert_eq!(read_json_body(response).await["code"], "invalid_transition");

    let response = router
        .oneshot(json_request(
            Method::DELETE,
            &uri,
            Some(&student_token),
            None,
        ))
        .await
        .expect("route responds");
    assert_eq!(response.status(), StatusCode::CONFLICT);
    assert_eq!(read_json_body(response).await["code"], "conflict");
}

#[tokio::test]
async fn withdrawn_application_answers_no_content_then_not_found() {
    let market = marketplace();
    let company = approved_company(&market, "hr@acme.test");
    let internship = live_internship(&market, &company, "Rust intern");
    let student_token = student_bearer(&market, "asha@example.com");
    let router = api_router(market.clone());

    let response = router
        .clone()
        .oneshot(json_request(
            Method::POST,
            "/api/v1/applications/apply",
            Some(&student_token),
            Some(json!({ "internship_id": internship.id.to_string() })),
        ))
        .await
        .expect("route responds");
    assert_eq!(response.status(), StatusCode::CREATED);
    let id = read_json_body(response).await["id"]
        .as_str()
        .expect("application id")
        .to_string();
    let uri = format!("/api/v1/applications/{id}");

    let response = router
        .clone()
        .oneshot(json_request(Method::DELETE, &uri, Some(&student_token), None))
        .await
        .expect("route responds");
    assert_eq!(response.status(), StatusCode::NO_CONTENT);
    assert_eq!(stored_internship(&market, &internship).applications_count, 0);

    let response = router
        .oneshot(json_request(Method::GET, &uri, Some(&student_token), None))
        .await
        .expect("route responds");
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert_eq!(read_json_body(response).await["code"], "not_found");
}

#[tokio::test]
async fn unknown_email_login_over_http_is_invalid_credentials() {
    let router = api_router(marketplace());
    let response = router
        .oneshot(json_request(
            Method::POST,
            "/api/v1/auth/login/student",
            None,
            Some(json!({ "email": "ghost@example.com", "password": PASSWORD })),
        ))
        .await
        .expect("route responds");
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(read_json_body(response).await["code"], "invalid_credentials");
}
