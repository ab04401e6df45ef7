use std::sync::Arc;

use axum::body::Body;
use axum::http::{header, Method, Request};
use axum::response::Response;
use serde_json::Value;

use crate::accounts::{CompanyRegistration, Credentials, StudentRegistration};
use crate::auth::{Portal, Principal};
use crate::config::AuthConfig;
use crate::ids::UserId;
use crate::internships::{Internship, InternshipDraft, WorkMode};
use crate::store::Database;
use crate::Marketplace;

pub(super) const SUPER_ADMIN_EMAIL: &str = "root@internsafe.test";
pub(super) const PASSWORD: &str = "correct-horse";

pub(super) fn auth_config() -> AuthConfig {
    AuthConfig {
        secret_key: "test-secret".to_string(),
        token_ttl_minutes: 60,
        super_admin_emails: vec![SUPER_ADMIN_EMAIL.to_string()],
    }
}

pub(super) fn marketplace() -> Arc<Marketplace> {
    let db = Database::open_in_memory().expect("in-memory database");
    Arc::new(Marketplace::new(Arc::new(db), auth_config()))
}

pub(super) fn credentials(email: &str) -> Credentials {
    Credentials {
        email: email.to_string(),
        password: PASSWORD.to_string(),
    }
}

pub(super) fn student_registration(email: &str) -> StudentRegistration {
    StudentRegistration {
        email: email.to_string(),
        password: PASSWORD.to_string(),
        full_name: "Asha Student".to_string(),
    }
}

pub(super) fn company_registration(email: &str) -> CompanyRegistration {
    CompanyRegistration {
        email: email.to_string(),
        password: PASSWORD.to_string(),
        full_name: "Ravi Recruiter".to_string(),
        company_name: "Acme Labs".to_string(),
        industry: Some("Software".to_string()),
        website: None,
        phone: None,
        city: Some("Bengaluru".to_string()),
    }
}

pub(super) fn principal_for(market: &Marketplace, token: &str) -> Principal {
    market
        .accounts
        .authenticate(token)
        .expect("token authenticates")
}

pub(super) fn student(market: &Marketplace, email: &str) -> Principal {
    let session = market
        .accounts
        .register_student(student_registration(email))
        .expect("student registers");
    principal_for(market, &session.token.access_token)
}

/// Logs in through the allow-list bootstrap on first use.
pub(super) fn super_admin(market: &Marketplace) -> Principal {
    let session = market
        .accounts
        .login(Portal::Admin, credentials(SUPER_ADMIN_EMAIL))
        .expect("super admin logs in");
    principal_for(market, &session.token.access_token)
}

pub(super) fn pending_company(market: &Marketplace, email: &str) -> UserId {
    market
        .accounts
        .register_company(company_registration(email))
        .expect("company registers")
        .user
        .id
}

pub(super) fn approved_company(market: &Marketplace, email: &str) -> Principal {
    let company_id = pending_company(market, email);
    let admin = super_admin(market);
    market
        .companies
        .approve(&admin, &company_id, None)
        .expect("company approved");
    let session = market
        .accounts
        .login(Portal::Company, credentials(email))
        .expect("approved company logs in");
    principal_for(market, &session.token.access_token)
}

pub(super) fn draft(title: &str) -> InternshipDraft {
    InternshipDraft {
        title: title.to_string(),
        description: "Ship features with the platform team".to_string(),
        stipend_amount: 12000.0,
        stipend_currency: None,
        duration_months: 3,
        work_mode: WorkMode::Remote,
        location: Some("Bengaluru".to_string()),
        hours_per_week: Some(40),
        positions: Some(2),
        required_skills: Some("rust, sql".to_string()),
        education: None,
        experience: None,
    }
}

/// Created by `company` and approved by the super admin.
pub(super) fn live_internship(market: &Marketplace, company: &Principal, title: &str) -> Internship {
    let internship = market
        .internships
        .create(company, draft(title))
        .expect("internship created");
    let admin = super_admin(market);
    market
        .internships
        .moderate(
            &admin,
            &internship.id,
            crate::internships::ModerationAction::Approve,
            None,
        )
        .expect("internship approved")
}

pub(super) fn stored_internship(market: &Marketplace, internship: &Internship) -> Internship {
    market
        .db
        .read(|conn| {
            crate::internships::InternshipRepository::new(conn).fetch(&internship.id)
        })
        .expect("read internship")
        .expect("internship exists")
}

pub(super) fn json_request(
    method: Method,
    uri: &str,
    token: Option<&str>,
    body: Option<Value>,
) -> Request<Body> {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
    }
    match body {
        Some(body) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(serde_json::to_vec(&body).expect("json body")))
            .expect("request builds"),
        None => builder.body(Body::empty()).expect("request builds"),
    }
}

pub(super) async fn read_json_body(response: Response) -> Value {
    let body = axum::body::to_bytes(response.into_body(), 1024 * 1024)
        .await
        .expect("read body");
    serde_json::from_slice(&body).expect("json payload")
}
