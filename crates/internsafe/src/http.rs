use std::sync::Arc;

use axum::{
    async_trait,
    extract::FromRequestParts,
    http::{header::AUTHORIZATION, request::Parts},
    Router,
};

use crate::accounts::{account_router, AccountService};
use crate::admin::{admin_router, AdminService};
use crate::applications::{application_router, ApplicationService};
use crate::auth::Principal;
use crate::companies::{company_profile_router, CompanyService};
use crate::config::{AppConfig, AuthConfig};
use crate::error::{AuthFailure, ServiceError};
use crate::internships::{internship_router, InternshipService};
use crate::store::{Database, StoreError};

/// Every marketplace service wired to one database handle.
pub struct Marketplace {
    pub db: Arc<Database>,
    pub accounts: AccountService,
    pub companies: CompanyService,
    pub internships: InternshipService,
    pub applications: ApplicationService,
    pub admin: AdminService,
}

impl Marketplace {
    pub fn new(db: Arc<Database>, auth: AuthConfig) -> Self {
        let auth = Arc::new(auth);
        Self {
            accounts: AccountService::new(db.clone(), auth.clone()),
            companies: CompanyService::new(db.clone()),
            internships: InternshipService::new(db.clone()),
            applications: ApplicationService::new(db.clone()),
            admin: AdminService::new(db.clone(), auth),
            db,
        }
    }

    /// Open the configured database file and build the services on top of it.
    pub fn open(config: &AppConfig) -> Result<Self, StoreError> {
        let db = Database::open(&config.database.path)?;
        Ok(Self::new(Arc::new(db), config.auth.clone()))
    }
}

/// All `/api/v1` routes bound to the shared marketplace.
pub fn api_router(market: Arc<Marketplace>) -> Router {
    let v1 = Router::new()
        .merge(account_router())
        .merge(company_profile_router())
        .merge(internship_router())
        .merge(application_router())
        .merge(admin_router());

    Router::new().nest("/api/v1", v1).with_state(market)
}

#[async_trait]
impl FromRequestParts<Arc<Marketplace>> for Principal {
    type Rejection = ServiceError;

    async fn from_request_parts(
        parts: &mut Parts,
        market: &Arc<Marketplace>,
    ) -> Result<Self, Self::Rejection> {
        let header = parts
            .headers
            .get(AUTHORIZATION)
            .ok_or(AuthFailure::MissingToken)?;
        let token = header
            .to_str()
            .ok()
            .and_then(bearer_token)
            .ok_or(AuthFailure::InvalidToken)?;

        let token = token.to_string();
        blocking(market, move |market| market.accounts.authenticate(&token)).await
    }
}

/// Run synchronous marketplace work (SQLite queries, password hashing) on
/// tokio's blocking pool so request workers never stall on the connection lock.
pub(crate) async fn blocking<T, F>(market: &Arc<Marketplace>, work: F) -> Result<T, ServiceError>
where
    F: FnOnce(&Marketplace) -> Result<T, ServiceError> + Send + 'static,
    T: Send + 'static,
{
    let market = Arc::clone(market);
    tokio::task::spawn_blocking(move || work(&market))
        .await
        .map_err(ServiceError::Task)?
}

fn bearer_token(value: &str) -> Option<&str> {
    let (scheme, token) = value.trim().split_once(' ')?;
    let token = token.trim();
    (scheme.eq_ignore_ascii_case("bearer") && !token.is_empty()).then_some(token)
}
