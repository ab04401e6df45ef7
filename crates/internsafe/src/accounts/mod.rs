//! Identity store: registration, portal-scoped login and self-service profile.

pub mod domain;
pub mod repository;
pub mod router;
pub mod service;

pub use domain::{
    normalize_email, AccountUpdate, AuthSession, CompanyRegistration, CompanyRegistrationReceipt,
    Credentials, MeView, PasswordChange, StudentRegistration, User,
};
pub use repository::UserRepository;
pub use router::account_router;
pub use service::AccountService;
