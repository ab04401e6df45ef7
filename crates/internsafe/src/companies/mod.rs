//! Company profiles and their admin-controlled verification state.

pub mod domain;
pub mod repository;
pub mod router;
pub mod service;

pub use domain::{CompanyListing, CompanyProfile, CompanyProfileUpdate, VerificationStatus};
pub use repository::CompanyProfileRepository;
pub use router::company_profile_router;
pub use service::{CompanyService, CompanyVerification};
