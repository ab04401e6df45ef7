//! Student applications to internships.

pub mod domain;
pub mod repository;
pub mod router;
pub mod service;

pub use domain::{
    Application, ApplicationDraft, ApplicationQuery, ApplicationStatus, ApplicationUpdate,
    ApplicationView, InterviewMode, OfferDecision, OfferResponse,
};
pub use repository::ApplicationRepository;
pub use router::application_router;
pub use service::ApplicationService;
