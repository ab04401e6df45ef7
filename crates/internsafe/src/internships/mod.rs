//! Internship postings: company authoring, moderation and public browsing.

pub mod domain;
pub mod repository;
pub mod router;
pub mod service;

pub use domain::{
    Internship, InternshipDraft, InternshipFilter, InternshipStatus, InternshipUpdate, WorkMode,
};
pub use repository::InternshipRepository;
pub use router::internship_router;
pub use service::{InternshipService, ModerationAction};
