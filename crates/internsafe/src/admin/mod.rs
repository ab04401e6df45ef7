//! Staff back office: dashboard, account moderation, bulk actions and imports.

mod bulk;
pub mod router;
pub mod service;

pub use bulk::{BulkInternshipAction, BulkOutcome, BulkUserAction, ItemError, UserAction};
pub use router::admin_router;
pub use service::{AdminService, DashboardStats, UserQuery};
