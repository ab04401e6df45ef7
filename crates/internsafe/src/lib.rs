//! Internship marketplace backend.
//!
//! Students apply to internships posted by verified companies; administrators
//! moderate postings and company accounts. Every operation is a short
//! transaction against a single-file SQLite database.

pub mod accounts;
pub mod admin;
pub mod applications;
pub mod auth;
pub mod companies;
pub mod config;
pub mod error;
pub mod http;
pub mod ids;
pub mod imports;
pub mod internships;
pub mod store;
pub mod telemetry;

#[cfg(test)]
mod tests;

pub use http::{api_router, Marketplace};
