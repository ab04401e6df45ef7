//! CSV bulk imports for users and internships.
//!
//! A missing header column rejects the whole document. After that every data
//! row stands alone: a malformed row is reported with its 1-based position
//! and the rest of the batch continues.

mod internships;
mod users;

use std::io::Read;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize};

use crate::error::ServiceError;

pub(crate) use internships::InternshipRow;
pub(crate) use users::UserRow;

pub const USER_COLUMNS: [&str; 4] = ["email", "password", "full_name", "role"];
pub const INTERNSHIP_COLUMNS: [&str; 6] = [
    "company_id",
    "title",
    "description",
    "stipend_amount",
    "duration_months",
    "work_mode",
];

/// Outcome of an import: what was created and which rows were skipped.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ImportReport {
    pub created: usize,
    pub errors: Vec<RowError>,
    pub created_ids: Vec<String>,
}

impl ImportReport {
    pub(crate) fn record_created(&mut self, id: impl Into<String>) {
        self.created += 1;
        self.created_ids.push(id.into());
    }

    pub(crate) fn record_error(&mut self, row: usize, error: impl ToString) {
        self.errors.push(RowError {
            row,
            error: error.to_string(),
        });
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RowError {
    pub row: usize,
    pub error: String,
}

/// Parse every data row, keeping per-row failures as messages.
pub(crate) fn read_rows<T, R>(
    reader: R,
    required: &[&str],
) -> Result<Vec<Result<T, String>>, ServiceError>
where
    T: DeserializeOwned,
    R: Read,
{
    let mut csv_reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(reader);

    let headers: csv::StringRecord = csv_reader
        .headers()
        .map_err(|err| ServiceError::validation(format!("unreadable CSV header: {err}")))?
        .iter()
        .map(str::to_ascii_lowercase)
        .collect();
    let missing: Vec<&str> = required
        .iter()
        .copied()
        .filter(|column| !headers.iter().any(|header| header == *column))
        .collect();
    if !missing.is_empty() {
        return Err(ServiceError::validation(format!(
            "CSV is missing required column(s): {}",
            missing.join(", ")
        )));
    }
    csv_reader.set_headers(headers);

    Ok(csv_reader
        .deserialize::<T>()
        .map(|row| row.map_err(|err| describe(&err)))
        .collect())
}

fn describe(err: &csv::Error) -> String {
    match err.kind() {
        csv::ErrorKind::Deserialize { err, .. } => match err.field() {
            Some(field) => format!("column {}: {}", field + 1, err.kind()),
            None => err.kind().to_string(),
        },
        csv::ErrorKind::UnequalLengths {
            expected_len, len, ..
        } => format!("expected {expected_len} fields, found {len}"),
        _ => err.to_string(),
    }
}

fn empty_string_as_none<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let opt = Option::<String>::deserialize(deserializer)?;
    Ok(opt.filter(|value| !value.trim().is_empty()))
}
