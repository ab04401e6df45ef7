use rusqlite::{Connection, Transaction};
use serde::{Deserialize, Serialize};

use crate::error::{ErrorKind, ServiceError};
use crate::internships::ModerationAction;

/// Account-level admin verbs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UserAction {
    Suspend,
    Activate,
    Delete,
}

#[derive(Debug, Clone, Deserialize)]
pub struct BulkUserAction {
    pub user_ids: Vec<String>,
    pub action: UserAction,
}

#[derive(Debug, Clone, Deserialize)]
pub struct BulkInternshipAction {
    pub internship_ids: Vec<String>,
    pub action: ModerationAction,
    #[serde(default)]
    pub reason: Option<String>,
}

/// Result of a bulk action: successes are committed, failures listed by id.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct BulkOutcome {
    pub affected: usize,
    pub errors: Vec<ItemError>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ItemError {
    pub id: String,
    pub error: String,
}

/// Run `f` for every item inside its own savepoint.
///
/// A failing item rolls back only its own writes. Storage failures abort the
/// whole batch since later items would hit the same fault.
pub(crate) fn each_in_savepoint<I, T, F>(
    tx: &mut Transaction<'_>,
    items: I,
    mut f: F,
) -> Result<Vec<Result<T, ServiceError>>, ServiceError>
where
    I: IntoIterator,
    F: FnMut(&Connection, I::Item) -> Result<T, ServiceError>,
{
    let mut outcomes = Vec::new();
    for item in items {
        let savepoint = tx.savepoint()?;
        match f(&savepoint, item) {
            Ok(value) => {
                savepoint.commit()?;
                outcomes.push(Ok(value));
            }
            Err(err) if err.kind() == ErrorKind::Internal => return Err(err),
            Err(err) => outcomes.push(Err(err)),
        }
    }
    Ok(outcomes)
}

pub(crate) fn summarize<T>(
    ids: Vec<String>,
    outcomes: Vec<Result<T, ServiceError>>,
) -> BulkOutcome {
    let mut summary = BulkOutcome::default();
    for (id, outcome) in ids.into_iter().zip(outcomes) {
        match outcome {
            Ok(_) => summary.affected += 1,
            Err(err) => summary.errors.push(ItemError {
                id,
                error: err.to_string(),
            }),
        }
    }
    summary
}
