use serde::Deserialize;

use super::empty_string_as_none;
use crate::error::ServiceError;
use crate::ids::UserId;
use crate::internships::{InternshipDraft, WorkMode};

/// One posting line; `location` and `positions` may be blank or absent.
#[derive(Debug, Clone, Deserialize)]
pub(crate) struct InternshipRow {
    pub(crate) company_id: String,
    pub(crate) title: String,
    pub(crate) description: String,
    pub(crate) stipend_amount: f64,
    pub(crate) duration_months: u32,
    pub(crate) work_mode: String,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    pub(crate) location: Option<String>,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    pub(crate) positions: Option<String>,
}

impl InternshipRow {
    pub(crate) fn into_draft(self) -> Result<(UserId, InternshipDraft), ServiceError> {
        let work_mode = self.work_mode.parse::<WorkMode>()?;
        let positions = self
            .positions
            .map(|raw| {
                raw.trim().parse::<u32>().map_err(|_| {
                    ServiceError::validation(format!("positions '{raw}' is not a whole number"))
                })
            })
            .transpose()?;

        let draft = InternshipDraft {
            title: self.title,
            description: self.description,
            stipend_amount: self.stipend_amount,
            stipend_currency: None,
            duration_months: self.duration_months,
            work_mode,
            location: self.location,
            hours_per_week: None,
            positions,
            required_skills: None,
            education: None,
            experience: None,
        };
        Ok((UserId::from(self.company_id), draft))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row() -> InternshipRow {
        InternshipRow {
            company_id: "company-1".to_string(),
            title: "Design intern".to_string(),
            description: "Figma work".to_string(),
            stipend_amount: 0.0,
            duration_months: 1,
            work_mode: "Office".to_string(),
            location: Some("Delhi".to_string()),
            positions: Some("3".to_string()),
        }
    }

    #[test]
    fn converts_into_a_draft() {
        let (company, draft) = row().into_draft().expect("valid row");
        assert_eq!(company, UserId::from("company-1"));
        assert_eq!(draft.work_mode, WorkMode::Office);
        assert_eq!(draft.positions, Some(3));
    }

    #[test]
    fn rejects_unknown_work_mode_and_bad_positions() {
        let mut bad = row();
        bad.work_mode = "moon".to_string();
        assert!(bad.into_draft().is_err());

        let mut bad = row();
        bad.positions = Some("many".to_string());
        assert!(bad.into_draft().is_err());
    }
}
