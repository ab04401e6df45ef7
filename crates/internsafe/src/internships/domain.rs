use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::accounts::domain::require_text;
use crate::error::{ServiceError, UnknownLabel};
use crate::ids::{InternshipId, UserId};
use crate::store::text_column;

/// Moderation and publication state of a posting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InternshipStatus {
    Pending,
    Approved,
    Active,
    Paused,
    Closed,
    Rejected,
}

impl InternshipStatus {
    pub const ALL: [InternshipStatus; 6] = [
        InternshipStatus::Pending,
        InternshipStatus::Approved,
        InternshipStatus::Active,
        InternshipStatus::Paused,
        InternshipStatus::Closed,
        InternshipStatus::Rejected,
    ];

    pub const fn label(self) -> &'static str {
        match self {
            InternshipStatus::Pending => "pending",
            InternshipStatus::Approved => "approved",
            InternshipStatus::Active => "active",
            InternshipStatus::Paused => "paused",
            InternshipStatus::Closed => "closed",
            InternshipStatus::Rejected => "rejected",
        }
    }

    /// Postings in these states are visible to students and accept applications.
    pub const fn is_live(self) -> bool {
        matches!(self, InternshipStatus::Approved | InternshipStatus::Active)
    }

    pub const fn can_transition_to(self, next: InternshipStatus) -> bool {
        use InternshipStatus::*;

        if self as u8 == next as u8 {
            return true;
        }

        matches!(
            (self, next),
            (Pending, Approved | Rejected)
                | (Approved, Active | Paused | Closed)
                | (Active, Paused | Closed)
                | (Paused, Approved | Active | Closed)
        )
    }

    /// Leaving `pending` is a moderation decision.
    pub const fn requires_admin(self, next: InternshipStatus) -> bool {
        matches!(self, InternshipStatus::Pending) && self as u8 != next as u8
    }
}

impl FromStr for InternshipStatus {
    type Err = UnknownLabel;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let normalized = value.trim().to_ascii_lowercase();
        InternshipStatus::ALL
            .into_iter()
            .find(|status| status.label() == normalized)
            .ok_or_else(|| UnknownLabel::new("internship status", value))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WorkMode {
    Remote,
    Hybrid,
    Office,
}

impl WorkMode {
    pub const fn label(self) -> &'static str {
        match self {
            WorkMode::Remote => "remote",
            WorkMode::Hybrid => "hybrid",
            WorkMode::Office => "office",
        }
    }
}

impl FromStr for WorkMode {
    type Err = UnknownLabel;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "remote" => Ok(WorkMode::Remote),
            "hybrid" => Ok(WorkMode::Hybrid),
            "office" => Ok(WorkMode::Office),
            _ => Err(UnknownLabel::new("work mode", value)),
        }
    }
}

text_column!(InternshipStatus, WorkMode);

/// A posting owned by one company account.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Internship {
    pub id: InternshipId,
    pub company_id: UserId,
    pub title: String,
    pub description: String,
    pub stipend_amount: f64,
    pub stipend_currency: String,
    pub duration_months: u32,
    pub work_mode: WorkMode,
    pub location: Option<String>,
    pub hours_per_week: Option<u32>,
    pub positions: u32,
    pub required_skills: Option<String>,
    pub education: Option<String>,
    pub experience: Option<String>,
    pub status: InternshipStatus,
    pub is_active: bool,
    pub views: i64,
    pub applications_count: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub approved_at: Option<DateTime<Utc>>,
    pub approved_by: Option<UserId>,
    pub rejection_reason: Option<String>,
}

impl Internship {
    /// New postings always start pending and hidden, whatever the caller sent.
    pub fn from_draft(company_id: UserId, draft: InternshipDraft) -> Result<Self, ServiceError> {
        let draft = draft.validated()?;
        let now = Utc::now();
        Ok(Self {
            id: InternshipId::generate(),
            company_id,
            title: draft.title,
            description: draft.description,
            stipend_amount: draft.stipend_amount,
            stipend_currency: draft
                .stipend_currency
                .unwrap_or_else(|| "INR".to_string()),
            duration_months: draft.duration_months,
            work_mode: draft.work_mode,
            location: draft.location,
            hours_per_week: draft.hours_per_week,
            positions: draft.positions.unwrap_or(1),
            required_skills: draft.required_skills,
            education: draft.education,
            experience: draft.experience,
            status: InternshipStatus::Pending,
            is_active: false,
            views: 0,
            applications_count: 0,
            created_at: now,
            updated_at: now,
            approved_at: None,
            approved_by: None,
            rejection_reason: None,
        })
    }

    /// Apply content edits. Status goes through [`Internship::move_to`].
    pub fn apply(&mut self, update: &InternshipUpdate) -> Result<(), ServiceError> {
        if let Some(title) = &update.title {
            self.title = require_text("title", title)?;
        }
        if let Some(description) = &update.description {
            self.description = require_text("description", description)?;
        }
        if let Some(amount) = update.stipend_amount {
            self.stipend_amount = check_stipend(amount)?;
        }
        if let Some(currency) = &update.stipend_currency {
            self.stipend_currency = require_text("stipend_currency", currency)?;
        }
        if let Some(months) = update.duration_months {
            self.duration_months = check_at_least_one("duration_months", months)?;
        }
        if let Some(mode) = update.work_mode {
            self.work_mode = mode;
        }
        if let Some(location) = &update.location {
            self.location = Some(location.clone());
        }
        if let Some(hours) = update.hours_per_week {
            self.hours_per_week = Some(hours);
        }
        if let Some(positions) = update.positions {
            self.positions = check_at_least_one("positions", positions)?;
        }
        if let Some(skills) = &update.required_skills {
            self.required_skills = Some(skills.clone());
        }
        if let Some(education) = &update.education {
            self.education = Some(education.clone());
        }
        if let Some(experience) = &update.experience {
            self.experience = Some(experience.clone());
        }
        Ok(())
    }

    /// Validate and perform a status change; `is_active` is always rederived.
    pub fn move_to(&mut self, next: InternshipStatus) -> Result<(), ServiceError> {
        if !self.status.can_transition_to(next) {
            return Err(ServiceError::InvalidTransition {
                entity: "internship",
                from: self.status.label(),
                to: next.label(),
            });
        }
        self.status = next;
        self.is_active = next.is_live();
        self.updated_at = Utc::now();
        Ok(())
    }
}

/// Company-submitted posting content.
#[derive(Debug, Clone, Deserialize)]
pub struct InternshipDraft {
    pub title: String,
    pub description: String,
    pub stipend_amount: f64,
    #[serde(default)]
    pub stipend_currency: Option<String>,
    pub duration_months: u32,
    pub work_mode: WorkMode,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub hours_per_week: Option<u32>,
    #[serde(default)]
    pub positions: Option<u32>,
    #[serde(default)]
    pub required_skills: Option<String>,
    #[serde(default)]
    pub education: Option<String>,
    #[serde(default)]
    pub experience: Option<String>,
}

impl InternshipDraft {
    fn validated(mut self) -> Result<Self, ServiceError> {
        self.title = require_text("title", &self.title)?;
        self.description = require_text("description", &self.description)?;
        check_stipend(self.stipend_amount)?;
        check_at_least_one("duration_months", self.duration_months)?;
        if let Some(positions) = self.positions {
            check_at_least_one("positions", positions)?;
        }
        self.location = self
            .location
            .map(|location| location.trim().to_string())
            .filter(|location| !location.is_empty());
        Ok(self)
    }
}

/// Owner or admin edits; `None` leaves a field untouched.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct InternshipUpdate {
    pub title: Option<String>,
    pub description: Option<String>,
    pub stipend_amount: Option<f64>,
    pub stipend_currency: Option<String>,
    pub duration_months: Option<u32>,
    pub work_mode: Option<WorkMode>,
    pub location: Option<String>,
    pub hours_per_week: Option<u32>,
    pub positions: Option<u32>,
    pub required_skills: Option<String>,
    pub education: Option<String>,
    pub experience: Option<String>,
    pub status: Option<InternshipStatus>,
}

/// Public search over live postings.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct InternshipFilter {
    pub work_mode: Option<WorkMode>,
    pub location: Option<String>,
    pub q: Option<String>,
}

fn check_stipend(amount: f64) -> Result<f64, ServiceError> {
    if amount.is_finite() && amount >= 0.0 {
        Ok(amount)
    } else {
        Err(ServiceError::validation(
            "stipend_amount must be a non-negative number",
        ))
    }
}

fn check_at_least_one(field: &str, value: u32) -> Result<u32, ServiceError> {
    if value >= 1 {
        Ok(value)
    } else {
        Err(ServiceError::validation(format!(
            "{field} must be at least 1"
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;

    fn draft() -> InternshipDraft {
        InternshipDraft {
            title: "Backend intern".to_string(),
            description: "Build APIs".to_string(),
            stipend_amount: 15000.0,
            stipend_currency: None,
            duration_months: 3,
            work_mode: WorkMode::Remote,
            location: Some("  ".to_string()),
            hours_per_week: None,
            positions: None,
            required_skills: None,
            education: None,
            experience: None,
        }
    }

    #[test]
    fn drafts_start_pending_and_hidden() {
        let internship =
            Internship::from_draft(UserId::from("company-1"), draft()).expect("valid draft");
        assert_eq!(internship.status, InternshipStatus::Pending);
        assert!(!internship.is_active);
        assert_eq!(internship.stipend_currency, "INR");
        assert_eq!(internship.positions, 1);
        assert_eq!(internship.location, None);
    }

    #[test]
    fn drafts_reject_bad_values() {
        let mut bad = draft();
        bad.duration_months = 0;
        let err = Internship::from_draft(UserId::from("c"), bad).expect_err("zero months");
        assert_eq!(err.kind(), ErrorKind::Validation);

        let mut bad = draft();
        bad.stipend_amount = -1.0;
        assert!(Internship::from_draft(UserId::from("c"), bad).is_err());
    }

    #[test]
    fn transition_table_matches_lifecycle() {
        use InternshipStatus::*;
        assert!(Pending.can_transition_to(Approved));
        assert!(Pending.can_transition_to(Rejected));
        assert!(!Pending.can_transition_to(Active));
        assert!(Paused.can_transition_to(Approved));
        assert!(!Closed.can_transition_to(Active));
        assert!(!Rejected.can_transition_to(Approved));
        assert!(Closed.can_transition_to(Closed));
        assert!(Pending.requires_admin(Approved));
        assert!(!Pending.requires_admin(Pending));
        assert!(!Active.requires_admin(Paused));
    }

    #[test]
    fn move_to_rederives_visibility() {
        let mut internship =
            Internship::from_draft(UserId::from("company-1"), draft()).expect("valid draft");
        internship.move_to(InternshipStatus::Approved).expect("approve");
        assert!(internship.is_active);
        internship.move_to(InternshipStatus::Paused).expect("pause");
        assert!(!internship.is_active);
        internship.move_to(InternshipStatus::Closed).expect("close");

        let err = internship
            .move_to(InternshipStatus::Active)
            .expect_err("closed is terminal");
        assert_eq!(err.kind(), ErrorKind::Conflict);
        assert_eq!(internship.status, InternshipStatus::Closed);
    }

    #[test]
    fn updates_touch_only_given_fields() {
        let mut internship =
            Internship::from_draft(UserId::from("company-1"), draft()).expect("valid draft");
        internship
            .apply(&InternshipUpdate {
                title: Some("Platform intern".to_string()),
                positions: Some(4),
                ..InternshipUpdate::default()
            })
            .expect("update applies");
        assert_eq!(internship.title, "Platform intern");
        assert_eq!(internship.positions, 4);
        assert_eq!(internship.description, "Build APIs");
    }
}
