use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{ServiceError, UnknownLabel};
use crate::ids::{ApplicationId, InternshipId, UserId};
use crate::internships::Internship;
use crate::store::text_column;

/// Hiring pipeline stage of a single application.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ApplicationStatus {
    Submitted,
    Viewed,
    Shortlisted,
    InterviewScheduled,
    Rejected,
    OfferMade,
    Accepted,
    Declined,
}

impl ApplicationStatus {
    pub const ALL: [ApplicationStatus; 8] = [
        ApplicationStatus::Submitted,
        ApplicationStatus::Viewed,
        ApplicationStatus::Shortlisted,
        ApplicationStatus::InterviewScheduled,
        ApplicationStatus::Rejected,
        ApplicationStatus::OfferMade,
        ApplicationStatus::Accepted,
        ApplicationStatus::Declined,
    ];

    pub const fn label(self) -> &'static str {
        match self {
            ApplicationStatus::Submitted => "submitted",
            ApplicationStatus::Viewed => "viewed",
            ApplicationStatus::Shortlisted => "shortlisted",
            ApplicationStatus::InterviewScheduled => "interview_scheduled",
            ApplicationStatus::Rejected => "rejected",
            ApplicationStatus::OfferMade => "offer_made",
            ApplicationStatus::Accepted => "accepted",
            ApplicationStatus::Declined => "declined",
        }
    }

    pub const fn is_terminal(self) -> bool {
        matches!(
            self,
            ApplicationStatus::Rejected | ApplicationStatus::Accepted | ApplicationStatus::Declined
        )
    }

    pub const fn can_transition_to(self, next: ApplicationStatus) -> bool {
        use ApplicationStatus::*;

        if self as u8 == next as u8 {
            return true;
        }

        matches!(
            (self, next),
            (Submitted, Viewed | Shortlisted | InterviewScheduled | Rejected)
                | (Viewed, Shortlisted | InterviewScheduled | Rejected)
                | (Shortlisted, InterviewScheduled | Rejected | OfferMade)
                | (InterviewScheduled, Rejected | OfferMade)
                | (OfferMade, Accepted | Declined)
        )
    }

    /// Students may pull out until an offer is on the table.
    pub const fn allows_withdrawal(self) -> bool {
        !matches!(self, ApplicationStatus::OfferMade | ApplicationStatus::Accepted)
    }

    const fn is_company_response(self) -> bool {
        matches!(self, ApplicationStatus::Rejected | ApplicationStatus::OfferMade)
    }
}

impl FromStr for ApplicationStatus {
    type Err = UnknownLabel;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let normalized = value.trim().to_ascii_lowercase();
        ApplicationStatus::ALL
            .into_iter()
            .find(|status| status.label() == normalized)
            .ok_or_else(|| UnknownLabel::new("application status", value))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InterviewMode {
    Video,
    Phone,
    InPerson,
}

impl InterviewMode {
    pub const fn label(self) -> &'static str {
        match self {
            InterviewMode::Video => "video",
            InterviewMode::Phone => "phone",
            InterviewMode::InPerson => "in_person",
        }
    }
}

impl FromStr for InterviewMode {
    type Err = UnknownLabel;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "video" => Ok(InterviewMode::Video),
            "phone" => Ok(InterviewMode::Phone),
            "in_person" => Ok(InterviewMode::InPerson),
            _ => Err(UnknownLabel::new("interview mode", value)),
        }
    }
}

text_column!(ApplicationStatus, InterviewMode);

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Application {
    pub id: ApplicationId,
    pub internship_id: InternshipId,
    pub student_id: UserId,
    pub company_id: UserId,
    pub cover_letter: Option<String>,
    pub resume_url: Option<String>,
    pub portfolio_url: Option<String>,
    pub status: ApplicationStatus,
    pub interview_scheduled: bool,
    pub interview_date: Option<DateTime<Utc>>,
    pub interview_mode: Option<InterviewMode>,
    pub interview_link: Option<String>,
    pub company_notes: Option<String>,
    pub rejection_reason: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub viewed_at: Option<DateTime<Utc>>,
    pub responded_at: Option<DateTime<Utc>>,
}

impl Application {
    /// Company ownership is copied from the posting at submission time.
    pub fn submit(student_id: UserId, internship: &Internship, draft: ApplicationDraft) -> Self {
        let now = Utc::now();
        Self {
            id: ApplicationId::generate(),
            internship_id: internship.id.clone(),
            student_id,
            company_id: internship.company_id.clone(),
            cover_letter: draft.cover_letter,
            resume_url: draft.resume_url,
            portfolio_url: draft.portfolio_url,
            status: ApplicationStatus::Submitted,
            interview_scheduled: false,
            interview_date: None,
            interview_mode: None,
            interview_link: None,
            company_notes: None,
            rejection_reason: None,
            created_at: now,
            updated_at: now,
            viewed_at: None,
            responded_at: None,
        }
    }

    /// Move to `next`, stamping `viewed_at` and `responded_at` at most once.
    pub fn move_to(&mut self, next: ApplicationStatus) -> Result<(), ServiceError> {
        if !self.status.can_transition_to(next) {
            return Err(ServiceError::InvalidTransition {
                entity: "application",
                from: self.status.label(),
                to: next.label(),
            });
        }

        let now = Utc::now();
        self.viewed_at.get_or_insert(now);
        if next.is_company_response() {
            self.responded_at.get_or_insert(now);
        }
        if next == ApplicationStatus::InterviewScheduled {
            self.interview_scheduled = true;
        }
        self.status = next;
        self.updated_at = now;
        Ok(())
    }

    pub fn apply(&mut self, update: ApplicationUpdate) -> Result<(), ServiceError> {
        if let Some(status) = update.status {
            self.move_to(status)?;
        }
        if let Some(scheduled) = update.interview_scheduled {
            self.interview_scheduled = scheduled;
        }
        if let Some(date) = update.interview_date {
            self.interview_date = Some(date);
        }
        if let Some(mode) = update.interview_mode {
            self.interview_mode = Some(mode);
        }
        if let Some(link) = update.interview_link {
            self.interview_link = Some(link);
        }
        if let Some(notes) = update.company_notes {
            self.company_notes = Some(notes);
        }
        if let Some(reason) = update.rejection_reason {
            self.rejection_reason = Some(reason);
        }
        self.updated_at = Utc::now();
        Ok(())
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct ApplicationDraft {
    pub internship_id: InternshipId,
    #[serde(default)]
    pub cover_letter: Option<String>,
    #[serde(default)]
    pub resume_url: Option<String>,
    #[serde(default)]
    pub portfolio_url: Option<String>,
}

/// Company-side edits; `None` leaves a field untouched.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ApplicationUpdate {
    pub status: Option<ApplicationStatus>,
    pub interview_scheduled: Option<bool>,
    pub interview_date: Option<DateTime<Utc>>,
    pub interview_mode: Option<InterviewMode>,
    pub interview_link: Option<String>,
    pub company_notes: Option<String>,
    pub rejection_reason: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OfferDecision {
    Accept,
    Decline,
}

impl OfferDecision {
    pub const fn target(self) -> ApplicationStatus {
        match self {
            OfferDecision::Accept => ApplicationStatus::Accepted,
            OfferDecision::Decline => ApplicationStatus::Declined,
        }
    }
}

#[derive(Debug, Clone, Copy, Deserialize)]
pub struct OfferResponse {
    pub decision: OfferDecision,
}

/// Application enriched with the names each side wants to see.
#[derive(Debug, Clone, Serialize)]
pub struct ApplicationView {
    #[serde(flatten)]
    pub application: Application,
    pub internship_title: Option<String>,
    pub company_name: Option<String>,
    pub student_name: Option<String>,
    pub student_email: Option<String>,
}

/// Narrowing for company-side listings.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ApplicationQuery {
    pub internship_id: Option<InternshipId>,
    pub status: Option<ApplicationStatus>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;

    fn application() -> Application {
        let now = Utc::now();
        Application {
            id: ApplicationId::from("app-1"),
            internship_id: InternshipId::from("int-1"),
            student_id: UserId::from("student-1"),
            company_id: UserId::from("company-1"),
            cover_letter: None,
            resume_url: None,
            portfolio_url: None,
            status: ApplicationStatus::Submitted,
            interview_scheduled: false,
            interview_date: None,
            interview_mode: None,
            interview_link: None,
            company_notes: None,
            rejection_reason: None,
            created_at: now,
            updated_at: now,
            viewed_at: None,
            responded_at: None,
        }
    }

    #[test]
    fn terminal_states_have_no_exits() {
        for from in ApplicationStatus::ALL.into_iter().filter(|s| s.is_terminal()) {
            for to in ApplicationStatus::ALL {
                assert_eq!(from.can_transition_to(to), from == to, "{from:?} -> {to:?}");
            }
        }
    }

    #[test]
    fn accepted_cannot_return_to_submitted() {
        let mut app = application();
        app.status = ApplicationStatus::Accepted;
        let err = app
            .move_to(ApplicationStatus::Submitted)
            .expect_err("illegal edge");
        assert_eq!(err.kind(), ErrorKind::Conflict);
        assert_eq!(app.status, ApplicationStatus::Accepted);
        assert!(app.viewed_at.is_none());
    }

    #[test]
    fn timestamps_are_written_once() {
        let mut app = application();
        app.move_to(ApplicationStatus::Viewed).expect("view");
        let viewed_at = app.viewed_at.expect("viewed stamped");
        app.move_to(ApplicationStatus::InterviewScheduled)
            .expect("schedule");
        assert!(app.interview_scheduled);
        assert_eq!(app.viewed_at, Some(viewed_at));
        assert!(app.responded_at.is_none());

        app.move_to(ApplicationStatus::OfferMade).expect("offer");
        let responded_at = app.responded_at.expect("responded stamped");
        app.move_to(ApplicationStatus::OfferMade).expect("no-op");
        assert_eq!(app.responded_at, Some(responded_at));
        assert_eq!(app.viewed_at, Some(viewed_at));
    }

    #[test]
    fn withdrawal_blocked_once_offer_is_made() {
        assert!(ApplicationStatus::Shortlisted.allows_withdrawal());
        assert!(ApplicationStatus::Rejected.allows_withdrawal());
        assert!(!ApplicationStatus::OfferMade.allows_withdrawal());
        assert!(!ApplicationStatus::Accepted.allows_withdrawal());
    }

    #[test]
    fn failed_update_leaves_other_fields_alone() {
        let mut app = application();
        let err = app.clone().apply(ApplicationUpdate {
            status: Some(ApplicationStatus::Accepted),
            company_notes: Some("great".to_string()),
            ..ApplicationUpdate::default()
        });
        assert!(err.is_err());

        app.apply(ApplicationUpdate {
            company_notes: Some("strong portfolio".to_string()),
            ..ApplicationUpdate::default()
        })
        .expect("notes only");
        assert_eq!(app.company_notes.as_deref(), Some("strong portfolio"));
        assert_eq!(app.status, ApplicationStatus::Submitted);
        assert!(app.viewed_at.is_none());
    }
}
