use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::UnknownLabel;
use crate::ids::{CompanyProfileId, UserId};
use crate::store::text_column;

/// Admin-controlled trust state, independent of the account's active flag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VerificationStatus {
    Pending,
    UnderReview,
    Verified,
    Rejected,
}

impl VerificationStatus {
    pub const ALL: [VerificationStatus; 4] = [
        VerificationStatus::Pending,
        VerificationStatus::UnderReview,
        VerificationStatus::Verified,
        VerificationStatus::Rejected,
    ];

    pub const fn label(self) -> &'static str {
        match self {
            VerificationStatus::Pending => "pending",
            VerificationStatus::UnderReview => "under_review",
            VerificationStatus::Verified => "verified",
            VerificationStatus::Rejected => "rejected",
        }
    }

    /// Re-applying the current state is always allowed so admin actions stay idempotent.
    pub const fn can_transition_to(self, next: VerificationStatus) -> bool {
        use VerificationStatus::*;

        if self as u8 == next as u8 {
            return true;
        }

        matches!(
            (self, next),
            (Pending, UnderReview | Verified | Rejected)
                | (UnderReview, Verified | Rejected)
                | (Verified, Rejected)
                | (Rejected, UnderReview | Verified)
        )
    }
}

impl FromStr for VerificationStatus {
    type Err = UnknownLabel;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let normalized = value.trim().to_ascii_lowercase();
        VerificationStatus::ALL
            .into_iter()
            .find(|status| status.label() == normalized)
            .ok_or_else(|| UnknownLabel::new("verification status", value))
    }
}

text_column!(VerificationStatus);

/// One-to-one extension of a company-role account.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CompanyProfile {
    pub id: CompanyProfileId,
    pub user_id: UserId,
    pub company_name: String,
    pub legal_name: Option<String>,
    pub registration_number: Option<String>,
    pub gst_number: Option<String>,
    pub industry: Option<String>,
    pub company_size: Option<String>,
    pub founded_year: Option<i32>,
    pub description: Option<String>,
    pub website: Option<String>,
    pub phone: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub country: String,
    pub linkedin_url: Option<String>,
    pub hr_name: Option<String>,
    pub hr_email: Option<String>,
    pub verification_status: VerificationStatus,
    pub verification_notes: Option<String>,
    pub verified_by: Option<UserId>,
    pub verified_at: Option<DateTime<Utc>>,
    pub rejection_reason: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl CompanyProfile {
    pub fn new(user_id: UserId, company_name: String) -> Self {
        let now = Utc::now();
        Self {
            id: CompanyProfileId::generate(),
            user_id,
            company_name,
            legal_name: None,
            registration_number: None,
            gst_number: None,
            industry: None,
            company_size: None,
            founded_year: None,
            description: None,
            website: None,
            phone: None,
            city: None,
            state: None,
            country: "India".to_string(),
            linkedin_url: None,
            hr_name: None,
            hr_email: None,
            verification_status: VerificationStatus::Pending,
            verification_notes: None,
            verified_by: None,
            verified_at: None,
            rejection_reason: None,
            created_at: now,
            updated_at: now,
        }
    }

    /// Apply only the fields present in `update`.
    pub fn apply(&mut self, update: CompanyProfileUpdate) {
        let CompanyProfileUpdate {
            company_name,
            legal_name,
            registration_number,
            gst_number,
            industry,
            company_size,
            founded_year,
            description,
            website,
            phone,
            city,
            state,
            country,
            linkedin_url,
            hr_name,
            hr_email,
        } = update;

        if let Some(value) = company_name {
            self.company_name = value;
        }
        if let Some(value) = country {
            self.country = value;
        }
        if let Some(value) = founded_year {
            self.founded_year = Some(value);
        }
        for (slot, value) in [
            (&mut self.legal_name, legal_name),
            (&mut self.registration_number, registration_number),
            (&mut self.gst_number, gst_number),
            (&mut self.industry, industry),
            (&mut self.company_size, company_size),
            (&mut self.description, description),
            (&mut self.website, website),
            (&mut self.phone, phone),
            (&mut self.city, city),
            (&mut self.state, state),
            (&mut self.linkedin_url, linkedin_url),
            (&mut self.hr_name, hr_name),
            (&mut self.hr_email, hr_email),
        ] {
            if value.is_some() {
                *slot = value;
            }
        }
        self.updated_at = Utc::now();
    }
}

/// Profile fields a company may edit; verification fields are admin-only.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CompanyProfileUpdate {
    #[serde(default)]
    pub company_name: Option<String>,
    #[serde(default)]
    pub legal_name: Option<String>,
    #[serde(default)]
    pub registration_number: Option<String>,
    #[serde(default)]
    pub gst_number: Option<String>,
    #[serde(default)]
    pub industry: Option<String>,
    #[serde(default)]
    pub company_size: Option<String>,
    #[serde(default)]
    pub founded_year: Option<i32>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub website: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub city: Option<String>,
    #[serde(default)]
    pub state: Option<String>,
    #[serde(default)]
    pub country: Option<String>,
    #[serde(default)]
    pub linkedin_url: Option<String>,
    #[serde(default)]
    pub hr_name: Option<String>,
    #[serde(default)]
    pub hr_email: Option<String>,
}

/// Admin listing row: the profile plus the owning account's state.
#[derive(Debug, Clone, Serialize)]
pub struct CompanyListing {
    #[serde(flatten)]
    pub profile: CompanyProfile,
    pub user_email: String,
    pub user_is_active: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn verification_transitions() {
        use VerificationStatus::*;
        assert!(Pending.can_transition_to(Verified));
        assert!(Verified.can_transition_to(Verified));
        assert!(Verified.can_transition_to(Rejected));
        assert!(!Verified.can_transition_to(Pending));
        assert!(!UnderReview.can_transition_to(Pending));
        assert!(Rejected.can_transition_to(Verified));
    }

    #[test]
    fn apply_leaves_absent_fields_untouched() {
        let mut profile = CompanyProfile::new(UserId::from("c1"), "Acme".to_string());
        profile.website = Some("https://acme.test".to_string());

        profile.apply(CompanyProfileUpdate {
            industry: Some("Software".to_string()),
            founded_year: Some(2010),
            ..CompanyProfileUpdate::default()
        });

        assert_eq!(profile.company_name, "Acme");
        assert_eq!(profile.website.as_deref(), Some("https://acme.test"));
        assert_eq!(profile.industry.as_deref(), Some("Software"));
        assert_eq!(profile.founded_year, Some(2010));
        assert_eq!(profile.country, "India");
        assert_eq!(profile.verification_status, VerificationStatus::Pending);
    }
}
