use rusqlite::{params, Connection, OptionalExtension, Row};

use super::domain::{CompanyListing, CompanyProfile, VerificationStatus};
use crate::ids::UserId;
use crate::store::StoreError;

const COLUMNS: &str = "p.id, p.user_id, p.company_name, p.legal_name, p.registration_number, \
                       p.gst_number, p.industry, p.company_size, p.founded_year, p.description, \
                       p.website, p.phone, p.city, p.state, p.country, p.linkedin_url, p.hr_name, \
                       p.hr_email, p.verification_status, p.verification_notes, p.verified_by, \
                       p.verified_at, p.rejection_reason, p.created_at, p.updated_at";

/// Row access for the `company_profiles` table.
pub struct CompanyProfileRepository<'c> {
    conn: &'c Connection,
}

impl<'c> CompanyProfileRepository<'c> {
    pub fn new(conn: &'c Connection) -> Self {
        Self { conn }
    }

    pub fn insert(&self, profile: &CompanyProfile) -> Result<(), StoreError> {
        self.conn.execute(
            "INSERT INTO company_profiles (id, user_id, company_name, legal_name, \
             registration_number, gst_number, industry, company_size, founded_year, description, \
             website, phone, city, state, country, linkedin_url, hr_name, hr_email, \
             verification_status, verification_notes, verified_by, verified_at, rejection_reason, \
             created_at, updated_at) \
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15, ?16, ?17, \
             ?18, ?19, ?20, ?21, ?22, ?23, ?24, ?25)",
            params![
                profile.id,
                profile.user_id,
                profile.company_name,
                profile.legal_name,
                profile.registration_number,
                profile.gst_number,
                profile.industry,
                profile.company_size,
                profile.founded_year,
                profile.description,
                profile.website,
                profile.phone,
                profile.city,
                profile.state,
                profile.country,
                profile.linkedin_url,
                profile.hr_name,
                profile.hr_email,
                profile.verification_status,
                profile.verification_notes,
                profile.verified_by,
                profile.verified_at,
                profile.rejection_reason,
                profile.created_at,
                profile.updated_at,
            ],
        )?;
        Ok(())
    }

    pub fn update(&self, profile: &CompanyProfile) -> Result<(), StoreError> {
        self.conn.execute(
            "UPDATE company_profiles SET company_name = ?2, legal_name = ?3, \
             registration_number = ?4, gst_number = ?5, industry = ?6, company_size = ?7, \
             founded_year = ?8, description = ?9, website = ?10, phone = ?11, city = ?12, \
             state = ?13, country = ?14, linkedin_url = ?15, hr_name = ?16, hr_email = ?17, \
             verification_status = ?18, verification_notes = ?19, verified_by = ?20, \
             verified_at = ?21, rejection_reason = ?22, updated_at = ?23 WHERE id = ?1",
            params![
                profile.id,
                profile.company_name,
                profile.legal_name,
                profile.registration_number,
                profile.gst_number,
                profile.industry,
                profile.company_size,
                profile.founded_year,
                profile.description,
                profile.website,
                profile.phone,
                profile.city,
                profile.state,
                profile.country,
                profile.linkedin_url,
                profile.hr_name,
                profile.hr_email,
                profile.verification_status,
                profile.verification_notes,
                profile.verified_by,
                profile.verified_at,
                profile.rejection_reason,
                profile.updated_at,
            ],
        )?;
        Ok(())
    }

    pub fn fetch_by_user(&self, user_id: &UserId) -> Result<Option<CompanyProfile>, StoreError> {
        let sql = format!("SELECT {COLUMNS} FROM company_profiles p WHERE p.user_id = ?1");
        Ok(self.conn.query_row(&sql, [user_id], map_row).optional()?)
    }

    pub fn list(
        &self,
        status: Option<VerificationStatus>,
    ) -> Result<Vec<CompanyListing>, StoreError> {
        let sql = format!(
            "SELECT {COLUMNS}, u.email, u.is_active FROM company_profiles p \
             JOIN users u ON u.id = p.user_id \
             WHERE (?1 IS NULL OR p.verification_status = ?1) \
             ORDER BY p.created_at, p.company_name"
        );
        let mut stmt = self.conn.prepare(&sql)?;
        let rows = stmt.query_map([status], |row| {
            Ok(CompanyListing {
                profile: map_row(row)?,
                user_email: row.get(25)?,
                user_is_active: row.get(26)?,
            })
        })?;
        Ok(rows.collect::<Result<Vec<_>, _>>()?)
    }

    pub fn count_by_status(&self, status: VerificationStatus) -> Result<u64, StoreError> {
        let count: i64 = self.conn.query_row(
            "SELECT COUNT(*) FROM company_profiles WHERE verification_status = ?1",
            [status],
            |row| row.get(0),
        )?;
        Ok(u64::try_from(count).unwrap_or_default())
    }
}

fn map_row(row: &Row<'_>) -> rusqlite::Result<CompanyProfile> {
    Ok(CompanyProfile {
        id: row.get(0)?,
        user_id: row.get(1)?,
        company_name: row.get(2)?,
        legal_name: row.get(3)?,
        registration_number: row.get(4)?,
        gst_number: row.get(5)?,
        industry: row.get(6)?,
        company_size: row.get(7)?,
        founded_year: row.get(8)?,
        description: row.get(9)?,
        website: row.get(10)?,
        phone: row.get(11)?,
        city: row.get(12)?,
        state: row.get(13)?,
        country: row.get(14)?,
        linkedin_url: row.get(15)?,
        hr_name: row.get(16)?,
        hr_email: row.get(17)?,
        verification_status: row.get(18)?,
        verification_notes: row.get(19)?,
        verified_by: row.get(20)?,
        verified_at: row.get(21)?,
        rejection_reason: row.get(22)?,
        created_at: row.get(23)?,
        updated_at: row.get(24)?,
    })
}
