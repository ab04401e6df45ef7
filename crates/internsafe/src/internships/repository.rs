use rusqlite::{params, Connection, OptionalExtension, Row};

use super::domain::{Internship, InternshipFilter, InternshipStatus};
use crate::ids::{InternshipId, UserId};
use crate::store::StoreError;

const COLUMNS: &str = "id, company_id, title, description, stipend_amount, stipend_currency, \
                       duration_months, work_mode, location, hours_per_week, positions, \
                       required_skills, education, experience, status, is_active, views, \
                       applications_count, created_at, updated_at, approved_at, approved_by, \
                       rejection_reason";

/// Row access for the `internships` table.
pub struct InternshipRepository<'c> {
    conn: &'c Connection,
}

impl<'c> InternshipRepository<'c> {
    pub fn new(conn: &'c Connection) -> Self {
        Self { conn }
    }

    pub fn insert(&self, internship: &Internship) -> Result<(), StoreError> {
        self.conn.execute(
            "INSERT INTO internships (id, company_id, title, description, stipend_amount, \
             stipend_currency, duration_months, work_mode, location, hours_per_week, positions, \
             required_skills, education, experience, status, is_active, views, \
             applications_count, created_at, updated_at, approved_at, approved_by, \
             rejection_reason) \
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15, ?16, \
             ?17, ?18, ?19, ?20, ?21, ?22, ?23)",
            params![
                internship.id,
                internship.company_id,
                internship.title,
                internship.description,
                internship.stipend_amount,
                internship.stipend_currency,
                internship.duration_months,
                internship.work_mode,
                internship.location,
                internship.hours_per_week,
                internship.positions,
                internship.required_skills,
                internship.education,
                internship.experience,
                internship.status,
                internship.is_active,
                internship.views,
                internship.applications_count,
                internship.created_at,
                internship.updated_at,
                internship.approved_at,
                internship.approved_by,
                internship.rejection_reason,
            ],
        )?;
        Ok(())
    }

    /// Persist content and moderation columns. `company_id` and the counters
    /// are never written here.
    pub fn update(&self, internship: &Internship) -> Result<(), StoreError> {
        self.conn.execute(
            "UPDATE internships SET title = ?2, description = ?3, stipend_amount = ?4, \
             stipend_currency = ?5, duration_months = ?6, work_mode = ?7, location = ?8, \
             hours_per_week = ?9, positions = ?10, required_skills = ?11, education = ?12, \
             experience = ?13, status = ?14, is_active = ?15, updated_at = ?16, \
             approved_at = ?17, approved_by = ?18, rejection_reason = ?19 WHERE id = ?1",
            params![
                internship.id,
                internship.title,
                internship.description,
                internship.stipend_amount,
                internship.stipend_currency,
                internship.duration_months,
                internship.work_mode,
                internship.location,
                internship.hours_per_week,
                internship.positions,
                internship.required_skills,
                internship.education,
                internship.experience,
                internship.status,
                internship.is_active,
                internship.updated_at,
                internship.approved_at,
                internship.approved_by,
                internship.rejection_reason,
            ],
        )?;
        Ok(())
    }

    pub fn fetch(&self, id: &InternshipId) -> Result<Option<Internship>, StoreError> {
        let sql = format!("SELECT {COLUMNS} FROM internships WHERE id = ?1");
        Ok(self.conn.query_row(&sql, [id], map_row).optional()?)
    }

    pub fn delete(&self, id: &InternshipId) -> Result<bool, StoreError> {
        let removed = self
            .conn
            .execute("DELETE FROM internships WHERE id = ?1", [id])?;
        Ok(removed > 0)
    }

    pub fn record_view(&self, id: &InternshipId) -> Result<(), StoreError> {
        self.conn
            .execute("UPDATE internships SET views = views + 1 WHERE id = ?1", [id])?;
        Ok(())
    }

    /// Shift the application counter, never letting it drop below zero.
    pub fn adjust_applications(&self, id: &InternshipId, delta: i64) -> Result<(), StoreError> {
        self.conn.execute(
            "UPDATE internships SET applications_count = MAX(0, applications_count + ?2) \
             WHERE id = ?1",
            params![id, delta],
        )?;
        Ok(())
    }

    pub fn list_public(&self, filter: &InternshipFilter) -> Result<Vec<Internship>, StoreError> {
        let location = filter
            .location
            .as_deref()
            .map(str::trim)
            .filter(|value| !value.is_empty())
            .map(contains_pattern);
        let query = filter
            .q
            .as_deref()
            .map(str::trim)
            .filter(|value| !value.is_empty())
            .map(contains_pattern);

        let sql = format!(
            "SELECT {COLUMNS} FROM internships WHERE is_active = 1 \
             AND (?1 IS NULL OR work_mode = ?1) \
             AND (?2 IS NULL OR location LIKE ?2 ESCAPE '\\') \
             AND (?3 IS NULL OR title LIKE ?3 ESCAPE '\\' OR description LIKE ?3 ESCAPE '\\') \
             ORDER BY created_at DESC"
        );
        let mut stmt = self.conn.prepare(&sql)?;
        let rows = stmt.query_map(params![filter.work_mode, location, query], map_row)?;
        Ok(rows.collect::<Result<Vec<_>, _>>()?)
    }

    pub fn list_by_company(&self, company_id: &UserId) -> Result<Vec<Internship>, StoreError> {
        let sql = format!(
            "SELECT {COLUMNS} FROM internships WHERE company_id = ?1 ORDER BY created_at DESC"
        );
        let mut stmt = self.conn.prepare(&sql)?;
        let rows = stmt.query_map([company_id], map_row)?;
        Ok(rows.collect::<Result<Vec<_>, _>>()?)
    }

    pub fn list(&self, status: Option<InternshipStatus>) -> Result<Vec<Internship>, StoreError> {
        let sql = format!(
            "SELECT {COLUMNS} FROM internships WHERE (?1 IS NULL OR status = ?1) \
             ORDER BY created_at DESC"
        );
        let mut stmt = self.conn.prepare(&sql)?;
        let rows = stmt.query_map([status], map_row)?;
        Ok(rows.collect::<Result<Vec<_>, _>>()?)
    }

    pub fn count(&self, status: Option<InternshipStatus>) -> Result<u64, StoreError> {
        let count: i64 = self.conn.query_row(
            "SELECT COUNT(*) FROM internships WHERE (?1 IS NULL OR status = ?1)",
            [status],
            |row| row.get(0),
        )?;
        Ok(u64::try_from(count).unwrap_or_default())
    }

    pub fn count_live(&self) -> Result<u64, StoreError> {
        let count: i64 = self.conn.query_row(
            "SELECT COUNT(*) FROM internships WHERE is_active = 1",
            [],
            |row| row.get(0),
        )?;
        Ok(u64::try_from(count).unwrap_or_default())
    }
}

fn map_row(row: &Row<'_>) -> rusqlite::Result<Internship> {
    Ok(Internship {
        id: row.get(0)?,
        company_id: row.get(1)?,
        title: row.get(2)?,
        description: row.get(3)?,
        stipend_amount: row.get(4)?,
        stipend_currency: row.get(5)?,
        duration_months: row.get(6)?,
        work_mode: row.get(7)?,
        location: row.get(8)?,
        hours_per_week: row.get(9)?,
        positions: row.get(10)?,
        required_skills: row.get(11)?,
        education: row.get(12)?,
        experience: row.get(13)?,
        status: row.get(14)?,
        is_active: row.get(15)?,
        views: row.get(16)?,
        applications_count: row.get(17)?,
        created_at: row.get(18)?,
        updated_at: row.get(19)?,
        approved_at: row.get(20)?,
        approved_by: row.get(21)?,
        rejection_reason: row.get(22)?,
    })
}

/// `LIKE` pattern matching `needle` literally anywhere in the column.
fn contains_pattern(needle: &str) -> String {
    let mut pattern = String::with_capacity(needle.len() + 2);
    pattern.push('%');
    for ch in needle.chars() {
        if matches!(ch, '\\' | '%' | '_') {
            pattern.push('\\');
        }
        pattern.push(ch);
    }
    pattern.push('%');
    pattern
}
