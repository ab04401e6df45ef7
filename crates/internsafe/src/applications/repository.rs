use rusqlite::{params, Connection, OptionalExtension, Row};

use super::domain::{Application, ApplicationQuery, ApplicationView};
use crate::ids::{ApplicationId, InternshipId, UserId};
use crate::store::StoreError;

const COLUMNS: &str = "a.id, a.internship_id, a.student_id, a.company_id, a.cover_letter, \
                       a.resume_url, a.portfolio_url, a.status, a.interview_scheduled, \
                       a.interview_date, a.interview_mode, a.interview_link, a.company_notes, \
                       a.rejection_reason, a.created_at, a.updated_at, a.viewed_at, \
                       a.responded_at";

/// Joins resolving the posting title and both parties' display names.
const VIEW_FROM: &str = "FROM applications a \
                         LEFT JOIN internships i ON i.id = a.internship_id \
                         LEFT JOIN company_profiles p ON p.user_id = a.company_id \
                         LEFT JOIN users c ON c.id = a.company_id \
                         LEFT JOIN users s ON s.id = a.student_id";

const VIEW_EXTRA: &str = "i.title, COALESCE(p.company_name, c.full_name), s.full_name, s.email";

/// Row access for the `applications` table.
pub struct ApplicationRepository<'c> {
    conn: &'c Connection,
}

impl<'c> ApplicationRepository<'c> {
    pub fn new(conn: &'c Connection) -> Self {
        Self { conn }
    }

    pub fn insert(&self, application: &Application) -> Result<(), StoreError> {
        self.conn.execute(
            "INSERT INTO applications (id, internship_id, student_id, company_id, cover_letter, \
             resume_url, portfolio_url, status, interview_scheduled, interview_date, \
             interview_mode, interview_link, company_notes, rejection_reason, created_at, \
             updated_at, viewed_at, responded_at) \
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15, ?16, \
             ?17, ?18)",
            params![
                application.id,
                application.internship_id,
                application.student_id,
                application.company_id,
                application.cover_letter,
                application.resume_url,
                application.portfolio_url,
                application.status,
                application.interview_scheduled,
                application.interview_date,
                application.interview_mode,
                application.interview_link,
                application.company_notes,
                application.rejection_reason,
                application.created_at,
                application.updated_at,
                application.viewed_at,
                application.responded_at,
            ],
        )?;
        Ok(())
    }

    pub fn update(&self, application: &Application) -> Result<(), StoreError> {
        self.conn.execute(
            "UPDATE applications SET status = ?2, interview_scheduled = ?3, \
             interview_date = ?4, interview_mode = ?5, interview_link = ?6, \
             company_notes = ?7, rejection_reason = ?8, updated_at = ?9, viewed_at = ?10, \
             responded_at = ?11 WHERE id = ?1",
            params![
                application.id,
                application.status,
                application.interview_scheduled,
                application.interview_date,
                application.interview_mode,
                application.interview_link,
                application.company_notes,
                application.rejection_reason,
                application.updated_at,
                application.viewed_at,
                application.responded_at,
            ],
        )?;
        Ok(())
    }

    pub fn fetch(&self, id: &ApplicationId) -> Result<Option<Application>, StoreError> {
        let sql = format!("SELECT {COLUMNS} FROM applications a WHERE a.id = ?1");
        Ok(self.conn.query_row(&sql, [id], map_row).optional()?)
    }

    pub fn fetch_view(&self, id: &ApplicationId) -> Result<Option<ApplicationView>, StoreError> {
        let sql = format!("SELECT {COLUMNS}, {VIEW_EXTRA} {VIEW_FROM} WHERE a.id = ?1");
        Ok(self.conn.query_row(&sql, [id], map_view).optional()?)
    }

    pub fn exists_for(
        &self,
        student_id: &UserId,
        internship_id: &InternshipId,
    ) -> Result<bool, StoreError> {
        let count: i64 = self.conn.query_row(
            "SELECT COUNT(*) FROM applications WHERE student_id = ?1 AND internship_id = ?2",
            params![student_id, internship_id],
            |row| row.get(0),
        )?;
        Ok(count > 0)
    }

    pub fn delete(&self, id: &ApplicationId) -> Result<bool, StoreError> {
        let removed = self
            .conn
            .execute("DELETE FROM applications WHERE id = ?1", [id])?;
        Ok(removed > 0)
    }

    pub fn list_for_student(&self, student_id: &UserId) -> Result<Vec<ApplicationView>, StoreError> {
        let sql = format!(
            "SELECT {COLUMNS}, {VIEW_EXTRA} {VIEW_FROM} WHERE a.student_id = ?1 \
             ORDER BY a.created_at DESC"
        );
        let mut stmt = self.conn.prepare(&sql)?;
        let rows = stmt.query_map([student_id], map_view)?;
        Ok(rows.collect::<Result<Vec<_>, _>>()?)
    }

    pub fn list_for_company(
        &self,
        company_id: &UserId,
        query: &ApplicationQuery,
    ) -> Result<Vec<ApplicationView>, StoreError> {
        let sql = format!(
            "SELECT {COLUMNS}, {VIEW_EXTRA} {VIEW_FROM} WHERE a.company_id = ?1 \
             AND (?2 IS NULL OR a.internship_id = ?2) AND (?3 IS NULL OR a.status = ?3) \
             ORDER BY a.created_at DESC"
        );
        let mut stmt = self.conn.prepare(&sql)?;
        let rows = stmt.query_map(
            params![company_id, query.internship_id, query.status],
            map_view,
        )?;
        Ok(rows.collect::<Result<Vec<_>, _>>()?)
    }

    /// Internship ids of a student's applications, one entry per application.
    pub fn internships_applied_by(&self, student_id: &UserId) -> Result<Vec<InternshipId>, StoreError> {
        let mut stmt = self
            .conn
            .prepare("SELECT internship_id FROM applications WHERE student_id = ?1")?;
        let rows = stmt.query_map([student_id], |row| row.get(0))?;
        Ok(rows.collect::<Result<Vec<_>, _>>()?)
    }

    pub fn count(&self) -> Result<u64, StoreError> {
        let count: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM applications", [], |row| row.get(0))?;
        Ok(u64::try_from(count).unwrap_or_default())
    }
}

fn map_row(row: &Row<'_>) -> rusqlite::Result<Application> {
    Ok(Application {
        id: row.get(0)?,
        internship_id: row.get(1)?,
        student_id: row.get(2)?,
        company_id: row.get(3)?,
        cover_letter: row.get(4)?,
        resume_url: row.get(5)?,
        portfolio_url: row.get(6)?,
        status: row.get(7)?,
        interview_scheduled: row.get(8)?,
        interview_date: row.get(9)?,
        interview_mode: row.get(10)?,
        interview_link: row.get(11)?,
        company_notes: row.get(12)?,
        rejection_reason: row.get(13)?,
        created_at: row.get(14)?,
        updated_at: row.get(15)?,
        viewed_at: row.get(16)?,
        responded_at: row.get(17)?,
    })
}

fn map_view(row: &Row<'_>) -> rusqlite::Result<ApplicationView> {
    Ok(ApplicationView {
        application: map_row(row)?,
        internship_title: row.get(18)?,
        company_name: row.get(19)?,
        student_name: row.get(20)?,
        student_email: row.get(21)?,
    })
}
