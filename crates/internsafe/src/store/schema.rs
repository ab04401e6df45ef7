use rusqlite::Connection;

const SCHEMA: &str = r#"
CREATE TABLE IF NOT EXISTS users (
    id TEXT PRIMARY KEY,
    email TEXT NOT NULL COLLATE NOCASE,
    password_hash TEXT NOT NULL,
    full_name TEXT NOT NULL DEFAULT '',
    role TEXT NOT NULL CHECK (role IN ('student', 'company', 'admin', 'moderator', 'super_admin')),
    login_portal TEXT NOT NULL CHECK (login_portal IN ('student', 'company', 'admin')),
    is_active INTEGER NOT NULL DEFAULT 1,
    is_verified INTEGER NOT NULL DEFAULT 0,
    created_at TEXT NOT NULL,
    updated_at TEXT NOT NULL
);

CREATE UNIQUE INDEX IF NOT EXISTS idx_users_email ON users(email COLLATE NOCASE);
CREATE INDEX IF NOT EXISTS idx_users_role ON users(role);

CREATE TABLE IF NOT EXISTS company_profiles (
    id TEXT PRIMARY KEY,
    user_id TEXT NOT NULL UNIQUE REFERENCES users(id) ON DELETE CASCADE,
    company_name TEXT NOT NULL,
    legal_name TEXT,
    registration_number TEXT,
    gst_number TEXT,
    industry TEXT,
    company_size TEXT,
    founded_year INTEGER,
    description TEXT,
    website TEXT,
    phone TEXT,
    city TEXT,
    state TEXT,
    country TEXT NOT NULL DEFAULT 'India',
    linkedin_url TEXT,
    hr_name TEXT,
    hr_email TEXT,
    verification_status TEXT NOT NULL DEFAULT 'pending'
        CHECK (verification_status IN ('pending', 'under_review', 'verified', 'rejected')),
    verification_notes TEXT,
    verified_by TEXT,
    verified_at TEXT,
    rejection_reason TEXT,
    created_at TEXT NOT NULL,
    updated_at TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_company_profiles_status ON company_profiles(verification_status);

CREATE TABLE IF NOT EXISTS internships (
    id TEXT PRIMARY KEY,
    company_id TEXT NOT NULL REFERENCES users(id) ON DELETE CASCADE,
    title TEXT NOT NULL,
    description TEXT NOT NULL,
    stipend_amount REAL NOT NULL,
    stipend_currency TEXT NOT NULL DEFAULT 'INR',
    duration_months INTEGER NOT NULL,
    work_mode TEXT NOT NULL CHECK (work_mode IN ('remote', 'hybrid', 'office')),
    location TEXT,
    hours_per_week INTEGER,
    positions INTEGER NOT NULL DEFAULT 1,
    required_skills TEXT,
    education TEXT,
    experience TEXT,
    status TEXT NOT NULL DEFAULT 'pending'
        CHECK (status IN ('pending', 'approved', 'active', 'paused', 'closed', 'rejected')),
    is_active INTEGER NOT NULL DEFAULT 0,
    views INTEGER NOT NULL DEFAULT 0,
    applications_count INTEGER NOT NULL DEFAULT 0 CHECK (applications_count >= 0),
    created_at TEXT NOT NULL,
    updated_at TEXT NOT NULL,
    approved_at TEXT,
    approved_by TEXT,
    rejection_reason TEXT
);

CREATE INDEX IF NOT EXISTS idx_internships_company ON internships(company_id);
CREATE INDEX IF NOT EXISTS idx_internships_status ON internships(status);

CREATE TABLE IF NOT EXISTS applications (
    id TEXT PRIMARY KEY,
    internship_id TEXT NOT NULL REFERENCES internships(id) ON DELETE CASCADE,
    student_id TEXT NOT NULL REFERENCES users(id) ON DELETE CASCADE,
    company_id TEXT NOT NULL REFERENCES users(id) ON DELETE CASCADE,
    cover_letter TEXT,
    resume_url TEXT,
    portfolio_url TEXT,
    status TEXT NOT NULL DEFAULT 'submitted'
        CHECK (status IN ('submitted', 'viewed', 'shortlisted', 'interview_scheduled',
                          'rejected', 'offer_made', 'accepted', 'declined')),
    interview_scheduled INTEGER NOT NULL DEFAULT 0,
    interview_date TEXT,
    interview_mode TEXT CHECK (interview_mode IN ('video', 'phone', 'in_person')),
    interview_link TEXT,
    company_notes TEXT,
    rejection_reason TEXT,
    created_at TEXT NOT NULL,
    updated_at TEXT NOT NULL,
    viewed_at TEXT,
    responded_at TEXT
);

CREATE UNIQUE INDEX IF NOT EXISTS idx_applications_student_internship
    ON applications(student_id, internship_id);
CREATE INDEX IF NOT EXISTS idx_applications_company ON applications(company_id);
"#;

pub(super) fn migrate(conn: &Connection) -> rusqlite::Result<()> {
    conn.execute_batch(SCHEMA)
}
