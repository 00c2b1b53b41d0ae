//! SQLite database migrations

use crate::error::Result;
use rusqlite::Connection;

/// Run all database migrations
pub fn run_migrations(conn: &Connection) -> Result<()> {
    // Create migrations table
    conn.execute(
        "CREATE TABLE IF NOT EXISTS migrations (
            id INTEGER PRIMARY KEY,
            name TEXT NOT NULL UNIQUE,
            applied_at TEXT NOT NULL DEFAULT (datetime('now'))
        )",
        [],
    )?;

    run_migration(conn, "001_members", CREATE_MEMBERS_TABLE)?;
    run_migration(conn, "002_applications", CREATE_APPLICATIONS_TABLE)?;
    run_migration(conn, "003_document_status", CREATE_DOCUMENT_STATUS_TABLE)?;
    run_migration(conn, "004_document_submissions", CREATE_DOCUMENT_SUBMISSIONS_TABLE)?;
    run_migration(conn, "005_agreements", CREATE_AGREEMENTS_TABLE)?;
    run_migration(conn, "006_settings", CREATE_SETTINGS_TABLE)?;

    tracing::info!("Database migrations completed");
    Ok(())
}

fn run_migration(conn: &Connection, name: &str, sql: &str) -> Result<()> {
    let exists: bool = conn.query_row(
        "SELECT EXISTS(SELECT 1 FROM migrations WHERE name = ?)",
        [name],
        |row| row.get(0),
    )?;

    if !exists {
        tracing::info!("Running migration: {}", name);
        conn.execute_batch(sql)?;
        conn.execute("INSERT INTO migrations (name) VALUES (?)", [name])?;
    }

    Ok(())
}

const CREATE_MEMBERS_TABLE: &str = r#"
CREATE TABLE members (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    email TEXT NOT NULL UNIQUE,
    full_name TEXT NOT NULL,
    phone TEXT NOT NULL DEFAULT '',
    country TEXT NOT NULL DEFAULT '',
    password_hash TEXT NOT NULL,
    is_admin INTEGER NOT NULL DEFAULT 0,
    created_at TEXT NOT NULL DEFAULT (datetime('now')),
    updated_at TEXT NOT NULL DEFAULT (datetime('now'))
);
"#;

const CREATE_APPLICATIONS_TABLE: &str = r#"
CREATE TABLE applications (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    application_id TEXT NOT NULL UNIQUE,
    member_email TEXT NOT NULL,
    full_name TEXT NOT NULL,
    path TEXT NOT NULL DEFAULT '',
    properties TEXT NOT NULL DEFAULT '[]',
    cities TEXT NOT NULL DEFAULT '[]',
    budget_range TEXT NOT NULL DEFAULT '',
    share_range REAL NOT NULL DEFAULT 0,
    investment_goals TEXT NOT NULL DEFAULT '[]',
    timeline TEXT NOT NULL DEFAULT '',
    property_types TEXT NOT NULL DEFAULT '[]',
    risk_tolerance TEXT NOT NULL DEFAULT '',
    budget_min REAL NOT NULL DEFAULT 0,
    budget_max REAL NOT NULL DEFAULT 0,
    status TEXT NOT NULL DEFAULT 'pending',
    kyc_status TEXT NOT NULL DEFAULT 'pending',
    documents_status TEXT NOT NULL DEFAULT 'pending',
    created_at TEXT NOT NULL DEFAULT (datetime('now'))
);

CREATE INDEX idx_applications_member_email ON applications(member_email);
"#;

const CREATE_DOCUMENT_STATUS_TABLE: &str = r#"
CREATE TABLE document_status (
    email TEXT NOT NULL,
    slot TEXT NOT NULL,
    status TEXT NOT NULL DEFAULT 'pending',
    updated_at TEXT NOT NULL DEFAULT (datetime('now')),
    PRIMARY KEY (email, slot)
);
"#;

const CREATE_DOCUMENT_SUBMISSIONS_TABLE: &str = r#"
CREATE TABLE document_submissions (
    email TEXT PRIMARY KEY,
    submitted_at TEXT NOT NULL DEFAULT (datetime('now'))
);
"#;

const CREATE_AGREEMENTS_TABLE: &str = r#"
CREATE TABLE agreements (
    email TEXT PRIMARY KEY,
    agreed INTEGER NOT NULL,
    account_holder TEXT NOT NULL,
    bank_name TEXT NOT NULL,
    iban TEXT NOT NULL,
    swift TEXT,
    shortlist TEXT NOT NULL DEFAULT '[]',
    submitted_at TEXT NOT NULL
);
"#;

const CREATE_SETTINGS_TABLE: &str = r#"
CREATE TABLE settings (
    key TEXT PRIMARY KEY,
    value TEXT NOT NULL,
    created_at TEXT NOT NULL DEFAULT (datetime('now'))
);
"#;
