//! SQLite database module

pub mod models;
mod agreements;
mod applications;
mod documents;
mod members;
mod migrations;
mod settings;

use crate::error::Result;
use crate::onboarding::{
    normalize_email, AgreementRecord, AgreementRecordStore, DocumentSlot, DocumentStatus,
    DocumentStatusMap, DocumentStatusStore, SubmissionFlagStore,
};
use crate::security::SecurityManager;
use models::*;
use parking_lot::Mutex;
use rusqlite::Connection;
use std::path::Path;

/// SQLite database wrapper
pub struct SqliteDb {
    conn: Mutex<Connection>,
}

impl SqliteDb {
    /// Create new SQLite database connection
    pub fn new(path: &Path) -> Result<Self> {
        let conn = Connection::open(path)?;

        // Enable WAL mode for better concurrent access
        conn.execute_batch("PRAGMA journal_mode=WAL; PRAGMA synchronous=NORMAL;")?;

        Self::with_connection(conn)
    }

    /// Private in-memory database
    pub fn open_in_memory() -> Result<Self> {
        Self::with_connection(Connection::open_in_memory()?)
    }

    fn with_connection(conn: Connection) -> Result<Self> {
        let db = Self {
            conn: Mutex::new(conn),
        };

        // Run migrations
        db.run_migrations()?;

        Ok(db)
    }

    /// Run database migrations
    fn run_migrations(&self) -> Result<()> {
        let conn = self.conn.lock();
        migrations::run_migrations(&conn)
    }

    // ========== Member Methods ==========

    /// Verify member credentials
    pub fn verify_member(
        &self,
        email: &str,
        password: &str,
        security: &SecurityManager,
    ) -> Result<Option<Member>> {
        let conn = self.conn.lock();
        members::verify_member(&conn, &normalize_email(email), password, security)
    }

    /// Register a new member
    pub fn create_member(
        &self,
        member: &NewMember,
        password: &str,
        security: &SecurityManager,
    ) -> Result<Member> {
        let conn = self.conn.lock();
        members::create_member(&conn, member, password, security)
    }

    /// Check if a member exists
    pub fn member_exists(&self, email: &str) -> Result<bool> {
        let conn = self.conn.lock();
        members::member_exists(&conn, &normalize_email(email))
    }

    /// Grant or revoke admin access
    pub fn set_admin(&self, email: &str, is_admin: bool) -> Result<bool> {
        let conn = self.conn.lock();
        members::set_admin(&conn, &normalize_email(email), is_admin)
    }

    // ========== Settings ==========

    pub fn get_setting(&self, key: &str) -> Result<Option<String>> {
        let conn = self.conn.lock();
        settings::get_setting(&conn, key)
    }

    /// Keep the first value ever stored under a key
    pub fn init_setting(&self, key: &str, value: &str) -> Result<String> {
        let conn = self.conn.lock();
        settings::init_setting(&conn, key, value)
    }

    // ========== Application Methods ==========

    /// Register a member together with their first application
    pub fn create_member_with_application(
        &self,
        member: &NewMember,
        password: &str,
        application: &NewApplication,
        security: &SecurityManager,
    ) -> Result<(Member, Application)> {
        let mut conn = self.conn.lock();
        let tx = conn.transaction()?;

        let member = members::create_member(&tx, member, password, security)?;
        let application = applications::create_application(&tx, application)?;

        tx.commit()?;
        Ok((member, application))
    }

    /// Latest application of a member
    pub fn get_application(&self, email: &str) -> Result<Option<Application>> {
        let conn = self.conn.lock();
        applications::get_application_by_email(&conn, &normalize_email(email))
    }

    /// Update the documents status column of a member's applications
    pub fn update_documents_status(&self, email: &str, status: &str) -> Result<bool> {
        let conn = self.conn.lock();
        applications::update_documents_status(&conn, &normalize_email(email), status)
    }

    /// Set the submission flag and mark the member's applications submitted.
    /// Both writes land or neither does.
    pub fn submit_documents(&self, email: &str) -> Result<()> {
        let email = normalize_email(email);
        let mut conn = self.conn.lock();
        let tx = conn.transaction()?;

        documents::mark_submitted(&tx, &email)?;
        applications::update_documents_status(&tx, &email, "submitted")?;

        tx.commit()?;
        Ok(())
    }
}

// ========== Onboarding Stores ==========

impl DocumentStatusStore for SqliteDb {
    fn document_status(&self, email: &str) -> Result<DocumentStatusMap> {
        let conn = self.conn.lock();
        documents::get_document_status(&conn, &normalize_email(email))
    }

    fn set_document_status(
        &self,
        email: &str,
        slot: DocumentSlot,
        status: DocumentStatus,
    ) -> Result<()> {
        let conn = self.conn.lock();
        documents::set_document_status(&conn, &normalize_email(email), slot, status)
    }
}

impl SubmissionFlagStore for SqliteDb {
    fn documents_submitted(&self, email: &str) -> Result<bool> {
        let conn = self.conn.lock();
        documents::is_submitted(&conn, &normalize_email(email))
    }

    fn set_documents_submitted(&self, email: &str) -> Result<()> {
        let conn = self.conn.lock();
        documents::mark_submitted(&conn, &normalize_email(email))
    }
}

impl AgreementRecordStore for SqliteDb {
    fn agreement(&self, email: &str) -> Result<Option<AgreementRecord>> {
        let conn = self.conn.lock();
        agreements::get_agreement(&conn, &normalize_email(email))
    }

    fn set_agreement(&self, email: &str, record: &AgreementRecord) -> Result<()> {
        let conn = self.conn.lock();
        agreements::save_agreement(&conn, &normalize_email(email), record)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::AppError;
    use crate::onboarding::{BankDetails, ProgressEngine};
    use std::collections::BTreeSet;
    use std::sync::Arc;
    use tempfile::tempdir;

    fn security() -> SecurityManager {
        SecurityManager::new_for_testing()
    }

    fn new_member(email: &str) -> NewMember {
        NewMember {
            email: email.to_string(),
            full_name: "Jane Doe".to_string(),
            phone: "+971500000000".to_string(),
            country: "AE".to_string(),
        }
    }

    fn new_application(email: &str) -> NewApplication {
        NewApplication {
            application_id: uuid::Uuid::new_v4().to_string(),
            member_email: email.to_string(),
            full_name: "Jane Doe".to_string(),
            path: "fractional".to_string(),
            properties: vec!["dg-tower".to_string()],
            cities: vec!["Dubai".to_string(), "London".to_string()],
            budget_range: "100k-250k".to_string(),
            share_range: 5.0,
            ..Default::default()
        }
    }

    fn record() -> AgreementRecord {
        AgreementRecord {
            agreed: true,
            bank_details: BankDetails {
                account_holder: "Jane Doe".into(),
                bank_name: "Emirates NBD".into(),
                iban: "AE070331234567890123456".into(),
                swift: Some("EBILAEAD".into()),
            },
            shortlist: BTreeSet::from(["dg-tower".to_string(), "marina-view".to_string()]),
            submitted_at: "2026-01-01T00:00:00Z".into(),
        }
    }

    #[test]
    fn test_member_login_round_trip() {
        let db = SqliteDb::open_in_memory().unwrap();
        let security = security();

        db.create_member(&new_member("jane@example.com"), "correct horse", &security)
            .unwrap();

        let member = db
            .verify_member("Jane@Example.com", "correct horse", &security)
            .unwrap()
            .unwrap();
        assert_eq!(member.full_name, "Jane Doe");
        assert!(!member.is_admin);

        assert!(db
            .verify_member("jane@example.com", "wrong password", &security)
            .unwrap()
            .is_none());
        assert!(db
            .verify_member("nobody@example.com", "correct horse", &security)
            .unwrap()
            .is_none());
    }

    #[test]
    fn test_duplicate_member_rejected() {
        let db = SqliteDb::open_in_memory().unwrap();
        let security = security();

        db.create_member(&new_member("jane@example.com"), "password1", &security)
            .unwrap();
        let result = db.create_member(&new_member("jane@example.com"), "password2", &security);
        assert!(matches!(result, Err(AppError::Conflict(_))));
    }

    #[test]
    fn test_application_is_created_pending() {
        let db = SqliteDb::open_in_memory().unwrap();
        let security = security();

        let (_, application) = db
            .create_member_with_application(
                &new_member("jane@example.com"),
                "password1",
                &new_application("jane@example.com"),
                &security,
            )
            .unwrap();

        assert_eq!(application.status, "pending");
        assert_eq!(application.kyc_status, "pending");
        assert_eq!(application.documents_status, "pending");
        assert_eq!(application.cities, vec!["Dubai", "London"]);

        assert!(db.update_documents_status("jane@example.com", "submitted").unwrap());
        let stored = db.get_application("jane@example.com").unwrap().unwrap();
        assert_eq!(stored.documents_status, "submitted");
        assert_eq!(stored.application_id, application.application_id);
    }

    #[test]
    fn test_failed_application_rolls_back_member() {
        let db = SqliteDb::open_in_memory().unwrap();
        let security = security();
        let application = new_application("jane@example.com");

        db.create_member_with_application(
            &new_member("jane@example.com"),
            "password1",
            &application,
            &security,
        )
        .unwrap();

        // Same application id violates the unique constraint after the member insert
        let result = db.create_member_with_application(
            &new_member("john@example.com"),
            "password1",
            &application,
            &security,
        );
        assert!(result.is_err());
        assert!(!db.member_exists("john@example.com").unwrap());
    }

    #[test]
    fn test_admin_flag() {
        let db = SqliteDb::open_in_memory().unwrap();
        let security = security();
        db.create_member(&new_member("admin@example.com"), "password1", &security)
            .unwrap();

        assert!(db.set_admin("admin@example.com", true).unwrap());
        let member = db
            .verify_member("admin@example.com", "password1", &security)
            .unwrap()
            .unwrap();
        assert!(member.is_admin);
        assert!(!db.set_admin("missing@example.com", true).unwrap());
    }

    #[test]
    fn test_document_status_store() {
        let db = SqliteDb::open_in_memory().unwrap();

        assert_eq!(db.document_status("a@example.com").unwrap().uploaded_count(), 0);

        db.set_document_status("a@example.com", DocumentSlot::Identity, DocumentStatus::Uploaded)
            .unwrap();
        db.set_document_status("A@example.com", DocumentSlot::TaxId, DocumentStatus::Uploaded)
            .unwrap();
        db.set_document_status("a@example.com", DocumentSlot::TaxId, DocumentStatus::Pending)
            .unwrap();

        let status = db.document_status("a@example.com").unwrap();
        assert_eq!(status.get(DocumentSlot::Identity), DocumentStatus::Uploaded);
        assert_eq!(status.get(DocumentSlot::TaxId), DocumentStatus::Pending);
        assert_eq!(status.uploaded_count(), 1);
    }

    #[test]
    fn test_unknown_document_rows_are_skipped() {
        let db = SqliteDb::open_in_memory().unwrap();
        {
            let conn = db.conn.lock();
            conn.execute(
                "INSERT INTO document_status (email, slot, status) VALUES ('a@example.com', 'selfie', 'uploaded')",
                [],
            )
            .unwrap();
        }
        db.set_document_status("a@example.com", DocumentSlot::SourceOfFunds, DocumentStatus::Uploaded)
            .unwrap();

        assert_eq!(db.document_status("a@example.com").unwrap().uploaded_count(), 1);
    }

    #[test]
    fn test_first_setting_wins() {
        let db = SqliteDb::open_in_memory().unwrap();
        assert!(db.get_setting("password_pepper").unwrap().is_none());

        assert_eq!(db.init_setting("password_pepper", "first").unwrap(), "first");
        assert_eq!(db.init_setting("password_pepper", "second").unwrap(), "first");
        assert_eq!(db.get_setting("password_pepper").unwrap().as_deref(), Some("first"));
    }

    #[test]
    fn test_undecodable_document_rows_are_skipped() {
        let db = SqliteDb::open_in_memory().unwrap();
        {
            let conn = db.conn.lock();
            conn.execute(
                "INSERT INTO document_status (email, slot, status) VALUES ('a@example.com', X'01', 'uploaded')",
                [],
            )
            .unwrap();
        }
        db.set_document_status("a@example.com", DocumentSlot::Identity, DocumentStatus::Uploaded)
            .unwrap();

        assert_eq!(db.document_status("a@example.com").unwrap().uploaded_count(), 1);
    }

    #[test]
    fn test_submit_documents_is_atomic() {
        let db = SqliteDb::open_in_memory().unwrap();
        db.create_member_with_application(
            &new_member("jane@example.com"),
            "password1",
            &new_application("jane@example.com"),
            &security(),
        )
        .unwrap();

        db.submit_documents("Jane@Example.com").unwrap();
        assert!(db.documents_submitted("jane@example.com").unwrap());
        let application = db.get_application("jane@example.com").unwrap().unwrap();
        assert_eq!(application.documents_status, "submitted");

        // Second write fails: the flag must not stick
        {
            let conn = db.conn.lock();
            conn.execute_batch("DROP TABLE applications").unwrap();
        }
        assert!(db.submit_documents("john@example.com").is_err());
        assert!(!db.documents_submitted("john@example.com").unwrap());
    }

    #[test]
    fn test_submission_flag_is_monotonic() {
        let db = SqliteDb::open_in_memory().unwrap();
        assert!(!db.documents_submitted("a@example.com").unwrap());

        db.set_documents_submitted("a@example.com").unwrap();
        db.set_documents_submitted("a@example.com").unwrap();
        assert!(db.documents_submitted("A@EXAMPLE.COM").unwrap());
    }

    #[test]
    fn test_agreement_store() {
        let db = SqliteDb::open_in_memory().unwrap();
        assert!(db.agreement("a@example.com").unwrap().is_none());

        db.set_agreement("a@example.com", &record()).unwrap();
        assert_eq!(db.agreement("a@example.com").unwrap(), Some(record()));

        let mut updated = record();
        updated.bank_details.swift = None;
        db.set_agreement("a@example.com", &updated).unwrap();
        assert_eq!(db.agreement("a@example.com").unwrap(), Some(updated));
    }

    #[test]
    fn test_malformed_agreement_reads_as_error() {
        let db = SqliteDb::open_in_memory().unwrap();
        {
            let conn = db.conn.lock();
            conn.execute(
                "INSERT INTO agreements (email, agreed, account_holder, bank_name, iban, shortlist, submitted_at)
                 VALUES ('a@example.com', 1, 'A', 'B', 'GB00', 'not json', 'now')",
                [],
            )
            .unwrap();
        }

        assert!(db.agreement("a@example.com").is_err());

        // The engine treats the anomaly as "not complete"
        let engine = ProgressEngine::from_store(Arc::new(db));
        assert!(!engine.inputs("a@example.com").agreement_complete);
    }

    #[test]
    fn test_state_survives_reopen() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("onboarding.db");

        {
            let db = SqliteDb::new(&path).unwrap();
            db.set_document_status("a@example.com", DocumentSlot::Identity, DocumentStatus::Uploaded)
                .unwrap();
            db.set_documents_submitted("a@example.com").unwrap();
            db.set_agreement("a@example.com", &record()).unwrap();
        }

        let db = Arc::new(SqliteDb::new(&path).unwrap());
        let engine = ProgressEngine::from_store(db);
        assert_eq!(engine.compute_progress("a@example.com").percent, 100);
    }
}
