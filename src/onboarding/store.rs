//! Store contracts consumed by the progress engine
//!
//! The engine only reads. Writers (KYC and agreement services) go through the
//! same traits. Every implementation keys records by [`normalize_email`].

use super::agreement::AgreementRecord;
use super::documents::{DocumentSlot, DocumentStatus, DocumentStatusMap};
use crate::error::Result;
use dashmap::DashMap;

/// Canonical store key for an email address
pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

/// Per-user document slot -> upload status
pub trait DocumentStatusStore: Send + Sync {
    /// Slots never written read as pending
    fn document_status(&self, email: &str) -> Result<DocumentStatusMap>;

    fn set_document_status(
        &self,
        email: &str,
        slot: DocumentSlot,
        status: DocumentStatus,
    ) -> Result<()>;
}

/// Per-user "documents submitted for review" flag
pub trait SubmissionFlagStore: Send + Sync {
    /// Defaults to false
    fn documents_submitted(&self, email: &str) -> Result<bool>;

    /// Write-once semantics are the caller's responsibility
    fn set_documents_submitted(&self, email: &str) -> Result<()>;
}

/// Per-user investor agreement
pub trait AgreementRecordStore: Send + Sync {
    fn agreement(&self, email: &str) -> Result<Option<AgreementRecord>>;

    fn set_agreement(&self, email: &str, record: &AgreementRecord) -> Result<()>;
}

/// Volatile store backed by concurrent maps. Used as a test fake and when
/// persistence is not wanted.
#[derive(Debug, Default)]
pub struct MemoryStore {
    documents: DashMap<String, DocumentStatusMap>,
    submitted: DashMap<String, bool>,
    agreements: DashMap<String, AgreementRecord>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl DocumentStatusStore for MemoryStore {
    fn document_status(&self, email: &str) -> Result<DocumentStatusMap> {
        Ok(self
            .documents
            .get(&normalize_email(email))
            .map(|entry| entry.value().clone())
            .unwrap_or_default())
    }

    fn set_document_status(
        &self,
        email: &str,
        slot: DocumentSlot,
        status: DocumentStatus,
    ) -> Result<()> {
        self.documents
            .entry(normalize_email(email))
            .or_default()
            .set(slot, status);
        Ok(())
    }
}

impl SubmissionFlagStore for MemoryStore {
    fn documents_submitted(&self, email: &str) -> Result<bool> {
        Ok(self
            .submitted
            .get(&normalize_email(email))
            .map(|entry| *entry.value())
            .unwrap_or(false))
    }

    fn set_documents_submitted(&self, email: &str) -> Result<()> {
        self.submitted.insert(normalize_email(email), true);
        Ok(())
    }
}

impl AgreementRecordStore for MemoryStore {
    fn agreement(&self, email: &str) -> Result<Option<AgreementRecord>> {
        Ok(self
            .agreements
            .get(&normalize_email(email))
            .map(|entry| entry.value().clone()))
    }

    fn set_agreement(&self, email: &str, record: &AgreementRecord) -> Result<()> {
        self.agreements
            .insert(normalize_email(email), record.clone());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::onboarding::agreement::BankDetails;
    use std::collections::BTreeSet;

    #[test]
    fn test_normalize_email() {
        assert_eq!(normalize_email("  Investor@Example.COM "), "investor@example.com");
    }

    #[test]
    fn test_defaults_for_unknown_user() {
        let store = MemoryStore::new();
        assert_eq!(store.document_status("nobody@example.com").unwrap().uploaded_count(), 0);
        assert!(!store.documents_submitted("nobody@example.com").unwrap());
        assert!(store.agreement("nobody@example.com").unwrap().is_none());
    }

    #[test]
    fn test_keys_are_case_insensitive() {
        let store = MemoryStore::new();
        store
            .set_document_status("A@Example.com", DocumentSlot::TaxId, DocumentStatus::Uploaded)
            .unwrap();
        store.set_documents_submitted("A@EXAMPLE.COM").unwrap();

        let status = store.document_status("a@example.com").unwrap();
        assert_eq!(status.get(DocumentSlot::TaxId), DocumentStatus::Uploaded);
        assert!(store.documents_submitted("a@example.com").unwrap());
    }

    #[test]
    fn test_agreement_round_trip() {
        let store = MemoryStore::new();
        let record = AgreementRecord {
            agreed: true,
            bank_details: BankDetails {
                account_holder: "A".into(),
                bank_name: "B".into(),
                iban: "GB00".into(),
                swift: None,
            },
            shortlist: BTreeSet::from(["p1".to_string()]),
            submitted_at: "now".into(),
        };
        store.set_agreement("a@example.com", &record).unwrap();
        assert_eq!(store.agreement("A@example.com").unwrap(), Some(record));
    }
}
