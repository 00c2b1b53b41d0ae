//! KYC Service
//!
//! Validates document uploads, tracks per-slot status and submits the
//! four-document batch for review. File contents are checked and discarded;
//! only the slot status is persisted.

use super::require_member;
use crate::error::{AppError, Result};
use crate::onboarding::{
    DocumentSlot, DocumentStatus, DocumentStatusStore, ProgressSnapshot, SubmissionFlagStore,
};
use crate::state::AppState;
use serde::Serialize;
use tracing::info;

/// Largest accepted document, in bytes
pub const MAX_DOCUMENT_SIZE: usize = 5 * 1024 * 1024;

/// Accepted document content types
pub const ALLOWED_CONTENT_TYPES: [&str; 4] =
    ["application/pdf", "image/jpeg", "image/jpg", "image/png"];

const SUBMITTED_MESSAGE: &str = "Documents received. We'll review and notify you.";

/// Result of a single document upload
#[derive(Debug, Clone, Serialize)]
pub struct UploadResult {
    pub slot: DocumentSlot,
    pub status: DocumentStatus,
    pub progress: ProgressSnapshot,
}

/// Result of submitting the document batch
#[derive(Debug, Clone, Serialize)]
pub struct SubmitResult {
    pub message: String,
    pub progress: ProgressSnapshot,
}

#[derive(Debug, Clone, Serialize)]
pub struct SlotOverview {
    pub slot: DocumentSlot,
    pub label: &'static str,
    pub status: DocumentStatus,
}

/// Per-slot status for the dashboard checklist
#[derive(Debug, Clone, Serialize)]
pub struct DocumentsOverview {
    pub slots: Vec<SlotOverview>,
    pub submitted: bool,
}

pub struct KycService;

impl KycService {
    /// Check a file against the size and type rules
    pub fn validate_document(
        slot: DocumentSlot,
        content_type: Option<&str>,
        size: usize,
    ) -> Result<()> {
        if size == 0 {
            return Err(AppError::Validation(format!(
                "{}: File is empty.",
                slot.display_name()
            )));
        }
        if size > MAX_DOCUMENT_SIZE {
            return Err(AppError::Validation(format!(
                "{}: File must be under 5MB.",
                slot.display_name()
            )));
        }

        // Ignore parameters such as "; charset=binary"
        let mime = content_type
            .and_then(|ct| ct.split(';').next())
            .map(|ct| ct.trim().to_lowercase())
            .unwrap_or_default();
        if !ALLOWED_CONTENT_TYPES.contains(&mime.as_str()) {
            return Err(AppError::Validation(format!(
                "{}: Only PDF, JPG, and PNG are allowed.",
                slot.display_name()
            )));
        }

        Ok(())
    }

    /// Accept a document for one slot and mark it uploaded
    pub fn upload_document(
        state: &AppState,
        email: &str,
        slot: DocumentSlot,
        content_type: Option<&str>,
        contents: &[u8],
    ) -> Result<UploadResult> {
        let email = require_member(state, email)?;
        Self::validate_document(slot, content_type, contents.len())?;

        state
            .sqlite
            .set_document_status(&email, slot, DocumentStatus::Uploaded)?;
        info!("Document {} uploaded for {} ({} bytes)", slot, email, contents.len());

        Ok(UploadResult {
            slot,
            status: DocumentStatus::Uploaded,
            progress: state.progress.notify(&email),
        })
    }

    /// Submit all four documents for review. Repeat calls are no-ops.
    pub fn submit_documents(state: &AppState, email: &str) -> Result<SubmitResult> {
        let email = require_member(state, email)?;

        if !state.sqlite.documents_submitted(&email)? {
            let status = state.sqlite.document_status(&email)?;
            if let Some(missing) = status.missing().first() {
                return Err(AppError::Validation(format!(
                    "All four documents are required. Missing: {}.",
                    missing.display_name()
                )));
            }

            state.sqlite.submit_documents(&email)?;
        }

        Ok(SubmitResult {
            message: SUBMITTED_MESSAGE.to_string(),
            progress: state.progress.notify(&email),
        })
    }

    /// Current checklist for a member
    pub fn documents(state: &AppState, email: &str) -> Result<DocumentsOverview> {
        let email = require_member(state, email)?;
        let status = state.sqlite.document_status(&email)?;

        Ok(DocumentsOverview {
            slots: status
                .iter()
                .map(|(slot, status)| SlotOverview {
                    slot,
                    label: slot.label(),
                    status,
                })
                .collect(),
            submitted: state.sqlite.documents_submitted(&email)?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::test_support::register;

    const PDF: &[u8] = b"%PDF-1.7 test";

    fn upload(state: &AppState, slot: DocumentSlot) -> Result<UploadResult> {
        KycService::upload_document(state, "jane@example.com", slot, Some("application/pdf"), PDF)
    }

    #[test]
    fn test_validate_document() {
        let slot = DocumentSlot::Identity;
        assert!(KycService::validate_document(slot, Some("application/pdf"), 1024).is_ok());
        assert!(KycService::validate_document(slot, Some("IMAGE/PNG"), 1024).is_ok());
        assert!(
            KycService::validate_document(slot, Some("image/jpeg; charset=binary"), 1024).is_ok()
        );
        assert!(KycService::validate_document(slot, Some("application/pdf"), MAX_DOCUMENT_SIZE).is_ok());
    }

    #[test]
    fn test_validate_document_rejections() {
        let err = KycService::validate_document(
            DocumentSlot::TaxId,
            Some("application/pdf"),
            MAX_DOCUMENT_SIZE + 1,
        )
        .unwrap_err();
        assert_eq!(err.to_string(), "tax: File must be under 5MB.");

        let err = KycService::validate_document(DocumentSlot::SourceOfFunds, Some("image/gif"), 10)
            .unwrap_err();
        assert_eq!(err.to_string(), "source of funds: Only PDF, JPG, and PNG are allowed.");

        assert!(KycService::validate_document(DocumentSlot::Identity, None, 10).is_err());
        assert!(KycService::validate_document(DocumentSlot::Identity, Some("application/pdf"), 0).is_err());
    }

    #[test]
    fn test_upload_updates_progress() {
        let state = AppState::for_testing();
        register(&state, "jane@example.com");

        let result = upload(&state, DocumentSlot::Identity).unwrap();
        assert_eq!(result.status, DocumentStatus::Uploaded);
        assert_eq!(result.progress.percent, 30);
        assert_eq!(result.progress.current_step, "1/4 documents uploaded");

        // Re-uploading a slot does not double count
        let result = upload(&state, DocumentSlot::Identity).unwrap();
        assert_eq!(result.progress.percent, 30);
    }

    #[test]
    fn test_upload_requires_member() {
        let state = AppState::for_testing();
        let result = KycService::upload_document(
            &state,
            "ghost@example.com",
            DocumentSlot::Identity,
            Some("application/pdf"),
            PDF,
        );
        assert!(matches!(result, Err(AppError::NotFound(_))));
    }

    #[test]
    fn test_rejected_upload_leaves_slot_pending() {
        let state = AppState::for_testing();
        register(&state, "jane@example.com");

        let result = KycService::upload_document(
            &state,
            "jane@example.com",
            DocumentSlot::Identity,
            Some("text/plain"),
            b"hello",
        );
        assert!(result.is_err());

        let overview = KycService::documents(&state, "jane@example.com").unwrap();
        assert!(overview.slots.iter().all(|s| s.status == DocumentStatus::Pending));
    }

    #[test]
    fn test_submit_requires_all_documents() {
        let state = AppState::for_testing();
        register(&state, "jane@example.com");
        upload(&state, DocumentSlot::Identity).unwrap();
        upload(&state, DocumentSlot::ProofOfAddress).unwrap();

        let err = KycService::submit_documents(&state, "jane@example.com").unwrap_err();
        assert_eq!(err.to_string(), "All four documents are required. Missing: tax.");
        assert!(!state.sqlite.documents_submitted("jane@example.com").unwrap());
    }

    #[test]
    fn test_submit_documents() {
        let state = AppState::for_testing();
        register(&state, "jane@example.com");
        for slot in DocumentSlot::ALL {
            upload(&state, slot).unwrap();
        }

        let result = KycService::submit_documents(&state, "jane@example.com").unwrap();
        assert_eq!(result.message, SUBMITTED_MESSAGE);
        assert_eq!(result.progress.percent, 60);
        assert_eq!(result.progress.current_step, "Sign agreement");

        let application = state.sqlite.get_application("jane@example.com").unwrap().unwrap();
        assert_eq!(application.documents_status, "submitted");

        // Second submission is accepted and changes nothing
        let again = KycService::submit_documents(&state, "jane@example.com").unwrap();
        assert_eq!(again.progress, result.progress);

        let overview = KycService::documents(&state, "jane@example.com").unwrap();
        assert!(overview.submitted);
        assert_eq!(overview.slots[0].label, "Passport / ID");
    }
}
