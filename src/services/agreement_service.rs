//! Agreement Service
//!
//! Records acceptance of the investor agreement with bank details and the
//! property shortlist.

use super::require_member;
use crate::error::Result;
use crate::onboarding::{AgreementRecordStore, AgreementSubmission, ProgressSnapshot};
use crate::state::AppState;
use serde::Serialize;
use tracing::info;

#[derive(Debug, Clone, Serialize)]
pub struct AgreementResult {
    pub success: bool,
    pub progress: ProgressSnapshot,
}

pub struct AgreementService;

impl AgreementService {
    /// Validate and store the agreement. A resubmission replaces the previous record.
    pub fn submit_agreement(
        state: &AppState,
        submission: AgreementSubmission,
    ) -> Result<AgreementResult> {
        let email = require_member(state, &submission.email)?;
        let record = submission.into_record(chrono::Utc::now().to_rfc3339())?;

        state.sqlite.set_agreement(&email, &record)?;
        info!(
            "Agreement recorded for {} ({} shortlisted)",
            email,
            record.shortlist.len()
        );

        Ok(AgreementResult {
            success: true,
            progress: state.progress.notify(&email),
        })
    }
}
