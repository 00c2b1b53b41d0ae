//! Services Layer
//!
//! Business logic behind the HTTP API. Every service that writes to an
//! onboarding store notifies the progress hub afterwards, so subscribers see
//! the new state without waiting for the poller.
//!
//! # Architecture
//!
//! ```text
//! Website --> REST API --> Services --> SQLite stores
//!                             │
//!                             └──> ProgressHub --> SSE subscribers
//! ```
//!
//! # Services
//!
//! - `ApplicationService` - Investor application and member registration
//! - `AuthService` - Member login
//! - `KycService` - Document upload validation and batch submission
//! - `AgreementService` - Investor agreement and bank details
//! - `ProgressService` - Progress snapshots and tracker view

pub mod agreement_service;
pub mod application_service;
pub mod auth_service;
pub mod kyc_service;
pub mod progress_service;

pub use agreement_service::{AgreementResult, AgreementService};
pub use application_service::{ApplicationRequest, ApplicationResult, ApplicationService};
pub use auth_service::{AuthService, LoginRequest, LoginResult};
pub use kyc_service::{DocumentsOverview, KycService, SlotOverview, SubmitResult, UploadResult};
pub use progress_service::ProgressService;

use crate::error::{AppError, Result};
use crate::onboarding::normalize_email;
use crate::state::AppState;

/// Normalize a request email and make sure a member owns it
fn require_member(state: &AppState, email: &str) -> Result<String> {
    let email = require_email(email)?;
    if !state.sqlite.member_exists(&email)? {
        return Err(AppError::NotFound(
            "No application found for this email.".to_string(),
        ));
    }
    Ok(email)
}

fn require_email(email: &str) -> Result<String> {
    let email = normalize_email(email);
    if email.is_empty() {
        return Err(AppError::Validation("Email is required.".to_string()));
    }
    Ok(email)
}
