//! Progress Service
//!
//! Read side of the onboarding tracker.

use super::require_email;
use crate::error::Result;
use crate::onboarding::{ProgressSnapshot, ProgressView};
use crate::state::AppState;
use tokio::sync::watch;

pub struct ProgressService;

impl ProgressService {
    /// Current snapshot. Unknown investors get the fresh-application state.
    pub fn get_progress(state: &AppState, email: &str) -> Result<ProgressSnapshot> {
        let email = require_email(email)?;
        Ok(state.progress.snapshot(&email))
    }

    /// Tracker view model for the dashboard
    pub fn get_view(state: &AppState, email: &str) -> Result<ProgressView> {
        let snapshot = Self::get_progress(state, email)?;
        Ok(ProgressView::from(&snapshot))
    }

    /// Live snapshots for one investor
    pub fn subscribe(state: &AppState, email: &str) -> Result<watch::Receiver<ProgressSnapshot>> {
        let email = require_email(email)?;
        Ok(state.progress.subscribe(&email))
    }
}
