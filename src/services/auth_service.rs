//! Auth Service
//!
//! Member login against the stored Argon2 hash.

use crate::error::{AppError, Result};
use crate::onboarding::normalize_email;
use crate::state::AppState;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

#[derive(Debug, Clone, Default, Deserialize)]
pub struct LoginRequest {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
}

/// Result of a successful login
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginResult {
    pub redirect: String,
    pub full_name: String,
    pub email: String,
    pub is_admin: bool,
}

pub struct AuthService;

impl AuthService {
    pub fn login(state: &AppState, request: LoginRequest) -> Result<LoginResult> {
        let email = normalize_email(&request.email);
        if email.is_empty() || request.password.is_empty() {
            return Err(AppError::Validation("Email and password required.".to_string()));
        }

        let member = match state
            .sqlite
            .verify_member(&email, &request.password, &state.security)?
        {
            Some(member) => member,
            None => {
                warn!("Failed login for {}", email);
                return Err(AppError::Auth("Invalid email or password.".to_string()));
            }
        };

        info!("Member {} logged in", member.email);

        let redirect = if member.is_admin { "/admin" } else { "/dashboard" };

        Ok(LoginResult {
            redirect: redirect.to_string(),
            full_name: member.full_name,
            email: member.email,
            is_admin: member.is_admin,
        })
    }
}
