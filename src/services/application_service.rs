//! Application Service
//!
//! Registers a member and records their investment application.

use crate::db::sqlite::models::{NewApplication, NewMember};
use crate::error::{AppError, Result};
use crate::onboarding::{normalize_email, ProgressSnapshot};
use crate::state::AppState;
use serde::{Deserialize, Deserializer, Serialize};
use tracing::info;

const MIN_PASSWORD_LENGTH: usize = 8;

/// Investor application form
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ApplicationRequest {
    pub full_name: String,
    pub email: String,
    pub phone: String,
    pub country: String,
    pub password: String,
    pub path: String,
    pub properties: Vec<String>,
    pub cities: Vec<String>,
    pub budget_range: String,
    #[serde(deserialize_with = "deserialize_flexible_f64")]
    pub share_range: f64,
    pub investment_goals: Vec<String>,
    pub timeline: String,
    pub property_types: Vec<String>,
    pub risk_tolerance: String,
    #[serde(deserialize_with = "deserialize_flexible_f64")]
    pub budget_min: f64,
    #[serde(deserialize_with = "deserialize_flexible_f64")]
    pub budget_max: f64,
}

/// Result of a successful application
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ApplicationResult {
    pub success: bool,
    pub application_id: String,
    pub email: String,
    pub progress: ProgressSnapshot,
}

/// Application service for business logic
pub struct ApplicationService;

impl ApplicationService {
    /// Validate the form, create the member and their pending application
    pub fn apply(state: &AppState, request: ApplicationRequest) -> Result<ApplicationResult> {
        let email = normalize_email(&request.email);
        let full_name = request.full_name.trim().to_string();

        if full_name.is_empty()
            || email.is_empty()
            || request.password.chars().count() < MIN_PASSWORD_LENGTH
        {
            return Err(AppError::Validation(
                "Full name, email, and password (min 8 chars) are required.".to_string(),
            ));
        }
        if !email.contains('@') {
            return Err(AppError::Validation("Enter a valid email address.".to_string()));
        }

        info!("ApplicationService::apply for {}", email);

        let member = NewMember {
            email: email.clone(),
            full_name: full_name.clone(),
            phone: request.phone.trim().to_string(),
            country: request.country.trim().to_string(),
        };

        let application = NewApplication {
            application_id: uuid::Uuid::new_v4().to_string(),
            member_email: email.clone(),
            full_name,
            path: request.path,
            properties: request.properties,
            cities: request.cities,
            budget_range: request.budget_range,
            share_range: request.share_range,
            investment_goals: request.investment_goals,
            timeline: request.timeline,
            property_types: request.property_types,
            risk_tolerance: request.risk_tolerance,
            budget_min: request.budget_min,
            budget_max: request.budget_max,
        };

        let (_, application) = state.sqlite.create_member_with_application(
            &member,
            &request.password,
            &application,
            &state.security,
        )?;

        Ok(ApplicationResult {
            success: true,
            application_id: application.application_id,
            progress: state.progress.notify(&email),
            email,
        })
    }
}

/// Accept numbers, numeric strings, empty strings and null; anything unparsable becomes 0
fn deserialize_flexible_f64<'de, D>(deserializer: D) -> std::result::Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum FlexibleFloat {
        Float(f64),
        Int(i64),
        Str(String),
        Other(serde_json::Value),
    }

    Ok(match FlexibleFloat::deserialize(deserializer)? {
        FlexibleFloat::Float(f) => f,
        FlexibleFloat::Int(i) => i as f64,
        FlexibleFloat::Str(s) => s.trim().parse().unwrap_or(0.0),
        FlexibleFloat::Other(_) => 0.0,
    })
}
