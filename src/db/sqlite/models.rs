//! SQLite database models

use serde::{Deserialize, Serialize};

/// Registered investor
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Member {
    pub id: i64,
    pub email: String,
    pub full_name: String,
    pub phone: String,
    pub country: String,
    pub is_admin: bool,
    pub created_at: String,
}

/// Member fields captured at application time
#[derive(Debug, Clone, Default)]
pub struct NewMember {
    pub email: String,
    pub full_name: String,
    pub phone: String,
    pub country: String,
}

/// Investment application model
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Application {
    pub id: i64,
    pub application_id: String,
    pub member_email: String,
    pub full_name: String,
    pub path: String,
    pub properties: Vec<String>,
    pub cities: Vec<String>,
    pub budget_range: String,
    pub share_range: f64,
    pub investment_goals: Vec<String>,
    pub timeline: String,
    pub property_types: Vec<String>,
    pub risk_tolerance: String,
    pub budget_min: f64,
    pub budget_max: f64,
    pub status: String,
    pub kyc_status: String,
    pub documents_status: String,
    pub created_at: String,
}

/// Application fields supplied by the investor
#[derive(Debug, Clone, Default)]
pub struct NewApplication {
    pub application_id: String,
    pub member_email: String,
    pub full_name: String,
    pub path: String,
    pub properties: Vec<String>,
    pub cities: Vec<String>,
    pub budget_range: String,
    pub share_range: f64,
    pub investment_goals: Vec<String>,
    pub timeline: String,
    pub property_types: Vec<String>,
    pub risk_tolerance: String,
    pub budget_min: f64,
    pub budget_max: f64,
}
