//! REST API types

use serde::{Deserialize, Serialize};

/// Standard API response envelope
#[derive(Debug, Clone, Serialize)]
pub struct ApiResponse<T: Serialize> {
    pub status: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
}

impl<T: Serialize> ApiResponse<T> {
    pub fn success_with_data(data: T) -> Self {
        Self {
            status: "success".to_string(),
            message: None,
            data: Some(data),
        }
    }

    pub fn success_with(message: &str, data: T) -> Self {
        Self {
            status: "success".to_string(),
            message: Some(message.to_string()),
            data: Some(data),
        }
    }
}

/// POST /api/kyc/submit
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SubmitDocumentsRequest {
    #[serde(default)]
    pub email: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct HealthData {
    pub service: &'static str,
    pub version: &'static str,
}
