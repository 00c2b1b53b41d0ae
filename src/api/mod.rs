//! REST API for the investor website
//!
//! Endpoints:
//! - `POST /api/apply`, `POST /api/login`
//! - `PUT /api/kyc/{email}/{slot}`, `GET /api/kyc/{email}`, `POST /api/kyc/submit`
//! - `POST /api/agreement`
//! - `GET /api/progress/{email}` plus `/view` and `/events` (SSE)

pub mod handlers;
mod server;
mod types;

pub use server::{build_router, ApiServer};
pub use types::{ApiResponse, HealthData, SubmitDocumentsRequest};
