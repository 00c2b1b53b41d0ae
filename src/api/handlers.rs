//! REST API endpoint handlers
//!
//! Handlers are thin: they extract the request, hand it to a service and
//! wrap the result in [`ApiResponse`]. Errors render through `AppError`.

use crate::api::types::*;
use crate::error::{AppError, Result};
use crate::onboarding::{AgreementSubmission, DocumentSlot, ProgressSnapshot, ProgressView};
use crate::services::{
    AgreementResult, AgreementService, ApplicationRequest, ApplicationResult,
    ApplicationService, AuthService, DocumentsOverview, KycService, LoginRequest, LoginResult,
    ProgressService, SubmitResult, UploadResult,
};
use crate::state::AppState;
use axum::{
    body::Bytes,
    extract::{Json, Path, State},
    http::{header, HeaderMap},
    response::sse::{Event, KeepAlive, Sse},
};
use futures_util::stream::{self, Stream};
use std::sync::Arc;
use tracing::{debug, info};

type ApiResult<T> = Result<Json<ApiResponse<T>>>;

/// Run password hashing and other CPU-heavy service calls off the runtime
async fn blocking<T, F>(state: Arc<AppState>, f: F) -> Result<T>
where
    T: Send + 'static,
    F: FnOnce(&AppState) -> Result<T> + Send + 'static,
{
    tokio::task::spawn_blocking(move || f(&state))
        .await
        .map_err(|e| AppError::Internal(format!("Task failed: {}", e)))?
}

// ============================================================================
// Health Check
// ============================================================================

/// GET /health
pub async fn health_check() -> Json<ApiResponse<HealthData>> {
    Json(ApiResponse::success_with(
        "Investor onboarding API is running",
        HealthData {
            service: env!("CARGO_PKG_NAME"),
            version: env!("CARGO_PKG_VERSION"),
        },
    ))
}

// ============================================================================
// Application & Login
// ============================================================================

/// POST /api/apply
pub async fn apply(
    State(state): State<Arc<AppState>>,
    Json(request): Json<ApplicationRequest>,
) -> ApiResult<ApplicationResult> {
    let result = blocking(state, move |s| ApplicationService::apply(s, request)).await?;
    info!("Application {} received", result.application_id);
    Ok(Json(ApiResponse::success_with("Application received.", result)))
}

/// POST /api/login
pub async fn login(
    State(state): State<Arc<AppState>>,
    Json(request): Json<LoginRequest>,
) -> ApiResult<LoginResult> {
    let result = blocking(state, move |s| AuthService::login(s, request)).await?;
    Ok(Json(ApiResponse::success_with_data(result)))
}

// ============================================================================
// KYC
// ============================================================================

/// PUT /api/kyc/:email/:slot
///
/// The raw request body is the file; its type comes from `Content-Type`.
pub async fn upload_document(
    State(state): State<Arc<AppState>>,
    Path((email, slot)): Path<(String, String)>,
    headers: HeaderMap,
    body: Bytes,
) -> ApiResult<UploadResult> {
    let slot: DocumentSlot = slot.parse()?;
    let content_type = headers
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string);

    debug!("Upload {} for {} ({} bytes)", slot, email, body.len());

    let result = blocking(state, move |s| {
        KycService::upload_document(s, &email, slot, content_type.as_deref(), &body)
    })
    .await?;
    Ok(Json(ApiResponse::success_with_data(result)))
}

/// GET /api/kyc/:email
pub async fn get_documents(
    State(state): State<Arc<AppState>>,
    Path(email): Path<String>,
) -> ApiResult<DocumentsOverview> {
    let overview = KycService::documents(&state, &email)?;
    Ok(Json(ApiResponse::success_with_data(overview)))
}

/// POST /api/kyc/submit
pub async fn submit_documents(
    State(state): State<Arc<AppState>>,
    Json(request): Json<SubmitDocumentsRequest>,
) -> ApiResult<SubmitResult> {
    let result = KycService::submit_documents(&state, &request.email)?;
    let message = result.message.clone();
    Ok(Json(ApiResponse::success_with(&message, result)))
}

// ============================================================================
// Agreement
// ============================================================================

/// POST /api/agreement
pub async fn submit_agreement(
    State(state): State<Arc<AppState>>,
    Json(submission): Json<AgreementSubmission>,
) -> ApiResult<AgreementResult> {
    let result = AgreementService::submit_agreement(&state, submission)?;
    Ok(Json(ApiResponse::success_with("Agreement recorded.", result)))
}

// ============================================================================
// Progress
// ============================================================================

/// GET /api/progress/:email
pub async fn get_progress(
    State(state): State<Arc<AppState>>,
    Path(email): Path<String>,
) -> ApiResult<ProgressSnapshot> {
    let snapshot = ProgressService::get_progress(&state, &email)?;
    Ok(Json(ApiResponse::success_with_data(snapshot)))
}

/// GET /api/progress/:email/view
pub async fn get_progress_view(
    State(state): State<Arc<AppState>>,
    Path(email): Path<String>,
) -> ApiResult<ProgressView> {
    let view = ProgressService::get_view(&state, &email)?;
    Ok(Json(ApiResponse::success_with_data(view)))
}

/// GET /api/progress/:email/events
///
/// Server-sent events: the current snapshot first, then one `progress`
/// event per change.
pub async fn progress_events(
    State(state): State<Arc<AppState>>,
    Path(email): Path<String>,
) -> Result<Sse<impl Stream<Item = std::result::Result<Event, axum::Error>>>> {
    let rx = ProgressService::subscribe(&state, &email)?;
    info!("Progress subscriber attached for {}", email);

    let events = stream::unfold((rx, true), |(mut rx, first)| async move {
        if !first && rx.changed().await.is_err() {
            return None;
        }
        let snapshot = rx.borrow_and_update().clone();
        let event = Event::default().event("progress").json_data(&snapshot);
        Some((event, (rx, false)))
    });

    Ok(Sse::new(events).keep_alive(KeepAlive::default()))
}
