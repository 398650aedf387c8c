//! Axum route handlers for the Applications API.

use axum::{
    body::Bytes,
    extract::{rejection::JsonRejection, Path, State},
    http::StatusCode,
    Json,
};
use serde::Serialize;

use crate::applications::service;
use crate::applications::validation::{SubmitApplicationRequest, UpdateStatusRequest};
use crate::auth::Caller;
use crate::errors::AppError;
use crate::models::application::{ApplicationWithOwner, JobApplication};
use crate::state::AppState;

// ────────────────────────────────────────────────────────────────────────────
// Response types
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
pub struct ApplicationResponse {
    pub success: bool,
    pub message: &'static str,
    pub application: JobApplication,
}

#[derive(Debug, Serialize)]
pub struct ApplicationListResponse<T> {
    pub success: bool,
    pub count: usize,
    pub applications: Vec<T>,
}

impl<T> ApplicationListResponse<T> {
    fn new(applications: Vec<T>) -> Self {
        ApplicationListResponse {
            success: true,
            count: applications.len(),
            applications,
        }
    }
}

fn json_body<T>(payload: Result<Json<T>, JsonRejection>) -> Result<T, AppError> {
    payload
        .map(|Json(body)| body)
        .map_err(|rejection| AppError::Validation(rejection.body_text()))
}

// ────────────────────────────────────────────────────────────────────────────
// Handlers
// ────────────────────────────────────────────────────────────────────────────

/// POST /api/applications
pub async fn handle_submit(
    State(state): State<AppState>,
    caller: Option<Caller>,
    payload: Result<Json<SubmitApplicationRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<ApplicationResponse>), AppError> {
    // An anonymous caller is rejected before the body is looked at.
    let caller = caller.ok_or(AppError::Unauthorized)?;
    let request = json_body(payload)?;

    let application =
        service::submit_application(state.store.as_ref(), Some(&caller), request).await?;

    Ok((
        StatusCode::CREATED,
        Json(ApplicationResponse {
            success: true,
            message: "Application submitted successfully",
            application,
        }),
    ))
}

/// GET /api/applications
pub async fn handle_list_mine(
    State(state): State<AppState>,
    caller: Option<Caller>,
) -> Result<Json<ApplicationListResponse<JobApplication>>, AppError> {
    let applications = service::list_my_applications(state.store.as_ref(), caller.as_ref()).await?;
    Ok(Json(ApplicationListResponse::new(applications)))
}

/// GET /api/applications/all
pub async fn handle_list_all(
    State(state): State<AppState>,
    caller: Option<Caller>,
) -> Result<Json<ApplicationListResponse<ApplicationWithOwner>>, AppError> {
    let applications =
        service::list_all_applications(state.store.as_ref(), caller.as_ref()).await?;
    Ok(Json(ApplicationListResponse::new(applications)))
}

/// PUT /api/applications/:id
///
/// The body is decoded only after the caller is known to own the record, so
/// unknown ids and non-owners get 404/403 whatever they sent. An empty body is
/// the same as `{}`.
pub async fn handle_update_status(
    State(state): State<AppState>,
    caller: Option<Caller>,
    Path(id): Path<String>,
    body: Bytes,
) -> Result<Json<ApplicationResponse>, AppError> {
    let store = state.store.as_ref();
    let existing = service::find_owned_application(store, caller.as_ref(), &id).await?;
    let request = UpdateStatusRequest::from_body(&body).map_err(AppError::Validation)?;

    let application = service::apply_status_update(store, existing, request).await?;

    Ok(Json(ApplicationResponse {
        success: true,
        message: "Application updated successfully",
        application,
    }))
}
