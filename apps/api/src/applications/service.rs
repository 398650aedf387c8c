//! Submission, listing and status updates for job applications.
//!
//! Every operation takes the caller resolved by the auth middleware (if any) and
//! the store handle from `AppState`. Store failures become `AppError::Internal`.

use tracing::{info, warn};
use uuid::Uuid;

use crate::applications::validation::{SubmitApplicationRequest, UpdateStatusRequest};
use crate::auth::Caller;
use crate::errors::AppError;
use crate::models::application::{ApplicationWithOwner, JobApplication};
use crate::store::ApplicationStore;

fn require_caller(caller: Option<&Caller>) -> Result<&Caller, AppError> {
    caller.ok_or_else(|| {
        warn!("Rejected request without an authenticated user");
        AppError::Unauthorized
    })
}

/// Creates a new application owned by the caller.
pub async fn submit_application(
    store: &dyn ApplicationStore,
    caller: Option<&Caller>,
    request: SubmitApplicationRequest,
) -> Result<JobApplication, AppError> {
    let caller = require_caller(caller)?;

    let new = request.into_new_application(caller.id).map_err(|missing| {
        warn!(user_id = %caller.id, ?missing, "Application rejected: missing required fields");
        AppError::Validation("Please provide all required fields".to_string())
    })?;

    let application = store.create_application(new).await?;
    info!(
        application_id = %application.id,
        user_id = %caller.id,
        company = %application.company,
        "Application submitted"
    );
    Ok(application)
}

/// The caller's own applications, newest first.
pub async fn list_my_applications(
    store: &dyn ApplicationStore,
    caller: Option<&Caller>,
) -> Result<Vec<JobApplication>, AppError> {
    let caller = require_caller(caller)?;
    Ok(store.find_applications_by_owner(caller.id).await?)
}

/// Every application with owner name and email. Admins only.
pub async fn list_all_applications(
    store: &dyn ApplicationStore,
    caller: Option<&Caller>,
) -> Result<Vec<ApplicationWithOwner>, AppError> {
    let caller = require_caller(caller)?;
    if !caller.is_admin() {
        warn!(user_id = %caller.id, "Non-admin attempted to list all applications");
        return Err(AppError::Forbidden(
            "Not authorized to view all applications".to_string(),
        ));
    }
    Ok(store.find_all_applications().await?)
}

/// Resolves an application the caller is allowed to modify.
pub async fn find_owned_application(
    store: &dyn ApplicationStore,
    caller: Option<&Caller>,
    application_id: &str,
) -> Result<JobApplication, AppError> {
    let caller = require_caller(caller)?;

    let not_found = || AppError::NotFound("Application not found".to_string());
    let id = Uuid::parse_str(application_id).map_err(|_| not_found())?;
    let application = store.find_application(id).await?.ok_or_else(not_found)?;

    if application.user != caller.id {
        warn!(application_id = %id, user_id = %caller.id, "Status update by non-owner refused");
        return Err(AppError::Forbidden(
            "Not authorized to update this application".to_string(),
        ));
    }
    Ok(application)
}

/// Applies the requested status to an already authorized application. An absent
/// status leaves the record untouched.
pub async fn apply_status_update(
    store: &dyn ApplicationStore,
    mut application: JobApplication,
    request: UpdateStatusRequest,
) -> Result<JobApplication, AppError> {
    let Some(status) = request.parsed_status().map_err(AppError::Validation)? else {
        return Ok(application);
    };

    application.status = status;
    let updated = store.save_application(&application).await?;
    info!(application_id = %updated.id, %status, "Application status updated");
    Ok(updated)
}

/// Sets the status of one of the caller's applications.
pub async fn update_application_status(
    store: &dyn ApplicationStore,
    caller: Option<&Caller>,
    application_id: &str,
    request: UpdateStatusRequest,
) -> Result<JobApplication, AppError> {
    let application = find_owned_application(store, caller, application_id).await?;
    apply_status_update(store, application, request).await
}
