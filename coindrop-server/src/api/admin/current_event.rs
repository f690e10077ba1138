use axum::{Json, response::IntoResponse};

use crate::api::extractors::AdminAuth;
use crate::state::AppState;

use super::{AdminApiError, event_to_admin_response};

/// `GET /event` — the current event with nothing masked. Admins see
/// surprise events and their timing.
pub async fn current_event(
    state: axum::extract::State<AppState>,
    _auth: AdminAuth,
) -> Result<impl IntoResponse, AdminApiError> {
    let event = state
        .lifecycle
        .current()
        .await?
        .ok_or(AdminApiError::NotFound)?;
    Ok(Json(event_to_admin_response(&event)))
}
