use axum::{Json, response::IntoResponse};

use crate::api::extractors::AdminAuth;
use crate::state::AppState;

use super::{AdminApiError, event_to_admin_response};

/// `GET /event/last` — the most recently ended event. Winner draws usually
/// target this one.
pub async fn last_event(
    state: axum::extract::State<AppState>,
    _auth: AdminAuth,
) -> Result<impl IntoResponse, AdminApiError> {
    let event = state
        .lifecycle
        .last_ended()
        .await?
        .ok_or(AdminApiError::NotFound)?;
    Ok(Json(event_to_admin_response(&event)))
}
