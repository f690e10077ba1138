use axum::{Json, response::IntoResponse};

use crate::api::extractors::AdminAuth;
use crate::state::AppState;

use super::{AdminApiError, event_to_admin_response};

/// `POST /event/cancel` — archive the scheduled event before it starts.
/// Fails with a conflict once the event is running (use stop for that).
pub async fn cancel_event(
    state: axum::extract::State<AppState>,
    _auth: AdminAuth,
) -> Result<impl IntoResponse, AdminApiError> {
    let event = state.lifecycle.cancel().await?;
    Ok(Json(event_to_admin_response(&event)))
}
