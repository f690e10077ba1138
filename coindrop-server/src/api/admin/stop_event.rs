use axum::{Json, response::IntoResponse};

use crate::api::extractors::AdminAuth;
use crate::state::AppState;

use super::{AdminApiError, event_to_admin_response};

/// `POST /event/stop` — end the running event. Fails with a conflict when
/// the current event has not started (use cancel for that).
pub async fn stop_event(
    state: axum::extract::State<AppState>,
    _auth: AdminAuth,
) -> Result<impl IntoResponse, AdminApiError> {
    let event = state.lifecycle.stop().await?;
    Ok(Json(event_to_admin_response(&event)))
}
