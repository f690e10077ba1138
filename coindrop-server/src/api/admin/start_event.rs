use axum::{Json, response::IntoResponse};
use serde::Deserialize;

use crate::api::extractors::AdminAuth;
use crate::state::AppState;

use super::{AdminApiError, event_to_admin_response};

#[derive(Debug, Deserialize)]
pub(crate) struct StartEventRequest {
    coins: i64,
    duration_secs: i64,
}

/// `POST /event/start` — start an event immediately, enrolling the users
/// eligible right now.
pub async fn start_event(
    state: axum::extract::State<AppState>,
    _auth: AdminAuth,
    Json(req): Json<StartEventRequest>,
) -> Result<impl IntoResponse, AdminApiError> {
    let event = state
        .lifecycle
        .start(req.coins, time::Duration::seconds(req.duration_secs))
        .await?;

    Ok(Json(event_to_admin_response(&event)))
}
