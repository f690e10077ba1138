use axum::{Json, response::IntoResponse};
use serde::Deserialize;
use time::OffsetDateTime;

use crate::api::extractors::AdminAuth;
use crate::state::AppState;

use super::{AdminApiError, event_to_admin_response};

#[derive(Debug, Deserialize)]
pub(crate) struct ScheduleEventRequest {
    coins: i64,
    #[serde(with = "time::serde::rfc3339")]
    scheduled_at: OffsetDateTime,
    duration_secs: i64,
    #[serde(default)]
    surprise: bool,
}

/// `POST /event/schedule` — schedule an event to start at a future time.
pub async fn schedule_event(
    state: axum::extract::State<AppState>,
    _auth: AdminAuth,
    Json(req): Json<ScheduleEventRequest>,
) -> Result<impl IntoResponse, AdminApiError> {
    let event = state
        .lifecycle
        .schedule(
            req.coins,
            req.scheduled_at,
            time::Duration::seconds(req.duration_secs),
            req.surprise,
        )
        .await?;

    Ok(Json(event_to_admin_response(&event)))
}
