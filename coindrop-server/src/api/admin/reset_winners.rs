use axum::{extract::Path, http::StatusCode, response::IntoResponse};

use crate::api::extractors::AdminAuth;
use crate::state::AppState;

use super::AdminApiError;

/// `DELETE /events/{event_id}/winners` — discard the recorded winner
/// selection, permitting exactly one new draw. Resetting an event that was
/// never drawn is a no-op.
pub async fn reset_winners(
    state: axum::extract::State<AppState>,
    _auth: AdminAuth,
    Path(event_id): Path<i64>,
) -> Result<impl IntoResponse, AdminApiError> {
    state.winners.reset(event_id).await?;
    Ok(StatusCode::NO_CONTENT)
}
