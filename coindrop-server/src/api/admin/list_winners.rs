use axum::{Json, extract::Path, response::IntoResponse};
use serde::Deserialize;

use crate::api::extractors::AdminAuth;
use crate::state::AppState;

use super::AdminApiError;

#[derive(Debug, Deserialize)]
pub(crate) struct ListWinnersRequest {
    count: i64,
}

/// `POST /events/{event_id}/winners` — draw winners for an event, or list
/// the previously drawn set. Repeated calls return the identical winners
/// until the selection is reset.
pub async fn list_winners(
    state: axum::extract::State<AppState>,
    _auth: AdminAuth,
    Path(event_id): Path<i64>,
    Json(req): Json<ListWinnersRequest>,
) -> Result<impl IntoResponse, AdminApiError> {
    let winners = state.winners.select(event_id, req.count).await?;
    Ok(Json(winners))
}
