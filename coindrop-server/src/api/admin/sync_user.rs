use axum::{Json, extract::Path, response::IntoResponse};
use coindrop_core::entities::bot_user::UpsertUser;
use coindrop_core::framework::DatabaseProcessor;
use compact_str::CompactString;
use kanau::processor::Processor;
use serde::Deserialize;

use crate::api::extractors::AdminAuth;
use crate::state::AppState;

use super::AdminApiError;

#[derive(Debug, Deserialize)]
pub(crate) struct SyncUserRequest {
    username: CompactString,
    #[serde(default)]
    first_name: CompactString,
    #[serde(default)]
    last_name: CompactString,
}

/// `PUT /users/{user_id}` — create or refresh a directory entry. The
/// embedding bot calls this as it observes users; flags are untouched.
pub async fn sync_user(
    state: axum::extract::State<AppState>,
    _auth: AdminAuth,
    Path(user_id): Path<i64>,
    Json(req): Json<SyncUserRequest>,
) -> Result<impl IntoResponse, AdminApiError> {
    let processor = DatabaseProcessor {
        pool: state.db.clone(),
    };

    let user = processor
        .process(UpsertUser {
            id: user_id,
            username: req.username,
            first_name: req.first_name,
            last_name: req.last_name,
        })
        .await
        .map_err(AdminApiError::Database)?;

    Ok(Json(user))
}
