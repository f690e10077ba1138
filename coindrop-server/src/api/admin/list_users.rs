use axum::{Json, extract::Query, response::IntoResponse};
use coindrop_core::entities::bot_user::ListUsers;
use coindrop_core::framework::DatabaseProcessor;
use kanau::processor::Processor;
use serde::Deserialize;

use crate::api::extractors::AdminAuth;
use crate::state::AppState;

use super::AdminApiError;

#[derive(Debug, Deserialize)]
pub(crate) struct ListUsersQuery {
    #[serde(default)]
    banned: bool,
}

/// `GET /users?banned=false` — list directory users, banned or not.
pub async fn list_users(
    state: axum::extract::State<AppState>,
    _auth: AdminAuth,
    Query(query): Query<ListUsersQuery>,
) -> Result<impl IntoResponse, AdminApiError> {
    let processor = DatabaseProcessor {
        pool: state.db.clone(),
    };

    let users = processor
        .process(ListUsers {
            banned: query.banned,
        })
        .await
        .map_err(AdminApiError::Database)?;

    Ok(Json(users))
}
