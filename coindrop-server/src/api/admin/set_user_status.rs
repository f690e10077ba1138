//! Moderation endpoints: ban, unban, and enlist by id or username.

use axum::{Json, extract::Path, response::IntoResponse};
use coindrop_core::entities::bot_user::{
    BotUser, GetUserById, GetUserByNameOrId, SetUserBanned, SetUserEnlisted,
};
use coindrop_core::framework::DatabaseProcessor;
use kanau::processor::Processor;

use crate::api::extractors::AdminAuth;
use crate::state::AppState;

use super::AdminApiError;

/// `POST /users/{identifier}/ban` — blacklist a user from the eligible list.
pub async fn ban_user(
    state: axum::extract::State<AppState>,
    _auth: AdminAuth,
    Path(identifier): Path<String>,
) -> Result<impl IntoResponse, AdminApiError> {
    set_banned(&state, identifier, true).await
}

/// `POST /users/{identifier}/unban` — remove a user from the blacklist.
pub async fn unban_user(
    state: axum::extract::State<AppState>,
    _auth: AdminAuth,
    Path(identifier): Path<String>,
) -> Result<impl IntoResponse, AdminApiError> {
    set_banned(&state, identifier, false).await
}

/// `POST /users/{identifier}/enlist` — add a user to the eligible list.
/// Takes effect for the next event start; running events keep their
/// participant snapshot.
pub async fn enlist_user(
    state: axum::extract::State<AppState>,
    _auth: AdminAuth,
    Path(identifier): Path<String>,
) -> Result<impl IntoResponse, AdminApiError> {
    let processor = DatabaseProcessor {
        pool: state.db.clone(),
    };

    let user = lookup(&processor, identifier).await?;
    processor
        .process(SetUserEnlisted {
            user_id: user.id,
            enlisted: true,
        })
        .await
        .map_err(AdminApiError::Database)?;

    refetch(&processor, user.id).await
}

async fn set_banned(
    state: &AppState,
    identifier: String,
    banned: bool,
) -> Result<Json<BotUser>, AdminApiError> {
    let processor = DatabaseProcessor {
        pool: state.db.clone(),
    };

    let user = lookup(&processor, identifier).await?;
    processor
        .process(SetUserBanned {
            user_id: user.id,
            banned,
        })
        .await
        .map_err(AdminApiError::Database)?;

    refetch(&processor, user.id).await
}

async fn lookup(
    processor: &DatabaseProcessor,
    identifier: String,
) -> Result<BotUser, AdminApiError> {
    processor
        .process(GetUserByNameOrId { identifier })
        .await
        .map_err(AdminApiError::Database)?
        .ok_or(AdminApiError::NotFound)
}

async fn refetch(
    processor: &DatabaseProcessor,
    user_id: i64,
) -> Result<Json<BotUser>, AdminApiError> {
    let user = processor
        .process(GetUserById { user_id })
        .await
        .map_err(AdminApiError::Database)?
        .ok_or(AdminApiError::NotFound)?;
    Ok(Json(user))
}
