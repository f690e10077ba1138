use axum::{extract::Path, http::StatusCode, response::IntoResponse};
use axum::Json;
use coindrop_core::entities::bot_user::SetPayoutAddress;
use coindrop_core::framework::DatabaseProcessor;
use kanau::processor::Processor;
use serde::Deserialize;

use crate::api::extractors::AdminAuth;
use crate::state::AppState;

use super::AdminApiError;

#[derive(Debug, Deserialize)]
pub(crate) struct RegisterAddressRequest {
    address: String,
}

/// `PUT /users/{user_id}/payout-address` — record where a user's winnings
/// go. The address arrives pre-validated by the embedding bot.
pub async fn register_address(
    state: axum::extract::State<AppState>,
    _auth: AdminAuth,
    Path(user_id): Path<i64>,
    Json(req): Json<RegisterAddressRequest>,
) -> Result<impl IntoResponse, AdminApiError> {
    let processor = DatabaseProcessor {
        pool: state.db.clone(),
    };

    let updated = processor
        .process(SetPayoutAddress {
            user_id,
            address: req.address,
        })
        .await
        .map_err(AdminApiError::Database)?;

    if updated == 0 {
        return Err(AdminApiError::NotFound);
    }

    Ok(StatusCode::NO_CONTENT)
}
