//! Admin API handlers.
//!
//! These endpoints stand in for the chat command layer and require the
//! `Coindrop-Admin-Authorization` header with the plaintext admin secret.
//!
//! # Endpoints
//!
//! - `GET    /event`                        – current event, unmasked
//! - `GET    /event/last`                   – most recently ended event
//! - `POST   /event/schedule`               – schedule an event
//! - `POST   /event/start`                  – start an event immediately
//! - `POST   /event/stop`                   – stop the running event
//! - `POST   /event/cancel`                 – cancel the scheduled event
//! - `POST   /events/{id}/winners`          – draw (or re-list) winners
//! - `DELETE /events/{id}/winners`          – reset winners for one re-draw
//! - `GET    /users`                        – list directory users
//! - `PUT    /users/{id}`                   – sync a user's display fields
//! - `POST   /users/{identifier}/ban`       – ban a user
//! - `POST   /users/{identifier}/unban`     – unban a user
//! - `POST   /users/{identifier}/enlist`    – add a user to the eligible list
//! - `PUT    /users/{id}/payout-address`    – record a payout address

use axum::{
    Router,
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post, put},
};
use coindrop_core::entities::event::GiveawayEvent;
use coindrop_core::error::CoreError;
use serde::Serialize;
use time::OffsetDateTime;

use crate::state::AppState;

mod cancel_event;
mod current_event;
mod last_event;
mod list_users;
mod list_winners;
mod register_address;
mod reset_winners;
mod schedule_event;
mod set_user_status;
mod start_event;
mod stop_event;
mod sync_user;

/// Build the Admin API router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/event", get(current_event::current_event))
        .route("/event/last", get(last_event::last_event))
        .route("/event/schedule", post(schedule_event::schedule_event))
        .route("/event/start", post(start_event::start_event))
        .route("/event/stop", post(stop_event::stop_event))
        .route("/event/cancel", post(cancel_event::cancel_event))
        .route(
            "/events/{event_id}/winners",
            post(list_winners::list_winners).delete(reset_winners::reset_winners),
        )
        .route("/users", get(list_users::list_users))
        .route("/users/{user_id}", put(sync_user::sync_user))
        .route("/users/{identifier}/ban", post(set_user_status::ban_user))
        .route("/users/{identifier}/unban", post(set_user_status::unban_user))
        .route(
            "/users/{identifier}/enlist",
            post(set_user_status::enlist_user),
        )
        .route(
            "/users/{user_id}/payout-address",
            put(register_address::register_address),
        )
}

// ---------------------------------------------------------------------------
// Shared error type
// ---------------------------------------------------------------------------

/// Errors that can occur in Admin API handlers.
#[derive(Debug)]
pub(crate) enum AdminApiError {
    Core(CoreError),
    Database(sqlx::Error),
    NotFound,
}

impl From<CoreError> for AdminApiError {
    fn from(err: CoreError) -> Self {
        AdminApiError::Core(err)
    }
}

impl IntoResponse for AdminApiError {
    fn into_response(self) -> axum::response::Response {
        match self {
            AdminApiError::Core(CoreError::InvalidArgument(msg)) => {
                (StatusCode::BAD_REQUEST, msg).into_response()
            }
            AdminApiError::Core(CoreError::StateConflict(msg)) => {
                (StatusCode::CONFLICT, msg).into_response()
            }
            AdminApiError::Core(err @ CoreError::NotFound(_)) => {
                (StatusCode::NOT_FOUND, err.to_string()).into_response()
            }
            AdminApiError::Core(CoreError::Persistence(e)) => {
                tracing::error!(error = %e, "Admin API storage error");
                (StatusCode::INTERNAL_SERVER_ERROR, "internal server error").into_response()
            }
            AdminApiError::Database(e) => {
                tracing::error!(error = %e, "Admin API database error");
                (StatusCode::INTERNAL_SERVER_ERROR, "internal server error").into_response()
            }
            AdminApiError::NotFound => {
                (StatusCode::NOT_FOUND, "resource not found").into_response()
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Conversion helpers
// ---------------------------------------------------------------------------

/// Event as reported to operators: the raw row plus the derived end time.
#[derive(Debug, Serialize)]
pub(crate) struct AdminEventResponse {
    pub id: i64,
    pub coins: i64,
    pub duration_secs: i64,
    #[serde(with = "time::serde::rfc3339::option")]
    pub scheduled_at: Option<OffsetDateTime>,
    #[serde(with = "time::serde::rfc3339::option")]
    pub started_at: Option<OffsetDateTime>,
    #[serde(with = "time::serde::rfc3339::option")]
    pub ended_at: Option<OffsetDateTime>,
    #[serde(with = "time::serde::rfc3339::option")]
    pub ends_at: Option<OffsetDateTime>,
    pub surprise: bool,
}

pub(crate) fn event_to_admin_response(event: &GiveawayEvent) -> AdminEventResponse {
    AdminEventResponse {
        id: event.id,
        coins: event.coins,
        duration_secs: event.duration_secs,
        scheduled_at: event.scheduled_at,
        started_at: event.started_at,
        ended_at: event.ended_at,
        ends_at: event.ends_at(),
        surprise: event.surprise,
    }
}
