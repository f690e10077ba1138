//! Public event view.
//!
//! What a non-privileged community member may see: a surprise event does not
//! exist until it starts; once any event is running, its end time is public.

use axum::{Json, extract::State, http::StatusCode, response::IntoResponse};
use coindrop_core::entities::event::GiveawayEvent;
use serde::Serialize;
use time::OffsetDateTime;

use crate::state::AppState;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum PublicEventView {
    /// No visible event.
    None,
    /// An announced upcoming event.
    Scheduled {
        #[serde(with = "time::serde::rfc3339")]
        starts_at: OffsetDateTime,
        coins: i64,
        duration_secs: i64,
    },
    /// A running event.
    Running {
        #[serde(with = "time::serde::rfc3339")]
        ends_at: OffsetDateTime,
        coins: i64,
    },
}

/// `GET /event` — the current event as a non-admin observer may see it.
pub async fn get_current_event(
    state: State<AppState>,
) -> Result<Json<PublicEventView>, PublicApiError> {
    let current = state.lifecycle.current().await.map_err(PublicApiError)?;
    Ok(Json(public_view(current.as_ref())))
}

/// Opaque failure for the read-only public surface.
pub struct PublicApiError(coindrop_core::error::CoreError);

impl IntoResponse for PublicApiError {
    fn into_response(self) -> axum::response::Response {
        tracing::error!(error = %self.0, "Public API error");
        (StatusCode::INTERNAL_SERVER_ERROR, "internal server error").into_response()
    }
}

/// Apply the surprise-masking rules to the current event.
fn public_view(event: Option<&GiveawayEvent>) -> PublicEventView {
    let Some(event) = event else {
        return PublicEventView::None;
    };

    if let Some(ends_at) = event.ends_at() {
        // Running events are public, surprise or not.
        return PublicEventView::Running {
            ends_at,
            coins: event.coins,
        };
    }

    if event.surprise {
        return PublicEventView::None;
    }

    match event.scheduled_at {
        Some(starts_at) => PublicEventView::Scheduled {
            starts_at,
            coins: event.coins,
            duration_secs: event.duration_secs,
        },
        None => PublicEventView::None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::macros::datetime;

    const AT: OffsetDateTime = datetime!(2024-05-01 12:00 UTC);

    fn event(surprise: bool, started: bool) -> GiveawayEvent {
        GiveawayEvent {
            id: 1,
            coins: 500,
            duration_secs: 7200,
            scheduled_at: Some(AT),
            started_at: started.then_some(AT),
            ended_at: None,
            surprise,
        }
    }

    #[test]
    fn no_event_shows_none() {
        assert_eq!(public_view(None), PublicEventView::None);
    }

    #[test]
    fn announced_schedule_is_visible() {
        assert_eq!(
            public_view(Some(&event(false, false))),
            PublicEventView::Scheduled {
                starts_at: AT,
                coins: 500,
                duration_secs: 7200,
            }
        );
    }

    #[test]
    fn surprise_event_is_hidden_until_it_starts() {
        assert_eq!(public_view(Some(&event(true, false))), PublicEventView::None);
    }

    #[test]
    fn running_surprise_event_is_public() {
        assert_eq!(
            public_view(Some(&event(true, true))),
            PublicEventView::Running {
                ends_at: AT + time::Duration::hours(2),
                coins: 500,
            }
        );
    }

    #[test]
    fn view_serializes_with_a_status_tag() {
        let value = serde_json::to_value(PublicEventView::None).unwrap();
        assert_eq!(value, serde_json::json!({ "status": "none" }));
    }
}
