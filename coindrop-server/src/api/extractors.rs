//! Custom Axum extractors for request authentication.
//!
//! Provides `AdminAuth`, which verifies the `Coindrop-Admin-Authorization`
//! header against the argon2-hashed admin secret from the runtime config.

use axum::{
    extract::FromRequestParts,
    http::{StatusCode, request::Parts},
    response::{IntoResponse, Response},
};

use crate::config::verify_admin_secret;
use crate::state::AppState;

/// Header carrying the plaintext admin secret.
pub const ADMIN_AUTH_HEADER: &str = "coindrop-admin-authorization";

/// An Axum extractor that authenticates operator requests.
pub struct AdminAuth;

/// Errors returned by the [`AdminAuth`] extractor.
#[derive(Debug)]
pub enum AdminAuthError {
    MissingHeader,
    InvalidHeader,
    Unauthorized,
}

impl IntoResponse for AdminAuthError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            AdminAuthError::MissingHeader => (
                StatusCode::UNAUTHORIZED,
                "missing Coindrop-Admin-Authorization header",
            ),
            AdminAuthError::InvalidHeader => {
                (StatusCode::BAD_REQUEST, "invalid authorization header")
            }
            AdminAuthError::Unauthorized => (StatusCode::UNAUTHORIZED, "invalid admin secret"),
        };
        (status, message).into_response()
    }
}

impl FromRequestParts<AppState> for AdminAuth {
    type Rejection = AdminAuthError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let secret = parts
            .headers
            .get(ADMIN_AUTH_HEADER)
            .ok_or(AdminAuthError::MissingHeader)?
            .to_str()
            .map_err(|_| AdminAuthError::InvalidHeader)?;

        let config = state.config.read().await;
        if verify_admin_secret(secret, &config.admin_secret_hash) {
            Ok(AdminAuth)
        } else {
            Err(AdminAuthError::Unauthorized)
        }
    }
}
