//! Caller identity extractor.
//!
//! Reads the caller from the `X-User-Id` header. Requests without one (or
//! with a blank value) act as the configured anonymous identity.
//!
//! The header is trusted as sent and is not authenticated. Owner checks
//! built on it attribute records to callers; they are not access control.

use std::convert::Infallible;

use axum::extract::FromRequestParts;
use axum::http::request::Parts;

use agenthub_types::agent::UserIdentity;

use crate::state::AppState;

pub const USER_ID_HEADER: &str = "x-user-id";

/// The identity a request acts as.
pub struct CallerIdentity(pub UserIdentity);

impl FromRequestParts<AppState> for CallerIdentity {
    type Rejection = Infallible;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        Ok(CallerIdentity(identity_from_parts(
            parts,
            &state.config.anonymous_identity,
        )))
    }
}

fn identity_from_parts(parts: &Parts, anonymous: &str) -> UserIdentity {
    parts
        .headers
        .get(USER_ID_HEADER)
        .and_then(|v| v.to_str().ok())
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(UserIdentity::new)
        .unwrap_or_else(|| UserIdentity::new(anonymous))
}
