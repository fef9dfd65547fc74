use std::convert::Infallible;

use axum::extract::FromRequestParts;
use axum::http::header::AUTHORIZATION;
use axum::http::request::Parts;
use axum::routing::{get, put};
use axum::Router;

use crate::app_state::AppState;
use crate::services::auth::AuthenticatedUser;

pub mod health;
pub mod matches;
pub mod metrics;

/// API routes sharing [`AppState`]. Layers and `/metrics` are added by the binary.
pub fn api_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_check))
        .route("/api/v1/matches", get(matches::list_matches))
        .route("/api/v1/matches/counts", get(matches::match_counts))
        .route(
            "/api/v1/matches/{evaluation_id}/status",
            put(matches::update_match_status),
        )
        .with_state(state)
}

/// The caller's identity from a `Bearer` session token, if it verifies.
///
/// Never rejects: read endpoints answer anonymous callers with empty results.
pub struct CurrentUser(pub Option<AuthenticatedUser>);

impl FromRequestParts<AppState> for CurrentUser {
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let Some(token) = parts
            .headers
            .get(AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .and_then(|value| value.strip_prefix("Bearer "))
        else {
            return Ok(CurrentUser(None));
        };

        match state.auth.verify(token.trim()) {
            Ok(user) => Ok(CurrentUser(Some(user))),
            Err(e) => {
                tracing::debug!(error = %e, "Ignoring invalid session token");
                Ok(CurrentUser(None))
            }
        }
    }
}
