use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use garde::Validate;
use uuid::Uuid;

use crate::app_state::AppState;
use crate::models::dashboard::{MatchCounts, MatchPageResponse, MatchQueryParams, StatusUpdateRequest};
use crate::routes::CurrentUser;

/// GET /api/v1/matches — one page of the caller's matches.
pub async fn list_matches(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Query(params): Query<MatchQueryParams>,
) -> Result<Json<MatchPageResponse>, (StatusCode, String)> {
    let filters = params
        .filters()
        .map_err(|e| (StatusCode::BAD_REQUEST, e.to_string()))?;
    let sort = params
        .sort()
        .map_err(|e| (StatusCode::BAD_REQUEST, e.to_string()))?;
    let page = params.page(state.default_page_size);
    page.validate()
        .map_err(|e| (StatusCode::BAD_REQUEST, e.to_string()))?;

    let matches = state
        .dashboard
        .load_page(user.as_ref(), page, &filters, sort)
        .await;

    Ok(Json(MatchPageResponse {
        offset: page.offset,
        limit: page.limit,
        matches,
    }))
}

/// GET /api/v1/matches/counts — filtered and baseline counts.
pub async fn match_counts(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Query(params): Query<MatchQueryParams>,
) -> Result<Json<MatchCounts>, (StatusCode, String)> {
    let filters = params
        .filters()
        .map_err(|e| (StatusCode::BAD_REQUEST, e.to_string()))?;

    Ok(Json(state.dashboard.get_counts(user.as_ref(), &filters).await))
}

/// PUT /api/v1/matches/{evaluation_id}/status — save, apply, hide or mark viewed.
pub async fn update_match_status(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(evaluation_id): Path<Uuid>,
    Json(body): Json<StatusUpdateRequest>,
) -> Result<StatusCode, (StatusCode, String)> {
    let user = user.ok_or((StatusCode::UNAUTHORIZED, "Authentication required".to_string()))?;

    match state
        .dashboard
        .update_status(&user, evaluation_id, body.status)
        .await
    {
        Ok(true) => Ok(StatusCode::NO_CONTENT),
        Ok(false) => Err((StatusCode::NOT_FOUND, "Match not found".to_string())),
        Err(e) => {
            tracing::error!(error = %e, %evaluation_id, "Failed to update match status");
            Err((
                StatusCode::INTERNAL_SERVER_ERROR,
                "Failed to update match status".to_string(),
            ))
        }
    }
}
