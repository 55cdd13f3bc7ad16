use axum::{extract::State, Json};

use crate::analytics::insights::{
    global_insights, suggestions, user_insights, GlobalInsights, SuggestionsResponse,
    UserInsights,
};
use crate::auth::extractor::AuthUser;
use crate::errors::AppError;
use crate::state::AppState;

/// GET /api/v1/analytics/insights
pub async fn handle_user_insights(
    State(state): State<AppState>,
    auth: AuthUser,
) -> Result<Json<UserInsights>, AppError> {
    Ok(Json(user_insights(&state.db, auth.id).await?))
}

/// GET /api/v1/analytics/global
///
/// Platform-wide; any authenticated user may read it.
pub async fn handle_global_insights(
    State(state): State<AppState>,
    _auth: AuthUser,
) -> Result<Json<GlobalInsights>, AppError> {
    Ok(Json(global_insights(&state.db).await?))
}

/// GET /api/v1/analytics/suggestions
pub async fn handle_suggestions(
    State(state): State<AppState>,
    auth: AuthUser,
) -> Result<Json<SuggestionsResponse>, AppError> {
    Ok(Json(suggestions(&state.db, auth.id).await?))
}
