pub mod health;

use axum::{
    routing::{get, patch, post},
    Router,
};

use crate::analytics::handlers as analytics;
use crate::auth::handlers as auth;
use crate::posts::handlers as posts;
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        // Auth API
        .route("/api/v1/auth/signup", post(auth::handle_signup))
        .route("/api/v1/auth/login", post(auth::handle_login))
        .route("/api/v1/auth/me", get(auth::handle_me))
        // Posts API
        .route(
            "/api/v1/posts",
            post(posts::handle_create_post).get(posts::handle_list_posts),
        )
        .route("/api/v1/posts/:id", get(posts::handle_get_post))
        .route(
            "/api/v1/posts/:id/select",
            patch(posts::handle_select_option),
        )
        // Analytics API
        .route(
            "/api/v1/analytics/insights",
            get(analytics::handle_user_insights),
        )
        .route(
            "/api/v1/analytics/global",
            get(analytics::handle_global_insights),
        )
        .route(
            "/api/v1/analytics/suggestions",
            get(analytics::handle_suggestions),
        )
        .with_state(state)
}
