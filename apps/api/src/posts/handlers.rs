//! Axum route handlers for the Posts API.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use serde::Deserialize;
use tracing::info;
use uuid::Uuid;

use crate::auth::extractor::AuthUser;
use crate::errors::AppError;
use crate::models::post::{ContentType, PostResponse, SelectedOption};
use crate::posts::store::{find_post_for_user, insert_post, list_posts_for_user, record_selection};
use crate::state::AppState;

/// Longest prompt accepted, in characters.
pub const MAX_PROMPT_CHARS: usize = 2000;

// ────────────────────────────────────────────────────────────────────────────
// Request types
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct CreatePostRequest {
    pub prompt: String,
    #[serde(rename = "type")]
    pub content_type: ContentType,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SelectOptionRequest {
    pub selected_option: SelectedOption,
}

/// Trims the prompt and enforces the non-blank and length rules.
pub fn validate_prompt(prompt: &str) -> Result<&str, AppError> {
    let prompt = prompt.trim();
    if prompt.is_empty() {
        return Err(AppError::Validation("prompt cannot be empty".to_string()));
    }
    if prompt.chars().count() > MAX_PROMPT_CHARS {
        return Err(AppError::Validation(format!(
            "prompt must be at most {MAX_PROMPT_CHARS} characters"
        )));
    }
    Ok(prompt)
}

// ────────────────────────────────────────────────────────────────────────────
// Handlers
// ────────────────────────────────────────────────────────────────────────────

/// POST /api/v1/posts
///
/// Generates two caption alternatives and stores them as a new post.
pub async fn handle_create_post(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(request): Json<CreatePostRequest>,
) -> Result<(StatusCode, Json<PostResponse>), AppError> {
    let prompt = validate_prompt(&request.prompt)?;

    let content = state
        .generator
        .generate_content(prompt, request.content_type)
        .await?;

    let post = insert_post(&state.db, auth.id, prompt, request.content_type, &content).await?;

    info!(
        "Created {} post {} for user {} via {} in {}ms",
        request.content_type.as_str(),
        post.post.id,
        auth.id,
        content.ai_model,
        content.response_time_ms
    );

    Ok((StatusCode::CREATED, Json(post.into())))
}

/// GET /api/v1/posts
pub async fn handle_list_posts(
    State(state): State<AppState>,
    auth: AuthUser,
) -> Result<Json<Vec<PostResponse>>, AppError> {
    let posts = list_posts_for_user(&state.db, auth.id).await?;
    Ok(Json(posts.into_iter().map(PostResponse::from).collect()))
}

/// GET /api/v1/posts/:id
pub async fn handle_get_post(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(post_id): Path<Uuid>,
) -> Result<Json<PostResponse>, AppError> {
    let post = find_post_for_user(&state.db, auth.id, post_id).await?;
    Ok(Json(post.into()))
}

/// PATCH /api/v1/posts/:id/select
///
/// Records which option the user picked. A post can be selected once.
pub async fn handle_select_option(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(post_id): Path<Uuid>,
    Json(request): Json<SelectOptionRequest>,
) -> Result<Json<PostResponse>, AppError> {
    let post = record_selection(&state.db, auth.id, post_id, request.selected_option).await?;
    info!(
        "User {} selected option {} for post {}",
        auth.email,
        request.selected_option.as_str(),
        post_id
    );
    Ok(Json(post.into()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_prompt_trims() {
        assert_eq!(validate_prompt("  summer sale  ").unwrap(), "summer sale");
    }

    #[test]
    fn test_validate_prompt_rejects_blank() {
        assert!(matches!(validate_prompt("   \n"), Err(AppError::Validation(_))));
    }

    #[test]
    fn test_validate_prompt_length_is_in_characters() {
        let at_limit = "é".repeat(MAX_PROMPT_CHARS);
        assert!(validate_prompt(&at_limit).is_ok());
        let over = "a".repeat(MAX_PROMPT_CHARS + 1);
        assert!(validate_prompt(&over).is_err());
    }

    #[test]
    fn test_create_request_uses_type_field() {
        let request: CreatePostRequest =
            serde_json::from_str(r#"{"prompt": "launch day", "type": "POST"}"#).unwrap();
        assert_eq!(request.content_type, ContentType::Post);
        assert!(serde_json::from_str::<CreatePostRequest>(r#"{"prompt": "x", "type": "post"}"#).is_err());
    }

    #[test]
    fn test_select_request_is_camel_case() {
        let request: SelectOptionRequest =
            serde_json::from_str(r#"{"selectedOption": "B"}"#).unwrap();
        assert_eq!(request.selected_option, SelectedOption::B);
    }
}
