use std::borrow::Cow;

use axum::{extract::State, http::StatusCode, Json};
use chrono::Duration;
use serde::{Deserialize, Serialize};
use tracing::info;
use validator::{Validate, ValidationError};

use crate::auth::extractor::AuthUser;
use crate::auth::jwt::{create_token, Claims};
use crate::auth::password::{hash_password, verify_password};
use crate::auth::users::{create_user, find_by_email, find_by_id, normalize_email};
use crate::errors::AppError;
use crate::models::user::{User, UserProfile};
use crate::state::AppState;

const INVALID_CREDENTIALS: &str = "Invalid email or password";
const FULL_NAME_MIN_CHARS: usize = 2;
const FULL_NAME_MAX_CHARS: usize = 100;

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct SignupRequest {
    #[validate(custom(function = "validate_full_name"))]
    pub full_name: String,

    #[validate(email(message = "Invalid email format"))]
    pub email: String,

    #[validate(length(min = 8, message = "Password must be at least 8 characters"))]
    pub password: String,

    #[validate(must_match(other = "password", message = "Passwords do not match"))]
    pub confirm_password: String,
}

/// The name is stored trimmed, so the length rule applies to the trimmed value.
fn validate_full_name(full_name: &str) -> Result<(), ValidationError> {
    let chars = full_name.trim().chars().count();
    if (FULL_NAME_MIN_CHARS..=FULL_NAME_MAX_CHARS).contains(&chars) {
        return Ok(());
    }
    let mut error = ValidationError::new("full_name_length");
    error.message = Some(Cow::from("Full name must be 2-100 characters"));
    Err(error)
}

#[derive(Debug, Deserialize, Validate)]
pub struct LoginRequest {
    #[validate(email(message = "Invalid email format"))]
    pub email: String,

    pub password: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthResponse {
    pub user: UserProfile,
    pub access_token: String,
}

/// POST /api/v1/auth/signup
pub async fn handle_signup(
    State(state): State<AppState>,
    Json(request): Json<SignupRequest>,
) -> Result<(StatusCode, Json<AuthResponse>), AppError> {
    request.validate()?;

    let email = normalize_email(&request.email);
    let password_hash = hash_password(&request.password)?;

    let user = create_user(&state.db, &email, request.full_name.trim(), &password_hash)
        .await
        .map_err(AppError::from)
        .map_err(|e| {
            if e.is_unique_violation() {
                AppError::Conflict("An account with this email already exists".to_string())
            } else {
                e
            }
        })?;

    info!("Registered user {}", user.id);

    let response = issue_session(&state, user)?;
    Ok((StatusCode::CREATED, Json(response)))
}

/// POST /api/v1/auth/login
pub async fn handle_login(
    State(state): State<AppState>,
    Json(request): Json<LoginRequest>,
) -> Result<Json<AuthResponse>, AppError> {
    request.validate()?;

    let user = find_by_email(&state.db, &normalize_email(&request.email))
        .await?
        .ok_or_else(|| AppError::Unauthorized(INVALID_CREDENTIALS.to_string()))?;

    if !verify_password(&request.password, &user.password_hash)? {
        return Err(AppError::Unauthorized(INVALID_CREDENTIALS.to_string()));
    }

    info!("User {} logged in", user.id);
    Ok(Json(issue_session(&state, user)?))
}

/// GET /api/v1/auth/me
pub async fn handle_me(
    State(state): State<AppState>,
    auth: AuthUser,
) -> Result<Json<UserProfile>, AppError> {
    let user = find_by_id(&state.db, auth.id)
        .await?
        .ok_or_else(|| AppError::Unauthorized("User no longer exists".to_string()))?;
    Ok(Json(user.into()))
}

fn issue_session(state: &AppState, user: User) -> Result<AuthResponse, AppError> {
    let claims = Claims::new(
        user.id,
        &user.email,
        Duration::hours(state.config.jwt_expiration_hours),
    );
    let access_token = create_token(&claims, &state.config.jwt_secret)?;
    Ok(AuthResponse {
        user: user.into(),
        access_token,
    })
}
