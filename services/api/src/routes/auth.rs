//! Account lifecycle routes: signup, activation, login, logout
//!
//! Accounts are born inactive; the activation link is issued at signup and
//! logged in place of real email delivery, whose failure is never surfaced
//! to the caller.

use axum::{
    Json,
    extract::{Path, State},
    http::{HeaderMap, StatusCode},
    response::IntoResponse,
};
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::collections::HashMap;
use tracing::info;

use crate::{
    activation::ActivationTokenService,
    error::{ApiError, ApiResult},
    middleware::bearer_token,
    models::NewUser,
    state::AppState,
    validation::{validate_email, validate_password, validate_username},
};

/// Request for user login
#[derive(Deserialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

/// Response for a successful login
#[derive(Serialize)]
pub struct TokenResponse {
    pub token: String,
    pub token_type: String,
    pub expires_at: chrono::DateTime<chrono::Utc>,
}


/// User signup endpoint
pub async fn signup(
    State(state): State<AppState>,
    Json(payload): Json<NewUser>,
) -> ApiResult<impl IntoResponse> {
    let mut errors = HashMap::new();
    if let Err(e) = validate_username(&payload.username) {
        errors.insert("username".to_string(), e);
    }
    if let Err(e) = validate_email(&payload.email) {
        errors.insert("email".to_string(), e);
    }
    if let Err(e) = validate_password(&payload.password) {
        errors.insert("password".to_string(), e);
    }
    if !errors.contains_key("username")
        && state
            .users
            .find_by_username(&payload.username)
            .await?
            .is_some()
    {
        errors.insert(
            "username".to_string(),
            "This username is already taken".to_string(),
        );
    }
    if !errors.is_empty() {
        return Err(ApiError::Validation(errors));
    }

    let user = state.users.register(&payload).await?;

    // Stand-in for email delivery: the link only reaches the log. Delivery
    // is fire-and-forget either way.
    let activation_path = state.activation.activation_path(&user)?;
    info!(
        "Activation link for {}: {}",
        user.username, activation_path
    );

    Ok((
        StatusCode::CREATED,
        Json(json!({
            "message": "Account created! Please check your email to activate your account.",
            "user_id": user.id,
        })),
    ))
}

/// Account activation link target
///
/// Every failure mode, from undecodable identifiers to stale tokens, lands
/// on the same invalid-activation response.
pub async fn activate(
    State(state): State<AppState>,
    Path((uid, token)): Path<(String, String)>,
) -> ApiResult<impl IntoResponse> {
    let user_id = ActivationTokenService::decode_uid(&uid).ok_or(ApiError::InvalidActivation)?;

    let user = state
        .users
        .find_by_id(user_id)
        .await?
        .ok_or(ApiError::InvalidActivation)?;

    if !state.activation.verify(&token, &user) {
        return Err(ApiError::InvalidActivation);
    }

    if !state.users.activate(user.id).await? {
        // Lost a race with another activation of the same link.
        return Err(ApiError::InvalidActivation);
    }

    info!("Account activated: {}", user.username);

    Ok(Json(json!({
        "message": "Account activated. You can now log in.",
        "login": "/auth/login",
    })))
}

/// User login endpoint
pub async fn login(
    State(state): State<AppState>,
    Json(payload): Json<LoginRequest>,
) -> ApiResult<impl IntoResponse> {
    info!("Login attempt for user: {}", payload.username);

    if !state.login_throttle.is_allowed(&payload.username).await {
        return Err(ApiError::BusinessRule(
            "Too many failed login attempts. Try again later.".to_string(),
        ));
    }

    let user = match state.users.find_by_username(&payload.username).await? {
        Some(user) => user,
        None => {
            state.login_throttle.record_failure(&payload.username).await;
            return Err(ApiError::InvalidCredentials);
        }
    };

    // Inactive accounts fail exactly like bad passwords.
    if !state.users.verify_password(&user, &payload.password)? || !user.is_active {
        state.login_throttle.record_failure(&payload.username).await;
        return Err(ApiError::InvalidCredentials);
    }

    state.login_throttle.record_success(&payload.username).await;

    let session = state.sessions.create(user.id).await?;

    Ok((
        StatusCode::OK,
        Json(TokenResponse {
            token: session.token,
            token_type: "Bearer".to_string(),
            expires_at: session.expires_at,
        }),
    ))
}

/// Logout endpoint: drops the session row behind the request's own bearer
/// token, so no other session can be named
pub async fn logout(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> ApiResult<impl IntoResponse> {
    let token = bearer_token(&headers).ok_or(ApiError::Unauthenticated)?;
    state.sessions.delete(token).await?;

    Ok(Json(json!({"message": "Logged out successfully"})))
}
