//! Self-service profile routes

use axum::{Extension, Json, extract::State, response::IntoResponse};
use serde::Deserialize;
use serde_json::json;
use std::collections::HashMap;

use crate::{
    error::{ApiError, ApiResult},
    middleware::AuthUser,
    repositories::ProfileChanges,
    state::AppState,
    validation::validate_email,
};

/// Submitted profile field set: account details plus the contact fields of
/// the actor's own participant record
#[derive(Debug, Deserialize)]
pub struct ProfileInput {
    #[serde(default)]
    pub email: String,
    pub phone: Option<String>,
    pub profile_picture: Option<String>,
    pub address: Option<String>,
}

/// View the current account and its participant record
pub async fn view(
    State(state): State<AppState>,
    Extension(actor): Extension<AuthUser>,
) -> ApiResult<impl IntoResponse> {
    let user = state
        .users
        .find_by_id(actor.id)
        .await?
        .ok_or(ApiError::NotFound("User"))?;

    let participant = state.participants.find_by_user(actor.id).await?;

    Ok(Json(json!({"user": user, "participant": participant})))
}

/// Update the account and participant contact details
pub async fn update(
    State(state): State<AppState>,
    Extension(actor): Extension<AuthUser>,
    Json(payload): Json<ProfileInput>,
) -> ApiResult<impl IntoResponse> {
    let mut errors = HashMap::new();
    if let Err(e) = validate_email(&payload.email) {
        errors.insert("email".to_string(), e);
    }
    if !errors.is_empty() {
        return Err(ApiError::Validation(errors));
    }

    let user = state
        .users
        .update_profile(
            actor.id,
            &ProfileChanges {
                email: payload.email.trim().to_string(),
                phone: payload.phone.clone(),
                profile_picture: payload.profile_picture.clone(),
            },
        )
        .await?
        .ok_or(ApiError::NotFound("User"))?;

    let participant = state
        .participants
        .update_contact(actor.id, &payload.phone, &payload.address)
        .await?;

    Ok(Json(json!({
        "message": "Profile updated successfully.",
        "user": user,
        "participant": participant,
    })))
}
