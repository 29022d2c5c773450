//! Participant CRUD routes
//!
//! Creation is gated on Admin/Organizer; update and delete are open to any
//! authenticated actor, matching the original access rules.

use axum::{
    Extension, Json,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
};
use serde::Deserialize;
use serde_json::json;
use std::collections::HashMap;
use uuid::Uuid;

use crate::{
    error::{ApiError, ApiResult},
    middleware::AuthUser,
    models::Role,
    repositories::ParticipantRecord,
    state::AppState,
    validation::{validate_email, validate_required},
};

/// Submitted participant field set
#[derive(Debug, Deserialize)]
pub struct ParticipantInput {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email: String,
    pub phone: Option<String>,
    pub address: Option<String>,
    pub user_id: Option<Uuid>,
}

fn validate(input: &ParticipantInput) -> ApiResult<ParticipantRecord> {
    let mut errors = HashMap::new();

    if let Err(e) = validate_required(&input.name) {
        errors.insert("name".to_string(), e);
    }
    if let Err(e) = validate_email(&input.email) {
        errors.insert("email".to_string(), e);
    }

    if !errors.is_empty() {
        return Err(ApiError::Validation(errors));
    }

    Ok(ParticipantRecord {
        user_id: input.user_id,
        name: input.name.trim().to_string(),
        email: input.email.trim().to_string(),
        phone: input.phone.clone(),
        address: input.address.clone(),
    })
}

/// List all participants
pub async fn list(State(state): State<AppState>) -> ApiResult<impl IntoResponse> {
    let participants = state.participants.list().await?;
    Ok(Json(participants))
}

/// Get a participant by ID
pub async fn detail(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> ApiResult<impl IntoResponse> {
    let participant = state
        .participants
        .find_by_id(id)
        .await?
        .ok_or(ApiError::NotFound("Participant"))?;
    Ok(Json(participant))
}

/// Create a new participant
pub async fn create(
    State(state): State<AppState>,
    Extension(actor): Extension<AuthUser>,
    Json(payload): Json<ParticipantInput>,
) -> ApiResult<impl IntoResponse> {
    actor.require_any(&[Role::Admin, Role::Organizer])?;
    let record = validate(&payload)?;

    let participant = state.participants.create(&record).await?;

    Ok((
        StatusCode::CREATED,
        Json(json!({
            "message": "Participant created successfully.",
            "participant": participant,
        })),
    ))
}

/// Update an existing participant
pub async fn update(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<ParticipantInput>,
) -> ApiResult<impl IntoResponse> {
    let record = validate(&payload)?;

    let participant = state
        .participants
        .update(id, &record)
        .await?
        .ok_or(ApiError::NotFound("Participant"))?;

    Ok(Json(json!({
        "message": "Participant updated successfully.",
        "participant": participant,
    })))
}

/// Delete a participant
pub async fn delete(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> ApiResult<impl IntoResponse> {
    if !state.participants.delete(id).await? {
        return Err(ApiError::NotFound("Participant"));
    }

    Ok(Json(json!({"message": "Participant deleted successfully."})))
}
