//! RSVP view and submit routes
//!
//! One RSVP row per (participant, event) pair: the first visit creates an
//! empty row, every later visit or submission mutates it in place.

use axum::{
    Extension, Json,
    extract::{Path, State},
    response::IntoResponse,
};
use serde::Deserialize;
use serde_json::json;
use uuid::Uuid;

use crate::{
    error::{ApiError, ApiResult},
    middleware::AuthUser,
    models::{Participant, RsvpStatus},
    state::AppState,
};

/// Submitted RSVP form; the status arrives as a string so values outside
/// the closed set surface as a field error
#[derive(Debug, Deserialize)]
pub struct RsvpInput {
    #[serde(default)]
    pub status: String,
    pub comment: Option<String>,
}

/// Resolve the actor's participant record, or fail with the user-visible
/// "not registered" notice — a recoverable condition, not a fault
async fn resolve_participant(state: &AppState, actor: &AuthUser) -> ApiResult<Participant> {
    state
        .participants
        .find_by_user(actor.id)
        .await?
        .ok_or_else(|| {
            ApiError::BusinessRule(
                "You are not registered as a participant.".to_string(),
            )
        })
}

/// View the current RSVP for an event, creating an empty one on first visit
pub async fn view(
    State(state): State<AppState>,
    Extension(actor): Extension<AuthUser>,
    Path(event_id): Path<Uuid>,
) -> ApiResult<impl IntoResponse> {
    let event = state
        .events
        .find_by_id(event_id)
        .await?
        .ok_or(ApiError::NotFound("Event"))?;

    let participant = resolve_participant(&state, &actor).await?;
    let rsvp = state.rsvps.get_or_create(participant.id, event.id).await?;

    Ok(Json(json!({"event": event, "rsvp": rsvp})))
}

/// Submit or change an RSVP
pub async fn submit(
    State(state): State<AppState>,
    Extension(actor): Extension<AuthUser>,
    Path(event_id): Path<Uuid>,
    Json(payload): Json<RsvpInput>,
) -> ApiResult<impl IntoResponse> {
    let event = state
        .events
        .find_by_id(event_id)
        .await?
        .ok_or(ApiError::NotFound("Event"))?;

    let participant = resolve_participant(&state, &actor).await?;

    let status = RsvpStatus::parse(&payload.status).ok_or_else(|| {
        ApiError::field("status", "Select one of: attending, not_attending, maybe")
    })?;

    let rsvp = state.rsvps.get_or_create(participant.id, event.id).await?;
    let rsvp = state
        .rsvps
        .set_response(rsvp.id, status, &payload.comment)
        .await?;
    tracing::info!("RSVP recorded for {} on '{}'", actor.username, event.name);

    Ok(Json(json!({
        "message": "Your RSVP has been submitted.",
        "rsvp": rsvp,
    })))
}
