//! Event CRUD and search routes
//!
//! Mutations are gated on the Admin/Organizer roles; update and delete
//! additionally require ownership (creator or elevated). Listing for a
//! plain organizer is restricted to their own events.

use axum::{
    Extension, Json,
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
};
use chrono::NaiveDate;
use serde::Deserialize;
use serde_json::json;
use std::collections::HashMap;
use uuid::Uuid;

use crate::{
    error::{ApiError, ApiResult},
    middleware::AuthUser,
    models::{Event, Role},
    repositories::{EventFilters, EventRecord},
    state::AppState,
    validation::{parse_date, parse_time, validate_required},
};

/// Submitted event field set; date and time arrive as strings so malformed
/// values surface as field errors rather than deserialization faults
#[derive(Debug, Deserialize)]
pub struct EventInput {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub date: String,
    #[serde(default)]
    pub time: String,
    #[serde(default)]
    pub location: String,
    pub category_id: Option<Uuid>,
}

/// Query parameters for the event list
#[derive(Debug, Deserialize)]
pub struct EventListQuery {
    pub category: Option<Uuid>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
}

/// Query parameters for event search
#[derive(Debug, Deserialize)]
pub struct SearchQuery {
    pub q: Option<String>,
}

async fn validate(state: &AppState, input: &EventInput) -> ApiResult<EventRecord> {
    let mut errors = HashMap::new();

    if let Err(e) = validate_required(&input.name) {
        errors.insert("name".to_string(), e);
    }
    if let Err(e) = validate_required(&input.location) {
        errors.insert("location".to_string(), e);
    }

    let date = match parse_date(&input.date) {
        Ok(date) => Some(date),
        Err(e) => {
            errors.insert("date".to_string(), e);
            None
        }
    };
    let time = match parse_time(&input.time) {
        Ok(time) => Some(time),
        Err(e) => {
            errors.insert("time".to_string(), e);
            None
        }
    };

    let category_id = match input.category_id {
        Some(id) => {
            if state.categories.find_by_id(id).await?.is_none() {
                errors.insert("category_id".to_string(), "Unknown category".to_string());
            }
            Some(id)
        }
        None => {
            errors.insert("category_id".to_string(), "This field is required".to_string());
            None
        }
    };

    match (date, time, category_id) {
        (Some(date), Some(time), Some(category_id)) if errors.is_empty() => Ok(EventRecord {
            name: input.name.trim().to_string(),
            description: input.description.clone(),
            date,
            time,
            location: input.location.trim().to_string(),
            category_id,
        }),
        _ => Err(ApiError::Validation(errors)),
    }
}

/// Load an event and check the actor may modify it
async fn load_for_modify(state: &AppState, actor: &AuthUser, id: Uuid) -> ApiResult<Event> {
    actor.require_any(&[Role::Admin, Role::Organizer])?;

    let event = state
        .events
        .find_by_id(id)
        .await?
        .ok_or(ApiError::NotFound("Event"))?;

    if !actor.can_modify_event(&event) {
        return Err(ApiError::Forbidden);
    }

    Ok(event)
}

/// List events, filterable by category and an inclusive date range
pub async fn list(
    State(state): State<AppState>,
    Extension(actor): Extension<AuthUser>,
    Query(query): Query<EventListQuery>,
) -> ApiResult<impl IntoResponse> {
    let filters = EventFilters {
        category: query.category,
        start_date: query.start_date,
        end_date: query.end_date,
        // Plain organizers only see what they created; everyone else sees
        // the unfiltered set.
        created_by: if actor.stamps_ownership() {
            Some(actor.id)
        } else {
            None
        },
    };

    let events = state.events.list(&filters).await?;
    Ok(Json(events))
}

/// Case-insensitive substring search over event name and location
pub async fn search(
    State(state): State<AppState>,
    Query(query): Query<SearchQuery>,
) -> ApiResult<impl IntoResponse> {
    let q = query.q.unwrap_or_default();
    let events = state.events.search(&q).await?;
    Ok(Json(json!({"query": q, "events": events})))
}

/// Get an event by ID
pub async fn detail(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> ApiResult<impl IntoResponse> {
    let event = state
        .events
        .find_by_id(id)
        .await?
        .ok_or(ApiError::NotFound("Event"))?;
    Ok(Json(event))
}

/// Create a new event
pub async fn create(
    State(state): State<AppState>,
    Extension(actor): Extension<AuthUser>,
    Json(payload): Json<EventInput>,
) -> ApiResult<impl IntoResponse> {
    actor.require_any(&[Role::Admin, Role::Organizer])?;
    let record = validate(&state, &payload).await?;

    // Ownership is stamped server-side, never taken from the client.
    let created_by = actor.stamps_ownership().then_some(actor.id);
    let event = state.events.create(&record, created_by).await?;
    tracing::info!("Event '{}' created by {}", event.name, actor.username);

    Ok((
        StatusCode::CREATED,
        Json(json!({
            "message": "Event created successfully.",
            "event": event,
        })),
    ))
}

/// Update an existing event
pub async fn update(
    State(state): State<AppState>,
    Extension(actor): Extension<AuthUser>,
    Path(id): Path<Uuid>,
    Json(payload): Json<EventInput>,
) -> ApiResult<impl IntoResponse> {
    load_for_modify(&state, &actor, id).await?;
    let record = validate(&state, &payload).await?;

    let event = state
        .events
        .update(id, &record)
        .await?
        .ok_or(ApiError::NotFound("Event"))?;

    Ok(Json(json!({
        "message": "Event updated successfully.",
        "event": event,
    })))
}

/// Delete an event
pub async fn delete(
    State(state): State<AppState>,
    Extension(actor): Extension<AuthUser>,
    Path(id): Path<Uuid>,
) -> ApiResult<impl IntoResponse> {
    load_for_modify(&state, &actor, id).await?;

    if !state.events.delete(id).await? {
        return Err(ApiError::NotFound("Event"));
    }

    Ok(Json(json!({"message": "Event deleted successfully."})))
}
