//! Category CRUD routes (mutations are Admin-only)

use axum::{
    Extension, Json,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
};
use serde::Deserialize;
use serde_json::json;
use uuid::Uuid;

use crate::{
    error::{ApiError, ApiResult},
    middleware::AuthUser,
    models::Role,
    state::AppState,
    validation::validate_required,
};

/// Submitted category field set
#[derive(Debug, Deserialize)]
pub struct CategoryInput {
    pub name: String,
    #[serde(default)]
    pub description: String,
}

fn validate(input: &CategoryInput) -> Result<(), ApiError> {
    if let Err(e) = validate_required(&input.name) {
        return Err(ApiError::field("name", &e));
    }
    Ok(())
}

/// List all categories
pub async fn list(State(state): State<AppState>) -> ApiResult<impl IntoResponse> {
    let categories = state.categories.list().await?;
    Ok(Json(categories))
}

/// Get a category by ID
pub async fn detail(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> ApiResult<impl IntoResponse> {
    let category = state
        .categories
        .find_by_id(id)
        .await?
        .ok_or(ApiError::NotFound("Category"))?;
    Ok(Json(category))
}

/// Create a new category
pub async fn create(
    State(state): State<AppState>,
    Extension(actor): Extension<AuthUser>,
    Json(payload): Json<CategoryInput>,
) -> ApiResult<impl IntoResponse> {
    actor.require_any(&[Role::Admin])?;
    validate(&payload)?;

    let category = state
        .categories
        .create(payload.name.trim(), &payload.description)
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(json!({
            "message": "Category created successfully.",
            "category": category,
        })),
    ))
}

/// Update an existing category
pub async fn update(
    State(state): State<AppState>,
    Extension(actor): Extension<AuthUser>,
    Path(id): Path<Uuid>,
    Json(payload): Json<CategoryInput>,
) -> ApiResult<impl IntoResponse> {
    actor.require_any(&[Role::Admin])?;
    validate(&payload)?;

    let category = state
        .categories
        .update(id, payload.name.trim(), &payload.description)
        .await?
        .ok_or(ApiError::NotFound("Category"))?;

    Ok(Json(json!({
        "message": "Category updated successfully.",
        "category": category,
    })))
}

/// Delete a category
pub async fn delete(
    State(state): State<AppState>,
    Extension(actor): Extension<AuthUser>,
    Path(id): Path<Uuid>,
) -> ApiResult<impl IntoResponse> {
    actor.require_any(&[Role::Admin])?;

    if !state.categories.delete(id).await? {
        return Err(ApiError::NotFound("Category"));
    }

    Ok(Json(json!({"message": "Category deleted successfully."})))
}
