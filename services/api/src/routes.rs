//! API service routes

use axum::{
    Json, Router,
    middleware,
    response::IntoResponse,
    routing::{get, post},
};
use serde_json::json;

use crate::{middleware::auth_middleware, state::AppState};

pub mod auth;
pub mod categories;
pub mod dashboard;
pub mod events;
pub mod participants;
pub mod profile;
pub mod rsvps;

/// Create the router for the API service
pub fn create_router(state: AppState) -> Router {
    let protected_routes = Router::new()
        .route("/auth/logout", post(auth::logout))
        .route("/dashboard", get(dashboard::dashboard))
        .route("/categories", get(categories::list).post(categories::create))
        .route(
            "/categories/:id",
            get(categories::detail)
                .put(categories::update)
                .delete(categories::delete),
        )
        .route("/events", get(events::list).post(events::create))
        .route("/events/search", get(events::search))
        .route(
            "/events/:id",
            get(events::detail).put(events::update).delete(events::delete),
        )
        .route("/events/:id/rsvp", get(rsvps::view).post(rsvps::submit))
        .route(
            "/participants",
            get(participants::list).post(participants::create),
        )
        .route(
            "/participants/:id",
            get(participants::detail)
                .put(participants::update)
                .delete(participants::delete),
        )
        .route("/profile", get(profile::view).put(profile::update))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            auth_middleware,
        ));

    Router::new()
        .route("/health", get(health_check))
        .route("/auth/signup", post(auth::signup))
        .route("/auth/login", post(auth::login))
        .route("/auth/activate/:uid/:token", get(auth::activate))
        .merge(protected_routes)
        .with_state(state)
}

/// Health check endpoint
pub async fn health_check() -> impl IntoResponse {
    Json(json!({
        "status": "ok",
        "service": "evently-api"
    }))
}
