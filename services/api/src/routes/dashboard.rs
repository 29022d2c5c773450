//! Dashboard route: summary counts plus a filterable event list

use axum::{
    Json,
    extract::{Query, State},
    response::IntoResponse,
};
use chrono::Utc;
use serde::Deserialize;
use serde_json::json;

use crate::{error::ApiResult, models::EventWindow, state::AppState};

/// Query parameters for the dashboard
#[derive(Debug, Deserialize)]
pub struct DashboardQuery {
    pub filter: Option<String>,
}

/// Dashboard endpoint
pub async fn dashboard(
    State(state): State<AppState>,
    Query(query): Query<DashboardQuery>,
) -> ApiResult<impl IntoResponse> {
    let today = Utc::now().date_naive();
    let window = EventWindow::parse(query.filter.as_deref());

    let stats = state.events.dashboard_stats(today).await?;
    let today_events = state.events.list_on(today).await?;
    let events = state.events.list_window(window, today).await?;

    Ok(Json(json!({
        "total_events": stats.total_events,
        "total_participants": stats.total_participants,
        "upcoming_events": stats.upcoming_events,
        "past_events": stats.past_events,
        "today_events": today_events,
        "events": events,
        "filter": window.as_str(),
    })))
}
