//! Event model and related functionality

use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// Event entity
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Event {
    pub id: Uuid,
    pub name: String,
    pub description: String,
    pub date: NaiveDate,
    pub time: NaiveTime,
    pub location: String,
    pub category_id: Uuid,
    /// Owner of the event; set only when the creator is an organizer.
    pub created_by: Option<Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Event row enriched with its category name and RSVP count, as returned
/// by list, search, and dashboard queries
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct EventSummary {
    pub id: Uuid,
    pub name: String,
    pub description: String,
    pub date: NaiveDate,
    pub time: NaiveTime,
    pub location: String,
    pub category_id: Uuid,
    pub category_name: String,
    pub created_by: Option<Uuid>,
    pub participant_count: i64,
}

/// Dashboard time window relative to today
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventWindow {
    Upcoming,
    Past,
    All,
}

impl EventWindow {
    /// Parse the `?filter=` query value; anything unrecognized falls back
    /// to `All`, matching the original behavior.
    pub fn parse(value: Option<&str>) -> Self {
        match value {
            Some("upcoming") => EventWindow::Upcoming,
            Some("past") => EventWindow::Past,
            _ => EventWindow::All,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            EventWindow::Upcoming => "upcoming",
            EventWindow::Past => "past",
            EventWindow::All => "all",
        }
    }
}
