//! RSVP model and related functionality

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// Attendance intent for one (participant, event) pair
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "rsvp_status", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum RsvpStatus {
    Attending,
    NotAttending,
    Maybe,
}

impl RsvpStatus {
    /// Parse a submitted status value; returns `None` for anything outside
    /// the closed set so the form can be rejected with a field error.
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "attending" => Some(RsvpStatus::Attending),
            "not_attending" => Some(RsvpStatus::NotAttending),
            "maybe" => Some(RsvpStatus::Maybe),
            _ => None,
        }
    }
}

/// RSVP entity
///
/// Lazily created with no status on first visit to the RSVP endpoint, then
/// mutated in place; never recreated. One row per (participant, event) pair,
/// enforced by a storage-level unique constraint.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Rsvp {
    pub id: Uuid,
    pub participant_id: Uuid,
    pub event_id: Uuid,
    pub status: Option<RsvpStatus>,
    pub comment: Option<String>,
    pub responded_at: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
}
