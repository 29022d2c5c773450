//! RSVP repository for database operations

use anyhow::Result;
use sqlx::PgPool;
use uuid::Uuid;

use crate::models::{Rsvp, RsvpStatus};

/// RSVP repository
#[derive(Clone)]
pub struct RsvpRepository {
    pool: PgPool,
}

impl RsvpRepository {
    /// Create a new RSVP repository
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Fetch the RSVP for a (participant, event) pair, creating an empty one
    /// on first visit. Concurrent firsts converge on a single row: the
    /// insert backs off on conflict and the follow-up select finds the row
    /// the winner created.
    pub async fn get_or_create(&self, participant_id: Uuid, event_id: Uuid) -> Result<Rsvp> {
        let inserted = sqlx::query_as::<_, Rsvp>(
            r#"
            INSERT INTO rsvps (participant_id, event_id)
            VALUES ($1, $2)
            ON CONFLICT (participant_id, event_id) DO NOTHING
            RETURNING id, participant_id, event_id, status, comment, responded_at, created_at
            "#,
        )
        .bind(participant_id)
        .bind(event_id)
        .fetch_optional(&self.pool)
        .await?;

        if let Some(rsvp) = inserted {
            return Ok(rsvp);
        }

        let existing = sqlx::query_as::<_, Rsvp>(
            r#"
            SELECT id, participant_id, event_id, status, comment, responded_at, created_at
            FROM rsvps
            WHERE participant_id = $1 AND event_id = $2
            "#,
        )
        .bind(participant_id)
        .bind(event_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(existing)
    }

    /// Record a response on an existing RSVP, bumping the response timestamp
    pub async fn set_response(
        &self,
        id: Uuid,
        status: RsvpStatus,
        comment: &Option<String>,
    ) -> Result<Rsvp> {
        let rsvp = sqlx::query_as::<_, Rsvp>(
            r#"
            UPDATE rsvps
            SET status = $2, comment = $3, responded_at = now()
            WHERE id = $1
            RETURNING id, participant_id, event_id, status, comment, responded_at, created_at
            "#,
        )
        .bind(id)
        .bind(status)
        .bind(comment)
        .fetch_one(&self.pool)
        .await?;

        Ok(rsvp)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repositories::participant::{ParticipantRecord, ParticipantRepository};
    use chrono::{NaiveDate, NaiveTime};

    async fn seed_pair(pool: &PgPool) -> (Uuid, Uuid) {
        let category_id: Uuid =
            sqlx::query_scalar("INSERT INTO categories (name) VALUES ('Workshops') RETURNING id")
                .fetch_one(pool)
                .await
                .unwrap();

        let event_id: Uuid = sqlx::query_scalar(
            r#"
            INSERT INTO events (name, description, date, time, location, category_id)
            VALUES ('Intro to Rust', '', $1, $2, 'Main hall', $3)
            RETURNING id
            "#,
        )
        .bind(NaiveDate::from_ymd_opt(2025, 6, 15).unwrap())
        .bind(NaiveTime::from_hms_opt(18, 0, 0).unwrap())
        .bind(category_id)
        .fetch_one(pool)
        .await
        .unwrap();

        let participant = ParticipantRepository::new(pool.clone())
            .create(&ParticipantRecord {
                user_id: None,
                name: "dana".to_string(),
                email: "dana@example.com".to_string(),
                phone: None,
                address: None,
            })
            .await
            .unwrap();

        (participant.id, event_id)
    }

    async fn pair_count(pool: &PgPool, participant_id: Uuid, event_id: Uuid) -> i64 {
        sqlx::query_scalar("SELECT COUNT(*) FROM rsvps WHERE participant_id = $1 AND event_id = $2")
            .bind(participant_id)
            .bind(event_id)
            .fetch_one(pool)
            .await
            .unwrap()
    }

    #[sqlx::test]
    #[ignore = "requires a running PostgreSQL instance"]
    async fn repeated_visits_never_create_a_second_row(pool: PgPool) {
        let repo = RsvpRepository::new(pool.clone());
        let (participant_id, event_id) = seed_pair(&pool).await;

        let first = repo.get_or_create(participant_id, event_id).await.unwrap();
        assert!(first.status.is_none());

        let maybe = repo
            .set_response(first.id, RsvpStatus::Maybe, &None)
            .await
            .unwrap();
        assert_eq!(maybe.status, Some(RsvpStatus::Maybe));

        // Second visit mutates the first row in place.
        let again = repo.get_or_create(participant_id, event_id).await.unwrap();
        assert_eq!(again.id, first.id);
        assert_eq!(again.status, Some(RsvpStatus::Maybe));

        let attending = repo
            .set_response(again.id, RsvpStatus::Attending, &Some("see you there".to_string()))
            .await
            .unwrap();
        assert_eq!(attending.status, Some(RsvpStatus::Attending));
        assert!(attending.responded_at >= maybe.responded_at);

        assert_eq!(pair_count(&pool, participant_id, event_id).await, 1);
    }

    #[sqlx::test]
    #[ignore = "requires a running PostgreSQL instance"]
    async fn concurrent_first_visits_converge(pool: PgPool) {
        let repo = RsvpRepository::new(pool.clone());
        let (participant_id, event_id) = seed_pair(&pool).await;

        let (a, b) = tokio::join!(
            repo.get_or_create(participant_id, event_id),
            repo.get_or_create(participant_id, event_id)
        );
        assert_eq!(a.unwrap().id, b.unwrap().id);
        assert_eq!(pair_count(&pool, participant_id, event_id).await, 1);
    }
}
