//! Participant repository for database operations

use anyhow::Result;
use sqlx::PgPool;
use uuid::Uuid;

use crate::models::Participant;

/// Field set persisted for a participant (validated upstream)
#[derive(Debug, Clone)]
pub struct ParticipantRecord {
    pub user_id: Option<Uuid>,
    pub name: String,
    pub email: String,
    pub phone: Option<String>,
    pub address: Option<String>,
}

/// Participant repository
#[derive(Clone)]
pub struct ParticipantRepository {
    pool: PgPool,
}

impl ParticipantRepository {
    /// Create a new participant repository
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// List all participants
    pub async fn list(&self) -> Result<Vec<Participant>> {
        let participants = sqlx::query_as::<_, Participant>(
            r#"
            SELECT id, user_id, name, email, phone, address, created_at, updated_at
            FROM participants
            ORDER BY name
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(participants)
    }

    /// Find a participant by ID
    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<Participant>> {
        let participant = sqlx::query_as::<_, Participant>(
            r#"
            SELECT id, user_id, name, email, phone, address, created_at, updated_at
            FROM participants
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(participant)
    }

    /// Find the participant record shadowing a user, if any
    pub async fn find_by_user(&self, user_id: Uuid) -> Result<Option<Participant>> {
        let participant = sqlx::query_as::<_, Participant>(
            r#"
            SELECT id, user_id, name, email, phone, address, created_at, updated_at
            FROM participants
            WHERE user_id = $1
            "#,
        )
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(participant)
    }

    /// Create a new participant
    pub async fn create(&self, record: &ParticipantRecord) -> Result<Participant> {
        let participant = sqlx::query_as::<_, Participant>(
            r#"
            INSERT INTO participants (user_id, name, email, phone, address)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id, user_id, name, email, phone, address, created_at, updated_at
            "#,
        )
        .bind(record.user_id)
        .bind(&record.name)
        .bind(&record.email)
        .bind(&record.phone)
        .bind(&record.address)
        .fetch_one(&self.pool)
        .await?;

        Ok(participant)
    }

    /// Update an existing participant
    pub async fn update(
        &self,
        id: Uuid,
        record: &ParticipantRecord,
    ) -> Result<Option<Participant>> {
        let participant = sqlx::query_as::<_, Participant>(
            r#"
            UPDATE participants
            SET user_id = $2, name = $3, email = $4, phone = $5, address = $6,
                updated_at = now()
            WHERE id = $1
            RETURNING id, user_id, name, email, phone, address, created_at, updated_at
            "#,
        )
        .bind(id)
        .bind(record.user_id)
        .bind(&record.name)
        .bind(&record.email)
        .bind(&record.phone)
        .bind(&record.address)
        .fetch_optional(&self.pool)
        .await?;

        Ok(participant)
    }

    /// Update the contact details of a user's own participant record
    pub async fn update_contact(
        &self,
        user_id: Uuid,
        phone: &Option<String>,
        address: &Option<String>,
    ) -> Result<Option<Participant>> {
        let participant = sqlx::query_as::<_, Participant>(
            r#"
            UPDATE participants
            SET phone = $2, address = $3, updated_at = now()
            WHERE user_id = $1
            RETURNING id, user_id, name, email, phone, address, created_at, updated_at
            "#,
        )
        .bind(user_id)
        .bind(phone)
        .bind(address)
        .fetch_optional(&self.pool)
        .await?;

        Ok(participant)
    }

    /// Delete a participant; returns whether a row was removed
    pub async fn delete(&self, id: Uuid) -> Result<bool> {
        let result = sqlx::query("DELETE FROM participants WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}
