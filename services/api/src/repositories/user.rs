//! User repository for database operations

use anyhow::Result;
use argon2::{Argon2, PasswordHash, PasswordHasher, PasswordVerifier, password_hash::SaltString};
use sqlx::PgPool;
use tracing::info;
use uuid::Uuid;

use crate::models::{NewUser, User};

/// Self-service profile update payload
#[derive(Debug, Clone)]
pub struct ProfileChanges {
    pub email: String,
    pub phone: Option<String>,
    pub profile_picture: Option<String>,
}

/// User repository
#[derive(Clone)]
pub struct UserRepository {
    pool: PgPool,
}

impl UserRepository {
    /// Create a new user repository
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Register a new user: insert the inactive account and its shadow
    /// participant record in one transaction. The participant row is an
    /// explicit step of registration, not a persistence hook.
    pub async fn register(&self, new_user: &NewUser) -> Result<User> {
        info!("Registering new user: {}", new_user.username);

        let salt = SaltString::generate(&mut rand::thread_rng());
        let argon2 = Argon2::default();
        let password_hash = argon2
            .hash_password(new_user.password.as_bytes(), &salt)
            .map_err(|e| anyhow::anyhow!("Failed to hash password: {}", e))?
            .to_string();

        let mut tx = self.pool.begin().await?;

        let user = sqlx::query_as::<_, User>(
            r#"
            INSERT INTO users (username, email, password_hash)
            VALUES ($1, $2, $3)
            RETURNING id, username, email, password_hash, phone, profile_picture,
                      is_active, role, is_superuser, created_at, updated_at
            "#,
        )
        .bind(&new_user.username)
        .bind(&new_user.email)
        .bind(&password_hash)
        .fetch_one(&mut *tx)
        .await?;

        sqlx::query(
            r#"
            INSERT INTO participants (user_id, name, email)
            VALUES ($1, $2, $3)
            "#,
        )
        .bind(user.id)
        .bind(&user.username)
        .bind(&user.email)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;

        Ok(user)
    }

    /// Find a user by username
    pub async fn find_by_username(&self, username: &str) -> Result<Option<User>> {
        let user = sqlx::query_as::<_, User>(
            r#"
            SELECT id, username, email, password_hash, phone, profile_picture,
                   is_active, role, is_superuser, created_at, updated_at
            FROM users
            WHERE username = $1
            "#,
        )
        .bind(username)
        .fetch_optional(&self.pool)
        .await?;

        Ok(user)
    }

    /// Find a user by ID
    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<User>> {
        let user = sqlx::query_as::<_, User>(
            r#"
            SELECT id, username, email, password_hash, phone, profile_picture,
                   is_active, role, is_superuser, created_at, updated_at
            FROM users
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(user)
    }

    /// Verify a user's password
    pub fn verify_password(&self, user: &User, password: &str) -> Result<bool> {
        let parsed_hash = PasswordHash::new(&user.password_hash)
            .map_err(|e| anyhow::anyhow!("Failed to parse password hash: {}", e))?;

        let argon2 = Argon2::default();
        Ok(argon2
            .verify_password(password.as_bytes(), &parsed_hash)
            .is_ok())
    }

    /// Flip an unactivated account to active. The transition is one-way;
    /// returns `false` when the account was already active.
    pub async fn activate(&self, id: Uuid) -> Result<bool> {
        let result = sqlx::query(
            r#"
            UPDATE users
            SET is_active = TRUE, updated_at = now()
            WHERE id = $1 AND is_active = FALSE
            "#,
        )
        .bind(id)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Apply a self-service profile update
    pub async fn update_profile(&self, id: Uuid, changes: &ProfileChanges) -> Result<Option<User>> {
        let user = sqlx::query_as::<_, User>(
            r#"
            UPDATE users
            SET email = $2,
                phone = $3,
                profile_picture = COALESCE($4, profile_picture),
                updated_at = now()
            WHERE id = $1
            RETURNING id, username, email, password_hash, phone, profile_picture,
                      is_active, role, is_superuser, created_at, updated_at
            "#,
        )
        .bind(id)
        .bind(&changes.email)
        .bind(&changes.phone)
        .bind(&changes.profile_picture)
        .fetch_optional(&self.pool)
        .await?;

        Ok(user)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Role;

    #[sqlx::test]
    #[ignore = "requires a running PostgreSQL instance"]
    async fn register_creates_inactive_user_with_shadow_participant(pool: PgPool) {
        let repo = UserRepository::new(pool.clone());
        let user = repo
            .register(&NewUser {
                username: "alice".to_string(),
                email: "alice@example.com".to_string(),
                password: "Sup3rsecret".to_string(),
            })
            .await
            .unwrap();

        assert!(!user.is_active);
        assert_eq!(user.role, Role::Participant);
        assert!(!user.is_superuser);
        // Plaintext never stored.
        assert_ne!(user.password_hash, "Sup3rsecret");
        assert!(repo.verify_password(&user, "Sup3rsecret").unwrap());
        assert!(!repo.verify_password(&user, "wrong").unwrap());

        let participant_count: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM participants WHERE user_id = $1")
                .bind(user.id)
                .fetch_one(&pool)
                .await
                .unwrap();
        assert_eq!(participant_count, 1);
    }

    #[sqlx::test]
    #[ignore = "requires a running PostgreSQL instance"]
    async fn activation_is_one_way(pool: PgPool) {
        let repo = UserRepository::new(pool);
        let user = repo
            .register(&NewUser {
                username: "bob".to_string(),
                email: "bob@example.com".to_string(),
                password: "Sup3rsecret".to_string(),
            })
            .await
            .unwrap();

        assert!(repo.activate(user.id).await.unwrap());
        // Second activation is a no-op.
        assert!(!repo.activate(user.id).await.unwrap());
        let user = repo.find_by_id(user.id).await.unwrap().unwrap();
        assert!(user.is_active);
    }
}
