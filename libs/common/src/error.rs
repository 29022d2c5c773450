//! Database error taxonomy shared by the Evently services

use sqlx::Error as SqlxError;
use sqlx::migrate::MigrateError;
use thiserror::Error;

/// Errors raised by the shared database layer
#[derive(Error, Debug)]
pub enum DatabaseError {
    /// Could not establish a connection
    #[error("Database connection error: {0}")]
    Connection(#[source] SqlxError),

    /// A query failed to execute
    #[error("Database query error: {0}")]
    Query(#[source] SqlxError),

    /// Applying schema migrations failed
    #[error("Database migration error: {0}")]
    Migration(#[from] MigrateError),

    /// The environment-supplied settings are unusable
    #[error("Database configuration error: {0}")]
    Configuration(String),
}

/// Type alias for Result with DatabaseError
pub type DatabaseResult<T> = Result<T, DatabaseError>;
