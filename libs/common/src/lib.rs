//! Common library for the Evently application
//!
//! Shared infrastructure for the Evently workspace: PostgreSQL pooling,
//! health checks, and the database error taxonomy.

pub mod database;
pub mod error;

/// Example usage of the database module
///
/// ```rust,no_run
/// use common::database::{DatabaseConfig, init_pool, health_check};
///
/// #[tokio::main]
/// async fn main() -> Result<(), Box<dyn std::error::Error>> {
///     let config = DatabaseConfig::from_env()?;
///     let pool = init_pool(&config).await?;
///     assert!(health_check(&pool).await?);
///     Ok(())
/// }
/// ```
pub fn example_usage() {}
