use anyhow::Result;
use tracing::{Level, info};
use tracing_subscriber::FmtSubscriber;

mod activation;
mod error;
mod middleware;
mod models;
mod rate_limiter;
mod repositories;
mod routes;
mod session;
mod state;
mod validation;

use common::database::{DatabaseConfig, init_pool};

use crate::{
    activation::{ActivationConfig, ActivationTokenService},
    rate_limiter::{LoginThrottle, LoginThrottleConfig},
    repositories::{
        CategoryRepository, EventRepository, ParticipantRepository, RsvpRepository, UserRepository,
    },
    session::{SessionConfig, SessionService},
    state::AppState,
};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    let subscriber = FmtSubscriber::builder()
        .with_max_level(Level::INFO)
        .finish();

    tracing::subscriber::set_global_default(subscriber).expect("setting default subscriber failed");

    info!("Starting Evently API service");

    // Initialize database connection pool
    let db_config = DatabaseConfig::from_env()?;
    let pool = init_pool(&db_config).await?;

    // Check database connectivity
    if common::database::health_check(&pool).await? {
        info!("Database connection successful");
    } else {
        anyhow::bail!("Failed to connect to database");
    }

    // Apply schema migrations
    sqlx::migrate!("./migrations").run(&pool).await?;
    info!("Database migrations applied");

    // Initialize services and repositories
    let activation = ActivationTokenService::new(ActivationConfig::from_env()?);
    let sessions = SessionService::new(pool.clone(), SessionConfig::from_env()?);
    let purged = sessions.purge_expired().await?;
    if purged > 0 {
        info!("Purged {} expired sessions", purged);
    }
    let login_throttle = LoginThrottle::new(LoginThrottleConfig::default());

    let app_state = AppState {
        users: UserRepository::new(pool.clone()),
        categories: CategoryRepository::new(pool.clone()),
        events: EventRepository::new(pool.clone()),
        participants: ParticipantRepository::new(pool.clone()),
        rsvps: RsvpRepository::new(pool),
        sessions,
        activation,
        login_throttle,
    };

    // Start the web server
    let app = routes::create_router(app_state);

    let bind_addr =
        std::env::var("BIND_ADDR").unwrap_or_else(|_| "0.0.0.0:3000".to_string());
    let listener = tokio::net::TcpListener::bind(&bind_addr).await?;
    info!("Evently API service listening on {}", bind_addr);

    axum::serve(listener, app).await?;

    Ok(())
}
