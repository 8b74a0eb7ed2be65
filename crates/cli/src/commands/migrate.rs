//! Database migration command.
//!
//! # Environment Variables
//!
//! - `COMMERCE_DATABASE_URL` - `PostgreSQL` connection string

use secrecy::{ExposeSecret, SecretString};
use sqlx::PgPool;
use tracing::info;

/// Errors running migrations.
#[derive(Debug, thiserror::Error)]
pub enum MigrationError {
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(&'static str),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),
}

/// Run commerce database migrations.
///
/// # Errors
///
/// Returns [`MigrationError`] when the database URL is unset, the
/// connection fails, or a migration fails to apply.
pub async fn run() -> Result<(), MigrationError> {
    dotenvy::dotenv().ok();

    let database_url = std::env::var("COMMERCE_DATABASE_URL")
        .map(SecretString::from)
        .map_err(|_| MigrationError::MissingEnvVar("COMMERCE_DATABASE_URL"))?;

    info!("Connecting to commerce database...");
    let pool = PgPool::connect(database_url.expose_secret()).await?;

    info!("Running commerce migrations...");
    sqlx::migrate!("../commerce/migrations").run(&pool).await?;

    info!("Commerce migrations complete!");
    Ok(())
}
