//! Command implementations.

pub mod admin;
pub mod migrate;
pub mod seed;

use secrecy::SecretString;
use sqlx::PgPool;
use thiserror::Error;

/// Errors opening the database.
#[derive(Debug, Error)]
pub enum ConnectError {
    /// Neither `BEERBRO_DATABASE_URL` nor `DATABASE_URL` is set.
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(&'static str),

    /// Database connection error.
    #[error("Database connection error: {0}")]
    Database(#[from] sqlx::Error),
}

/// Connect to the storefront database.
async fn connect() -> Result<PgPool, ConnectError> {
    let database_url = std::env::var("BEERBRO_DATABASE_URL")
        .or_else(|_| std::env::var("DATABASE_URL"))
        .map(SecretString::from)
        .map_err(|_| ConnectError::MissingEnvVar("BEERBRO_DATABASE_URL"))?;

    tracing::info!("Connecting to database...");
    Ok(beerbro_storefront::db::create_pool(&database_url).await?)
}
