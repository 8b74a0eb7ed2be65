//! Database operations for the commerce `PostgreSQL` store.
//!
//! ## Tables
//!
//! - `users` - Shoppers and editors, with a permission level
//! - `product_images` - Remote image assets with alt text
//! - `products` - Catalog entries (price in minor units)
//! - `cart_items` - Ephemeral cart rows, `UNIQUE (user_id, product_id)`
//! - `orders` / `order_items` - Purchase records and immutable snapshots
//! - `sessions` - tower-sessions storage (created by the session store)
//!
//! # Migrations
//!
//! Migrations live in `crates/commerce/migrations/` and run via:
//! ```bash
//! cargo run -p sundry-cli -- migrate
//! ```
//!
//! Queries use the sqlx runtime API with `FromRow` row structs; nothing here
//! assumes a database at compile time.

mod cart_items;
mod orders;
mod products;
mod users;

pub use cart_items::PgCartStore;
pub use orders::PgOrderStore;
pub use products::PgProductStore;
pub use users::PgUserStore;

use std::time::Duration;

use secrecy::ExposeSecret;
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;
use thiserror::Error;

/// Errors from the repository layer.
#[derive(Debug, Error)]
pub enum RepositoryError {
    /// Underlying database failure.
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// A row that must exist does not.
    #[error("Not found")]
    NotFound,

    /// Unique-constraint violation.
    #[error("Conflict: {0}")]
    Conflict(String),

    /// Foreign-key violation (e.g. adding an unknown product to a cart).
    #[error("Foreign key violation: {0}")]
    ForeignKey(String),

    /// A stored value violates a domain invariant.
    #[error("Data corruption: {0}")]
    DataCorruption(String),
}

impl RepositoryError {
    /// Classify an sqlx error by SQLSTATE so callers can branch on
    /// constraint violations without parsing messages.
    #[must_use]
    pub fn from_sqlx(err: sqlx::Error) -> Self {
        if let sqlx::Error::Database(db_err) = &err {
            let constraint = db_err.constraint().unwrap_or("<unknown>").to_string();
            match db_err.code().as_deref() {
                Some("23503") => return Self::ForeignKey(constraint),
                Some("23505") => return Self::Conflict(constraint),
                _ => {}
            }
        }
        Self::Database(err)
    }
}

/// Create a `PostgreSQL` connection pool with sensible defaults.
///
/// # Errors
///
/// Returns `sqlx::Error` if the connection cannot be established.
pub async fn create_pool(database_url: &secrecy::SecretString) -> Result<PgPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(10)
        .min_connections(2)
        .acquire_timeout(Duration::from_secs(10))
        .connect(database_url.expose_secret())
        .await
}
