//! Seed the database with a demo catalog for local development.
//!
//! Inserts a demo author, a handful of product images, and a small product
//! catalog with prices in minor currency units. Seeded records are keyed by
//! the author's email so re-running is idempotent.

use secrecy::{ExposeSecret, SecretString};
use sqlx::PgPool;
use tracing::info;

const SEED_AUTHOR_EMAIL: &str = "catalog@sundry.local";

/// (name, description, price in minor units, image url, alt text)
const DEMO_PRODUCTS: [(&str, &str, i64, &str, &str); 5] = [
    (
        "Sticker Sheet",
        "A sheet of assorted vinyl stickers.",
        500,
        "https://assets.sundry.local/stickers.png",
        "Vinyl sticker sheet",
    ),
    (
        "Enamel Pin",
        "Hard enamel pin with butterfly clasp.",
        1200,
        "https://assets.sundry.local/pin.png",
        "Enamel pin",
    ),
    (
        "Art Print",
        "A3 giclee print on archival paper.",
        2500,
        "https://assets.sundry.local/print.png",
        "Framed art print",
    ),
    (
        "Tote Bag",
        "Heavyweight cotton tote, screen printed.",
        1800,
        "https://assets.sundry.local/tote.png",
        "Cotton tote bag",
    ),
    (
        "Postcard Pack",
        "Pack of ten illustrated postcards.",
        800,
        "https://assets.sundry.local/postcards.png",
        "Illustrated postcards",
    ),
];

/// Seed a demo catalog.
///
/// # Arguments
///
/// * `fresh` - If true, delete previously seeded demo records first
///
/// # Errors
///
/// Returns an error if the database URL is unset or any insert fails.
pub async fn catalog(fresh: bool) -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();

    let database_url = std::env::var("COMMERCE_DATABASE_URL")
        .map(SecretString::from)
        .map_err(|_| "COMMERCE_DATABASE_URL not set")?;

    let pool = PgPool::connect(database_url.expose_secret()).await?;
    info!("Connected to database");

    if fresh {
        let removed = clear_seeded(&pool).await?;
        info!(removed, "Cleared previously seeded products");
    }

    let author_id: i32 = sqlx::query_scalar(
        "INSERT INTO users (name, email, permission)
         VALUES ('Catalog Seeder', $1, 'EDITOR')
         ON CONFLICT (email) DO UPDATE SET updated_at = now()
         RETURNING id",
    )
    .bind(SEED_AUTHOR_EMAIL)
    .fetch_one(&pool)
    .await?;

    let mut inserted = 0usize;
    for (name, description, price, image_url, alt_text) in DEMO_PRODUCTS {
        let exists: Option<i32> =
            sqlx::query_scalar("SELECT id FROM products WHERE name = $1 AND author_id = $2")
                .bind(name)
                .bind(author_id)
                .fetch_optional(&pool)
                .await?;
        if exists.is_some() {
            continue;
        }

        let image_id: i32 = sqlx::query_scalar(
            "INSERT INTO product_images (image_url, alt_text) VALUES ($1, $2) RETURNING id",
        )
        .bind(image_url)
        .bind(alt_text)
        .fetch_one(&pool)
        .await?;

        sqlx::query(
            "INSERT INTO products (name, description, price, image_id, author_id)
             VALUES ($1, $2, $3, $4, $5)",
        )
        .bind(name)
        .bind(description)
        .bind(price)
        .bind(image_id)
        .bind(author_id)
        .execute(&pool)
        .await?;
        inserted += 1;
    }

    info!(inserted, "Seeding complete!");
    Ok(())
}

async fn clear_seeded(pool: &PgPool) -> Result<u64, sqlx::Error> {
    let result = sqlx::query(
        "DELETE FROM products
         WHERE author_id = (SELECT id FROM users WHERE email = $1)",
    )
    .bind(SEED_AUTHOR_EMAIL)
    .execute(pool)
    .await?;
    Ok(result.rows_affected())
}
