//! Product repository.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use tracing::instrument;

use sundry_core::{Money, ProductId, ProductImageId, UserId};

use super::RepositoryError;
use crate::models::{Product, ProductImage};
use crate::stores::ProductStore;

/// Postgres-backed catalog store.
#[derive(Clone)]
pub struct PgProductStore {
    pool: PgPool,
}

impl PgProductStore {
    /// Create a new product store over a shared pool.
    #[must_use]
    pub const fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

/// One product row with its image left-joined.
#[derive(sqlx::FromRow)]
struct ProductRow {
    id: i32,
    name: String,
    description: String,
    price: i64,
    author_id: i32,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
    image_id: Option<i32>,
    image_url: Option<String>,
    alt_text: Option<String>,
}

impl From<ProductRow> for Product {
    fn from(row: ProductRow) -> Self {
        let image = match (row.image_id, row.image_url) {
            (Some(id), Some(image_url)) => Some(ProductImage {
                id: ProductImageId::new(id),
                image_url,
                alt_text: row.alt_text.unwrap_or_default(),
            }),
            _ => None,
        };
        Self {
            id: ProductId::new(row.id),
            name: row.name,
            description: row.description,
            price: Money::from_minor(row.price),
            image,
            author_id: UserId::new(row.author_id),
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

const PRODUCT_SELECT: &str = r"
    SELECT p.id, p.name, p.description, p.price, p.author_id,
           p.created_at, p.updated_at,
           i.id AS image_id, i.image_url, i.alt_text
    FROM products p
    LEFT JOIN product_images i ON i.id = p.image_id
";

#[async_trait]
impl ProductStore for PgProductStore {
    async fn get_product(&self, id: ProductId) -> Result<Option<Product>, RepositoryError> {
        let row = sqlx::query_as::<_, ProductRow>(&format!("{PRODUCT_SELECT} WHERE p.id = $1"))
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(RepositoryError::from_sqlx)?;

        Ok(row.map(Product::from))
    }

    #[instrument(skip(self))]
    async fn list_products(
        &self,
        search: Option<&str>,
        skip: i64,
        first: i64,
    ) -> Result<Vec<Product>, RepositoryError> {
        let pattern = search
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(|s| format!("%{s}%"));

        let rows = sqlx::query_as::<_, ProductRow>(&format!(
            r"{PRODUCT_SELECT}
            WHERE ($1::TEXT IS NULL OR p.name ILIKE $1 OR p.description ILIKE $1)
            ORDER BY p.created_at DESC
            LIMIT $2 OFFSET $3"
        ))
        .bind(pattern)
        .bind(first)
        .bind(skip)
        .fetch_all(&self.pool)
        .await
        .map_err(RepositoryError::from_sqlx)?;

        Ok(rows.into_iter().map(Product::from).collect())
    }
}
