//! Cart item repository.
//!
//! `cart_items` carries `UNIQUE (user_id, product_id)`, so add-to-cart is a
//! single upsert-increment statement. The old lookup-then-increment shape
//! could race two concurrent adds into duplicate rows; the constraint plus
//! `ON CONFLICT` serializes them onto one row.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use tracing::instrument;

use sundry_core::{CartItemId, Money, ProductId, ProductImageId, Quantity, UserId};

use super::RepositoryError;
use crate::models::{CartItem, CartLine, Product, ProductImage};
use crate::stores::CartStore;

/// Postgres-backed cart store.
#[derive(Clone)]
pub struct PgCartStore {
    pool: PgPool,
}

impl PgCartStore {
    /// Create a new cart store over a shared pool.
    #[must_use]
    pub const fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(sqlx::FromRow)]
struct CartItemRow {
    id: i32,
    user_id: i32,
    product_id: Option<i32>,
    quantity: i32,
}

impl CartItemRow {
    fn into_item(self) -> Result<CartItem, RepositoryError> {
        let quantity = Quantity::new(self.quantity).map_err(|e| {
            RepositoryError::DataCorruption(format!("cart item {}: {e}", self.id))
        })?;
        Ok(CartItem {
            id: CartItemId::new(self.id),
            user_id: UserId::new(self.user_id),
            product_id: self.product_id.map(ProductId::new),
            quantity,
        })
    }
}

/// A cart row with its product and image left-joined.
#[derive(sqlx::FromRow)]
struct CartLineRow {
    id: i32,
    user_id: i32,
    product_id: Option<i32>,
    quantity: i32,
    product_name: Option<String>,
    product_description: Option<String>,
    product_price: Option<i64>,
    product_author_id: Option<i32>,
    product_created_at: Option<DateTime<Utc>>,
    product_updated_at: Option<DateTime<Utc>>,
    image_id: Option<i32>,
    image_url: Option<String>,
    alt_text: Option<String>,
}

impl CartLineRow {
    fn into_line(self) -> Result<CartLine, RepositoryError> {
        let product = match (
            self.product_id,
            self.product_name.clone(),
            self.product_price,
            self.product_author_id,
        ) {
            (Some(id), Some(name), Some(price), Some(author_id)) => Some(Product {
                id: ProductId::new(id),
                name,
                description: self.product_description.clone().unwrap_or_default(),
                price: Money::from_minor(price),
                image: match (self.image_id, self.image_url.clone()) {
                    (Some(image_id), Some(image_url)) => Some(ProductImage {
                        id: ProductImageId::new(image_id),
                        image_url,
                        alt_text: self.alt_text.clone().unwrap_or_default(),
                    }),
                    _ => None,
                },
                author_id: UserId::new(author_id),
                created_at: self.product_created_at.unwrap_or_default(),
                updated_at: self.product_updated_at.unwrap_or_default(),
            }),
            _ => None,
        };

        let item = CartItemRow {
            id: self.id,
            user_id: self.user_id,
            product_id: self.product_id,
            quantity: self.quantity,
        }
        .into_item()?;

        Ok(CartLine { item, product })
    }
}

#[async_trait]
impl CartStore for PgCartStore {
    #[instrument(skip(self))]
    async fn upsert_increment(
        &self,
        user_id: UserId,
        product_id: ProductId,
    ) -> Result<CartItem, RepositoryError> {
        let row = sqlx::query_as::<_, CartItemRow>(
            r"
            INSERT INTO cart_items (user_id, product_id, quantity)
            VALUES ($1, $2, 1)
            ON CONFLICT (user_id, product_id)
            DO UPDATE SET quantity = cart_items.quantity + 1
            RETURNING id, user_id, product_id, quantity
            ",
        )
        .bind(user_id)
        .bind(product_id)
        .fetch_one(&self.pool)
        .await
        .map_err(RepositoryError::from_sqlx)?;

        row.into_item()
    }

    async fn lines_for_user(&self, user_id: UserId) -> Result<Vec<CartLine>, RepositoryError> {
        let rows = sqlx::query_as::<_, CartLineRow>(
            r"
            SELECT c.id, c.user_id, c.product_id, c.quantity,
                   p.name AS product_name,
                   p.description AS product_description,
                   p.price AS product_price,
                   p.author_id AS product_author_id,
                   p.created_at AS product_created_at,
                   p.updated_at AS product_updated_at,
                   i.id AS image_id, i.image_url, i.alt_text
            FROM cart_items c
            LEFT JOIN products p ON p.id = c.product_id
            LEFT JOIN product_images i ON i.id = p.image_id
            WHERE c.user_id = $1
            ORDER BY c.id
            ",
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await
        .map_err(RepositoryError::from_sqlx)?;

        rows.into_iter().map(CartLineRow::into_line).collect()
    }
}
