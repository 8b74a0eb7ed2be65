//! Order repository.
//!
//! Order creation, item snapshot inserts, and the cart clear run inside one
//! transaction. A charge can still succeed and leave no order behind if the
//! transaction fails, but there is no window where an order exists with a
//! half-written item list or a half-cleared cart.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{PgPool, Postgres, Transaction};
use tracing::{error, instrument};

use sundry_core::{Money, OrderId, OrderItemId, Quantity, UserId};

use super::RepositoryError;
use crate::models::{Order, OrderItem, OrderItemSnapshot, OrderWithItems};
use crate::stores::OrderStore;

/// Postgres-backed order store.
#[derive(Clone)]
pub struct PgOrderStore {
    pool: PgPool,
}

impl PgOrderStore {
    /// Create a new order store over a shared pool.
    #[must_use]
    pub const fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(sqlx::FromRow)]
struct OrderRow {
    id: i32,
    user_id: i32,
    total: i64,
    charge: String,
    created_at: DateTime<Utc>,
}

impl From<OrderRow> for Order {
    fn from(row: OrderRow) -> Self {
        Self {
            id: OrderId::new(row.id),
            user_id: UserId::new(row.user_id),
            total: Money::from_minor(row.total),
            charge: row.charge,
            created_at: row.created_at,
        }
    }
}

#[derive(sqlx::FromRow)]
struct OrderItemRow {
    id: i32,
    order_id: i32,
    name: String,
    description: String,
    price: i64,
    quantity: i32,
    image_url: Option<String>,
}

impl OrderItemRow {
    fn into_item(self) -> Result<OrderItem, RepositoryError> {
        let quantity = Quantity::new(self.quantity).map_err(|e| {
            RepositoryError::DataCorruption(format!("order item {}: {e}", self.id))
        })?;
        Ok(OrderItem {
            id: OrderItemId::new(self.id),
            order_id: OrderId::new(self.order_id),
            name: self.name,
            description: self.description,
            price: Money::from_minor(self.price),
            quantity,
            image_url: self.image_url,
        })
    }
}

async fn insert_item(
    tx: &mut Transaction<'_, Postgres>,
    order_id: OrderId,
    snapshot: &OrderItemSnapshot,
) -> Result<OrderItem, RepositoryError> {
    let row = sqlx::query_as::<_, OrderItemRow>(
        r"
        INSERT INTO order_items (order_id, name, description, price, quantity, image_url)
        VALUES ($1, $2, $3, $4, $5, $6)
        RETURNING id, order_id, name, description, price, quantity, image_url
        ",
    )
    .bind(order_id)
    .bind(&snapshot.name)
    .bind(&snapshot.description)
    .bind(snapshot.price)
    .bind(i32::from(snapshot.quantity))
    .bind(&snapshot.image_url)
    .fetch_one(&mut **tx)
    .await
    .map_err(RepositoryError::from_sqlx)?;

    row.into_item()
}

#[async_trait]
impl OrderStore for PgOrderStore {
    #[instrument(skip(self, items), fields(item_count = items.len()))]
    async fn create_order_and_clear_cart(
        &self,
        user_id: UserId,
        total: Money,
        charge: &str,
        items: Vec<OrderItemSnapshot>,
    ) -> Result<OrderWithItems, RepositoryError> {
        let mut tx = self.pool.begin().await.map_err(RepositoryError::from_sqlx)?;

        let order: Order = sqlx::query_as::<_, OrderRow>(
            r"
            INSERT INTO orders (user_id, total, charge)
            VALUES ($1, $2, $3)
            RETURNING id, user_id, total, charge, created_at
            ",
        )
        .bind(user_id)
        .bind(total)
        .bind(charge)
        .fetch_one(&mut *tx)
        .await
        .map_err(RepositoryError::from_sqlx)?
        .into();

        let mut order_items = Vec::with_capacity(items.len());
        for snapshot in &items {
            order_items.push(insert_item(&mut tx, order.id, snapshot).await?);
        }

        sqlx::query("DELETE FROM cart_items WHERE user_id = $1")
            .bind(user_id)
            .execute(&mut *tx)
            .await
            .map_err(RepositoryError::from_sqlx)?;

        tx.commit().await.map_err(|e| {
            error!(order_user = %user_id, "order transaction failed to commit");
            RepositoryError::from_sqlx(e)
        })?;

        Ok(OrderWithItems {
            order,
            items: order_items,
        })
    }
}
