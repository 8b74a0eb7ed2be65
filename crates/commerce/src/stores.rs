//! Storage seams for the commerce services.
//!
//! Services depend on these traits rather than on Postgres directly, so the
//! behavioral tests can run against in-memory fakes. The production
//! implementations live in [`crate::db`].

use std::sync::Arc;

use async_trait::async_trait;

use sundry_core::{Money, ProductId, UserId};

use crate::db::RepositoryError;
use crate::models::{CartItem, CartLine, OrderItemSnapshot, OrderWithItems, Product, User};

pub type DynUserStore = Arc<dyn UserStore>;
pub type DynProductStore = Arc<dyn ProductStore>;
pub type DynCartStore = Arc<dyn CartStore>;
pub type DynOrderStore = Arc<dyn OrderStore>;

/// User lookups.
#[async_trait]
pub trait UserStore: Send + Sync {
    async fn get_user(&self, id: UserId) -> Result<Option<User>, RepositoryError>;
}

/// Catalog reads.
#[async_trait]
pub trait ProductStore: Send + Sync {
    async fn get_product(&self, id: ProductId) -> Result<Option<Product>, RepositoryError>;

    /// Paged catalog listing with an optional name search.
    async fn list_products(
        &self,
        search: Option<&str>,
        skip: i64,
        first: i64,
    ) -> Result<Vec<Product>, RepositoryError>;
}

/// Cart mutations and reads.
#[async_trait]
pub trait CartStore: Send + Sync {
    /// Add one unit of a product to a user's cart.
    ///
    /// Must be atomic: a single row per (user, product) with its quantity
    /// incremented, never a duplicate row under concurrent calls.
    async fn upsert_increment(
        &self,
        user_id: UserId,
        product_id: ProductId,
    ) -> Result<CartItem, RepositoryError>;

    /// All of a user's cart lines with product and image data joined.
    async fn lines_for_user(&self, user_id: UserId) -> Result<Vec<CartLine>, RepositoryError>;
}

/// Order creation.
#[async_trait]
pub trait OrderStore: Send + Sync {
    /// Create an order plus its item snapshots and clear the user's cart,
    /// all inside one transaction. Either everything lands or nothing does.
    async fn create_order_and_clear_cart(
        &self,
        user_id: UserId,
        total: Money,
        charge: &str,
        items: Vec<OrderItemSnapshot>,
    ) -> Result<OrderWithItems, RepositoryError>;
}
