//! Application state shared across handlers.

use std::sync::Arc;

use sqlx::PgPool;

use crate::config::CommerceConfig;
use crate::db::{PgCartStore, PgOrderStore, PgProductStore, PgUserStore};
use crate::graphql::{CommerceSchema, SchemaDeps, build_schema};
use crate::services::{CartService, CheckoutService, DynPaymentGateway, StripeGateway};
use crate::stores::{DynCartStore, DynOrderStore, DynProductStore, DynUserStore};

/// Application state shared across all handlers.
///
/// Cheaply cloneable via `Arc`.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: CommerceConfig,
    pool: PgPool,
    schema: CommerceSchema,
}

impl AppState {
    /// Wire the Postgres stores, payment gateway, services, and schema.
    #[must_use]
    pub fn new(config: CommerceConfig, pool: PgPool) -> Self {
        let payments: DynPaymentGateway = Arc::new(StripeGateway::new(&config.payment));
        Self::with_gateway(config, pool, payments)
    }

    /// Like [`AppState::new`] but with an explicit payment gateway, for
    /// deployments or tests that substitute the provider.
    #[must_use]
    pub fn with_gateway(
        config: CommerceConfig,
        pool: PgPool,
        payments: DynPaymentGateway,
    ) -> Self {
        let users: DynUserStore = Arc::new(PgUserStore::new(pool.clone()));
        let products: DynProductStore = Arc::new(PgProductStore::new(pool.clone()));
        let cart: DynCartStore = Arc::new(PgCartStore::new(pool.clone()));
        let orders: DynOrderStore = Arc::new(PgOrderStore::new(pool.clone()));

        let schema = build_schema(SchemaDeps {
            cart: CartService::new(cart.clone(), products.clone()),
            checkout: CheckoutService::new(
                cart,
                orders,
                payments,
                config.payment.currency.clone(),
            ),
            users,
            products,
        });

        Self {
            inner: Arc::new(AppStateInner {
                config,
                pool,
                schema,
            }),
        }
    }

    /// Get a reference to the configuration.
    #[must_use]
    pub fn config(&self) -> &CommerceConfig {
        &self.inner.config
    }

    /// Get a reference to the database connection pool.
    #[must_use]
    pub fn pool(&self) -> &PgPool {
        &self.inner.pool
    }

    /// Get a reference to the executable schema.
    #[must_use]
    pub fn schema(&self) -> &CommerceSchema {
        &self.inner.schema
    }
}
