//! Test harness for Sundry behavioral tests.
//!
//! Provides an in-memory implementation of the commerce storage seams and a
//! scriptable payment gateway, so the cart/checkout services and the GraphQL
//! schema can be exercised end to end without a database or a provider
//! account.

#![cfg_attr(not(test), forbid(unsafe_code))]
// Test-support code; lock poisoning and exhausted scripts should panic.
#![allow(clippy::unwrap_used)]

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::Utc;

use sundry_commerce::db::RepositoryError;
use sundry_commerce::graphql::{CommerceSchema, SchemaDeps, build_schema};
use sundry_commerce::models::{
    CartItem, CartLine, Order, OrderItem, OrderItemSnapshot, OrderWithItems, Product, User,
};
use sundry_commerce::services::payment::{Charge, PaymentError, PaymentGateway};
use sundry_commerce::services::{CartService, CheckoutService};
use sundry_commerce::stores::{CartStore, OrderStore, ProductStore, UserStore};
use sundry_core::{
    CartItemId, Money, OrderId, OrderItemId, Permission, ProductId, Quantity, UserId,
};

/// In-memory stand-in for the Postgres repositories.
///
/// Mirrors the storage semantics the services rely on: one cart row per
/// (user, product) with atomic increments, product deletion leaving
/// dangling cart lines, and all-or-nothing order creation.
#[derive(Default)]
pub struct MemoryStore {
    inner: Mutex<Inner>,
    fail_next_order: AtomicBool,
}

#[derive(Default)]
struct Inner {
    users: Vec<User>,
    products: Vec<Product>,
    cart: Vec<CartItem>,
    orders: Vec<OrderWithItems>,
    next_id: i32,
}

impl Inner {
    fn next_id(&mut self) -> i32 {
        self.next_id += 1;
        self.next_id
    }
}

impl MemoryStore {
    #[must_use]
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Insert a user and return its id.
    pub fn add_user(&self, name: &str, email: &str) -> UserId {
        let mut inner = self.inner.lock().unwrap();
        let id = UserId::new(inner.next_id());
        inner.users.push(User {
            id,
            name: name.to_string(),
            email: email.to_string(),
            permission: Permission::User,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        });
        id
    }

    /// Insert a product priced in minor units and return its id.
    pub fn add_product(&self, name: &str, price_minor: i64) -> ProductId {
        let mut inner = self.inner.lock().unwrap();
        let id = ProductId::new(inner.next_id());
        let author_id = inner.users.first().map_or_else(|| UserId::new(0), |u| u.id);
        inner.products.push(Product {
            id,
            name: name.to_string(),
            description: format!("{name} description"),
            price: Money::from_minor(price_minor),
            image: None,
            author_id,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        });
        id
    }

    /// Delete a product, leaving any cart rows referencing it dangling,
    /// the way `ON DELETE SET NULL` does.
    pub fn remove_product(&self, id: ProductId) {
        let mut inner = self.inner.lock().unwrap();
        inner.products.retain(|p| p.id != id);
        for item in &mut inner.cart {
            if item.product_id == Some(id) {
                item.product_id = None;
            }
        }
    }

    /// The raw cart rows for a user.
    #[must_use]
    pub fn cart_rows(&self, user_id: UserId) -> Vec<CartItem> {
        self.inner
            .lock()
            .unwrap()
            .cart
            .iter()
            .filter(|item| item.user_id == user_id)
            .cloned()
            .collect()
    }

    /// Every order created so far.
    #[must_use]
    pub fn orders(&self) -> Vec<OrderWithItems> {
        self.inner.lock().unwrap().orders.clone()
    }

    /// Make the next order creation fail, to exercise the
    /// charged-without-order path.
    pub fn fail_next_order(&self) {
        self.fail_next_order.store(true, Ordering::SeqCst);
    }
}

#[async_trait]
impl UserStore for MemoryStore {
    async fn get_user(&self, id: UserId) -> Result<Option<User>, RepositoryError> {
        let inner = self.inner.lock().unwrap();
        Ok(inner.users.iter().find(|u| u.id == id).cloned())
    }
}

#[async_trait]
impl ProductStore for MemoryStore {
    async fn get_product(&self, id: ProductId) -> Result<Option<Product>, RepositoryError> {
        let inner = self.inner.lock().unwrap();
        Ok(inner.products.iter().find(|p| p.id == id).cloned())
    }

    async fn list_products(
        &self,
        search: Option<&str>,
        skip: i64,
        first: i64,
    ) -> Result<Vec<Product>, RepositoryError> {
        let inner = self.inner.lock().unwrap();
        Ok(inner
            .products
            .iter()
            .filter(|p| search.is_none_or(|s| p.name.contains(s)))
            .skip(usize::try_from(skip).unwrap_or(0))
            .take(usize::try_from(first).unwrap_or(0))
            .cloned()
            .collect())
    }
}

#[async_trait]
impl CartStore for MemoryStore {
    async fn upsert_increment(
        &self,
        user_id: UserId,
        product_id: ProductId,
    ) -> Result<CartItem, RepositoryError> {
        let mut inner = self.inner.lock().unwrap();
        if !inner.products.iter().any(|p| p.id == product_id) {
            return Err(RepositoryError::ForeignKey(
                "cart_items_product_id_fkey".to_string(),
            ));
        }
        if let Some(item) = inner
            .cart
            .iter_mut()
            .find(|item| item.user_id == user_id && item.product_id == Some(product_id))
        {
            item.quantity = item.quantity.incremented();
            return Ok(item.clone());
        }
        let id = CartItemId::new(inner.next_id());
        let item = CartItem {
            id,
            user_id,
            product_id: Some(product_id),
            quantity: Quantity::ONE,
        };
        inner.cart.push(item.clone());
        Ok(item)
    }

    async fn lines_for_user(&self, user_id: UserId) -> Result<Vec<CartLine>, RepositoryError> {
        let inner = self.inner.lock().unwrap();
        Ok(inner
            .cart
            .iter()
            .filter(|item| item.user_id == user_id)
            .map(|item| CartLine {
                item: item.clone(),
                product: item
                    .product_id
                    .and_then(|pid| inner.products.iter().find(|p| p.id == pid).cloned()),
            })
            .collect())
    }
}

#[async_trait]
impl OrderStore for MemoryStore {
    async fn create_order_and_clear_cart(
        &self,
        user_id: UserId,
        total: Money,
        charge: &str,
        items: Vec<OrderItemSnapshot>,
    ) -> Result<OrderWithItems, RepositoryError> {
        if self.fail_next_order.swap(false, Ordering::SeqCst) {
            return Err(RepositoryError::Database(sqlx_timeout()));
        }
        let mut inner = self.inner.lock().unwrap();
        let order_id = OrderId::new(inner.next_id());
        let order_items: Vec<OrderItem> = items
            .into_iter()
            .map(|snapshot| {
                let id = OrderItemId::new(inner.next_id());
                OrderItem {
                    id,
                    order_id,
                    name: snapshot.name,
                    description: snapshot.description,
                    price: snapshot.price,
                    quantity: snapshot.quantity,
                    image_url: snapshot.image_url,
                }
            })
            .collect();
        let order = OrderWithItems {
            order: Order {
                id: order_id,
                user_id,
                total,
                charge: charge.to_string(),
                created_at: Utc::now(),
            },
            items: order_items,
        };
        inner.orders.push(order.clone());
        inner.cart.retain(|item| item.user_id != user_id);
        Ok(order)
    }
}

fn sqlx_timeout() -> sqlx::Error {
    sqlx::Error::PoolTimedOut
}

/// How the mock gateway answers the next charges.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PaymentMode {
    Approve,
    Decline,
}

/// A confirmed-charge request as seen by the gateway.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChargeRecord {
    pub id: String,
    pub amount: Money,
    pub currency: String,
}

/// Scriptable stand-in for the payment provider.
pub struct MockGateway {
    mode: Mutex<PaymentMode>,
    charges: Mutex<Vec<ChargeRecord>>,
    counter: AtomicUsize,
}

impl Default for MockGateway {
    fn default() -> Self {
        Self {
            mode: Mutex::new(PaymentMode::Approve),
            charges: Mutex::new(Vec::new()),
            counter: AtomicUsize::new(0),
        }
    }
}

impl MockGateway {
    #[must_use]
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn set_mode(&self, mode: PaymentMode) {
        *self.mode.lock().unwrap() = mode;
    }

    /// Every charge the gateway has confirmed.
    #[must_use]
    pub fn charges(&self) -> Vec<ChargeRecord> {
        self.charges.lock().unwrap().clone()
    }
}

#[async_trait]
impl PaymentGateway for MockGateway {
    async fn create_and_confirm_charge(
        &self,
        amount: Money,
        currency: &str,
        _token: &str,
    ) -> Result<Charge, PaymentError> {
        if *self.mode.lock().unwrap() == PaymentMode::Decline {
            return Err(PaymentError::Declined {
                message: "Your card was declined.".to_string(),
            });
        }
        let n = self.counter.fetch_add(1, Ordering::SeqCst) + 1;
        let record = ChargeRecord {
            id: format!("ch_test_{n}"),
            amount,
            currency: currency.to_string(),
        };
        self.charges.lock().unwrap().push(record.clone());
        Ok(Charge {
            id: record.id,
            amount,
        })
    }
}

/// Wired-up services over one store and one gateway.
pub struct Harness {
    pub store: Arc<MemoryStore>,
    pub gateway: Arc<MockGateway>,
}

impl Default for Harness {
    fn default() -> Self {
        Self::new()
    }
}

impl Harness {
    #[must_use]
    pub fn new() -> Self {
        Self {
            store: MemoryStore::new(),
            gateway: MockGateway::new(),
        }
    }

    #[must_use]
    pub fn cart_service(&self) -> CartService {
        CartService::new(self.store.clone(), self.store.clone())
    }

    #[must_use]
    pub fn checkout_service(&self) -> CheckoutService {
        CheckoutService::new(
            self.store.clone(),
            self.store.clone(),
            self.gateway.clone(),
            "usd".to_string(),
        )
    }

    /// A GraphQL schema backed by the in-memory store.
    #[must_use]
    pub fn schema(&self) -> CommerceSchema {
        build_schema(SchemaDeps {
            cart: self.cart_service(),
            checkout: self.checkout_service(),
            users: self.store.clone(),
            products: self.store.clone(),
        })
    }
}
