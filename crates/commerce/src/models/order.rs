//! Order records and purchase-time snapshots.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use sundry_core::{Money, OrderId, OrderItemId, Quantity, UserId};

use super::CartLine;

/// A completed order. `total` is computed once at checkout and never
/// recomputed; there is deliberately no update path for it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Order {
    pub id: OrderId,
    pub user_id: UserId,
    pub total: Money,
    /// Payment provider charge identifier.
    pub charge: String,
    pub created_at: DateTime<Utc>,
}

/// An immutable purchase-time copy of a product, owned by an order.
///
/// Holds no reference to the product or cart item it was copied from, so
/// later catalog edits never alter historical orders.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderItem {
    pub id: OrderItemId,
    pub order_id: OrderId,
    pub name: String,
    pub description: String,
    pub price: Money,
    pub quantity: Quantity,
    pub image_url: Option<String>,
}

/// An order together with its item snapshots, as returned by checkout.
#[derive(Debug, Clone)]
pub struct OrderWithItems {
    pub order: Order,
    pub items: Vec<OrderItem>,
}

/// The insert shape for an order item: product fields copied, identity
/// fields dropped so the row gets a fresh id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderItemSnapshot {
    pub name: String,
    pub description: String,
    pub price: Money,
    pub quantity: Quantity,
    pub image_url: Option<String>,
}

impl OrderItemSnapshot {
    /// Snapshot a cart line. Returns `None` for lines whose product
    /// reference dangles; those cannot be charged or shipped.
    #[must_use]
    pub fn from_line(line: &CartLine) -> Option<Self> {
        let product = line.product.as_ref()?;
        Some(Self {
            name: product.name.clone(),
            description: product.description.clone(),
            price: product.price,
            quantity: line.item.quantity,
            image_url: product.image.as_ref().map(|img| img.image_url.clone()),
        })
    }

    /// The line total for this snapshot.
    ///
    /// # Errors
    ///
    /// Returns [`sundry_core::MoneyError::Overflow`] when `price × quantity`
    /// exceeds `i64`.
    pub fn line_total(&self) -> Result<Money, sundry_core::MoneyError> {
        self.price.checked_mul(self.quantity.get())
    }
}
