//! Cart records.
//!
//! A [`CartItem`] is the ephemeral (user, product, quantity) association:
//! created on add-to-cart, destroyed en masse at checkout. The product
//! reference is nullable: catalog deletions leave dangling lines behind,
//! and checkout skips them rather than failing.

use serde::{Deserialize, Serialize};

use sundry_core::{CartItemId, ProductId, Quantity, UserId};

use super::Product;

/// One cart row.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CartItem {
    pub id: CartItemId,
    pub user_id: UserId,
    /// Absent when the product was deleted after the item was added.
    pub product_id: Option<ProductId>,
    pub quantity: Quantity,
}

/// A cart row joined with its product (and the product's image).
#[derive(Debug, Clone)]
pub struct CartLine {
    pub item: CartItem,
    pub product: Option<Product>,
}

impl CartLine {
    /// Whether this line can be charged at checkout.
    #[must_use]
    pub const fn is_chargeable(&self) -> bool {
        self.product.is_some()
    }
}
