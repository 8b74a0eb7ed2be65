//! Checkout service: convert a cart into a paid order.
//!
//! Order of operations matters here. The charge happens first and is the
//! only step that cannot be rolled back; everything after it (order insert,
//! item snapshots, cart clear) runs in one storage transaction. If that
//! transaction fails the user has been charged with no order to show for it,
//! which is surfaced loudly as [`CheckoutError::ChargedWithoutOrder`] rather
//! than swallowed. No automatic void or refund is attempted.

use thiserror::Error;
use tracing::{error, info, instrument};

use sundry_core::{Money, MoneyError, UserId};

use crate::db::RepositoryError;
use crate::models::{OrderItemSnapshot, OrderWithItems};
use crate::services::payment::{DynPaymentGateway, PaymentError};
use crate::stores::{DynCartStore, DynOrderStore};

/// Errors from checkout.
#[derive(Debug, Error)]
pub enum CheckoutError {
    /// No signed-in user in the request context.
    #[error("You must be signed in to do that")]
    Unauthenticated,

    /// Nothing chargeable in the cart (empty, or every product deleted).
    #[error("Your cart has nothing that can be charged")]
    EmptyCart,

    /// Total computation overflowed.
    #[error("cart total: {0}")]
    Amount(#[from] MoneyError),

    /// The provider refused or the call failed; nothing was created.
    #[error(transparent)]
    Payment(#[from] PaymentError),

    /// The charge succeeded but the order transaction failed. The payment
    /// reference is preserved for manual reconciliation.
    #[error("charge {charge_id} captured but order creation failed")]
    ChargedWithoutOrder {
        charge_id: String,
        source: RepositoryError,
    },

    /// Storage failure before any charge was attempted.
    #[error(transparent)]
    Repository(#[from] RepositoryError),
}

/// Checkout orchestration over cart, orders, and the payment gateway.
pub struct CheckoutService {
    cart: DynCartStore,
    orders: DynOrderStore,
    payments: DynPaymentGateway,
    currency: String,
}

impl CheckoutService {
    /// Create the service over its seams. `currency` is the ISO 4217
    /// lowercase code every charge uses.
    #[must_use]
    pub fn new(
        cart: DynCartStore,
        orders: DynOrderStore,
        payments: DynPaymentGateway,
        currency: String,
    ) -> Self {
        Self {
            cart,
            orders,
            payments,
            currency,
        }
    }

    /// Charge the current cart and create the order.
    ///
    /// Steps: load cart lines, snapshot the chargeable ones (lines whose
    /// product was deleted are dropped), compute the total, charge, then
    /// transactionally create order + items and clear the cart.
    ///
    /// # Errors
    ///
    /// See [`CheckoutError`]. A payment failure leaves the cart untouched
    /// and creates nothing.
    #[instrument(skip(self, token))]
    pub async fn checkout(
        &self,
        user: Option<UserId>,
        token: &str,
    ) -> Result<OrderWithItems, CheckoutError> {
        let user_id = user.ok_or(CheckoutError::Unauthenticated)?;

        let lines = self.cart.lines_for_user(user_id).await?;
        let snapshots: Vec<OrderItemSnapshot> =
            lines.iter().filter_map(OrderItemSnapshot::from_line).collect();

        if snapshots.is_empty() {
            return Err(CheckoutError::EmptyCart);
        }

        let mut total = Money::ZERO;
        for snapshot in &snapshots {
            total = total.checked_add(snapshot.line_total()?)?;
        }

        let charge = self
            .payments
            .create_and_confirm_charge(total, &self.currency, token)
            .await?;

        let order = self
            .orders
            .create_order_and_clear_cart(user_id, total, &charge.id, snapshots)
            .await
            .map_err(|source| {
                error!(
                    %user_id,
                    charge_id = %charge.id,
                    %source,
                    "order creation failed after successful charge; manual reconciliation required"
                );
                CheckoutError::ChargedWithoutOrder {
                    charge_id: charge.id.clone(),
                    source,
                }
            })?;

        info!(
            %user_id,
            order_id = %order.order.id,
            total = %order.order.total,
            "checkout complete"
        );
        Ok(order)
    }
}
