//! Add-to-cart service.

use thiserror::Error;
use tracing::{info, instrument};

use sundry_core::{ProductId, UserId};

use crate::db::RepositoryError;
use crate::models::CartLine;
use crate::stores::{DynCartStore, DynProductStore};

/// Errors from cart mutations.
#[derive(Debug, Error)]
pub enum CartError {
    /// No signed-in user in the request context.
    #[error("You must be signed in to do that")]
    Unauthenticated,

    /// The product being added does not exist.
    #[error("No product found for id {0}")]
    UnknownProduct(ProductId),

    /// Storage failure.
    #[error(transparent)]
    Repository(#[from] RepositoryError),
}

/// Converts a signed-in user's add-to-cart request into exactly one created
/// or incremented cart row.
pub struct CartService {
    cart: DynCartStore,
    products: DynProductStore,
}

impl CartService {
    /// Create the service over its storage seams.
    #[must_use]
    pub fn new(cart: DynCartStore, products: DynProductStore) -> Self {
        Self { cart, products }
    }

    /// Add one unit of `product_id` to the current user's cart.
    ///
    /// The upsert is atomic at the storage layer, so repeated and concurrent
    /// calls for the same (user, product) pair converge on a single row whose
    /// quantity counts the calls.
    ///
    /// # Errors
    ///
    /// [`CartError::Unauthenticated`] without a user,
    /// [`CartError::UnknownProduct`] for an id the catalog does not have.
    #[instrument(skip(self))]
    pub async fn add_to_cart(
        &self,
        user: Option<UserId>,
        product_id: ProductId,
    ) -> Result<CartLine, CartError> {
        let user_id = user.ok_or(CartError::Unauthenticated)?;

        let item = self
            .cart
            .upsert_increment(user_id, product_id)
            .await
            .map_err(|err| match err {
                RepositoryError::ForeignKey(_) => CartError::UnknownProduct(product_id),
                other => CartError::Repository(other),
            })?;

        info!(%user_id, %product_id, quantity = %item.quantity, "cart item upserted");

        let product = self.products.get_product(product_id).await?;
        Ok(CartLine { item, product })
    }

    /// The current user's cart lines.
    ///
    /// # Errors
    ///
    /// [`CartError::Unauthenticated`] without a user.
    pub async fn cart_for(&self, user: Option<UserId>) -> Result<Vec<CartLine>, CartError> {
        let user_id = user.ok_or(CartError::Unauthenticated)?;
        Ok(self.cart.lines_for_user(user_id).await?)
    }
}
