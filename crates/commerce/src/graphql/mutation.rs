//! GraphQL mutation root.

use async_graphql::{Context, ErrorExtensions, ID, Object, Result};

use sundry_core::ProductId;

use crate::middleware::auth::CurrentUser;
use crate::services::{CartService, CheckoutService};

use super::errors::codes;
use super::types::{CartItem, Order};

/// Root mutation object.
pub struct MutationRoot;

#[Object]
impl MutationRoot {
    /// Add one unit of a product to the signed-in user's cart.
    ///
    /// Creates the cart item on first call and increments its quantity on
    /// every subsequent one.
    async fn add_to_cart(&self, ctx: &Context<'_>, product_id: ID) -> Result<CartItem> {
        let service = ctx.data::<CartService>()?;
        let user = ctx.data_opt::<CurrentUser>().map(|u| u.id);
        let product_id = parse_id(&product_id)?;

        let line = service
            .add_to_cart(user, product_id)
            .await
            .map_err(|e| e.extend())?;
        Ok(CartItem::from(line))
    }

    /// Charge the signed-in user's cart and create the order.
    async fn checkout(&self, ctx: &Context<'_>, token: String) -> Result<Order> {
        let service = ctx.data::<CheckoutService>()?;
        let user = ctx.data_opt::<CurrentUser>().map(|u| u.id);

        let order = service
            .checkout(user, &token)
            .await
            .map_err(|e| e.extend())?;
        Ok(Order::from(order))
    }
}

fn parse_id(id: &ID) -> Result<ProductId> {
    id.parse::<i32>().map(ProductId::new).map_err(|_| {
        async_graphql::Error::new(format!("Invalid id: {}", id.as_str()))
            .extend_with(|_, e| e.set("code", codes::BAD_REQUEST))
    })
}
