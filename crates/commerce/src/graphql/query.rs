//! GraphQL query root.

use async_graphql::{Context, ErrorExtensions, ID, Object, Result};

use sundry_core::ProductId;

use crate::middleware::auth::CurrentUser;
use crate::services::CartService;
use crate::stores::{DynProductStore, DynUserStore};

use super::errors::codes;
use super::types::{CartItem, Product, User};

const DEFAULT_PAGE_SIZE: i64 = 25;
const MAX_PAGE_SIZE: i64 = 100;

/// Root query object.
pub struct QueryRoot;

#[Object]
impl QueryRoot {
    /// The signed-in user, or null.
    async fn me(&self, ctx: &Context<'_>) -> Result<Option<User>> {
        let Some(current) = ctx.data_opt::<CurrentUser>() else {
            return Ok(None);
        };
        let users = ctx.data::<DynUserStore>()?;
        let user = users
            .get_user(current.id)
            .await
            .map_err(internal)?;
        Ok(user.map(User::from))
    }

    /// One catalog entry, or null.
    async fn product(&self, ctx: &Context<'_>, id: ID) -> Result<Option<Product>> {
        let products = ctx.data::<DynProductStore>()?;
        let Ok(id) = id.parse::<i32>() else {
            return Ok(None);
        };
        let product = products
            .get_product(ProductId::new(id))
            .await
            .map_err(internal)?;
        Ok(product.map(Product::from))
    }

    /// Paged catalog listing with an optional name/description search.
    async fn products(
        &self,
        ctx: &Context<'_>,
        search: Option<String>,
        skip: Option<i64>,
        first: Option<i64>,
    ) -> Result<Vec<Product>> {
        let products = ctx.data::<DynProductStore>()?;
        let skip = skip.unwrap_or(0).max(0);
        let first = first.unwrap_or(DEFAULT_PAGE_SIZE).clamp(1, MAX_PAGE_SIZE);

        let list = products
            .list_products(search.as_deref(), skip, first)
            .await
            .map_err(internal)?;
        Ok(list.into_iter().map(Product::from).collect())
    }

    /// The signed-in user's cart lines.
    async fn cart(&self, ctx: &Context<'_>) -> Result<Vec<CartItem>> {
        let service = ctx.data::<CartService>()?;
        let user = ctx.data_opt::<CurrentUser>().map(|u| u.id);
        let lines = service.cart_for(user).await.map_err(|e| e.extend())?;
        Ok(lines.into_iter().map(CartItem::from).collect())
    }
}

fn internal(err: crate::db::RepositoryError) -> async_graphql::Error {
    sentry::capture_error(&err);
    tracing::error!(error = %err, "repository error reached the API");
    async_graphql::Error::new("Internal server error")
        .extend_with(|_, e| e.set("code", codes::INTERNAL))
}
