//! GraphQL object types.
//!
//! Thin wire-shaped copies of the domain models. IDs are exposed as GraphQL
//! `ID`, money as `Int` minor units.

use async_graphql::{Enum, ID, SimpleObject};

use crate::models;

/// User permission level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Enum)]
#[graphql(rename_items = "SCREAMING_SNAKE_CASE")]
pub enum Permission {
    User,
    Editor,
    Admin,
}

impl From<sundry_core::Permission> for Permission {
    fn from(p: sundry_core::Permission) -> Self {
        match p {
            sundry_core::Permission::User => Self::User,
            sundry_core::Permission::Editor => Self::Editor,
            sundry_core::Permission::Admin => Self::Admin,
        }
    }
}

/// A signed-in user.
#[derive(Debug, Clone, SimpleObject)]
pub struct User {
    pub id: ID,
    pub name: String,
    pub email: String,
    pub permission: Permission,
}

impl From<models::User> for User {
    fn from(user: models::User) -> Self {
        Self {
            id: ID(user.id.to_string()),
            name: user.name,
            email: user.email,
            permission: user.permission.into(),
        }
    }
}

/// A product image asset.
#[derive(Debug, Clone, SimpleObject)]
pub struct ProductImage {
    pub id: ID,
    pub image_url: String,
    pub alt_text: String,
}

impl From<models::ProductImage> for ProductImage {
    fn from(image: models::ProductImage) -> Self {
        Self {
            id: ID(image.id.to_string()),
            image_url: image.image_url,
            alt_text: image.alt_text,
        }
    }
}

/// A catalog entry. `price` is in minor currency units.
#[derive(Debug, Clone, SimpleObject)]
pub struct Product {
    pub id: ID,
    pub name: String,
    pub description: String,
    pub price: i64,
    pub image: Option<ProductImage>,
}

impl From<models::Product> for Product {
    fn from(product: models::Product) -> Self {
        Self {
            id: ID(product.id.to_string()),
            name: product.name,
            description: product.description,
            price: product.price.as_minor(),
            image: product.image.map(ProductImage::from),
        }
    }
}

/// A cart row with its product joined. `product` is null when the catalog
/// entry was deleted after the item was added.
#[derive(Debug, Clone, SimpleObject)]
pub struct CartItem {
    pub id: ID,
    pub quantity: i32,
    pub product: Option<Product>,
}

impl From<models::CartLine> for CartItem {
    fn from(line: models::CartLine) -> Self {
        Self {
            id: ID(line.item.id.to_string()),
            quantity: i32::from(line.item.quantity),
            product: line.product.map(Product::from),
        }
    }
}

/// An immutable purchase-time snapshot of a product.
#[derive(Debug, Clone, SimpleObject)]
pub struct OrderItem {
    pub id: ID,
    pub name: String,
    pub description: String,
    pub price: i64,
    pub quantity: i32,
    pub image_url: Option<String>,
}

impl From<models::OrderItem> for OrderItem {
    fn from(item: models::OrderItem) -> Self {
        Self {
            id: ID(item.id.to_string()),
            name: item.name,
            description: item.description,
            price: item.price.as_minor(),
            quantity: i32::from(item.quantity),
            image_url: item.image_url,
        }
    }
}

/// A completed order.
#[derive(Debug, Clone, SimpleObject)]
pub struct Order {
    pub id: ID,
    pub total: i64,
    pub charge: String,
    pub items: Vec<OrderItem>,
}

impl From<models::OrderWithItems> for Order {
    fn from(order: models::OrderWithItems) -> Self {
        Self {
            id: ID(order.order.id.to_string()),
            total: order.order.total.as_minor(),
            charge: order.order.charge,
            items: order.items.into_iter().map(OrderItem::from).collect(),
        }
    }
}
