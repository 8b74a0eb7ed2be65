//! Catalog entries.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use sundry_core::{Money, ProductId, ProductImageId, UserId};

/// A remote image asset owned by at most one product.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProductImage {
    pub id: ProductImageId,
    pub image_url: String,
    pub alt_text: String,
}

/// A catalog entry. `price` is in minor currency units.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Product {
    pub id: ProductId,
    pub name: String,
    pub description: String,
    pub price: Money,
    pub image: Option<ProductImage>,
    pub author_id: UserId,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
