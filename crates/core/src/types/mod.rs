//! Shared type definitions.

pub mod field_mode;
pub mod id;
pub mod money;
pub mod permission;
pub mod quantity;

pub use field_mode::FieldMode;
pub use id::{CartItemId, OrderId, OrderItemId, ProductId, ProductImageId, UserId};
pub use money::{Money, MoneyError};
pub use permission::Permission;
pub use quantity::{Quantity, QuantityError};
