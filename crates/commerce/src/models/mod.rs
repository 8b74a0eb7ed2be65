//! Domain models for the commerce service.

mod cart;
mod order;
mod product;
mod user;

pub use cart::{CartItem, CartLine};
pub use order::{Order, OrderItem, OrderItemSnapshot, OrderWithItems};
pub use product::{Product, ProductImage};
pub use user::User;
