//! Business services for the commerce API.
//!
//! Each service owns one mutation's rules and talks to storage through the
//! traits in [`crate::stores`], and to the payment provider through
//! [`payment::PaymentGateway`].

pub mod cart;
pub mod checkout;
pub mod payment;

pub use cart::{CartError, CartService};
pub use checkout::{CheckoutError, CheckoutService};
pub use payment::{Charge, DynPaymentGateway, PaymentError, PaymentGateway, StripeGateway};
