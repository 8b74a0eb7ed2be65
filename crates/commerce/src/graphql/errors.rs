//! Mapping from service errors to GraphQL errors.
//!
//! Every error carries a stable `extensions.code` so clients can branch
//! without parsing messages. Server-class failures are captured to Sentry
//! before they leave the resolver.

use async_graphql::{Error, ErrorExtensions};

use crate::db::RepositoryError;
use crate::services::{CartError, CheckoutError};

/// Stable machine-readable error codes.
pub mod codes {
    pub const UNAUTHENTICATED: &str = "UNAUTHENTICATED";
    pub const NOT_FOUND: &str = "NOT_FOUND";
    pub const EMPTY_CART: &str = "EMPTY_CART";
    pub const PAYMENT_FAILED: &str = "PAYMENT_FAILED";
    pub const ORDER_RECONCILIATION: &str = "ORDER_RECONCILIATION";
    pub const BAD_REQUEST: &str = "BAD_REQUEST";
    pub const INTERNAL: &str = "INTERNAL";
}

fn coded(message: String, code: &'static str) -> Error {
    Error::new(message).extend_with(|_, e| e.set("code", code))
}

impl ErrorExtensions for CartError {
    fn extend(&self) -> Error {
        let code = match self {
            Self::Unauthenticated => codes::UNAUTHENTICATED,
            Self::UnknownProduct(_) => codes::NOT_FOUND,
            Self::Repository(err) => return repository_error(err),
        };
        coded(self.to_string(), code)
    }
}

impl ErrorExtensions for CheckoutError {
    fn extend(&self) -> Error {
        match self {
            Self::Unauthenticated => coded(self.to_string(), codes::UNAUTHENTICATED),
            Self::EmptyCart => coded(self.to_string(), codes::EMPTY_CART),
            Self::Amount(_) => coded(self.to_string(), codes::BAD_REQUEST),
            Self::Payment(_) => coded(self.to_string(), codes::PAYMENT_FAILED),
            Self::ChargedWithoutOrder { charge_id, .. } => {
                sentry::capture_error(self);
                Error::new(self.to_string()).extend_with(|_, e| {
                    e.set("code", codes::ORDER_RECONCILIATION);
                    e.set("chargeId", charge_id.as_str());
                })
            }
            Self::Repository(err) => repository_error(err),
        }
    }
}

/// Storage failures are internal: captured, and reported without detail.
fn repository_error(err: &RepositoryError) -> Error {
    sentry::capture_error(err);
    tracing::error!(error = %err, "repository error reached the API");
    coded("Internal server error".to_string(), codes::INTERNAL)
}
