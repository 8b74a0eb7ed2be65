//! Payment provider client.
//!
//! The provider contract is one call: create a charge for an amount and a
//! payment-method token, confirmed synchronously. [`StripeGateway`] is the
//! production implementation; tests script a mock against the trait.

use std::sync::Arc;

use async_trait::async_trait;
use rand::Rng;
use rand::distr::Alphanumeric;
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use thiserror::Error;
use tracing::{info, instrument, warn};

use sundry_core::Money;

use crate::config::PaymentConfig;

pub type DynPaymentGateway = Arc<dyn PaymentGateway>;

/// A confirmed charge as reported by the provider.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Charge {
    /// Provider charge identifier, stored on the order.
    pub id: String,
    /// Amount the provider confirmed, in minor units.
    pub amount: Money,
}

/// Errors from the payment provider.
#[derive(Debug, Error)]
pub enum PaymentError {
    /// The provider refused the charge (card declined, bad token, ...).
    #[error("charge declined: {message}")]
    Declined { message: String },

    /// Transport-level failure talking to the provider.
    #[error("payment transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// The provider answered something we cannot interpret.
    #[error("unexpected provider response: {0}")]
    Protocol(String),
}

/// Synchronous create-and-confirm charge operation.
#[async_trait]
pub trait PaymentGateway: Send + Sync {
    /// Charge `amount` against `token`, requesting synchronous confirmation.
    ///
    /// # Errors
    ///
    /// Any [`PaymentError`] aborts checkout before an order is created.
    async fn create_and_confirm_charge(
        &self,
        amount: Money,
        currency: &str,
        token: &str,
    ) -> Result<Charge, PaymentError>;
}

/// Stripe-style payment-intent client.
pub struct StripeGateway {
    http: reqwest::Client,
    secret_key: SecretString,
    api_url: String,
}

#[derive(Deserialize)]
struct PaymentIntentResponse {
    id: String,
    amount: i64,
    status: String,
}

#[derive(Deserialize)]
struct ProviderErrorBody {
    error: ProviderErrorDetail,
}

#[derive(Deserialize)]
struct ProviderErrorDetail {
    message: Option<String>,
}

impl StripeGateway {
    /// Build a gateway from payment configuration.
    #[must_use]
    pub fn new(config: &PaymentConfig) -> Self {
        Self {
            http: reqwest::Client::new(),
            secret_key: config.secret_key.clone(),
            api_url: config.api_url.trim_end_matches('/').to_string(),
        }
    }

    fn idempotency_key() -> String {
        let suffix: String = rand::rng()
            .sample_iter(&Alphanumeric)
            .take(24)
            .map(char::from)
            .collect();
        format!("sundry-{suffix}")
    }
}

#[async_trait]
impl PaymentGateway for StripeGateway {
    #[instrument(skip(self, token), fields(amount = %amount))]
    async fn create_and_confirm_charge(
        &self,
        amount: Money,
        currency: &str,
        token: &str,
    ) -> Result<Charge, PaymentError> {
        let params = [
            ("amount", amount.as_minor().to_string()),
            ("currency", currency.to_string()),
            ("payment_method", token.to_string()),
            ("confirm", "true".to_string()),
        ];

        let response = self
            .http
            .post(format!("{}/v1/payment_intents", self.api_url))
            .bearer_auth(self.secret_key.expose_secret())
            .header("Idempotency-Key", Self::idempotency_key())
            .form(&params)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let message = response
                .json::<ProviderErrorBody>()
                .await
                .ok()
                .and_then(|body| body.error.message)
                .unwrap_or_else(|| format!("provider returned {status}"));
            warn!(%status, "charge refused by provider");
            return Err(PaymentError::Declined { message });
        }

        let intent: PaymentIntentResponse = response.json().await?;
        if intent.status != "succeeded" {
            return Err(PaymentError::Protocol(format!(
                "expected synchronous confirmation, got status {:?}",
                intent.status
            )));
        }

        info!(charge_id = %intent.id, "charge confirmed");
        Ok(Charge {
            id: intent.id,
            amount: Money::from_minor(intent.amount),
        })
    }
}
