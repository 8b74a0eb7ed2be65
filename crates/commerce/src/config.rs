//! Commerce service configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Required
//! - `COMMERCE_DATABASE_URL` - `PostgreSQL` connection string
//! - `COMMERCE_SESSION_SECRET` - Session cookie signing secret (min 64 bytes)
//! - `PAYMENT_SECRET_KEY` - Payment provider secret API key
//!
//! ## Optional
//! - `COMMERCE_HOST` - Bind address (default: 127.0.0.1)
//! - `COMMERCE_PORT` - Listen port (default: 3000)
//! - `PAYMENT_API_URL` - Payment provider base URL (default: <https://api.stripe.com>)
//! - `PAYMENT_CURRENCY` - ISO 4217 lowercase currency code (default: usd)
//! - `SENTRY_DSN` - Sentry error tracking DSN

use std::net::{IpAddr, SocketAddr};

use secrecy::{ExposeSecret, SecretString};
use thiserror::Error;

const MIN_SESSION_SECRET_LENGTH: usize = 64;

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(String),
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
    #[error("Insecure secret in {0}: {1}")]
    InsecureSecret(String, String),
}

/// Commerce application configuration.
#[derive(Debug, Clone)]
pub struct CommerceConfig {
    /// `PostgreSQL` database connection URL (contains password)
    pub database_url: SecretString,
    /// IP address to bind the server to
    pub host: IpAddr,
    /// Port to listen on
    pub port: u16,
    /// Session cookie signing secret
    pub session_secret: SecretString,
    /// Payment provider configuration
    pub payment: PaymentConfig,
    /// Sentry DSN for error tracking
    pub sentry_dsn: Option<String>,
}

/// Payment provider configuration.
///
/// Implements `Debug` manually to redact the secret key.
#[derive(Clone)]
pub struct PaymentConfig {
    /// Provider secret API key (server-side only)
    pub secret_key: SecretString,
    /// Provider API base URL
    pub api_url: String,
    /// Currency charged at checkout, ISO 4217 lowercase (e.g. "usd")
    pub currency: String,
}

impl std::fmt::Debug for PaymentConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PaymentConfig")
            .field("secret_key", &"[REDACTED]")
            .field("api_url", &self.api_url)
            .field("currency", &self.currency)
            .finish()
    }
}

impl CommerceConfig {
    /// Load configuration from environment variables.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when a required variable is missing, a value
    /// fails to parse, or the session secret is too short to sign cookies.
    pub fn from_env() -> Result<Self, ConfigError> {
        let database_url = SecretString::from(require_env("COMMERCE_DATABASE_URL")?);

        let host = optional_env("COMMERCE_HOST")
            .unwrap_or_else(|| "127.0.0.1".to_string())
            .parse::<IpAddr>()
            .map_err(|e| ConfigError::InvalidEnvVar("COMMERCE_HOST".into(), e.to_string()))?;

        let port = optional_env("COMMERCE_PORT")
            .unwrap_or_else(|| "3000".to_string())
            .parse::<u16>()
            .map_err(|e| ConfigError::InvalidEnvVar("COMMERCE_PORT".into(), e.to_string()))?;

        let session_secret = require_env("COMMERCE_SESSION_SECRET")?;
        if session_secret.len() < MIN_SESSION_SECRET_LENGTH {
            return Err(ConfigError::InsecureSecret(
                "COMMERCE_SESSION_SECRET".into(),
                format!("must be at least {MIN_SESSION_SECRET_LENGTH} bytes"),
            ));
        }

        let payment = PaymentConfig {
            secret_key: SecretString::from(require_env("PAYMENT_SECRET_KEY")?),
            api_url: optional_env("PAYMENT_API_URL")
                .unwrap_or_else(|| "https://api.stripe.com".to_string()),
            currency: optional_env("PAYMENT_CURRENCY").unwrap_or_else(|| "usd".to_string()),
        };

        Ok(Self {
            database_url,
            host,
            port,
            session_secret: SecretString::from(session_secret),
            payment,
            sentry_dsn: optional_env("SENTRY_DSN"),
        })
    }

    /// Socket address to bind the server to.
    #[must_use]
    pub const fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }

    /// Session signing secret bytes.
    #[must_use]
    pub fn session_secret_bytes(&self) -> &[u8] {
        self.session_secret.expose_secret().as_bytes()
    }
}

fn require_env(name: &str) -> Result<String, ConfigError> {
    std::env::var(name).map_err(|_| ConfigError::MissingEnvVar(name.to_string()))
}

fn optional_env(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|v| !v.is_empty())
}
