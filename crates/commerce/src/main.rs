//! Sundry commerce service - cart and checkout GraphQL API.
//!
//! # Architecture
//!
//! - Axum serving a single GraphQL endpoint (`async-graphql`)
//! - `PostgreSQL` for users, catalog, carts, and orders
//! - tower-sessions (Postgres-backed) carrying the signed-in user
//! - Payment provider reached through the `PaymentGateway` seam
//!
//! Session establishment (login) is owned by the hosting deployment; this
//! binary only consumes the session.

#![cfg_attr(not(test), forbid(unsafe_code))]

use axum::{Router, http::StatusCode, routing::get};
use sentry::integrations::tracing as sentry_tracing;
use tower_http::trace::TraceLayer;
use tower_sessions::{SessionManagerLayer, cookie::Key};
use tower_sessions_sqlx_store::PostgresStore;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use sundry_commerce::config::CommerceConfig;
use sundry_commerce::state::AppState;
use sundry_commerce::{db, graphql};

/// Initialize Sentry error tracking and return guard that must be kept alive.
fn init_sentry(config: &CommerceConfig) -> Option<sentry::ClientInitGuard> {
    let dsn = config.sentry_dsn.as_ref()?;

    let guard = sentry::init((
        dsn.as_str(),
        sentry::ClientOptions {
            release: sentry::release_name!(),
            attach_stacktrace: true,
            ..Default::default()
        },
    ));

    tracing::info!("Sentry initialized");
    Some(guard)
}

/// Filter tracing events to Sentry event types.
fn sentry_event_filter(metadata: &tracing::Metadata<'_>) -> sentry_tracing::EventFilter {
    match *metadata.level() {
        tracing::Level::ERROR | tracing::Level::WARN => sentry_tracing::EventFilter::Event,
        tracing::Level::INFO | tracing::Level::DEBUG => sentry_tracing::EventFilter::Breadcrumb,
        _ => sentry_tracing::EventFilter::Ignore,
    }
}

async fn health() -> StatusCode {
    StatusCode::OK
}

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    let config = CommerceConfig::from_env().expect("Failed to load configuration");

    // Sentry must come up before the tracing subscriber
    let _sentry_guard = init_sentry(&config);

    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "sundry_commerce=info,tower_http=debug".into());

    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer())
        .with(sentry_tracing::layer().event_filter(sentry_event_filter))
        .init();

    let pool = db::create_pool(&config.database_url)
        .await
        .expect("Failed to create database pool");
    tracing::info!("Database pool created");

    // NOTE: schema migrations are NOT run automatically on startup.
    // Run them explicitly via: cargo run -p sundry-cli -- migrate

    let session_store = PostgresStore::new(pool.clone());
    session_store
        .migrate()
        .await
        .expect("Failed to set up session storage");

    let session_key =
        Key::try_from(config.session_secret_bytes()).expect("Invalid session secret");
    let session_layer = SessionManagerLayer::new(session_store)
        .with_secure(false)
        .with_signed(session_key);

    let addr = config.socket_addr();
    let state = AppState::new(config, pool);

    let app = Router::new()
        .route("/health", get(health))
        .route(
            "/graphql",
            get(graphql::playground).post(graphql::graphql_handler),
        )
        .layer(session_layer)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
        // Sentry layers (outermost for full request coverage)
        .layer(sentry_tower::NewSentryLayer::new_from_top())
        .layer(sentry_tower::SentryHttpLayer::with_transaction());

    tracing::info!(%addr, "commerce service listening");
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .expect("Failed to bind listen address");
    axum::serve(listener, app).await.expect("Server error");
}
