//! GraphQL schema and axum wiring.
//!
//! The schema holds the services and store handles as context data; per
//! request, the session-derived [`CurrentUser`] is injected into the request
//! data (absence of it is what `UNAUTHENTICATED` errors key off).

pub mod errors;
pub mod mutation;
pub mod query;
pub mod types;

use async_graphql::{EmptySubscription, Schema};
use async_graphql::http::{GraphQLPlaygroundConfig, playground_source};
use async_graphql_axum::{GraphQLRequest, GraphQLResponse};
use axum::extract::State;
use axum::response::{Html, IntoResponse};
use tower_sessions::Session;

use crate::middleware::auth;
use crate::services::{CartService, CheckoutService};
use crate::state::AppState;
use crate::stores::{DynProductStore, DynUserStore};

pub use mutation::MutationRoot;
pub use query::QueryRoot;

/// The executable commerce schema.
pub type CommerceSchema = Schema<QueryRoot, MutationRoot, EmptySubscription>;

/// Dependencies the schema needs at build time.
pub struct SchemaDeps {
    pub cart: CartService,
    pub checkout: CheckoutService,
    pub users: DynUserStore,
    pub products: DynProductStore,
}

/// Build the schema with its services attached as context data.
#[must_use]
pub fn build_schema(deps: SchemaDeps) -> CommerceSchema {
    Schema::build(QueryRoot, MutationRoot, EmptySubscription)
        .data(deps.cart)
        .data(deps.checkout)
        .data(deps.users)
        .data(deps.products)
        .finish()
}

/// POST /graphql - execute a request with the session user injected.
pub async fn graphql_handler(
    State(state): State<AppState>,
    session: Session,
    req: GraphQLRequest,
) -> GraphQLResponse {
    let mut request = req.into_inner();
    if let Some(user) = auth::current_user(&session).await {
        request = request.data(user);
    }
    state.schema().execute(request).await.into()
}

/// GET /graphql - interactive playground for development.
pub async fn playground() -> impl IntoResponse {
    Html(playground_source(GraphQLPlaygroundConfig::new("/graphql")))
}
