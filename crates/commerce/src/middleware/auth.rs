//! Session-derived authentication context.
//!
//! Session *establishment* (login flows) is owned by the hosting deployment;
//! this module only reads the signed-in user back out of the session and
//! hands it to the GraphQL layer. Requests without one simply execute
//! unauthenticated, and the mutations reject them.

use serde::{Deserialize, Serialize};
use tower_sessions::Session;

use sundry_core::UserId;

/// Session storage keys.
pub mod session_keys {
    /// Serialized [`CurrentUser`].
    pub const CURRENT_USER: &str = "current_user";
}

/// The authenticated user attached to a request.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct CurrentUser {
    pub id: UserId,
}

/// Read the current user from the session, if any.
pub async fn current_user(session: &Session) -> Option<CurrentUser> {
    session
        .get::<CurrentUser>(session_keys::CURRENT_USER)
        .await
        .ok()
        .flatten()
}

/// Record the signed-in user on the session.
///
/// # Errors
///
/// Returns the session store error if persistence fails.
pub async fn set_current_user(
    session: &Session,
    user: CurrentUser,
) -> Result<(), tower_sessions::session::Error> {
    session.insert(session_keys::CURRENT_USER, user).await
}
