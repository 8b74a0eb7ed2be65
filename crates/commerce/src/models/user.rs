//! User identity record.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use sundry_core::{Permission, UserId};

/// A signed-up user.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: UserId,
    pub name: String,
    pub email: String,
    pub permission: Permission,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
