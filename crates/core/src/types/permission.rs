//! User permission levels.

use serde::{Deserialize, Serialize};

/// Access level attached to a user record.
///
/// Stored in Postgres as text (`USER` / `EDITOR` / `ADMIN`) and exposed
/// through the API with the same spelling.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Permission {
    /// Regular shopper.
    #[default]
    User,
    /// Can edit catalog content.
    Editor,
    /// Full access.
    Admin,
}

impl Permission {
    /// Database / wire spelling.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::User => "USER",
            Self::Editor => "EDITOR",
            Self::Admin => "ADMIN",
        }
    }

    /// Parse the database spelling. Unknown values fall back to `User`.
    #[must_use]
    pub fn from_str_lossy(value: &str) -> Self {
        match value {
            "EDITOR" => Self::Editor,
            "ADMIN" => Self::Admin,
            _ => Self::User,
        }
    }

    /// Whether this level may edit catalog records.
    #[must_use]
    pub const fn can_edit(&self) -> bool {
        matches!(self, Self::Editor | Self::Admin)
    }
}

impl std::fmt::Display for Permission {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_roundtrip() {
        for p in [Permission::User, Permission::Editor, Permission::Admin] {
            assert_eq!(Permission::from_str_lossy(p.as_str()), p);
        }
    }

    #[test]
    fn test_unknown_falls_back_to_user() {
        assert_eq!(Permission::from_str_lossy("SUPERUSER"), Permission::User);
    }

    #[test]
    fn test_can_edit() {
        assert!(!Permission::User.can_edit());
        assert!(Permission::Editor.can_edit());
        assert!(Permission::Admin.can_edit());
    }
}
