//! Per-field access modes for admin views.

use serde::{Deserialize, Serialize};

/// Access level for one field in one admin view, decided server-side and
/// applied client-side.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldMode {
    /// Field renders an editable input.
    Edit,
    /// Field renders read-only.
    Read,
    /// Field does not render at all.
    Hidden,
}

impl FieldMode {
    /// Whether the field can enter an edit buffer's dirty set.
    #[must_use]
    pub const fn is_editable(&self) -> bool {
        matches!(self, Self::Edit)
    }

    /// Whether the field renders in the view.
    #[must_use]
    pub const fn is_visible(&self) -> bool {
        !matches!(self, Self::Hidden)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_editable_implies_visible() {
        for mode in [FieldMode::Edit, FieldMode::Read, FieldMode::Hidden] {
            if mode.is_editable() {
                assert!(mode.is_visible());
            }
        }
    }

    #[test]
    fn test_serde_spelling() {
        assert_eq!(
            serde_json::to_string(&FieldMode::Hidden).ok().as_deref(),
            Some("\"hidden\"")
        );
    }
}
