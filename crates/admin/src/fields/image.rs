//! Image form field: local-file selection vs. remote-asset state.
//!
//! The field never uploads anything. It stages a preview for a locally
//! selected file and, on submit, hands the hosting form an optional file
//! payload plus a hidden `action` value describing the pending server-side
//! effect (`delete`, `reset`, or nothing).

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

/// MIME types the field accepts for a local selection.
pub const ALLOWED_MIME_TYPES: [&str; 10] = [
    "image/gif",
    "image/png",
    "image/jpeg",
    "image/bmp",
    "image/x-icon",
    "application/pdf",
    "image/tiff",
    "application/postscript",
    "image/vnd.adobe.photoshop",
    "image/svg+xml",
];

/// Pending server-side effect for a removed remote asset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ImageAction {
    /// Permanently delete the remote asset.
    Delete,
    /// Unlink the asset from the record but keep it stored.
    Reset,
}

impl ImageAction {
    /// Wire value for the hidden form input.
    #[must_use]
    pub const fn as_form_value(self) -> &'static str {
        match self {
            Self::Delete => "delete",
            Self::Reset => "reset",
        }
    }
}

/// Where the field currently is.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ImageFieldState {
    /// No image at all.
    Empty,
    /// A local file is selected and will upload on submit.
    LocalPending {
        file_name: String,
        mime: String,
        /// Data-URL preview, filled in asynchronously once the file read
        /// completes.
        preview: Option<String>,
    },
    /// The record already has a remote asset.
    Remote { url: String },
    /// The remote asset is scheduled for removal on submit.
    RemoveScheduled { url: String, action: ImageAction },
}

/// Field-local failures. All recoverable; the state is left untouched.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ImageFieldError {
    /// Selection of a file outside [`ALLOWED_MIME_TYPES`]. Surfaced to
    /// the operator as a blocking alert.
    #[error("Please upload a valid image type: {0}")]
    UnsupportedType(String),
}

/// Ticket tying an asynchronous file read to the selection that started
/// it. A preview arriving under a stale ticket is dropped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FileReadTicket(u64);

/// What the hosting form submits for this field.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct FormFields {
    /// File to upload, when a local selection is pending.
    pub file: Option<FilePayload>,
    /// Hidden `action` input value, when a removal is scheduled.
    pub action: Option<&'static str>,
}

/// The staged local file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilePayload {
    pub file_name: String,
    pub mime: String,
}

/// The image field itself.
pub struct ImageField {
    state: ImageFieldState,
    auto_cleanup: bool,
    generation: u64,
    detached: bool,
}

impl ImageField {
    /// A field with no existing asset.
    #[must_use]
    pub const fn new(auto_cleanup: bool) -> Self {
        Self {
            state: ImageFieldState::Empty,
            auto_cleanup,
            generation: 0,
            detached: false,
        }
    }

    /// A field over a record that already has a remote asset.
    #[must_use]
    pub fn with_remote(url: impl Into<String>, auto_cleanup: bool) -> Self {
        Self {
            state: ImageFieldState::Remote { url: url.into() },
            auto_cleanup,
            generation: 0,
            detached: false,
        }
    }

    /// Current state.
    #[must_use]
    pub const fn state(&self) -> &ImageFieldState {
        &self.state
    }

    /// Stage a local file selection. The preview arrives later via
    /// [`apply_preview`](Self::apply_preview) under the returned ticket.
    ///
    /// # Errors
    ///
    /// [`ImageFieldError::UnsupportedType`] for a MIME type outside the
    /// allow-list; the field stays in its prior state and the partial
    /// selection is dropped.
    pub fn select_file(
        &mut self,
        file_name: impl Into<String>,
        mime: impl Into<String>,
    ) -> Result<FileReadTicket, ImageFieldError> {
        let mime = mime.into();
        if !ALLOWED_MIME_TYPES.contains(&mime.as_str()) {
            debug!(%mime, "rejected file selection");
            return Err(ImageFieldError::UnsupportedType(mime));
        }
        self.generation += 1;
        self.state = ImageFieldState::LocalPending {
            file_name: file_name.into(),
            mime,
            preview: None,
        };
        Ok(FileReadTicket(self.generation))
    }

    /// Deliver an asynchronously read data-URL preview. Ignored when the
    /// ticket is stale (a newer selection or cancel happened) or the field
    /// was detached.
    pub fn apply_preview(&mut self, ticket: FileReadTicket, data_url: impl Into<String>) {
        if self.detached || ticket.0 != self.generation {
            return;
        }
        if let ImageFieldState::LocalPending { preview, .. } = &mut self.state {
            *preview = Some(data_url.into());
        }
    }

    /// Schedule removal of the remote asset. No-op outside the remote
    /// state.
    ///
    /// With auto-cleanup on, a plain click deletes and a modified click
    /// resets; with auto-cleanup off the mapping is the other way around.
    /// The inversion is long-standing behavior that operators rely on.
    pub fn remove(&mut self, modifier_held: bool) {
        if let ImageFieldState::Remote { url } = &self.state {
            let action = match (self.auto_cleanup, modifier_held) {
                (true, false) | (false, true) => ImageAction::Delete,
                (true, true) | (false, false) => ImageAction::Reset,
            };
            self.state = ImageFieldState::RemoveScheduled {
                url: url.clone(),
                action,
            };
        }
    }

    /// Clear a scheduled removal and restore the remote display.
    pub fn undo_remove(&mut self) {
        if let ImageFieldState::RemoveScheduled { url, .. } = &self.state {
            self.state = ImageFieldState::Remote { url: url.clone() };
        }
    }

    /// Drop the pending local selection and reset the file input.
    pub fn cancel_local(&mut self) {
        if matches!(self.state, ImageFieldState::LocalPending { .. }) {
            self.generation += 1;
            self.state = ImageFieldState::Empty;
        }
    }

    /// Mark the field as unmounted. Late preview deliveries are dropped
    /// from then on.
    pub fn detach(&mut self) {
        self.detached = true;
    }

    /// What the hosting form should submit for this field.
    #[must_use]
    pub fn form_fields(&self) -> FormFields {
        match &self.state {
            ImageFieldState::Empty | ImageFieldState::Remote { .. } => FormFields::default(),
            ImageFieldState::LocalPending {
                file_name, mime, ..
            } => FormFields {
                file: Some(FilePayload {
                    file_name: file_name.clone(),
                    mime: mime.clone(),
                }),
                action: None,
            },
            ImageFieldState::RemoveScheduled { action, .. } => FormFields {
                file: None,
                action: Some(action.as_form_value()),
            },
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_every_allowed_mime_type_is_accepted() {
        for mime in ALLOWED_MIME_TYPES {
            let mut field = ImageField::new(true);
            assert!(field.select_file("asset", mime).is_ok(), "rejected {mime}");
            assert!(matches!(
                field.state(),
                ImageFieldState::LocalPending { .. }
            ));
        }
    }

    #[test]
    fn test_text_plain_rejected_and_state_unchanged() {
        let mut field = ImageField::new(true);
        let err = field.select_file("notes.txt", "text/plain").unwrap_err();
        assert_eq!(err, ImageFieldError::UnsupportedType("text/plain".into()));
        assert_eq!(*field.state(), ImageFieldState::Empty);
        assert_eq!(field.form_fields(), FormFields::default());
    }

    #[test]
    fn test_rejection_preserves_remote_state() {
        let mut field = ImageField::with_remote("https://cdn.test/a.png", true);
        assert!(field.select_file("x.txt", "text/plain").is_err());
        assert_eq!(
            *field.state(),
            ImageFieldState::Remote {
                url: "https://cdn.test/a.png".into()
            }
        );
    }

    #[test]
    fn test_preview_applies_under_current_ticket() {
        let mut field = ImageField::new(true);
        let ticket = field.select_file("a.png", "image/png").unwrap();
        field.apply_preview(ticket, "data:image/png;base64,AAAA");
        match field.state() {
            ImageFieldState::LocalPending { preview, .. } => {
                assert_eq!(preview.as_deref(), Some("data:image/png;base64,AAAA"));
            }
            other => panic!("unexpected state: {other:?}"),
        }
    }

    #[test]
    fn test_stale_preview_is_dropped() {
        let mut field = ImageField::new(true);
        let stale = field.select_file("a.png", "image/png").unwrap();
        let _fresh = field.select_file("b.png", "image/png").unwrap();
        field.apply_preview(stale, "data:old");
        match field.state() {
            ImageFieldState::LocalPending {
                file_name, preview, ..
            } => {
                assert_eq!(file_name, "b.png");
                assert!(preview.is_none());
            }
            other => panic!("unexpected state: {other:?}"),
        }
    }

    #[test]
    fn test_detached_field_ignores_preview() {
        let mut field = ImageField::new(true);
        let ticket = field.select_file("a.png", "image/png").unwrap();
        field.detach();
        field.apply_preview(ticket, "data:late");
        match field.state() {
            ImageFieldState::LocalPending { preview, .. } => assert!(preview.is_none()),
            other => panic!("unexpected state: {other:?}"),
        }
    }

    #[test]
    fn test_cancel_local_resets_to_empty() {
        let mut field = ImageField::new(true);
        let ticket = field.select_file("a.png", "image/png").unwrap();
        field.cancel_local();
        assert_eq!(*field.state(), ImageFieldState::Empty);
        // The old read completing after cancel must not resurrect a preview
        field.apply_preview(ticket, "data:late");
        assert_eq!(*field.state(), ImageFieldState::Empty);
    }

    #[test]
    fn test_remove_mapping_with_auto_cleanup_on() {
        let mut plain = ImageField::with_remote("u", true);
        plain.remove(false);
        assert_eq!(plain.form_fields().action, Some("delete"));

        let mut modified = ImageField::with_remote("u", true);
        modified.remove(true);
        assert_eq!(modified.form_fields().action, Some("reset"));
    }

    #[test]
    fn test_remove_mapping_inverts_with_auto_cleanup_off() {
        let mut plain = ImageField::with_remote("u", false);
        plain.remove(false);
        assert_eq!(plain.form_fields().action, Some("reset"));

        let mut modified = ImageField::with_remote("u", false);
        modified.remove(true);
        assert_eq!(modified.form_fields().action, Some("delete"));
    }

    #[test]
    fn test_toggling_auto_cleanup_swaps_both_actions() {
        for modifier in [false, true] {
            let mut on = ImageField::with_remote("u", true);
            on.remove(modifier);
            let mut off = ImageField::with_remote("u", false);
            off.remove(modifier);
            assert_ne!(on.form_fields().action, off.form_fields().action);
        }
    }

    #[test]
    fn test_undo_remove_restores_remote() {
        let mut field = ImageField::with_remote("https://cdn.test/a.png", true);
        field.remove(false);
        field.undo_remove();
        assert_eq!(
            *field.state(),
            ImageFieldState::Remote {
                url: "https://cdn.test/a.png".into()
            }
        );
        assert_eq!(field.form_fields(), FormFields::default());
    }

    #[test]
    fn test_remove_is_noop_outside_remote() {
        let mut field = ImageField::new(true);
        field.remove(false);
        assert_eq!(*field.state(), ImageFieldState::Empty);
    }

    #[test]
    fn test_local_pending_submits_file_without_action() {
        let mut field = ImageField::new(true);
        field.select_file("a.png", "image/png").unwrap();
        let fields = field.form_fields();
        assert_eq!(
            fields.file,
            Some(FilePayload {
                file_name: "a.png".into(),
                mime: "image/png".into()
            })
        );
        assert!(fields.action.is_none());
    }
}
