//! Item-edit session: dirty tracking, save flow, delete flow.
//!
//! One [`EditSession`] backs one open item page. It keeps the last-applied
//! server snapshot and a live edit buffer, derives the changed-field set
//! under each field's own equality rule, and submits only changed fields.
//! Unsaved edits do not survive an external refetch unless field errors are
//! outstanding.

use std::collections::BTreeMap;

use serde_json::Value;
use thiserror::Error;
use tracing::{debug, instrument};

use crate::api::{ItemApi, ItemSnapshot, UpdateResult};
use crate::notice::Notice;

/// Errors from buffer edits.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum EditError {
    /// No field with that path on the record.
    #[error("unknown field: {0}")]
    UnknownField(String),
    /// The field's mode is `read` or `hidden`.
    #[error("field is not editable: {0}")]
    ReadOnlyField(String),
}

/// Result of a save attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SaveOutcome {
    /// Nothing changed; no request was made.
    NothingToSave,
    /// Invalid fields blocked submission; validation is now forced visible.
    Invalid { fields: Vec<String> },
    /// Everything saved; the dirty set is empty again.
    Saved,
    /// Some fields saved, the listed ones were rejected field-level.
    PartiallySaved { failed_fields: Vec<String> },
    /// The save failed as a whole (top-level error or transport failure).
    Failed,
}

/// Delete confirmation state machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeleteState {
    Idle,
    /// Dialog open, waiting for the operator to confirm.
    Confirming,
    Deleting,
    /// Done; the caller should navigate away.
    Deleted,
    Failed,
}

/// Outcome of a confirmed delete.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeleteOutcome {
    /// Navigate away.
    Deleted,
    Failed,
}

/// An editable view over one record.
pub struct EditSession {
    list: String,
    original: ItemSnapshot,
    buffer: BTreeMap<String, Value>,
    field_errors: BTreeMap<String, String>,
    force_validation: bool,
    delete: DeleteState,
    notices: Vec<Notice>,
}

impl EditSession {
    /// Open a session over a freshly fetched snapshot. The dirty set starts
    /// empty.
    #[must_use]
    pub fn new(list: impl Into<String>, snapshot: ItemSnapshot) -> Self {
        let buffer = deserialize_buffer(&snapshot);
        Self {
            list: list.into(),
            original: snapshot,
            buffer,
            field_errors: BTreeMap::new(),
            force_validation: false,
            delete: DeleteState::Idle,
            notices: Vec::new(),
        }
    }

    /// The record id.
    #[must_use]
    pub fn id(&self) -> &str {
        &self.original.id
    }

    /// Current buffer value for a field.
    #[must_use]
    pub fn value(&self, path: &str) -> Option<&Value> {
        self.buffer.get(path)
    }

    /// Edit one field's buffer value. Clears any outstanding server error
    /// on that field.
    ///
    /// # Errors
    ///
    /// [`EditError::UnknownField`] for paths the record does not have,
    /// [`EditError::ReadOnlyField`] for `read`/`hidden` fields.
    pub fn set_value(&mut self, path: &str, value: Value) -> Result<(), EditError> {
        let field = self
            .original
            .field(path)
            .ok_or_else(|| EditError::UnknownField(path.to_string()))?;
        if !field.meta.mode.is_editable() {
            return Err(EditError::ReadOnlyField(path.to_string()));
        }
        self.field_errors.remove(path);
        self.buffer.insert(path.to_string(), value);
        Ok(())
    }

    /// Field paths whose buffer value differs from the deserialized
    /// original, each compared under its own kind's equality rule.
    #[must_use]
    pub fn changed_fields(&self) -> Vec<String> {
        self.original
            .fields
            .iter()
            .filter(|f| f.meta.mode.is_editable())
            .filter(|f| {
                let baseline = f.meta.kind.deserialize(&f.value);
                self.buffer
                    .get(&f.meta.path)
                    .is_some_and(|current| !f.meta.kind.values_equal(current, &baseline))
            })
            .map(|f| f.meta.path.clone())
            .collect()
    }

    /// Whether save should be enabled.
    #[must_use]
    pub fn is_dirty(&self) -> bool {
        !self.changed_fields().is_empty()
    }

    /// Whether per-field validation should render even on untouched fields.
    #[must_use]
    pub const fn validation_forced(&self) -> bool {
        self.force_validation
    }

    /// Outstanding server-side field errors.
    #[must_use]
    pub const fn field_errors(&self) -> &BTreeMap<String, String> {
        &self.field_errors
    }

    /// Apply an external refetch.
    ///
    /// The buffer resets to the incoming snapshot only when no field-level
    /// errors are outstanding and the snapshot actually differs from the
    /// last-applied one. Unsaved edits are discarded by design.
    pub fn apply_refetch(&mut self, snapshot: ItemSnapshot) {
        if !self.field_errors.is_empty() {
            debug!(id = %snapshot.id, "refetch ignored: field errors outstanding");
            return;
        }
        if snapshots_equal(&self.original, &snapshot) {
            return;
        }
        self.buffer = deserialize_buffer(&snapshot);
        self.original = snapshot;
        self.force_validation = false;
    }

    /// Attempt to save the changed fields.
    ///
    /// With invalid changed fields the session flips into forced-validation
    /// mode and submits nothing. Otherwise only the changed fields'
    /// serialized deltas go out. Field-level response errors (path depth
    /// > 1) stick to their field and leave the rest of the save standing;
    /// top-level errors fail the save and queue an error toast.
    #[instrument(skip(self, api), fields(list = %self.list, id = %self.original.id))]
    pub async fn save(&mut self, api: &dyn ItemApi) -> SaveOutcome {
        let changed = self.changed_fields();
        if changed.is_empty() {
            return SaveOutcome::NothingToSave;
        }

        let invalid = self.invalid_fields(&changed);
        if !invalid.is_empty() {
            self.force_validation = true;
            return SaveOutcome::Invalid { fields: invalid };
        }

        let mut delta = BTreeMap::new();
        for path in &changed {
            if let (Some(field), Some(value)) =
                (self.original.field(path), self.buffer.get(path))
            {
                delta.insert(path.clone(), field.meta.kind.serialize(value));
            }
        }

        match api.update_item(&self.list, &self.original.id, delta.clone()).await {
            Ok(result) => self.apply_update_result(result, &delta),
            Err(err) => {
                self.notices.push(Notice::error(err.to_string()));
                SaveOutcome::Failed
            }
        }
    }

    fn apply_update_result(
        &mut self,
        result: UpdateResult,
        delta: &BTreeMap<String, Value>,
    ) -> SaveOutcome {
        // Every field in the delta was resubmitted; an error that is not
        // re-reported for it is resolved.
        for path in delta.keys() {
            self.field_errors.remove(path);
        }

        let mut failed_fields = Vec::new();
        let mut top_level = Vec::new();
        for err in result.errors {
            if let Some(field) = err.field_path() {
                self.field_errors.insert(field.to_string(), err.message.clone());
                failed_fields.push(field.to_string());
            } else {
                top_level.push(err.message);
            }
        }

        if !top_level.is_empty() {
            // The save failed as a whole; the buffer stays dirty.
            self.notices.push(Notice::error(top_level.join("; ")));
            return SaveOutcome::Failed;
        }

        // Re-baseline: prefer the snapshot the server returned, otherwise
        // fold the submitted delta into the previous original. Rejected
        // fields keep their pre-save baseline so they stay dirty and get
        // resubmitted.
        let new_original = result.snapshot.unwrap_or_else(|| {
            let mut snapshot = self.original.clone();
            for field in &mut snapshot.fields {
                if self.field_errors.contains_key(&field.meta.path) {
                    continue;
                }
                if let Some(value) = delta.get(&field.meta.path) {
                    field.value = value.clone();
                }
            }
            snapshot
        });

        let mut new_buffer = deserialize_buffer(&new_original);
        // Fields the server rejected keep their edited value and stay dirty.
        for path in self.field_errors.keys() {
            if let Some(edited) = self.buffer.get(path) {
                new_buffer.insert(path.clone(), edited.clone());
            }
        }
        self.original = new_original;
        self.buffer = new_buffer;
        self.force_validation = false;

        if failed_fields.is_empty() {
            self.notices.push(Notice::success("Saved"));
            SaveOutcome::Saved
        } else {
            SaveOutcome::PartiallySaved { failed_fields }
        }
    }

    fn invalid_fields(&self, changed: &[String]) -> Vec<String> {
        changed
            .iter()
            .filter(|path| {
                self.original.field(path).is_some_and(|field| {
                    self.buffer.get(*path).is_some_and(|value| {
                        field
                            .meta
                            .kind
                            .validate(value, field.meta.required)
                            .is_err()
                    })
                })
            })
            .cloned()
            .collect()
    }

    /// Open the delete confirmation dialog.
    pub fn request_delete(&mut self) {
        if matches!(self.delete, DeleteState::Idle | DeleteState::Failed) {
            self.delete = DeleteState::Confirming;
        }
    }

    /// Close the dialog without deleting.
    pub fn cancel_delete(&mut self) {
        if self.delete == DeleteState::Confirming {
            self.delete = DeleteState::Idle;
        }
    }

    /// Confirm the pending delete. Only valid from the confirming state.
    #[instrument(skip(self, api), fields(list = %self.list, id = %self.original.id))]
    pub async fn confirm_delete(&mut self, api: &dyn ItemApi) -> DeleteOutcome {
        if self.delete != DeleteState::Confirming {
            return DeleteOutcome::Failed;
        }
        self.delete = DeleteState::Deleting;
        match api.delete_item(&self.list, &self.original.id).await {
            Ok(()) => {
                self.delete = DeleteState::Deleted;
                self.notices.push(Notice::success("Deleted"));
                DeleteOutcome::Deleted
            }
            Err(err) => {
                self.delete = DeleteState::Failed;
                self.notices.push(Notice::error(err.to_string()));
                DeleteOutcome::Failed
            }
        }
    }

    /// Current delete-flow state.
    #[must_use]
    pub const fn delete_state(&self) -> DeleteState {
        self.delete
    }

    /// Drain queued toasts.
    pub fn take_notices(&mut self) -> Vec<Notice> {
        std::mem::take(&mut self.notices)
    }
}

fn deserialize_buffer(snapshot: &ItemSnapshot) -> BTreeMap<String, Value> {
    snapshot
        .fields
        .iter()
        .filter(|f| f.meta.mode.is_editable())
        .map(|f| (f.meta.path.clone(), f.meta.kind.deserialize(&f.value)))
        .collect()
}

fn snapshots_equal(a: &ItemSnapshot, b: &ItemSnapshot) -> bool {
    if a.id != b.id || a.fields.len() != b.fields.len() {
        return false;
    }
    a.fields
        .iter()
        .all(|field| b.field(&field.meta.path).is_some_and(|other| other.value == field.value))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::sync::Mutex;

    use async_trait::async_trait;
    use serde_json::json;

    use sundry_core::FieldMode;

    use crate::api::{ApiError, ApiErrorEntry, FieldKind, FieldMeta, ItemField};
    use crate::notice::NoticeKind;

    use super::*;

    fn meta(path: &str, kind: FieldKind, mode: FieldMode) -> FieldMeta {
        FieldMeta {
            path: path.to_string(),
            label: path.to_string(),
            kind,
            mode,
            required: false,
        }
    }

    fn product_snapshot() -> ItemSnapshot {
        ItemSnapshot {
            id: "42".to_string(),
            fields: vec![
                ItemField {
                    meta: meta("name", FieldKind::Text, FieldMode::Edit),
                    value: json!("Sticker Sheet"),
                },
                ItemField {
                    meta: meta("price", FieldKind::Integer, FieldMode::Edit),
                    value: json!(500),
                },
                ItemField {
                    meta: meta("charge", FieldKind::Text, FieldMode::Read),
                    value: json!("ch_123"),
                },
                ItemField {
                    meta: meta("internalNotes", FieldKind::Text, FieldMode::Hidden),
                    value: json!("secret"),
                },
            ],
        }
    }

    /// Scriptable fake for the item API.
    #[derive(Default)]
    struct FakeApi {
        update_result: Mutex<Option<Result<UpdateResult, ApiError>>>,
        delete_result: Mutex<Option<Result<(), ApiError>>>,
        last_delta: Mutex<Option<BTreeMap<String, Value>>>,
    }

    #[async_trait]
    impl ItemApi for FakeApi {
        async fn fetch_item(&self, _list: &str, id: &str) -> Result<ItemSnapshot, ApiError> {
            Err(ApiError::NotFound(id.to_string()))
        }

        async fn update_item(
            &self,
            _list: &str,
            _id: &str,
            delta: BTreeMap<String, Value>,
        ) -> Result<UpdateResult, ApiError> {
            *self.last_delta.lock().unwrap() = Some(delta);
            self.update_result
                .lock()
                .unwrap()
                .take()
                .unwrap_or(Ok(UpdateResult::default()))
        }

        async fn delete_item(&self, _list: &str, _id: &str) -> Result<(), ApiError> {
            self.delete_result.lock().unwrap().take().unwrap_or(Ok(()))
        }
    }

    #[test]
    fn test_fresh_session_is_clean() {
        let session = EditSession::new("products", product_snapshot());
        assert!(session.changed_fields().is_empty());
        assert!(!session.is_dirty());
    }

    #[test]
    fn test_single_edit_dirties_one_field() {
        let mut session = EditSession::new("products", product_snapshot());
        session.set_value("price", json!(700)).unwrap();
        assert_eq!(session.changed_fields(), vec!["price".to_string()]);
    }

    #[test]
    fn test_equal_edit_is_not_dirty() {
        let mut session = EditSession::new("products", product_snapshot());
        session.set_value("name", json!("Sticker Sheet")).unwrap();
        assert!(!session.is_dirty());
    }

    #[test]
    fn test_read_and_hidden_fields_reject_edits() {
        let mut session = EditSession::new("products", product_snapshot());
        assert_eq!(
            session.set_value("charge", json!("x")),
            Err(EditError::ReadOnlyField("charge".to_string()))
        );
        assert_eq!(
            session.set_value("internalNotes", json!("x")),
            Err(EditError::ReadOnlyField("internalNotes".to_string()))
        );
        assert_eq!(
            session.set_value("missing", json!(1)),
            Err(EditError::UnknownField("missing".to_string()))
        );
    }

    #[test]
    fn test_refetch_resets_buffer_when_clean() {
        let mut session = EditSession::new("products", product_snapshot());
        session.set_value("price", json!(700)).unwrap();

        let mut incoming = product_snapshot();
        incoming.fields[1].value = json!(999);
        session.apply_refetch(incoming);

        // Unsaved edit discarded, buffer tracks the new snapshot
        assert!(!session.is_dirty());
        assert_eq!(session.value("price"), Some(&json!(999)));
    }

    #[test]
    fn test_refetch_identical_snapshot_keeps_edits() {
        let mut session = EditSession::new("products", product_snapshot());
        session.set_value("price", json!(700)).unwrap();
        session.apply_refetch(product_snapshot());
        assert!(session.is_dirty());
        assert_eq!(session.value("price"), Some(&json!(700)));
    }

    #[test]
    fn test_refetch_blocked_by_field_errors() {
        let mut session = EditSession::new("products", product_snapshot());
        session
            .field_errors
            .insert("price".to_string(), "too low".to_string());

        let mut incoming = product_snapshot();
        incoming.fields[1].value = json!(999);
        session.apply_refetch(incoming);

        assert_eq!(session.value("price"), Some(&json!(500)));
    }

    #[tokio::test]
    async fn test_save_nothing_changed() {
        let mut session = EditSession::new("products", product_snapshot());
        let api = FakeApi::default();
        assert_eq!(session.save(&api).await, SaveOutcome::NothingToSave);
        assert!(api.last_delta.lock().unwrap().is_none());
    }

    #[tokio::test]
    async fn test_save_submits_only_changed_fields() {
        let mut session = EditSession::new("products", product_snapshot());
        session.set_value("price", json!(700)).unwrap();
        let api = FakeApi::default();

        assert_eq!(session.save(&api).await, SaveOutcome::Saved);

        let delta = api.last_delta.lock().unwrap().clone().unwrap();
        assert_eq!(delta.len(), 1);
        assert_eq!(delta.get("price"), Some(&json!(700)));

        // Dirty set clears on success
        assert!(!session.is_dirty());
        let notices = session.take_notices();
        assert_eq!(notices.len(), 1);
        assert_eq!(notices[0].kind, NoticeKind::Success);
    }

    #[tokio::test]
    async fn test_save_invalid_forces_validation_without_submitting() {
        let mut session = EditSession::new("products", product_snapshot());
        session.set_value("price", json!("not a number")).unwrap();
        let api = FakeApi::default();

        let outcome = session.save(&api).await;
        assert_eq!(
            outcome,
            SaveOutcome::Invalid {
                fields: vec!["price".to_string()]
            }
        );
        assert!(session.validation_forced());
        assert!(api.last_delta.lock().unwrap().is_none());
    }

    #[tokio::test]
    async fn test_field_level_error_keeps_other_saves() {
        let mut session = EditSession::new("products", product_snapshot());
        session.set_value("name", json!("New Name")).unwrap();
        session.set_value("price", json!(-1)).unwrap();

        let api = FakeApi::default();
        *api.update_result.lock().unwrap() = Some(Ok(UpdateResult {
            snapshot: None,
            errors: vec![ApiErrorEntry {
                message: "price must be positive".to_string(),
                path: vec!["updateProduct".to_string(), "price".to_string()],
            }],
        }));

        let outcome = session.save(&api).await;
        assert_eq!(
            outcome,
            SaveOutcome::PartiallySaved {
                failed_fields: vec!["price".to_string()]
            }
        );

        // name re-baselined, price still dirty with its error attached
        assert_eq!(session.changed_fields(), vec!["price".to_string()]);
        assert_eq!(
            session.field_errors().get("price").map(String::as_str),
            Some("price must be positive")
        );
    }

    #[tokio::test]
    async fn test_rejected_field_resubmits_on_next_save() {
        let mut session = EditSession::new("products", product_snapshot());
        session.set_value("name", json!("New Name")).unwrap();
        session.set_value("price", json!(-1)).unwrap();

        let api = FakeApi::default();
        *api.update_result.lock().unwrap() = Some(Ok(UpdateResult {
            snapshot: None,
            errors: vec![ApiErrorEntry {
                message: "price must be positive".to_string(),
                path: vec!["updateProduct".to_string(), "price".to_string()],
            }],
        }));
        let outcome = session.save(&api).await;
        assert!(matches!(outcome, SaveOutcome::PartiallySaved { .. }));
        assert_eq!(session.changed_fields(), vec!["price".to_string()]);

        // The retry submits only the rejected field; acceptance clears
        // both the dirty set and the stored error
        assert_eq!(session.save(&api).await, SaveOutcome::Saved);
        let delta = api.last_delta.lock().unwrap().clone().unwrap();
        assert_eq!(delta.len(), 1);
        assert_eq!(delta.get("price"), Some(&json!(-1)));
        assert!(!session.is_dirty());
        assert!(session.field_errors().is_empty());
    }

    #[tokio::test]
    async fn test_top_level_error_is_a_failed_save_with_toast() {
        let mut session = EditSession::new("products", product_snapshot());
        session.set_value("name", json!("New Name")).unwrap();

        let api = FakeApi::default();
        *api.update_result.lock().unwrap() = Some(Ok(UpdateResult {
            snapshot: None,
            errors: vec![ApiErrorEntry {
                message: "you do not have access".to_string(),
                path: vec!["updateProduct".to_string()],
            }],
        }));

        assert_eq!(session.save(&api).await, SaveOutcome::Failed);
        assert!(session.is_dirty());
        let notices = session.take_notices();
        assert_eq!(notices[0].kind, NoticeKind::Error);
    }

    #[tokio::test]
    async fn test_delete_two_step_confirm() {
        let mut session = EditSession::new("products", product_snapshot());
        let api = FakeApi::default();

        // Confirm without the dialog open does nothing
        assert_eq!(session.confirm_delete(&api).await, DeleteOutcome::Failed);
        assert_eq!(session.delete_state(), DeleteState::Idle);

        session.request_delete();
        assert_eq!(session.delete_state(), DeleteState::Confirming);
        assert_eq!(session.confirm_delete(&api).await, DeleteOutcome::Deleted);
        assert_eq!(session.delete_state(), DeleteState::Deleted);
    }

    #[tokio::test]
    async fn test_delete_failure_reports_toast() {
        let mut session = EditSession::new("products", product_snapshot());
        let api = FakeApi::default();
        *api.delete_result.lock().unwrap() =
            Some(Err(ApiError::Transport("connection reset".to_string())));

        session.request_delete();
        assert_eq!(session.confirm_delete(&api).await, DeleteOutcome::Failed);
        assert_eq!(session.delete_state(), DeleteState::Failed);
        let notices = session.take_notices();
        assert_eq!(notices[0].kind, NoticeKind::Error);
    }

    #[test]
    fn test_delete_cancel() {
        let mut session = EditSession::new("products", product_snapshot());
        session.request_delete();
        session.cancel_delete();
        assert_eq!(session.delete_state(), DeleteState::Idle);
    }
}
