//! Which service the detail view shows, and the actions routed through it.

use std::collections::HashSet;
use std::sync::Arc;
use tokio::sync::watch;
use shared::protocol::TestOutcome;
use shared::types::{Event, LinkedService, ServiceId, ServiceType};
use crate::error::ManagerError;
use crate::events;
use crate::form::FormController;
use crate::gateway::PersistenceGateway;
use crate::presenter::{NoticeKind, Presenter};
use crate::registry::ServiceRegistry;

pub const SAVED: &str = "Linked service saved successfully!";
pub const UPDATED: &str = "Linked service updated successfully!";
pub const SAVE_FAILED: &str = "Error saving service. Please try again.";
pub const DELETED: &str = "Linked service deleted successfully!";
pub const DELETE_FAILED: &str = "Error deleting service. Please try again.";
pub const CONFIRM_DELETE_TITLE: &str = "Confirm Delete";
pub const CONFIRM_DELETE_MESSAGE: &str = "Are you sure you want to delete this linked service?";
pub const AI_TEST_UNAVAILABLE: &str = "AI API connection test is not available";
pub const FILE_MISSING: &str = "Please upload a file first";
pub const FILE_READY: &str = "File uploaded successfully! File service is ready to use.";
pub const NOTHING_SELECTED: &str = "Please select or create a service first";
pub const TEST_PASSED: &str = "Connection test successful!";
pub const TEST_ERROR: &str = "Error testing connection";

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Selection {
    #[default]
    Empty,
    EditingNew,
    EditingExisting(ServiceId),
}

/// Everything the detail view renders.
#[derive(Debug, Clone, Default)]
pub struct EditorState {
    pub selection: Selection,
    pub form: FormController,
    pub event_log: Vec<Event>,
}

impl EditorState {
    pub fn is_open(&self) -> bool {
        self.selection != Selection::Empty
    }

    fn close(&mut self) {
        self.selection = Selection::Empty;
        self.form.load_draft(None);
        self.event_log.clear();
    }

    fn open(&mut self, record: &LinkedService) {
        self.selection = match &record.id {
            Some(id) => Selection::EditingExisting(id.clone()),
            None => Selection::EditingNew,
        };
        self.form.load_draft(Some(record));
        self.event_log = events::project(record);
    }
}

/// Removes a record from the in-flight set when its test finishes.
struct InFlightTest<'a> {
    in_flight: &'a watch::Sender<HashSet<ServiceId>>,
    id: ServiceId,
}

impl Drop for InFlightTest<'_> {
    fn drop(&mut self) {
        self.in_flight.send_modify(|set| {
            set.remove(&self.id);
        });
    }
}

/// Owns the selection state machine and the draft.
pub struct SelectionCoordinator {
    gateway: Arc<dyn PersistenceGateway>,
    registry: Arc<ServiceRegistry>,
    presenter: Arc<dyn Presenter>,
    editor: watch::Sender<EditorState>,
    tests_in_flight: watch::Sender<HashSet<ServiceId>>,
}

impl SelectionCoordinator {
    pub fn new(
        gateway: Arc<dyn PersistenceGateway>,
        registry: Arc<ServiceRegistry>,
        presenter: Arc<dyn Presenter>,
    ) -> Self {
        let (editor, _) = watch::channel(EditorState::default());
        let (tests_in_flight, _) = watch::channel(HashSet::new());
        Self {
            gateway,
            registry,
            presenter,
            editor,
            tests_in_flight,
        }
    }

    pub fn registry(&self) -> &Arc<ServiceRegistry> {
        &self.registry
    }

    pub fn subscribe(&self) -> watch::Receiver<EditorState> {
        self.editor.subscribe()
    }

    pub fn subscribe_tests(&self) -> watch::Receiver<HashSet<ServiceId>> {
        self.tests_in_flight.subscribe()
    }

    pub fn selection(&self) -> Selection {
        self.editor.borrow().selection.clone()
    }

    pub fn event_log(&self) -> Vec<Event> {
        self.editor.borrow().event_log.clone()
    }

    pub fn form(&self) -> FormController {
        self.editor.borrow().form.clone()
    }

    /// Applies an edit to the draft.
    pub fn edit(&self, f: impl FnOnce(&mut FormController)) {
        self.editor.send_modify(|state| f(&mut state.form));
    }

    pub fn is_testing(&self, id: &ServiceId) -> bool {
        self.tests_in_flight.borrow().contains(id)
    }

    /// Opens a stored service and returns its event log. An id the registry
    /// does not know closes the view.
    pub fn select_existing(&self, id: &ServiceId) -> Vec<Event> {
        match self.registry.by_id(id) {
            Some(record) => {
                tracing::info!("Selected linked service {} ({})", id, record.name);
                self.editor.send_modify(|state| state.open(&record));
                self.event_log()
            }
            None => {
                tracing::debug!("Linked service {} is not in the registry", id);
                self.editor.send_modify(EditorState::close);
                Vec::new()
            }
        }
    }

    pub fn start_new(&self) {
        tracing::info!("Editing new linked service");
        self.editor.send_modify(|state| {
            state.close();
            state.selection = Selection::EditingNew;
        });
    }

    pub fn cancel(&self) {
        self.editor.send_modify(EditorState::close);
    }

    /// Closes the view unless the draft has unsaved edits.
    pub fn click_outside(&self) {
        let close = {
            let state = self.editor.borrow();
            state.is_open() && !state.form.has_pending_edits()
        };
        if close {
            self.cancel();
        }
    }

    pub fn after_delete(&self, id: &ServiceId) {
        let target = Selection::EditingExisting(id.clone());
        self.editor.send_if_modified(|state| {
            if state.selection != target {
                return false;
            }
            state.close();
            true
        });
    }

    /// Binds the view to a freshly saved record. A record that is no longer
    /// listed leaves the view as it is.
    pub fn after_save(&self, saved: &LinkedService) {
        let current = saved.id.as_ref().and_then(|id| self.registry.by_id(id));
        match current {
            Some(record) => self.editor.send_modify(|state| state.open(&record)),
            None => tracing::warn!("Saved linked service '{}' is no longer listed", saved.name),
        }
    }

    /// Re-fetches the collection and brings the open record's log up to date.
    pub async fn refresh(&self) -> Result<bool, ManagerError> {
        let changed = self.registry.refresh().await.map_err(|e| {
            tracing::warn!("Failed to refresh linked services: {}", e);
            e
        })?;

        if let Selection::EditingExisting(id) = self.selection() {
            match self.registry.by_id(&id) {
                Some(record) => {
                    let log = events::project(&record);
                    self.editor.send_if_modified(|state| {
                        if state.selection != Selection::EditingExisting(id) {
                            return false;
                        }
                        state.event_log = log;
                        true
                    });
                }
                None => self.after_delete(&id),
            }
        }
        Ok(changed)
    }

    async fn refresh_quietly(&self) {
        let _ = self.refresh().await;
    }

    /// Submits the draft. The selection only changes once the server accepted it.
    pub async fn save(&self) -> Result<LinkedService, ManagerError> {
        let form = self.form();
        let updating = form.draft().id.is_some();

        match form.submit(self.gateway.as_ref()).await {
            Ok(saved) => {
                if self.refresh().await.is_ok() {
                    self.after_save(&saved);
                } else {
                    // Registry is stale; bind to what the endpoint returned.
                    self.editor.send_modify(|state| state.open(&saved));
                }
                self.presenter.notify(if updating { UPDATED } else { SAVED }, NoticeKind::Success);
                Ok(saved)
            }
            Err(ManagerError::NotFound(id)) => {
                tracing::warn!("Linked service {} disappeared before it was saved", id);
                self.refresh_quietly().await;
                self.after_delete(&id);
                Err(ManagerError::NotFound(id))
            }
            Err(e) => {
                tracing::warn!("Failed to save linked service: {}", e);
                if let Some(message) = e.user_message(SAVE_FAILED) {
                    self.presenter.notify(&message, NoticeKind::Error);
                }
                Err(e)
            }
        }
    }

    /// Deletes a service after confirmation. Returns false if the user declined.
    pub async fn delete(&self, id: &ServiceId) -> Result<bool, ManagerError> {
        if !self.presenter.confirm(CONFIRM_DELETE_TITLE, CONFIRM_DELETE_MESSAGE).await {
            return Ok(false);
        }

        match self.gateway.delete(id).await {
            Ok(()) => {
                self.after_delete(id);
                self.refresh_quietly().await;
                self.presenter.notify(DELETED, NoticeKind::Success);
                Ok(true)
            }
            Err(e) => {
                tracing::warn!("Failed to delete linked service {}: {}", id, e);
                if matches!(e, ManagerError::NotFound(_)) {
                    self.after_delete(id);
                    self.refresh_quietly().await;
                }
                if let Some(message) = e.user_message(DELETE_FAILED) {
                    self.presenter.notify(&message, NoticeKind::Error);
                }
                Err(e)
            }
        }
    }

    /// Tests the open service. Only database services reach the endpoint;
    /// returns `None` when no request was made.
    pub async fn test_connection(&self) -> Result<Option<TestOutcome>, ManagerError> {
        let (selection, form) = {
            let state = self.editor.borrow();
            (state.selection.clone(), state.form.clone())
        };
        let draft = form.draft();

        match draft.service_type {
            ServiceType::AiApi => {
                self.presenter.notify(AI_TEST_UNAVAILABLE, NoticeKind::Error);
                return Ok(None);
            }
            ServiceType::File => {
                if draft.file.attachment.is_some() || draft.file.existing_file.is_some() {
                    self.presenter.notify(FILE_READY, NoticeKind::Success);
                } else {
                    self.presenter.notify(FILE_MISSING, NoticeKind::Error);
                }
                return Ok(None);
            }
            ServiceType::Database => {}
        }

        let Selection::EditingExisting(id) = selection else {
            self.presenter.notify(NOTHING_SELECTED, NoticeKind::Error);
            return Ok(None);
        };

        let mut started = false;
        self.tests_in_flight.send_if_modified(|set| {
            started = set.insert(id.clone());
            started
        });
        if !started {
            tracing::debug!("Connection test for {} already running", id);
            return Err(ManagerError::Busy(id));
        }
        let _in_flight = InFlightTest {
            in_flight: &self.tests_in_flight,
            id: id.clone(),
        };

        match self.gateway.test(&id).await {
            Ok(outcome) => {
                self.refresh_quietly().await;
                if outcome.success {
                    self.presenter.notify(TEST_PASSED, NoticeKind::Success);
                } else {
                    let message = format!("Connection test failed: {}", outcome.message);
                    self.presenter.notify(&message, NoticeKind::Error);
                }
                Ok(Some(outcome))
            }
            Err(e) => {
                tracing::warn!("Connection test for {} failed: {}", id, e);
                if matches!(e, ManagerError::NotFound(_)) {
                    self.refresh_quietly().await;
                }
                if let Some(message) = e.user_message(TEST_ERROR) {
                    self.presenter.notify(&message, NoticeKind::Error);
                }
                Err(e)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared::types::{ConnectionStatus, EventLevel, ServiceConfig};
    use crate::testing::{sample_ai, sample_database, sample_file, FakeGateway, RecordingPresenter};
    use crate::upload::Attachment;

    struct Harness {
        gateway: Arc<FakeGateway>,
        presenter: Arc<RecordingPresenter>,
        coordinator: Arc<SelectionCoordinator>,
    }

    fn harness(confirm: bool) -> Harness {
        let gateway = Arc::new(FakeGateway::new());
        let presenter = Arc::new(RecordingPresenter::answering(confirm));
        let registry = Arc::new(ServiceRegistry::new(gateway.clone()));
        let coordinator = Arc::new(SelectionCoordinator::new(
            gateway.clone(),
            registry,
            presenter.clone(),
        ));
        Harness { gateway, presenter, coordinator }
    }

    impl Harness {
        async fn stored(&self, service: LinkedService) -> ServiceId {
            let id = self.gateway.insert(service).id.unwrap();
            self.coordinator.refresh().await.unwrap();
            id
        }

        fn last_notice(&self) -> (String, NoticeKind) {
            self.presenter.last_notice().expect("no notice")
        }
    }

    #[tokio::test]
    async fn test_select_existing_loads_draft_and_log() {
        let h = harness(true);
        let id = h.stored(sample_database("orders")).await;

        let log = h.coordinator.select_existing(&id);

        assert_eq!(h.coordinator.selection(), Selection::EditingExisting(id.clone()));
        assert_eq!(h.coordinator.form().draft().id, Some(id));
        assert_eq!(h.coordinator.form().draft().database.server_name, "sql01");
        assert_eq!(log.len(), 2);
        assert_eq!(log, h.coordinator.event_log());
    }

    #[tokio::test]
    async fn test_select_unknown_id_closes_view() {
        let h = harness(true);
        h.coordinator.start_new();

        let log = h.coordinator.select_existing(&ServiceId::new("404"));

        assert!(log.is_empty());
        assert_eq!(h.coordinator.selection(), Selection::Empty);
        assert!(h.presenter.notices().is_empty());
    }

    #[tokio::test]
    async fn test_start_new_and_cancel() {
        let h = harness(true);
        let id = h.stored(sample_database("orders")).await;
        h.coordinator.select_existing(&id);

        h.coordinator.start_new();
        assert_eq!(h.coordinator.selection(), Selection::EditingNew);
        assert!(h.coordinator.form().draft().id.is_none());
        assert!(h.coordinator.event_log().is_empty());

        h.coordinator.edit(|form| form.draft_mut().name = "draft".to_string());
        h.coordinator.cancel();
        assert_eq!(h.coordinator.selection(), Selection::Empty);
        assert!(h.coordinator.form().draft().name.is_empty());
    }

    #[tokio::test]
    async fn test_click_outside_keeps_pending_edits() {
        let h = harness(true);
        h.coordinator.start_new();
        h.coordinator.edit(|form| form.draft_mut().name = "draft".to_string());

        h.coordinator.click_outside();
        assert_eq!(h.coordinator.selection(), Selection::EditingNew);

        h.coordinator.start_new();
        h.coordinator.click_outside();
        assert_eq!(h.coordinator.selection(), Selection::Empty);
    }

    #[tokio::test]
    async fn test_save_new_selects_created_record() {
        let h = harness(true);
        h.coordinator.start_new();
        h.coordinator.edit(|form| {
            let draft = form.draft_mut();
            draft.name = "A".to_string();
            draft.database.server_name = "s1".to_string();
            draft.database.database_name = "db1".to_string();
        });

        let saved = h.coordinator.save().await.unwrap();
        let id = saved.id.unwrap();

        assert_eq!(h.coordinator.selection(), Selection::EditingExisting(id.clone()));
        assert!(h.coordinator.registry().by_id(&id).is_some());
        assert!(!h.coordinator.form().has_pending_edits());
        assert_eq!(h.last_notice(), (SAVED.to_string(), NoticeKind::Success));
    }

    #[tokio::test]
    async fn test_save_existing_reports_update() {
        let h = harness(true);
        let id = h.stored(sample_database("orders")).await;
        h.coordinator.select_existing(&id);
        h.coordinator.edit(|form| form.draft_mut().description = "nightly".to_string());

        h.coordinator.save().await.unwrap();

        assert_eq!(h.gateway.calls(), vec![format!("update {}", id)]);
        assert_eq!(h.coordinator.registry().by_id(&id).unwrap().description, "nightly");
        assert_eq!(h.last_notice(), (UPDATED.to_string(), NoticeKind::Success));
    }

    #[tokio::test]
    async fn test_invalid_save_leaves_state_alone() {
        let h = harness(true);
        h.coordinator.start_new();
        h.coordinator.edit(|form| form.draft_mut().name = "A".to_string());

        let err = h.coordinator.save().await.unwrap_err();

        assert!(matches!(err, ManagerError::Validation(_)));
        assert_eq!(h.coordinator.selection(), Selection::EditingNew);
        assert_eq!(h.coordinator.form().draft().name, "A");
        assert!(h.gateway.calls().is_empty());
        assert_eq!(
            h.last_notice(),
            ("Please fill in Server Name and Database Name".to_string(), NoticeKind::Error)
        );
    }

    #[tokio::test]
    async fn test_unreadable_file_uses_generic_message() {
        let h = harness(true);
        h.coordinator.start_new();
        h.coordinator.edit(|form| {
            form.draft_mut().name = "orders".to_string();
            form.set_service_type(ServiceType::File);
            form.attach(Attachment::from_path("/nonexistent/linked-services/orders.csv"));
        });

        assert!(h.coordinator.save().await.is_err());
        assert_eq!(h.last_notice(), (SAVE_FAILED.to_string(), NoticeKind::Error));
        assert_eq!(h.coordinator.selection(), Selection::EditingNew);
    }

    #[tokio::test]
    async fn test_delete_selected_closes_view() {
        let h = harness(true);
        let id = h.stored(sample_database("orders")).await;
        h.coordinator.select_existing(&id);

        assert!(h.coordinator.delete(&id).await.unwrap());

        assert_eq!(h.coordinator.selection(), Selection::Empty);
        assert!(h.coordinator.registry().is_empty());
        assert_eq!(
            h.presenter.prompts.lock().unwrap().clone(),
            vec![format!("{}: {}", CONFIRM_DELETE_TITLE, CONFIRM_DELETE_MESSAGE)]
        );
        assert_eq!(h.last_notice(), (DELETED.to_string(), NoticeKind::Success));
    }

    #[tokio::test]
    async fn test_delete_other_keeps_selection_and_draft() {
        let h = harness(true);
        let kept = h.stored(sample_database("orders")).await;
        let other = h.stored(sample_ai("model")).await;
        h.coordinator.select_existing(&kept);
        h.coordinator.edit(|form| form.draft_mut().description = "unsaved".to_string());

        h.coordinator.delete(&other).await.unwrap();

        assert_eq!(h.coordinator.selection(), Selection::EditingExisting(kept));
        assert_eq!(h.coordinator.form().draft().description, "unsaved");
        assert_eq!(h.coordinator.registry().len(), 1);
    }

    #[tokio::test]
    async fn test_declined_delete_sends_nothing() {
        let h = harness(false);
        let id = h.stored(sample_database("orders")).await;

        assert!(!h.coordinator.delete(&id).await.unwrap());
        assert!(h.gateway.calls().is_empty());
        assert!(h.presenter.notices().is_empty());
    }

    #[tokio::test]
    async fn test_connection_test_guards() {
        let h = harness(true);

        h.coordinator.start_new();
        assert!(h.coordinator.test_connection().await.unwrap().is_none());
        assert_eq!(h.last_notice(), (NOTHING_SELECTED.to_string(), NoticeKind::Error));

        let ai = h.stored(sample_ai("model")).await;
        h.coordinator.select_existing(&ai);
        assert!(h.coordinator.test_connection().await.unwrap().is_none());
        assert_eq!(h.last_notice(), (AI_TEST_UNAVAILABLE.to_string(), NoticeKind::Error));

        h.coordinator.start_new();
        h.coordinator.edit(|form| form.set_service_type(ServiceType::File));
        h.coordinator.test_connection().await.unwrap();
        assert_eq!(h.last_notice(), (FILE_MISSING.to_string(), NoticeKind::Error));

        let file = h.stored(sample_file("orders")).await;
        h.coordinator.select_existing(&file);
        h.coordinator.test_connection().await.unwrap();
        assert_eq!(h.last_notice(), (FILE_READY.to_string(), NoticeKind::Success));

        assert!(h.gateway.calls().is_empty());
    }

    #[tokio::test]
    async fn test_failed_connection_test_updates_log() {
        let h = harness(true);
        let id = h.stored(sample_database("orders")).await;
        h.coordinator.select_existing(&id);
        h.gateway.set_test_outcome(false, "timeout");

        let outcome = h.coordinator.test_connection().await.unwrap().unwrap();

        assert!(!outcome.success);
        let record = h.coordinator.registry().by_id(&id).unwrap();
        assert_eq!(record.connection_status, ConnectionStatus::Failed);
        let log = h.coordinator.event_log();
        assert!(log
            .iter()
            .any(|e| e.level == EventLevel::Error && e.message.contains("timeout")));
        assert_eq!(
            h.last_notice(),
            ("Connection test failed: timeout".to_string(), NoticeKind::Error)
        );
        assert!(!h.coordinator.is_testing(&id));
    }

    #[tokio::test]
    async fn test_second_concurrent_test_is_busy() {
        let h = harness(true);
        let id = h.stored(sample_database("orders")).await;
        h.coordinator.select_existing(&id);
        let gate = h.gateway.hold_requests();

        let first = tokio::spawn({
            let coordinator = h.coordinator.clone();
            async move { coordinator.test_connection().await }
        });
        h.gateway.entered.notified().await;
        assert!(h.coordinator.is_testing(&id));

        let second = h.coordinator.test_connection().await;
        assert!(matches!(second, Err(ManagerError::Busy(busy)) if busy == id));
        assert_eq!(h.gateway.calls(), vec![format!("test {}", id)]);

        gate.notify_one();
        let outcome = first.await.unwrap().unwrap().unwrap();
        assert!(outcome.success);
        assert!(!h.coordinator.is_testing(&id));
        assert_eq!(h.last_notice(), (TEST_PASSED.to_string(), NoticeKind::Success));
    }

    #[tokio::test]
    async fn test_save_racing_delete_ends_empty() {
        let h = harness(true);
        let id = h.stored(sample_database("orders")).await;
        h.coordinator.select_existing(&id);
        h.coordinator.edit(|form| form.draft_mut().description = "renamed".to_string());
        let gate = h.gateway.hold_requests();

        let save = tokio::spawn({
            let coordinator = h.coordinator.clone();
            async move { coordinator.save().await }
        });
        h.gateway.entered.notified().await;

        h.coordinator.delete(&id).await.unwrap();
        assert_eq!(h.coordinator.selection(), Selection::Empty);

        gate.notify_one();
        let saved = save.await.unwrap().unwrap();

        assert_eq!(saved.id, Some(id));
        assert_eq!(h.coordinator.selection(), Selection::Empty);
        assert!(h
            .presenter
            .notices()
            .iter()
            .all(|(_, kind)| *kind == NoticeKind::Success));
    }

    #[tokio::test]
    async fn test_late_save_leaves_other_selection_alone() {
        let h = harness(true);
        let first = h.stored(sample_database("orders")).await;
        let second = h.stored(sample_database("invoices")).await;
        h.coordinator.select_existing(&first);
        h.coordinator.edit(|form| form.draft_mut().description = "renamed".to_string());
        let gate = h.gateway.hold_requests();

        let save = tokio::spawn({
            let coordinator = h.coordinator.clone();
            async move { coordinator.save().await }
        });
        h.gateway.entered.notified().await;

        h.coordinator.delete(&first).await.unwrap();
        h.coordinator.select_existing(&second);
        h.coordinator.edit(|form| form.draft_mut().description = "unsaved b".to_string());

        gate.notify_one();
        save.await.unwrap().unwrap();

        assert_eq!(h.coordinator.selection(), Selection::EditingExisting(second));
        assert_eq!(h.coordinator.form().draft().description, "unsaved b");
        assert!(h.coordinator.form().has_pending_edits());
    }

    #[tokio::test]
    async fn test_save_binds_to_response_when_refresh_fails() {
        let h = harness(true);
        h.coordinator.start_new();
        h.coordinator.edit(|form| {
            let draft = form.draft_mut();
            draft.name = "A".to_string();
            draft.database.server_name = "s1".to_string();
            draft.database.database_name = "db1".to_string();
        });
        h.gateway.fail_next_list("connection reset");

        let saved = h.coordinator.save().await.unwrap();
        let id = saved.id.unwrap();

        assert!(h.coordinator.registry().by_id(&id).is_none(), "registry is still stale");
        assert_eq!(h.coordinator.selection(), Selection::EditingExisting(id.clone()));
        assert_eq!(h.coordinator.form().draft().id, Some(id));
        assert_eq!(h.coordinator.form().draft().database.server_name, "s1");
        assert_eq!(h.last_notice(), (SAVED.to_string(), NoticeKind::Success));
    }

    #[tokio::test]
    async fn test_refresh_drops_vanished_selection() {
        let h = harness(true);
        let id = h.stored(sample_database("orders")).await;
        h.coordinator.select_existing(&id);

        h.gateway.remove(&id);
        assert!(h.coordinator.refresh().await.unwrap());
        assert_eq!(h.coordinator.selection(), Selection::Empty);
    }

    #[tokio::test]
    async fn test_saved_record_keeps_single_group() {
        let h = harness(true);
        h.coordinator.start_new();
        h.coordinator.edit(|form| {
            let draft = form.draft_mut();
            draft.name = "model".to_string();
            draft.database.server_name = "leftover".to_string();
            form.set_service_type(ServiceType::AiApi);
            form.draft_mut().ai_api.api_key = "sk-1".to_string();
        });

        let id = h.coordinator.save().await.unwrap().id.unwrap();
        let stored = h.coordinator.registry().by_id(&id).unwrap();
        assert!(matches!(stored.config, ServiceConfig::AiApi(_)));
        assert_eq!(h.coordinator.form().draft().service_type, ServiceType::AiApi);
        assert!(h.coordinator.form().draft().database.server_name.is_empty());
    }
}
