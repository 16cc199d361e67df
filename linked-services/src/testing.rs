//! In-memory gateway and presenter used by the unit tests.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::Notify;
use shared::protocol::{ServicePayload, TestOutcome};
use shared::types::*;
use crate::error::ManagerError;
use crate::gateway::PersistenceGateway;
use crate::presenter::{NoticeKind, Presenter};

#[derive(Default)]
pub(crate) struct FakeGateway {
    services: Mutex<Vec<LinkedService>>,
    next_id: AtomicU64,
    calls: Mutex<Vec<String>>,
    list_failure: Mutex<Option<String>>,
    test_outcome: Mutex<Option<(bool, String)>>,
    hold: Mutex<Option<Arc<Notify>>>,
    /// Signalled whenever a write or test reaches the gateway
    pub(crate) entered: Notify,
}

impl FakeGateway {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Stores a service directly, assigning the next id.
    pub(crate) fn insert(&self, mut service: LinkedService) -> LinkedService {
        service.id = Some(self.assign_id());
        self.services.lock().unwrap().push(service.clone());
        service
    }

    /// Removes a service behind the client's back.
    pub(crate) fn remove(&self, id: &ServiceId) {
        self.services.lock().unwrap().retain(|s| s.id.as_ref() != Some(id));
    }

    /// Reverses the listing order the endpoint reports.
    pub(crate) fn reverse(&self) {
        self.services.lock().unwrap().reverse();
    }

    /// Mutating calls received so far, e.g. `create` or `update 1`.
    pub(crate) fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    pub(crate) fn fail_next_list(&self, message: &str) {
        *self.list_failure.lock().unwrap() = Some(message.to_string());
    }

    pub(crate) fn set_test_outcome(&self, success: bool, message: &str) {
        *self.test_outcome.lock().unwrap() = Some((success, message.to_string()));
    }

    /// Parks requests until the returned handle is notified. Writes park after
    /// they are applied, tests before.
    pub(crate) fn hold_requests(&self) -> Arc<Notify> {
        let gate = Arc::new(Notify::new());
        *self.hold.lock().unwrap() = Some(gate.clone());
        gate
    }

    fn assign_id(&self) -> ServiceId {
        ServiceId::new((self.next_id.fetch_add(1, Ordering::SeqCst) + 1).to_string())
    }

    fn record(&self, call: String) {
        self.calls.lock().unwrap().push(call);
    }

    async fn enter(&self) {
        self.entered.notify_one();
        let gate = self.hold.lock().unwrap().clone();
        if let Some(gate) = gate {
            gate.notified().await;
        }
    }
}

#[async_trait]
impl PersistenceGateway for FakeGateway {
    async fn list(&self) -> Result<Vec<LinkedService>, ManagerError> {
        if let Some(message) = self.list_failure.lock().unwrap().take() {
            return Err(ManagerError::Transport(message));
        }
        Ok(self.services.lock().unwrap().clone())
    }

    async fn create(&self, payload: &ServicePayload) -> Result<LinkedService, ManagerError> {
        self.record("create".to_string());

        let mut service = LinkedService::from(payload.clone());
        service.created_at = Some(Utc::now());
        let created = self.insert(service);
        self.enter().await;
        Ok(created)
    }

    async fn update(&self, id: &ServiceId, payload: &ServicePayload) -> Result<LinkedService, ManagerError> {
        self.record(format!("update {}", id));

        let incoming = LinkedService::from(payload.clone());
        let updated = {
            let mut services = self.services.lock().unwrap();
            let stored = services
                .iter_mut()
                .find(|s| s.id.as_ref() == Some(id))
                .ok_or_else(|| ManagerError::NotFound(id.clone()))?;
            stored.name = incoming.name;
            stored.description = incoming.description;
            stored.config = incoming.config;
            stored.clone()
        };
        self.enter().await;
        Ok(updated)
    }

    async fn delete(&self, id: &ServiceId) -> Result<(), ManagerError> {
        self.record(format!("delete {}", id));
        self.remove(id);
        Ok(())
    }

    async fn test(&self, id: &ServiceId) -> Result<TestOutcome, ManagerError> {
        self.record(format!("test {}", id));
        self.enter().await;

        let (success, message) = self
            .test_outcome
            .lock()
            .unwrap()
            .clone()
            .unwrap_or((true, "Connection successful".to_string()));

        let mut services = self.services.lock().unwrap();
        let stored = services
            .iter_mut()
            .find(|s| s.id.as_ref() == Some(id))
            .ok_or_else(|| ManagerError::NotFound(id.clone()))?;
        stored.connection_status = if success { ConnectionStatus::Success } else { ConnectionStatus::Failed };
        stored.connection_message = Some(message.clone());
        stored.last_tested_at = Some(Utc::now());

        Ok(TestOutcome {
            success,
            message,
            service: Some(stored.clone()),
        })
    }
}

/// Presenter that answers confirmations with a fixed reply and records notices.
pub(crate) struct RecordingPresenter {
    answer: bool,
    pub(crate) prompts: Mutex<Vec<String>>,
    pub(crate) notices: Mutex<Vec<(String, NoticeKind)>>,
}

impl RecordingPresenter {
    pub(crate) fn answering(answer: bool) -> Self {
        Self {
            answer,
            prompts: Mutex::new(Vec::new()),
            notices: Mutex::new(Vec::new()),
        }
    }

    pub(crate) fn notices(&self) -> Vec<(String, NoticeKind)> {
        self.notices.lock().unwrap().clone()
    }

    pub(crate) fn last_notice(&self) -> Option<(String, NoticeKind)> {
        self.notices.lock().unwrap().last().cloned()
    }
}

#[async_trait]
impl Presenter for RecordingPresenter {
    async fn confirm(&self, title: &str, message: &str) -> bool {
        self.prompts.lock().unwrap().push(format!("{}: {}", title, message));
        self.answer
    }

    fn notify(&self, message: &str, kind: NoticeKind) {
        self.notices.lock().unwrap().push((message.to_string(), kind));
    }
}

pub(crate) fn sample_database(name: &str) -> LinkedService {
    LinkedService {
        id: None,
        name: name.to_string(),
        description: String::new(),
        config: ServiceConfig::Database(DatabaseConfig {
            server_name: "sql01".to_string(),
            database_name: "sales".to_string(),
            auth: DatabaseAuth::Windows,
            trust_server_certificate: false,
        }),
        connection_status: ConnectionStatus::Unknown,
        connection_message: None,
        last_tested_at: None,
        created_at: None,
        events: Vec::new(),
    }
}

pub(crate) fn sample_ai(name: &str) -> LinkedService {
    LinkedService {
        config: ServiceConfig::AiApi(AiApiConfig { api_key: "sk-test".to_string() }),
        ..sample_database(name)
    }
}

pub(crate) fn sample_file(name: &str) -> LinkedService {
    LinkedService {
        config: ServiceConfig::File(FileConfig {
            file_name: "orders.csv".to_string(),
            file_size: 8,
            file_content: Some("YSxiCjEsMgo=".to_string()),
            format: FileFormat::defaults_for(FileType::Csv),
        }),
        ..sample_database(name)
    }
}
