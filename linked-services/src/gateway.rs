use std::time::Duration;
use async_trait::async_trait;
use reqwest::{Response, StatusCode};
use serde::de::DeserializeOwned;
use shared::protocol::{ErrorBody, ServicePayload, TestOutcome, COLLECTION_PATH, TEST_SEGMENT};
use shared::types::{LinkedService, ServiceId};
use crate::config::GatewayConfig;
use crate::error::ManagerError;

/// The remote collection of linked services.
#[async_trait]
pub trait PersistenceGateway: Send + Sync {
    async fn list(&self) -> Result<Vec<LinkedService>, ManagerError>;

    async fn create(&self, payload: &ServicePayload) -> Result<LinkedService, ManagerError>;

    async fn update(&self, id: &ServiceId, payload: &ServicePayload) -> Result<LinkedService, ManagerError>;

    async fn delete(&self, id: &ServiceId) -> Result<(), ManagerError>;

    /// Runs a connection test. The endpoint records the outcome on the service.
    async fn test(&self, id: &ServiceId) -> Result<TestOutcome, ManagerError>;
}

/// JSON-over-HTTP gateway for `<base_url>/linked-services`.
#[derive(Clone)]
pub struct HttpGateway {
    client: reqwest::Client,
    base_url: String,
}

impl HttpGateway {
    pub fn new(config: &GatewayConfig) -> Result<Self, ManagerError> {
        let mut builder = reqwest::Client::builder();
        if let Some(secs) = config.timeout_secs {
            builder = builder.timeout(Duration::from_secs(secs));
        }
        Ok(Self {
            client: builder.build()?,
            base_url: config.base_url.trim_end_matches('/').to_string(),
        })
    }

    fn collection_url(&self) -> String {
        format!("{}/{}", self.base_url, COLLECTION_PATH)
    }

    fn service_url(&self, id: &ServiceId) -> String {
        format!("{}/{}", self.collection_url(), id)
    }

    /// Decodes a success body, or maps the failure: 404 on a service route is
    /// `NotFound`, an `{"error": ..}` body is a rejection quoted verbatim.
    async fn read<T: DeserializeOwned>(
        response: Response,
        id: Option<&ServiceId>,
    ) -> Result<T, ManagerError> {
        let status = response.status();
        if status.is_success() {
            return response
                .json::<T>()
                .await
                .map_err(|e| ManagerError::Transport(format!("Invalid response body: {}", e)));
        }
        Err(Self::failure(status, response, id).await)
    }

    async fn failure(status: StatusCode, response: Response, id: Option<&ServiceId>) -> ManagerError {
        if let Some(id) = id.filter(|_| status == StatusCode::NOT_FOUND) {
            return ManagerError::NotFound(id.clone());
        }

        let body = response.text().await.unwrap_or_default();
        match serde_json::from_str::<ErrorBody>(&body) {
            Ok(ErrorBody { error }) => ManagerError::ServerRejection(error),
            Err(_) => ManagerError::ServerRejection(format!("Request failed with status {}", status)),
        }
    }
}

#[async_trait]
impl PersistenceGateway for HttpGateway {
    async fn list(&self) -> Result<Vec<LinkedService>, ManagerError> {
        let response = self.client.get(self.collection_url()).send().await?;
        let services: Vec<LinkedService> = Self::read(response, None).await?;
        tracing::debug!("Listed {} linked services", services.len());
        Ok(services)
    }

    async fn create(&self, payload: &ServicePayload) -> Result<LinkedService, ManagerError> {
        let response = self.client.post(self.collection_url()).json(payload).send().await?;
        let created: LinkedService = Self::read(response, None).await?;
        tracing::info!(
            "Created linked service {} ({})",
            created.id.as_ref().map(ServiceId::as_str).unwrap_or("?"),
            created.name
        );
        Ok(created)
    }

    async fn update(&self, id: &ServiceId, payload: &ServicePayload) -> Result<LinkedService, ManagerError> {
        let response = self.client.put(self.service_url(id)).json(payload).send().await?;
        let updated = Self::read(response, Some(id)).await?;
        tracing::info!("Updated linked service {}", id);
        Ok(updated)
    }

    async fn delete(&self, id: &ServiceId) -> Result<(), ManagerError> {
        let response = self.client.delete(self.service_url(id)).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(Self::failure(status, response, Some(id)).await);
        }
        tracing::info!("Deleted linked service {}", id);
        Ok(())
    }

    async fn test(&self, id: &ServiceId) -> Result<TestOutcome, ManagerError> {
        let url = format!("{}/{}", self.service_url(id), TEST_SEGMENT);
        let response = self.client.post(url).send().await?;
        let outcome: TestOutcome = Self::read(response, Some(id)).await?;
        tracing::info!(
            "Connection test for {}: {} ({})",
            id,
            if outcome.success { "passed" } else { "failed" },
            outcome.message
        );
        Ok(outcome)
    }
}
