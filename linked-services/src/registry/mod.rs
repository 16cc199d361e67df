pub mod hash;

use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tokio_util::sync::CancellationToken;
use anyhow::Result;
use shared::types::{LinkedService, ServiceId};
use crate::config::RegistryConfig;
use crate::error::ManagerError;
use crate::gateway::PersistenceGateway;

/// Last fetched collection and its fingerprint.
#[derive(Debug, Clone)]
pub struct Snapshot {
    pub services: Arc<Vec<LinkedService>>,
    pub fingerprint: String,
}

impl Snapshot {
    fn new(services: Vec<LinkedService>) -> Self {
        let fingerprint = hash::compute_hash(&services);
        Self {
            services: Arc::new(services),
            fingerprint,
        }
    }
}

/// Local copy of the remote collection, replaced wholesale on every refresh.
pub struct ServiceRegistry {
    gateway: Arc<dyn PersistenceGateway>,
    snapshot: watch::Sender<Snapshot>,
}

impl ServiceRegistry {
    pub fn new(gateway: Arc<dyn PersistenceGateway>) -> Self {
        let (snapshot, _) = watch::channel(Snapshot::new(Vec::new()));
        Self { gateway, snapshot }
    }

    /// Re-fetches the collection. Returns true if it changed; subscribers are
    /// only woken in that case. On failure the previous snapshot stays.
    pub async fn refresh(&self) -> Result<bool, ManagerError> {
        let services = self.gateway.list().await?;
        let next = Snapshot::new(services);

        let changed = self.snapshot.send_if_modified(|current| {
            let changed = current.fingerprint != next.fingerprint
                || !same_order(&current.services, &next.services);
            *current = next;
            changed
        });
        Ok(changed)
    }

    pub fn all(&self) -> Arc<Vec<LinkedService>> {
        self.snapshot.borrow().services.clone()
    }

    pub fn by_id(&self, id: &ServiceId) -> Option<LinkedService> {
        self.snapshot
            .borrow()
            .services
            .iter()
            .find(|s| s.id.as_ref() == Some(id))
            .cloned()
    }

    pub fn len(&self) -> usize {
        self.snapshot.borrow().services.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn fingerprint(&self) -> String {
        self.snapshot.borrow().fingerprint.clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<Snapshot> {
        self.snapshot.subscribe()
    }
}

/// The fingerprint ignores list order; views follow the endpoint's order.
fn same_order(a: &[LinkedService], b: &[LinkedService]) -> bool {
    a.len() == b.len() && a.iter().zip(b).all(|(x, y)| x.id == y.id)
}

/// Periodic refresh loop
pub async fn run(
    registry: Arc<ServiceRegistry>,
    config: RegistryConfig,
    cancel: CancellationToken,
) -> Result<()> {
    let mut refresh_interval = tokio::time::interval(
        Duration::from_secs(config.refresh_interval_secs.max(1))
    );

    loop {
        tokio::select! {
            _ = refresh_interval.tick() => {
                match registry.refresh().await {
                    Ok(true) => tracing::info!(
                        "Registry changed: {} services, hash {}",
                        registry.len(),
                        registry.fingerprint()
                    ),
                    Ok(false) => tracing::debug!("Registry unchanged"),
                    Err(e) => tracing::error!("Failed to refresh registry: {}", e),
                }
            }
            _ = cancel.cancelled() => {
                tracing::info!("Registry refresher shutting down");
                break;
            }
        }
    }

    Ok(())
}
