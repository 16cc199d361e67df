use sha2::{Sha256, Digest};
use shared::protocol::WireService;
use shared::types::{FileConfig, LinkedService, ServiceConfig};

/// Uploaded file bodies can be large and are already summarised by name and
/// size, so they are left out of the hash.
fn stable_config(config: &ServiceConfig) -> ServiceConfig {
    match config {
        ServiceConfig::File(file) => ServiceConfig::File(FileConfig {
            file_name: file.file_name.clone(),
            file_size: file.file_size,
            file_content: None,
            format: file.format.clone(),
        }),
        other => other.clone(),
    }
}

fn stable_view(service: &LinkedService) -> WireService {
    WireService::from(LinkedService {
        id: service.id.clone(),
        name: service.name.clone(),
        description: service.description.clone(),
        config: stable_config(&service.config),
        connection_status: service.connection_status,
        connection_message: service.connection_message.clone(),
        last_tested_at: service.last_tested_at,
        created_at: service.created_at,
        events: service.events.clone(),
    })
}

/// Computes a SHA-256 hash of the service list.
/// Services are sorted by id for deterministic output.
pub fn compute_hash(services: &[LinkedService]) -> String {
    let mut indices: Vec<usize> = (0..services.len()).collect();
    indices.sort_by(|&a, &b| services[a].id.cmp(&services[b].id));

    let views: Vec<WireService> = indices.iter().map(|&i| stable_view(&services[i])).collect();

    let json = serde_json::to_string(&views).unwrap_or_default();

    let hash = Sha256::digest(json.as_bytes());
    hex::encode(hash)
}
