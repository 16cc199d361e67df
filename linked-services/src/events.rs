use chrono::{DateTime, Duration, Utc};
use shared::types::{ConnectionStatus, Event, EventLevel, LinkedService};

/// Number of entries an event log view shows.
pub const EVENT_LOG_LIMIT: usize = 5;

/// Bounded, most-recent-first view of a service's status history.
pub fn project(service: &LinkedService) -> Vec<Event> {
    project_at(service, Utc::now())
}

/// [`project`] with an explicit clock. Services without stored history get a
/// synthesized one derived from their status fields; nothing is written back.
pub fn project_at(service: &LinkedService, now: DateTime<Utc>) -> Vec<Event> {
    let synthesized;
    let history: &[Event] = if service.events.is_empty() {
        synthesized = synthesize(service, now);
        &synthesized
    } else {
        &service.events
    };

    let start = history.len().saturating_sub(EVENT_LOG_LIMIT);
    history[start..].iter().rev().cloned().collect()
}

fn synthesize(service: &LinkedService, now: DateTime<Utc>) -> Vec<Event> {
    let name = &service.name;
    let mut events = vec![Event::new(
        service.created_at.unwrap_or(now),
        EventLevel::Info,
        format!("Service '{}' initialized successfully.", name),
    )];

    let tested_at = service.last_tested_at.unwrap_or(now);
    match service.connection_status {
        ConnectionStatus::Success => events.push(Event::new(
            tested_at,
            EventLevel::Info,
            format!("Connection test passed for '{}'.", name),
        )),
        ConnectionStatus::Failed => events.push(Event::new(
            tested_at,
            EventLevel::Error,
            format!(
                "Connection test failed for '{}': {}.",
                name,
                service.connection_message.as_deref().unwrap_or("Unknown error")
            ),
        )),
        ConnectionStatus::Unknown => {}
    }

    events.push(Event::new(
        now - Duration::minutes(5),
        EventLevel::Info,
        format!("Health check passed for '{}'.", name),
    ));

    events
}
