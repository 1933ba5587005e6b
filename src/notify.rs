use dashmap::DashMap;
use tokio::sync::broadcast;
use ulid::Ulid;

use crate::model::Event;

const CHANNEL_CAPACITY: usize = 256;

/// A delivered notification: channel name + JSON payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub channel: String,
    pub payload: String,
}

pub fn channel_name(field_id: Ulid) -> String {
    format!("field_{field_id}")
}

/// Broadcast hub for per-field event fan-out.
pub struct NotifyHub {
    channels: DashMap<Ulid, broadcast::Sender<Notification>>,
}

impl NotifyHub {
    pub fn new() -> Self {
        Self {
            channels: DashMap::new(),
        }
    }

    /// Subscribe to notifications for a field. Creates the channel if needed.
    pub fn subscribe(&self, field_id: Ulid) -> broadcast::Receiver<Notification> {
        let sender = self
            .channels
            .entry(field_id)
            .or_insert_with(|| broadcast::channel(CHANNEL_CAPACITY).0);
        sender.subscribe()
    }

    /// Send a notification. No-op if nobody is listening.
    pub fn send(&self, field_id: Ulid, event: &Event) {
        if let Some(sender) = self.channels.get(&field_id) {
            let _ = sender.send(Notification {
                channel: channel_name(field_id),
                payload: event_payload(event),
            });
        }
    }

    /// Remove a channel (e.g. when a field is deleted).
    #[allow(dead_code)]
    pub fn remove(&self, field_id: &Ulid) {
        self.channels.remove(field_id);
    }
}

/// Compact JSON summary of an event for subscribers.
fn event_payload(event: &Event) -> String {
    let v = match event {
        Event::FieldCreated { id, name, .. } => serde_json::json!({
            "event": "field_created", "id": id.to_string(), "name": name,
        }),
        Event::FieldUpdated { id, status, .. } => serde_json::json!({
            "event": "field_updated", "id": id.to_string(), "status": status.as_str(),
        }),
        Event::FieldDeleted { id } => serde_json::json!({
            "event": "field_deleted", "id": id.to_string(),
        }),
        Event::OverrideSet {
            id,
            field_id,
            span,
            available,
        } => serde_json::json!({
            "event": "override_set", "id": id.to_string(),
            "field_id": field_id.to_string(),
            "start": span.start, "end": span.end, "available": available,
        }),
        Event::OverrideRemoved { id, field_id } => serde_json::json!({
            "event": "override_removed", "id": id.to_string(),
            "field_id": field_id.to_string(),
        }),
        Event::BookingCreated {
            id,
            field_id,
            span,
            ..
        } => serde_json::json!({
            "event": "booking_created", "id": id.to_string(),
            "field_id": field_id.to_string(),
            "start": span.start, "end": span.end, "status": "pending",
        }),
        Event::BookingTransitioned {
            id,
            field_id,
            status,
            ..
        } => serde_json::json!({
            "event": "booking_transitioned", "id": id.to_string(),
            "field_id": field_id.to_string(), "status": status.as_str(),
        }),
    };
    v.to_string()
}
