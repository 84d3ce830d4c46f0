use chrono::{DateTime, TimeZone, Utc};
use serde::Deserialize;
use serde_json::Value;

use crate::domain::{
    entities::whatsapp_messages::UpsertWhatsappMessageEntity,
    value_objects::enums::message_directions::MessageDirection,
};

#[derive(Debug, Deserialize)]
pub struct WebhookVerifyQuery {
    #[serde(rename = "hub.mode")]
    pub mode: Option<String>,
    #[serde(rename = "hub.verify_token")]
    pub verify_token: Option<String>,
    #[serde(rename = "hub.challenge")]
    pub challenge: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct WebhookPayload {
    pub object: Option<String>,
    #[serde(default)]
    pub entry: Vec<WebhookEntry>,
}

#[derive(Debug, Deserialize)]
pub struct WebhookEntry {
    pub id: Option<String>,
    #[serde(default)]
    pub changes: Vec<WebhookChange>,
}

#[derive(Debug, Deserialize)]
pub struct WebhookChange {
    pub field: Option<String>,
    pub value: WebhookChangeValue,
}

#[derive(Debug, Default, Deserialize)]
pub struct WebhookChangeValue {
    #[serde(default)]
    pub messages: Vec<Value>,
    #[serde(default)]
    pub statuses: Vec<Value>,
}

#[derive(Debug, Deserialize)]
struct InboundMessage {
    id: String,
    from: String,
    timestamp: Option<String>,
    #[serde(rename = "type")]
    type_: Option<String>,
    text: Option<InboundText>,
    button: Option<InboundButton>,
}

#[derive(Debug, Deserialize)]
struct InboundText {
    body: String,
}

#[derive(Debug, Deserialize)]
struct InboundButton {
    text: Option<String>,
}

#[derive(Debug, Deserialize)]
struct StatusEvent {
    id: String,
    status: String,
    recipient_id: Option<String>,
    timestamp: Option<String>,
}

/// A single delivery or message event pulled out of a webhook call.
#[derive(Debug, Clone, PartialEq)]
pub enum WebhookEvent {
    Message(WebhookMessageRecord),
    Status(WebhookStatusRecord),
}

#[derive(Debug, Clone, PartialEq)]
pub struct WebhookMessageRecord {
    pub provider_message_id: String,
    pub phone: String,
    pub body: Option<String>,
    pub provider_timestamp: Option<DateTime<Utc>>,
    pub raw: Value,
}

impl WebhookMessageRecord {
    pub fn to_entity(&self, now: DateTime<Utc>) -> UpsertWhatsappMessageEntity {
        UpsertWhatsappMessageEntity {
            provider_message_id: self.provider_message_id.clone(),
            direction: MessageDirection::Inbound.to_string(),
            phone: self.phone.clone(),
            body: self.body.clone(),
            status: Some("received".to_string()),
            raw: self.raw.clone(),
            provider_timestamp: self.provider_timestamp,
            created_at: now,
            updated_at: now,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct WebhookStatusRecord {
    pub provider_message_id: String,
    pub phone: Option<String>,
    pub status: String,
    pub provider_timestamp: Option<DateTime<Utc>>,
    pub raw: Value,
}

/// Delivery statuses only move forward: `sent < delivered < read`.
/// `failed` is terminal and overrides anything before it.
fn delivery_rank(status: &str) -> Option<u8> {
    match status {
        "sent" => Some(1),
        "delivered" => Some(2),
        "read" => Some(3),
        "failed" => Some(u8::MAX),
        _ => None,
    }
}

impl WebhookStatusRecord {
    /// Whether this webhook should replace the stored status. Webhooks are
    /// not ordered, so a late `delivered` must not undo `read`.
    pub fn advances(&self, current: Option<&str>) -> bool {
        let current_rank = current.and_then(delivery_rank).unwrap_or(0);
        if current_rank == u8::MAX {
            return false;
        }
        delivery_rank(&self.status).is_some_and(|incoming| incoming > current_rank)
    }
}

fn parse_unix_timestamp(raw: Option<&str>) -> Option<DateTime<Utc>> {
    let seconds = raw?.trim().parse::<i64>().ok()?;
    Utc.timestamp_opt(seconds, 0).single()
}

impl WebhookPayload {
    /// Flattens every entry/change. Events that do not carry an id are
    /// dropped because they cannot be upserted.
    pub fn events(&self) -> Vec<WebhookEvent> {
        let mut events = Vec::new();
        for change in self.entry.iter().flat_map(|entry| entry.changes.iter()) {
            for raw in &change.value.messages {
                let Ok(message) = serde_json::from_value::<InboundMessage>(raw.clone()) else {
                    continue;
                };
                let body = match message.type_.as_deref() {
                    Some("button") => message.button.and_then(|button| button.text),
                    _ => message.text.map(|text| text.body),
                };
                events.push(WebhookEvent::Message(WebhookMessageRecord {
                    provider_message_id: message.id,
                    phone: message.from,
                    body,
                    provider_timestamp: parse_unix_timestamp(message.timestamp.as_deref()),
                    raw: raw.clone(),
                }));
            }
            for raw in &change.value.statuses {
                let Ok(status) = serde_json::from_value::<StatusEvent>(raw.clone()) else {
                    continue;
                };
                events.push(WebhookEvent::Status(WebhookStatusRecord {
                    provider_message_id: status.id,
                    phone: status.recipient_id,
                    status: status.status,
                    provider_timestamp: parse_unix_timestamp(status.timestamp.as_deref()),
                    raw: raw.clone(),
                }));
            }
        }
        events
    }
}
