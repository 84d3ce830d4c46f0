use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::domain::entities::whatsapp_messages::WhatsappMessageEntity;

#[derive(Debug, Clone, Serialize)]
pub struct ChatMessageDto {
    pub provider_message_id: String,
    pub direction: String,
    pub phone: String,
    pub body: Option<String>,
    pub status: Option<String>,
    pub sent_at: DateTime<Utc>,
}

impl From<WhatsappMessageEntity> for ChatMessageDto {
    fn from(value: WhatsappMessageEntity) -> Self {
        Self {
            provider_message_id: value.provider_message_id,
            direction: value.direction,
            phone: value.phone,
            body: value.body,
            status: value.status,
            sent_at: value.provider_timestamp.unwrap_or(value.created_at),
        }
    }
}
