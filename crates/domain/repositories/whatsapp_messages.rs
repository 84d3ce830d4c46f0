use anyhow::Result;
use async_trait::async_trait;
use mockall::automock;

use crate::domain::{
    entities::whatsapp_messages::{UpsertWhatsappMessageEntity, WhatsappMessageEntity},
    value_objects::whatsapp_webhook::WebhookStatusRecord,
};

#[automock]
#[async_trait]
pub trait WhatsappMessageRepository {
    /// Keyed by provider message id; replaying the same event is a no-op
    /// apart from `updated_at`.
    async fn upsert_message(&self, entity: UpsertWhatsappMessageEntity) -> Result<()>;

    async fn upsert_status(&self, record: WebhookStatusRecord) -> Result<()>;

    /// Latest message per phone, newest conversations first.
    async fn list_chats(&self, limit: i64) -> Result<Vec<WhatsappMessageEntity>>;

    async fn list_messages_for_phone(
        &self,
        phone: &str,
        limit: i64,
    ) -> Result<Vec<WhatsappMessageEntity>>;
}
