use anyhow::Result;
use async_trait::async_trait;
use chrono::Duration;
use mockall::automock;
use uuid::Uuid;

use crate::domain::{
    entities::outgoing_messages::{InsertOutgoingMessageEntity, OutgoingMessageEntity},
    value_objects::outgoing_messages::RetryDecision,
};

#[automock]
#[async_trait]
pub trait OutgoingMessageRepository {
    async fn enqueue(&self, entity: InsertOutgoingMessageEntity) -> Result<Uuid>;

    /// Locks up to `limit` due pending rows for `worker_id`. Rows whose lock
    /// is older than `lock_timeout` are considered abandoned and reclaimed.
    async fn claim_batch(
        &self,
        limit: i64,
        worker_id: &str,
        lock_timeout: Duration,
    ) -> Result<Vec<OutgoingMessageEntity>>;

    async fn mark_sent(&self, message_id: Uuid, provider_message_id: Option<String>) -> Result<()>;

    async fn mark_failed(&self, message_id: Uuid, error: &str, decision: RetryDecision)
    -> Result<()>;

    async fn list(&self, status: Option<String>, limit: i64) -> Result<Vec<OutgoingMessageEntity>>;
}
