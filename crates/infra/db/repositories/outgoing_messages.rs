use anyhow::Result;
use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use diesel::{RunQueryDsl, insert_into, prelude::*, update};
use std::sync::Arc;
use uuid::Uuid;

use crate::{
    domain,
    infra::db::postgres::{postgres_connection::PgPoolSquad, schema::outgoing_messages},
};
use domain::{
    entities::outgoing_messages::{InsertOutgoingMessageEntity, OutgoingMessageEntity},
    repositories::outgoing_messages::OutgoingMessageRepository,
    value_objects::{
        enums::outgoing_message_statuses::OutgoingMessageStatus,
        outgoing_messages::RetryDecision,
    },
};

pub struct OutgoingMessagePostgres {
    db_pool: Arc<PgPoolSquad>,
}

impl OutgoingMessagePostgres {
    pub fn new(db_pool: Arc<PgPoolSquad>) -> Self {
        Self { db_pool }
    }
}

#[async_trait]
impl OutgoingMessageRepository for OutgoingMessagePostgres {
    async fn enqueue(&self, entity: InsertOutgoingMessageEntity) -> Result<Uuid> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        let message_id = insert_into(outgoing_messages::table)
            .values(&entity)
            .returning(outgoing_messages::id)
            .get_result::<Uuid>(&mut conn)?;

        Ok(message_id)
    }

    async fn claim_batch(
        &self,
        limit: i64,
        worker_id: &str,
        lock_timeout: Duration,
    ) -> Result<Vec<OutgoingMessageEntity>> {
        let mut conn = Arc::clone(&self.db_pool).get()?;
        let current_time = Utc::now();
        let stale_before = current_time - lock_timeout;
        let pending = OutgoingMessageStatus::Pending.to_string();

        let mut claimed = conn.transaction::<_, diesel::result::Error, _>(|conn| {
            let candidate_ids = outgoing_messages::table
                .select(outgoing_messages::id)
                .filter(outgoing_messages::status.eq(&pending))
                .filter(outgoing_messages::next_attempt_at.le(current_time))
                .filter(
                    outgoing_messages::locked_at.is_null().or(outgoing_messages::locked_at
                        .assume_not_null()
                        .lt(stale_before)),
                )
                .order(outgoing_messages::created_at.asc())
                .limit(limit)
                .for_update()
                .skip_locked()
                .load::<Uuid>(conn)?;

            if candidate_ids.is_empty() {
                return Ok(Vec::new());
            }

            update(outgoing_messages::table.filter(outgoing_messages::id.eq_any(candidate_ids)))
                .set((
                    outgoing_messages::locked_at.eq(Some(current_time)),
                    outgoing_messages::locked_by.eq(Some(worker_id)),
                    outgoing_messages::updated_at.eq(current_time),
                ))
                .returning(OutgoingMessageEntity::as_select())
                .get_results::<OutgoingMessageEntity>(conn)
        })?;

        claimed.sort_by_key(|message| message.created_at);
        Ok(claimed)
    }

    async fn mark_sent(&self, message_id: Uuid, provider_message_id: Option<String>) -> Result<()> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        update(
            outgoing_messages::table
                .filter(outgoing_messages::id.eq(message_id))
                .filter(outgoing_messages::status.eq(OutgoingMessageStatus::Pending.to_string())),
        )
        .set((
            outgoing_messages::status.eq(OutgoingMessageStatus::Sent.to_string()),
            outgoing_messages::provider_message_id.eq(provider_message_id),
            outgoing_messages::locked_at.eq::<Option<DateTime<Utc>>>(None),
            outgoing_messages::locked_by.eq::<Option<String>>(None),
            outgoing_messages::updated_at.eq(Utc::now()),
        ))
        .execute(&mut conn)?;

        Ok(())
    }

    async fn mark_failed(
        &self,
        message_id: Uuid,
        error: &str,
        decision: RetryDecision,
    ) -> Result<()> {
        let mut conn = Arc::clone(&self.db_pool).get()?;
        let current_time = Utc::now();

        let (new_status, attempts, next_attempt_at) = match decision {
            RetryDecision::Retry { attempts, delay } => {
                (OutgoingMessageStatus::Pending, attempts, current_time + delay)
            }
            RetryDecision::Dead { attempts } => {
                (OutgoingMessageStatus::Dead, attempts, current_time)
            }
        };

        update(
            outgoing_messages::table
                .filter(outgoing_messages::id.eq(message_id))
                .filter(outgoing_messages::status.eq(OutgoingMessageStatus::Pending.to_string())),
        )
        .set((
            outgoing_messages::status.eq(new_status.to_string()),
            outgoing_messages::attempts.eq(attempts),
            outgoing_messages::last_error.eq(Some(error)),
            outgoing_messages::next_attempt_at.eq(next_attempt_at),
            outgoing_messages::locked_at.eq::<Option<DateTime<Utc>>>(None),
            outgoing_messages::locked_by.eq::<Option<String>>(None),
            outgoing_messages::updated_at.eq(current_time),
        ))
        .execute(&mut conn)?;

        Ok(())
    }

    async fn list(&self, status: Option<String>, limit: i64) -> Result<Vec<OutgoingMessageEntity>> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        let mut query = outgoing_messages::table
            .select(OutgoingMessageEntity::as_select())
            .into_boxed();
        if let Some(status) = status {
            query = query.filter(outgoing_messages::status.eq(status));
        }

        let results = query
            .order(outgoing_messages::created_at.desc())
            .limit(limit)
            .load::<OutgoingMessageEntity>(&mut conn)?;

        Ok(results)
    }
}
