use anyhow::Result;
use async_trait::async_trait;
use chrono::Utc;
use diesel::{RunQueryDsl, insert_into, prelude::*, update, upsert::excluded};
use std::sync::Arc;
use tracing::debug;

use crate::{
    domain,
    infra::db::postgres::{postgres_connection::PgPoolSquad, schema::whatsapp_messages},
};
use domain::{
    entities::whatsapp_messages::{UpsertWhatsappMessageEntity, WhatsappMessageEntity},
    repositories::whatsapp_messages::WhatsappMessageRepository,
    value_objects::{
        enums::message_directions::MessageDirection, whatsapp_webhook::WebhookStatusRecord,
    },
};

pub struct WhatsappMessagePostgres {
    db_pool: Arc<PgPoolSquad>,
}

impl WhatsappMessagePostgres {
    pub fn new(db_pool: Arc<PgPoolSquad>) -> Self {
        Self { db_pool }
    }
}

#[async_trait]
impl WhatsappMessageRepository for WhatsappMessagePostgres {
    async fn upsert_message(&self, entity: UpsertWhatsappMessageEntity) -> Result<()> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        insert_into(whatsapp_messages::table)
            .values(&entity)
            .on_conflict(whatsapp_messages::provider_message_id)
            .do_update()
            .set((
                whatsapp_messages::phone.eq(excluded(whatsapp_messages::phone)),
                whatsapp_messages::body.eq(excluded(whatsapp_messages::body)),
                whatsapp_messages::updated_at.eq(excluded(whatsapp_messages::updated_at)),
            ))
            .execute(&mut conn)?;

        Ok(())
    }

    async fn upsert_status(&self, record: WebhookStatusRecord) -> Result<()> {
        let mut conn = Arc::clone(&self.db_pool).get()?;
        let now = Utc::now();

        // A status can arrive before the outbound mirror row exists.
        let entity = UpsertWhatsappMessageEntity {
            provider_message_id: record.provider_message_id.clone(),
            direction: MessageDirection::Outbound.to_string(),
            phone: record.phone.clone().unwrap_or_default(),
            body: None,
            status: Some(record.status.clone()),
            raw: record.raw.clone(),
            provider_timestamp: record.provider_timestamp,
            created_at: now,
            updated_at: now,
        };

        conn.transaction::<_, anyhow::Error, _>(|conn| {
            let inserted = insert_into(whatsapp_messages::table)
                .values(&entity)
                .on_conflict(whatsapp_messages::provider_message_id)
                .do_nothing()
                .execute(conn)?;
            if inserted == 1 {
                return Ok(());
            }

            let current = whatsapp_messages::table
                .find(record.provider_message_id.as_str())
                .select(whatsapp_messages::status)
                .for_update()
                .first::<Option<String>>(conn)?;

            if !record.advances(current.as_deref()) {
                debug!(
                    provider_message_id = %record.provider_message_id,
                    current = ?current,
                    incoming = %record.status,
                    "whatsapp_messages: ignoring stale status"
                );
                return Ok(());
            }

            update(whatsapp_messages::table.find(record.provider_message_id.as_str()))
                .set((
                    whatsapp_messages::status.eq(Some(record.status.as_str())),
                    whatsapp_messages::provider_timestamp.eq(record.provider_timestamp),
                    whatsapp_messages::updated_at.eq(now),
                ))
                .execute(conn)?;
            Ok(())
        })
    }

    async fn list_chats(&self, limit: i64) -> Result<Vec<WhatsappMessageEntity>> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        let mut latest = whatsapp_messages::table
            .filter(whatsapp_messages::phone.ne(""))
            .distinct_on(whatsapp_messages::phone)
            .order((
                whatsapp_messages::phone.asc(),
                whatsapp_messages::created_at.desc(),
            ))
            .select(WhatsappMessageEntity::as_select())
            .load::<WhatsappMessageEntity>(&mut conn)?;

        latest.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        latest.truncate(limit.max(0) as usize);

        Ok(latest)
    }

    async fn list_messages_for_phone(
        &self,
        phone: &str,
        limit: i64,
    ) -> Result<Vec<WhatsappMessageEntity>> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        let mut results = whatsapp_messages::table
            .filter(whatsapp_messages::phone.eq(phone))
            .order(whatsapp_messages::created_at.desc())
            .limit(limit)
            .select(WhatsappMessageEntity::as_select())
            .load::<WhatsappMessageEntity>(&mut conn)?;

        results.reverse();
        Ok(results)
    }
}
