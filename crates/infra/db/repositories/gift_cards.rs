use anyhow::Result;
use async_trait::async_trait;
use chrono::Utc;
use diesel::{OptionalExtension, RunQueryDsl, insert_into, prelude::*, update};
use std::sync::Arc;
use uuid::Uuid;

use crate::{
    domain,
    infra::db::postgres::{postgres_connection::PgPoolSquad, schema::gift_cards},
};
use domain::{
    entities::gift_cards::{GiftCardEntity, InsertGiftCardEntity},
    repositories::gift_cards::GiftCardRepository,
};

pub struct GiftCardPostgres {
    db_pool: Arc<PgPoolSquad>,
}

impl GiftCardPostgres {
    pub fn new(db_pool: Arc<PgPoolSquad>) -> Self {
        Self { db_pool }
    }
}

#[async_trait]
impl GiftCardRepository for GiftCardPostgres {
    async fn find_by_code(&self, code: &str) -> Result<Option<GiftCardEntity>> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        let card = gift_cards::table
            .filter(gift_cards::code.eq(code))
            .select(GiftCardEntity::as_select())
            .first::<GiftCardEntity>(&mut conn)
            .optional()?;

        Ok(card)
    }

    async fn claim(&self, gift_card_id: Uuid, user_id: Uuid) -> Result<bool> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        let claimed = update(
            gift_cards::table
                .filter(gift_cards::id.eq(gift_card_id))
                .filter(gift_cards::is_active.eq(true))
                .filter(gift_cards::claimed_by_user_id.is_null()),
        )
        .set((
            gift_cards::claimed_by_user_id.eq(Some(user_id)),
            gift_cards::claimed_at.eq(Some(Utc::now())),
        ))
        .execute(&mut conn)?;

        Ok(claimed == 1)
    }

    async fn issue(&self, entity: InsertGiftCardEntity) -> Result<Uuid> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        let gift_card_id = insert_into(gift_cards::table)
            .values(&entity)
            .returning(gift_cards::id)
            .get_result::<Uuid>(&mut conn)?;

        Ok(gift_card_id)
    }
}
