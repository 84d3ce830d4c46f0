use chrono::{DateTime, Utc};
use diesel::prelude::*;
use uuid::Uuid;

use crate::infra::db::postgres::schema::{gift_card_usages, gift_cards};

#[derive(Debug, Clone, Identifiable, Selectable, Queryable)]
#[diesel(table_name = gift_cards)]
pub struct GiftCardEntity {
    pub id: Uuid,
    pub code: String,
    pub amount_initial_minor: i64,
    pub amount_remaining_minor: i64,
    pub claimed_by_user_id: Option<Uuid>,
    pub claimed_at: Option<DateTime<Utc>>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = gift_cards)]
pub struct InsertGiftCardEntity {
    pub code: String,
    pub amount_initial_minor: i64,
    pub amount_remaining_minor: i64,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = gift_card_usages)]
pub struct InsertGiftCardUsageEntity {
    pub gift_card_id: Uuid,
    pub order_id: Uuid,
    pub amount_minor: i64,
    pub created_at: DateTime<Utc>,
}
