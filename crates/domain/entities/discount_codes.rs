use chrono::{DateTime, Utc};
use diesel::prelude::*;
use uuid::Uuid;

use crate::infra::db::postgres::schema::{discount_code_usages, discount_codes};

#[derive(Debug, Clone, Identifiable, Selectable, Queryable)]
#[diesel(table_name = discount_codes)]
pub struct DiscountCodeEntity {
    pub id: Uuid,
    pub code: String,
    pub kind: String,
    pub value: i64,
    pub max_uses: Option<i32>,
    pub times_used: i32,
    pub expires_at: Option<DateTime<Utc>>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = discount_code_usages)]
pub struct InsertDiscountCodeUsageEntity {
    pub discount_code_id: Uuid,
    pub user_id: Uuid,
    pub order_id: Uuid,
    pub created_at: DateTime<Utc>,
}
