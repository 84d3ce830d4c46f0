use chrono::{DateTime, Utc};
use diesel::prelude::*;
use uuid::Uuid;

use crate::infra::db::postgres::schema::products;

#[derive(Debug, Clone, Identifiable, Selectable, Queryable)]
#[diesel(table_name = products)]
pub struct ProductEntity {
    pub id: Uuid,
    pub name: String,
    pub category: String,
    pub price_minor: i64,
    /// JSON list of `{ "name": ..., "price_minor": ... }`.
    pub extras: serde_json::Value,
    pub available: bool,
    pub sort_order: i32,
    pub updated_at: DateTime<Utc>,
}
