use chrono::{DateTime, Utc};
use diesel::prelude::*;

use crate::infra::db::postgres::schema::whatsapp_messages;

#[derive(Debug, Clone, Identifiable, Selectable, Queryable)]
#[diesel(primary_key(provider_message_id))]
#[diesel(table_name = whatsapp_messages)]
pub struct WhatsappMessageEntity {
    pub provider_message_id: String,
    pub direction: String,
    pub phone: String,
    pub body: Option<String>,
    pub status: Option<String>,
    pub raw: serde_json::Value,
    pub provider_timestamp: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = whatsapp_messages)]
pub struct UpsertWhatsappMessageEntity {
    pub provider_message_id: String,
    pub direction: String,
    pub phone: String,
    pub body: Option<String>,
    pub status: Option<String>,
    pub raw: serde_json::Value,
    pub provider_timestamp: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
