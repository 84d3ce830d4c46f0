use chrono::{DateTime, Utc};
use diesel::prelude::*;

use crate::infra::db::postgres::schema::store_settings;

pub const STORE_SETTINGS_ROW_ID: i32 = 1;

#[derive(Debug, Clone, Identifiable, Selectable, Queryable, Insertable)]
#[diesel(table_name = store_settings)]
pub struct StoreSettingsEntity {
    pub id: i32,
    pub hours_override: String,
    pub updated_at: DateTime<Utc>,
}
