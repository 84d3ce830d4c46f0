use anyhow::Result;
use async_trait::async_trait;
use chrono::Utc;
use diesel::{OptionalExtension, RunQueryDsl, insert_into, prelude::*};
use std::sync::Arc;
use tracing::warn;

use crate::{
    domain,
    infra::db::postgres::{postgres_connection::PgPoolSquad, schema::store_settings},
};
use domain::{
    entities::store_settings::{STORE_SETTINGS_ROW_ID, StoreSettingsEntity},
    repositories::store_settings::StoreSettingsRepository,
    value_objects::enums::hours_override_modes::HoursOverrideMode,
};

pub struct StoreSettingsPostgres {
    db_pool: Arc<PgPoolSquad>,
}

impl StoreSettingsPostgres {
    pub fn new(db_pool: Arc<PgPoolSquad>) -> Self {
        Self { db_pool }
    }
}

#[async_trait]
impl StoreSettingsRepository for StoreSettingsPostgres {
    async fn get_hours_override(&self) -> Result<HoursOverrideMode> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        let raw = store_settings::table
            .find(STORE_SETTINGS_ROW_ID)
            .select(store_settings::hours_override)
            .first::<String>(&mut conn)
            .optional()?;

        let Some(raw) = raw else {
            return Ok(HoursOverrideMode::default());
        };

        match raw.parse::<HoursOverrideMode>() {
            Ok(mode) => Ok(mode),
            Err(err) => {
                warn!(value = %raw, error = %err, "store_settings: unknown hours override, using auto");
                Ok(HoursOverrideMode::default())
            }
        }
    }

    async fn set_hours_override(&self, mode: HoursOverrideMode) -> Result<()> {
        let mut conn = Arc::clone(&self.db_pool).get()?;
        let row = StoreSettingsEntity {
            id: STORE_SETTINGS_ROW_ID,
            hours_override: mode.to_string(),
            updated_at: Utc::now(),
        };

        insert_into(store_settings::table)
            .values(&row)
            .on_conflict(store_settings::id)
            .do_update()
            .set((
                store_settings::hours_override.eq(&row.hours_override),
                store_settings::updated_at.eq(row.updated_at),
            ))
            .execute(&mut conn)?;

        Ok(())
    }
}
