use anyhow::Result;
use async_trait::async_trait;
use diesel::{OptionalExtension, RunQueryDsl, dsl::exists, prelude::*, select};
use std::sync::Arc;
use uuid::Uuid;

use crate::{
    domain,
    infra::db::postgres::{
        postgres_connection::PgPoolSquad,
        schema::{discount_code_usages, discount_codes},
    },
};
use domain::{
    entities::discount_codes::DiscountCodeEntity,
    repositories::discount_codes::DiscountCodeRepository,
};

pub struct DiscountCodePostgres {
    db_pool: Arc<PgPoolSquad>,
}

impl DiscountCodePostgres {
    pub fn new(db_pool: Arc<PgPoolSquad>) -> Self {
        Self { db_pool }
    }
}

#[async_trait]
impl DiscountCodeRepository for DiscountCodePostgres {
    async fn find_by_code(&self, code: &str) -> Result<Option<DiscountCodeEntity>> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        let discount_code = discount_codes::table
            .filter(discount_codes::code.eq(code))
            .select(DiscountCodeEntity::as_select())
            .first::<DiscountCodeEntity>(&mut conn)
            .optional()?;

        Ok(discount_code)
    }

    async fn has_user_redeemed(&self, discount_code_id: Uuid, user_id: Uuid) -> Result<bool> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        let redeemed = select(exists(
            discount_code_usages::table
                .filter(discount_code_usages::discount_code_id.eq(discount_code_id))
                .filter(discount_code_usages::user_id.eq(user_id)),
        ))
        .get_result::<bool>(&mut conn)?;

        Ok(redeemed)
    }
}
