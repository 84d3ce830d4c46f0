use anyhow::Result;
use async_trait::async_trait;
use chrono::Utc;
use diesel::{RunQueryDsl, prelude::*, update};
use std::sync::Arc;
use uuid::Uuid;

use crate::{
    domain,
    infra::db::postgres::{postgres_connection::PgPoolSquad, schema::products},
};
use domain::{entities::products::ProductEntity, repositories::products::ProductRepository};

pub struct ProductPostgres {
    db_pool: Arc<PgPoolSquad>,
}

impl ProductPostgres {
    pub fn new(db_pool: Arc<PgPoolSquad>) -> Self {
        Self { db_pool }
    }
}

#[async_trait]
impl ProductRepository for ProductPostgres {
    async fn list_products(&self) -> Result<Vec<ProductEntity>> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        let results = products::table
            .order((
                products::available.desc(),
                products::sort_order.asc(),
                products::name.asc(),
            ))
            .select(ProductEntity::as_select())
            .load::<ProductEntity>(&mut conn)?;

        Ok(results)
    }

    async fn find_by_ids(&self, product_ids: Vec<Uuid>) -> Result<Vec<ProductEntity>> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        let results = products::table
            .filter(products::id.eq_any(product_ids))
            .select(ProductEntity::as_select())
            .load::<ProductEntity>(&mut conn)?;

        Ok(results)
    }

    async fn set_availability(&self, product_id: Uuid, available: bool) -> Result<bool> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        let updated = update(products::table.filter(products::id.eq(product_id)))
            .set((
                products::available.eq(available),
                products::updated_at.eq(Utc::now()),
            ))
            .execute(&mut conn)?;

        Ok(updated == 1)
    }
}
