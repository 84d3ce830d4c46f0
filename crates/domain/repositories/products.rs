use anyhow::Result;
use async_trait::async_trait;
use mockall::automock;
use uuid::Uuid;

use crate::domain::entities::products::ProductEntity;

#[automock]
#[async_trait]
pub trait ProductRepository {
    async fn list_products(&self) -> Result<Vec<ProductEntity>>;

    async fn find_by_ids(&self, product_ids: Vec<Uuid>) -> Result<Vec<ProductEntity>>;

    /// Returns `false` when the product does not exist.
    async fn set_availability(&self, product_id: Uuid, available: bool) -> Result<bool>;
}
