use anyhow::Result;
use async_trait::async_trait;
use mockall::automock;
use uuid::Uuid;

use crate::domain::entities::discount_codes::DiscountCodeEntity;

#[automock]
#[async_trait]
pub trait DiscountCodeRepository {
    async fn find_by_code(&self, code: &str) -> Result<Option<DiscountCodeEntity>>;

    async fn has_user_redeemed(&self, discount_code_id: Uuid, user_id: Uuid) -> Result<bool>;
}
