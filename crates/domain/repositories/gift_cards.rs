use anyhow::Result;
use async_trait::async_trait;
use mockall::automock;
use uuid::Uuid;

use crate::domain::entities::gift_cards::{GiftCardEntity, InsertGiftCardEntity};

#[automock]
#[async_trait]
pub trait GiftCardRepository {
    async fn find_by_code(&self, code: &str) -> Result<Option<GiftCardEntity>>;

    /// First claim wins: returns `false` when another account got there first.
    async fn claim(&self, gift_card_id: Uuid, user_id: Uuid) -> Result<bool>;

    async fn issue(&self, entity: InsertGiftCardEntity) -> Result<Uuid>;
}
