use anyhow::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use mockall::automock;
use uuid::Uuid;

use crate::domain::{
    entities::orders::OrderEntity,
    value_objects::{finance::FinanceOrderRow, orders::PlaceOrderModel},
};

#[automock]
#[async_trait]
pub trait OrderRepository {
    /// Inserts the order and applies every redemption atomically. A
    /// conditional update that matches nothing fails with a
    /// `RedemptionConflict` inside the returned error.
    async fn place_order(&self, model: PlaceOrderModel) -> Result<Uuid>;

    async fn find_order_for_user(&self, order_id: Uuid, user_id: Uuid)
    -> Result<Option<OrderEntity>>;

    async fn list_orders_for_user(&self, user_id: Uuid, limit: i64) -> Result<Vec<OrderEntity>>;

    async fn list_finance_rows(
        &self,
        from: Option<DateTime<Utc>>,
        to: Option<DateTime<Utc>>,
    ) -> Result<Vec<FinanceOrderRow>>;
}
