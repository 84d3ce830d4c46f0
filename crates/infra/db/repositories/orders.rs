use anyhow::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use diesel::{OptionalExtension, RunQueryDsl, insert_into, prelude::*, update};
use std::sync::Arc;
use uuid::Uuid;

use crate::{
    domain,
    infra::db::postgres::{
        postgres_connection::PgPoolSquad,
        schema::{discount_code_usages, discount_codes, gift_card_usages, gift_cards, orders, profiles},
    },
};
use domain::{
    entities::{
        discount_codes::InsertDiscountCodeUsageEntity,
        gift_cards::{GiftCardEntity, InsertGiftCardUsageEntity},
        orders::OrderEntity,
    },
    repositories::orders::OrderRepository,
    value_objects::{
        finance::FinanceOrderRow, orders::PlaceOrderModel, redemptions::RedemptionConflict,
    },
};

pub struct OrderPostgres {
    db_pool: Arc<PgPoolSquad>,
}

impl OrderPostgres {
    pub fn new(db_pool: Arc<PgPoolSquad>) -> Self {
        Self { db_pool }
    }
}

#[async_trait]
impl OrderRepository for OrderPostgres {
    async fn place_order(&self, model: PlaceOrderModel) -> Result<Uuid> {
        let mut conn = Arc::clone(&self.db_pool).get()?;
        let order_id = model.order.id;
        let user_id = model.order.user_id;
        let now = model.order.created_at;

        conn.transaction::<_, anyhow::Error, _>(|conn| {
            insert_into(orders::table)
                .values(&model.order)
                .execute(conn)?;

            if let Some(redemption) = &model.discount_code {
                let bumped = update(
                    discount_codes::table
                        .filter(discount_codes::id.eq(redemption.discount_code_id))
                        .filter(discount_codes::is_active.eq(true))
                        .filter(
                            discount_codes::max_uses.is_null().or(discount_codes::times_used
                                .lt(discount_codes::max_uses.assume_not_null())),
                        ),
                )
                .set(discount_codes::times_used.eq(discount_codes::times_used + 1))
                .execute(conn)?;
                if bumped == 0 {
                    return Err(RedemptionConflict::DiscountCodeExhausted.into());
                }

                let inserted = insert_into(discount_code_usages::table)
                    .values(&InsertDiscountCodeUsageEntity {
                        discount_code_id: redemption.discount_code_id,
                        user_id: redemption.user_id,
                        order_id,
                        created_at: now,
                    })
                    .on_conflict_do_nothing()
                    .execute(conn)?;
                if inserted == 0 {
                    return Err(RedemptionConflict::DiscountCodeAlreadyUsed.into());
                }
            }

            if let Some(redemption) = &model.gift_card {
                let debited = update(
                    gift_cards::table
                        .filter(gift_cards::id.eq(redemption.gift_card_id))
                        .filter(gift_cards::is_active.eq(true))
                        .filter(gift_cards::amount_remaining_minor.ge(redemption.amount_minor))
                        .filter(gift_cards::claimed_by_user_id.is_null().or(
                            gift_cards::claimed_by_user_id
                                .assume_not_null()
                                .eq(redemption.user_id),
                        )),
                )
                .set((
                    gift_cards::amount_remaining_minor
                        .eq(gift_cards::amount_remaining_minor - redemption.amount_minor),
                    gift_cards::claimed_by_user_id.eq(Some(redemption.user_id)),
                ))
                .execute(conn)?;

                if debited == 0 {
                    let card = gift_cards::table
                        .find(redemption.gift_card_id)
                        .select(GiftCardEntity::as_select())
                        .first::<GiftCardEntity>(conn)
                        .optional()?;
                    let conflict = match card {
                        Some(card)
                            if card
                                .claimed_by_user_id
                                .is_some_and(|owner| owner != redemption.user_id) =>
                        {
                            RedemptionConflict::GiftCardClaimedByOther
                        }
                        _ => RedemptionConflict::GiftCardInsufficientBalance,
                    };
                    return Err(conflict.into());
                }

                update(
                    gift_cards::table
                        .filter(gift_cards::id.eq(redemption.gift_card_id))
                        .filter(gift_cards::claimed_at.is_null()),
                )
                .set(gift_cards::claimed_at.eq(Some(now)))
                .execute(conn)?;

                insert_into(gift_card_usages::table)
                    .values(&InsertGiftCardUsageEntity {
                        gift_card_id: redemption.gift_card_id,
                        order_id,
                        amount_minor: redemption.amount_minor,
                        created_at: now,
                    })
                    .execute(conn)?;
            }

            if let Some(year) = model.birthday_year {
                let marked = update(
                    profiles::table
                        .filter(profiles::user_id.eq(user_id))
                        .filter(
                            profiles::birthday_discount_year.is_null().or(
                                profiles::birthday_discount_year
                                    .assume_not_null()
                                    .ne(year),
                            ),
                        ),
                )
                .set(profiles::birthday_discount_year.eq(Some(year)))
                .execute(conn)?;
                if marked == 0 {
                    return Err(RedemptionConflict::BirthdayDiscountAlreadyUsed.into());
                }
            }

            Ok(order_id)
        })
    }

    async fn find_order_for_user(
        &self,
        order_id: Uuid,
        user_id: Uuid,
    ) -> Result<Option<OrderEntity>> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        let order = orders::table
            .filter(orders::id.eq(order_id))
            .filter(orders::user_id.eq(user_id))
            .select(OrderEntity::as_select())
            .first::<OrderEntity>(&mut conn)
            .optional()?;

        Ok(order)
    }

    async fn list_orders_for_user(&self, user_id: Uuid, limit: i64) -> Result<Vec<OrderEntity>> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        let results = orders::table
            .filter(orders::user_id.eq(user_id))
            .order(orders::created_at.desc())
            .limit(limit)
            .select(OrderEntity::as_select())
            .load::<OrderEntity>(&mut conn)?;

        Ok(results)
    }

    async fn list_finance_rows(
        &self,
        from: Option<DateTime<Utc>>,
        to: Option<DateTime<Utc>>,
    ) -> Result<Vec<FinanceOrderRow>> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        let mut query = orders::table.into_boxed();
        if let Some(from) = from {
            query = query.filter(orders::created_at.ge(from));
        }
        if let Some(to) = to {
            query = query.filter(orders::created_at.lt(to));
        }

        let rows = query
            .select((
                orders::payment_method,
                orders::delivery_type,
                orders::subtotal_minor,
                orders::discount_minor,
                orders::delivery_fee_minor,
                orders::gift_card_minor,
                orders::total_minor,
            ))
            .load::<(String, String, i64, i64, i64, i64, i64)>(&mut conn)?;

        let results = rows
            .into_iter()
            .map(
                |(
                    payment_method,
                    delivery_type,
                    subtotal_minor,
                    discount_minor,
                    delivery_fee_minor,
                    gift_card_minor,
                    total_minor,
                )| FinanceOrderRow {
                    payment_method,
                    delivery_type,
                    subtotal_minor,
                    discount_minor,
                    delivery_fee_minor,
                    gift_card_minor,
                    total_minor,
                },
            )
            .collect();

        Ok(results)
    }
}
