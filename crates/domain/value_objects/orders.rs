use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::{
    entities::orders::{InsertOrderEntity, OrderEntity},
    value_objects::{
        enums::{delivery_types::DeliveryType, payment_methods::PaymentMethod},
        gift_cards::GiftCardRedemption,
        products::ProductExtra,
    },
};

pub const MAX_ITEM_QUANTITY: i32 = 50;

#[derive(Debug, Clone, Deserialize)]
pub struct OrderItemRequest {
    pub product_id: Uuid,
    pub quantity: i32,
    #[serde(default)]
    pub extras: Vec<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CreateOrderRequest {
    pub customer_name: String,
    pub customer_phone: String,
    pub items: Vec<OrderItemRequest>,
    pub delivery_type: DeliveryType,
    pub address: Option<String>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub payment_method: PaymentMethod,
    pub discount_code: Option<String>,
    pub gift_card_code: Option<String>,
    pub notes: Option<String>,
}

/// A priced cart line, stored verbatim in `orders.items`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct OrderLine {
    pub product_id: Uuid,
    pub name: String,
    pub unit_price_minor: i64,
    pub quantity: i32,
    pub extras: Vec<ProductExtra>,
}

impl OrderLine {
    pub fn line_total_minor(&self) -> i64 {
        let extras: i64 = self.extras.iter().map(|extra| extra.price_minor).sum();
        (self.unit_price_minor + extras) * i64::from(self.quantity)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct PriceBreakdown {
    pub subtotal_minor: i64,
    pub discount_minor: i64,
    pub delivery_fee_minor: i64,
    pub gift_card_minor: i64,
    pub total_minor: i64,
}

/// Discount first, then delivery fee, then the gift card covers what it can.
pub fn price_order(
    lines: &[OrderLine],
    discount_minor: i64,
    delivery_fee_minor: i64,
    gift_card_available_minor: Option<i64>,
) -> PriceBreakdown {
    let subtotal_minor: i64 = lines.iter().map(OrderLine::line_total_minor).sum();
    let discount_minor = discount_minor.clamp(0, subtotal_minor);
    let delivery_fee_minor = delivery_fee_minor.max(0);
    let due = subtotal_minor - discount_minor + delivery_fee_minor;
    let gift_card_minor = gift_card_available_minor.unwrap_or(0).clamp(0, due);

    PriceBreakdown {
        subtotal_minor,
        discount_minor,
        delivery_fee_minor,
        gift_card_minor,
        total_minor: due - gift_card_minor,
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct DiscountCodeRedemption {
    pub discount_code_id: Uuid,
    pub user_id: Uuid,
}

/// Everything written by one checkout, committed in a single transaction.
#[derive(Debug, Clone)]
pub struct PlaceOrderModel {
    pub order: InsertOrderEntity,
    pub discount_code: Option<DiscountCodeRedemption>,
    pub gift_card: Option<GiftCardRedemption>,
    pub birthday_year: Option<i32>,
}

#[derive(Debug, Clone, Serialize)]
pub struct CreateOrderResponse {
    pub order_id: Uuid,
    pub pricing: PriceBreakdown,
    pub total_minor: i64,
    pub eta_text: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct OrderDto {
    pub id: Uuid,
    pub customer_name: String,
    pub items: Vec<OrderLine>,
    pub subtotal_minor: i64,
    pub discount_minor: i64,
    pub delivery_fee_minor: i64,
    pub gift_card_minor: i64,
    pub total_minor: i64,
    pub delivery_type: String,
    pub address: Option<String>,
    pub payment_method: String,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl From<OrderEntity> for OrderDto {
    fn from(value: OrderEntity) -> Self {
        Self {
            id: value.id,
            customer_name: value.customer_name,
            items: serde_json::from_value(value.items).unwrap_or_default(),
            subtotal_minor: value.subtotal_minor,
            discount_minor: value.discount_minor,
            delivery_fee_minor: value.delivery_fee_minor,
            gift_card_minor: value.gift_card_minor,
            total_minor: value.total_minor,
            delivery_type: value.delivery_type,
            address: value.address,
            payment_method: value.payment_method,
            notes: value.notes,
            created_at: value.created_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn line(unit: i64, qty: i32, extras: &[i64]) -> OrderLine {
        OrderLine {
            product_id: Uuid::new_v4(),
            name: "item".to_string(),
            unit_price_minor: unit,
            quantity: qty,
            extras: extras
                .iter()
                .map(|price| ProductExtra {
                    name: format!("extra-{price}"),
                    price_minor: *price,
                })
                .collect(),
        }
    }

    #[test]
    fn extras_are_charged_per_unit() {
        assert_eq!(line(1_000, 3, &[200, 50]).line_total_minor(), 3_750);
    }

    #[test]
    fn discount_then_fee_then_gift_card() {
        let lines = [line(10_000, 2, &[]), line(5_000, 1, &[1_000])];
        let pricing = price_order(&lines, 2_600, 1_500, Some(10_000));
        assert_eq!(pricing.subtotal_minor, 26_000);
        assert_eq!(pricing.discount_minor, 2_600);
        assert_eq!(pricing.delivery_fee_minor, 1_500);
        assert_eq!(pricing.gift_card_minor, 10_000);
        assert_eq!(pricing.total_minor, 14_900);
    }

    #[test]
    fn gift_card_never_covers_more_than_due() {
        let pricing = price_order(&[line(1_000, 1, &[])], 0, 0, Some(50_000));
        assert_eq!(pricing.gift_card_minor, 1_000);
        assert_eq!(pricing.total_minor, 0);
    }

    #[test]
    fn discount_is_capped_at_subtotal() {
        let pricing = price_order(&[line(1_000, 1, &[])], 9_999, 500, None);
        assert_eq!(pricing.discount_minor, 1_000);
        assert_eq!(pricing.total_minor, 500);
    }
}
