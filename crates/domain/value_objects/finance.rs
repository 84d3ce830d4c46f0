use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Deserialize)]
pub struct FinanceQuery {
    pub from: Option<DateTime<Utc>>,
    pub to: Option<DateTime<Utc>>,
}

/// Per-order amounts the summary is folded from.
#[derive(Debug, Clone, PartialEq)]
pub struct FinanceOrderRow {
    pub payment_method: String,
    pub delivery_type: String,
    pub subtotal_minor: i64,
    pub discount_minor: i64,
    pub delivery_fee_minor: i64,
    pub gift_card_minor: i64,
    pub total_minor: i64,
}

#[derive(Debug, Clone, Default, Serialize, PartialEq)]
pub struct FinanceBucket {
    pub key: String,
    pub orders: i64,
    pub total_minor: i64,
}

#[derive(Debug, Clone, Default, Serialize, PartialEq)]
pub struct FinanceSummaryDto {
    pub from: Option<DateTime<Utc>>,
    pub to: Option<DateTime<Utc>>,
    pub orders: i64,
    pub gross_minor: i64,
    pub discount_minor: i64,
    pub delivery_fee_minor: i64,
    pub gift_card_minor: i64,
    pub collected_minor: i64,
    pub by_payment_method: Vec<FinanceBucket>,
    pub by_delivery_type: Vec<FinanceBucket>,
}

fn add_to_bucket(buckets: &mut Vec<FinanceBucket>, key: &str, total_minor: i64) {
    match buckets.iter_mut().find(|bucket| bucket.key == key) {
        Some(bucket) => {
            bucket.orders += 1;
            bucket.total_minor += total_minor;
        }
        None => buckets.push(FinanceBucket {
            key: key.to_string(),
            orders: 1,
            total_minor,
        }),
    }
}

pub fn summarize(
    rows: &[FinanceOrderRow],
    from: Option<DateTime<Utc>>,
    to: Option<DateTime<Utc>>,
) -> FinanceSummaryDto {
    let mut summary = FinanceSummaryDto {
        from,
        to,
        ..FinanceSummaryDto::default()
    };
    for row in rows {
        summary.orders += 1;
        summary.gross_minor += row.subtotal_minor;
        summary.discount_minor += row.discount_minor;
        summary.delivery_fee_minor += row.delivery_fee_minor;
        summary.gift_card_minor += row.gift_card_minor;
        summary.collected_minor += row.total_minor;
        add_to_bucket(&mut summary.by_payment_method, &row.payment_method, row.total_minor);
        add_to_bucket(&mut summary.by_delivery_type, &row.delivery_type, row.total_minor);
    }
    summary.by_payment_method.sort_by(|a, b| a.key.cmp(&b.key));
    summary.by_delivery_type.sort_by(|a, b| a.key.cmp(&b.key));
    summary
}
