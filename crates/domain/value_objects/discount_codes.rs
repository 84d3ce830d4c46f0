use chrono::{DateTime, Datelike, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::domain::{
    entities::{discount_codes::DiscountCodeEntity, profiles::ProfileEntity},
    value_objects::enums::discount_kinds::DiscountKind,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum DiscountRejection {
    #[error("discount code not found")]
    NotFound,
    #[error("discount code is not active")]
    Inactive,
    #[error("discount code has expired")]
    Expired,
    #[error("discount code has no uses left")]
    Exhausted,
    #[error("discount code already used by this account")]
    AlreadyUsed,
}

pub fn normalize_code(raw: &str) -> String {
    raw.trim().to_uppercase()
}

pub fn discount_amount(kind: DiscountKind, value: i64, subtotal_minor: i64) -> i64 {
    let subtotal_minor = subtotal_minor.max(0);
    match kind {
        DiscountKind::Percent => subtotal_minor * value.clamp(0, 100) / 100,
        DiscountKind::Fixed => value.clamp(0, subtotal_minor),
    }
}

/// Everything except the per-user check, which needs the usage table.
pub fn check_redeemable(
    code: &DiscountCodeEntity,
    now: DateTime<Utc>,
) -> Result<DiscountKind, DiscountRejection> {
    if !code.is_active {
        return Err(DiscountRejection::Inactive);
    }
    if code.expires_at.is_some_and(|expires_at| expires_at <= now) {
        return Err(DiscountRejection::Expired);
    }
    if code
        .max_uses
        .is_some_and(|max_uses| code.times_used >= max_uses)
    {
        return Err(DiscountRejection::Exhausted);
    }
    // Unknown kinds in the table are treated as dead codes.
    code.kind
        .parse::<DiscountKind>()
        .map_err(|_| DiscountRejection::Inactive)
}

/// Feb 29 birthdays are celebrated on Feb 28 in common years.
pub fn is_birthday(birth_date: NaiveDate, today: NaiveDate) -> bool {
    let common_year = NaiveDate::from_ymd_opt(today.year(), 2, 29).is_none();
    if birth_date.month() == 2 && birth_date.day() == 29 && common_year {
        return today.month() == 2 && today.day() == 28;
    }
    birth_date.month() == today.month() && birth_date.day() == today.day()
}

pub fn birthday_discount_eligible(profile: &ProfileEntity, today: NaiveDate) -> bool {
    let Some(birth_date) = profile.birth_date else {
        return false;
    };
    is_birthday(birth_date, today) && profile.birthday_discount_year != Some(today.year())
}

#[derive(Debug, Deserialize)]
pub struct ValidateDiscountRequest {
    pub code: String,
    pub subtotal_minor: i64,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct DiscountQuote {
    pub code: String,
    pub kind: DiscountKind,
    pub value: i64,
    pub discount_minor: i64,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct BirthdayDiscountDto {
    pub eligible: bool,
    pub percent: i64,
}

/// Discount applied to an order, resolved before pricing.
#[derive(Debug, Clone, PartialEq)]
pub enum AppliedDiscount {
    None,
    Code {
        discount_code_id: uuid::Uuid,
        quote: DiscountQuote,
    },
    Birthday {
        percent: i64,
        year: i32,
    },
}

impl AppliedDiscount {
    pub fn amount(&self, subtotal_minor: i64) -> i64 {
        match self {
            AppliedDiscount::None => 0,
            AppliedDiscount::Code { quote, .. } => {
                discount_amount(quote.kind, quote.value, subtotal_minor)
            }
            AppliedDiscount::Birthday { percent, .. } => {
                discount_amount(DiscountKind::Percent, *percent, subtotal_minor)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use uuid::Uuid;

    fn code(kind: &str, value: i64) -> DiscountCodeEntity {
        DiscountCodeEntity {
            id: Uuid::new_v4(),
            code: "PROMO10".to_string(),
            kind: kind.to_string(),
            value,
            max_uses: Some(3),
            times_used: 0,
            expires_at: None,
            is_active: true,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn percent_and_fixed_amounts() {
        assert_eq!(discount_amount(DiscountKind::Percent, 10, 25_000), 2_500);
        assert_eq!(discount_amount(DiscountKind::Percent, 150, 25_000), 25_000);
        assert_eq!(discount_amount(DiscountKind::Fixed, 3_000, 25_000), 3_000);
        assert_eq!(discount_amount(DiscountKind::Fixed, 30_000, 25_000), 25_000);
        assert_eq!(discount_amount(DiscountKind::Fixed, -1, 25_000), 0);
    }

    #[test]
    fn rejections_in_order() {
        let now = Utc::now();
        assert_eq!(check_redeemable(&code("percent", 10), now), Ok(DiscountKind::Percent));

        let mut inactive = code("percent", 10);
        inactive.is_active = false;
        assert_eq!(check_redeemable(&inactive, now), Err(DiscountRejection::Inactive));

        let mut expired = code("fixed", 500);
        expired.expires_at = Some(now - Duration::minutes(1));
        assert_eq!(check_redeemable(&expired, now), Err(DiscountRejection::Expired));

        let mut exhausted = code("fixed", 500);
        exhausted.times_used = 3;
        assert_eq!(check_redeemable(&exhausted, now), Err(DiscountRejection::Exhausted));

        let mut unlimited = code("fixed", 500);
        unlimited.max_uses = None;
        unlimited.times_used = 1_000;
        assert_eq!(check_redeemable(&unlimited, now), Ok(DiscountKind::Fixed));
    }

    #[test]
    fn birthdays_match_month_and_day() {
        let birth = NaiveDate::from_ymd_opt(1990, 10, 19).unwrap();
        assert!(is_birthday(birth, NaiveDate::from_ymd_opt(2026, 10, 19).unwrap()));
        assert!(!is_birthday(birth, NaiveDate::from_ymd_opt(2026, 10, 20).unwrap()));

        let leap = NaiveDate::from_ymd_opt(2000, 2, 29).unwrap();
        assert!(is_birthday(leap, NaiveDate::from_ymd_opt(2026, 2, 28).unwrap()));
        assert!(is_birthday(leap, NaiveDate::from_ymd_opt(2028, 2, 29).unwrap()));
        assert!(!is_birthday(leap, NaiveDate::from_ymd_opt(2028, 2, 28).unwrap()));
    }

    #[test]
    fn birthday_discount_once_per_year() {
        let today = NaiveDate::from_ymd_opt(2026, 10, 19).unwrap();
        let mut profile = ProfileEntity {
            user_id: Uuid::new_v4(),
            full_name: None,
            phone: None,
            birth_date: Some(NaiveDate::from_ymd_opt(1990, 10, 19).unwrap()),
            birthday_discount_year: Some(2025),
        };
        assert!(birthday_discount_eligible(&profile, today));

        profile.birthday_discount_year = Some(2026);
        assert!(!birthday_discount_eligible(&profile, today));

        profile.birth_date = None;
        profile.birthday_discount_year = None;
        assert!(!birthday_discount_eligible(&profile, today));
    }
}
