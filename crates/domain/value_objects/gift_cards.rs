use rand::{Rng, distributions::Alphanumeric};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::entities::gift_cards::GiftCardEntity;

pub const GIFT_CARD_CODE_LEN: usize = 12;

pub fn generate_gift_card_code() -> String {
    rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(GIFT_CARD_CODE_LEN)
        .map(|byte| char::from(byte).to_ascii_uppercase())
        .collect()
}

/// Balance after spending `amount_minor`, or `None` if it would go negative.
pub fn remaining_after(remaining_minor: i64, amount_minor: i64) -> Option<i64> {
    if amount_minor < 0 {
        return None;
    }
    remaining_minor
        .checked_sub(amount_minor)
        .filter(|balance| *balance >= 0)
}

/// Who may spend this card: its claimer, or anyone while it is unclaimed.
pub fn usable_by(card: &GiftCardEntity, user_id: Uuid) -> bool {
    card.is_active && card.claimed_by_user_id.is_none_or(|owner| owner == user_id)
}

#[derive(Debug, Deserialize)]
pub struct GiftCardCodeRequest {
    pub code: String,
}

#[derive(Debug, Deserialize)]
pub struct IssueGiftCardRequest {
    pub amount_minor: i64,
    pub code: Option<String>,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct GiftCardStatusDto {
    pub code: String,
    pub remaining_minor: i64,
    pub active: bool,
    pub claimed: bool,
    pub claimed_by_me: bool,
}

impl GiftCardStatusDto {
    pub fn from_entity(card: &GiftCardEntity, user_id: Uuid) -> Self {
        Self {
            code: card.code.clone(),
            remaining_minor: card.amount_remaining_minor,
            active: card.is_active,
            claimed: card.claimed_by_user_id.is_some(),
            claimed_by_me: card.claimed_by_user_id == Some(user_id),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct IssuedGiftCardDto {
    pub id: Uuid,
    pub code: String,
    pub amount_minor: i64,
}

/// Gift card spend attached to an order insert.
#[derive(Debug, Clone, PartialEq)]
pub struct GiftCardRedemption {
    pub gift_card_id: Uuid,
    pub user_id: Uuid,
    pub amount_minor: i64,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn card(claimed_by: Option<Uuid>) -> GiftCardEntity {
        GiftCardEntity {
            id: Uuid::new_v4(),
            code: "ABCDEF123456".to_string(),
            amount_initial_minor: 50_000,
            amount_remaining_minor: 50_000,
            claimed_by_user_id: claimed_by,
            claimed_at: None,
            is_active: true,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn codes_are_uppercase_alphanumeric() {
        let code = generate_gift_card_code();
        assert_eq!(code.len(), GIFT_CARD_CODE_LEN);
        assert!(code.chars().all(|c| c.is_ascii_digit() || c.is_ascii_uppercase()));
    }

    #[test]
    fn balance_never_goes_negative() {
        let mut balance = 10_000;
        let mut history = vec![balance];
        for spend in [2_500, 0, 7_000, 600, 500] {
            if let Some(next) = remaining_after(balance, spend) {
                balance = next;
            }
            history.push(balance);
        }
        assert!(history.windows(2).all(|pair| pair[1] <= pair[0]));
        assert!(history.iter().all(|value| *value >= 0));
        assert_eq!(balance, 0);
        assert_eq!(remaining_after(100, 101), None);
        assert_eq!(remaining_after(100, -1), None);
    }

    #[test]
    fn only_claimer_can_spend_a_claimed_card() {
        let owner = Uuid::new_v4();
        let stranger = Uuid::new_v4();
        assert!(usable_by(&card(None), stranger));
        assert!(usable_by(&card(Some(owner)), owner));
        assert!(!usable_by(&card(Some(owner)), stranger));

        let mut inactive = card(None);
        inactive.is_active = false;
        assert!(!usable_by(&inactive, owner));
    }
}
