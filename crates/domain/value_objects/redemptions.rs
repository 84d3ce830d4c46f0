use thiserror::Error;

/// Raised inside the order transaction when a conditional update matched no
/// row; the whole order is rolled back.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum RedemptionConflict {
    #[error("discount code has no uses left")]
    DiscountCodeExhausted,
    #[error("discount code already used by this account")]
    DiscountCodeAlreadyUsed,
    #[error("gift card balance is insufficient")]
    GiftCardInsufficientBalance,
    #[error("gift card belongs to another account")]
    GiftCardClaimedByOther,
    #[error("birthday discount already used this year")]
    BirthdayDiscountAlreadyUsed,
}
