use chrono::Utc;
use crates::domain::{
    entities::gift_cards::{GiftCardEntity, InsertGiftCardEntity},
    repositories::gift_cards::GiftCardRepository,
    value_objects::{
        discount_codes::normalize_code,
        gift_cards::{
            GiftCardStatusDto, IssueGiftCardRequest, IssuedGiftCardDto, generate_gift_card_code,
            usable_by,
        },
    },
};
use std::sync::Arc;
use thiserror::Error;
use tracing::{info, warn};
use uuid::Uuid;

#[derive(Debug, Error)]
pub enum GiftCardError {
    #[error("gift card not found")]
    NotFound,
    #[error("gift card is not active")]
    Inactive,
    #[error("gift card belongs to another account")]
    ClaimedByOther,
    #[error("gift card amount must be positive")]
    InvalidAmount,
    #[error("gift card code must be 4 to 32 letters or digits")]
    InvalidCode,
    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

impl GiftCardError {
    pub fn status_code(&self) -> axum::http::StatusCode {
        use axum::http::StatusCode;
        match self {
            GiftCardError::NotFound => StatusCode::NOT_FOUND,
            GiftCardError::Inactive => StatusCode::UNPROCESSABLE_ENTITY,
            GiftCardError::ClaimedByOther => StatusCode::CONFLICT,
            GiftCardError::InvalidAmount | GiftCardError::InvalidCode => StatusCode::BAD_REQUEST,
            GiftCardError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

pub type UseCaseResult<T> = std::result::Result<T, GiftCardError>;

pub struct GiftCardUseCase<G>
where
    G: GiftCardRepository + Send + Sync + 'static,
{
    gift_card_repository: Arc<G>,
}

impl<G> GiftCardUseCase<G>
where
    G: GiftCardRepository + Send + Sync + 'static,
{
    pub fn new(gift_card_repository: Arc<G>) -> Self {
        Self {
            gift_card_repository,
        }
    }

    async fn find(&self, raw_code: &str) -> UseCaseResult<GiftCardEntity> {
        let code = normalize_code(raw_code);
        self.gift_card_repository
            .find_by_code(&code)
            .await?
            .ok_or(GiftCardError::NotFound)
    }

    pub async fn validate(&self, user_id: Uuid, raw_code: &str) -> UseCaseResult<GiftCardStatusDto> {
        let card = self.find(raw_code).await?;
        Ok(GiftCardStatusDto::from_entity(&card, user_id))
    }

    /// First claim wins. Claiming a card you already own is a no-op.
    pub async fn claim(&self, user_id: Uuid, raw_code: &str) -> UseCaseResult<GiftCardStatusDto> {
        let card = self.find(raw_code).await?;
        if !card.is_active {
            return Err(GiftCardError::Inactive);
        }

        match card.claimed_by_user_id {
            Some(owner) if owner == user_id => {
                return Ok(GiftCardStatusDto::from_entity(&card, user_id));
            }
            Some(_) => return Err(GiftCardError::ClaimedByOther),
            None => {}
        }

        if self.gift_card_repository.claim(card.id, user_id).await? {
            info!(%user_id, gift_card_id = %card.id, "gift_cards: claimed");
        } else {
            warn!(%user_id, gift_card_id = %card.id, "gift_cards: lost claim race");
        }

        // Re-read so a concurrent claim by the same account still reports success.
        let card = self.find(&card.code).await?;
        if card.claimed_by_user_id != Some(user_id) {
            return Err(GiftCardError::ClaimedByOther);
        }
        Ok(GiftCardStatusDto::from_entity(&card, user_id))
    }

    /// Card the caller may spend at checkout.
    pub async fn usable_card(&self, user_id: Uuid, raw_code: &str) -> UseCaseResult<GiftCardEntity> {
        let card = self.find(raw_code).await?;
        if !card.is_active {
            return Err(GiftCardError::Inactive);
        }
        if !usable_by(&card, user_id) {
            return Err(GiftCardError::ClaimedByOther);
        }
        Ok(card)
    }

    pub async fn issue(&self, request: IssueGiftCardRequest) -> UseCaseResult<IssuedGiftCardDto> {
        if request.amount_minor <= 0 {
            return Err(GiftCardError::InvalidAmount);
        }

        let code = match request.code.as_deref().map(normalize_code) {
            Some(code) => {
                let valid = (4..=32).contains(&code.len())
                    && code.chars().all(|c| c.is_ascii_alphanumeric());
                if !valid {
                    return Err(GiftCardError::InvalidCode);
                }
                code
            }
            None => generate_gift_card_code(),
        };

        let id = self
            .gift_card_repository
            .issue(InsertGiftCardEntity {
                code: code.clone(),
                amount_initial_minor: request.amount_minor,
                amount_remaining_minor: request.amount_minor,
                is_active: true,
                created_at: Utc::now(),
            })
            .await?;

        info!(gift_card_id = %id, amount_minor = request.amount_minor, "gift_cards: issued");
        Ok(IssuedGiftCardDto {
            id,
            code,
            amount_minor: request.amount_minor,
        })
    }
}
