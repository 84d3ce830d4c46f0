use chrono::{DateTime, Datelike, FixedOffset, Utc};
use crates::domain::{
    repositories::{discount_codes::DiscountCodeRepository, profiles::ProfileRepository},
    value_objects::discount_codes::{
        BirthdayDiscountDto, DiscountQuote, DiscountRejection, birthday_discount_eligible,
        check_redeemable, discount_amount, normalize_code,
    },
};
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, info};
use uuid::Uuid;

#[derive(Debug, Error)]
pub enum CouponError {
    #[error(transparent)]
    Rejected(#[from] DiscountRejection),
    #[error("subtotal must not be negative")]
    InvalidSubtotal,
    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

impl CouponError {
    pub fn status_code(&self) -> axum::http::StatusCode {
        use axum::http::StatusCode;
        match self {
            CouponError::Rejected(DiscountRejection::NotFound) => StatusCode::NOT_FOUND,
            CouponError::Rejected(DiscountRejection::AlreadyUsed)
            | CouponError::Rejected(DiscountRejection::Exhausted) => StatusCode::CONFLICT,
            CouponError::Rejected(_) => StatusCode::UNPROCESSABLE_ENTITY,
            CouponError::InvalidSubtotal => StatusCode::BAD_REQUEST,
            CouponError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

pub type UseCaseResult<T> = std::result::Result<T, CouponError>;

/// A coupon that passed every check, plus the row it will be booked against.
#[derive(Debug, Clone, PartialEq)]
pub struct RedeemableCode {
    pub discount_code_id: Uuid,
    pub quote: DiscountQuote,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BirthdayDiscount {
    pub percent: i64,
    pub year: i32,
}

pub struct CouponUseCase<D, P>
where
    D: DiscountCodeRepository + Send + Sync + 'static,
    P: ProfileRepository + Send + Sync + 'static,
{
    discount_code_repository: Arc<D>,
    profile_repository: Arc<P>,
    offset: FixedOffset,
    birthday_percent: i64,
}

impl<D, P> CouponUseCase<D, P>
where
    D: DiscountCodeRepository + Send + Sync + 'static,
    P: ProfileRepository + Send + Sync + 'static,
{
    pub fn new(
        discount_code_repository: Arc<D>,
        profile_repository: Arc<P>,
        offset: FixedOffset,
        birthday_percent: i64,
    ) -> Self {
        Self {
            discount_code_repository,
            profile_repository,
            offset,
            birthday_percent,
        }
    }

    pub async fn redeemable_code(
        &self,
        user_id: Uuid,
        raw_code: &str,
        subtotal_minor: i64,
        now: DateTime<Utc>,
    ) -> UseCaseResult<RedeemableCode> {
        if subtotal_minor < 0 {
            return Err(CouponError::InvalidSubtotal);
        }

        let code = normalize_code(raw_code);
        let discount_code = self
            .discount_code_repository
            .find_by_code(&code)
            .await?
            .ok_or(DiscountRejection::NotFound)?;

        let kind = check_redeemable(&discount_code, now)?;

        if self
            .discount_code_repository
            .has_user_redeemed(discount_code.id, user_id)
            .await?
        {
            return Err(DiscountRejection::AlreadyUsed.into());
        }

        let discount_minor = discount_amount(kind, discount_code.value, subtotal_minor);
        debug!(%user_id, code = %code, discount_minor, "coupons: code accepted");

        Ok(RedeemableCode {
            discount_code_id: discount_code.id,
            quote: DiscountQuote {
                code,
                kind,
                value: discount_code.value,
                discount_minor,
            },
        })
    }

    pub async fn validate(
        &self,
        user_id: Uuid,
        raw_code: &str,
        subtotal_minor: i64,
        now: DateTime<Utc>,
    ) -> UseCaseResult<DiscountQuote> {
        let redeemable = self
            .redeemable_code(user_id, raw_code, subtotal_minor, now)
            .await
            .inspect_err(|err| info!(%user_id, error = %err, "coupons: code rejected"))?;
        Ok(redeemable.quote)
    }

    /// Birthdays are judged on the business calendar, not UTC.
    pub async fn birthday_discount(
        &self,
        user_id: Uuid,
        now: DateTime<Utc>,
    ) -> UseCaseResult<Option<BirthdayDiscount>> {
        if self.birthday_percent <= 0 {
            return Ok(None);
        }

        let today = now.with_timezone(&self.offset).date_naive();
        let Some(profile) = self.profile_repository.find_by_user_id(user_id).await? else {
            return Ok(None);
        };

        Ok(birthday_discount_eligible(&profile, today).then_some(BirthdayDiscount {
            percent: self.birthday_percent,
            year: today.year(),
        }))
    }

    pub async fn birthday_status(
        &self,
        user_id: Uuid,
        now: DateTime<Utc>,
    ) -> UseCaseResult<BirthdayDiscountDto> {
        let discount = self.birthday_discount(user_id, now).await?;
        Ok(BirthdayDiscountDto {
            eligible: discount.is_some(),
            percent: self.birthday_percent,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDate, TimeZone};
    use crates::domain::{
        entities::{discount_codes::DiscountCodeEntity, profiles::ProfileEntity},
        repositories::{
            discount_codes::MockDiscountCodeRepository, profiles::MockProfileRepository,
        },
        value_objects::{enums::discount_kinds::DiscountKind, estimates::business_offset},
    };
    use mockall::predicate::eq;

    fn promo(id: Uuid) -> DiscountCodeEntity {
        DiscountCodeEntity {
            id,
            code: "PROMO10".to_string(),
            kind: "percent".to_string(),
            value: 10,
            max_uses: None,
            times_used: 0,
            expires_at: None,
            is_active: true,
            created_at: Utc::now(),
        }
    }

    fn usecase(
        discount_repo: MockDiscountCodeRepository,
        profile_repo: MockProfileRepository,
    ) -> CouponUseCase<MockDiscountCodeRepository, MockProfileRepository> {
        CouponUseCase::new(
            Arc::new(discount_repo),
            Arc::new(profile_repo),
            business_offset(-180).unwrap(),
            15,
        )
    }

    #[tokio::test]
    async fn quotes_normalized_code() {
        let user_id = Uuid::new_v4();
        let code_id = Uuid::new_v4();
        let mut discount_repo = MockDiscountCodeRepository::new();
        discount_repo
            .expect_find_by_code()
            .with(eq("PROMO10"))
            .returning(move |_| Ok(Some(promo(code_id))));
        discount_repo
            .expect_has_user_redeemed()
            .with(eq(code_id), eq(user_id))
            .returning(|_, _| Ok(false));

        let quote = usecase(discount_repo, MockProfileRepository::new())
            .validate(user_id, "  promo10 ", 25_000, Utc::now())
            .await
            .unwrap();

        assert_eq!(quote.code, "PROMO10");
        assert_eq!(quote.kind, DiscountKind::Percent);
        assert_eq!(quote.discount_minor, 2_500);
    }

    #[tokio::test]
    async fn second_use_by_same_account_conflicts() {
        let mut discount_repo = MockDiscountCodeRepository::new();
        discount_repo
            .expect_find_by_code()
            .returning(|_| Ok(Some(promo(Uuid::new_v4()))));
        discount_repo
            .expect_has_user_redeemed()
            .returning(|_, _| Ok(true));

        let err = usecase(discount_repo, MockProfileRepository::new())
            .validate(Uuid::new_v4(), "PROMO10", 25_000, Utc::now())
            .await
            .unwrap_err();

        assert!(matches!(err, CouponError::Rejected(DiscountRejection::AlreadyUsed)));
        assert_eq!(err.status_code(), axum::http::StatusCode::CONFLICT);
    }

    #[tokio::test]
    async fn unknown_code_is_not_found() {
        let mut discount_repo = MockDiscountCodeRepository::new();
        discount_repo.expect_find_by_code().returning(|_| Ok(None));

        let err = usecase(discount_repo, MockProfileRepository::new())
            .validate(Uuid::new_v4(), "NOPE", 1_000, Utc::now())
            .await
            .unwrap_err();

        assert_eq!(err.status_code(), axum::http::StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn birthday_uses_business_date() {
        let user_id = Uuid::new_v4();
        let mut profile_repo = MockProfileRepository::new();
        profile_repo
            .expect_find_by_user_id()
            .with(eq(user_id))
            .returning(move |_| {
                Ok(Some(ProfileEntity {
                    user_id,
                    full_name: Some("Ana".to_string()),
                    phone: None,
                    birth_date: NaiveDate::from_ymd_opt(1990, 10, 19),
                    birthday_discount_year: Some(2025),
                }))
            });

        // 2026-10-20 01:00Z is still the 19th at UTC-3.
        let now = Utc.with_ymd_and_hms(2026, 10, 20, 1, 0, 0).unwrap();
        let discount = usecase(MockDiscountCodeRepository::new(), profile_repo)
            .birthday_discount(user_id, now)
            .await
            .unwrap();

        assert_eq!(
            discount,
            Some(BirthdayDiscount {
                percent: 15,
                year: 2026
            })
        );
    }

    #[tokio::test]
    async fn birthday_already_used_this_year() {
        let user_id = Uuid::new_v4();
        let mut profile_repo = MockProfileRepository::new();
        profile_repo.expect_find_by_user_id().returning(move |_| {
            Ok(Some(ProfileEntity {
                user_id,
                full_name: None,
                phone: None,
                birth_date: NaiveDate::from_ymd_opt(1990, 10, 19),
                birthday_discount_year: Some(2026),
            }))
        });

        let now = Utc.with_ymd_and_hms(2026, 10, 19, 15, 0, 0).unwrap();
        let status = usecase(MockDiscountCodeRepository::new(), profile_repo)
            .birthday_status(user_id, now)
            .await
            .unwrap();

        assert!(!status.eligible);
        assert_eq!(status.percent, 15);
    }
}
