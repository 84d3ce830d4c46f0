use crate::{
    auth::AuthUser,
    axum_http::{error_responses::AppError, extractors::ApiJson},
    usecases::coupons::CouponUseCase,
};
use axum::{
    Json, Router,
    extract::State,
    response::IntoResponse,
    routing::{get, post},
};
use chrono::Utc;
use crates::domain::{
    repositories::{discount_codes::DiscountCodeRepository, profiles::ProfileRepository},
    value_objects::discount_codes::ValidateDiscountRequest,
};
use std::sync::Arc;

pub fn routes<D, P>(coupon_usecase: Arc<CouponUseCase<D, P>>) -> Router
where
    D: DiscountCodeRepository + Send + Sync + 'static,
    P: ProfileRepository + Send + Sync + 'static,
{
    Router::new()
        .route("/validate", post(validate))
        .route("/birthday", get(birthday))
        .with_state(coupon_usecase)
}

pub async fn validate<D, P>(
    State(coupon_usecase): State<Arc<CouponUseCase<D, P>>>,
    auth: AuthUser,
    ApiJson(request): ApiJson<ValidateDiscountRequest>,
) -> Result<impl IntoResponse, AppError>
where
    D: DiscountCodeRepository + Send + Sync,
    P: ProfileRepository + Send + Sync,
{
    let quote = coupon_usecase
        .validate(auth.user_id, &request.code, request.subtotal_minor, Utc::now())
        .await?;
    Ok(Json(quote))
}

pub async fn birthday<D, P>(
    State(coupon_usecase): State<Arc<CouponUseCase<D, P>>>,
    auth: AuthUser,
) -> Result<impl IntoResponse, AppError>
where
    D: DiscountCodeRepository + Send + Sync,
    P: ProfileRepository + Send + Sync,
{
    let status = coupon_usecase
        .birthday_status(auth.user_id, Utc::now())
        .await?;
    Ok(Json(status))
}
