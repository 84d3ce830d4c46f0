use crate::{
    auth::AuthUser,
    axum_http::{error_responses::AppError, extractors::ApiJson},
    usecases::gift_cards::GiftCardUseCase,
};
use axum::{Json, Router, extract::State, response::IntoResponse, routing::post};
use crates::domain::{
    repositories::gift_cards::GiftCardRepository,
    value_objects::gift_cards::GiftCardCodeRequest,
};
use std::sync::Arc;

pub fn routes<G>(gift_card_usecase: Arc<GiftCardUseCase<G>>) -> Router
where
    G: GiftCardRepository + Send + Sync + 'static,
{
    Router::new()
        .route("/validate", post(validate))
        .route("/claim", post(claim))
        .with_state(gift_card_usecase)
}

pub async fn validate<G>(
    State(gift_card_usecase): State<Arc<GiftCardUseCase<G>>>,
    auth: AuthUser,
    ApiJson(request): ApiJson<GiftCardCodeRequest>,
) -> Result<impl IntoResponse, AppError>
where
    G: GiftCardRepository + Send + Sync,
{
    let status = gift_card_usecase
        .validate(auth.user_id, &request.code)
        .await?;
    Ok(Json(status))
}

pub async fn claim<G>(
    State(gift_card_usecase): State<Arc<GiftCardUseCase<G>>>,
    auth: AuthUser,
    ApiJson(request): ApiJson<GiftCardCodeRequest>,
) -> Result<impl IntoResponse, AppError>
where
    G: GiftCardRepository + Send + Sync,
{
    let status = gift_card_usecase.claim(auth.user_id, &request.code).await?;
    Ok(Json(status))
}
