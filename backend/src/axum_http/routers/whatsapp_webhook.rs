use crate::{
    axum_http::{error_responses::AppError, extractors::ApiQuery},
    usecases::whatsapp_webhook::WhatsappWebhookUseCase,
};
use axum::{
    Json, Router,
    extract::State,
    http::HeaderMap,
    response::IntoResponse,
    routing::get,
};
use bytes::Bytes;
use chrono::Utc;
use crates::{
    domain::{
        repositories::whatsapp_messages::WhatsappMessageRepository,
        value_objects::whatsapp_webhook::WebhookVerifyQuery,
    },
    infra::whatsapp::webhook_signature::SIGNATURE_HEADER,
};
use serde_json::json;
use std::sync::Arc;

pub fn routes<W>(webhook_usecase: Arc<WhatsappWebhookUseCase<W>>) -> Router
where
    W: WhatsappMessageRepository + Send + Sync + 'static,
{
    Router::new()
        .route("/", get(verify).post(receive))
        .with_state(webhook_usecase)
}

pub async fn verify<W>(
    State(webhook_usecase): State<Arc<WhatsappWebhookUseCase<W>>>,
    ApiQuery(query): ApiQuery<WebhookVerifyQuery>,
) -> Result<impl IntoResponse, AppError>
where
    W: WhatsappMessageRepository + Send + Sync,
{
    Ok(webhook_usecase.verify_subscription(query)?)
}

/// Takes the raw body: the signature covers the exact bytes received.
pub async fn receive<W>(
    State(webhook_usecase): State<Arc<WhatsappWebhookUseCase<W>>>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<impl IntoResponse, AppError>
where
    W: WhatsappMessageRepository + Send + Sync,
{
    let signature = headers
        .get(SIGNATURE_HEADER)
        .and_then(|value| value.to_str().ok());

    let stored = webhook_usecase
        .handle_delivery(&body, signature, Utc::now())
        .await?;
    Ok(Json(json!({ "received": stored })))
}
