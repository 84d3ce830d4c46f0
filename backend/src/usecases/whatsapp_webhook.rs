use chrono::{DateTime, Utc};
use crates::{
    domain::{
        repositories::whatsapp_messages::WhatsappMessageRepository,
        value_objects::whatsapp_webhook::{WebhookEvent, WebhookPayload, WebhookVerifyQuery},
    },
    infra::whatsapp::webhook_signature::verify_signature,
};
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, info, warn};

#[derive(Debug, Error)]
pub enum WebhookError {
    #[error("verification token mismatch")]
    Forbidden,
    #[error("invalid webhook signature")]
    InvalidSignature,
    #[error("invalid webhook payload: {0}")]
    BadPayload(String),
    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

impl WebhookError {
    pub fn status_code(&self) -> axum::http::StatusCode {
        use axum::http::StatusCode;
        match self {
            WebhookError::Forbidden => StatusCode::FORBIDDEN,
            WebhookError::InvalidSignature => StatusCode::UNAUTHORIZED,
            WebhookError::BadPayload(_) => StatusCode::BAD_REQUEST,
            WebhookError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

pub type UseCaseResult<T> = std::result::Result<T, WebhookError>;

pub struct WhatsappWebhookUseCase<W>
where
    W: WhatsappMessageRepository + Send + Sync + 'static,
{
    whatsapp_message_repository: Arc<W>,
    verify_token: String,
    app_secret: Option<String>,
}

impl<W> WhatsappWebhookUseCase<W>
where
    W: WhatsappMessageRepository + Send + Sync + 'static,
{
    pub fn new(
        whatsapp_message_repository: Arc<W>,
        verify_token: String,
        app_secret: Option<String>,
    ) -> Self {
        Self {
            whatsapp_message_repository,
            verify_token,
            app_secret,
        }
    }

    /// Subscription handshake: echoes the challenge when mode and token match.
    pub fn verify_subscription(&self, query: WebhookVerifyQuery) -> UseCaseResult<String> {
        let token_matches = !self.verify_token.is_empty()
            && query.verify_token.as_deref() == Some(self.verify_token.as_str());
        if query.mode.as_deref() != Some("subscribe") || !token_matches {
            warn!("whatsapp_webhook: subscription verification rejected");
            return Err(WebhookError::Forbidden);
        }
        Ok(query.challenge.unwrap_or_default())
    }

    /// Stores every message and status in the delivery. Returns how many
    /// events were persisted; zero is a valid outcome.
    pub async fn handle_delivery(
        &self,
        body: &[u8],
        signature: Option<&str>,
        now: DateTime<Utc>,
    ) -> UseCaseResult<usize> {
        if let Some(app_secret) = self.app_secret.as_deref() {
            let signature = signature.ok_or(WebhookError::InvalidSignature)?;
            verify_signature(app_secret, body, signature).map_err(|err| {
                warn!(error = %err, "whatsapp_webhook: signature rejected");
                WebhookError::InvalidSignature
            })?;
        }

        let payload: WebhookPayload = serde_json::from_slice(body)
            .map_err(|err| WebhookError::BadPayload(err.to_string()))?;

        let events = payload.events();
        for event in &events {
            match event {
                WebhookEvent::Message(message) => {
                    self.whatsapp_message_repository
                        .upsert_message(message.to_entity(now))
                        .await?;
                    debug!(
                        provider_message_id = %message.provider_message_id,
                        "whatsapp_webhook: inbound message stored"
                    );
                }
                WebhookEvent::Status(status) => {
                    self.whatsapp_message_repository
                        .upsert_status(status.clone())
                        .await?;
                    debug!(
                        provider_message_id = %status.provider_message_id,
                        status = %status.status,
                        "whatsapp_webhook: status stored"
                    );
                }
            }
        }

        info!(events = events.len(), "whatsapp_webhook: delivery processed");
        Ok(events.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crates::{
        domain::repositories::whatsapp_messages::MockWhatsappMessageRepository,
        infra::whatsapp::webhook_signature::sign,
    };
    use serde_json::json;

    const SECRET: &str = "app-secret";

    fn delivery() -> Vec<u8> {
        serde_json::to_vec(&json!({
            "object": "whatsapp_business_account",
            "entry": [{
                "id": "1",
                "changes": [{
                    "field": "messages",
                    "value": {
                        "messages": [
                            { "id": "wamid.IN", "from": "5491155550000", "timestamp": "1760650200", "type": "text", "text": { "body": "hola" } }
                        ],
                        "statuses": [
                            { "id": "wamid.OUT", "status": "read", "recipient_id": "5491155550000" }
                        ]
                    }
                }]
            }]
        }))
        .unwrap()
    }

    fn usecase(
        repo: MockWhatsappMessageRepository,
        app_secret: Option<&str>,
    ) -> WhatsappWebhookUseCase<MockWhatsappMessageRepository> {
        WhatsappWebhookUseCase::new(
            Arc::new(repo),
            "verify-me".to_string(),
            app_secret.map(str::to_string),
        )
    }

    fn query(mode: &str, token: &str) -> WebhookVerifyQuery {
        WebhookVerifyQuery {
            mode: Some(mode.to_string()),
            verify_token: Some(token.to_string()),
            challenge: Some("1158201444".to_string()),
        }
    }

    #[test]
    fn handshake_echoes_challenge() {
        let usecase = usecase(MockWhatsappMessageRepository::new(), None);
        assert_eq!(
            usecase.verify_subscription(query("subscribe", "verify-me")).unwrap(),
            "1158201444"
        );
        assert!(matches!(
            usecase.verify_subscription(query("subscribe", "wrong")),
            Err(WebhookError::Forbidden)
        ));
        assert!(matches!(
            usecase.verify_subscription(query("unsubscribe", "verify-me")),
            Err(WebhookError::Forbidden)
        ));
    }

    #[tokio::test]
    async fn signed_delivery_upserts_messages_and_statuses() {
        let mut repo = MockWhatsappMessageRepository::new();
        repo.expect_upsert_message()
            .withf(|entity| {
                entity.provider_message_id == "wamid.IN"
                    && entity.direction == "inbound"
                    && entity.body.as_deref() == Some("hola")
            })
            .times(1)
            .returning(|_| Ok(()));
        repo.expect_upsert_status()
            .withf(|record| record.provider_message_id == "wamid.OUT" && record.status == "read")
            .times(1)
            .returning(|_| Ok(()));

        let body = delivery();
        let signature = sign(SECRET, &body).unwrap();
        let stored = usecase(repo, Some(SECRET))
            .handle_delivery(&body, Some(&signature), Utc::now())
            .await
            .unwrap();
        assert_eq!(stored, 2);
    }

    #[tokio::test]
    async fn bad_signature_is_rejected_before_parsing() {
        let mut repo = MockWhatsappMessageRepository::new();
        repo.expect_upsert_message().never();
        repo.expect_upsert_status().never();

        let body = delivery();
        let usecase = usecase(repo, Some(SECRET));

        let forged = sign("someone-else", &body).unwrap();
        let err = usecase
            .handle_delivery(&body, Some(&forged), Utc::now())
            .await
            .unwrap_err();
        assert_eq!(err.status_code(), axum::http::StatusCode::UNAUTHORIZED);

        let err = usecase
            .handle_delivery(&body, None, Utc::now())
            .await
            .unwrap_err();
        assert!(matches!(err, WebhookError::InvalidSignature));
    }

    #[tokio::test]
    async fn unsigned_deliveries_are_accepted_without_a_secret() {
        let mut repo = MockWhatsappMessageRepository::new();
        repo.expect_upsert_message().never();
        repo.expect_upsert_status().never();

        let stored = usecase(repo, None)
            .handle_delivery(br#"{"object":"whatsapp_business_account","entry":[]}"#, None, Utc::now())
            .await
            .unwrap();
        assert_eq!(stored, 0);
    }

    #[tokio::test]
    async fn malformed_json_is_a_bad_request() {
        let err = usecase(MockWhatsappMessageRepository::new(), None)
            .handle_delivery(b"not json", None, Utc::now())
            .await
            .unwrap_err();
        assert_eq!(err.status_code(), axum::http::StatusCode::BAD_REQUEST);
    }
}
