use anyhow::Result;
use chrono::Utc;
use crates::domain::{
    entities::{
        outgoing_messages::OutgoingMessageEntity, whatsapp_messages::UpsertWhatsappMessageEntity,
    },
    repositories::{
        messaging::MessagingGateway, outgoing_messages::OutgoingMessageRepository,
        whatsapp_messages::WhatsappMessageRepository,
    },
    value_objects::{
        enums::message_directions::MessageDirection,
        outgoing_messages::{OutgoingPayload, RetryDecision, RetryPolicy},
    },
};
use std::sync::Arc;
use tracing::{error, info, warn};
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq)]
pub enum DeliveryOutcome {
    Sent { provider_message_id: String },
    Failed(RetryDecision),
}

/// What actually went over the wire, kept for the chat mirror.
struct SentMessage {
    provider_message_id: String,
    body: String,
}

pub struct DeliverOutgoingMessageUseCase<Q, W, M>
where
    Q: OutgoingMessageRepository + Send + Sync + 'static,
    W: WhatsappMessageRepository + Send + Sync + 'static,
    M: MessagingGateway + Send + Sync + 'static,
{
    outgoing_message_repository: Arc<Q>,
    whatsapp_message_repository: Arc<W>,
    messaging_gateway: Arc<M>,
    retry_policy: RetryPolicy,
}

impl<Q, W, M> DeliverOutgoingMessageUseCase<Q, W, M>
where
    Q: OutgoingMessageRepository + Send + Sync + 'static,
    W: WhatsappMessageRepository + Send + Sync + 'static,
    M: MessagingGateway + Send + Sync + 'static,
{
    pub fn new(
        outgoing_message_repository: Arc<Q>,
        whatsapp_message_repository: Arc<W>,
        messaging_gateway: Arc<M>,
        retry_policy: RetryPolicy,
    ) -> Self {
        Self {
            outgoing_message_repository,
            whatsapp_message_repository,
            messaging_gateway,
            retry_policy,
        }
    }

    pub async fn claim_batch(
        &self,
        limit: i64,
        worker_id: &str,
        lock_timeout: chrono::Duration,
    ) -> Result<Vec<OutgoingMessageEntity>> {
        self.outgoing_message_repository
            .claim_batch(limit, worker_id, lock_timeout)
            .await
    }

    /// One attempt for one claimed row. The returned error only covers
    /// bookkeeping; send failures are recorded on the row.
    pub async fn deliver(&self, message: OutgoingMessageEntity) -> Result<DeliveryOutcome> {
        let payload = match OutgoingPayload::decode(&message.channel, &message.payload) {
            Ok(payload) => payload,
            Err(err) => {
                // Retrying cannot fix a payload that does not decode.
                let decision = RetryDecision::Dead {
                    attempts: message.attempts.saturating_add(1),
                };
                error!(
                    message_id = %message.id,
                    channel = %message.channel,
                    error = %err,
                    "outgoing: undecodable payload, marking dead"
                );
                self.outgoing_message_repository
                    .mark_failed(message.id, &format!("{err:#}"), decision)
                    .await?;
                return Ok(DeliveryOutcome::Failed(decision));
            }
        };

        match self.send(&message.phone, &payload).await {
            Ok(sent) => {
                self.outgoing_message_repository
                    .mark_sent(message.id, Some(sent.provider_message_id.clone()))
                    .await?;
                info!(
                    message_id = %message.id,
                    provider_message_id = %sent.provider_message_id,
                    attempts = message.attempts + 1,
                    "outgoing: message sent"
                );
                self.mirror(&message, &payload, &sent).await;
                Ok(DeliveryOutcome::Sent {
                    provider_message_id: sent.provider_message_id,
                })
            }
            Err(err) => {
                let decision = self.retry_policy.decide(message.attempts);
                match decision {
                    RetryDecision::Retry { attempts, delay } => warn!(
                        message_id = %message.id,
                        attempts,
                        delay_secs = delay.num_seconds(),
                        error = %err,
                        "outgoing: send failed, will retry"
                    ),
                    RetryDecision::Dead { attempts } => error!(
                        message_id = %message.id,
                        attempts,
                        error = %err,
                        "outgoing: send failed, giving up"
                    ),
                }
                self.outgoing_message_repository
                    .mark_failed(message.id, &format!("{err:#}"), decision)
                    .await?;
                Ok(DeliveryOutcome::Failed(decision))
            }
        }
    }

    async fn send(&self, phone: &str, payload: &OutgoingPayload) -> Result<SentMessage> {
        match payload {
            OutgoingPayload::Text(text) => {
                let provider_message_id =
                    self.messaging_gateway.send_text(phone, &text.body).await?;
                Ok(SentMessage {
                    provider_message_id,
                    body: text.body.clone(),
                })
            }
            OutgoingPayload::Template(template) => {
                let err = match self.messaging_gateway.send_template(phone, template).await {
                    Ok(provider_message_id) => {
                        return Ok(SentMessage {
                            provider_message_id,
                            body: format!("[{}] {}", template.name, template.parameters.join(" | ")),
                        });
                    }
                    Err(err) => err,
                };

                let Some(fallback_text) = template.fallback_text.as_deref() else {
                    return Err(err);
                };
                warn!(template = %template.name, error = %err, "outgoing: template failed, sending fallback text");
                let provider_message_id = self.messaging_gateway.send_text(phone, fallback_text).await?;
                Ok(SentMessage {
                    provider_message_id,
                    body: fallback_text.to_string(),
                })
            }
        }
    }

    /// Shows worker sends in the admin chat view. Never fails the delivery.
    async fn mirror(&self, message: &OutgoingMessageEntity, payload: &OutgoingPayload, sent: &SentMessage) {
        let now = Utc::now();
        let raw = payload.to_json().unwrap_or_else(|_| message.payload.clone());
        let entity = UpsertWhatsappMessageEntity {
            provider_message_id: sent.provider_message_id.clone(),
            direction: MessageDirection::Outbound.to_string(),
            phone: message.phone.clone(),
            body: Some(sent.body.clone()),
            status: Some("sent".to_string()),
            raw,
            provider_timestamp: None,
            created_at: now,
            updated_at: now,
        };

        if let Err(err) = self.whatsapp_message_repository.upsert_message(entity).await {
            warn!(message_id = %message.id, error = %err, "outgoing: failed to mirror sent message");
        }
    }
}

pub fn describe(message_id: Uuid, outcome: &DeliveryOutcome) -> String {
    match outcome {
        DeliveryOutcome::Sent {
            provider_message_id,
        } => format!("{message_id} sent as {provider_message_id}"),
        DeliveryOutcome::Failed(RetryDecision::Retry { attempts, .. }) => {
            format!("{message_id} failed, attempt {attempts}, retrying")
        }
        DeliveryOutcome::Failed(RetryDecision::Dead { attempts }) => {
            format!("{message_id} dead after {attempts} attempts")
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use crates::domain::repositories::{
        messaging::MockMessagingGateway, outgoing_messages::MockOutgoingMessageRepository,
        whatsapp_messages::MockWhatsappMessageRepository,
    };
    use mockall::predicate::eq;
    use serde_json::json;

    fn message(channel: &str, payload: serde_json::Value, attempts: i32) -> OutgoingMessageEntity {
        let now = Utc::now();
        OutgoingMessageEntity {
            id: Uuid::new_v4(),
            phone: "5491155550000".to_string(),
            channel: channel.to_string(),
            payload,
            status: "pending".to_string(),
            attempts,
            last_error: None,
            next_attempt_at: now,
            locked_at: Some(now),
            locked_by: Some("worker-test".to_string()),
            provider_message_id: None,
            created_at: now,
            updated_at: now,
        }
    }

    fn policy() -> RetryPolicy {
        RetryPolicy {
            max_attempts: 3,
            backoff_base: Duration::seconds(10),
            backoff_max: Duration::minutes(5),
        }
    }

    fn usecase(
        outgoing: MockOutgoingMessageRepository,
        chats: MockWhatsappMessageRepository,
        gateway: MockMessagingGateway,
    ) -> DeliverOutgoingMessageUseCase<
        MockOutgoingMessageRepository,
        MockWhatsappMessageRepository,
        MockMessagingGateway,
    > {
        DeliverOutgoingMessageUseCase::new(
            Arc::new(outgoing),
            Arc::new(chats),
            Arc::new(gateway),
            policy(),
        )
    }

    #[tokio::test]
    async fn text_is_sent_marked_and_mirrored() {
        let row = message("whatsapp_text", json!({ "body": "hola" }), 0);
        let row_id = row.id;

        let mut gateway = MockMessagingGateway::new();
        gateway
            .expect_send_text()
            .withf(|phone, body| phone == "5491155550000" && body == "hola")
            .times(1)
            .returning(|_, _| Ok("wamid.OK".to_string()));

        let mut outgoing = MockOutgoingMessageRepository::new();
        outgoing
            .expect_mark_sent()
            .with(eq(row_id), eq(Some("wamid.OK".to_string())))
            .times(1)
            .returning(|_, _| Ok(()));
        outgoing.expect_mark_failed().never();

        let mut chats = MockWhatsappMessageRepository::new();
        chats
            .expect_upsert_message()
            .withf(|entity| {
                entity.provider_message_id == "wamid.OK"
                    && entity.direction == "outbound"
                    && entity.body.as_deref() == Some("hola")
            })
            .times(1)
            .returning(|_| Ok(()));

        let outcome = usecase(outgoing, chats, gateway).deliver(row).await.unwrap();
        assert_eq!(
            outcome,
            DeliveryOutcome::Sent {
                provider_message_id: "wamid.OK".to_string()
            }
        );
    }

    #[tokio::test]
    async fn failure_schedules_retry_with_backoff() {
        let row = message("whatsapp_text", json!({ "body": "hola" }), 1);

        let mut gateway = MockMessagingGateway::new();
        gateway
            .expect_send_text()
            .returning(|_, _| Err(anyhow::anyhow!("rate limited")));

        let mut outgoing = MockOutgoingMessageRepository::new();
        outgoing
            .expect_mark_failed()
            .withf(|_, error, decision| {
                error.contains("rate limited")
                    && *decision
                        == RetryDecision::Retry {
                            attempts: 2,
                            delay: Duration::seconds(20),
                        }
            })
            .times(1)
            .returning(|_, _, _| Ok(()));
        outgoing.expect_mark_sent().never();

        let mut chats = MockWhatsappMessageRepository::new();
        chats.expect_upsert_message().never();

        let outcome = usecase(outgoing, chats, gateway).deliver(row).await.unwrap();
        assert!(matches!(
            outcome,
            DeliveryOutcome::Failed(RetryDecision::Retry { attempts: 2, .. })
        ));
    }

    #[tokio::test]
    async fn last_attempt_marks_dead() {
        let row = message("whatsapp_text", json!({ "body": "hola" }), 2);

        let mut gateway = MockMessagingGateway::new();
        gateway
            .expect_send_text()
            .returning(|_, _| Err(anyhow::anyhow!("recipient unreachable")));

        let mut outgoing = MockOutgoingMessageRepository::new();
        outgoing
            .expect_mark_failed()
            .withf(|_, _, decision| *decision == RetryDecision::Dead { attempts: 3 })
            .times(1)
            .returning(|_, _, _| Ok(()));

        let outcome = usecase(outgoing, MockWhatsappMessageRepository::new(), gateway)
            .deliver(row)
            .await
            .unwrap();
        assert_eq!(outcome, DeliveryOutcome::Failed(RetryDecision::Dead { attempts: 3 }));
    }

    #[tokio::test]
    async fn rejected_template_falls_back_to_text() {
        let row = message(
            "whatsapp_template",
            json!({
                "name": "order_confirmation",
                "language": "es_AR",
                "parameters": ["Ana", "3F2A9C1E"],
                "fallback_text": "Recibimos tu pedido"
            }),
            0,
        );

        let mut gateway = MockMessagingGateway::new();
        gateway
            .expect_send_template()
            .times(1)
            .returning(|_, _| Err(anyhow::anyhow!("template paused")));
        gateway
            .expect_send_text()
            .withf(|_, body| body == "Recibimos tu pedido")
            .times(1)
            .returning(|_, _| Ok("wamid.FALLBACK".to_string()));

        let mut outgoing = MockOutgoingMessageRepository::new();
        outgoing.expect_mark_sent().times(1).returning(|_, _| Ok(()));

        let mut chats = MockWhatsappMessageRepository::new();
        chats
            .expect_upsert_message()
            .returning(|_| Err(anyhow::anyhow!("mirror table locked")));

        let outcome = usecase(outgoing, chats, gateway).deliver(row).await.unwrap();
        assert_eq!(
            outcome,
            DeliveryOutcome::Sent {
                provider_message_id: "wamid.FALLBACK".to_string()
            }
        );
    }

    #[tokio::test]
    async fn undecodable_payload_is_dead_immediately() {
        let row = message("whatsapp_text", json!({ "text": 42 }), 0);

        let mut gateway = MockMessagingGateway::new();
        gateway.expect_send_text().never();

        let mut outgoing = MockOutgoingMessageRepository::new();
        outgoing
            .expect_mark_failed()
            .withf(|_, _, decision| *decision == RetryDecision::Dead { attempts: 1 })
            .times(1)
            .returning(|_, _, _| Ok(()));

        let outcome = usecase(outgoing, MockWhatsappMessageRepository::new(), gateway)
            .deliver(row)
            .await
            .unwrap();
        assert_eq!(outcome, DeliveryOutcome::Failed(RetryDecision::Dead { attempts: 1 }));
    }

    #[tokio::test]
    async fn bookkeeping_failure_surfaces_as_error() {
        let row = message("whatsapp_text", json!({ "body": "hola" }), 0);

        let mut gateway = MockMessagingGateway::new();
        gateway
            .expect_send_text()
            .returning(|_, _| Ok("wamid.OK".to_string()));

        let mut outgoing = MockOutgoingMessageRepository::new();
        outgoing
            .expect_mark_sent()
            .returning(|_, _| Err(anyhow::anyhow!("pool timed out")));

        let result = usecase(outgoing, MockWhatsappMessageRepository::new(), gateway)
            .deliver(row)
            .await;
        assert!(result.is_err());
    }

    #[test]
    fn outcomes_describe_themselves() {
        let id = Uuid::nil();
        assert!(describe(id, &DeliveryOutcome::Failed(RetryDecision::Dead { attempts: 5 }))
            .ends_with("dead after 5 attempts"));
    }
}
