use anyhow::{Context, Result};
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::{
    entities::outgoing_messages::{InsertOutgoingMessageEntity, OutgoingMessageEntity},
    value_objects::enums::{
        message_channels::MessageChannel, outgoing_message_statuses::OutgoingMessageStatus,
    },
};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TextPayload {
    pub body: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TemplatePayload {
    pub name: String,
    pub language: String,
    pub parameters: Vec<String>,
    /// Sent as plain text when the template is rejected.
    pub fallback_text: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum OutgoingPayload {
    Text(TextPayload),
    Template(TemplatePayload),
}

impl OutgoingPayload {
    pub fn channel(&self) -> MessageChannel {
        match self {
            OutgoingPayload::Text(_) => MessageChannel::WhatsappText,
            OutgoingPayload::Template(_) => MessageChannel::WhatsappTemplate,
        }
    }

    pub fn to_json(&self) -> Result<serde_json::Value> {
        let value = match self {
            OutgoingPayload::Text(payload) => serde_json::to_value(payload)?,
            OutgoingPayload::Template(payload) => serde_json::to_value(payload)?,
        };
        Ok(value)
    }

    pub fn decode(channel: &str, payload: &serde_json::Value) -> Result<Self> {
        let channel = channel
            .parse::<MessageChannel>()
            .map_err(|err| anyhow::anyhow!(err))?;
        let decoded = match channel {
            MessageChannel::WhatsappText => OutgoingPayload::Text(
                serde_json::from_value(payload.clone()).context("invalid text payload")?,
            ),
            MessageChannel::WhatsappTemplate => OutgoingPayload::Template(
                serde_json::from_value(payload.clone()).context("invalid template payload")?,
            ),
        };
        Ok(decoded)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct EnqueueOutgoingMessageModel {
    pub phone: String,
    pub payload: OutgoingPayload,
}

impl EnqueueOutgoingMessageModel {
    pub fn to_entity(&self, now: DateTime<Utc>) -> Result<InsertOutgoingMessageEntity> {
        Ok(InsertOutgoingMessageEntity {
            phone: self.phone.clone(),
            channel: self.payload.channel().to_string(),
            payload: self.payload.to_json()?,
            status: OutgoingMessageStatus::Pending.to_string(),
            attempts: 0,
            next_attempt_at: now,
            created_at: now,
            updated_at: now,
        })
    }
}

/// What happens to a message after a failed send.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RetryDecision {
    Retry { attempts: i32, delay: Duration },
    Dead { attempts: i32 },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_attempts: i32,
    pub backoff_base: Duration,
    pub backoff_max: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 5,
            backoff_base: Duration::zero(),
            backoff_max: Duration::minutes(5),
        }
    }
}

impl RetryPolicy {
    /// `previous_attempts` is the counter stored on the row before this
    /// failure. The row dies exactly when the new count reaches the ceiling.
    pub fn decide(&self, previous_attempts: i32) -> RetryDecision {
        let attempts = previous_attempts.saturating_add(1);
        if attempts >= self.max_attempts {
            return RetryDecision::Dead { attempts };
        }
        RetryDecision::Retry {
            attempts,
            delay: self.delay_for(attempts),
        }
    }

    fn delay_for(&self, attempts: i32) -> Duration {
        if self.backoff_base <= Duration::zero() {
            return Duration::zero();
        }
        let exponent = (attempts - 1).clamp(0, 20) as u32;
        let factor = 2_i32.saturating_pow(exponent);
        self.backoff_base
            .checked_mul(factor)
            .map(|delay| delay.min(self.backoff_max))
            .unwrap_or(self.backoff_max)
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct OutgoingMessageDto {
    pub id: Uuid,
    pub phone: String,
    pub channel: String,
    pub status: String,
    pub attempts: i32,
    pub last_error: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<OutgoingMessageEntity> for OutgoingMessageDto {
    fn from(value: OutgoingMessageEntity) -> Self {
        Self {
            id: value.id,
            phone: value.phone,
            channel: value.channel,
            status: value.status,
            attempts: value.attempts,
            last_error: value.last_error,
            created_at: value.created_at,
            updated_at: value.updated_at,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct EnqueueTextMessageRequest {
    pub phone: String,
    pub body: String,
}

#[derive(Debug, Deserialize)]
pub struct ListOutgoingMessagesFilter {
    pub status: Option<String>,
    pub limit: Option<i64>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn attempts_strictly_increase_until_dead() {
        let policy = RetryPolicy {
            max_attempts: 5,
            ..RetryPolicy::default()
        };
        let mut attempts = 0;
        let mut seen = vec![attempts];
        loop {
            match policy.decide(attempts) {
                RetryDecision::Retry { attempts: next, delay } => {
                    assert!(next < policy.max_attempts);
                    assert_eq!(delay, Duration::zero());
                    attempts = next;
                    seen.push(attempts);
                }
                RetryDecision::Dead { attempts: next } => {
                    assert_eq!(next, policy.max_attempts);
                    seen.push(next);
                    break;
                }
            }
        }
        assert!(seen.windows(2).all(|pair| pair[1] == pair[0] + 1));
        assert_eq!(seen, vec![0, 1, 2, 3, 4, 5]);
    }

    #[test]
    fn ceiling_of_one_kills_on_first_failure() {
        let policy = RetryPolicy {
            max_attempts: 1,
            ..RetryPolicy::default()
        };
        assert_eq!(policy.decide(0), RetryDecision::Dead { attempts: 1 });
    }

    #[test]
    fn backoff_doubles_and_caps() {
        let policy = RetryPolicy {
            max_attempts: 10,
            backoff_base: Duration::seconds(10),
            backoff_max: Duration::seconds(60),
        };
        let delays: Vec<_> = (0..5)
            .map(|previous| match policy.decide(previous) {
                RetryDecision::Retry { delay, .. } => delay.num_seconds(),
                RetryDecision::Dead { .. } => panic!("unexpected dead"),
            })
            .collect();
        assert_eq!(delays, vec![10, 20, 40, 60, 60]);
    }

    #[test]
    fn payloads_decode_by_channel() {
        let text = OutgoingPayload::decode("whatsapp_text", &json!({ "body": "hola" })).unwrap();
        assert_eq!(
            text,
            OutgoingPayload::Text(TextPayload {
                body: "hola".to_string()
            })
        );

        let template = OutgoingPayload::decode(
            "whatsapp_template",
            &json!({ "name": "order", "language": "es_AR", "parameters": ["a"], "fallback_text": null }),
        )
        .unwrap();
        assert_eq!(template.channel(), MessageChannel::WhatsappTemplate);

        assert!(OutgoingPayload::decode("sms", &json!({})).is_err());
        assert!(OutgoingPayload::decode("whatsapp_text", &json!({ "text": 1 })).is_err());
    }
}
