use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::header::{AUTHORIZATION, CONTENT_TYPE};
use serde::Deserialize;
use serde_json::{Value, json};
use std::time::Duration;
use tracing::{error, info};

use crate::domain::{
    repositories::messaging::MessagingGateway,
    value_objects::{
        order_notifications::sanitize_template_param, outgoing_messages::TemplatePayload,
    },
};

pub const DEFAULT_API_BASE_URL: &str = "https://graph.facebook.com/v20.0";

#[derive(Debug, Clone)]
pub struct WhatsAppCloudConfig {
    pub api_base_url: String,
    pub phone_number_id: String,
    pub access_token: String,
}

/// Minimal WhatsApp Cloud API client built on reqwest.
pub struct WhatsAppCloudClient {
    http: reqwest::Client,
    config: WhatsAppCloudConfig,
}

#[derive(Debug, Deserialize)]
struct GraphErrorEnvelope {
    error: GraphErrorDetails,
}

#[derive(Debug, Deserialize)]
struct GraphErrorDetails {
    message: Option<String>,
    #[serde(rename = "type")]
    type_: Option<String>,
    code: Option<i64>,
    error_subcode: Option<i64>,
    fbtrace_id: Option<String>,
}

#[derive(Debug, Deserialize)]
struct SendMessageResponse {
    #[serde(default)]
    messages: Vec<SentMessage>,
}

#[derive(Debug, Deserialize)]
struct SentMessage {
    id: String,
}

pub(crate) fn text_message_body(phone: &str, body: &str) -> Value {
    json!({
        "messaging_product": "whatsapp",
        "recipient_type": "individual",
        "to": phone,
        "type": "text",
        "text": { "preview_url": false, "body": body },
    })
}

pub(crate) fn template_message_body(phone: &str, template: &TemplatePayload) -> Value {
    let parameters: Vec<Value> = template
        .parameters
        .iter()
        .map(|param| json!({ "type": "text", "text": sanitize_template_param(param) }))
        .collect();

    let mut components = Vec::new();
    if !parameters.is_empty() {
        components.push(json!({ "type": "body", "parameters": parameters }));
    }

    json!({
        "messaging_product": "whatsapp",
        "to": phone,
        "type": "template",
        "template": {
            "name": template.name,
            "language": { "code": template.language },
            "components": components,
        },
    })
}

fn first_message_id(body: &str) -> Result<String> {
    let parsed: SendMessageResponse =
        serde_json::from_str(body).context("unexpected WhatsApp send response")?;
    parsed
        .messages
        .into_iter()
        .next()
        .map(|message| message.id)
        .ok_or_else(|| anyhow::anyhow!("WhatsApp send response has no message id"))
}

impl WhatsAppCloudClient {
    pub fn new(config: WhatsAppCloudConfig) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(15))
            .build()?;
        Ok(Self { http, config })
    }

    fn messages_url(&self) -> String {
        format!(
            "{}/{}/messages",
            self.config.api_base_url.trim_end_matches('/'),
            self.config.phone_number_id
        )
    }

    async fn ensure_success(resp: reqwest::Response, context: &str) -> Result<reqwest::Response> {
        if resp.status().is_success() {
            return Ok(resp);
        }

        let status = resp.status();
        let body = match resp.text().await {
            Ok(text) if !text.is_empty() => text,
            Ok(_) => "<empty response body>".to_string(),
            Err(err) => format!("<failed to read response body: {err}>"),
        };

        let (error_type, error_code, error_subcode, error_message, fbtrace_id) =
            match serde_json::from_str::<GraphErrorEnvelope>(&body) {
                Ok(envelope) => {
                    let details = envelope.error;
                    (
                        details.type_,
                        details.code,
                        details.error_subcode,
                        details.message,
                        details.fbtrace_id,
                    )
                }
                Err(_) => (None, None, None, None, None),
            };

        error!(
            status = %status,
            whatsapp_error_type = ?error_type,
            whatsapp_error_code = ?error_code,
            whatsapp_error_subcode = ?error_subcode,
            whatsapp_error_message = ?error_message,
            fbtrace_id = ?fbtrace_id,
            response_body = %body,
            context = %context,
            "whatsapp api request failed"
        );

        anyhow::bail!(
            "WhatsApp API request failed: {} (status {}, code={:?}, message={:?})",
            context,
            status,
            error_code,
            error_message
        );
    }

    async fn post_message(&self, payload: &Value, context: &str) -> Result<String> {
        let resp = self
            .http
            .post(self.messages_url())
            .header(
                AUTHORIZATION,
                format!("Bearer {}", self.config.access_token),
            )
            .header(CONTENT_TYPE, "application/json")
            .json(payload)
            .send()
            .await?;
        let resp = Self::ensure_success(resp, context).await?;

        let body = resp.text().await?;
        first_message_id(&body)
    }
}

#[async_trait]
impl MessagingGateway for WhatsAppCloudClient {
    async fn send_text(&self, phone: &str, body: &str) -> Result<String> {
        let provider_message_id = self
            .post_message(&text_message_body(phone, body), "send text")
            .await?;
        info!(%phone, %provider_message_id, "whatsapp: text sent");
        Ok(provider_message_id)
    }

    async fn send_template(&self, phone: &str, template: &TemplatePayload) -> Result<String> {
        let provider_message_id = self
            .post_message(&template_message_body(phone, template), "send template")
            .await?;
        info!(%phone, template = %template.name, %provider_message_id, "whatsapp: template sent");
        Ok(provider_message_id)
    }
}
