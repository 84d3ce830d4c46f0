use anyhow::Result;
use async_trait::async_trait;
use mockall::automock;

use crate::domain::value_objects::outgoing_messages::TemplatePayload;

/// Outbound business messaging. Both calls return the provider message id.
#[automock]
#[async_trait]
pub trait MessagingGateway {
    async fn send_text(&self, phone: &str, body: &str) -> Result<String>;

    async fn send_template(&self, phone: &str, template: &TemplatePayload) -> Result<String>;
}
