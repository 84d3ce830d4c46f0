use crates::domain::{
    repositories::messaging::MessagingGateway,
    value_objects::{
        order_notifications::OrderNotification, outgoing_messages::TemplatePayload,
        phone_numbers::normalize_phone,
    },
};
use std::sync::Arc;
use tokio::task::JoinHandle;
use tracing::{error, info, warn};

#[derive(Debug, Clone)]
pub struct NotificationSettings {
    /// Approved template name. Plain text is sent when unset.
    pub order_template: Option<String>,
    pub template_language: String,
    pub staff_phone: Option<String>,
    pub restaurant_phone: Option<String>,
    pub default_country_code: String,
}

/// Sends the order summary to the customer, staff and the restaurant line.
/// Each recipient gets one independent attempt; nothing is retried.
pub struct OrderNotifier<M>
where
    M: MessagingGateway + Send + Sync + 'static,
{
    messaging_gateway: Arc<M>,
    settings: NotificationSettings,
}

impl<M> OrderNotifier<M>
where
    M: MessagingGateway + Send + Sync + 'static,
{
    pub fn new(messaging_gateway: Arc<M>, settings: NotificationSettings) -> Self {
        Self {
            messaging_gateway,
            settings,
        }
    }

    pub fn recipients(&self, notification: &OrderNotification) -> Vec<String> {
        let candidates = [
            Some(notification.customer_phone.as_str()),
            self.settings.staff_phone.as_deref(),
            self.settings.restaurant_phone.as_deref(),
        ];

        let mut recipients: Vec<String> = Vec::with_capacity(candidates.len());
        for raw in candidates.into_iter().flatten() {
            match normalize_phone(raw, &self.settings.default_country_code) {
                Some(phone) if !recipients.contains(&phone) => recipients.push(phone),
                Some(_) => {}
                None => warn!(
                    order_id = %notification.order_id,
                    "notifications: skipping unusable phone number"
                ),
            }
        }
        recipients
    }

    /// Returns immediately; callers may drop the handles.
    pub fn dispatch(&self, notification: OrderNotification) -> Vec<JoinHandle<()>> {
        let notification = Arc::new(notification);
        self.recipients(&notification)
            .into_iter()
            .map(|phone| {
                let gateway = Arc::clone(&self.messaging_gateway);
                let settings = self.settings.clone();
                let notification = Arc::clone(&notification);
                tokio::spawn(async move {
                    deliver(gateway.as_ref(), &settings, &phone, &notification).await;
                })
            })
            .collect()
    }
}

async fn deliver<M>(
    gateway: &M,
    settings: &NotificationSettings,
    phone: &str,
    notification: &OrderNotification,
) where
    M: MessagingGateway + Send + Sync,
{
    let order_id = notification.order_id;

    if let Some(template_name) = settings.order_template.as_deref() {
        let template = TemplatePayload {
            name: template_name.to_string(),
            language: settings.template_language.clone(),
            parameters: notification.template_parameters(),
            fallback_text: None,
        };
        match gateway.send_template(phone, &template).await {
            Ok(provider_message_id) => {
                info!(%order_id, %phone, %provider_message_id, "notifications: template delivered");
                return;
            }
            Err(err) => {
                warn!(%order_id, %phone, error = %err, "notifications: template failed, trying plain text");
            }
        }
    }

    match gateway.send_text(phone, &notification.text_body()).await {
        Ok(provider_message_id) => {
            info!(%order_id, %phone, %provider_message_id, "notifications: text delivered");
        }
        Err(err) => {
            error!(%order_id, %phone, error = %err, "notifications: delivery failed");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crates::domain::{
        repositories::messaging::MockMessagingGateway,
        value_objects::enums::{delivery_types::DeliveryType, payment_methods::PaymentMethod},
    };
    use uuid::Uuid;

    fn settings(template: Option<&str>) -> NotificationSettings {
        NotificationSettings {
            order_template: template.map(str::to_string),
            template_language: "es_AR".to_string(),
            staff_phone: Some("+54 9 11 4444-0000".to_string()),
            restaurant_phone: Some("5491133330000".to_string()),
            default_country_code: "54".to_string(),
        }
    }

    fn notification(customer_phone: &str) -> OrderNotification {
        OrderNotification {
            order_id: Uuid::new_v4(),
            customer_name: "Ana".to_string(),
            customer_phone: customer_phone.to_string(),
            delivery_type: DeliveryType::Retiro,
            address: None,
            eta_text: Some("20-30 min".to_string()),
            lines: vec![],
            total_minor: 1_000_000,
            payment_method: PaymentMethod::Cash,
            notes: None,
        }
    }

    async fn join_all(handles: Vec<JoinHandle<()>>) {
        for handle in handles {
            handle.await.unwrap();
        }
    }

    #[test]
    fn recipients_are_normalized_and_deduplicated() {
        let notifier = OrderNotifier::new(Arc::new(MockMessagingGateway::new()), settings(None));
        let recipients = notifier.recipients(&notification("5491133330000"));
        assert_eq!(recipients, vec!["5491133330000", "5491144440000"]);
    }

    #[tokio::test]
    async fn template_goes_to_all_three_numbers() {
        let mut gateway = MockMessagingGateway::new();
        gateway
            .expect_send_template()
            .withf(|phone, template| {
                ["5491155550000", "5491144440000", "5491133330000"].contains(&phone)
                    && template.name == "order_confirmation"
                    && template.parameters.len() == 6
            })
            .times(3)
            .returning(|_, _| Ok("wamid.1".to_string()));
        gateway.expect_send_text().never();

        let notifier = OrderNotifier::new(Arc::new(gateway), settings(Some("order_confirmation")));
        join_all(notifier.dispatch(notification("011 15 5555 0000"))).await;
    }

    #[tokio::test]
    async fn template_failure_falls_back_to_text() {
        let mut gateway = MockMessagingGateway::new();
        gateway
            .expect_send_template()
            .times(3)
            .returning(|_, _| Err(anyhow::anyhow!("template not approved")));
        gateway
            .expect_send_text()
            .times(3)
            .returning(|_, _| Ok("wamid.2".to_string()));

        let notifier = OrderNotifier::new(Arc::new(gateway), settings(Some("order_confirmation")));
        join_all(notifier.dispatch(notification("5491155550000"))).await;
    }

    #[tokio::test]
    async fn one_failing_recipient_does_not_block_others() {
        let mut gateway = MockMessagingGateway::new();
        gateway
            .expect_send_text()
            .withf(|phone, _| phone == "5491155550000")
            .times(1)
            .returning(|_, _| Err(anyhow::anyhow!("recipient not on whatsapp")));
        gateway
            .expect_send_text()
            .times(2)
            .returning(|_, _| Ok("wamid.3".to_string()));

        let notifier = OrderNotifier::new(Arc::new(gateway), settings(None));
        join_all(notifier.dispatch(notification("5491155550000"))).await;
    }
}
