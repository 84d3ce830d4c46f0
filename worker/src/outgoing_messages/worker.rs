use anyhow::Result;
use crates::domain::{
    entities::outgoing_messages::OutgoingMessageEntity,
    repositories::{
        messaging::MessagingGateway, outgoing_messages::OutgoingMessageRepository,
        whatsapp_messages::WhatsappMessageRepository,
    },
};
use std::sync::Arc;
use tokio::{sync::Semaphore, task::JoinSet};
use tracing::{debug, error, info};

use crate::{
    config::config_model::OutgoingWorker,
    usecases::deliver_outgoing_message::{DeliverOutgoingMessageUseCase, describe},
};

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct BatchReport {
    pub processed: usize,
    pub errors: usize,
}

pub async fn run<Q, W, M>(
    usecase: Arc<DeliverOutgoingMessageUseCase<Q, W, M>>,
    settings: OutgoingWorker,
) -> Result<()>
where
    Q: OutgoingMessageRepository + Send + Sync + 'static,
    W: WhatsappMessageRepository + Send + Sync + 'static,
    M: MessagingGateway + Send + Sync + 'static,
{
    info!(
        worker_id = %settings.worker_id,
        batch_size = settings.batch_size,
        concurrency = settings.concurrency,
        max_attempts = settings.retry_policy.max_attempts,
        "outgoing: starting worker loop"
    );

    loop {
        match usecase
            .claim_batch(
                settings.batch_size,
                &settings.worker_id,
                settings.lock_timeout,
            )
            .await
        {
            Ok(batch) if batch.is_empty() => {
                tokio::time::sleep(settings.poll_interval).await;
            }
            Ok(batch) => {
                let claimed = batch.len();
                let report = process_batch(Arc::clone(&usecase), batch, settings.concurrency).await;
                info!(
                    claimed,
                    processed = report.processed,
                    errors = report.errors,
                    "outgoing: batch finished"
                );
            }
            Err(e) => {
                error!(error = %e, "outgoing: error claiming batch");
                tokio::time::sleep(settings.poll_interval).await;
            }
        }
    }
}

/// Delivers a claimed batch with at most `concurrency` sends in flight.
/// A failing message never stops the others.
pub async fn process_batch<Q, W, M>(
    usecase: Arc<DeliverOutgoingMessageUseCase<Q, W, M>>,
    batch: Vec<OutgoingMessageEntity>,
    concurrency: usize,
) -> BatchReport
where
    Q: OutgoingMessageRepository + Send + Sync + 'static,
    W: WhatsappMessageRepository + Send + Sync + 'static,
    M: MessagingGateway + Send + Sync + 'static,
{
    let semaphore = Arc::new(Semaphore::new(concurrency.max(1)));
    let mut tasks = JoinSet::new();

    for message in batch {
        let usecase = Arc::clone(&usecase);
        let semaphore = Arc::clone(&semaphore);
        tasks.spawn(async move {
            let _permit = semaphore.acquire_owned().await?;
            let message_id = message.id;
            let outcome = usecase.deliver(message).await.map_err(|err| {
                error!(%message_id, error = %err, "outgoing: failed to record delivery outcome");
                err
            })?;
            debug!("outgoing: {}", describe(message_id, &outcome));
            anyhow::Ok(())
        });
    }

    let mut report = BatchReport::default();
    while let Some(joined) = tasks.join_next().await {
        report.processed += 1;
        match joined {
            Ok(Ok(())) => {}
            Ok(Err(_)) => report.errors += 1,
            Err(join_err) => {
                error!(error = %join_err, "outgoing: delivery task panicked");
                report.errors += 1;
            }
        }
    }
    report
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use crates::domain::{
        repositories::{
            messaging::MockMessagingGateway, outgoing_messages::MockOutgoingMessageRepository,
            whatsapp_messages::MockWhatsappMessageRepository,
        },
        value_objects::outgoing_messages::RetryPolicy,
    };
    use serde_json::json;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use uuid::Uuid;

    fn message(body: &str) -> OutgoingMessageEntity {
        let now = Utc::now();
        OutgoingMessageEntity {
            id: Uuid::new_v4(),
            phone: "5491155550000".to_string(),
            channel: "whatsapp_text".to_string(),
            payload: json!({ "body": body }),
            status: "pending".to_string(),
            attempts: 0,
            last_error: None,
            next_attempt_at: now,
            locked_at: Some(now),
            locked_by: Some("worker-test".to_string()),
            provider_message_id: None,
            created_at: now,
            updated_at: now,
        }
    }

    #[tokio::test]
    async fn one_failure_does_not_stop_the_batch() {
        let mut gateway = MockMessagingGateway::new();
        gateway.expect_send_text().times(3).returning(|_, body| {
            if body == "boom" {
                Err(anyhow::anyhow!("provider error"))
            } else {
                Ok(format!("wamid.{body}"))
            }
        });

        let mut outgoing = MockOutgoingMessageRepository::new();
        outgoing.expect_mark_sent().times(2).returning(|_, _| Ok(()));
        outgoing
            .expect_mark_failed()
            .times(1)
            .returning(|_, _, _| Ok(()));

        let mut chats = MockWhatsappMessageRepository::new();
        chats.expect_upsert_message().returning(|_| Ok(()));

        let usecase = Arc::new(DeliverOutgoingMessageUseCase::new(
            Arc::new(outgoing),
            Arc::new(chats),
            Arc::new(gateway),
            RetryPolicy::default(),
        ));

        let report = process_batch(
            usecase,
            vec![message("a"), message("boom"), message("c")],
            2,
        )
        .await;
        assert_eq!(report, BatchReport { processed: 3, errors: 0 });
    }

    #[tokio::test]
    async fn bookkeeping_errors_are_counted() {
        let mut gateway = MockMessagingGateway::new();
        gateway
            .expect_send_text()
            .returning(|_, _| Ok("wamid.1".to_string()));

        let calls = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&calls);
        let mut outgoing = MockOutgoingMessageRepository::new();
        outgoing.expect_mark_sent().returning(move |_, _| {
            if counter.fetch_add(1, Ordering::SeqCst) == 0 {
                Err(anyhow::anyhow!("connection reset"))
            } else {
                Ok(())
            }
        });

        let mut chats = MockWhatsappMessageRepository::new();
        chats.expect_upsert_message().returning(|_| Ok(()));

        let usecase = Arc::new(DeliverOutgoingMessageUseCase::new(
            Arc::new(outgoing),
            Arc::new(chats),
            Arc::new(gateway),
            RetryPolicy::default(),
        ));

        let report = process_batch(usecase, vec![message("a"), message("b")], 1).await;
        assert_eq!(report, BatchReport { processed: 2, errors: 1 });
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }
}
