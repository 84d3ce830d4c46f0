use chrono::{DateTime, Utc};
use crates::domain::{
    repositories::{
        orders::OrderRepository, outgoing_messages::OutgoingMessageRepository,
        whatsapp_messages::WhatsappMessageRepository,
    },
    value_objects::{
        chats::ChatMessageDto,
        enums::outgoing_message_statuses::OutgoingMessageStatus,
        finance::{FinanceQuery, FinanceSummaryDto, summarize},
        outgoing_messages::{
            EnqueueOutgoingMessageModel, EnqueueTextMessageRequest, ListOutgoingMessagesFilter,
            OutgoingMessageDto, OutgoingPayload, TextPayload,
        },
        phone_numbers::normalize_phone,
    },
};
use serde::Serialize;
use std::sync::Arc;
use thiserror::Error;
use tracing::info;
use uuid::Uuid;

const CHAT_LIST_LIMIT: i64 = 100;
const CHAT_HISTORY_LIMIT: i64 = 200;
const OUTGOING_DEFAULT_LIMIT: i64 = 50;
const OUTGOING_MAX_LIMIT: i64 = 500;

#[derive(Debug, Error)]
pub enum AdminError {
    #[error("phone number is invalid")]
    InvalidPhone,
    #[error("message body must not be empty")]
    EmptyBody,
    #[error("{0}")]
    InvalidStatus(String),
    #[error("`from` must not be after `to`")]
    InvalidRange,
    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

impl AdminError {
    pub fn status_code(&self) -> axum::http::StatusCode {
        use axum::http::StatusCode;
        match self {
            AdminError::InvalidPhone
            | AdminError::EmptyBody
            | AdminError::InvalidStatus(_)
            | AdminError::InvalidRange => StatusCode::BAD_REQUEST,
            AdminError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

pub type UseCaseResult<T> = std::result::Result<T, AdminError>;

#[derive(Debug, Clone, Serialize)]
pub struct EnqueuedMessageDto {
    pub id: Uuid,
    pub phone: String,
}

/// Back-office reads and the manual send queue. Catalog, hours and gift
/// card administration live on their own use cases.
pub struct AdminUseCase<O, W, Q>
where
    O: OrderRepository + Send + Sync + 'static,
    W: WhatsappMessageRepository + Send + Sync + 'static,
    Q: OutgoingMessageRepository + Send + Sync + 'static,
{
    order_repository: Arc<O>,
    whatsapp_message_repository: Arc<W>,
    outgoing_message_repository: Arc<Q>,
    default_country_code: String,
}

impl<O, W, Q> AdminUseCase<O, W, Q>
where
    O: OrderRepository + Send + Sync + 'static,
    W: WhatsappMessageRepository + Send + Sync + 'static,
    Q: OutgoingMessageRepository + Send + Sync + 'static,
{
    pub fn new(
        order_repository: Arc<O>,
        whatsapp_message_repository: Arc<W>,
        outgoing_message_repository: Arc<Q>,
        default_country_code: String,
    ) -> Self {
        Self {
            order_repository,
            whatsapp_message_repository,
            outgoing_message_repository,
            default_country_code,
        }
    }

    pub async fn finance(&self, query: FinanceQuery) -> UseCaseResult<FinanceSummaryDto> {
        if let (Some(from), Some(to)) = (query.from, query.to) {
            if from > to {
                return Err(AdminError::InvalidRange);
            }
        }

        let rows = self
            .order_repository
            .list_finance_rows(query.from, query.to)
            .await?;
        Ok(summarize(&rows, query.from, query.to))
    }

    pub async fn list_chats(&self) -> UseCaseResult<Vec<ChatMessageDto>> {
        let chats = self
            .whatsapp_message_repository
            .list_chats(CHAT_LIST_LIMIT)
            .await?;
        Ok(chats.into_iter().map(ChatMessageDto::from).collect())
    }

    /// Oldest first, so the thread reads top to bottom.
    pub async fn chat_messages(&self, phone: &str) -> UseCaseResult<Vec<ChatMessageDto>> {
        let phone =
            normalize_phone(phone, &self.default_country_code).ok_or(AdminError::InvalidPhone)?;
        let messages = self
            .whatsapp_message_repository
            .list_messages_for_phone(&phone, CHAT_HISTORY_LIMIT)
            .await?;
        Ok(messages.into_iter().map(ChatMessageDto::from).collect())
    }

    /// Queued rather than sent inline; the worker owns delivery and retries.
    pub async fn enqueue_text(
        &self,
        request: EnqueueTextMessageRequest,
        now: DateTime<Utc>,
    ) -> UseCaseResult<EnqueuedMessageDto> {
        let phone = normalize_phone(&request.phone, &self.default_country_code)
            .ok_or(AdminError::InvalidPhone)?;
        let body = request.body.trim();
        if body.is_empty() {
            return Err(AdminError::EmptyBody);
        }

        let model = EnqueueOutgoingMessageModel {
            phone: phone.clone(),
            payload: OutgoingPayload::Text(TextPayload {
                body: body.to_string(),
            }),
        };
        let id = self
            .outgoing_message_repository
            .enqueue(model.to_entity(now)?)
            .await?;

        info!(message_id = %id, %phone, "admin: outgoing message queued");
        Ok(EnqueuedMessageDto { id, phone })
    }

    pub async fn list_outgoing(
        &self,
        filter: ListOutgoingMessagesFilter,
    ) -> UseCaseResult<Vec<OutgoingMessageDto>> {
        let status = filter
            .status
            .as_deref()
            .map(str::parse::<OutgoingMessageStatus>)
            .transpose()
            .map_err(AdminError::InvalidStatus)?;
        let limit = filter
            .limit
            .unwrap_or(OUTGOING_DEFAULT_LIMIT)
            .clamp(1, OUTGOING_MAX_LIMIT);

        let messages = self
            .outgoing_message_repository
            .list(status.map(|status| status.to_string()), limit)
            .await?;
        Ok(messages.into_iter().map(OutgoingMessageDto::from).collect())
    }
}
