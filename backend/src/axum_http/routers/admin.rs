use crate::{
    auth::AdminUser,
    axum_http::{
        error_responses::AppError,
        extractors::{ApiJson, ApiQuery},
    },
    usecases::{
        admin::AdminUseCase, estimates::EstimateUseCase, gift_cards::GiftCardUseCase,
        products::ProductCatalogUseCase,
    },
};
use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, patch, post},
};
use chrono::Utc;
use crates::{
    domain::value_objects::{
        finance::FinanceQuery,
        gift_cards::IssueGiftCardRequest,
        outgoing_messages::{EnqueueTextMessageRequest, ListOutgoingMessagesFilter},
        products::UpdateAvailabilityRequest,
        store_settings::HoursOverrideDto,
    },
    infra::db::repositories::{
        gift_cards::GiftCardPostgres, orders::OrderPostgres,
        outgoing_messages::OutgoingMessagePostgres, products::ProductPostgres,
        store_settings::StoreSettingsPostgres, whatsapp_messages::WhatsappMessagePostgres,
    },
};
use std::sync::Arc;
use tracing::info;
use uuid::Uuid;

pub type PostgresAdminUseCase =
    AdminUseCase<OrderPostgres, WhatsappMessagePostgres, OutgoingMessagePostgres>;

/// The back office drives several use cases; they share one state.
#[derive(Clone)]
pub struct AdminState {
    pub admin: Arc<PostgresAdminUseCase>,
    pub products: Arc<ProductCatalogUseCase<ProductPostgres>>,
    pub estimates: Arc<EstimateUseCase<StoreSettingsPostgres>>,
    pub gift_cards: Arc<GiftCardUseCase<GiftCardPostgres>>,
}

pub fn routes(state: AdminState) -> Router {
    Router::new()
        .route("/products/:product_id/availability", patch(set_availability))
        .route(
            "/business-hours/override",
            get(get_hours_override).put(set_hours_override),
        )
        .route("/finance", get(finance))
        .route("/chats", get(list_chats))
        .route("/chats/:phone", get(chat_messages))
        .route("/messages", post(enqueue_message))
        .route("/outgoing-messages", get(list_outgoing_messages))
        .route("/gift-cards", post(issue_gift_card))
        .with_state(state)
}

pub async fn set_availability(
    State(state): State<AdminState>,
    AdminUser(admin): AdminUser,
    Path(product_id): Path<Uuid>,
    ApiJson(request): ApiJson<UpdateAvailabilityRequest>,
) -> Result<impl IntoResponse, AppError> {
    state
        .products
        .set_availability(product_id, request.available)
        .await?;
    info!(
        admin_id = %admin.user_id,
        %product_id,
        available = request.available,
        "admin: product availability changed"
    );
    Ok(StatusCode::NO_CONTENT)
}

pub async fn get_hours_override(
    State(state): State<AdminState>,
    _admin: AdminUser,
) -> Result<impl IntoResponse, AppError> {
    let mode = state.estimates.hours_override().await?;
    Ok(Json(HoursOverrideDto { mode }))
}

pub async fn set_hours_override(
    State(state): State<AdminState>,
    AdminUser(admin): AdminUser,
    ApiJson(request): ApiJson<HoursOverrideDto>,
) -> Result<impl IntoResponse, AppError> {
    state.estimates.set_hours_override(request.mode).await?;
    info!(admin_id = %admin.user_id, mode = %request.mode, "admin: hours override set");
    Ok(Json(request))
}

pub async fn finance(
    State(state): State<AdminState>,
    _admin: AdminUser,
    ApiQuery(query): ApiQuery<FinanceQuery>,
) -> Result<impl IntoResponse, AppError> {
    let summary = state.admin.finance(query).await?;
    Ok(Json(summary))
}

pub async fn list_chats(
    State(state): State<AdminState>,
    _admin: AdminUser,
) -> Result<impl IntoResponse, AppError> {
    let chats = state.admin.list_chats().await?;
    Ok(Json(chats))
}

pub async fn chat_messages(
    State(state): State<AdminState>,
    _admin: AdminUser,
    Path(phone): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let messages = state.admin.chat_messages(&phone).await?;
    Ok(Json(messages))
}

pub async fn enqueue_message(
    State(state): State<AdminState>,
    AdminUser(admin): AdminUser,
    ApiJson(request): ApiJson<EnqueueTextMessageRequest>,
) -> Result<impl IntoResponse, AppError> {
    let enqueued = state.admin.enqueue_text(request, Utc::now()).await?;
    info!(admin_id = %admin.user_id, message_id = %enqueued.id, "admin: message enqueued");
    Ok((StatusCode::ACCEPTED, Json(enqueued)))
}

pub async fn list_outgoing_messages(
    State(state): State<AdminState>,
    _admin: AdminUser,
    ApiQuery(filter): ApiQuery<ListOutgoingMessagesFilter>,
) -> Result<impl IntoResponse, AppError> {
    let messages = state.admin.list_outgoing(filter).await?;
    Ok(Json(messages))
}

pub async fn issue_gift_card(
    State(state): State<AdminState>,
    AdminUser(admin): AdminUser,
    ApiJson(request): ApiJson<IssueGiftCardRequest>,
) -> Result<impl IntoResponse, AppError> {
    let issued = state.gift_cards.issue(request).await?;
    info!(
        admin_id = %admin.user_id,
        gift_card_id = %issued.id,
        amount_minor = issued.amount_minor,
        "admin: gift card issued"
    );
    Ok((StatusCode::CREATED, Json(issued)))
}
