use crate::{
    auth::AuthUser,
    axum_http::{error_responses::AppError, extractors::ApiJson},
    usecases::orders::OrderUseCase,
};
use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    routing::get,
};
use chrono::Utc;
use crates::{
    domain::value_objects::orders::CreateOrderRequest,
    infra::{
        db::repositories::{
            discount_codes::DiscountCodePostgres, gift_cards::GiftCardPostgres,
            orders::OrderPostgres, products::ProductPostgres, profiles::ProfilePostgres,
            store_settings::StoreSettingsPostgres,
        },
        geocoding::google_places::GooglePlacesClient,
        whatsapp::cloud_api_client::WhatsAppCloudClient,
    },
};
use std::sync::Arc;
use uuid::Uuid;

pub type PostgresOrderUseCase = OrderUseCase<
    ProductPostgres,
    OrderPostgres,
    DiscountCodePostgres,
    ProfilePostgres,
    GiftCardPostgres,
    StoreSettingsPostgres,
    GooglePlacesClient,
    WhatsAppCloudClient,
>;

pub fn routes(order_usecase: Arc<PostgresOrderUseCase>) -> Router {
    Router::new()
        .route("/", get(list_orders).post(create_order))
        .route("/:order_id", get(get_order))
        .with_state(order_usecase)
}

pub async fn create_order(
    State(order_usecase): State<Arc<PostgresOrderUseCase>>,
    auth: AuthUser,
    ApiJson(request): ApiJson<CreateOrderRequest>,
) -> Result<impl IntoResponse, AppError> {
    let response = order_usecase
        .place_order(auth.user_id, request, Utc::now())
        .await?;
    Ok((StatusCode::CREATED, Json(response)))
}

pub async fn list_orders(
    State(order_usecase): State<Arc<PostgresOrderUseCase>>,
    auth: AuthUser,
) -> Result<impl IntoResponse, AppError> {
    let orders = order_usecase.list_orders(auth.user_id).await?;
    Ok(Json(orders))
}

pub async fn get_order(
    State(order_usecase): State<Arc<PostgresOrderUseCase>>,
    auth: AuthUser,
    Path(order_id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    let order = order_usecase.get_order(auth.user_id, order_id).await?;
    Ok(Json(order))
}
