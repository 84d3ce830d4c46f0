use crate::{axum_http::extractors::ApiQuery, usecases::estimates::EstimateUseCase};
use axum::{
    Json, Router,
    extract::State,
    response::IntoResponse,
    routing::get,
};
use chrono::Utc;
use crates::domain::{
    repositories::store_settings::StoreSettingsRepository,
    value_objects::estimates::EstimateQuery,
};
use std::sync::Arc;

pub fn routes<S>(estimate_usecase: Arc<EstimateUseCase<S>>) -> Router
where
    S: StoreSettingsRepository + Send + Sync + 'static,
{
    Router::new()
        .route("/", get(estimate))
        .with_state(estimate_usecase)
}

pub async fn estimate<S>(
    State(estimate_usecase): State<Arc<EstimateUseCase<S>>>,
    ApiQuery(query): ApiQuery<EstimateQuery>,
) -> impl IntoResponse
where
    S: StoreSettingsRepository + Send + Sync,
{
    Json(estimate_usecase.estimate(query.delivery_type, Utc::now()).await)
}
