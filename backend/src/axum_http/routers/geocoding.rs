use crate::{axum_http::extractors::ApiQuery, usecases::geocoding::GeocodingUseCase};
use axum::{
    Json, Router,
    extract::State,
    response::IntoResponse,
    routing::get,
};
use crates::domain::{
    repositories::geocoding::GeocodingClient, value_objects::geocoding::AutocompleteQuery,
};
use std::sync::Arc;

pub fn routes<G>(geocoding_usecase: Arc<GeocodingUseCase<G>>) -> Router
where
    G: GeocodingClient + Send + Sync + 'static,
{
    Router::new()
        .route("/autocomplete", get(autocomplete))
        .with_state(geocoding_usecase)
}

pub async fn autocomplete<G>(
    State(geocoding_usecase): State<Arc<GeocodingUseCase<G>>>,
    ApiQuery(query): ApiQuery<AutocompleteQuery>,
) -> impl IntoResponse
where
    G: GeocodingClient + Send + Sync,
{
    Json(geocoding_usecase.autocomplete(&query.input).await)
}
