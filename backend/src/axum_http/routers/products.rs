use crate::{axum_http::error_responses::AppError, usecases::products::ProductCatalogUseCase};
use axum::{Json, Router, extract::State, response::IntoResponse, routing::get};
use crates::domain::repositories::products::ProductRepository;
use std::sync::Arc;

pub fn routes<P>(product_catalog_usecase: Arc<ProductCatalogUseCase<P>>) -> Router
where
    P: ProductRepository + Send + Sync + 'static,
{
    Router::new()
        .route("/", get(list_products))
        .with_state(product_catalog_usecase)
}

pub async fn list_products<P>(
    State(product_catalog_usecase): State<Arc<ProductCatalogUseCase<P>>>,
) -> Result<impl IntoResponse, AppError>
where
    P: ProductRepository + Send + Sync,
{
    let products = product_catalog_usecase.list_products().await?;
    Ok(Json(products))
}
