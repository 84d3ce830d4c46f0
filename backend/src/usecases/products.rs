use chrono::{DateTime, Duration, Utc};
use crates::domain::{
    repositories::products::ProductRepository, value_objects::products::ProductDto,
};
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::RwLock;
use tracing::{debug, info};
use uuid::Uuid;

#[derive(Debug, Error)]
pub enum ProductError {
    #[error("product not found")]
    NotFound,
    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

impl ProductError {
    pub fn status_code(&self) -> axum::http::StatusCode {
        use axum::http::StatusCode;
        match self {
            ProductError::NotFound => StatusCode::NOT_FOUND,
            ProductError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

pub type UseCaseResult<T> = std::result::Result<T, ProductError>;

struct CachedMenu {
    loaded_at: DateTime<Utc>,
    products: Vec<ProductDto>,
}

/// Menu reads are served from a per-process cache. Other instances only see
/// an availability toggle once their own entry expires.
pub struct ProductCatalogUseCase<P>
where
    P: ProductRepository + Send + Sync + 'static,
{
    product_repository: Arc<P>,
    cache: RwLock<Option<CachedMenu>>,
    ttl: Duration,
}

impl<P> ProductCatalogUseCase<P>
where
    P: ProductRepository + Send + Sync + 'static,
{
    pub fn new(product_repository: Arc<P>, ttl: Duration) -> Self {
        Self {
            product_repository,
            cache: RwLock::new(None),
            ttl,
        }
    }

    pub async fn list_products(&self) -> UseCaseResult<Vec<ProductDto>> {
        self.list_products_at(Utc::now()).await
    }

    pub async fn list_products_at(&self, now: DateTime<Utc>) -> UseCaseResult<Vec<ProductDto>> {
        if let Some(cached) = self.cache.read().await.as_ref() {
            if now - cached.loaded_at < self.ttl {
                debug!(count = cached.products.len(), "products: cache hit");
                return Ok(cached.products.clone());
            }
        }

        let products: Vec<ProductDto> = self
            .product_repository
            .list_products()
            .await?
            .into_iter()
            .map(ProductDto::from)
            .collect();

        *self.cache.write().await = Some(CachedMenu {
            loaded_at: now,
            products: products.clone(),
        });
        debug!(count = products.len(), "products: cache refreshed");

        Ok(products)
    }

    pub async fn set_availability(&self, product_id: Uuid, available: bool) -> UseCaseResult<()> {
        let updated = self
            .product_repository
            .set_availability(product_id, available)
            .await?;
        if !updated {
            return Err(ProductError::NotFound);
        }

        self.invalidate().await;
        info!(%product_id, available, "products: availability updated");
        Ok(())
    }

    pub async fn invalidate(&self) {
        *self.cache.write().await = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crates::domain::{
        entities::products::ProductEntity, repositories::products::MockProductRepository,
    };
    use mockall::predicate::eq;
    use serde_json::json;

    fn product(name: &str, available: bool) -> ProductEntity {
        ProductEntity {
            id: Uuid::new_v4(),
            name: name.to_string(),
            category: "pizzas".to_string(),
            price_minor: 1_000_000,
            extras: json!([{ "name": "Extra queso", "price_minor": 150_000 }]),
            available,
            sort_order: 1,
            updated_at: Utc::now(),
        }
    }

    #[tokio::test]
    async fn serves_from_cache_within_ttl() {
        let mut repo = MockProductRepository::new();
        let rows = vec![product("Muzzarella", true)];
        repo.expect_list_products()
            .times(1)
            .returning(move || Ok(rows.clone()));

        let usecase = ProductCatalogUseCase::new(Arc::new(repo), Duration::seconds(30));
        let now = Utc::now();

        let first = usecase.list_products_at(now).await.unwrap();
        let second = usecase
            .list_products_at(now + Duration::seconds(10))
            .await
            .unwrap();

        assert_eq!(first, second);
        assert_eq!(first[0].extras[0].name, "Extra queso");
    }

    #[tokio::test]
    async fn reloads_after_ttl_expires() {
        let mut repo = MockProductRepository::new();
        repo.expect_list_products()
            .times(2)
            .returning(|| Ok(vec![product("Fugazzeta", true)]));

        let usecase = ProductCatalogUseCase::new(Arc::new(repo), Duration::seconds(30));
        let now = Utc::now();

        usecase.list_products_at(now).await.unwrap();
        usecase
            .list_products_at(now + Duration::seconds(31))
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn toggling_availability_invalidates_cache() {
        let mut repo = MockProductRepository::new();
        let product_id = Uuid::new_v4();
        repo.expect_list_products()
            .times(2)
            .returning(|| Ok(vec![product("Napolitana", false)]));
        repo.expect_set_availability()
            .with(eq(product_id), eq(false))
            .times(1)
            .returning(|_, _| Ok(true));

        let usecase = ProductCatalogUseCase::new(Arc::new(repo), Duration::seconds(30));
        let now = Utc::now();

        usecase.list_products_at(now).await.unwrap();
        usecase.set_availability(product_id, false).await.unwrap();
        usecase.list_products_at(now).await.unwrap();
    }

    #[tokio::test]
    async fn unknown_product_is_not_found() {
        let mut repo = MockProductRepository::new();
        repo.expect_set_availability().returning(|_, _| Ok(false));

        let usecase = ProductCatalogUseCase::new(Arc::new(repo), Duration::seconds(30));
        let err = usecase
            .set_availability(Uuid::new_v4(), true)
            .await
            .unwrap_err();

        assert!(matches!(err, ProductError::NotFound));
    }
}
