use chrono::{DateTime, FixedOffset, Utc};
use crates::domain::{
    repositories::store_settings::StoreSettingsRepository,
    value_objects::{
        enums::{delivery_types::DeliveryType, hours_override_modes::HoursOverrideMode},
        estimates::{EstimateDto, resolve_estimate},
    },
};
use std::sync::Arc;
use thiserror::Error;
use tracing::{info, warn};

#[derive(Debug, Error)]
pub enum EstimateError {
    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

impl EstimateError {
    pub fn status_code(&self) -> axum::http::StatusCode {
        axum::http::StatusCode::INTERNAL_SERVER_ERROR
    }
}

pub struct EstimateUseCase<S>
where
    S: StoreSettingsRepository + Send + Sync + 'static,
{
    store_settings_repository: Arc<S>,
    offset: FixedOffset,
}

impl<S> EstimateUseCase<S>
where
    S: StoreSettingsRepository + Send + Sync + 'static,
{
    pub fn new(store_settings_repository: Arc<S>, offset: FixedOffset) -> Self {
        Self {
            store_settings_repository,
            offset,
        }
    }

    pub fn offset(&self) -> FixedOffset {
        self.offset
    }

    /// Never fails: an unreadable override falls back to the weekly table.
    pub async fn estimate(&self, delivery_type: DeliveryType, at: DateTime<Utc>) -> EstimateDto {
        let mode = match self.store_settings_repository.get_hours_override().await {
            Ok(mode) => mode,
            Err(err) => {
                warn!(error = %err, "estimates: failed to read hours override, using auto");
                HoursOverrideMode::Auto
            }
        };

        let estimate = resolve_estimate(delivery_type, at, self.offset, mode);
        EstimateDto {
            open: estimate.is_some(),
            delivery_type,
            estimate,
            eta_text: estimate.map(|range| range.eta_text()),
        }
    }

    pub async fn hours_override(&self) -> Result<HoursOverrideMode, EstimateError> {
        Ok(self.store_settings_repository.get_hours_override().await?)
    }

    pub async fn set_hours_override(&self, mode: HoursOverrideMode) -> Result<(), EstimateError> {
        self.store_settings_repository
            .set_hours_override(mode)
            .await?;
        info!(mode = %mode, "estimates: hours override updated");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use crates::domain::{
        repositories::store_settings::MockStoreSettingsRepository,
        value_objects::estimates::{EstimateRange, business_offset},
    };

    fn usecase(repo: MockStoreSettingsRepository) -> EstimateUseCase<MockStoreSettingsRepository> {
        EstimateUseCase::new(Arc::new(repo), business_offset(-180).unwrap())
    }

    #[tokio::test]
    async fn friday_evening_delivery_quote() {
        let mut repo = MockStoreSettingsRepository::new();
        repo.expect_get_hours_override()
            .returning(|| Ok(HoursOverrideMode::Auto));

        let at = Utc.with_ymd_and_hms(2026, 10, 16, 22, 30, 0).unwrap();
        let dto = usecase(repo).estimate(DeliveryType::Delivery, at).await;

        assert!(dto.open);
        assert_eq!(dto.estimate, Some(EstimateRange { min: 60, max: 90 }));
        assert_eq!(dto.eta_text.as_deref(), Some("60-90 min"));
    }

    #[tokio::test]
    async fn force_closed_hides_the_estimate() {
        let mut repo = MockStoreSettingsRepository::new();
        repo.expect_get_hours_override()
            .returning(|| Ok(HoursOverrideMode::ForceClosed));

        let at = Utc.with_ymd_and_hms(2026, 10, 16, 22, 30, 0).unwrap();
        let dto = usecase(repo).estimate(DeliveryType::Retiro, at).await;

        assert!(!dto.open);
        assert_eq!(dto.estimate, None);
        assert_eq!(dto.eta_text, None);
    }

    #[tokio::test]
    async fn settings_failure_falls_back_to_table() {
        let mut repo = MockStoreSettingsRepository::new();
        repo.expect_get_hours_override()
            .returning(|| Err(anyhow::anyhow!("connection refused")));

        // Monday, closed in the table.
        let at = Utc.with_ymd_and_hms(2026, 10, 19, 23, 0, 0).unwrap();
        let dto = usecase(repo).estimate(DeliveryType::Delivery, at).await;

        assert!(!dto.open);
    }
}
