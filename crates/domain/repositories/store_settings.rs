use anyhow::Result;
use async_trait::async_trait;
use mockall::automock;

use crate::domain::value_objects::enums::hours_override_modes::HoursOverrideMode;

#[automock]
#[async_trait]
pub trait StoreSettingsRepository {
    async fn get_hours_override(&self) -> Result<HoursOverrideMode>;

    async fn set_hours_override(&self, mode: HoursOverrideMode) -> Result<()>;
}
