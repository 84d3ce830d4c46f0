use serde::{Deserialize, Serialize};

use crate::domain::value_objects::enums::hours_override_modes::HoursOverrideMode;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HoursOverrideDto {
    pub mode: HoursOverrideMode,
}
