use serde::{Deserialize, Serialize};
use std::{fmt::Display, str::FromStr};

#[derive(Default, Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum HoursOverrideMode {
    #[default]
    Auto,
    ForceOpen,
    ForceClosed,
}

impl Display for HoursOverrideMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mode = match self {
            HoursOverrideMode::Auto => "auto",
            HoursOverrideMode::ForceOpen => "force_open",
            HoursOverrideMode::ForceClosed => "force_closed",
        };
        write!(f, "{}", mode)
    }
}

impl FromStr for HoursOverrideMode {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.to_lowercase().as_str() {
            "auto" => Ok(HoursOverrideMode::Auto),
            "force_open" => Ok(HoursOverrideMode::ForceOpen),
            "force_closed" => Ok(HoursOverrideMode::ForceClosed),
            other => Err(format!("Unsupported hours override mode: {}", other)),
        }
    }
}
