use serde::{Deserialize, Serialize};
use std::{fmt::Display, str::FromStr};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum DeliveryType {
    /// Customer picks the order up at the counter.
    Retiro,
    Delivery,
}

impl Display for DeliveryType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let delivery_type = match self {
            DeliveryType::Retiro => "retiro",
            DeliveryType::Delivery => "delivery",
        };
        write!(f, "{}", delivery_type)
    }
}

impl FromStr for DeliveryType {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_lowercase().as_str() {
            "retiro" => Ok(DeliveryType::Retiro),
            "delivery" => Ok(DeliveryType::Delivery),
            other => Err(format!("Unsupported delivery type: {}", other)),
        }
    }
}
