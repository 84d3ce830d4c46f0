use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::entities::products::ProductEntity;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ProductExtra {
    pub name: String,
    pub price_minor: i64,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct ProductDto {
    pub id: Uuid,
    pub name: String,
    pub category: String,
    pub price_minor: i64,
    pub extras: Vec<ProductExtra>,
    pub available: bool,
}

impl ProductDto {
    pub fn find_extra(&self, name: &str) -> Option<&ProductExtra> {
        self.extras
            .iter()
            .find(|extra| extra.name.eq_ignore_ascii_case(name.trim()))
    }
}

impl From<ProductEntity> for ProductDto {
    fn from(value: ProductEntity) -> Self {
        // A malformed extras column should not hide the product from the menu.
        let extras = serde_json::from_value(value.extras).unwrap_or_default();
        Self {
            id: value.id,
            name: value.name,
            category: value.category,
            price_minor: value.price_minor,
            extras,
            available: value.available,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct UpdateAvailabilityRequest {
    pub available: bool,
}
