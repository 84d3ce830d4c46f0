use serde::{Deserialize, Serialize};

use crate::domain::value_objects::delivery_zone::Coordinates;

#[derive(Debug, Deserialize)]
pub struct AutocompleteQuery {
    pub input: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AddressSuggestion {
    pub description: String,
    pub place_id: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct GeocodedAddress {
    pub formatted_address: String,
    pub coordinates: Coordinates,
}
