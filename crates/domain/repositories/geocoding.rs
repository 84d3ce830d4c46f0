use anyhow::Result;
use async_trait::async_trait;
use mockall::automock;

use crate::domain::value_objects::geocoding::{AddressSuggestion, GeocodedAddress};

#[automock]
#[async_trait]
pub trait GeocodingClient {
    async fn autocomplete(&self, input: &str) -> Result<Vec<AddressSuggestion>>;

    async fn geocode(&self, address: &str) -> Result<Option<GeocodedAddress>>;
}
