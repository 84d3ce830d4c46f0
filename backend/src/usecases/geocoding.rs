use crates::domain::{
    repositories::geocoding::GeocodingClient,
    value_objects::{
        delivery_zone::{Coordinates, DeliveryZone, haversine_km},
        geocoding::AddressSuggestion,
    },
};
use std::sync::Arc;
use thiserror::Error;
use tracing::warn;

const MIN_AUTOCOMPLETE_INPUT: usize = 3;

#[derive(Debug, Error, PartialEq)]
pub enum ZoneError {
    #[error("address is {distance_km:.1} km away, outside the {radius_km:.1} km delivery zone")]
    OutsideZone { distance_km: f64, radius_km: f64 },
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ZoneCheck {
    Inside(Coordinates),
    /// No zone configured, or the address could not be located.
    Skipped,
}

pub struct GeocodingUseCase<G>
where
    G: GeocodingClient + Send + Sync + 'static,
{
    geocoding_client: Option<Arc<G>>,
    delivery_zone: Option<DeliveryZone>,
}

impl<G> GeocodingUseCase<G>
where
    G: GeocodingClient + Send + Sync + 'static,
{
    pub fn new(geocoding_client: Option<Arc<G>>, delivery_zone: Option<DeliveryZone>) -> Self {
        Self {
            geocoding_client,
            delivery_zone,
        }
    }

    /// Provider failures degrade to no suggestions.
    pub async fn autocomplete(&self, input: &str) -> Vec<AddressSuggestion> {
        let input = input.trim();
        if input.chars().count() < MIN_AUTOCOMPLETE_INPUT {
            return Vec::new();
        }
        let Some(client) = self.geocoding_client.as_ref() else {
            return Vec::new();
        };

        match client.autocomplete(input).await {
            Ok(suggestions) => suggestions,
            Err(err) => {
                warn!(error = %err, "geocoding: autocomplete failed");
                Vec::new()
            }
        }
    }

    pub async fn check_delivery_address(
        &self,
        address: &str,
        coordinates: Option<Coordinates>,
    ) -> Result<ZoneCheck, ZoneError> {
        let Some(zone) = self.delivery_zone else {
            return Ok(ZoneCheck::Skipped);
        };

        let point = match coordinates.filter(Coordinates::is_valid) {
            Some(point) => Some(point),
            None => self.locate(address).await,
        };
        let Some(point) = point else {
            warn!("geocoding: address could not be located, skipping zone check");
            return Ok(ZoneCheck::Skipped);
        };

        if zone.contains(point) {
            Ok(ZoneCheck::Inside(point))
        } else {
            Err(ZoneError::OutsideZone {
                distance_km: haversine_km(zone.center, point),
                radius_km: zone.radius_km,
            })
        }
    }

    async fn locate(&self, address: &str) -> Option<Coordinates> {
        let client = self.geocoding_client.as_ref()?;
        match client.geocode(address).await {
            Ok(geocoded) => geocoded.map(|geocoded| geocoded.coordinates),
            Err(err) => {
                warn!(error = %err, "geocoding: geocode failed");
                None
            }
        }
    }
}
