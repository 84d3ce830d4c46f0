use anyhow::Result;
use async_trait::async_trait;
use serde::Deserialize;
use std::time::Duration;
use tracing::warn;

use crate::domain::{
    repositories::geocoding::GeocodingClient,
    value_objects::{
        delivery_zone::Coordinates,
        geocoding::{AddressSuggestion, GeocodedAddress},
    },
};

const AUTOCOMPLETE_URL: &str = "https://maps.googleapis.com/maps/api/place/autocomplete/json";
const GEOCODE_URL: &str = "https://maps.googleapis.com/maps/api/geocode/json";

#[derive(Debug, Clone)]
pub struct GooglePlacesConfig {
    pub api_key: String,
    /// ISO 3166-1 alpha-2, e.g. `ar`.
    pub country: String,
    pub language: String,
}

pub struct GooglePlacesClient {
    http: reqwest::Client,
    config: GooglePlacesConfig,
}

#[derive(Debug, Deserialize)]
struct AutocompleteResponse {
    status: String,
    #[serde(default)]
    predictions: Vec<Prediction>,
    error_message: Option<String>,
}

#[derive(Debug, Deserialize)]
struct Prediction {
    description: String,
    place_id: String,
}

#[derive(Debug, Deserialize)]
struct GeocodeResponse {
    status: String,
    #[serde(default)]
    results: Vec<GeocodeResult>,
    error_message: Option<String>,
}

#[derive(Debug, Deserialize)]
struct GeocodeResult {
    formatted_address: String,
    geometry: Geometry,
}

#[derive(Debug, Deserialize)]
struct Geometry {
    location: Location,
}

#[derive(Debug, Deserialize)]
struct Location {
    lat: f64,
    lng: f64,
}

/// `OK` and `ZERO_RESULTS` are the only non-error statuses the API returns.
fn check_status(status: &str, error_message: Option<&str>, context: &str) -> Result<bool> {
    match status {
        "OK" => Ok(true),
        "ZERO_RESULTS" => Ok(false),
        other => {
            warn!(status = %other, error_message = ?error_message, context = %context, "geocoding: provider rejected request");
            anyhow::bail!("geocoding {} failed with status {}", context, other)
        }
    }
}

fn suggestions_from(response: AutocompleteResponse) -> Result<Vec<AddressSuggestion>> {
    if !check_status(&response.status, response.error_message.as_deref(), "autocomplete")? {
        return Ok(Vec::new());
    }
    Ok(response
        .predictions
        .into_iter()
        .map(|prediction| AddressSuggestion {
            description: prediction.description,
            place_id: prediction.place_id,
        })
        .collect())
}

fn geocoded_from(response: GeocodeResponse) -> Result<Option<GeocodedAddress>> {
    if !check_status(&response.status, response.error_message.as_deref(), "geocode")? {
        return Ok(None);
    }
    Ok(response.results.into_iter().next().map(|result| GeocodedAddress {
        formatted_address: result.formatted_address,
        coordinates: Coordinates {
            lat: result.geometry.location.lat,
            lng: result.geometry.location.lng,
        },
    }))
}

impl GooglePlacesClient {
    pub fn new(config: GooglePlacesConfig) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(5))
            .build()?;
        Ok(Self { http, config })
    }
}

#[async_trait]
impl GeocodingClient for GooglePlacesClient {
    async fn autocomplete(&self, input: &str) -> Result<Vec<AddressSuggestion>> {
        let components = format!("country:{}", self.config.country);
        let response = self
            .http
            .get(AUTOCOMPLETE_URL)
            .query(&[
                ("input", input),
                ("types", "address"),
                ("components", components.as_str()),
                ("language", self.config.language.as_str()),
                ("key", self.config.api_key.as_str()),
            ])
            .send()
            .await?
            .error_for_status()?
            .json::<AutocompleteResponse>()
            .await?;

        suggestions_from(response)
    }

    async fn geocode(&self, address: &str) -> Result<Option<GeocodedAddress>> {
        let components = format!("country:{}", self.config.country);
        let response = self
            .http
            .get(GEOCODE_URL)
            .query(&[
                ("address", address),
                ("components", components.as_str()),
                ("language", self.config.language.as_str()),
                ("key", self.config.api_key.as_str()),
            ])
            .send()
            .await?
            .error_for_status()?
            .json::<GeocodeResponse>()
            .await?;

        geocoded_from(response)
    }
}
