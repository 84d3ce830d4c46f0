use anyhow::{Context, Result};
use chrono::Duration;
use crates::domain::value_objects::{
    delivery_zone::{Coordinates, DeliveryZone},
    estimates::business_offset,
};
use std::{env, str::FromStr};

use super::{
    config_model::{
        Admin, BackendServer, Business, Database, DotEnvyConfig, Geocoding, Notifications,
        Supabase, WhatsApp,
    },
    stage::Stage,
};
use crates::infra::whatsapp::cloud_api_client::DEFAULT_API_BASE_URL;

pub fn load() -> Result<DotEnvyConfig> {
    dotenvy::dotenv().ok();

    let backend_server = BackendServer {
        port: required_parse("SERVER_PORT_BACKEND")?,
        body_limit: required_parse("SERVER_BODY_LIMIT")?,
        timeout: required_parse("SERVER_TIMEOUT")?,
    };

    let database = Database {
        url: required("DATABASE_URL")?,
        max_connections: optional_parse("DATABASE_MAX_CONNECTIONS", 10)?,
    };

    let supabase = Supabase {
        jwt_secret: required("SUPABASE_JWT_SECRET")?,
    };

    let admin = Admin {
        emails: parse_email_list(&optional("ADMIN_EMAILS").unwrap_or_default()),
    };

    let whatsapp = WhatsApp {
        api_base_url: optional("WHATSAPP_API_BASE_URL")
            .unwrap_or_else(|| DEFAULT_API_BASE_URL.to_string()),
        phone_number_id: required("WHATSAPP_PHONE_NUMBER_ID")?,
        access_token: required("WHATSAPP_ACCESS_TOKEN")?,
        verify_token: required("WHATSAPP_VERIFY_TOKEN")?,
        app_secret: optional("WHATSAPP_APP_SECRET"),
    };

    let notifications = Notifications {
        order_template: optional("WHATSAPP_ORDER_TEMPLATE"),
        template_language: optional("WHATSAPP_TEMPLATE_LANGUAGE")
            .unwrap_or_else(|| "es_AR".to_string()),
        staff_phone: optional("STAFF_PHONE"),
        restaurant_phone: optional("RESTAURANT_PHONE"),
        default_country_code: optional("DEFAULT_COUNTRY_CODE").unwrap_or_else(|| "54".to_string()),
    };

    let offset_minutes: i32 = optional_parse("BUSINESS_UTC_OFFSET_MINUTES", -180)?;
    let business = Business {
        utc_offset: business_offset(offset_minutes)
            .context("BUSINESS_UTC_OFFSET_MINUTES is out of range")?,
        delivery_fee_minor: optional_parse("DELIVERY_FEE_MINOR", 0)?,
        delivery_zone: delivery_zone_from_env()?,
        birthday_discount_percent: optional_parse("BIRTHDAY_DISCOUNT_PERCENT", 10)?,
        product_cache_ttl: Duration::seconds(optional_parse("PRODUCT_CACHE_TTL_SECS", 30)?),
    };

    let geocoding = Geocoding {
        api_key: optional("GEOCODING_API_KEY"),
        country: optional("GEOCODING_COUNTRY").unwrap_or_else(|| "ar".to_string()),
        language: optional("GEOCODING_LANGUAGE").unwrap_or_else(|| "es".to_string()),
    };

    Ok(DotEnvyConfig {
        stage: get_stage(),
        backend_server,
        database,
        supabase,
        admin,
        whatsapp,
        notifications,
        business,
        geocoding,
    })
}

pub fn get_stage() -> Stage {
    dotenvy::dotenv().ok();

    let stage_str = env::var("STAGE").unwrap_or_default();
    Stage::try_from(&stage_str).unwrap_or_default()
}

/// The zone check is disabled unless the restaurant coordinates are set.
fn delivery_zone_from_env() -> Result<Option<DeliveryZone>> {
    let (Some(lat), Some(lng)) = (optional("RESTAURANT_LAT"), optional("RESTAURANT_LNG")) else {
        return Ok(None);
    };
    let center = Coordinates {
        lat: lat.parse().context("RESTAURANT_LAT is invalid")?,
        lng: lng.parse().context("RESTAURANT_LNG is invalid")?,
    };
    anyhow::ensure!(center.is_valid(), "RESTAURANT_LAT/RESTAURANT_LNG are out of range");

    Ok(Some(DeliveryZone {
        center,
        radius_km: optional_parse("DELIVERY_RADIUS_KM", 5.0)?,
    }))
}

fn parse_email_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(|email| email.trim().to_ascii_lowercase())
        .filter(|email| !email.is_empty())
        .collect()
}

fn optional(key: &str) -> Option<String> {
    env::var(key)
        .ok()
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}

fn required(key: &str) -> Result<String> {
    optional(key).with_context(|| format!("{key} is invalid"))
}

fn required_parse<T>(key: &str) -> Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    required(key)?
        .parse()
        .with_context(|| format!("{key} is invalid"))
}

fn optional_parse<T>(key: &str, default: T) -> Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match optional(key) {
        Some(raw) => raw.parse().with_context(|| format!("{key} is invalid")),
        None => Ok(default),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn admin_emails_are_trimmed_and_lowercased() {
        assert_eq!(
            parse_email_list(" Owner@Example.com, ,staff@example.com "),
            vec!["owner@example.com", "staff@example.com"]
        );
        assert!(parse_email_list("").is_empty());
    }
}
