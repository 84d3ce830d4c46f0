use chrono::{Duration, FixedOffset};
use crates::domain::value_objects::delivery_zone::DeliveryZone;

use crate::config::stage::Stage;

#[derive(Debug, Clone)]
pub struct DotEnvyConfig {
    pub stage: Stage,
    pub backend_server: BackendServer,
    pub database: Database,
    pub supabase: Supabase,
    pub admin: Admin,
    pub whatsapp: WhatsApp,
    pub notifications: Notifications,
    pub business: Business,
    pub geocoding: Geocoding,
}

#[derive(Debug, Clone)]
pub struct BackendServer {
    pub port: u16,
    /// MiB.
    pub body_limit: u64,
    /// Seconds.
    pub timeout: u64,
}

#[derive(Debug, Clone)]
pub struct Database {
    pub url: String,
    pub max_connections: u32,
}

#[derive(Debug, Clone)]
pub struct Supabase {
    pub jwt_secret: String,
}

#[derive(Debug, Clone)]
pub struct Admin {
    pub emails: Vec<String>,
}

#[derive(Debug, Clone)]
pub struct WhatsApp {
    pub api_base_url: String,
    pub phone_number_id: String,
    pub access_token: String,
    pub verify_token: String,
    pub app_secret: Option<String>,
}

#[derive(Debug, Clone)]
pub struct Notifications {
    pub order_template: Option<String>,
    pub template_language: String,
    pub staff_phone: Option<String>,
    pub restaurant_phone: Option<String>,
    pub default_country_code: String,
}

#[derive(Debug, Clone)]
pub struct Business {
    pub utc_offset: FixedOffset,
    pub delivery_fee_minor: i64,
    pub delivery_zone: Option<DeliveryZone>,
    pub birthday_discount_percent: i64,
    pub product_cache_ttl: Duration,
}

#[derive(Debug, Clone)]
pub struct Geocoding {
    pub api_key: Option<String>,
    pub country: String,
    pub language: String,
}
