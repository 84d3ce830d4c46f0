pub mod admin;
pub mod coupons;
pub mod estimates;
pub mod geocoding;
pub mod gift_cards;
pub mod orders;
pub mod products;
pub mod whatsapp_webhook;
