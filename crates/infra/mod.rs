pub mod db;
pub mod geocoding;
pub mod whatsapp;
