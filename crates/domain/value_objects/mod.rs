pub mod chats;
pub mod delivery_zone;
pub mod discount_codes;
pub mod enums;
pub mod estimates;
pub mod finance;
pub mod geocoding;
pub mod gift_cards;
pub mod order_notifications;
pub mod orders;
pub mod outgoing_messages;
pub mod phone_numbers;
pub mod products;
pub mod redemptions;
pub mod store_settings;
pub mod whatsapp_webhook;
