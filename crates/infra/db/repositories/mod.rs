pub mod discount_codes;
pub mod gift_cards;
pub mod orders;
pub mod outgoing_messages;
pub mod products;
pub mod profiles;
pub mod store_settings;
pub mod whatsapp_messages;
