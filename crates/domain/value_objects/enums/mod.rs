pub mod delivery_types;
pub mod discount_kinds;
pub mod hours_override_modes;
pub mod message_channels;
pub mod message_directions;
pub mod outgoing_message_statuses;
pub mod payment_methods;
