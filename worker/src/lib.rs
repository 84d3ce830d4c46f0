pub mod axum_http;
pub mod config;
pub mod outgoing_messages;
pub mod usecases;
