pub mod cloud_api_client;
pub mod webhook_signature;
