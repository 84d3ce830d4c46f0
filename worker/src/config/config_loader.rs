use anyhow::{Context, Result};
use crates::{
    domain::value_objects::outgoing_messages::RetryPolicy,
    infra::whatsapp::cloud_api_client::DEFAULT_API_BASE_URL,
};
use std::{env, str::FromStr, time::Duration};
use uuid::Uuid;

use super::config_model::{Database, DotEnvyConfig, OutgoingWorker, WhatsApp, WorkerServer};

pub fn load() -> Result<DotEnvyConfig> {
    dotenvy::dotenv().ok();

    let worker_server = WorkerServer {
        port: required_parse("SERVER_PORT_WORKER")?,
        body_limit: optional_parse("SERVER_BODY_LIMIT", 1)?,
        timeout: required_parse("SERVER_TIMEOUT")?,
    };

    let database = Database {
        url: required("DATABASE_URL")?,
        max_connections: optional_parse("DATABASE_MAX_CONNECTIONS", 5)?,
    };

    let whatsapp = WhatsApp {
        api_base_url: optional("WHATSAPP_API_BASE_URL")
            .unwrap_or_else(|| DEFAULT_API_BASE_URL.to_string()),
        phone_number_id: required("WHATSAPP_PHONE_NUMBER_ID")?,
        access_token: required("WHATSAPP_ACCESS_TOKEN")?,
    };

    let outgoing = outgoing_worker_from_env()?;

    Ok(DotEnvyConfig {
        worker_server,
        database,
        whatsapp,
        outgoing,
    })
}

fn outgoing_worker_from_env() -> Result<OutgoingWorker> {
    let batch_size: i64 = optional_parse("OUTGOING_BATCH_SIZE", 20)?;
    anyhow::ensure!(batch_size > 0, "OUTGOING_BATCH_SIZE must be positive");

    let concurrency: usize = optional_parse("OUTGOING_CONCURRENCY", 5)?;
    anyhow::ensure!(concurrency > 0, "OUTGOING_CONCURRENCY must be positive");

    let max_attempts: i32 = optional_parse("OUTGOING_MAX_ATTEMPTS", 5)?;
    anyhow::ensure!(max_attempts > 0, "OUTGOING_MAX_ATTEMPTS must be positive");

    let worker_id = optional("WORKER_ID")
        .unwrap_or_else(|| format!("worker-{}", &Uuid::new_v4().simple().to_string()[..8]));

    Ok(OutgoingWorker {
        worker_id,
        batch_size,
        concurrency,
        poll_interval: Duration::from_secs(optional_parse("OUTGOING_POLL_INTERVAL_SECS", 5)?),
        lock_timeout: chrono::Duration::seconds(optional_parse("OUTGOING_LOCK_TIMEOUT_SECS", 300)?),
        retry_policy: RetryPolicy {
            max_attempts,
            backoff_base: chrono::Duration::seconds(optional_parse(
                "OUTGOING_BACKOFF_BASE_SECS",
                0,
            )?),
            backoff_max: chrono::Duration::seconds(optional_parse(
                "OUTGOING_BACKOFF_MAX_SECS",
                300,
            )?),
        },
    })
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
