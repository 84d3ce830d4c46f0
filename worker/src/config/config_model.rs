use crates::domain::value_objects::outgoing_messages::RetryPolicy;
use std::time::Duration;

#[derive(Debug, Clone)]
pub struct DotEnvyConfig {
    pub worker_server: WorkerServer,
    pub database: Database,
    pub whatsapp: WhatsApp,
    pub outgoing: OutgoingWorker,
}

#[derive(Debug, Clone)]
pub struct WorkerServer {
    pub port: u16,
    pub timeout: u64,
    pub body_limit: u64,
}

#[derive(Debug, Clone)]
pub struct Database {
    pub url: String,
    pub max_connections: u32,
}

#[derive(Debug, Clone)]
pub struct WhatsApp {
    pub api_base_url: String,
    pub phone_number_id: String,
    pub access_token: String,
}

#[derive(Debug, Clone)]
pub struct OutgoingWorker {
    /// Written to `locked_by` so stuck rows can be traced to a process.
    pub worker_id: String,
    pub batch_size: i64,
    pub concurrency: usize,
    pub poll_interval: Duration,
    pub lock_timeout: chrono::Duration,
    pub retry_policy: RetryPolicy,
}
