use anyhow::Result;
use crates::infra::{
    db::{
        postgres::postgres_connection,
        repositories::{
            outgoing_messages::OutgoingMessagePostgres, whatsapp_messages::WhatsappMessagePostgres,
        },
    },
    whatsapp::cloud_api_client::{WhatsAppCloudClient, WhatsAppCloudConfig},
};
use std::sync::Arc;
use tracing::{error, info};
use worker::{
    axum_http, config, outgoing_messages,
    usecases::deliver_outgoing_message::DeliverOutgoingMessageUseCase,
};

#[tokio::main]
async fn main() {
    if let Err(error) = run().await {
        error!("Worker exited with error: {}", error);
        std::process::exit(1);
    }
}

async fn run() -> Result<()> {
    dotenvy::dotenv().ok();
    crates::observability::init_observability("worker")?;

    let dotenvy_env = Arc::new(config::config_loader::load()?);
    info!("ENV has been loaded");

    let postgres_pool = postgres_connection::establish_connection(
        &dotenvy_env.database.url,
        dotenvy_env.database.max_connections,
    )?;
    info!("Postgres connection has been established");

    let db_pool_arc = Arc::new(postgres_pool);

    let messaging_client = Arc::new(WhatsAppCloudClient::new(WhatsAppCloudConfig {
        api_base_url: dotenvy_env.whatsapp.api_base_url.clone(),
        phone_number_id: dotenvy_env.whatsapp.phone_number_id.clone(),
        access_token: dotenvy_env.whatsapp.access_token.clone(),
    })?);

    let deliver_usecase = Arc::new(DeliverOutgoingMessageUseCase::new(
        Arc::new(OutgoingMessagePostgres::new(Arc::clone(&db_pool_arc))),
        Arc::new(WhatsappMessagePostgres::new(Arc::clone(&db_pool_arc))),
        messaging_client,
        dotenvy_env.outgoing.retry_policy,
    ));

    let outgoing_loop = tokio::spawn(outgoing_messages::worker::run(
        deliver_usecase,
        dotenvy_env.outgoing.clone(),
    ));

    let server_config = Arc::clone(&dotenvy_env);
    let health_server = tokio::spawn(async move { axum_http::http_serve::start(server_config).await });

    // The health server owns signal handling; when it stops, the process exits.
    tokio::select! {
        result = outgoing_loop => result??,
        result = health_server => result??,
    };
    Ok(())
}
