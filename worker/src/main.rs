mod config;
mod worker_service;

use actix_web::{web, App, HttpServer};
use config::Config;
use statusboard_services::{create_connection, CheckService, DatabaseStore, ProbeService};
use std::sync::Arc;
use worker_service::WorkerService;

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    dotenv::dotenv().ok();
    env_logger::init_from_env(env_logger::Env::new().default_filter_or("info"));

    let config = Config::from_env()?;

    log::info!("Starting status monitor worker");

    let db = create_connection(&config.database_url).await?;
    log::info!("Database connection established");

    let store = Arc::new(DatabaseStore::new(db));
    let check_service = CheckService::new(
        ProbeService::new(config.probe_timeout)?,
        store.clone(),
        store,
    )
    .with_max_concurrency(config.check_concurrency);

    let worker_service = WorkerService::new(Arc::new(check_service), config.check_interval);

    // Start the worker in a background task
    tokio::spawn(async move {
        worker_service.start().await;
    });

    // Start a minimal HTTP server for health checks
    HttpServer::new(move || {
        App::new()
            .route("/health", web::get().to(|| async { "OK" }))
    })
    .bind((config.server_host.as_str(), config.server_port))?
    .run()
    .await?;

    Ok(())
}
