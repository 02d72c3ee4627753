mod config;
mod handlers;
mod query_validation;
mod routes;

use actix_cors::Cors;
use actix_web::{web, App, HttpServer};
use config::Config;
use handlers::AppState;
use query_validation::HistoryQueryValidator;
use statusboard_services::{
    create_connection, CheckService, DatabaseStore, MemoryStore, ProbeService, QueryService,
    ServiceStore, StatusStore,
};
use std::sync::Arc;

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    dotenv::dotenv().ok();
    env_logger::init_from_env(env_logger::Env::new().default_filter_or("info"));

    let config = Config::from_env();

    log::info!("Starting status monitor server on {}:{}", config.server_host, config.server_port);

    // Fall back to an in-memory store so the API stays usable without a database
    let (service_store, status_store): (Arc<dyn ServiceStore>, Arc<dyn StatusStore>) =
        match create_connection(&config.database_url).await {
            Ok(conn) => {
                log::info!("Database connection established");
                log::info!("Note: Run migrations with 'cd migrations && cargo run -- up' if not already done");
                let store = Arc::new(DatabaseStore::new(conn));
                (store.clone() as Arc<dyn ServiceStore>, store as Arc<dyn StatusStore>)
            }
            Err(e) => {
                log::warn!("{}. Continuing with in-memory storage; history will not survive restarts.", e);
                let store = Arc::new(MemoryStore::new());
                (store.clone() as Arc<dyn ServiceStore>, store as Arc<dyn StatusStore>)
            }
        };

    let probe_service = ProbeService::new(config.probe_timeout)?;
    let check_service = CheckService::new(probe_service, service_store.clone(), status_store.clone())
        .with_max_concurrency(config.check_concurrency);
    let query_service = QueryService::new(
        service_store.clone(),
        status_store,
        config.uptime_page_size,
    );

    if config.cron_api_key.is_none() {
        log::warn!("CRON_API_KEY is not set; /api/cron/check accepts unauthenticated calls");
    }

    let app_state = web::Data::new(AppState {
        service_store,
        query_service: Arc::new(query_service),
        check_service: Arc::new(check_service),
        query_validator: HistoryQueryValidator::new(
            config.history_max_days,
            config.history_max_limit,
            config.uptime_max_buckets,
        ),
        cron_api_key: config.cron_api_key.clone(),
    });

    HttpServer::new(move || {
        let cors = Cors::default()
            .allow_any_method()
            .allow_any_origin()
            .allow_any_header();

        App::new()
            .wrap(cors)
            .app_data(app_state.clone())
            .configure(routes::configure)
    })
    .bind((config.server_host.as_str(), config.server_port))?
    .run()
    .await?;

    Ok(())
}
