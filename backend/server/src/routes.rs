use crate::handlers;
use actix_web::{error, web, HttpResponse};

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg
        .app_data(web::QueryConfig::default().error_handler(|err, _req| {
            let response = bad_request(format!("Invalid query parameters: {}", err));
            error::InternalError::from_response(err, response).into()
        }))
        .app_data(web::JsonConfig::default().error_handler(|err, _req| {
            let response = bad_request(format!("Invalid request body: {}", err));
            error::InternalError::from_response(err, response).into()
        }))
        .route("/health", web::get().to(handlers::health))

        // Service registry
        .route("/api/services", web::get().to(handlers::list_services))
        .route("/api/services", web::post().to(handlers::create_service))
        .route("/api/services/{id}", web::get().to(handlers::get_service))
        .route("/api/services/{id}", web::put().to(handlers::update_service))
        .route("/api/services/{id}", web::delete().to(handlers::delete_service))

        // History
        .route(
            "/api/services/{id}/status",
            web::get().to(handlers::get_status_history),
        )
        .route(
            "/api/services/{id}/uptime",
            web::get().to(handlers::get_uptime_history),
        )
        .route("/api/status/latest", web::get().to(handlers::get_latest_statuses))

        // Check cycles
        .route("/api/check", web::post().to(handlers::run_checks))
        .route("/api/cron/check", web::get().to(handlers::run_scheduled_checks));
}

fn bad_request(message: String) -> HttpResponse {
    HttpResponse::BadRequest().json(serde_json::json!({ "error": message }))
}
