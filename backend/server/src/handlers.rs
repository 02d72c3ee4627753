use actix_web::{web, HttpResponse, Responder};
use chrono::Utc;
use statusboard_services::{CheckService, MonitorError, QueryService, ServiceDraft, ServiceStore};
use statusboard_shared::ServiceInput;
use std::sync::Arc;
use uuid::Uuid;

use crate::query_validation::HistoryQueryValidator;

pub struct AppState {
    pub service_store: Arc<dyn ServiceStore>,
    pub query_service: Arc<QueryService>,
    pub check_service: Arc<CheckService>,
    pub query_validator: HistoryQueryValidator,
    pub cron_api_key: Option<String>,
}

/// Query parameters for the history endpoint
#[derive(serde::Deserialize)]
pub struct HistoryQuery {
    #[serde(default)]
    pub days: Option<u32>,
    #[serde(default)]
    pub limit: Option<u64>,
}

/// Query parameters for the uptime bar endpoint
#[derive(serde::Deserialize)]
pub struct UptimeQuery {
    #[serde(default)]
    pub days: Option<u32>,
    #[serde(default)]
    pub buckets: Option<usize>,
}

#[derive(serde::Deserialize)]
pub struct CronQuery {
    #[serde(default)]
    pub key: Option<String>,
}

pub async fn health() -> impl Responder {
    HttpResponse::Ok().json(serde_json::json!({ "status": "ok" }))
}

/// List all services, newest first
pub async fn list_services(state: web::Data<AppState>) -> impl Responder {
    match state.service_store.list_services().await {
        Ok(services) => HttpResponse::Ok().json(services),
        Err(e) => error_response("fetch services", e),
    }
}

/// Register a new service
pub async fn create_service(
    state: web::Data<AppState>,
    body: web::Json<ServiceInput>,
) -> impl Responder {
    let draft = match ServiceDraft::try_from(body.into_inner()) {
        Ok(draft) => draft,
        Err(e) => return error_response("create service", e),
    };

    match state.service_store.create_service(draft).await {
        Ok(service) => {
            log::info!("Created service {} ({})", service.name, service.id);
            HttpResponse::Created().json(service)
        }
        Err(e) => error_response("create service", e),
    }
}

pub async fn get_service(state: web::Data<AppState>, path: web::Path<String>) -> impl Responder {
    let id = match parse_service_id(&path) {
        Ok(id) => id,
        Err(response) => return response,
    };

    match state.service_store.get_service(id).await {
        Ok(Some(service)) => HttpResponse::Ok().json(service),
        Ok(None) => error_response("fetch service", MonitorError::NotFound(id)),
        Err(e) => error_response("fetch service", e),
    }
}

pub async fn update_service(
    state: web::Data<AppState>,
    path: web::Path<String>,
    body: web::Json<ServiceInput>,
) -> impl Responder {
    let id = match parse_service_id(&path) {
        Ok(id) => id,
        Err(response) => return response,
    };
    let draft = match ServiceDraft::try_from(body.into_inner()) {
        Ok(draft) => draft,
        Err(e) => return error_response("update service", e),
    };

    match state.service_store.update_service(id, draft).await {
        Ok(service) => HttpResponse::Ok().json(service),
        Err(e) => error_response("update service", e),
    }
}

/// Delete a service together with its status history
pub async fn delete_service(state: web::Data<AppState>, path: web::Path<String>) -> impl Responder {
    let id = match parse_service_id(&path) {
        Ok(id) => id,
        Err(response) => return response,
    };

    match state.service_store.delete_service(id).await {
        Ok(()) => HttpResponse::Ok().json(serde_json::json!({
            "message": "Service deleted successfully"
        })),
        Err(e) => error_response("delete service", e),
    }
}

/// Status history for a service, newest first
pub async fn get_status_history(
    state: web::Data<AppState>,
    path: web::Path<String>,
    query: web::Query<HistoryQuery>,
) -> impl Responder {
    let id = match parse_service_id(&path) {
        Ok(id) => id,
        Err(response) => return response,
    };
    let (days, limit) = match state.query_validator.validate_history(query.days, query.limit) {
        Ok(params) => params,
        Err(e) => return error_response("fetch status history", e),
    };

    match state.query_service.status_history(id, days, limit).await {
        Ok(history) => HttpResponse::Ok().json(history),
        Err(e) => error_response("fetch status history", e),
    }
}

/// Status history aggregated into fixed-width buckets
pub async fn get_uptime_history(
    state: web::Data<AppState>,
    path: web::Path<String>,
    query: web::Query<UptimeQuery>,
) -> impl Responder {
    let id = match parse_service_id(&path) {
        Ok(id) => id,
        Err(response) => return response,
    };
    let (days, buckets) = match state.query_validator.validate_uptime(query.days, query.buckets) {
        Ok(params) => params,
        Err(e) => return error_response("fetch uptime history", e),
    };

    match state.query_service.uptime_history(id, days, buckets).await {
        Ok(history) => HttpResponse::Ok().json(history),
        Err(e) => error_response("fetch uptime history", e),
    }
}

/// Latest status for every service
pub async fn get_latest_statuses(state: web::Data<AppState>) -> impl Responder {
    match state.query_service.latest_statuses().await {
        Ok(results) => HttpResponse::Ok().json(serde_json::json!({
            "success": true,
            "timestamp": Utc::now(),
            "results": results,
        })),
        Err(e) => error_response("fetch latest status", e),
    }
}

/// Run a check cycle on demand
pub async fn run_checks(state: web::Data<AppState>) -> impl Responder {
    match state.check_service.run_check_cycle().await {
        Ok(report) => HttpResponse::Ok().json(report.outcomes),
        Err(e) => error_response("check services", e),
    }
}

/// Run a check cycle for external schedulers. Requires `?key=` when
/// `CRON_API_KEY` is configured.
pub async fn run_scheduled_checks(
    state: web::Data<AppState>,
    query: web::Query<CronQuery>,
) -> impl Responder {
    if let Some(expected) = &state.cron_api_key {
        if query.key.as_deref() != Some(expected.as_str()) {
            log::warn!("Rejected scheduled check with missing or invalid key");
            return HttpResponse::Unauthorized().json(serde_json::json!({
                "error": "Unauthorized"
            }));
        }
    }

    match state.check_service.run_check_cycle().await {
        Ok(report) => HttpResponse::Ok().json(serde_json::json!({
            "success": report.failed_writes == 0,
            "timestamp": report.finished_at,
            "failedWrites": report.failed_writes,
            "results": report.outcomes,
        })),
        Err(e) => error_response("check services", e),
    }
}

fn parse_service_id(raw: &str) -> Result<Uuid, HttpResponse> {
    Uuid::parse_str(raw).map_err(|_| {
        HttpResponse::BadRequest().json(serde_json::json!({
            "error": "Invalid service ID"
        }))
    })
}

fn error_response(action: &str, error: MonitorError) -> HttpResponse {
    match error {
        MonitorError::Validation(reason) => {
            HttpResponse::BadRequest().json(serde_json::json!({ "error": reason }))
        }
        MonitorError::NotFound(_) => {
            HttpResponse::NotFound().json(serde_json::json!({ "error": "Service not found" }))
        }
        e => {
            log::error!("Failed to {}: {}", action, e);
            HttpResponse::InternalServerError().json(serde_json::json!({
                "error": format!("Failed to {}", action)
            }))
        }
    }
}
