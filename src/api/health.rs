use actix_web::{web, HttpResponse, Responder};
use serde::Serialize;
use tracing::error;

use crate::api::job::JobService;
use crate::db::job_repository::JobRepository;

#[derive(Serialize)]
struct CheckResponse {
    status: &'static str,
    store: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

/// Ping the job store and report `up`/`down` under the check's own wording
async fn check_store<R: JobRepository>(
    service: &JobService<R>,
    check: &str,
    up: &'static str,
    down: &'static str,
) -> HttpResponse {
    match service.repository().ping().await {
        Ok(()) => HttpResponse::Ok().json(CheckResponse {
            status: up,
            store: "connected",
            error: None,
        }),
        Err(e) => {
            error!("{} check failed, job store unreachable: {:?}", check, e);
            HttpResponse::ServiceUnavailable().json(CheckResponse {
                status: down,
                store: "disconnected",
                error: Some(e.to_string()),
            })
        }
    }
}

/// Uptime monitors: is the board serving and can it reach its jobs
async fn health_check<R: JobRepository>(service: web::Data<JobService<R>>) -> impl Responder {
    check_store(&service, "Health", "healthy", "unhealthy").await
}

async fn readiness_check<R: JobRepository>(service: web::Data<JobService<R>>) -> impl Responder {
    check_store(&service, "Readiness", "ready", "not_ready").await
}

/// Process is up; the store is not consulted
async fn liveness_check() -> impl Responder {
    HttpResponse::Ok().json(CheckResponse {
        status: "alive",
        store: "not_checked",
        error: None,
    })
}

pub fn health_config<R: JobRepository>(config: &mut web::ServiceConfig) {
    config
        .route("/health", web::get().to(health_check::<R>))
        .route("/ready", web::get().to(readiness_check::<R>))
        .route("/live", web::get().to(liveness_check));
}
