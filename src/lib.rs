pub mod api;
pub mod cli;
pub mod config;
pub mod db;
pub mod logging;
pub mod prerender;
pub mod shutdown;
pub mod storage;

use actix_web::web;

use crate::api::{health::health_config, job::handlers::job_config};
use crate::db::job_repository::JobRepository;

/// Every route the server exposes, over the store `R`
pub fn routes<R: JobRepository>(cfg: &mut web::ServiceConfig) {
    cfg.configure(health_config::<R>).configure(job_config::<R>);
}
