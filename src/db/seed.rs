use futures_util::future::try_join_all;
use tracing::info;

use crate::db::job_repository::{JobRepository, StoreError};
use crate::db::models::NewJob;

const PLACEHOLDER_JOBS: &str = include_str!("../../seed/placeholder_jobs.json");

/// The fixed dataset written by `seed`
pub fn placeholder_jobs() -> Result<Vec<NewJob>, serde_json::Error> {
    serde_json::from_str(PLACEHOLDER_JOBS)
}

/// Upsert every job keyed by slug; running it twice leaves the same rows
pub async fn seed<R: JobRepository>(repo: &R, jobs: &[NewJob]) -> Result<usize, StoreError> {
    info!("Seeding {} jobs", jobs.len());

    let rows = try_join_all(jobs.iter().map(|job| repo.upsert_by_slug(job))).await?;

    info!("Seeded {} jobs", rows.len());
    Ok(rows.len())
}
