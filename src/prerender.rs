use std::path::Path;

use askama::Template;
use tracing::{info, warn};

use crate::api::job::templates::JobPage;
use crate::api::job::{JobService, ServiceError};
use crate::db::job_repository::JobRepository;

/// Write `<out_dir>/jobs/<slug>/index.html` for every approved job.
/// Jobs whose page resolves to not-found are skipped. Returns the slugs written.
pub async fn prerender<R: JobRepository>(
    service: &JobService<R>,
    out_dir: &Path,
) -> Result<Vec<String>, ServiceError> {
    let slugs = service.approved_slugs().await?;
    info!("Prerendering {} job pages into {}", slugs.len(), out_dir.display());

    let mut written = Vec::with_capacity(slugs.len());
    for slug in slugs {
        let job = match service.resolve_job_page(&slug).await {
            Ok(job) => job,
            Err(ServiceError::NotFound(_)) => {
                warn!("Skipping job {}: no page to render", slug);
                continue;
            }
            Err(e) => return Err(e),
        };

        let dir = out_dir.join("jobs").join(&slug);
        std::fs::create_dir_all(&dir)?;
        std::fs::write(dir.join("index.html"), JobPage { job }.render()?)?;
        written.push(slug);
    }

    info!("Prerendered {} job pages", written.len());
    Ok(written)
}
