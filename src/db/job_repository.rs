use std::future::Future;

use sqlx::{Pool, Postgres, QueryBuilder};
use thiserror::Error;
use tracing::debug;

use crate::db::query::JobQuery;
use crate::db::models::{JobRow, NewJob, JOB_COLUMNS};

/// Failures reported by a job store
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("a job with slug {slug:?} already exists")]
    DuplicateSlug { slug: String },

    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
}

/// Persistent storage for jobs
pub trait JobRepository: Send + Sync + 'static {
    /// Rows matching the listing predicate, newest first
    fn find_jobs(
        &self,
        query: &JobQuery,
    ) -> impl Future<Output = Result<Vec<JobRow>, StoreError>> + Send;

    /// Any job with this slug, approved or not
    fn find_by_slug(
        &self,
        slug: &str,
    ) -> impl Future<Output = Result<Option<JobRow>, StoreError>> + Send;

    /// Distinct non-empty locations of approved jobs, sorted
    fn distinct_locations(&self) -> impl Future<Output = Result<Vec<String>, StoreError>> + Send;

    fn approved_slugs(&self) -> impl Future<Output = Result<Vec<String>, StoreError>> + Send;

    /// Insert a new row; a taken slug is reported as [`StoreError::DuplicateSlug`]
    fn create(&self, job: &NewJob) -> impl Future<Output = Result<JobRow, StoreError>> + Send;

    /// Insert, or overwrite the row holding the same slug
    fn upsert_by_slug(
        &self,
        job: &NewJob,
    ) -> impl Future<Output = Result<JobRow, StoreError>> + Send;

    fn ping(&self) -> impl Future<Output = Result<(), StoreError>> + Send;
}

/// PostgreSQL-backed job store
#[derive(Clone)]
pub struct PgJobRepository {
    pool: Pool<Postgres>,
}

impl PgJobRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }
}

fn map_insert_error(err: sqlx::Error, slug: &str) -> StoreError {
    match &err {
        sqlx::Error::Database(db) if db.is_unique_violation() => StoreError::DuplicateSlug {
            slug: slug.to_string(),
        },
        _ => StoreError::Database(err),
    }
}

impl JobRepository for PgJobRepository {
    async fn find_jobs(&self, query: &JobQuery) -> Result<Vec<JobRow>, StoreError> {
        let mut builder = QueryBuilder::<Postgres>::new(format!("SELECT {} FROM jobs", JOB_COLUMNS));
        query.push_sql(&mut builder);
        debug!("Listing jobs: {}", builder.sql());

        let rows = builder
            .build_query_as::<JobRow>()
            .fetch_all(&self.pool)
            .await?;

        debug!("Listing returned {} jobs", rows.len());
        Ok(rows)
    }

    async fn find_by_slug(&self, slug: &str) -> Result<Option<JobRow>, StoreError> {
        let row = sqlx::query_as::<_, JobRow>(&format!(
            "SELECT {} FROM jobs WHERE slug = $1",
            JOB_COLUMNS
        ))
        .bind(slug)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row)
    }

    async fn distinct_locations(&self) -> Result<Vec<String>, StoreError> {
        let locations = sqlx::query_scalar::<_, String>(
            "SELECT DISTINCT location FROM jobs \
             WHERE approved = TRUE AND location IS NOT NULL AND location <> '' \
             ORDER BY location",
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(locations)
    }

    async fn approved_slugs(&self) -> Result<Vec<String>, StoreError> {
        let slugs = sqlx::query_scalar::<_, String>(
            "SELECT slug FROM jobs WHERE approved = TRUE ORDER BY created_at DESC",
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(slugs)
    }

    async fn create(&self, job: &NewJob) -> Result<JobRow, StoreError> {
        debug!("Creating job: slug={}", job.slug);

        let row = sqlx::query_as::<_, JobRow>(&format!(
            r#"
            INSERT INTO jobs (slug, title, job_type, location_type, location, description,
                salary, company_name, application_email, application_url, company_logo_url, approved)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12)
            RETURNING {}
            "#,
            JOB_COLUMNS
        ))
        .bind(&job.slug)
        .bind(&job.title)
        .bind(&job.job_type)
        .bind(&job.location_type)
        .bind(&job.location)
        .bind(&job.description)
        .bind(job.salary)
        .bind(&job.company_name)
        .bind(&job.application_email)
        .bind(&job.application_url)
        .bind(&job.company_logo_url)
        .bind(job.approved)
        .fetch_one(&self.pool)
        .await
        .map_err(|err| map_insert_error(err, &job.slug))?;

        debug!("Job created with id={}", row.id);
        Ok(row)
    }

    async fn upsert_by_slug(&self, job: &NewJob) -> Result<JobRow, StoreError> {
        let row = sqlx::query_as::<_, JobRow>(&format!(
            r#"
            INSERT INTO jobs (slug, title, job_type, location_type, location, description,
                salary, company_name, application_email, application_url, company_logo_url, approved)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12)
            ON CONFLICT (slug) DO UPDATE SET
                title = EXCLUDED.title,
                job_type = EXCLUDED.job_type,
                location_type = EXCLUDED.location_type,
                location = EXCLUDED.location,
                description = EXCLUDED.description,
                salary = EXCLUDED.salary,
                company_name = EXCLUDED.company_name,
                application_email = EXCLUDED.application_email,
                application_url = EXCLUDED.application_url,
                company_logo_url = EXCLUDED.company_logo_url,
                approved = EXCLUDED.approved,
                updated_at = NOW()
            RETURNING {}
            "#,
            JOB_COLUMNS
        ))
        .bind(&job.slug)
        .bind(&job.title)
        .bind(&job.job_type)
        .bind(&job.location_type)
        .bind(&job.location)
        .bind(&job.description)
        .bind(job.salary)
        .bind(&job.company_name)
        .bind(&job.application_email)
        .bind(&job.application_url)
        .bind(&job.company_logo_url)
        .bind(job.approved)
        .fetch_one(&self.pool)
        .await?;

        debug!("Upserted job slug={} id={}", row.slug, row.id);
        Ok(row)
    }

    async fn ping(&self) -> Result<(), StoreError> {
        sqlx::query("SELECT 1").fetch_one(&self.pool).await?;
        Ok(())
    }
}
