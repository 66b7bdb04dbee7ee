use actix_web::{
    http::{header::ContentType, StatusCode},
    HttpResponse, ResponseError,
};
use askama::Template;
use thiserror::Error;
use tracing::{error, info, warn};

use super::dto::{JobDetail, JobListItem};
use super::models::{FieldError, JobFilterValues, JobSubmission};
use super::slug::job_slug;
use super::templates::NotFoundPage;
use crate::api::validation::ErrorResponse;
use crate::db::job_repository::{JobRepository, StoreError};
use crate::db::models::{JobRow, NewJob};

/// Service-level errors
#[derive(Debug, Error)]
pub enum ServiceError {
    /// Store operation failed
    #[error("store error: {0}")]
    Store(#[from] StoreError),

    /// Submission failed validation
    #[error("validation failed on {} field(s)", .0.len())]
    Validation(Vec<FieldError>),

    /// Nothing to show at this path
    #[error("not found: {0}")]
    NotFound(String),

    #[error("template error: {0}")]
    Render(#[from] askama::Error),

    /// Logo could not be written or read
    #[error("storage error: {0}")]
    Storage(#[from] std::io::Error),
}

impl ResponseError for ServiceError {
    fn status_code(&self) -> StatusCode {
        match self {
            ServiceError::Validation(_) => StatusCode::BAD_REQUEST,
            ServiceError::NotFound(_) => StatusCode::NOT_FOUND,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        match self {
            ServiceError::Store(e) => {
                error!("Store error: {}", e);
                HttpResponse::InternalServerError().json(ErrorResponse {
                    error: "Failed to process request".to_string(),
                    fields: serde_json::json!({"message": "Database error occurred"}),
                })
            }
            ServiceError::Validation(errors) => {
                warn!("Validation error: {:?}", errors);
                HttpResponse::BadRequest().json(ErrorResponse {
                    error: "Validation failed".to_string(),
                    fields: serde_json::json!(errors),
                })
            }
            ServiceError::NotFound(slug) => {
                warn!("Not found: {}", slug);
                let body = NotFoundPage.render().unwrap_or_else(|_| "Not found".to_string());
                HttpResponse::NotFound()
                    .content_type(ContentType::html())
                    .body(body)
            }
            ServiceError::Render(e) => {
                error!("Template error: {}", e);
                HttpResponse::InternalServerError().body("Failed to render page")
            }
            ServiceError::Storage(e) => {
                error!("Storage error: {}", e);
                HttpResponse::InternalServerError().body("Failed to store file")
            }
        }
    }
}

/// Everything the listing page shows
pub struct Listing {
    pub jobs: Vec<JobListItem>,
    pub locations: Vec<String>,
}

/// Job service containing business logic over an injected store
pub struct JobService<R> {
    repo: R,
}

impl<R: JobRepository> JobService<R> {
    pub fn new(repo: R) -> Self {
        Self { repo }
    }

    pub fn repository(&self) -> &R {
        &self.repo
    }

    /// Approved jobs matching `filter`, newest first
    pub async fn find_jobs(&self, filter: &JobFilterValues) -> Result<Vec<JobRow>, ServiceError> {
        Ok(self.repo.find_jobs(&filter.to_query()).await?)
    }

    /// Matching jobs plus the sidebar's location choices
    pub async fn listing(&self, filter: &JobFilterValues) -> Result<Listing, ServiceError> {
        let jobs = self.find_jobs(filter).await?;
        let locations = self.repo.distinct_locations().await?;
        info!("Service: Listing {} jobs for filter {:?}", jobs.len(), filter);

        Ok(Listing {
            jobs: jobs.iter().map(JobListItem::from_row).collect(),
            locations,
        })
    }

    /// Look a job up by slug, approved or not
    pub async fn find_job(&self, slug: &str) -> Result<JobRow, ServiceError> {
        self.repo
            .find_by_slug(slug)
            .await?
            .ok_or_else(|| ServiceError::NotFound(slug.to_string()))
    }

    /// Resolve the detail page. A job nobody can apply to is treated as absent.
    pub async fn resolve_job_page(&self, slug: &str) -> Result<JobDetail, ServiceError> {
        let job = self.find_job(slug).await?;

        match JobDetail::from_row(&job) {
            Some(detail) => Ok(detail),
            None => {
                error!("Job has no application link or email: slug={}", slug);
                Err(ServiceError::NotFound(slug.to_string()))
            }
        }
    }

    /// Slugs of every page to prerender
    pub async fn approved_slugs(&self) -> Result<Vec<String>, ServiceError> {
        Ok(self.repo.approved_slugs().await?)
    }

    /// Validate and persist a posting. New jobs always await approval.
    pub async fn create_job(
        &self,
        submission: &JobSubmission,
        company_logo_url: Option<String>,
    ) -> Result<JobRow, ServiceError> {
        submission.check_fields().map_err(ServiceError::Validation)?;

        let salary = submission.salary.parse::<i32>().map_err(|_| {
            ServiceError::Validation(vec![FieldError {
                field: "salary".into(),
                message: "Must be a number".into(),
            }])
        })?;

        let new_job = NewJob {
            slug: job_slug(&submission.company_name, &submission.title),
            title: submission.title.clone(),
            job_type: submission.job_type.clone(),
            location_type: submission.location_type.clone(),
            location: submission.location.clone(),
            description: submission.description.clone(),
            salary,
            company_name: submission.company_name.clone(),
            application_email: submission.application_email.clone(),
            application_url: submission.application_url.clone(),
            company_logo_url,
            approved: false,
        };

        info!("Service: Creating job with slug={}", new_job.slug);
        let row = self.repo.create(&new_job).await?;
        info!("Service: Job created successfully with id={}", row.id);

        Ok(row)
    }
}
