use actix_multipart::form::{tempfile::TempFile, text::Text, MultipartForm};
use actix_web::{
    http::{
        header::{self, ContentType},
        StatusCode,
    },
    web::{self, Data, ServiceConfig},
    HttpResponse,
};
use actix_web_validator::{Form, Query};
use askama::Template;
use tracing::{info, warn};

use super::models::{JobFilterValues, JobSubmission, LogoFile, RawJobFilter};
use super::service::{JobService, ServiceError};
use super::templates::{FormValues, IndexPage, JobPage, JobSubmittedPage, NewJobPage, NotFoundPage};
use crate::db::job_repository::JobRepository;
use crate::storage::LogoStore;

fn html(status: StatusCode, body: String) -> HttpResponse {
    HttpResponse::build(status)
        .content_type(ContentType::html())
        .body(body)
}

fn see_other(location: &str) -> HttpResponse {
    HttpResponse::SeeOther()
        .insert_header((header::LOCATION, location))
        .finish()
}

/// Listing page: approved jobs matching the query-string filter
async fn list_jobs<R: JobRepository>(
    service: Data<JobService<R>>,
    params: Query<RawJobFilter>,
) -> Result<HttpResponse, ServiceError> {
    let filter = JobFilterValues::parse(params.into_inner());
    let listing = service.listing(&filter).await?;

    let page = IndexPage::new(&filter, listing.jobs, &listing.locations);
    Ok(html(StatusCode::OK, page.render()?))
}

/// Filter form submission: redirect to the bookmarkable listing URL
async fn filter_jobs(form: Form<RawJobFilter>) -> HttpResponse {
    let filter = JobFilterValues::parse(form.into_inner());
    see_other(&filter.listing_url())
}

async fn job_page<R: JobRepository>(
    service: Data<JobService<R>>,
    slug: web::Path<String>,
) -> Result<HttpResponse, ServiceError> {
    let job = service.resolve_job_page(&slug).await?;
    Ok(html(StatusCode::OK, JobPage { job }.render()?))
}

async fn new_job_form() -> Result<HttpResponse, ServiceError> {
    Ok(html(StatusCode::OK, NewJobPage::empty().render()?))
}

async fn job_submitted() -> Result<HttpResponse, ServiceError> {
    Ok(html(StatusCode::OK, JobSubmittedPage.render()?))
}

pub async fn not_found() -> Result<HttpResponse, ServiceError> {
    Ok(html(StatusCode::NOT_FOUND, NotFoundPage.render()?))
}

/// Multipart body of the job posting form
#[derive(MultipartForm)]
pub struct JobUploadForm {
    title: Option<Text<String>>,
    job_type: Option<Text<String>>,
    company_name: Option<Text<String>>,
    company_logo: Option<TempFile>,
    description: Option<Text<String>>,
    salary: Option<Text<String>>,
    application_email: Option<Text<String>>,
    application_url: Option<Text<String>>,
    location_type: Option<Text<String>>,
    location: Option<Text<String>>,
}

fn text(field: Option<Text<String>>) -> String {
    field.map(Text::into_inner).unwrap_or_default()
}

fn optional(value: &str) -> Option<String> {
    let value = value.trim();
    (!value.is_empty()).then(|| value.to_string())
}

impl JobUploadForm {
    /// Split into the values to echo back, the trimmed submission to validate,
    /// and the logo file. An empty file input counts as no logo.
    fn into_parts(self) -> (FormValues, JobSubmission, Option<TempFile>) {
        let values = FormValues {
            title: text(self.title),
            company_name: text(self.company_name),
            description: text(self.description),
            salary: text(self.salary),
            application_email: text(self.application_email),
            application_url: text(self.application_url),
            location: text(self.location),
        };
        let logo = self.company_logo.filter(|file| file.size > 0);

        let submission = JobSubmission {
            title: values.title.trim().to_string(),
            company_name: values.company_name.trim().to_string(),
            job_type: text(self.job_type),
            company_logo: logo.as_ref().map(|file| LogoFile {
                content_type: file.content_type.as_ref().map(|m| m.essence_str().to_string()),
                size: file.size,
            }),
            description: optional(&values.description),
            salary: values.salary.trim().to_string(),
            application_email: optional(&values.application_email),
            application_url: optional(&values.application_url),
            location_type: text(self.location_type),
            location: optional(&values.location),
        };

        (values, submission, logo)
    }
}

/// Job posting submission. Invalid input re-renders the form; nothing is stored.
async fn create_job<R: JobRepository>(
    service: Data<JobService<R>>,
    logos: Data<LogoStore>,
    MultipartForm(form): MultipartForm<JobUploadForm>,
) -> Result<HttpResponse, ServiceError> {
    let (values, submission, logo) = form.into_parts();

    if let Err(errors) = submission.check_fields() {
        warn!("Job submission rejected: {:?}", errors);
        let page = NewJobPage::new(
            values,
            Some(submission.job_type.as_str()),
            Some(submission.location_type.as_str()),
            errors,
        );
        return Ok(html(StatusCode::BAD_REQUEST, page.render()?));
    }

    let logo_url = match logo {
        Some(file) => {
            let store = logos.get_ref().clone();
            let url = web::block(move || {
                store.save(
                    file.file.path(),
                    file.content_type.as_ref().map(|m| m.essence_str()),
                    file.file_name.as_deref(),
                )
            })
            .await
            .map_err(|e| ServiceError::Storage(std::io::Error::other(e.to_string())))??;
            Some(url)
        }
        None => None,
    };

    let job = match service.create_job(&submission, logo_url.clone()).await {
        Ok(job) => job,
        Err(e) => {
            if let Some(url) = logo_url {
                discard_logo(&logos, url).await;
            }
            return Err(e);
        }
    };
    info!("Job {} submitted for approval", job.slug);

    Ok(see_other("/job-submitted"))
}

/// Drop a logo no job row will point to
async fn discard_logo(logos: &LogoStore, url: String) {
    let store = logos.clone();
    match web::block(move || store.remove(&url)).await {
        Ok(Ok(())) => {}
        Ok(Err(e)) => warn!("Failed to remove orphaned logo: {}", e),
        Err(e) => warn!("Failed to remove orphaned logo: {}", e),
    }
}

async fn serve_logo(
    logos: Data<LogoStore>,
    name: web::Path<String>,
) -> Result<HttpResponse, ServiceError> {
    let name = name.into_inner();
    let store = logos.get_ref().clone();
    let lookup = name.clone();
    let stored = web::block(move || store.load(&lookup))
        .await
        .map_err(|e| ServiceError::Storage(std::io::Error::other(e.to_string())))??;

    match stored {
        Some((bytes, content_type)) => Ok(HttpResponse::Ok()
            .content_type(content_type)
            .insert_header((header::CACHE_CONTROL, "public, max-age=31536000, immutable"))
            .body(bytes)),
        None => Err(ServiceError::NotFound(name)),
    }
}

pub fn job_config<R: JobRepository>(config: &mut ServiceConfig) {
    config
        .service(web::resource("/").route(web::get().to(list_jobs::<R>)))
        .service(web::resource("/filter").route(web::post().to(filter_jobs)))
        .service(
            web::resource("/jobs/new")
                .route(web::get().to(new_job_form))
                .route(web::post().to(create_job::<R>)),
        )
        .service(web::resource("/job-submitted").route(web::get().to(job_submitted)))
        .service(web::resource("/jobs/{slug}").route(web::get().to(job_page::<R>)))
        .service(web::resource("/uploads/logos/{name}").route(web::get().to(serve_logo)));
}
