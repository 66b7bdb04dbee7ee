use askama::Template;

use super::dto::{JobDetail, JobListItem, SelectOption};
use super::models::{FieldError, JobFilterValues, JOB_TYPES, LOCATION_TYPES};

#[derive(Template)]
#[template(path = "index.html")]
pub struct IndexPage {
    pub heading: String,
    pub q: String,
    pub remote: bool,
    pub type_options: Vec<SelectOption>,
    pub location_options: Vec<SelectOption>,
    pub jobs: Vec<JobListItem>,
}

impl IndexPage {
    pub fn new(filter: &JobFilterValues, jobs: Vec<JobListItem>, locations: &[String]) -> Self {
        Self {
            heading: filter.title(),
            q: filter.q.clone().unwrap_or_default(),
            remote: filter.is_remote(),
            type_options: SelectOption::list(
                "All Types",
                JOB_TYPES.iter().copied(),
                filter.job_type.as_deref(),
            ),
            location_options: SelectOption::list(
                "All Locations",
                locations.iter().map(String::as_str),
                filter.location.as_deref(),
            ),
            jobs,
        }
    }
}

#[derive(Template)]
#[template(path = "job.html")]
pub struct JobPage {
    pub job: JobDetail,
}

/// Text values echoed back into the posting form
#[derive(Debug, Default, Clone)]
pub struct FormValues {
    pub title: String,
    pub company_name: String,
    pub description: String,
    pub salary: String,
    pub application_email: String,
    pub application_url: String,
    pub location: String,
}

#[derive(Template)]
#[template(path = "new_job.html")]
pub struct NewJobPage {
    pub values: FormValues,
    pub type_options: Vec<SelectOption>,
    pub location_type_options: Vec<SelectOption>,
    pub errors: Vec<FieldError>,
}

impl NewJobPage {
    pub fn new(
        values: FormValues,
        job_type: Option<&str>,
        location_type: Option<&str>,
        errors: Vec<FieldError>,
    ) -> Self {
        Self {
            values,
            type_options: SelectOption::list("Select an option", JOB_TYPES.iter().copied(), job_type),
            location_type_options: SelectOption::list(
                "Select an option",
                LOCATION_TYPES.iter().copied(),
                location_type,
            ),
            errors,
        }
    }

    pub fn empty() -> Self {
        Self::new(FormValues::default(), None, None, Vec::new())
    }

    /// Messages for one field, joined for display
    pub fn error_for(&self, field: &str) -> String {
        self.errors
            .iter()
            .filter(|e| e.field == field)
            .map(|e| e.message.as_str())
            .collect::<Vec<_>>()
            .join(". ")
    }
}

#[derive(Template)]
#[template(path = "job_submitted.html")]
pub struct JobSubmittedPage;

#[derive(Template)]
#[template(path = "not_found.html")]
pub struct NotFoundPage;
