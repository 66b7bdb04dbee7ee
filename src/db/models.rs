use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Database representation of a job with all fields
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct JobRow {
    pub id: i32,
    pub slug: String,
    pub title: String,
    pub job_type: String,
    pub location_type: String,
    pub location: Option<String>,
    pub description: Option<String>,
    pub salary: i32,
    pub company_name: String,
    pub application_email: Option<String>,
    pub application_url: Option<String>,
    pub company_logo_url: Option<String>,
    pub approved: bool,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

impl JobRow {
    /// Where applicants are sent: `mailto:` for an email contact, else the URL
    pub fn application_link(&self) -> Option<String> {
        match (non_empty(&self.application_email), non_empty(&self.application_url)) {
            (Some(email), _) => Some(format!("mailto:{}", email)),
            (None, Some(url)) => Some(url.to_string()),
            (None, None) => None,
        }
    }
}

/// Column values for an insert or upsert; `id` and timestamps come from the store
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewJob {
    pub slug: String,
    pub title: String,
    #[serde(rename = "type")]
    pub job_type: String,
    pub location_type: String,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    pub salary: i32,
    pub company_name: String,
    #[serde(default)]
    pub application_email: Option<String>,
    #[serde(default)]
    pub application_url: Option<String>,
    #[serde(default)]
    pub company_logo_url: Option<String>,
    #[serde(default)]
    pub approved: bool,
}

fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|s| !s.trim().is_empty())
}

pub const JOB_COLUMNS: &str = "id, slug, title, job_type, location_type, location, description, \
    salary, company_name, application_email, application_url, company_logo_url, approved, \
    created_at, updated_at";
