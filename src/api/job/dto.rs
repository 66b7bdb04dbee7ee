use chrono::Utc;
use serde::Serialize;

use super::format::{format_money, relative_date};
use super::markdown;
use crate::db::models::JobRow;

/// A job as shown in the listing
#[derive(Debug, Clone, Serialize)]
pub struct JobListItem {
    pub slug: String,
    pub title: String,
    pub company_name: String,
    pub job_type: String,
    pub location_type: String,
    pub location_label: String,
    pub salary_label: String,
    pub logo_url: Option<String>,
    pub posted: String,
}

impl JobListItem {
    pub fn from_row(job: &JobRow) -> Self {
        Self {
            slug: job.slug.clone(),
            title: job.title.clone(),
            company_name: job.company_name.clone(),
            job_type: job.job_type.clone(),
            location_type: job.location_type.clone(),
            location_label: location_label(job),
            salary_label: format_money(job.salary),
            logo_url: job.company_logo_url.clone(),
            posted: relative_date(job.created_at, Utc::now().naive_utc()),
        }
    }

    /// Stand-in for a missing logo
    pub fn initial(&self) -> String {
        self.company_name
            .chars()
            .next()
            .map(|c| c.to_uppercase().collect())
            .unwrap_or_default()
    }
}

/// A job as shown on its own page
#[derive(Debug, Clone, Serialize)]
pub struct JobDetail {
    pub slug: String,
    pub title: String,
    pub company_name: String,
    /// Origin of the application URL, when it is a URL at all
    pub company_url: Option<String>,
    pub job_type: String,
    pub location_type: String,
    pub location_label: String,
    pub salary_label: String,
    pub logo_url: Option<String>,
    /// Description rendered from Markdown
    pub description_html: Option<String>,
    pub apply_link: String,
    pub posted: String,
}

impl JobDetail {
    /// `None` when the job has no way to apply
    pub fn from_row(job: &JobRow) -> Option<Self> {
        let apply_link = job.application_link()?;

        Some(Self {
            slug: job.slug.clone(),
            title: job.title.clone(),
            company_name: job.company_name.clone(),
            company_url: job.application_url.as_deref().and_then(origin_of),
            job_type: job.job_type.clone(),
            location_type: job.location_type.clone(),
            location_label: location_label(job),
            salary_label: format_money(job.salary),
            logo_url: job.company_logo_url.clone(),
            description_html: job
                .description
                .as_deref()
                .filter(|d| !d.trim().is_empty())
                .map(markdown::render),
            apply_link,
            posted: relative_date(job.created_at, Utc::now().naive_utc()),
        })
    }
}

/// `<option>` entry for a select box
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectOption {
    pub value: String,
    pub label: String,
    pub selected: bool,
}

impl SelectOption {
    /// A leading "any" entry followed by `values`, marking `current` selected
    pub fn list<'a, I>(any_label: &str, values: I, current: Option<&str>) -> Vec<SelectOption>
    where
        I: IntoIterator<Item = &'a str>,
    {
        let current = current.unwrap_or_default();
        std::iter::once(("", any_label))
            .chain(values.into_iter().map(|v| (v, v)))
            .map(|(value, label)| SelectOption {
                value: value.to_string(),
                label: label.to_string(),
                selected: value == current,
            })
            .collect()
    }
}

fn location_label(job: &JobRow) -> String {
    job.location
        .clone()
        .filter(|l| !l.is_empty())
        .unwrap_or_else(|| "Worldwide".to_string())
}

fn origin_of(raw: &str) -> Option<String> {
    let url = url::Url::parse(raw).ok()?;
    let origin = url.origin();
    origin.is_tuple().then(|| origin.ascii_serialization())
}
