use std::borrow::Cow;

use serde::{Deserialize, Serialize};
use validator::{Validate, ValidationError, ValidationErrors};

use crate::db::query::{JobQuery, ListingCriteria};

/// Employment classifications a job may be posted under
pub const JOB_TYPES: &[&str] = &[
    "Full-time",
    "Part-time",
    "Contract",
    "Temporary",
    "Internship",
    "Volunteer",
];

pub const REMOTE: &str = "Remote";

/// Work arrangements a job may be posted under
pub const LOCATION_TYPES: &[&str] = &[REMOTE, "On-site", "Hybrid"];

/// Logos at or above this size are rejected
pub const MAX_LOGO_BYTES: usize = 2 * 1024 * 1024;

/// Filter parameters as they arrive in a query string or form body
#[derive(Debug, Default, Clone, Deserialize, Validate)]
pub struct RawJobFilter {
    pub q: Option<String>,
    #[serde(rename = "type")]
    pub job_type: Option<String>,
    pub location: Option<String>,
    pub remote: Option<String>,
}

/// Typed listing filter
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize)]
pub struct JobFilterValues {
    pub q: Option<String>,
    #[serde(rename = "type")]
    pub job_type: Option<String>,
    pub location: Option<String>,
    pub remote: Option<bool>,
}

impl JobFilterValues {
    /// Normalize raw parameters. Empty strings count as absent.
    pub fn parse(raw: RawJobFilter) -> Self {
        Self {
            q: raw.q.filter(|s| !s.trim().is_empty()),
            job_type: raw.job_type.filter(|s| !s.is_empty()),
            location: raw.location.filter(|s| !s.is_empty()),
            remote: raw.remote.as_deref().map(coerce_bool),
        }
    }

    /// Build from arbitrary key/value pairs; unknown keys are ignored and
    /// the last occurrence of a key wins.
    pub fn from_pairs<'a, I>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (&'a str, &'a str)>,
    {
        let mut raw = RawJobFilter::default();
        for (key, value) in pairs {
            let slot = match key {
                "q" => &mut raw.q,
                "type" => &mut raw.job_type,
                "location" => &mut raw.location,
                "remote" => &mut raw.remote,
                _ => continue,
            };
            *slot = Some(value.to_string());
        }
        Self::parse(raw)
    }

    pub fn is_remote(&self) -> bool {
        self.remote.unwrap_or(false)
    }

    /// Encode as the query string the listing page is bookmarked under.
    /// `q` is trimmed and `remote` only appears when set.
    pub fn to_query_string(&self) -> String {
        let mut serializer = url::form_urlencoded::Serializer::new(String::new());
        if let Some(q) = self.q.as_deref().map(str::trim).filter(|q| !q.is_empty()) {
            serializer.append_pair("q", q);
        }
        if let Some(job_type) = &self.job_type {
            serializer.append_pair("type", job_type);
        }
        if let Some(location) = &self.location {
            serializer.append_pair("location", location);
        }
        if self.is_remote() {
            serializer.append_pair("remote", "true");
        }
        serializer.finish()
    }

    /// Listing page URL carrying this filter
    pub fn listing_url(&self) -> String {
        let query = self.to_query_string();
        if query.is_empty() {
            "/".to_string()
        } else {
            format!("/?{}", query)
        }
    }

    /// Store query for the approved jobs this filter selects.
    /// The remote flag narrows to `Remote` location types.
    pub fn to_query(&self) -> JobQuery {
        JobQuery::approved(&ListingCriteria {
            search: self.q.as_deref(),
            job_type: self.job_type.as_deref(),
            location: self.location.as_deref(),
            location_type: self.is_remote().then_some(REMOTE),
        })
    }

    /// Heading for the listing page, e.g. "Remote developer jobs in Berlin"
    pub fn title(&self) -> String {
        let prefix = if let Some(q) = &self.q {
            format!("{} jobs", q.trim())
        } else if let Some(job_type) = &self.job_type {
            format!("{} developer jobs", job_type)
        } else if self.is_remote() {
            "Remote developer jobs".to_string()
        } else {
            "All developer jobs".to_string()
        };

        match &self.location {
            Some(location) => format!("{} in {}", prefix, location),
            None => prefix,
        }
    }
}

/// Truthy coercion: any non-empty value, `"false"` included, is true.
fn coerce_bool(value: &str) -> bool {
    !value.is_empty()
}

/// An uploaded logo as seen by validation
#[derive(Debug, Clone, Serialize)]
pub struct LogoFile {
    pub content_type: Option<String>,
    pub size: usize,
}

/// A job posting as submitted through the form, before persistence.
///
/// Optional text fields hold `None` for blank input. Single-field rules are
/// declared here; rules spanning fields are applied by [`JobSubmission::check`].
#[derive(Debug, Default, Clone, Validate)]
pub struct JobSubmission {
    #[validate(custom(function = "required"), length(max = 100, message = "Must be at most 100 characters"))]
    pub title: String,

    #[validate(custom(function = "required"), length(max = 100, message = "Must be at most 100 characters"))]
    pub company_name: String,

    #[validate(custom(function = "job_type_rule"))]
    pub job_type: String,

    #[validate(custom(function = "image_under_limit"))]
    pub company_logo: Option<LogoFile>,

    #[validate(length(max = 5000, message = "Must be at most 5000 characters"))]
    pub description: Option<String>,

    #[validate(custom(function = "salary_rule"))]
    pub salary: String,

    #[validate(
        length(max = 100, message = "Must be at most 100 characters"),
        email(message = "Invalid email address")
    )]
    pub application_email: Option<String>,

    // Same email rule as above, not a URL rule.
    #[validate(
        length(max = 100, message = "Must be at most 100 characters"),
        email(message = "Invalid email address")
    )]
    pub application_url: Option<String>,

    #[validate(custom(function = "location_type_rule"))]
    pub location_type: String,

    #[validate(length(max = 100, message = "Must be at most 100 characters"))]
    pub location: Option<String>,
}

impl JobSubmission {
    /// Run every field rule plus the cross-field rules
    pub fn check(&self) -> Result<(), ValidationErrors> {
        let mut errors = match self.validate() {
            Ok(()) => ValidationErrors::new(),
            Err(errors) => errors,
        };

        if self.application_email.is_none() && self.application_url.is_none() {
            errors.add(
                "application_email",
                error("contact_required", "Email or url is required"),
            );
        }

        if !self.location_type.is_empty()
            && self.location_type != REMOTE
            && self.location.is_none()
        {
            errors.add(
                "location",
                error("location_required", "Location is required for on-site jobs"),
            );
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }

    pub fn check_fields(&self) -> Result<(), Vec<FieldError>> {
        self.check().map_err(|errors| FieldError::collect(&errors))
    }
}

/// One (field, message) validation failure
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldError {
    pub field: String,
    pub message: String,
}

impl FieldError {
    /// Flatten validator output into a stable, sorted list
    pub fn collect(errors: &ValidationErrors) -> Vec<FieldError> {
        let mut fields: Vec<FieldError> = errors
            .field_errors()
            .into_iter()
            .flat_map(|(field, errors)| {
                errors.iter().map(move |e| FieldError {
                    field: field.to_string(),
                    message: e
                        .message
                        .as_ref()
                        .map(|m| m.to_string())
                        .unwrap_or_else(|| format!("Invalid value for {}", field)),
                })
            })
            .collect();
        fields.sort_by(|a, b| a.field.cmp(&b.field).then_with(|| a.message.cmp(&b.message)));
        fields
    }
}

fn error(code: &'static str, message: &'static str) -> ValidationError {
    let mut err = ValidationError::new(code);
    err.message = Some(Cow::Borrowed(message));
    err
}

fn required(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(error("required", "Required"));
    }
    Ok(())
}

fn job_type_rule(value: &str) -> Result<(), ValidationError> {
    required(value)?;
    if !JOB_TYPES.contains(&value) {
        return Err(error("job_type", "Invalid job type"));
    }
    Ok(())
}

fn location_type_rule(value: &str) -> Result<(), ValidationError> {
    required(value)?;
    if !LOCATION_TYPES.contains(&value) {
        return Err(error("location_type", "Invalid location type"));
    }
    Ok(())
}

fn salary_rule(value: &str) -> Result<(), ValidationError> {
    required(value)?;
    if !value.chars().all(|c| c.is_ascii_digit()) {
        return Err(error("salary_digits", "Must be a number"));
    }
    if value.len() > 9 {
        return Err(error("salary_length", "Number can't be longer than 9 digits"));
    }
    Ok(())
}

fn image_under_limit(logo: &LogoFile) -> Result<(), ValidationError> {
    let is_image = logo
        .content_type
        .as_deref()
        .is_some_and(|ct| ct.starts_with("image/"));
    if !is_image {
        return Err(error("logo_type", "Must be an image file"));
    }
    if logo.size >= MAX_LOGO_BYTES {
        return Err(error("logo_size", "File must be less than 2MB"));
    }
    Ok(())
}
