use sqlx::{Postgres, QueryBuilder};

use crate::db::models::JobRow;

/// Columns a listing predicate can reference
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Column {
    Title,
    CompanyName,
    LocationType,
    Location,
    JobType,
    Approved,
}

impl Column {
    pub fn as_sql(self) -> &'static str {
        match self {
            Column::Title => "title",
            Column::CompanyName => "company_name",
            Column::LocationType => "location_type",
            Column::Location => "location",
            Column::JobType => "job_type",
            Column::Approved => "approved",
        }
    }

    fn text(self, job: &JobRow) -> Option<&str> {
        match self {
            Column::Title => Some(&job.title),
            Column::CompanyName => Some(&job.company_name),
            Column::LocationType => Some(&job.location_type),
            Column::Location => job.location.as_deref(),
            Column::JobType => Some(&job.job_type),
            Column::Approved => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Value {
    Text(String),
    Bool(bool),
}

/// A predicate over job rows
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Condition {
    /// Full-text match of an AND-of-terms expression (`a & b`)
    Search { column: Column, expression: String },
    Equals { column: Column, value: Value },
    Or(Vec<Condition>),
    And(Vec<Condition>),
}

impl Condition {
    fn push_sql(&self, builder: &mut QueryBuilder<'_, Postgres>) {
        match self {
            Condition::Search { column, expression } => {
                builder.push(format_args!(
                    "to_tsvector(coalesce({}, '')) @@ to_tsquery(",
                    column.as_sql()
                ));
                builder.push_bind(expression.clone());
                builder.push(")");
            }
            Condition::Equals { column, value } => {
                builder.push(format_args!("{} = ", column.as_sql()));
                match value {
                    Value::Text(text) => builder.push_bind(text.clone()),
                    Value::Bool(flag) => builder.push_bind(*flag),
                };
            }
            Condition::Or(conditions) => push_group(builder, conditions, " OR ", "FALSE"),
            Condition::And(conditions) => push_group(builder, conditions, " AND ", "TRUE"),
        }
    }

    /// Evaluate against a row held in memory. Text search is approximated:
    /// every term must occur as a case-insensitive word of the column.
    pub fn matches(&self, job: &JobRow) -> bool {
        match self {
            Condition::Search { column, expression } => {
                let words: Vec<String> = column
                    .text(job)
                    .unwrap_or_default()
                    .split(|c: char| !c.is_alphanumeric())
                    .filter(|w| !w.is_empty())
                    .map(str::to_lowercase)
                    .collect();
                expression
                    .split('&')
                    .map(|term| term.trim().to_lowercase())
                    .filter(|term| !term.is_empty())
                    .all(|term| words.contains(&term))
            }
            Condition::Equals { column, value } => match (column, value) {
                (Column::Approved, Value::Bool(flag)) => job.approved == *flag,
                (column, Value::Text(text)) => column.text(job) == Some(text.as_str()),
                _ => false,
            },
            Condition::Or(conditions) => conditions.iter().any(|c| c.matches(job)),
            Condition::And(conditions) => conditions.iter().all(|c| c.matches(job)),
        }
    }
}

fn push_group(
    builder: &mut QueryBuilder<'_, Postgres>,
    conditions: &[Condition],
    separator: &str,
    empty: &str,
) {
    if conditions.is_empty() {
        builder.push(empty);
        return;
    }
    builder.push("(");
    for (i, condition) in conditions.iter().enumerate() {
        if i > 0 {
            builder.push(separator);
        }
        condition.push_sql(builder);
    }
    builder.push(")");
}

/// Join the whitespace-separated words of `q` with the AND-of-terms operator.
/// Returns `None` when no words remain.
pub fn search_expression(q: &str) -> Option<String> {
    let terms: Vec<&str> = q.split_whitespace().collect();
    if terms.is_empty() {
        None
    } else {
        Some(terms.join(" & "))
    }
}

/// What a listing may be narrowed by. Every field is optional.
#[derive(Debug, Default, Clone, Copy)]
pub struct ListingCriteria<'a> {
    /// Free text, split on whitespace into AND-ed terms
    pub search: Option<&'a str>,
    pub job_type: Option<&'a str>,
    pub location: Option<&'a str>,
    pub location_type: Option<&'a str>,
}

/// The predicate and ordering used by the listing page
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JobQuery {
    pub predicate: Condition,
}

impl JobQuery {
    /// Approved jobs narrowed by `criteria`
    pub fn approved(criteria: &ListingCriteria<'_>) -> Self {
        let mut all = Vec::new();

        if let Some(expression) = criteria.search.and_then(search_expression) {
            let searchable = [
                Column::Title,
                Column::CompanyName,
                Column::LocationType,
                Column::Location,
                Column::JobType,
            ];
            all.push(Condition::Or(
                searchable
                    .into_iter()
                    .map(|column| Condition::Search {
                        column,
                        expression: expression.clone(),
                    })
                    .collect(),
            ));
        }

        if let Some(job_type) = criteria.job_type {
            all.push(text_equals(Column::JobType, job_type));
        }
        if let Some(location) = criteria.location {
            all.push(text_equals(Column::Location, location));
        }
        if let Some(location_type) = criteria.location_type {
            all.push(text_equals(Column::LocationType, location_type));
        }
        all.push(Condition::Equals {
            column: Column::Approved,
            value: Value::Bool(true),
        });

        Self {
            predicate: Condition::And(all),
        }
    }

    /// Append `WHERE ... ORDER BY ...` to a `SELECT ... FROM jobs` builder
    pub fn push_sql(&self, builder: &mut QueryBuilder<'_, Postgres>) {
        builder.push(" WHERE ");
        self.predicate.push_sql(builder);
        builder.push(" ORDER BY created_at DESC");
    }

    pub fn matches(&self, job: &JobRow) -> bool {
        self.predicate.matches(job)
    }
}

fn text_equals(column: Column, value: &str) -> Condition {
    Condition::Equals {
        column,
        value: Value::Text(value.to_string()),
    }
}
