use std::sync::Mutex;

use chrono::{NaiveDateTime, Utc};

use crate::db::query::JobQuery;
use crate::db::job_repository::{JobRepository, StoreError};
use crate::db::models::{JobRow, NewJob};

/// Job store kept in process memory, with the same slug uniqueness and
/// listing semantics as the database. Used by the test suites.
#[derive(Default)]
pub struct InMemoryJobRepository {
    state: Mutex<State>,
}

#[derive(Default)]
struct State {
    next_id: i32,
    jobs: Vec<JobRow>,
}

impl State {
    fn allocate_id(&mut self) -> i32 {
        self.next_id += 1;
        self.next_id
    }
}

fn to_row(id: i32, job: &NewJob, created_at: NaiveDateTime) -> JobRow {
    JobRow {
        id,
        slug: job.slug.clone(),
        title: job.title.clone(),
        job_type: job.job_type.clone(),
        location_type: job.location_type.clone(),
        location: job.location.clone(),
        description: job.description.clone(),
        salary: job.salary,
        company_name: job.company_name.clone(),
        application_email: job.application_email.clone(),
        application_url: job.application_url.clone(),
        company_logo_url: job.company_logo_url.clone(),
        approved: job.approved,
        created_at,
        updated_at: created_at,
    }
}

impl InMemoryJobRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert with an explicit creation time; fails on a taken slug
    pub fn insert_at(&self, job: &NewJob, created_at: NaiveDateTime) -> Result<JobRow, StoreError> {
        let mut state = self.state.lock().unwrap_or_else(|e| e.into_inner());
        if state.jobs.iter().any(|j| j.slug == job.slug) {
            return Err(StoreError::DuplicateSlug {
                slug: job.slug.clone(),
            });
        }
        let id = state.allocate_id();
        let row = to_row(id, job, created_at);
        state.jobs.push(row.clone());
        Ok(row)
    }

    /// Flip the moderation flag, as the external moderation process does
    pub fn set_approved(&self, slug: &str, approved: bool) -> bool {
        let mut state = self.state.lock().unwrap_or_else(|e| e.into_inner());
        match state.jobs.iter_mut().find(|j| j.slug == slug) {
            Some(job) => {
                job.approved = approved;
                true
            }
            None => false,
        }
    }

    pub fn len(&self) -> usize {
        self.state.lock().unwrap_or_else(|e| e.into_inner()).jobs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn snapshot(&self) -> Vec<JobRow> {
        self.state.lock().unwrap_or_else(|e| e.into_inner()).jobs.clone()
    }
}

impl JobRepository for InMemoryJobRepository {
    async fn find_jobs(&self, query: &JobQuery) -> Result<Vec<JobRow>, StoreError> {
        let mut rows: Vec<JobRow> = self
            .snapshot()
            .into_iter()
            .filter(|job| query.matches(job))
            .collect();
        rows.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));
        Ok(rows)
    }

    async fn find_by_slug(&self, slug: &str) -> Result<Option<JobRow>, StoreError> {
        Ok(self.snapshot().into_iter().find(|job| job.slug == slug))
    }

    async fn distinct_locations(&self) -> Result<Vec<String>, StoreError> {
        let mut locations: Vec<String> = self
            .snapshot()
            .into_iter()
            .filter(|job| job.approved)
            .filter_map(|job| job.location)
            .filter(|location| !location.is_empty())
            .collect();
        locations.sort();
        locations.dedup();
        Ok(locations)
    }

    async fn approved_slugs(&self) -> Result<Vec<String>, StoreError> {
        let mut jobs: Vec<JobRow> = self.snapshot().into_iter().filter(|j| j.approved).collect();
        jobs.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(jobs.into_iter().map(|job| job.slug).collect())
    }

    async fn create(&self, job: &NewJob) -> Result<JobRow, StoreError> {
        self.insert_at(job, Utc::now().naive_utc())
    }

    async fn upsert_by_slug(&self, job: &NewJob) -> Result<JobRow, StoreError> {
        let mut state = self.state.lock().unwrap_or_else(|e| e.into_inner());
        let now = Utc::now().naive_utc();
        if let Some(index) = state.jobs.iter().position(|j| j.slug == job.slug) {
            let existing = &state.jobs[index];
            let mut row = to_row(existing.id, job, existing.created_at);
            row.updated_at = now;
            state.jobs[index] = row.clone();
            return Ok(row);
        }
        let id = state.allocate_id();
        let row = to_row(id, job, now);
        state.jobs.push(row.clone());
        Ok(row)
    }

    async fn ping(&self) -> Result<(), StoreError> {
        Ok(())
    }
}
