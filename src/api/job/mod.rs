pub mod dto;
pub mod format;
pub mod handlers;
pub mod markdown;
pub mod models;
pub mod service;
pub mod slug;
pub mod templates;

// Re-export commonly used types
pub use models::{JobFilterValues, JobSubmission};
pub use service::{JobService, ServiceError};
