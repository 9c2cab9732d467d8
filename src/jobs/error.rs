//! Job tracking failures.

use thiserror::Error;

use crate::jobs::types::JobId;

/// Errors from polling a job or uploading an image.
#[derive(Debug, Error)]
pub enum JobError {
    /// The backend has no such job (never existed or already deleted).
    #[error("job {0} not found")]
    NotFound(JobId),

    /// The status query itself failed.
    #[error("job status query failed: {0}")]
    Query(String),

    /// The job reached `FAILED`. Carries the backend message verbatim.
    #[error("{0}")]
    UploadFailed(String),

    /// Submitting the upload failed. Never retried.
    #[error("upload submission failed: {0}")]
    Ingestion(String),

    /// The job reported `SUCCESS` without one of its references.
    #[error("job {job_id} succeeded without a {field} reference")]
    MissingReference { job_id: JobId, field: &'static str },

    /// The job was still running after the allowed number of polls.
    #[error("job {job_id} not finished after {attempts} polls")]
    PollLimitExceeded { job_id: JobId, attempts: u32 },

    /// The caller cancelled before a terminal state was observed.
    #[error("operation cancelled")]
    Cancelled,
}

/// Result type for job operations.
pub type JobResult<T> = Result<T, JobError>;
