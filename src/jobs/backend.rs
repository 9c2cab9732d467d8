//! The backend operations the job machinery depends on.

use async_trait::async_trait;

use crate::jobs::error::JobResult;
use crate::jobs::types::{ImageUpload, JobId, JobSnapshot};

/// Read/delete capability over backend jobs, plus the upload that creates them.
///
/// Implemented over HTTP by [`crate::client::BackendClient`]; tests supply
/// scripted implementations.
#[async_trait]
pub trait JobBackend: Send + Sync {
    /// Submit an image for `album_id`; returns the job tracking it.
    async fn submit_upload(&self, album_id: &str, upload: &ImageUpload) -> JobResult<JobId>;

    /// One status observation. `NotFound` when the backend has no such job.
    async fn job_status(&self, job_id: &JobId) -> JobResult<JobSnapshot>;

    /// Delete a job record. Deleting an already-deleted job succeeds.
    async fn delete_job(&self, job_id: &JobId) -> JobResult<()>;
}
