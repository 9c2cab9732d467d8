//! Upload and job endpoints, exposed through [`JobBackend`].

use async_trait::async_trait;
use reqwest::multipart::{Form, Part};

use crate::client::types::UploadAccepted;
use crate::client::{check, decode, is_not_found, BackendClient, ClientResult};
use crate::jobs::{ImageUpload, JobBackend, JobError, JobId, JobResult, JobSnapshot};

const UPLOAD_PATH: &str = "album/image/upload";
const JOB_PATH: &str = "album/image/job/";

impl BackendClient {
    /// Multipart upload of one image into an album. Returns the raw accept answer.
    pub async fn upload_image(&self, album_id: &str, upload: &ImageUpload) -> ClientResult<UploadAccepted> {
        let image = Part::bytes(upload.bytes.to_vec())
            .file_name(upload.file_name.clone())
            .mime_str(&upload.content_type)?;
        let form = Form::new()
            .text("album_id", album_id.to_string())
            .part("image", image);

        let response = self
            .http()
            .post(self.endpoint(UPLOAD_PATH)?)
            .multipart(form)
            .send()
            .await?;
        decode(response).await
    }

    /// Current snapshot of a job.
    pub async fn fetch_job(&self, job_id: &JobId) -> ClientResult<JobSnapshot> {
        let url = self.endpoint_with_segment(JOB_PATH, job_id.as_str())?;
        let response = self.http().get(url).send().await?;
        decode(response).await
    }

    /// Delete a job record.
    pub async fn remove_job(&self, job_id: &JobId) -> ClientResult<()> {
        let url = self.endpoint_with_segment(JOB_PATH, job_id.as_str())?;
        let response = self.http().delete(url).send().await?;
        check(response).await?;
        Ok(())
    }
}

#[async_trait]
impl JobBackend for BackendClient {
    async fn submit_upload(&self, album_id: &str, upload: &ImageUpload) -> JobResult<JobId> {
        let accepted = self
            .upload_image(album_id, upload)
            .await
            .map_err(|e| JobError::Ingestion(e.message()))?;
        if accepted.job_id.is_empty() {
            return Err(JobError::Ingestion("backend returned an empty job id".into()));
        }

        tracing::debug!(album_id = %album_id, job_id = %accepted.job_id, "Upload accepted");
        Ok(JobId::new(accepted.job_id))
    }

    async fn job_status(&self, job_id: &JobId) -> JobResult<JobSnapshot> {
        self.fetch_job(job_id).await.map_err(|e| {
            if is_not_found(&e) {
                JobError::NotFound(job_id.clone())
            } else {
                JobError::Query(e.message())
            }
        })
    }

    async fn delete_job(&self, job_id: &JobId) -> JobResult<()> {
        match self.remove_job(job_id).await {
            Ok(()) => Ok(()),
            Err(e) if is_not_found(&e) => {
                tracing::debug!(job_id = %job_id, "Job already deleted");
                Ok(())
            }
            Err(e) => Err(JobError::Query(e.message())),
        }
    }
}
