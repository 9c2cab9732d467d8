//! Upload Orchestrator: submit an image, then wait for its processed result.

use std::sync::Arc;

use tokio_util::sync::CancellationToken;

use crate::jobs::backend::JobBackend;
use crate::jobs::error::{JobError, JobResult};
use crate::jobs::poller::{JobPoller, PollPolicy};
use crate::jobs::types::{ImageUpload, JobId, JobStatus, UploadResult};

/// Progress of one upload, reported to whoever started it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UploadProgress {
    /// The image is being sent.
    Uploading,
    /// The backend accepted the image and is tracking it as this job.
    Queued(JobId),
    /// A status observation of the job.
    Processing(JobStatus),
}

/// End-to-end "upload and wait" over a [`JobBackend`].
pub struct Uploader<B> {
    poller: JobPoller<B>,
}

impl<B: JobBackend> Uploader<B> {
    pub fn new(backend: Arc<B>, policy: PollPolicy) -> Self {
        Self {
            poller: JobPoller::new(backend, policy),
        }
    }

    pub fn poller(&self) -> &JobPoller<B> {
        &self.poller
    }

    /// Upload `image` into `album_id` and wait until the backend finishes processing it.
    ///
    /// A failed submission is returned as-is; it is never retried.
    pub async fn upload_and_wait<F>(
        &self,
        album_id: &str,
        image: &ImageUpload,
        mut on_progress: F,
        cancel: &CancellationToken,
    ) -> JobResult<UploadResult>
    where
        F: FnMut(UploadProgress) + Send,
    {
        image.validate()?;

        on_progress(UploadProgress::Uploading);
        let job_id = tokio::select! {
            biased;
            _ = cancel.cancelled() => return Err(JobError::Cancelled),
            result = self.poller.backend().submit_upload(album_id, image) => result?,
        };

        tracing::info!(
            job_id = %job_id,
            album_id = %album_id,
            file_name = %image.file_name,
            size = image.bytes.len(),
            "Upload accepted"
        );
        on_progress(UploadProgress::Queued(job_id.clone()));

        self.poller
            .wait_for(
                &job_id,
                |snapshot| on_progress(UploadProgress::Processing(snapshot.overall_status)),
                cancel,
            )
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::jobs::testing::{pending, processing, success, ScriptedBackend};
    use std::time::Duration;

    fn uploader(backend: &Arc<ScriptedBackend>) -> Uploader<ScriptedBackend> {
        Uploader::new(backend.clone(), PollPolicy::fixed(Duration::from_millis(1), 10))
    }

    fn image() -> ImageUpload {
        ImageUpload::new("beach.png", "image/png", vec![0x89, b'P', b'N', b'G'])
    }

    #[tokio::test]
    async fn test_upload_then_wait() {
        let backend = Arc::new(
            ScriptedBackend::new(vec![Ok(pending()), Ok(processing()), Ok(success("m1", "t1"))])
                .with_submit(Ok(JobId::from("job-1"))),
        );
        let mut progress = Vec::new();

        let result = uploader(&backend)
            .upload_and_wait("album-1", &image(), |p| progress.push(p), &CancellationToken::new())
            .await
            .unwrap();

        assert_eq!(result.main_image_id, "m1");
        assert_eq!(
            progress,
            vec![
                UploadProgress::Uploading,
                UploadProgress::Queued(JobId::from("job-1")),
                UploadProgress::Processing(JobStatus::Pending),
                UploadProgress::Processing(JobStatus::Processing),
                UploadProgress::Processing(JobStatus::Success),
            ]
        );
        assert_eq!(backend.submitted(), vec![("album-1".to_string(), "beach.png".to_string())]);
        assert_eq!(backend.deleted(), vec![JobId::from("job-1")]);
    }

    #[tokio::test]
    async fn test_ingestion_failure_is_not_retried() {
        let backend = Arc::new(
            ScriptedBackend::new(vec![]).with_submit(Err(JobError::Ingestion("album not found".into()))),
        );

        let err = uploader(&backend)
            .upload_and_wait("album-x", &image(), |_| {}, &CancellationToken::new())
            .await
            .unwrap_err();

        assert!(matches!(err, JobError::Ingestion(ref m) if m == "album not found"));
        assert_eq!(backend.submitted().len(), 1);
        assert_eq!(backend.polls(), 0);
    }

    #[tokio::test]
    async fn test_rejects_unsupported_type_before_network() {
        let backend = Arc::new(ScriptedBackend::new(vec![]));
        let gif = ImageUpload::new("anim.gif", "image/gif", vec![1u8, 2, 3]);

        let err = uploader(&backend)
            .upload_and_wait("album-1", &gif, |_| {}, &CancellationToken::new())
            .await
            .unwrap_err();

        assert!(matches!(err, JobError::Ingestion(_)));
        assert!(backend.submitted().is_empty());
    }
}
