//! Job Poller: drives one job from submission to a terminal state.
//!
//! ```text
//! PENDING ──▶ PROCESSING ──▶ SUCCESS ──▶ delete ──▶ Ok(UploadResult)
//!    │             │
//!    └─────────────┴───────▶ FAILED  ──▶ delete ──▶ Err(UploadFailed)
//! ```
//!
//! Every status query and every sleep between queries races the caller's
//! cancellation token. A cancelled or exhausted wait leaves the job record
//! alone for the backend to expire.

use std::sync::Arc;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tokio_util::sync::CancellationToken;

use crate::jobs::backend::JobBackend;
use crate::jobs::error::{JobError, JobResult};
use crate::jobs::types::{JobId, JobSnapshot, JobStatus, UploadResult};
use crate::observability::metrics;
use crate::resilience::backoff::Backoff;

/// How often and how long to poll.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PollPolicy {
    /// Delay after the first observation, in milliseconds.
    pub interval_ms: u64,
    /// Upper bound for exponential delays, in milliseconds.
    pub max_interval_ms: u64,
    /// Observations allowed before giving up.
    pub max_attempts: u32,
    /// Delay growth between observations.
    pub backoff: Backoff,
}

impl Default for PollPolicy {
    fn default() -> Self {
        Self {
            interval_ms: 2000,
            max_interval_ms: 10_000,
            max_attempts: 300,
            backoff: Backoff::Fixed,
        }
    }
}

impl PollPolicy {
    /// Fixed-interval policy.
    pub fn fixed(interval: Duration, max_attempts: u32) -> Self {
        Self {
            interval_ms: interval.as_millis() as u64,
            max_interval_ms: interval.as_millis() as u64,
            max_attempts,
            backoff: Backoff::Fixed,
        }
    }

    /// Delay to sleep after the given 1-based observation.
    pub fn delay_after(&self, attempt: u32) -> Duration {
        self.backoff.delay(
            attempt,
            Duration::from_millis(self.interval_ms),
            Duration::from_millis(self.max_interval_ms.max(self.interval_ms)),
        )
    }
}

/// Polls jobs on one backend.
pub struct JobPoller<B> {
    backend: Arc<B>,
    policy: PollPolicy,
}

impl<B> Clone for JobPoller<B> {
    fn clone(&self) -> Self {
        Self {
            backend: self.backend.clone(),
            policy: self.policy.clone(),
        }
    }
}

impl<B: JobBackend> JobPoller<B> {
    pub fn new(backend: Arc<B>, policy: PollPolicy) -> Self {
        Self { backend, policy }
    }

    pub fn backend(&self) -> &Arc<B> {
        &self.backend
    }

    pub fn policy(&self) -> &PollPolicy {
        &self.policy
    }

    /// Issue a single status query.
    pub async fn poll(&self, job_id: &JobId) -> JobResult<JobSnapshot> {
        let snapshot = self.backend.job_status(job_id).await?;
        metrics::record_job_poll(snapshot.overall_status.as_str());
        tracing::debug!(job_id = %job_id, status = %snapshot.overall_status, "Job status observed");
        Ok(snapshot)
    }

    /// Poll until the job is terminal, reporting every observation to `on_progress`.
    pub async fn wait_for<F>(
        &self,
        job_id: &JobId,
        mut on_progress: F,
        cancel: &CancellationToken,
    ) -> JobResult<UploadResult>
    where
        F: FnMut(&JobSnapshot) + Send,
    {
        let mut attempts = 0u32;

        loop {
            attempts += 1;

            let snapshot = tokio::select! {
                biased;
                _ = cancel.cancelled() => {
                    tracing::info!(job_id = %job_id, attempts, "Job wait cancelled");
                    return Err(JobError::Cancelled);
                }
                result = self.poll(job_id) => result?,
            };

            on_progress(&snapshot);

            match snapshot.overall_status {
                JobStatus::Success => {
                    self.cleanup(job_id).await;
                    if let Some(association) = &snapshot.album_association {
                        if !association.associated {
                            tracing::warn!(
                                job_id = %job_id,
                                error = association.error_message.as_deref().unwrap_or("unknown"),
                                "Image processed but not attached to its album"
                            );
                        }
                    }
                    let result = snapshot.upload_result(job_id)?;
                    tracing::info!(
                        job_id = %job_id,
                        main_image_id = %result.main_image_id,
                        thumbnail_id = %result.thumbnail_id,
                        attempts,
                        "Job succeeded"
                    );
                    return Ok(result);
                }
                JobStatus::Failed => {
                    self.cleanup(job_id).await;
                    let message = snapshot.failure_message();
                    tracing::warn!(job_id = %job_id, error = %message, attempts, "Job failed");
                    return Err(JobError::UploadFailed(message));
                }
                JobStatus::Pending | JobStatus::Processing => {}
            }

            if attempts >= self.policy.max_attempts {
                tracing::warn!(job_id = %job_id, attempts, "Job did not finish in time");
                return Err(JobError::PollLimitExceeded {
                    job_id: job_id.clone(),
                    attempts,
                });
            }

            let delay = self.policy.delay_after(attempts);
            tokio::select! {
                biased;
                _ = cancel.cancelled() => {
                    tracing::info!(job_id = %job_id, attempts, "Job wait cancelled");
                    return Err(JobError::Cancelled);
                }
                _ = tokio::time::sleep(delay) => {}
            }
        }
    }

    /// Delete a terminal job. Failure does not change the job's outcome.
    async fn cleanup(&self, job_id: &JobId) {
        match self.backend.delete_job(job_id).await {
            Ok(()) => tracing::debug!(job_id = %job_id, "Job record deleted"),
            Err(e) => tracing::warn!(job_id = %job_id, error = %e, "Failed to delete job record"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::jobs::testing::{failed, pending, processing, success, ScriptedBackend};
    use tokio::sync::Notify;

    fn poller(backend: &Arc<ScriptedBackend>, max_attempts: u32) -> JobPoller<ScriptedBackend> {
        JobPoller::new(backend.clone(), PollPolicy::fixed(Duration::from_millis(1), max_attempts))
    }

    #[tokio::test]
    async fn test_pending_processing_success() {
        let backend = Arc::new(ScriptedBackend::new(vec![
            Ok(pending()),
            Ok(processing()),
            Ok(success("m1", "t1")),
        ]));
        let mut seen = Vec::new();

        let result = poller(&backend, 10)
            .wait_for(&JobId::from("job-1"), |s| seen.push(s.overall_status), &CancellationToken::new())
            .await
            .unwrap();

        assert_eq!(result.main_image_id, "m1");
        assert_eq!(result.thumbnail_id, "t1");
        assert_eq!(seen, vec![JobStatus::Pending, JobStatus::Processing, JobStatus::Success]);
        assert_eq!(backend.deleted(), vec![JobId::from("job-1")]);
        assert_eq!(backend.polls(), 3);
    }

    #[tokio::test]
    async fn test_failed_carries_backend_message() {
        let backend = Arc::new(ScriptedBackend::new(vec![Ok(failed(Some("corrupt file")))]));

        let err = poller(&backend, 10)
            .wait_for(&JobId::from("job-2"), |_| {}, &CancellationToken::new())
            .await
            .unwrap_err();

        assert_eq!(err.to_string(), "corrupt file");
        assert_eq!(backend.deleted(), vec![JobId::from("job-2")]);
    }

    #[tokio::test]
    async fn test_failed_without_message_is_generic() {
        let backend = Arc::new(ScriptedBackend::new(vec![Ok(processing()), Ok(failed(None))]));

        let err = poller(&backend, 10)
            .wait_for(&JobId::from("job-3"), |_| {}, &CancellationToken::new())
            .await
            .unwrap_err();

        assert!(matches!(err, JobError::UploadFailed(ref m) if m == "Upload failed"));
        assert_eq!(backend.deleted().len(), 1);
    }

    #[tokio::test]
    async fn test_query_error_is_not_retried() {
        let backend = Arc::new(ScriptedBackend::new(vec![
            Ok(pending()),
            Err(JobError::Query("connection reset".into())),
            Ok(success("m", "t")),
        ]));

        let err = poller(&backend, 10)
            .wait_for(&JobId::from("job-4"), |_| {}, &CancellationToken::new())
            .await
            .unwrap_err();

        assert!(matches!(err, JobError::Query(_)));
        assert_eq!(backend.polls(), 2);
        assert!(backend.deleted().is_empty());
    }

    #[tokio::test]
    async fn test_not_found_surfaces() {
        let backend = Arc::new(ScriptedBackend::new(vec![]));

        let err = poller(&backend, 10)
            .poll(&JobId::from("gone"))
            .await
            .unwrap_err();

        assert!(matches!(err, JobError::NotFound(ref id) if id.as_str() == "gone"));
    }

    #[tokio::test]
    async fn test_poll_limit_stops_without_delete() {
        let backend = Arc::new(ScriptedBackend::repeating(pending()));

        let err = poller(&backend, 3)
            .wait_for(&JobId::from("job-5"), |_| {}, &CancellationToken::new())
            .await
            .unwrap_err();

        assert!(matches!(err, JobError::PollLimitExceeded { attempts: 3, .. }));
        assert_eq!(backend.polls(), 3);
        assert!(backend.deleted().is_empty());
    }

    #[tokio::test]
    async fn test_cancel_during_sleep_issues_no_delete() {
        let backend = Arc::new(ScriptedBackend::repeating(processing()));
        let poller = JobPoller::new(
            backend.clone(),
            PollPolicy::fixed(Duration::from_millis(50), 1000),
        );
        let cancel = CancellationToken::new();

        let task = {
            let cancel = cancel.clone();
            tokio::spawn(async move {
                poller.wait_for(&JobId::from("job-6"), |_| {}, &cancel).await
            })
        };

        tokio::time::sleep(Duration::from_millis(120)).await;
        cancel.cancel();
        let err = task.await.unwrap().unwrap_err();
        let polls_at_cancel = backend.polls();

        tokio::time::sleep(Duration::from_millis(120)).await;

        assert!(matches!(err, JobError::Cancelled));
        assert!(backend.deleted().is_empty());
        assert_eq!(backend.polls(), polls_at_cancel);
        assert!(polls_at_cancel >= 1);
    }

    #[tokio::test]
    async fn test_cancel_during_status_query() {
        let gate = Arc::new(Notify::new());
        let backend = Arc::new(ScriptedBackend::repeating(success("m", "t")).gated(gate.clone()));
        let cancel = CancellationToken::new();

        let task = {
            let poller = poller(&backend, 10);
            let cancel = cancel.clone();
            tokio::spawn(async move {
                poller.wait_for(&JobId::from("job-9"), |_| {}, &cancel).await
            })
        };

        backend.poll_started().await;
        cancel.cancel();
        let err = task.await.unwrap().unwrap_err();

        // Releasing the held query afterwards must not revive the wait.
        gate.notify_waiters();
        tokio::time::sleep(Duration::from_millis(50)).await;

        assert!(matches!(err, JobError::Cancelled));
        assert_eq!(backend.polls(), 1);
        assert!(backend.deleted().is_empty());
    }

    #[tokio::test]
    async fn test_already_cancelled_never_polls() {
        let backend = Arc::new(ScriptedBackend::new(vec![Ok(success("m", "t"))]));
        let cancel = CancellationToken::new();
        cancel.cancel();

        let err = poller(&backend, 10)
            .wait_for(&JobId::from("job-7"), |_| {}, &cancel)
            .await
            .unwrap_err();

        assert!(matches!(err, JobError::Cancelled));
        assert_eq!(backend.polls(), 0);
        assert!(backend.deleted().is_empty());
    }

    #[tokio::test]
    async fn test_delete_failure_keeps_success() {
        let backend = Arc::new(
            ScriptedBackend::new(vec![Ok(success("m1", "t1"))]).failing_deletes(),
        );

        let result = poller(&backend, 10)
            .wait_for(&JobId::from("job-8"), |_| {}, &CancellationToken::new())
            .await
            .unwrap();

        assert_eq!(result.main_image_id, "m1");
        assert_eq!(backend.deleted(), vec![JobId::from("job-8")]);
    }

    #[test]
    fn test_policy_defaults() {
        let policy = PollPolicy::default();
        assert_eq!(policy.delay_after(1), Duration::from_secs(2));
        assert_eq!(policy.delay_after(50), Duration::from_secs(2));
        assert_eq!(policy.max_attempts, 300);
    }
}
