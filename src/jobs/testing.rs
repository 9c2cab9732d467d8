//! Scripted in-memory backend for job tests.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use tokio::sync::Notify;

use crate::jobs::backend::JobBackend;
use crate::jobs::error::{JobError, JobResult};
use crate::jobs::types::{ImageStatus, ImageUpload, JobId, JobSnapshot, JobStatus};

pub fn snapshot(status: JobStatus) -> JobSnapshot {
    JobSnapshot {
        overall_status: status,
        main_image: ImageStatus::default(),
        thumbnail: ImageStatus::default(),
        album_association: None,
    }
}

pub fn pending() -> JobSnapshot {
    snapshot(JobStatus::Pending)
}

pub fn processing() -> JobSnapshot {
    snapshot(JobStatus::Processing)
}

pub fn success(main: &str, thumb: &str) -> JobSnapshot {
    let mut s = snapshot(JobStatus::Success);
    s.main_image.gridfs_id = Some(main.to_string());
    s.thumbnail.gridfs_id = Some(thumb.to_string());
    s
}

pub fn failed(message: Option<&str>) -> JobSnapshot {
    let mut s = snapshot(JobStatus::Failed);
    s.main_image.error_message = message.map(str::to_string);
    s
}

/// Replays a fixed list of status results, then `NotFound`.
pub struct ScriptedBackend {
    script: Mutex<VecDeque<JobResult<JobSnapshot>>>,
    repeat: Option<JobSnapshot>,
    submit: Mutex<Option<JobResult<JobId>>>,
    fail_deletes: bool,
    gate: Option<Arc<Notify>>,
    entered: Notify,
    polls: Mutex<usize>,
    deleted: Mutex<Vec<JobId>>,
    submitted: Mutex<Vec<(String, String)>>,
}

impl ScriptedBackend {
    pub fn new(script: Vec<JobResult<JobSnapshot>>) -> Self {
        Self {
            script: Mutex::new(script.into()),
            repeat: None,
            submit: Mutex::new(None),
            fail_deletes: false,
            gate: None,
            entered: Notify::new(),
            polls: Mutex::new(0),
            deleted: Mutex::new(Vec::new()),
            submitted: Mutex::new(Vec::new()),
        }
    }

    /// Answer every poll with the same snapshot.
    pub fn repeating(snapshot: JobSnapshot) -> Self {
        let mut backend = Self::new(Vec::new());
        backend.repeat = Some(snapshot);
        backend
    }

    pub fn failing_deletes(mut self) -> Self {
        self.fail_deletes = true;
        self
    }

    /// Hold every status query until `gate` is notified.
    pub fn gated(mut self, gate: Arc<Notify>) -> Self {
        self.gate = Some(gate);
        self
    }

    /// Resolves once a status query has started.
    pub async fn poll_started(&self) {
        self.entered.notified().await;
    }

    pub fn with_submit(self, result: JobResult<JobId>) -> Self {
        *self.submit.lock().unwrap() = Some(result);
        self
    }

    pub fn polls(&self) -> usize {
        *self.polls.lock().unwrap()
    }

    pub fn deleted(&self) -> Vec<JobId> {
        self.deleted.lock().unwrap().clone()
    }

    /// `(album_id, file_name)` of every submission.
    pub fn submitted(&self) -> Vec<(String, String)> {
        self.submitted.lock().unwrap().clone()
    }
}

#[async_trait]
impl JobBackend for ScriptedBackend {
    async fn submit_upload(&self, album_id: &str, upload: &ImageUpload) -> JobResult<JobId> {
        self.submitted
            .lock()
            .unwrap()
            .push((album_id.to_string(), upload.file_name.clone()));
        self.submit
            .lock()
            .unwrap()
            .take()
            .unwrap_or_else(|| Ok(JobId::from("job-1")))
    }

    async fn job_status(&self, job_id: &JobId) -> JobResult<JobSnapshot> {
        *self.polls.lock().unwrap() += 1;
        self.entered.notify_one();
        if let Some(gate) = &self.gate {
            gate.notified().await;
        }
        if let Some(snapshot) = &self.repeat {
            return Ok(snapshot.clone());
        }
        self.script
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(JobError::NotFound(job_id.clone())))
    }

    async fn delete_job(&self, job_id: &JobId) -> JobResult<()> {
        self.deleted.lock().unwrap().push(job_id.clone());
        if self.fail_deletes {
            return Err(JobError::Query("delete refused".into()));
        }
        Ok(())
    }
}
