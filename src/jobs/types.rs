//! Job data model as seen by the client.

use std::fmt;
use std::path::Path;

use bytes::Bytes;
use serde::{Deserialize, Serialize};

use crate::jobs::error::JobError;

/// Backend-assigned job identifier. Opaque to the client.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct JobId(String);

impl JobId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for JobId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for JobId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

/// Overall job status.
///
/// `Pending` and `Processing` are transient; `Success` and `Failed` are
/// terminal and absorbing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum JobStatus {
    Pending,
    #[serde(alias = "PROCESS")]
    Processing,
    Success,
    Failed,
}

impl JobStatus {
    pub fn is_terminal(self) -> bool {
        matches!(self, JobStatus::Success | JobStatus::Failed)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            JobStatus::Pending => "PENDING",
            JobStatus::Processing => "PROCESSING",
            JobStatus::Success => "SUCCESS",
            JobStatus::Failed => "FAILED",
        }
    }
}

impl fmt::Display for JobStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Per-artifact progress inside a job.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ImageStatus {
    pub gridfs_id: Option<String>,
    pub error_message: Option<String>,
}

/// Whether the backend attached the processed image to its album.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AlbumAssociation {
    pub associated: bool,
    pub error_message: Option<String>,
}

/// One observation of a job.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JobSnapshot {
    pub overall_status: JobStatus,
    #[serde(default)]
    pub main_image: ImageStatus,
    #[serde(default)]
    pub thumbnail: ImageStatus,
    #[serde(default)]
    pub album_association: Option<AlbumAssociation>,
}

impl JobSnapshot {
    /// Message for a failed job: main image error, then thumbnail error, then a generic one.
    pub fn failure_message(&self) -> String {
        [&self.main_image.error_message, &self.thumbnail.error_message]
            .into_iter()
            .flatten()
            .find(|m| !m.trim().is_empty())
            .cloned()
            .unwrap_or_else(|| "Upload failed".to_string())
    }

    /// References of a successful job.
    pub fn upload_result(&self, job_id: &JobId) -> Result<UploadResult, JobError> {
        let reference = |status: &ImageStatus, field: &'static str| {
            status
                .gridfs_id
                .clone()
                .filter(|id| !id.is_empty())
                .ok_or_else(|| JobError::MissingReference {
                    job_id: job_id.clone(),
                    field,
                })
        };

        Ok(UploadResult {
            main_image_id: reference(&self.main_image, "main_image")?,
            thumbnail_id: reference(&self.thumbnail, "thumbnail")?,
        })
    }
}

/// Content references of a processed upload. Only built from a `SUCCESS` job.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadResult {
    pub main_image_id: String,
    pub thumbnail_id: String,
}

/// Image formats the backend accepts.
pub const ALLOWED_IMAGE_TYPES: &[&str] = &[
    "image/jpeg",
    "image/png",
    "image/webp",
    "image/heif",
    "image/heic",
    "image/avif",
];

/// A file to submit for processing.
#[derive(Debug, Clone)]
pub struct ImageUpload {
    pub file_name: String,
    pub content_type: String,
    pub bytes: Bytes,
}

impl ImageUpload {
    pub fn new(file_name: impl Into<String>, content_type: impl Into<String>, bytes: impl Into<Bytes>) -> Self {
        Self {
            file_name: file_name.into(),
            content_type: content_type.into(),
            bytes: bytes.into(),
        }
    }

    /// Read a file, deriving the content type from its extension.
    pub async fn from_path(path: &Path) -> Result<Self, JobError> {
        let content_type = content_type_for(path).ok_or_else(|| {
            JobError::Ingestion(format!("unsupported image type: {}", path.display()))
        })?;
        let bytes = tokio::fs::read(path)
            .await
            .map_err(|e| JobError::Ingestion(format!("{}: {}", path.display(), e)))?;
        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "image".to_string());

        Ok(Self::new(file_name, content_type, bytes))
    }

    /// Reject uploads the backend would refuse anyway.
    pub fn validate(&self) -> Result<(), JobError> {
        if !ALLOWED_IMAGE_TYPES.contains(&self.content_type.as_str()) {
            return Err(JobError::Ingestion(format!(
                "unsupported file type: {}",
                self.content_type
            )));
        }
        if self.bytes.is_empty() {
            return Err(JobError::Ingestion("image is empty".to_string()));
        }
        Ok(())
    }
}

/// Content type for a file extension, if the backend accepts it.
pub fn content_type_for(path: &Path) -> Option<&'static str> {
    let ext = path.extension()?.to_str()?.to_ascii_lowercase();
    match ext.as_str() {
        "jpg" | "jpeg" => Some("image/jpeg"),
        "png" => Some("image/png"),
        "webp" => Some("image/webp"),
        "heif" => Some("image/heif"),
        "heic" => Some("image/heic"),
        "avif" => Some("image/avif"),
        _ => None,
    }
}
