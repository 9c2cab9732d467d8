//! Client-side tracking of asynchronous image-processing jobs.
//!
//! # Data Flow
//! ```text
//! upload.rs  (Uploader::upload_and_wait)
//!     → backend.rs (JobBackend::submit_upload) → job id
//!     → poller.rs (JobPoller::wait_for)
//!         → JobBackend::job_status, repeated with backoff
//!         → terminal → JobBackend::delete_job
//!     → UploadResult or JobError
//! ```
//!
//! # Design Decisions
//! - The backend owns job state; the client only reads and deletes it
//! - Waits are bounded and cancellable at every suspension point
//! - Progress is reported per operation, never through shared flags

pub mod backend;
pub mod error;
pub mod poller;
pub mod types;
pub mod upload;

#[cfg(test)]
pub(crate) mod testing;

pub use backend::JobBackend;
pub use error::{JobError, JobResult};
pub use poller::{JobPoller, PollPolicy};
pub use types::{ImageUpload, JobId, JobSnapshot, JobStatus, UploadResult};
pub use upload::{UploadProgress, Uploader};
