//! Resilience subsystem.
//!
//! # Data Flow
//! ```text
//! Job wait loop:
//!     → backoff.rs (delay before the next status query)
//! Proxy path:
//!     → connect / upstream timeouts applied in http::forward
//! ```
//!
//! # Design Decisions
//! - Every external call has a deadline
//! - Waits are bounded; nothing loops forever on a stuck backend
//! - Jittered backoff prevents thundering herd

pub mod backoff;
