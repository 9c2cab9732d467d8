//! Request and response hygiene at the proxy boundary.
//!
//! # Data Flow
//! ```text
//! Inbound request:
//!     → limits.rs (declared length check, streamed cap)
//!     → headers.rs (hop-by-hop strip, Host rewrite)
//! Backend response:
//!     → headers.rs (hop-by-hop strip, allow/deny policy)
//! ```

pub mod headers;
pub mod limits;
