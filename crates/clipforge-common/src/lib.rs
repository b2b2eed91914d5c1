//! Clipforge-Common: Shared types, IDs, and the pipeline data model.
//!
//! This crate provides common functionality used across clipforge:
//!
//! - **Typed IDs**: Type-safe UUID wrappers for jobs, presets, tracks, etc.
//! - **Pipeline Model**: The tagged step-config union, job status enums,
//!   and per-variant validation rules
//! - **Error Handling**: Common error types and result aliases
//!
//! # Examples
//!
//! ```
//! use clipforge_common::{JobId, JobStatus, Error, Result};
//!
//! // Create typed IDs
//! let job_id = JobId::new();
//!
//! // Work with job statuses
//! let status = JobStatus::Queued;
//! assert_eq!(status.to_string(), "queued");
//!
//! // Use common error types
//! fn example() -> Result<()> {
//!     Err(Error::invalid_input("empty pipeline"))
//! }
//! ```

pub mod error;
pub mod ids;
pub mod types;

pub use error::{Error, Result};
pub use ids::*;
pub use types::*;
