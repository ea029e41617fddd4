//! HTTP boundary over the diagnosis core.
//!
//! Thin axum layer: request decoding (JSON and multipart), error→status
//! mapping, and routing. Authentication, patient persistence, and report
//! generation live outside this crate; handlers assume the caller is already
//! authorized.

pub mod endpoints;
pub mod error;
pub mod router;
pub mod types;
