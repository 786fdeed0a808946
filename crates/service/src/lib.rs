//! Service layer for the photo upload workflow.
//! - Collaborator seams (`ObjectStore`, `PhotoRepository`) with REST and in-memory implementations.
//! - Upload orchestration independent of the web framework.
//! - Clear error types for mapping to HTTP responses.

pub mod backend;
pub mod buffer;
pub mod errors;
pub mod keys;
pub mod metrics;
pub mod photos;
pub mod runtime;
pub mod storage;
