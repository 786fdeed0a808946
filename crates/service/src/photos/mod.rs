//! Photos module: repository seam, table API implementation, and the
//! upload/listing service that sequences store → resolve → insert.

pub mod repo;
pub mod repository;
pub mod service;

pub use repository::PhotoRepository;
pub use service::{PhotoService, PhotoServiceConfig, UploadOutcome};
