use thiserror::Error;

/// Failures talking to the object store.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("object store request failed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("object store returned {status}: {body}")]
    Status { status: u16, body: String },
    #[error("object already exists: {0}")]
    AlreadyExists(String),
    #[error("invalid object url: {0}")]
    InvalidUrl(String),
}

/// Failures talking to the backing table.
#[derive(Debug, Error)]
pub enum RepoError {
    #[error("table request failed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("table api returned {status}: {body}")]
    Status { status: u16, body: String },
    #[error("unexpected table response: {0}")]
    Decode(String),
}

/// Business errors for the upload workflow, in pipeline order.
#[derive(Debug, Error)]
pub enum UploadError {
    #[error("validation failed: {0}")]
    Validation(String),
    #[error("file exceeds maximum size of {limit} bytes")]
    TooLarge { limit: u64 },
    #[error("object store upload failed: {0}")]
    StoreUpload(#[source] StoreError),
    #[error("public url resolution failed: {0}")]
    UrlResolution(#[source] StoreError),
    #[error("metadata insert failed: {0}")]
    Persistence(#[source] RepoError),
    #[error("unexpected error: {0}")]
    Unexpected(String),
}

impl UploadError {
    /// Stable numeric code for external mapping/logging
    pub fn code(&self) -> u16 {
        match self {
            UploadError::Validation(_) => 2001,
            UploadError::TooLarge { .. } => 2002,
            UploadError::StoreUpload(_) => 2101,
            UploadError::UrlResolution(_) => 2102,
            UploadError::Persistence(_) => 2201,
            UploadError::Unexpected(_) => 2900,
        }
    }

    /// Short label used as the `outcome` metric dimension.
    pub fn outcome(&self) -> &'static str {
        match self {
            UploadError::Validation(_) => "invalid",
            UploadError::TooLarge { .. } => "too_large",
            UploadError::StoreUpload(_) => "store_failed",
            UploadError::UrlResolution(_) => "url_failed",
            UploadError::Persistence(_) => "insert_failed",
            UploadError::Unexpected(_) => "unexpected",
        }
    }

    /// Client-side errors are not logged as failures.
    pub fn is_client_error(&self) -> bool {
        matches!(self, UploadError::Validation(_) | UploadError::TooLarge { .. })
    }
}
