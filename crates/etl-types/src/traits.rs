//! Traits for the ETL backend and the identity service.

use crate::{AccessToken, Credentials, DownloadLink, Job, JobId, UploadFile, UploadResponse};
use async_trait::async_trait;

/// ETL backend abstraction: the four endpoints the dashboard consumes.
///
/// Every call carries the caller's bearer token; implementations never cache it.
#[async_trait]
pub trait JobBackend: Send + Sync {
    /// Upload one CSV file (`POST /api/upload`, multipart field `file`).
    async fn upload(
        &self,
        token: &AccessToken,
        file: &UploadFile,
    ) -> Result<UploadResponse, BackendError>;

    /// List the caller's jobs (`GET /api/jobs`).
    async fn list_jobs(&self, token: &AccessToken) -> Result<Vec<Job>, BackendError>;

    /// Get one job (`GET /api/jobs/{jobId}`).
    async fn get_job(&self, token: &AccessToken, job_id: &JobId) -> Result<Job, BackendError>;

    /// Resolve a short-lived download URL (`GET /api/jobs/{jobId}/download`).
    async fn download_link(
        &self,
        token: &AccessToken,
        job_id: &JobId,
    ) -> Result<DownloadLink, BackendError>;
}

/// Managed identity service. Token issuance and refresh live behind this trait.
#[async_trait]
pub trait IdentityProvider: Send + Sync {
    /// Restore the current session, if any. `Ok(None)` means signed out.
    async fn restore(&self) -> Result<Option<Credentials>, IdentityError>;

    /// Terminate the session with the identity service.
    async fn sign_out(&self) -> Result<(), IdentityError>;
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum BackendError {
    #[error("request failed: {0}")]
    Transport(String),
    #[error("HTTP {status}: {message}")]
    Status { status: u16, message: String },
    #[error("invalid response: {0}")]
    Decode(String),
    #[error("invalid URL: {0}")]
    InvalidUrl(String),
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum IdentityError {
    #[error("identity error: {0}")]
    Other(String),
    #[error("not signed in")]
    NotSignedIn,
}
