use crate::opener::OpenError;
use etl_types::{BackendError, IdentityError};

#[derive(Debug, thiserror::Error)]
pub enum DashboardError {
    #[error("not signed in")]
    NotSignedIn,
    #[error("identity: {0}")]
    Identity(#[from] IdentityError),
    #[error("backend: {0}")]
    Backend(#[from] BackendError),
    #[error(transparent)]
    Open(#[from] OpenError),
}
