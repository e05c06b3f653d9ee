//! HTTP client for the ETL backend API.

mod http;
#[cfg(feature = "test-util")]
pub mod mock;

pub use etl_types::{BackendError, JobBackend};
pub use http::{HttpJobBackend, DEFAULT_BACKEND_URL};

#[cfg(feature = "test-util")]
pub use mock::MockJobBackend;
