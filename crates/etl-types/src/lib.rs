//! Core types and traits for the ETL dashboard client.
//!
//! DTOs match the JSON emitted by the ETL backend (`/api/upload`, `/api/jobs`,
//! `/api/jobs/{jobId}`, `/api/jobs/{jobId}/download`).

mod dto;
mod traits;

pub use dto::*;
pub use traits::*;
