//! Dashboard components for the ETL client: upload form, polling job list, download action.
//!
//! The upload form and the job list share nothing but the session token; a new
//! job shows up only when the next poll returns it.

mod config;
mod dashboard;
mod error;
mod job_list;
mod opener;
mod render;
mod upload;

pub use config::{parse_poll_interval, DashboardConfig, DEFAULT_POLL_INTERVAL};
pub use dashboard::Dashboard;
pub use error::DashboardError;
pub use job_list::{open_download, JobList};
pub use opener::{BrowserOpener, OpenError, PrintOpener, UrlOpener};
pub use render::{render_rows, render_text, JobRow, EMPTY_LIST_MESSAGE};
pub use upload::{UploadForm, UploadOutcome, SELECT_FILE_MESSAGE};
