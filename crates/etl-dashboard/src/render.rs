//! Job rows as the dashboard shows them.

use etl_types::{Job, JobId, JobStatus};
use std::fmt::Write;

pub const EMPTY_LIST_MESSAGE: &str = "No jobs yet. Upload a file to get started!";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JobRow {
    pub job_id: JobId,
    pub filename: String,
    pub status: JobStatus,
    /// Download control; only completed jobs get one.
    pub download: Option<JobId>,
    /// Failure text from the ETL worker, if any.
    pub note: Option<String>,
}

pub fn render_rows(jobs: &[Job]) -> Vec<JobRow> {
    jobs.iter()
        .map(|job| JobRow {
            job_id: job.job_id.clone(),
            filename: job.filename.clone(),
            status: job.status.clone(),
            download: job
                .status
                .is_completed()
                .then(|| job.job_id.clone()),
            note: job.failure_reason().map(String::from),
        })
        .collect()
}

pub fn render_text(rows: &[JobRow]) -> String {
    if rows.is_empty() {
        return EMPTY_LIST_MESSAGE.to_string();
    }
    let mut out = String::new();
    for row in rows {
        let _ = write!(out, "{} → {}", row.filename, row.status);
        if let Some(ref id) = row.download {
            let _ = write!(out, "  [download {}]", id);
        }
        if let Some(ref note) = row.note {
            let _ = write!(out, "  ({})", note);
        }
        out.push('\n');
    }
    out
}
