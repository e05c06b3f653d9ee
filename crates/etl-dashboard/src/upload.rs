//! Upload form: one selected file, one multipart POST, one status message.

use etl_types::{AccessToken, JobBackend, UploadFile, UploadResponse};
use std::path::{Path, PathBuf};
use std::sync::Arc;

pub const SELECT_FILE_MESSAGE: &str = "Please select a CSV file";

#[derive(Debug, Clone, PartialEq)]
pub enum UploadOutcome {
    /// Nothing selected; no request was sent.
    NoFileSelected,
    Created(UploadResponse),
    Failed(String),
}

pub struct UploadForm {
    backend: Arc<dyn JobBackend>,
    token: AccessToken,
    selected: Option<PathBuf>,
    message: String,
}

impl UploadForm {
    pub fn new(backend: Arc<dyn JobBackend>, token: AccessToken) -> Self {
        Self {
            backend,
            token,
            selected: None,
            message: String::new(),
        }
    }

    /// Replace the selection. The `.csv` filter is a hint only.
    pub fn select_file(&mut self, path: impl Into<PathBuf>) {
        let path = path.into();
        let is_csv = path
            .extension()
            .and_then(|e| e.to_str())
            .is_some_and(|e| e.eq_ignore_ascii_case("csv"));
        if !is_csv {
            tracing::warn!(path = %path.display(), "selected file does not have a .csv extension");
        }
        self.selected = Some(path);
    }

    pub fn selected_file(&self) -> Option<&Path> {
        self.selected.as_deref()
    }

    /// Last status message; empty until the first upload attempt.
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Send the selected file. The selection is kept so the same file can be sent again.
    pub async fn upload(&mut self) -> UploadOutcome {
        let Some(path) = self.selected.clone() else {
            self.message = SELECT_FILE_MESSAGE.to_string();
            return UploadOutcome::NoFileSelected;
        };
        match self.send(&path).await {
            Ok(res) => {
                tracing::info!(job_id = %res.job_id, file = %path.display(), "upload accepted");
                self.message = format!("Job created: {}", res.job_id);
                UploadOutcome::Created(res)
            }
            Err(reason) => {
                tracing::warn!(file = %path.display(), error = %reason, "upload failed");
                self.message = format!("Error: {}", reason);
                UploadOutcome::Failed(reason)
            }
        }
    }

    async fn send(&self, path: &Path) -> Result<UploadResponse, String> {
        let bytes = tokio::fs::read(path)
            .await
            .map_err(|e| format!("reading {}: {}", path.display(), e))?;
        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());
        self.backend
            .upload(&self.token, &UploadFile::new(file_name, bytes))
            .await
            .map_err(|e| e.to_string())
    }
}
