//! HTTP client for the ETL backend (`/api/upload`, `/api/jobs`, `/api/jobs/{jobId}/download`).

use async_trait::async_trait;
use etl_types::{
    AccessToken, ApiErrorBody, BackendError, DownloadLink, Job, JobBackend, JobId, UploadFile,
    UploadResponse,
};
use reqwest::multipart::{Form, Part};
use reqwest::Url;
use serde::de::DeserializeOwned;
use std::fmt;

/// Default backend when `ETL_BACKEND_URL` is not set.
pub const DEFAULT_BACKEND_URL: &str = "http://localhost:8000";

/// Backend reached over HTTP with a bearer token on every request.
pub struct HttpJobBackend {
    client: reqwest::Client,
    base_url: Url,
}

impl HttpJobBackend {
    pub fn new(base_url: &str) -> Result<Self, BackendError> {
        let base_url =
            Url::parse(base_url).map_err(|e| BackendError::InvalidUrl(format!("{base_url}: {e}")))?;
        if base_url.cannot_be_a_base() {
            return Err(BackendError::InvalidUrl(base_url.to_string()));
        }
        Ok(Self {
            client: reqwest::Client::new(),
            base_url,
        })
    }

    fn endpoint(&self, segments: &[&str]) -> Result<Url, BackendError> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| BackendError::InvalidUrl(self.base_url.to_string()))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        token: &AccessToken,
        segments: &[&str],
    ) -> Result<T, BackendError> {
        let url = self.endpoint(segments)?;
        tracing::debug!(url = %url, "GET");
        let res = self
            .client
            .get(url)
            .bearer_auth(token.as_str())
            .send()
            .await
            .map_err(|e| BackendError::Transport(e.to_string()))?;
        read_json(res).await
    }
}

impl fmt::Debug for HttpJobBackend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HttpJobBackend")
            .field("base_url", &self.base_url.as_str())
            .finish()
    }
}

/// Read the body once; non-2xx becomes `Status` with the FastAPI `detail` when present.
async fn read_json<T: DeserializeOwned>(res: reqwest::Response) -> Result<T, BackendError> {
    let status = res.status();
    let body = res
        .text()
        .await
        .map_err(|e| BackendError::Transport(e.to_string()))?;
    if !status.is_success() {
        let message = serde_json::from_str::<ApiErrorBody>(&body)
            .ok()
            .and_then(|b| b.message())
            .unwrap_or(body);
        return Err(BackendError::Status {
            status: status.as_u16(),
            message,
        });
    }
    serde_json::from_str(&body).map_err(|e| BackendError::Decode(e.to_string()))
}

#[async_trait]
impl JobBackend for HttpJobBackend {
    async fn upload(
        &self,
        token: &AccessToken,
        file: &UploadFile,
    ) -> Result<UploadResponse, BackendError> {
        let url = self.endpoint(&["api", "upload"])?;
        let part = Part::bytes(file.bytes.clone())
            .file_name(file.file_name.clone())
            .mime_str("text/csv")
            .map_err(|e| BackendError::Transport(e.to_string()))?;
        let form = Form::new().part("file", part);
        tracing::debug!(url = %url, file = %file.file_name, bytes = file.bytes.len(), "POST upload");
        let res = self
            .client
            .post(url)
            .bearer_auth(token.as_str())
            .multipart(form)
            .send()
            .await
            .map_err(|e| BackendError::Transport(e.to_string()))?;
        read_json(res).await
    }

    async fn list_jobs(&self, token: &AccessToken) -> Result<Vec<Job>, BackendError> {
        self.get_json(token, &["api", "jobs"]).await
    }

    async fn get_job(&self, token: &AccessToken, job_id: &JobId) -> Result<Job, BackendError> {
        self.get_json(token, &["api", "jobs", job_id.as_str()]).await
    }

    async fn download_link(
        &self,
        token: &AccessToken,
        job_id: &JobId,
    ) -> Result<DownloadLink, BackendError> {
        self.get_json(token, &["api", "jobs", job_id.as_str(), "download"])
            .await
    }
}
