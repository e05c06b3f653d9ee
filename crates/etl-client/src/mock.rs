//! Mock backend for tests: in-memory jobs, scripted failures, call counters, no network.

use async_trait::async_trait;
use etl_types::{
    AccessToken, BackendError, DownloadLink, Job, JobBackend, JobId, JobStatus, UploadFile,
    UploadResponse,
};
use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;
use tokio::sync::Mutex;
use uuid::Uuid;

#[derive(Default)]
struct MockState {
    jobs: Vec<Job>,
    list_script: VecDeque<Result<Vec<Job>, BackendError>>,
    upload_response: Option<Result<UploadResponse, BackendError>>,
    download_urls: HashMap<JobId, String>,
    uploads: Vec<UploadFile>,
    tokens_seen: Vec<String>,
    list_delay: Option<Duration>,
}

/// Mock backend. `upload` appends a QUEUED job unless a response was scripted;
/// `list_jobs` answers from the script first, then from the current job list.
#[derive(Default)]
pub struct MockJobBackend {
    state: Mutex<MockState>,
    list_calls: AtomicUsize,
    upload_calls: AtomicUsize,
    download_calls: AtomicUsize,
    in_flight: AtomicUsize,
    max_in_flight: AtomicUsize,
}

impl MockJobBackend {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_jobs(jobs: Vec<Job>) -> Self {
        Self {
            state: Mutex::new(MockState {
                jobs,
                ..Default::default()
            }),
            ..Default::default()
        }
    }

    pub async fn set_jobs(&self, jobs: Vec<Job>) {
        self.state.lock().await.jobs = jobs;
    }

    /// Queue a one-shot `list_jobs` result, served before the steady job list.
    pub async fn push_list_response(&self, response: Result<Vec<Job>, BackendError>) {
        self.state.lock().await.list_script.push_back(response);
    }

    pub async fn set_upload_response(&self, response: Result<UploadResponse, BackendError>) {
        self.state.lock().await.upload_response = Some(response);
    }

    pub async fn set_download_url(&self, job_id: impl Into<JobId>, url: impl Into<String>) {
        self.state
            .lock()
            .await
            .download_urls
            .insert(job_id.into(), url.into());
    }

    /// Make every `list_jobs` call take this long (tokio time, so paused clocks apply).
    pub async fn set_list_delay(&self, delay: Duration) {
        self.state.lock().await.list_delay = Some(delay);
    }

    pub fn list_calls(&self) -> usize {
        self.list_calls.load(Ordering::SeqCst)
    }

    pub fn upload_calls(&self) -> usize {
        self.upload_calls.load(Ordering::SeqCst)
    }

    pub fn download_calls(&self) -> usize {
        self.download_calls.load(Ordering::SeqCst)
    }

    /// Highest number of `list_jobs` calls observed running at once.
    pub fn max_concurrent_lists(&self) -> usize {
        self.max_in_flight.load(Ordering::SeqCst)
    }

    pub async fn uploads(&self) -> Vec<UploadFile> {
        self.state.lock().await.uploads.clone()
    }

    pub async fn tokens_seen(&self) -> Vec<String> {
        self.state.lock().await.tokens_seen.clone()
    }

    async fn record_token(&self, token: &AccessToken) {
        self.state
            .lock()
            .await
            .tokens_seen
            .push(token.as_str().to_string());
    }
}

#[async_trait]
impl JobBackend for MockJobBackend {
    async fn upload(
        &self,
        token: &AccessToken,
        file: &UploadFile,
    ) -> Result<UploadResponse, BackendError> {
        self.upload_calls.fetch_add(1, Ordering::SeqCst);
        self.record_token(token).await;
        let mut state = self.state.lock().await;
        state.uploads.push(file.clone());
        if let Some(scripted) = state.upload_response.clone() {
            return scripted;
        }
        let job_id = JobId::new(Uuid::new_v4().to_string());
        state.jobs.push(Job::new(
            job_id.clone(),
            file.file_name.clone(),
            JobStatus::Queued,
        ));
        Ok(UploadResponse {
            job_id,
            status: Some(JobStatus::Queued),
        })
    }

    async fn list_jobs(&self, token: &AccessToken) -> Result<Vec<Job>, BackendError> {
        self.list_calls.fetch_add(1, Ordering::SeqCst);
        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(now, Ordering::SeqCst);
        self.record_token(token).await;

        let delay = self.state.lock().await.list_delay;
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }

        let result = {
            let mut state = self.state.lock().await;
            match state.list_script.pop_front() {
                Some(scripted) => scripted,
                None => Ok(state.jobs.clone()),
            }
        };
        self.in_flight.fetch_sub(1, Ordering::SeqCst);
        result
    }

    async fn get_job(&self, token: &AccessToken, job_id: &JobId) -> Result<Job, BackendError> {
        self.record_token(token).await;
        let state = self.state.lock().await;
        state
            .jobs
            .iter()
            .find(|j| &j.job_id == job_id)
            .cloned()
            .ok_or_else(|| BackendError::Status {
                status: 404,
                message: format!("job not found: {job_id}"),
            })
    }

    async fn download_link(
        &self,
        token: &AccessToken,
        job_id: &JobId,
    ) -> Result<DownloadLink, BackendError> {
        self.download_calls.fetch_add(1, Ordering::SeqCst);
        self.record_token(token).await;
        let state = self.state.lock().await;
        state
            .download_urls
            .get(job_id)
            .map(|url| DownloadLink {
                download_url: url.clone(),
            })
            .ok_or_else(|| BackendError::Status {
                status: 404,
                message: "No Parquet".to_string(),
            })
    }
}
