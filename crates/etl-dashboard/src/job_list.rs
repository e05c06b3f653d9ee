//! Job list: a cancellable poller that replaces the list wholesale on each successful poll.

use crate::opener::UrlOpener;
use crate::render::{render_rows, JobRow};
use crate::DashboardError;
use etl_types::{AccessToken, Job, JobBackend, JobId};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior};
use tokio_util::sync::CancellationToken;

pub struct JobList {
    backend: Arc<dyn JobBackend>,
    token: AccessToken,
    jobs: watch::Receiver<Vec<Job>>,
    cancel: CancellationToken,
    task: Option<JoinHandle<()>>,
}

impl JobList {
    /// Start polling. The first poll fires one `period` after mount.
    pub fn mount(backend: Arc<dyn JobBackend>, token: AccessToken, period: Duration) -> Self {
        let (tx, rx) = watch::channel(Vec::new());
        let cancel = CancellationToken::new();
        let task = tokio::spawn(poll_loop(
            Arc::clone(&backend),
            token.clone(),
            period,
            tx,
            cancel.clone(),
        ));
        tracing::debug!(period_ms = period.as_millis() as u64, "job list mounted");
        Self {
            backend,
            token,
            jobs: rx,
            cancel,
            task: Some(task),
        }
    }

    /// Snapshot of the last successfully polled list.
    pub fn jobs(&self) -> Vec<Job> {
        self.jobs.borrow().clone()
    }

    pub fn rows(&self) -> Vec<JobRow> {
        render_rows(&self.jobs.borrow())
    }

    /// Receiver that wakes on every successful poll.
    pub fn subscribe(&self) -> watch::Receiver<Vec<Job>> {
        self.jobs.clone()
    }

    pub fn is_polling(&self) -> bool {
        self.task.as_ref().is_some_and(|t| !t.is_finished())
    }

    /// Resolve the job's download URL and hand it to `opener`. Returns the URL.
    pub async fn download(
        &self,
        job_id: &JobId,
        opener: &dyn UrlOpener,
    ) -> Result<String, DashboardError> {
        open_download(self.backend.as_ref(), &self.token, job_id, opener).await
    }

    /// One job's detail record.
    pub async fn job(&self, job_id: &JobId) -> Result<Job, DashboardError> {
        Ok(self.backend.get_job(&self.token, job_id).await?)
    }

    /// Stop polling and wait for the poll task to exit. In-flight polls are abandoned.
    pub async fn unmount(mut self) {
        self.cancel.cancel();
        if let Some(task) = self.task.take() {
            if let Err(e) = task.await {
                tracing::warn!(error = %e, "job poller ended abnormally");
            }
        }
        tracing::debug!("job list unmounted");
    }
}

impl Drop for JobList {
    fn drop(&mut self) {
        self.cancel.cancel();
    }
}

/// Resolve a short-lived download URL and open it. No caching, no retry, no status check.
pub async fn open_download(
    backend: &dyn JobBackend,
    token: &AccessToken,
    job_id: &JobId,
    opener: &dyn UrlOpener,
) -> Result<String, DashboardError> {
    let link = backend.download_link(token, job_id).await?;
    tracing::info!(job_id = %job_id, "opening download link");
    opener.open(&link.download_url)?;
    Ok(link.download_url)
}

/// Polls run one at a time inside this task, so responses apply in send order.
async fn poll_loop(
    backend: Arc<dyn JobBackend>,
    token: AccessToken,
    period: Duration,
    tx: watch::Sender<Vec<Job>>,
    cancel: CancellationToken,
) {
    // interval_at panics on a zero period.
    let period = period.max(Duration::from_millis(1));
    let mut ticker = tokio::time::interval_at(Instant::now() + period, period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        tokio::select! {
            biased;
            _ = cancel.cancelled() => break,
            _ = ticker.tick() => {}
        }
        tokio::select! {
            biased;
            _ = cancel.cancelled() => break,
            result = backend.list_jobs(&token) => match result {
                Ok(jobs) => {
                    tracing::debug!(count = jobs.len(), "job list refreshed");
                    tx.send_replace(jobs);
                }
                Err(e) => {
                    tracing::warn!(error = %e, "job poll failed; keeping previous list");
                }
            },
        }
    }
}
