//! The whole dashboard: built only once a session exists.

use crate::job_list::JobList;
use crate::render::render_text;
use crate::upload::UploadForm;
use crate::{DashboardConfig, DashboardError};
use etl_auth::{Session, SessionProvider};
use etl_types::JobBackend;
use std::sync::Arc;

pub struct Dashboard {
    sessions: Arc<SessionProvider>,
    session: Session,
    upload: UploadForm,
    jobs: JobList,
}

impl Dashboard {
    /// Reuse the current session or establish one; `NotSignedIn` when there is none.
    pub async fn mount(
        sessions: Arc<SessionProvider>,
        backend: Arc<dyn JobBackend>,
        config: &DashboardConfig,
    ) -> Result<Self, DashboardError> {
        let session = match sessions.current().await {
            Some(s) => s,
            None => sessions
                .establish()
                .await?
                .ok_or(DashboardError::NotSignedIn)?,
        };
        let token = session.token().clone();
        Ok(Self {
            upload: UploadForm::new(Arc::clone(&backend), token.clone()),
            jobs: JobList::mount(backend, token, config.poll_interval),
            sessions,
            session,
        })
    }

    pub fn header(&self) -> String {
        format!("Signed in as: {}", self.session.identity().login_id)
    }

    pub fn upload_form(&mut self) -> &mut UploadForm {
        &mut self.upload
    }

    pub fn job_list(&self) -> &JobList {
        &self.jobs
    }

    /// Header, last upload message (if any) and the job rows.
    pub fn render(&self) -> String {
        let mut out = self.header();
        out.push('\n');
        if !self.upload.message().is_empty() {
            out.push_str(self.upload.message());
            out.push('\n');
        }
        out.push('\n');
        out.push_str(&render_text(&self.jobs.rows()));
        out
    }

    /// Stop polling; the session stays alive.
    pub async fn unmount(self) {
        self.jobs.unmount().await;
    }

    /// Stop polling, then end the session.
    pub async fn sign_out(self) -> Result<(), DashboardError> {
        let Self { sessions, jobs, .. } = self;
        jobs.unmount().await;
        sessions.sign_out().await?;
        Ok(())
    }
}
