use crate::watch;
use clap::{Parser, Subcommand};
use etl_auth::{
    EnvIdentityProvider, IdentityProvider, Session, SessionProvider, StaticIdentityProvider,
};
use etl_dashboard::{
    open_download, parse_poll_interval, render_rows, render_text, BrowserOpener, DashboardConfig,
    DashboardError, PrintOpener, UploadForm, UploadOutcome, UrlOpener,
};
use etl_types::{AccessToken, JobBackend, JobId};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

#[derive(Parser, Debug)]
#[command(name = "etl-dashboard")]
#[command(about = "Upload CSV files to the ETL backend, watch jobs, download results")]
pub struct Args {
    #[command(subcommand)]
    pub cmd: Command,

    /// Backend base URL. Defaults to $ETL_BACKEND_URL, then http://localhost:8000.
    #[arg(long, global = true)]
    pub backend_url: Option<String>,

    /// Bearer token. Defaults to $ETL_ACCESS_TOKEN.
    #[arg(long, global = true)]
    pub token: Option<String>,

    /// Login shown in the header. Defaults to $ETL_LOGIN_ID, then the token's claims.
    #[arg(long, global = true)]
    pub login_id: Option<String>,

    /// Job list poll period in seconds. Defaults to $ETL_POLL_INTERVAL_SECS, then 5.
    #[arg(long, global = true, value_parser = parse_interval_arg)]
    pub poll_interval_secs: Option<Duration>,

    /// Override log level (trace/debug/info/warn/error).
    #[arg(long, global = true)]
    pub log_level: Option<String>,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Show the signed-in identity.
    Whoami,
    /// Upload one CSV file and print the created job id.
    Upload { file: PathBuf },
    /// Fetch the job list once.
    Jobs {
        #[arg(long)]
        json: bool,
    },
    /// Show one job's detail record.
    Status { job_id: String },
    /// Resolve a completed job's download URL and open it.
    Download {
        job_id: String,
        /// Print the URL instead of opening a browser.
        #[arg(long)]
        print: bool,
    },
    /// Interactive dashboard: poll jobs, upload and download from stdin commands.
    Watch {
        /// Print download URLs instead of opening a browser.
        #[arg(long)]
        print: bool,
    },
}

fn parse_interval_arg(raw: &str) -> Result<Duration, String> {
    parse_poll_interval(raw).ok_or_else(|| format!("expected whole seconds >= 1, got {raw:?}"))
}

fn resolve_config(args: &Args) -> DashboardConfig {
    let mut cfg = DashboardConfig::from_env();
    if let Some(ref url) = args.backend_url {
        cfg.backend_url = url.clone();
    }
    if let Some(interval) = args.poll_interval_secs {
        cfg.poll_interval = interval;
    }
    cfg
}

/// `--token` wins over the environment; a blank token counts as none.
fn flag_token(args: &Args) -> Option<&str> {
    args.token
        .as_deref()
        .map(str::trim)
        .filter(|t| !t.is_empty())
}

fn identity_provider(args: &Args) -> Arc<dyn IdentityProvider> {
    match flag_token(args) {
        Some(token) => Arc::new(StaticIdentityProvider::from_token(
            token,
            args.login_id.clone(),
        )),
        None => Arc::new(EnvIdentityProvider::new()),
    }
}

fn opener(print: bool) -> Arc<dyn UrlOpener> {
    if print {
        Arc::new(PrintOpener)
    } else {
        Arc::new(BrowserOpener)
    }
}

async fn require_session(sessions: &SessionProvider) -> Result<Session, DashboardError> {
    sessions
        .establish()
        .await?
        .ok_or(DashboardError::NotSignedIn)
}

/// The form message on success; on failure the same message becomes the error.
async fn upload_file(
    backend: Arc<dyn JobBackend>,
    token: AccessToken,
    file: PathBuf,
) -> Result<String, BoxError> {
    let mut form = UploadForm::new(backend, token);
    form.select_file(file);
    match form.upload().await {
        UploadOutcome::Created(_) => Ok(form.message().to_string()),
        _ => Err(form.message().into()),
    }
}

pub async fn dispatch(args: Args) -> Result<(), BoxError> {
    let cfg = resolve_config(&args);
    let backend: Arc<dyn JobBackend> = Arc::new(cfg.backend()?);
    let sessions = Arc::new(SessionProvider::new(identity_provider(&args)));
    tracing::debug!(backend = %cfg.backend_url, poll_secs = cfg.poll_interval.as_secs(), "configured");

    match args.cmd {
        Command::Watch { print } => {
            return watch::run(sessions, backend, &cfg, opener(print)).await;
        }
        Command::Whoami => {
            let session = require_session(&sessions).await?;
            println!("{}", session.identity().login_id);
        }
        Command::Upload { file } => {
            let session = require_session(&sessions).await?;
            println!("{}", upload_file(backend, session.token().clone(), file).await?);
        }
        Command::Jobs { json } => {
            let session = require_session(&sessions).await?;
            let jobs = backend.list_jobs(session.token()).await?;
            if json {
                println!("{}", serde_json::to_string_pretty(&jobs)?);
            } else {
                println!("{}", render_text(&render_rows(&jobs)).trim_end());
            }
        }
        Command::Status { job_id } => {
            let session = require_session(&sessions).await?;
            let job = backend
                .get_job(session.token(), &JobId::from(job_id))
                .await?;
            println!("{}", serde_json::to_string_pretty(&job)?);
        }
        Command::Download { job_id, print } => {
            let session = require_session(&sessions).await?;
            let opener = opener(print);
            open_download(
                backend.as_ref(),
                session.token(),
                &JobId::from(job_id),
                opener.as_ref(),
            )
            .await?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use etl_client::MockJobBackend;
    use etl_types::BackendError;

    #[test]
    fn parses_global_flags_after_subcommand() {
        let args = Args::try_parse_from([
            "etl-dashboard",
            "upload",
            "sales.csv",
            "--backend-url",
            "http://etl.local",
            "--poll-interval-secs",
            "10",
        ])
        .unwrap();
        assert!(matches!(args.cmd, Command::Upload { ref file } if file == &PathBuf::from("sales.csv")));
        assert_eq!(args.backend_url.as_deref(), Some("http://etl.local"));
        assert_eq!(args.poll_interval_secs, Some(Duration::from_secs(10)));
    }

    #[test]
    fn rejects_zero_poll_interval() {
        assert!(Args::try_parse_from(["etl-dashboard", "watch", "--poll-interval-secs", "0"]).is_err());
    }

    #[test]
    fn blank_token_flag_is_ignored() {
        let args = Args::try_parse_from(["etl-dashboard", "whoami", "--token", "  "]).unwrap();
        assert_eq!(flag_token(&args), None);

        let args = Args::try_parse_from(["etl-dashboard", "whoami", "--token", ""]).unwrap();
        assert_eq!(flag_token(&args), None);

        let args = Args::try_parse_from(["etl-dashboard", "whoami", "--token", " tok-1 "]).unwrap();
        assert_eq!(flag_token(&args), Some("tok-1"));
    }

    #[test]
    fn flags_override_config() {
        let args = Args::try_parse_from([
            "etl-dashboard",
            "jobs",
            "--backend-url",
            "http://override",
            "--poll-interval-secs",
            "7",
        ])
        .unwrap();
        let cfg = resolve_config(&args);
        assert_eq!(cfg.backend_url, "http://override");
        assert_eq!(cfg.poll_interval, Duration::from_secs(7));
    }

    #[tokio::test]
    async fn upload_reports_message_once_either_way() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("sales.csv");
        std::fs::write(&path, "region,total\nEU,10\n").unwrap();

        let backend = Arc::new(MockJobBackend::new());
        let message = upload_file(backend.clone(), AccessToken::new("tok"), path.clone())
            .await
            .unwrap();
        assert!(message.starts_with("Job created: "));

        backend
            .set_upload_response(Err(BackendError::Status {
                status: 400,
                message: "Only CSV allowed".to_string(),
            }))
            .await;
        let err = upload_file(backend, AccessToken::new("tok"), path)
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "Error: HTTP 400: Only CSV allowed");
    }
}
