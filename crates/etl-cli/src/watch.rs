//! Interactive dashboard: redraw on each changed poll, read commands from stdin.

use crate::cli::BoxError;
use etl_auth::SessionProvider;
use etl_dashboard::{Dashboard, DashboardConfig, JobRow, UrlOpener};
use etl_types::{JobBackend, JobId};
use std::path::PathBuf;
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, BufReader};

const HELP: &str = "commands: select <path> | upload [path] | download <job_id> | jobs | signout | quit";

#[derive(Debug, Clone, PartialEq, Eq)]
enum WatchCommand {
    Select(PathBuf),
    Upload(Option<PathBuf>),
    Download(JobId),
    Jobs,
    SignOut,
    Quit,
    Help,
    Empty,
    Unknown(String),
}

fn parse_command(line: &str) -> WatchCommand {
    let line = line.trim();
    let (verb, rest) = match line.split_once(char::is_whitespace) {
        Some((v, r)) => (v, r.trim()),
        None => (line, ""),
    };
    match (verb, rest) {
        ("", _) => WatchCommand::Empty,
        ("select", p) if !p.is_empty() => WatchCommand::Select(PathBuf::from(p)),
        ("upload", "") => WatchCommand::Upload(None),
        ("upload", p) => WatchCommand::Upload(Some(PathBuf::from(p))),
        ("download", id) if !id.is_empty() => WatchCommand::Download(JobId::from(id)),
        ("jobs", _) => WatchCommand::Jobs,
        ("signout" | "sign-out", _) => WatchCommand::SignOut,
        ("quit" | "exit" | "q", _) => WatchCommand::Quit,
        ("help" | "?", _) => WatchCommand::Help,
        _ => WatchCommand::Unknown(line.to_string()),
    }
}

pub async fn run(
    sessions: Arc<SessionProvider>,
    backend: Arc<dyn JobBackend>,
    config: &DashboardConfig,
    opener: Arc<dyn UrlOpener>,
) -> Result<(), BoxError> {
    let mut dashboard = Dashboard::mount(sessions, backend, config).await?;
    println!("{}", dashboard.render());
    println!("{HELP}");

    let mut updates = dashboard.job_list().subscribe();
    let mut last_rows: Vec<JobRow> = dashboard.job_list().rows();
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    loop {
        tokio::select! {
            changed = updates.changed() => {
                if changed.is_err() {
                    break;
                }
                let rows = dashboard.job_list().rows();
                if rows != last_rows {
                    println!("{}", dashboard.render());
                    last_rows = rows;
                }
            }
            line = lines.next_line() => {
                let Some(line) = line? else {
                    break;
                };
                match parse_command(&line) {
                    WatchCommand::Select(path) => {
                        dashboard.upload_form().select_file(path);
                    }
                    WatchCommand::Upload(path) => {
                        if let Some(path) = path {
                            dashboard.upload_form().select_file(path);
                        }
                        dashboard.upload_form().upload().await;
                        println!("{}", dashboard.upload_form().message());
                    }
                    WatchCommand::Download(job_id) => {
                        match dashboard.job_list().download(&job_id, opener.as_ref()).await {
                            Ok(url) => tracing::debug!(%url, "download opened"),
                            Err(e) => tracing::error!(job_id = %job_id, error = %e, "download failed"),
                        }
                    }
                    WatchCommand::Jobs => println!("{}", dashboard.render()),
                    WatchCommand::SignOut => {
                        dashboard.sign_out().await?;
                        println!("Signed out.");
                        return Ok(());
                    }
                    WatchCommand::Quit => break,
                    WatchCommand::Help => println!("{HELP}"),
                    WatchCommand::Empty => {}
                    WatchCommand::Unknown(cmd) => println!("unknown command: {cmd}\n{HELP}"),
                }
            }
            _ = tokio::signal::ctrl_c() => break,
        }
    }

    dashboard.unmount().await;
    Ok(())
}
