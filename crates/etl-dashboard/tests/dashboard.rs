//! Dashboard composition: session gate, upload/poll decoupling, sign-out.

use etl_auth::{SessionProvider, StaticIdentityProvider};
use etl_client::MockJobBackend;
use etl_dashboard::{Dashboard, DashboardConfig, DashboardError, UploadOutcome, EMPTY_LIST_MESSAGE};
use std::sync::Arc;
use std::time::Duration;

fn config() -> DashboardConfig {
    DashboardConfig {
        backend_url: "http://etl.test".to_string(),
        poll_interval: Duration::from_secs(5),
    }
}

fn signed_in() -> Arc<SessionProvider> {
    Arc::new(SessionProvider::new(Arc::new(
        StaticIdentityProvider::from_token("tok-dash", Some("ana@example.com".to_string())),
    )))
}

#[tokio::test]
async fn no_session_means_no_dashboard() {
    let sessions = Arc::new(SessionProvider::new(Arc::new(
        StaticIdentityProvider::signed_out(),
    )));
    let backend = Arc::new(MockJobBackend::new());

    let res = Dashboard::mount(sessions, backend.clone(), &config()).await;
    assert!(matches!(res, Err(DashboardError::NotSignedIn)));
    assert_eq!(backend.list_calls(), 0);
}

#[tokio::test]
async fn header_and_empty_list() {
    let backend = Arc::new(MockJobBackend::new());
    let dashboard = Dashboard::mount(signed_in(), backend, &config())
        .await
        .unwrap();

    assert_eq!(dashboard.header(), "Signed in as: ana@example.com");
    let screen = dashboard.render();
    assert!(screen.starts_with("Signed in as: ana@example.com\n"));
    assert!(screen.ends_with(EMPTY_LIST_MESSAGE));

    dashboard.sign_out().await.unwrap();
}

#[tokio::test(start_paused = true)]
async fn uploaded_job_appears_on_next_poll_only() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("sales.csv");
    std::fs::write(&path, "region,total\nEU,10\n").unwrap();

    let backend = Arc::new(MockJobBackend::new());
    let mut dashboard = Dashboard::mount(signed_in(), backend.clone(), &config())
        .await
        .unwrap();

    dashboard.upload_form().select_file(&path);
    let outcome = dashboard.upload_form().upload().await;
    assert!(matches!(outcome, UploadOutcome::Created(_)));
    assert!(dashboard.render().contains("Job created: "));
    assert!(dashboard.job_list().jobs().is_empty());

    tokio::time::sleep(Duration::from_millis(5_500)).await;
    let jobs = dashboard.job_list().jobs();
    assert_eq!(jobs.len(), 1);
    assert_eq!(jobs[0].filename, "sales.csv");
    assert!(dashboard.render().contains("sales.csv → QUEUED"));

    dashboard.sign_out().await.unwrap();
}

#[tokio::test(start_paused = true)]
async fn sign_out_stops_polling_and_ends_session() {
    let sessions = signed_in();
    let backend = Arc::new(MockJobBackend::new());
    let dashboard = Dashboard::mount(Arc::clone(&sessions), backend.clone(), &config())
        .await
        .unwrap();
    assert!(sessions.current().await.is_some());

    tokio::time::sleep(Duration::from_millis(5_500)).await;
    let calls = backend.list_calls();
    assert_eq!(calls, 1);

    dashboard.sign_out().await.unwrap();
    assert!(sessions.current().await.is_none());
    assert!(sessions.establish().await.unwrap().is_none());

    tokio::time::sleep(Duration::from_secs(30)).await;
    assert_eq!(backend.list_calls(), calls);
}
