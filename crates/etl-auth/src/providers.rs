//! Identity providers: environment-backed and static credentials.

use async_trait::async_trait;
use etl_types::{AccessToken, Credentials, IdentityError, IdentityProvider};
use std::sync::atomic::{AtomicBool, Ordering};
use tokio::sync::Mutex;

/// Reads `ETL_ACCESS_TOKEN` (and optional `ETL_LOGIN_ID`) on every restore.
/// After `sign_out` it reports no session for the rest of the process.
#[derive(Debug, Default)]
pub struct EnvIdentityProvider {
    signed_out: AtomicBool,
}

impl EnvIdentityProvider {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl IdentityProvider for EnvIdentityProvider {
    async fn restore(&self) -> Result<Option<Credentials>, IdentityError> {
        if self.signed_out.load(Ordering::SeqCst) {
            return Ok(None);
        }
        let token = match std::env::var("ETL_ACCESS_TOKEN") {
            Ok(t) if !t.trim().is_empty() => t.trim().to_string(),
            _ => return Ok(None),
        };
        let login_id = std::env::var("ETL_LOGIN_ID")
            .ok()
            .filter(|s| !s.trim().is_empty());
        Ok(Some(Credentials {
            login_id,
            access_token: AccessToken::new(token),
        }))
    }

    async fn sign_out(&self) -> Result<(), IdentityError> {
        self.signed_out.store(true, Ordering::SeqCst);
        Ok(())
    }
}

/// Fixed credentials (e.g. passed with `--token`). Sign-out drops them.
#[derive(Debug)]
pub struct StaticIdentityProvider {
    credentials: Mutex<Option<Credentials>>,
}

impl StaticIdentityProvider {
    pub fn new(credentials: Credentials) -> Self {
        Self {
            credentials: Mutex::new(Some(credentials)),
        }
    }

    pub fn from_token(token: impl Into<String>, login_id: Option<String>) -> Self {
        Self::new(Credentials {
            login_id,
            access_token: AccessToken::new(token),
        })
    }

    /// A provider with no session at all.
    pub fn signed_out() -> Self {
        Self {
            credentials: Mutex::new(None),
        }
    }
}

#[async_trait]
impl IdentityProvider for StaticIdentityProvider {
    async fn restore(&self) -> Result<Option<Credentials>, IdentityError> {
        Ok(self.credentials.lock().await.clone())
    }

    async fn sign_out(&self) -> Result<(), IdentityError> {
        self.credentials.lock().await.take();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex as StdMutex;

    // Env vars are process-wide; every test that touches them holds this.
    static ENV_LOCK: StdMutex<()> = StdMutex::new(());

    fn set_env(token: Option<&str>, login: Option<&str>) {
        match token {
            Some(t) => std::env::set_var("ETL_ACCESS_TOKEN", t),
            None => std::env::remove_var("ETL_ACCESS_TOKEN"),
        }
        match login {
            Some(l) => std::env::set_var("ETL_LOGIN_ID", l),
            None => std::env::remove_var("ETL_LOGIN_ID"),
        }
    }

    #[tokio::test]
    async fn env_provider_reads_token_and_login() {
        let _guard = ENV_LOCK.lock().unwrap_or_else(|e| e.into_inner());
        set_env(Some("  tok-env \n"), Some("ana@example.com"));

        let creds = EnvIdentityProvider::new().restore().await.unwrap().unwrap();
        assert_eq!(creds.access_token.as_str(), "tok-env");
        assert_eq!(creds.login_id.as_deref(), Some("ana@example.com"));

        set_env(Some("tok-env"), Some("   "));
        let creds = EnvIdentityProvider::new().restore().await.unwrap().unwrap();
        assert_eq!(creds.login_id, None);

        set_env(None, None);
    }

    #[tokio::test]
    async fn env_provider_treats_blank_token_as_no_session() {
        let _guard = ENV_LOCK.lock().unwrap_or_else(|e| e.into_inner());
        let provider = EnvIdentityProvider::new();

        set_env(None, Some("ana@example.com"));
        assert!(provider.restore().await.unwrap().is_none());

        set_env(Some(""), None);
        assert!(provider.restore().await.unwrap().is_none());

        set_env(Some(" \t "), None);
        assert!(provider.restore().await.unwrap().is_none());

        set_env(None, None);
    }

    #[tokio::test]
    async fn env_provider_stays_signed_out() {
        let _guard = ENV_LOCK.lock().unwrap_or_else(|e| e.into_inner());
        set_env(Some("tok-env"), None);

        let provider = EnvIdentityProvider::new();
        assert!(provider.restore().await.unwrap().is_some());

        provider.sign_out().await.unwrap();
        assert!(provider.restore().await.unwrap().is_none());
        // The variable is still set; sign-out wins for the rest of the process.
        assert!(provider.restore().await.unwrap().is_none());

        set_env(None, None);
    }

    #[tokio::test]
    async fn static_provider_drops_credentials_on_sign_out() {
        let provider = StaticIdentityProvider::from_token("tok-flag", None);
        assert!(provider.restore().await.unwrap().is_some());
        provider.sign_out().await.unwrap();
        assert!(provider.restore().await.unwrap().is_none());
    }
}
