//! Session provider: establish/restore a session, expose identity and token, sign out.

use crate::claims::TokenClaims;
use chrono::Utc;
use etl_types::{AccessToken, Credentials, IdentityError, IdentityProvider};
use std::sync::Arc;
use tokio::sync::RwLock;

/// Label shown when neither the provider nor the token names the user.
pub const UNKNOWN_LOGIN: &str = "unknown";

/// Display identity of the signed-in user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identity {
    pub login_id: String,
}

/// A live session: identity plus the bearer token every request carries.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    identity: Identity,
    token: AccessToken,
}

impl Session {
    pub fn from_credentials(credentials: Credentials) -> Self {
        let claims = TokenClaims::decode(credentials.access_token.as_str());
        if let Some(ref c) = claims {
            if c.is_expired_at(Utc::now()) {
                tracing::warn!(
                    expires_at = ?c.expires_at(),
                    "access token is past its expiry; the backend may reject it"
                );
            }
        }
        let login_id = credentials
            .login_id
            .filter(|s| !s.is_empty())
            .or_else(|| {
                claims
                    .as_ref()
                    .and_then(|c| c.display_name())
                    .map(String::from)
            })
            .unwrap_or_else(|| UNKNOWN_LOGIN.to_string());
        Self {
            identity: Identity { login_id },
            token: credentials.access_token,
        }
    }

    pub fn identity(&self) -> &Identity {
        &self.identity
    }

    pub fn token(&self) -> &AccessToken {
        &self.token
    }
}

/// Wraps an identity provider and caches the session it hands back.
pub struct SessionProvider {
    provider: Arc<dyn IdentityProvider>,
    current: RwLock<Option<Session>>,
}

impl SessionProvider {
    pub fn new(provider: Arc<dyn IdentityProvider>) -> Self {
        Self {
            provider,
            current: RwLock::new(None),
        }
    }

    /// Establish or restore a session. `Ok(None)` when the identity service has none.
    pub async fn establish(&self) -> Result<Option<Session>, IdentityError> {
        let restored = self.provider.restore().await?;
        let session = restored.map(Session::from_credentials);
        match &session {
            Some(s) => tracing::info!(login = %s.identity.login_id, "session established"),
            None => tracing::info!("no session available"),
        }
        *self.current.write().await = session.clone();
        Ok(session)
    }

    pub async fn current(&self) -> Option<Session> {
        self.current.read().await.clone()
    }

    /// Current session, or `NotSignedIn`.
    pub async fn require(&self) -> Result<Session, IdentityError> {
        self.current().await.ok_or(IdentityError::NotSignedIn)
    }

    /// End the session locally and with the identity service.
    pub async fn sign_out(&self) -> Result<(), IdentityError> {
        let previous = self.current.write().await.take();
        self.provider.sign_out().await?;
        if let Some(s) = previous {
            tracing::info!(login = %s.identity.login_id, "signed out");
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::StaticIdentityProvider;

    #[tokio::test]
    async fn establish_then_sign_out() {
        let provider = Arc::new(StaticIdentityProvider::from_token(
            "opaque",
            Some("ana@example.com".to_string()),
        ));
        let sessions = SessionProvider::new(provider.clone());
        assert!(sessions.current().await.is_none());

        let session = sessions.establish().await.unwrap().unwrap();
        assert_eq!(session.identity().login_id, "ana@example.com");
        assert_eq!(session.token().as_str(), "opaque");
        assert_eq!(sessions.require().await.unwrap(), session);

        sessions.sign_out().await.unwrap();
        assert!(sessions.current().await.is_none());
        assert_eq!(sessions.require().await, Err(IdentityError::NotSignedIn));
        // The provider itself was signed out, so a fresh restore finds nothing.
        assert!(provider.restore().await.unwrap().is_none());
        assert!(sessions.establish().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn no_session_when_provider_has_none() {
        let sessions = SessionProvider::new(Arc::new(StaticIdentityProvider::signed_out()));
        assert!(sessions.establish().await.unwrap().is_none());
        assert_eq!(sessions.require().await, Err(IdentityError::NotSignedIn));
    }

    #[test]
    fn opaque_token_without_login_is_unknown() {
        let session = Session::from_credentials(Credentials {
            login_id: None,
            access_token: AccessToken::new("opaque"),
        });
        assert_eq!(session.identity().login_id, UNKNOWN_LOGIN);
    }
}
