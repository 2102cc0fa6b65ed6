use rand::{Rng, distributions::Alphanumeric};
use secrecy::SecretString;
use std::{
    collections::HashMap,
    sync::Arc,
    time::{Duration, Instant},
};
use tokio::sync::RwLock;
use types::Provider;

/// How long the provider has to send the browser back to `/auth`.
pub const PENDING_TTL: Duration = Duration::from_secs(600);

pub fn random_token(len: usize) -> String {
    rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(len)
        .map(char::from)
        .collect()
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SessionId(String);

impl SessionId {
    pub fn new() -> Self {
        Self(random_token(32))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<String> for SessionId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

#[derive(Debug, Clone)]
pub enum Session {
    AuthenticationRequested {
        provider: Provider,
        csrf_state: String,
        pkce_verifier: String,
        redirect_uri: String,
        created: Instant,
    },
    Authenticated {
        provider: Provider,
        access_token: SecretString,
        expires_at: Instant,
    },
}

impl Session {
    pub fn provider(&self) -> Provider {
        match self {
            Session::AuthenticationRequested { provider, .. }
            | Session::Authenticated { provider, .. } => *provider,
        }
    }

    pub fn is_expired(&self, now: Instant) -> bool {
        match self {
            Session::AuthenticationRequested { created, .. } => {
                now.duration_since(*created) >= PENDING_TTL
            }
            Session::Authenticated { expires_at, .. } => *expires_at <= now,
        }
    }
}

#[derive(Clone, Default)]
pub struct SessionStore {
    sessions: Arc<RwLock<HashMap<SessionId, Session>>>,
}

impl SessionStore {
    pub async fn get(&self, id: &SessionId) -> Option<Session> {
        self.sessions.read().await.get(id).cloned()
    }

    pub async fn insert(&self, id: SessionId, session: Session) {
        self.sessions.write().await.insert(id, session);
    }

    pub async fn remove(&self, id: &SessionId) -> Option<Session> {
        self.sessions.write().await.remove(id)
    }

    pub async fn purge_expired(&self) {
        let now = Instant::now();
        let mut sessions = self.sessions.write().await;
        let before = sessions.len();
        sessions.retain(|_, session| !session.is_expired(now));
        let purged = before - sessions.len();
        if purged > 0 {
            tracing::debug!(purged, "dropped expired sessions");
        }
    }

    #[cfg(test)]
    pub async fn len(&self) -> usize {
        self.sessions.read().await.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pending(created: Instant) -> Session {
        Session::AuthenticationRequested {
            provider: Provider::Google,
            csrf_state: "state".into(),
            pkce_verifier: "verifier".into(),
            redirect_uri: "http://localhost/auth".into(),
            created,
        }
    }

    fn authenticated(expires_at: Instant) -> Session {
        Session::Authenticated {
            provider: Provider::Microsoft,
            access_token: "token".to_string().into(),
            expires_at,
        }
    }

    #[test]
    fn tokens_are_alphanumeric() {
        let token = random_token(64);
        assert_eq!(token.len(), 64);
        assert!(token.chars().all(|c| c.is_ascii_alphanumeric()));
        assert_ne!(SessionId::new(), SessionId::new());
    }

    #[test]
    fn expiry() {
        let now = Instant::now();
        assert!(!pending(now).is_expired(now));
        assert!(pending(now).is_expired(now + PENDING_TTL));
        assert!(!authenticated(now + Duration::from_secs(60)).is_expired(now));
        assert!(authenticated(now).is_expired(now));
        assert_eq!(pending(now).provider(), Provider::Google);
    }

    #[tokio::test]
    async fn purge_keeps_live_sessions() {
        let store = SessionStore::default();
        let live = SessionId::new();
        let now = Instant::now();
        store
            .insert(live.clone(), authenticated(now + Duration::from_secs(3600)))
            .await;
        store.insert(SessionId::new(), authenticated(now)).await;

        store.purge_expired().await;

        assert_eq!(store.len().await, 1);
        assert!(store.get(&live).await.is_some());
        assert!(store.remove(&live).await.is_some());
        assert!(store.get(&live).await.is_none());
    }
}
