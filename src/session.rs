use tokio::sync::{Mutex, MutexGuard, RwLock};

/// Where the relay stands with its upstream server.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionPhase {
    Disconnected,
    Connecting,
    Connected,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionSnapshot {
    pub server_url: Option<String>,
    pub session_id: Option<String>,
    /// Bumped by every connect; replies tagged with an older generation are stale.
    pub generation: u64,
    pub phase: ConnectionPhase,
}

#[derive(Debug)]
struct SessionState {
    server_url: Option<String>,
    session_id: Option<String>,
    generation: u64,
    phase: ConnectionPhase,
}

/// The relay's one upstream session: the server URL and the session id the
/// server handed out on `initialize`.
#[derive(Debug)]
pub struct Session {
    state: RwLock<SessionState>,
    connect_gate: Mutex<()>,
}

impl Session {
    pub fn new(server_url: Option<String>) -> Self {
        Session {
            state: RwLock::new(SessionState {
                server_url,
                session_id: None,
                generation: 0,
                phase: ConnectionPhase::Disconnected,
            }),
            connect_gate: Mutex::new(()),
        }
    }

    pub async fn snapshot(&self) -> SessionSnapshot {
        let state = self.state.read().await;
        SessionSnapshot {
            server_url: state.server_url.clone(),
            session_id: state.session_id.clone(),
            generation: state.generation,
            phase: state.phase,
        }
    }

    pub async fn current_server_url(&self) -> Option<String> {
        self.state.read().await.server_url.clone()
    }

    /// Serializes whole connect handshakes. Hold the guard until `finish_connect`.
    pub async fn lock_connect(&self) -> MutexGuard<'_, ()> {
        self.connect_gate.lock().await
    }

    /// Starts a new connection attempt. The session id is cleared before the
    /// caller sends `initialize`, so the handshake never carries a stale id.
    pub async fn begin_connect(&self, server_url: Option<String>) -> SessionSnapshot {
        let mut state = self.state.write().await;
        if let Some(url) = server_url {
            state.server_url = Some(url);
        }
        state.session_id = None;
        state.generation += 1;
        state.phase = ConnectionPhase::Connecting;
        SessionSnapshot {
            server_url: state.server_url.clone(),
            session_id: None,
            generation: state.generation,
            phase: state.phase,
        }
    }

    /// Stores a session id seen on a reply. Returns false when the reply
    /// belongs to a connection that has since been replaced.
    pub async fn record_session_id(&self, generation: u64, session_id: String) -> bool {
        let mut state = self.state.write().await;
        if state.generation != generation {
            return false;
        }
        state.session_id = Some(session_id);
        true
    }

    pub async fn finish_connect(&self, generation: u64, succeeded: bool) -> ConnectionPhase {
        let mut state = self.state.write().await;
        if state.generation == generation {
            state.phase = if succeeded {
                ConnectionPhase::Connected
            } else {
                ConnectionPhase::Disconnected
            };
        }
        state.phase
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn starts_disconnected_without_a_session() {
        let session = Session::new(Some("http://localhost:8000/mcp".to_string()));
        let snapshot = session.snapshot().await;
        assert_eq!(snapshot.phase, ConnectionPhase::Disconnected);
        assert_eq!(snapshot.server_url.as_deref(), Some("http://localhost:8000/mcp"));
        assert!(snapshot.session_id.is_none());
    }

    #[tokio::test]
    async fn connect_lifecycle() {
        let session = Session::new(Some("http://a/mcp".to_string()));

        let attempt = session.begin_connect(None).await;
        assert_eq!(attempt.phase, ConnectionPhase::Connecting);
        assert_eq!(attempt.server_url.as_deref(), Some("http://a/mcp"));
        assert!(session.record_session_id(attempt.generation, "s-1".to_string()).await);
        assert_eq!(session.finish_connect(attempt.generation, true).await, ConnectionPhase::Connected);
        assert_eq!(session.snapshot().await.session_id.as_deref(), Some("s-1"));

        let retry = session.begin_connect(Some("http://b/mcp".to_string())).await;
        assert!(retry.session_id.is_none());
        assert_eq!(session.snapshot().await.session_id, None);
        assert_eq!(session.current_server_url().await.as_deref(), Some("http://b/mcp"));
        assert_eq!(session.finish_connect(retry.generation, false).await, ConnectionPhase::Disconnected);
    }

    #[tokio::test]
    async fn stale_generation_cannot_overwrite() {
        let session = Session::new(None);
        let first = session.begin_connect(Some("http://a/mcp".to_string())).await;
        let second = session.begin_connect(Some("http://b/mcp".to_string())).await;

        assert!(!session.record_session_id(first.generation, "old".to_string()).await);
        assert_eq!(session.finish_connect(first.generation, true).await, ConnectionPhase::Connecting);

        assert!(session.record_session_id(second.generation, "new".to_string()).await);
        let snapshot = session.snapshot().await;
        assert_eq!(snapshot.session_id.as_deref(), Some("new"));
        assert_eq!(snapshot.server_url.as_deref(), Some("http://b/mcp"));
    }
}
