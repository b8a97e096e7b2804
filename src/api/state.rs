use std::collections::HashMap;
use std::sync::Arc;
use std::time::Instant;

use tokio::sync::Mutex;

use crate::ai::chat::Reviewer;
use crate::core::AppConfig;
use crate::gemini::SharedModelClient;

/// A reviewer for one user session. Locked for the duration of an
/// action so turns from two actions never interleave.
pub type SessionHandle = Arc<Mutex<Reviewer>>;

struct Session {
    reviewer: SessionHandle,
    last_used: Instant,
}

pub struct AppState {
    pub config: AppConfig,
    pub client: SharedModelClient,
    // Conversations keyed by session ID, held in memory only
    sessions: HashMap<String, Session>,
}

impl AppState {
    pub fn new(config: AppConfig, client: SharedModelClient) -> Self {
        Self {
            config,
            client,
            sessions: HashMap::new(),
        }
    }

    /// Look up the session or start a new one. Sessions that have been
    /// idle longer than the configured TTL are discarded first.
    pub fn get_or_create_session(&mut self, session_id: &str) -> SessionHandle {
        let now = Instant::now();
        self.evict_idle_sessions(now);

        let client = Arc::clone(&self.client);
        let language = self.config.language.clone();
        let session = self
            .sessions
            .entry(session_id.to_string())
            .or_insert_with(|| {
                tracing::info!("Starting review session {}", session_id);
                Session {
                    reviewer: Arc::new(Mutex::new(Reviewer::new(client, &language))),
                    last_used: now,
                }
            });
        session.last_used = now;
        Arc::clone(&session.reviewer)
    }

    pub fn find_session(&self, session_id: &str) -> Option<SessionHandle> {
        self.sessions
            .get(session_id)
            .map(|s| Arc::clone(&s.reviewer))
    }

    /// Drop sessions idle for longer than the TTL as of `now`. A
    /// session still held by a running action is kept. Returns the
    /// number of sessions removed.
    pub fn evict_idle_sessions(&mut self, now: Instant) -> usize {
        let ttl = self.config.session_ttl;
        let before = self.sessions.len();
        self.sessions.retain(|id, session| {
            let idle = now.saturating_duration_since(session.last_used) > ttl;
            let in_use = Arc::strong_count(&session.reviewer) > 1;
            if idle && !in_use {
                tracing::info!("Discarding idle review session {}", id);
                false
            } else {
                true
            }
        });
        before - self.sessions.len()
    }

    /// Discard the session's conversation. Returns `false` if there
    /// was no such session.
    pub fn end_session(&mut self, session_id: &str) -> bool {
        let removed = self.sessions.remove(session_id).is_some();
        if removed {
            tracing::info!("Ended review session {}", session_id);
        }
        removed
    }

    pub fn session_count(&self) -> usize {
        self.sessions.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::Secret;
    use crate::gemini::{ChatSession, ModelClient, ModelInvocationError};
    use async_trait::async_trait;
    use std::time::Duration;

    struct EchoClient;

    #[async_trait]
    impl ModelClient for EchoClient {
        async fn send_message(
            &self,
            _session: &ChatSession,
            text: &str,
        ) -> Result<String, ModelInvocationError> {
            Ok(text.to_string())
        }
    }

    fn test_state(session_ttl: Duration) -> AppState {
        let config = AppConfig {
            api_key: Secret::new("test-key"),
            system_instruction: String::from("You are a code reviewer."),
            model: String::from("gemini-1.5-pro"),
            api_hostname: String::from("http://localhost:9"),
            request_timeout: Duration::from_secs(5),
            session_ttl,
            language: String::from("Python"),
            upload_extension: String::from("py"),
        };
        AppState::new(config, Arc::new(EchoClient))
    }

    #[test]
    fn test_reuses_existing_session() {
        let mut state = test_state(Duration::from_secs(60));

        let first = state.get_or_create_session("s");
        let second = state.get_or_create_session("s");

        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(state.session_count(), 1);
    }

    #[test]
    fn test_evicts_idle_sessions() {
        let mut state = test_state(Duration::from_secs(60));
        for id in ["a", "b", "c"] {
            state.get_or_create_session(id);
        }
        assert_eq!(state.session_count(), 3);

        // Nothing is idle yet
        assert_eq!(state.evict_idle_sessions(Instant::now()), 0);

        let later = Instant::now() + Duration::from_secs(61);
        assert_eq!(state.evict_idle_sessions(later), 3);
        assert_eq!(state.session_count(), 0);
        assert!(state.find_session("a").is_none());
    }

    #[test]
    fn test_creating_session_evicts_idle_ones() {
        let mut state = test_state(Duration::from_secs(60));
        state.get_or_create_session("old");
        state.sessions.get_mut("old").unwrap().last_used -= Duration::from_secs(120);
        state.get_or_create_session("fresh");

        // Creating "fresh" evicted "old"
        assert_eq!(state.session_count(), 1);
        assert!(state.find_session("old").is_none());
        assert!(state.find_session("fresh").is_some());
    }

    #[test]
    fn test_keeps_sessions_in_use() {
        let mut state = test_state(Duration::from_secs(60));
        let held = state.get_or_create_session("busy");

        let later = Instant::now() + Duration::from_secs(120);
        assert_eq!(state.evict_idle_sessions(later), 0);
        assert_eq!(state.session_count(), 1);

        drop(held);
        assert_eq!(state.evict_idle_sessions(later), 1);
    }

    #[tokio::test]
    async fn test_many_anonymous_sessions_are_not_retained() {
        let mut state = test_state(Duration::ZERO);

        for n in 0..500 {
            let reviewer = state.get_or_create_session(&format!("session-{}", n));
            reviewer.lock().await.review("print(1)").await.unwrap();
        }

        let later = Instant::now() + Duration::from_secs(1);
        state.evict_idle_sessions(later);
        assert_eq!(state.session_count(), 0);
    }
}
