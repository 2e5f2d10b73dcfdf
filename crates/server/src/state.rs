use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::RwLock;
use tracing::info;
use uuid::Uuid;

use ticketrush_core::{Config, GameConfig, GameSession};

use crate::metrics::{SESSIONS_ACTIVE, SESSIONS_CREATED_TOTAL};

/// Returned when the session registry is full.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionLimitReached {
    pub max_sessions: usize,
}

/// Shared application state
pub struct AppState {
    config: Config,
    sessions: RwLock<HashMap<String, Arc<GameSession>>>,
}

impl AppState {
    pub fn new(config: Config) -> Self {
        Self {
            config,
            sessions: RwLock::new(HashMap::new()),
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Register a new idle session built from `game` and the configured
    /// scoring rules.
    pub async fn create_session(
        &self,
        game: GameConfig,
    ) -> Result<(String, Arc<GameSession>), SessionLimitReached> {
        let mut sessions = self.sessions.write().await;
        let max_sessions = self.config.server.max_sessions;
        if sessions.len() >= max_sessions {
            return Err(SessionLimitReached { max_sessions });
        }

        let id = Uuid::new_v4().to_string();
        let session = Arc::new(GameSession::new(game, self.config.scoring.clone()));
        sessions.insert(id.clone(), Arc::clone(&session));

        SESSIONS_CREATED_TOTAL.inc();
        SESSIONS_ACTIVE.set(sessions.len() as i64);
        info!(session_id = %id, total = sessions.len(), "Session created");
        Ok((id, session))
    }

    pub async fn session(&self, id: &str) -> Option<Arc<GameSession>> {
        self.sessions.read().await.get(id).cloned()
    }

    pub async fn remove_session(&self, id: &str) -> Option<Arc<GameSession>> {
        let mut sessions = self.sessions.write().await;
        let removed = sessions.remove(id);
        if removed.is_some() {
            SESSIONS_ACTIVE.set(sessions.len() as i64);
            info!(session_id = %id, total = sessions.len(), "Session removed");
        }
        removed
    }

    /// All sessions, ordered by id.
    pub async fn list_sessions(&self) -> Vec<(String, Arc<GameSession>)> {
        let sessions = self.sessions.read().await;
        let mut list: Vec<_> = sessions
            .iter()
            .map(|(id, session)| (id.clone(), Arc::clone(session)))
            .collect();
        list.sort_by(|a, b| a.0.cmp(&b.0));
        list
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn state_with_cap(max_sessions: usize) -> AppState {
        let mut config = Config::default();
        config.server.max_sessions = max_sessions;
        AppState::new(config)
    }

    #[tokio::test]
    async fn test_create_and_lookup_session() {
        let state = state_with_cap(4);
        let (id, _) = state.create_session(GameConfig::default()).await.unwrap();

        assert!(state.session(&id).await.is_some());
        assert!(state.session("missing").await.is_none());
        assert_eq!(state.list_sessions().await.len(), 1);
    }

    #[tokio::test]
    async fn test_session_cap() {
        let state = state_with_cap(1);
        state.create_session(GameConfig::default()).await.unwrap();

        let result = state.create_session(GameConfig::default()).await;
        assert_eq!(result.err(), Some(SessionLimitReached { max_sessions: 1 }));
    }

    #[tokio::test]
    async fn test_remove_frees_a_slot() {
        let state = state_with_cap(1);
        let (id, _) = state.create_session(GameConfig::default()).await.unwrap();

        assert!(state.remove_session(&id).await.is_some());
        assert!(state.remove_session(&id).await.is_none());
        let (new_id, _) = tokio_test::assert_ok!(state.create_session(GameConfig::default()).await);
        assert_ne!(new_id, id);
    }
}
