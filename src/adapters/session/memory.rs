use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::ports::{SessionResult, SessionStore};

/// In-memory session for tests and ephemeral runs; nothing survives the
/// process.
#[derive(Default)]
pub struct MemorySessionStore {
    token: RwLock<Option<String>>,
}

impl MemorySessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_token(token: &str) -> Self {
        Self {
            token: RwLock::new(Some(token.to_string())),
        }
    }
}

#[async_trait]
impl SessionStore for MemorySessionStore {
    async fn token(&self) -> SessionResult<Option<String>> {
        Ok(self.token.read().await.clone())
    }

    async fn set_token(&self, token: &str) -> SessionResult<()> {
        *self.token.write().await = Some(token.to_string());
        Ok(())
    }

    async fn clear_token(&self) -> SessionResult<()> {
        *self.token.write().await = None;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn set_get_clear_round_trip() {
        let store = MemorySessionStore::new();
        assert_eq!(store.token().await.unwrap(), None);

        store.set_token("abc123").await.unwrap();
        assert_eq!(store.token().await.unwrap(), Some("abc123".to_string()));

        store.clear_token().await.unwrap();
        assert_eq!(store.token().await.unwrap(), None);

        // Clearing an already-empty session is fine
        store.clear_token().await.unwrap();
        assert_eq!(store.token().await.unwrap(), None);
    }
}
