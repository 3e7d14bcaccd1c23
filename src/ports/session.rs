use async_trait::async_trait;
use thiserror::Error;

#[derive(Error, Debug, Clone)]
pub enum SessionError {
    #[error("Failed to read session: {0}")]
    Read(String),

    #[error("Failed to write session: {0}")]
    Write(String),
}

pub type SessionResult<T> = Result<T, SessionError>;

/// Holds the bearer token across reloads. Injected into both the API
/// client and the controller so tests can substitute an in-memory store.
/// No expiry tracking: token validity is discovered only when the backend
/// rejects a request.
#[async_trait]
pub trait SessionStore: Send + Sync {
    async fn token(&self) -> SessionResult<Option<String>>;
    async fn set_token(&self, token: &str) -> SessionResult<()>;
    async fn clear_token(&self) -> SessionResult<()>;
}
