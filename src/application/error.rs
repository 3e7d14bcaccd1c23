use crate::ports::{RepositoryError, SessionError};
use thiserror::Error;

#[derive(Error, Debug, Clone)]
pub enum AppError {
    #[error("{0}")]
    Repository(#[from] RepositoryError),

    #[error("Session storage error: {0}")]
    Session(#[from] SessionError),

    /// Bad credentials at login. Deliberately does not say which field
    /// was wrong.
    #[error("Invalid username or password")]
    InvalidCredentials,

    /// A protected call was rejected; the session has been torn down.
    #[error("Session expired, please sign in again")]
    SessionExpired,

    #[error("{0}")]
    Application(String),
}

pub type AppResult<T> = Result<T, AppError>;
