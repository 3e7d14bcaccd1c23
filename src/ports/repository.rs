use async_trait::async_trait;
#[cfg(test)]
use mockall::automock;
use thiserror::Error;

use crate::domain::{DashboardStats, NewUser, Project, ProjectDraft, ProjectId, ProjectPatch, User};

#[derive(Error, Debug, Clone)]
pub enum RepositoryError {
    /// The request never produced a response (DNS, refused connection,
    /// timeout). Carries no HTTP status.
    #[error("Network error: {0}")]
    Network(String),

    /// The backend rejected the bearer token or the credentials (401).
    #[error("Authentication failed: {0}")]
    Authentication(String),

    #[error("Not found: {0}")]
    NotFound(String),

    /// Any other non-success response, with the server's message when one
    /// could be parsed.
    #[error("API error: {0}")]
    Api(String),

    #[error("Serialization error: {0}")]
    Serialization(String),
}

pub type RepositoryResult<T> = Result<T, RepositoryError>;

#[cfg_attr(test, automock)]
#[async_trait]
pub trait AuthRepository: Send + Sync {
    /// Exchange credentials for a bearer token and the account it belongs to.
    async fn login(&self, username: &str, password: &str) -> RepositoryResult<(String, User)>;
    async fn register(&self, new_user: &NewUser) -> RepositoryResult<User>;
    /// "Who am I" call; also serves as the token validity probe.
    async fn current_user(&self) -> RepositoryResult<User>;
}

#[cfg_attr(test, automock)]
#[async_trait]
pub trait ProjectRepository: Send + Sync {
    async fn list_projects(&self) -> RepositoryResult<Vec<Project>>;
    async fn get_project(&self, id: &ProjectId) -> RepositoryResult<Project>;
    async fn create_project(&self, draft: &ProjectDraft) -> RepositoryResult<Project>;
    async fn update_project(&self, id: &ProjectId, patch: &ProjectPatch)
        -> RepositoryResult<Project>;
    async fn delete_project(&self, id: &ProjectId) -> RepositoryResult<()>;
}

#[cfg_attr(test, automock)]
#[async_trait]
pub trait DashboardRepository: Send + Sync {
    async fn dashboard_stats(&self) -> RepositoryResult<DashboardStats>;
}
