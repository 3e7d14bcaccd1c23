use async_trait::async_trait;

use super::client::ApiClient;
use super::dto::{
    LoginDto, LoginResponseDto, ProjectCreateDto, ProjectDto, ProjectUpdateDto, RegisterDto,
    StatsDto, UserDto,
};
use crate::domain::{DashboardStats, NewUser, Project, ProjectDraft, ProjectId, ProjectPatch, User};
use crate::ports::{
    AuthRepository, DashboardRepository, ProjectRepository, RepositoryResult,
};

/// All three repository ports over the one HTTP client; every operation is
/// a single round-trip against the ProManage backend.
pub struct HttpProManageRepository {
    client: ApiClient,
}

impl HttpProManageRepository {
    pub fn new(client: ApiClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl AuthRepository for HttpProManageRepository {
    async fn login(&self, username: &str, password: &str) -> RepositoryResult<(String, User)> {
        let body = LoginDto {
            username: username.to_string(),
            password: password.to_string(),
        };

        let response: LoginResponseDto = self.client.post("/auth/login", &body).await?;
        Ok((response.access_token, response.user.into()))
    }

    async fn register(&self, new_user: &NewUser) -> RepositoryResult<User> {
        let body = RegisterDto::from(new_user);
        let user: UserDto = self.client.post("/auth/register", &body).await?;
        Ok(user.into())
    }

    async fn current_user(&self) -> RepositoryResult<User> {
        let user: UserDto = self.client.get("/auth/me").await?;
        Ok(user.into())
    }
}

#[async_trait]
impl ProjectRepository for HttpProManageRepository {
    async fn list_projects(&self) -> RepositoryResult<Vec<Project>> {
        let projects: Vec<ProjectDto> = self.client.get("/projects").await?;
        Ok(projects.into_iter().map(Into::into).collect())
    }

    async fn get_project(&self, id: &ProjectId) -> RepositoryResult<Project> {
        let project: ProjectDto = self.client.get(&format!("/projects/{id}")).await?;
        Ok(project.into())
    }

    async fn create_project(&self, draft: &ProjectDraft) -> RepositoryResult<Project> {
        let body = ProjectCreateDto::from(draft);
        let project: ProjectDto = self.client.post("/projects", &body).await?;
        Ok(project.into())
    }

    async fn update_project(
        &self,
        id: &ProjectId,
        patch: &ProjectPatch,
    ) -> RepositoryResult<Project> {
        let body = ProjectUpdateDto::from(patch);
        let project: ProjectDto = self.client.put(&format!("/projects/{id}"), &body).await?;
        Ok(project.into())
    }

    async fn delete_project(&self, id: &ProjectId) -> RepositoryResult<()> {
        self.client.delete(&format!("/projects/{id}")).await
    }
}

#[async_trait]
impl DashboardRepository for HttpProManageRepository {
    async fn dashboard_stats(&self) -> RepositoryResult<DashboardStats> {
        let stats: StatsDto = self.client.get("/dashboard/stats").await?;
        Ok(stats.into())
    }
}
