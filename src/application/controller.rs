use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::sync::RwLock;

use super::{AppError, AppResult};
use crate::domain::{DashboardStats, NewUser, Project, ProjectDraft, ProjectId, ProjectPatch, User};
use crate::ports::{
    AuthRepository, DashboardRepository, ProjectRepository, RepositoryError, SessionStore,
};

/// Client-side session lifecycle. `LoadingSession` only exists while a
/// stored token is being validated against /auth/me.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    LoggedOut,
    LoadingSession,
    LoggedIn,
}

/// Orchestrates every network action for the view layer: login/logout,
/// loading user/projects/stats, project CRUD, and the shared loading/error
/// flags. Views never touch the repositories directly.
///
/// Errors are converted to displayable messages here; action methods also
/// return them as `AppResult` so the JSON subcommands can exit non-zero.
pub struct AppController {
    auth_repo: Arc<dyn AuthRepository>,
    project_repo: Arc<dyn ProjectRepository>,
    dashboard_repo: Arc<dyn DashboardRepository>,
    session: Arc<dyn SessionStore>,

    state: RwLock<SessionState>,
    current_user: RwLock<Option<User>>,
    projects: RwLock<Vec<Project>>,
    stats: RwLock<DashboardStats>,
    loading: AtomicBool,
    error: RwLock<Option<String>>,
}

impl AppController {
    pub fn new(
        auth_repo: Arc<dyn AuthRepository>,
        project_repo: Arc<dyn ProjectRepository>,
        dashboard_repo: Arc<dyn DashboardRepository>,
        session: Arc<dyn SessionStore>,
    ) -> Self {
        Self {
            auth_repo,
            project_repo,
            dashboard_repo,
            session,
            state: RwLock::new(SessionState::LoggedOut),
            current_user: RwLock::new(None),
            projects: RwLock::new(Vec::new()),
            stats: RwLock::new(DashboardStats::default()),
            loading: AtomicBool::new(false),
            error: RwLock::new(None),
        }
    }

    // State accessors for the view layer

    pub async fn state(&self) -> SessionState {
        *self.state.read().await
    }

    pub async fn current_user(&self) -> Option<User> {
        self.current_user.read().await.clone()
    }

    pub async fn projects(&self) -> Vec<Project> {
        self.projects.read().await.clone()
    }

    pub async fn stats(&self) -> DashboardStats {
        self.stats.read().await.clone()
    }

    pub fn is_loading(&self) -> bool {
        self.loading.load(Ordering::Relaxed)
    }

    pub async fn error_message(&self) -> Option<String> {
        self.error.read().await.clone()
    }

    /// Errors never auto-clear; they are dismissed explicitly or
    /// overwritten by the next action.
    pub async fn dismiss_error(&self) {
        *self.error.write().await = None;
    }

    /// True iff the signed-in user is an admin or created the project.
    pub async fn can_edit_project(&self, project: &Project) -> bool {
        match self.current_user.read().await.as_ref() {
            Some(user) => project.editable_by(user),
            None => false,
        }
    }

    // Session actions

    /// Validate a token left over from a previous run, if any. A rejected
    /// or unreachable validation clears the token and lands in LoggedOut
    /// with a generic error.
    pub async fn initialize(&self) -> AppResult<()> {
        let token = self.session.token().await?;
        if token.is_none() {
            *self.state.write().await = SessionState::LoggedOut;
            return Ok(());
        }

        *self.state.write().await = SessionState::LoadingSession;
        self.loading.store(true, Ordering::Relaxed);

        let result = match self.auth_repo.current_user().await {
            Ok(user) => {
                *self.current_user.write().await = Some(user);
                *self.state.write().await = SessionState::LoggedIn;
                self.refresh().await;
                Ok(())
            }
            Err(e) => {
                tracing::warn!("Stored session rejected: {e}");
                self.force_logout().await;
                let err = AppError::Application("Could not restore your session".to_string());
                *self.error.write().await = Some(err.to_string());
                Err(err)
            }
        };

        self.loading.store(false, Ordering::Relaxed);
        result
    }

    /// Any login failure surfaces as bad credentials, without revealing
    /// which field was wrong.
    pub async fn login(&self, username: &str, password: &str) -> AppResult<()> {
        self.loading.store(true, Ordering::Relaxed);
        *self.error.write().await = None;

        let result = match self.auth_repo.login(username, password).await {
            Ok((token, user)) => {
                // Losing the durable copy only costs the next restart a
                // fresh login; the session itself proceeds.
                if let Err(e) = self.session.set_token(&token).await {
                    tracing::warn!("Could not persist session token: {e}");
                }
                *self.current_user.write().await = Some(user);
                *self.state.write().await = SessionState::LoggedIn;
                self.refresh().await;
                Ok(())
            }
            Err(e) => {
                tracing::debug!("Login rejected: {e}");
                let err = AppError::InvalidCredentials;
                *self.error.write().await = Some(err.to_string());
                Err(err)
            }
        };

        self.loading.store(false, Ordering::Relaxed);
        result
    }

    /// Unconditional and idempotent; there is no server-side session to
    /// invalidate.
    pub async fn logout(&self) {
        self.force_logout().await;
    }

    pub async fn register(&self, new_user: &NewUser) -> AppResult<User> {
        self.loading.store(true, Ordering::Relaxed);
        *self.error.write().await = None;

        let result = self.auth_repo.register(new_user).await;
        if let Err(e) = &result {
            *self.error.write().await = Some(e.to_string());
        }

        self.loading.store(false, Ordering::Relaxed);
        result.map_err(Into::into)
    }

    // Project actions

    pub async fn get_project(&self, id: &ProjectId) -> AppResult<Project> {
        match self.project_repo.get_project(id).await {
            Ok(project) => Ok(project),
            Err(e) => Err(self.handle_protected_failure(e).await),
        }
    }

    pub async fn create_project(&self, draft: &ProjectDraft) -> AppResult<Project> {
        self.mutate(self.project_repo.create_project(draft)).await
    }

    pub async fn update_project(&self, id: &ProjectId, patch: &ProjectPatch) -> AppResult<Project> {
        self.mutate(self.project_repo.update_project(id, patch)).await
    }

    /// The confirmation step lives in the view layer; once called, the
    /// delete is unconditional.
    pub async fn delete_project(&self, id: &ProjectId) -> AppResult<()> {
        self.mutate(self.project_repo.delete_project(id)).await
    }

    /// Shared mutation path: run the call, then reload everything rather
    /// than patching local state, so the client can never drift from the
    /// backend.
    async fn mutate<T>(
        &self,
        op: impl std::future::Future<Output = Result<T, RepositoryError>>,
    ) -> AppResult<T> {
        self.loading.store(true, Ordering::Relaxed);
        *self.error.write().await = None;

        let result = match op.await {
            Ok(value) => {
                self.after_mutate().await;
                Ok(value)
            }
            Err(e) => Err(self.handle_protected_failure(e).await),
        };

        self.loading.store(false, Ordering::Relaxed);
        result
    }

    /// Post-mutation hook: full reload of the project list and the
    /// dashboard aggregates.
    async fn after_mutate(&self) {
        self.refresh().await;
    }

    /// Full reload of everything shown while logged in.
    pub async fn refresh(&self) {
        if let Err(e) = self.reload_projects().await {
            tracing::warn!("Project reload failed: {e}");
        }
        self.reload_stats().await;
    }

    /// The project list is critical: failures are surfaced, and a rejected
    /// token tears the session down.
    pub async fn reload_projects(&self) -> AppResult<()> {
        match self.project_repo.list_projects().await {
            Ok(projects) => {
                *self.projects.write().await = projects;
                Ok(())
            }
            Err(e) => Err(self.handle_protected_failure(e).await),
        }
    }

    /// On-demand aggregate fetch for callers that asked for stats
    /// explicitly; unlike the background reload, failures are surfaced.
    pub async fn fetch_stats(&self) -> AppResult<DashboardStats> {
        match self.dashboard_repo.dashboard_stats().await {
            Ok(stats) => {
                *self.stats.write().await = stats.clone();
                Ok(stats)
            }
            Err(e) => Err(self.handle_protected_failure(e).await),
        }
    }

    /// Stats are non-critical: a failed fetch is logged and swallowed, the
    /// previous aggregate stays on screen.
    async fn reload_stats(&self) {
        match self.dashboard_repo.dashboard_stats().await {
            Ok(stats) => *self.stats.write().await = stats,
            Err(e) => tracing::warn!("Dashboard stats fetch failed: {e}"),
        }
    }

    /// A 401 on a protected endpoint means the token is invalid or
    /// expired: force a transition to LoggedOut and clear it.
    async fn handle_protected_failure(&self, e: RepositoryError) -> AppError {
        let err = match e {
            RepositoryError::Authentication(_) => {
                self.force_logout().await;
                AppError::SessionExpired
            }
            other => AppError::Repository(other),
        };

        *self.error.write().await = Some(err.to_string());
        err
    }

    async fn force_logout(&self) {
        if let Err(e) = self.session.clear_token().await {
            tracing::warn!("Could not clear stored token: {e}");
        }
        *self.state.write().await = SessionState::LoggedOut;
        *self.current_user.write().await = None;
        self.projects.write().await.clear();
        *self.stats.write().await = DashboardStats::default();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::session::MemorySessionStore;
    use crate::domain::{ProjectStatus, UserId};
    use crate::ports::{
        MockAuthRepository, MockDashboardRepository, MockProjectRepository, SessionStore,
    };
    use chrono::NaiveDate;

    fn user(id: &str, role: &str) -> User {
        User {
            id: UserId(id.to_string()),
            username: "u".to_string(),
            name: "U".to_string(),
            email: "u@example.com".to_string(),
            role: role.to_string(),
        }
    }

    fn project(id: &str, created_by: &str, budget: f64) -> Project {
        Project {
            id: id.into(),
            name: format!("Project {id}"),
            description: String::new(),
            budget,
            start_date: "2024-03-01T00:00:00Z".parse().unwrap(),
            end_date: None,
            status: ProjectStatus::Active,
            created_by: UserId(created_by.to_string()),
        }
    }

    fn draft() -> ProjectDraft {
        ProjectDraft {
            name: "Alpha".to_string(),
            description: String::new(),
            budget: 1000.0,
            start_date: NaiveDate::from_ymd_opt(2024, 3, 1).unwrap(),
            end_date: None,
            status: ProjectStatus::Active,
        }
    }

    struct Mocks {
        auth: MockAuthRepository,
        projects: MockProjectRepository,
        dashboard: MockDashboardRepository,
        session: Arc<MemorySessionStore>,
    }

    impl Mocks {
        fn new() -> Self {
            Self {
                auth: MockAuthRepository::new(),
                projects: MockProjectRepository::new(),
                dashboard: MockDashboardRepository::new(),
                session: Arc::new(MemorySessionStore::new()),
            }
        }

        fn expect_login_ok(&mut self, token: &str, who: User) {
            let token = token.to_string();
            self.auth
                .expect_login()
                .times(1)
                .returning(move |_, _| Ok((token.clone(), who.clone())));
        }

        fn expect_list(&mut self, projects: Vec<Project>) {
            self.projects
                .expect_list_projects()
                .times(1)
                .returning(move || Ok(projects.clone()));
        }

        fn expect_stats(&mut self, stats: DashboardStats) {
            self.dashboard
                .expect_dashboard_stats()
                .times(1)
                .returning(move || Ok(stats.clone()));
        }

        fn build(self) -> (AppController, Arc<MemorySessionStore>) {
            let session = self.session.clone();
            (
                AppController::new(
                    Arc::new(self.auth),
                    Arc::new(self.projects),
                    Arc::new(self.dashboard),
                    self.session,
                ),
                session,
            )
        }
    }

    #[tokio::test]
    async fn login_success_persists_token_and_enters_logged_in() {
        let mut mocks = Mocks::new();
        mocks.expect_login_ok("tok-1", user("u1", "user"));
        mocks.expect_list(vec![project("p1", "u1", 500.0)]);
        mocks.expect_stats(DashboardStats::default());
        let (controller, session) = mocks.build();

        controller.login("user", "user123").await.unwrap();

        assert_eq!(controller.state().await, SessionState::LoggedIn);
        assert_eq!(session.token().await.unwrap(), Some("tok-1".to_string()));
        assert_eq!(controller.current_user().await.unwrap().id, UserId("u1".into()));
        assert_eq!(controller.projects().await.len(), 1);
        assert_eq!(controller.error_message().await, None);
    }

    #[tokio::test]
    async fn login_failure_stays_logged_out_without_token() {
        let mut mocks = Mocks::new();
        mocks.auth.expect_login().times(1).returning(|_, _| {
            Err(RepositoryError::Authentication(
                "Credenciales incorrectas".to_string(),
            ))
        });
        let (controller, session) = mocks.build();

        let result = controller.login("user", "wrong").await;

        assert!(matches!(result, Err(AppError::InvalidCredentials)));
        assert_eq!(controller.state().await, SessionState::LoggedOut);
        assert_eq!(session.token().await.unwrap(), None);
        assert_eq!(
            controller.error_message().await.as_deref(),
            Some("Invalid username or password")
        );
    }

    #[tokio::test]
    async fn logout_is_idempotent_and_clears_everything() {
        let mut mocks = Mocks::new();
        mocks.expect_login_ok("tok-1", user("u1", "user"));
        mocks.expect_list(vec![project("p1", "u1", 500.0)]);
        mocks.expect_stats(DashboardStats {
            total_projects: 1,
            total_budget: 500.0,
            ..Default::default()
        });
        let (controller, session) = mocks.build();

        controller.login("user", "user123").await.unwrap();
        controller.logout().await;
        controller.logout().await; // From LoggedOut as well

        assert_eq!(controller.state().await, SessionState::LoggedOut);
        assert_eq!(session.token().await.unwrap(), None);
        assert!(controller.projects().await.is_empty());
        assert_eq!(controller.stats().await, DashboardStats::default());
        assert_eq!(controller.current_user().await, None);
    }

    #[tokio::test]
    async fn initialize_without_token_goes_straight_to_logged_out() {
        let (controller, _) = Mocks::new().build();
        controller.initialize().await.unwrap();
        assert_eq!(controller.state().await, SessionState::LoggedOut);
    }

    #[tokio::test]
    async fn initialize_with_stored_token_restores_session() {
        let mut mocks = Mocks::new();
        mocks.session = Arc::new(MemorySessionStore::with_token("stale-but-valid"));
        let who = user("u1", "admin");
        mocks
            .auth
            .expect_current_user()
            .times(1)
            .returning(move || Ok(who.clone()));
        mocks.expect_list(vec![]);
        mocks.expect_stats(DashboardStats::default());
        let (controller, session) = mocks.build();

        controller.initialize().await.unwrap();

        assert_eq!(controller.state().await, SessionState::LoggedIn);
        assert_eq!(
            session.token().await.unwrap(),
            Some("stale-but-valid".to_string())
        );
    }

    #[tokio::test]
    async fn initialize_with_rejected_token_clears_it() {
        let mut mocks = Mocks::new();
        mocks.session = Arc::new(MemorySessionStore::with_token("expired"));
        mocks.auth.expect_current_user().times(1).returning(|| {
            Err(RepositoryError::Authentication("Token inválido".to_string()))
        });
        let (controller, session) = mocks.build();

        assert!(controller.initialize().await.is_err());

        assert_eq!(controller.state().await, SessionState::LoggedOut);
        assert_eq!(session.token().await.unwrap(), None);
        assert!(controller.error_message().await.is_some());
    }

    #[tokio::test]
    async fn create_reloads_projects_and_stats() {
        let mut mocks = Mocks::new();
        mocks.expect_login_ok("tok-1", user("u1", "user"));
        mocks.expect_list(vec![]);
        mocks.expect_stats(DashboardStats::default());

        let created = project("p1", "u1", 1000.0);
        mocks.projects.expect_create_project().times(1).returning({
            let created = created.clone();
            move |_| Ok(created.clone())
        });
        // The reload after the mutation reflects the new item and budget
        mocks.expect_list(vec![created.clone()]);
        mocks.expect_stats(DashboardStats {
            total_projects: 1,
            total_budget: 1000.0,
            ..Default::default()
        });
        let (controller, _) = mocks.build();

        controller.login("user", "user123").await.unwrap();
        assert!(controller.projects().await.is_empty());
        assert_eq!(controller.stats().await.total_budget, 0.0);

        controller.create_project(&draft()).await.unwrap();

        let projects = controller.projects().await;
        assert_eq!(projects.len(), 1);
        assert_eq!(projects[0].id, created.id);
        assert_eq!(controller.stats().await.total_budget, 1000.0);
    }

    #[tokio::test]
    async fn delete_reloads_and_excludes_removed_project() {
        let existing = project("p1", "u1", 250.0);
        let mut mocks = Mocks::new();
        mocks.expect_login_ok("tok-1", user("u1", "user"));
        mocks.expect_list(vec![existing.clone()]);
        mocks.expect_stats(DashboardStats::default());
        mocks
            .projects
            .expect_delete_project()
            .times(1)
            .returning(|_| Ok(()));
        mocks.expect_list(vec![]);
        mocks.expect_stats(DashboardStats::default());
        let (controller, _) = mocks.build();

        controller.login("user", "user123").await.unwrap();
        controller.delete_project(&existing.id).await.unwrap();

        assert!(controller.projects().await.is_empty());
    }

    #[tokio::test]
    async fn stats_failure_is_swallowed_but_list_failure_surfaces() {
        let mut mocks = Mocks::new();
        mocks.expect_login_ok("tok-1", user("u1", "user"));
        mocks.expect_list(vec![]);
        mocks
            .dashboard
            .expect_dashboard_stats()
            .times(1)
            .returning(|| Err(RepositoryError::Api("boom".to_string())));
        let (controller, _) = mocks.build();

        controller.login("user", "user123").await.unwrap();
        // Non-critical fetch failed silently
        assert_eq!(controller.error_message().await, None);
        assert_eq!(controller.state().await, SessionState::LoggedIn);

        mocks = Mocks::new();
        mocks
            .projects
            .expect_list_projects()
            .times(1)
            .returning(|| Err(RepositoryError::Api("boom".to_string())));
        let (controller, _) = mocks.build();

        assert!(controller.reload_projects().await.is_err());
        assert_eq!(
            controller.error_message().await.as_deref(),
            Some("API error: boom")
        );
    }

    #[tokio::test]
    async fn on_demand_stats_fetch_surfaces_failure() {
        let mut mocks = Mocks::new();
        mocks
            .dashboard
            .expect_dashboard_stats()
            .times(1)
            .returning(|| Err(RepositoryError::Api("boom".to_string())));
        let (controller, _) = mocks.build();

        // Explicitly requested stats must fail loudly, not return zeros
        assert!(controller.fetch_stats().await.is_err());
        assert_eq!(
            controller.error_message().await.as_deref(),
            Some("API error: boom")
        );
    }

    #[tokio::test]
    async fn on_demand_stats_fetch_stores_the_aggregate() {
        let mut mocks = Mocks::new();
        mocks.expect_stats(DashboardStats {
            total_projects: 3,
            total_budget: 750.0,
            ..Default::default()
        });
        let (controller, _) = mocks.build();

        let stats = controller.fetch_stats().await.unwrap();
        assert_eq!(stats.total_projects, 3);
        assert_eq!(controller.stats().await.total_budget, 750.0);
    }

    #[tokio::test]
    async fn rejected_protected_call_forces_logout() {
        let mut mocks = Mocks::new();
        mocks.expect_login_ok("tok-1", user("u1", "user"));
        mocks.expect_list(vec![]);
        mocks.expect_stats(DashboardStats::default());
        mocks.projects.expect_list_projects().times(1).returning(|| {
            Err(RepositoryError::Authentication("Token inválido".to_string()))
        });
        let (controller, session) = mocks.build();

        controller.login("user", "user123").await.unwrap();
        assert_eq!(controller.state().await, SessionState::LoggedIn);

        let result = controller.reload_projects().await;

        assert!(matches!(result, Err(AppError::SessionExpired)));
        assert_eq!(controller.state().await, SessionState::LoggedOut);
        assert_eq!(session.token().await.unwrap(), None);
    }

    #[tokio::test]
    async fn permission_predicate_requires_a_signed_in_user() {
        let (controller, _) = Mocks::new().build();
        assert!(!controller.can_edit_project(&project("p1", "u1", 0.0)).await);
    }

    #[tokio::test]
    async fn errors_stay_until_dismissed() {
        let mut mocks = Mocks::new();
        mocks
            .auth
            .expect_login()
            .times(1)
            .returning(|_, _| Err(RepositoryError::Network("unreachable".to_string())));
        let (controller, _) = mocks.build();

        let _ = controller.login("user", "pw").await;
        assert!(controller.error_message().await.is_some());

        controller.dismiss_error().await;
        assert_eq!(controller.error_message().await, None);
    }
}
