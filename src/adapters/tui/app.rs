use color_eyre::Result;
use std::sync::Arc;

use super::{
    event::{AppEvent, EventHandler},
    widgets::TextField,
};
use crate::application::{AppController, SessionState};
use crate::domain::{
    DashboardStats, Project, ProjectDraft, ProjectPatch, ProjectStatus, User,
};
use chrono::NaiveDate;
use ratatui::{
    prelude::*,
    widgets::{
        Block, BorderType, Borders, Cell, Clear, Paragraph, Row, Table, TableState, Wrap,
    },
};

#[derive(Debug, Clone, Copy, PartialEq)]
enum AppMode {
    Login,
    Main,
    Help,
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum ActiveTab {
    Dashboard,
    Projects,
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum LoginField {
    Username,
    Password,
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum FormField {
    Name,
    Description,
    Budget,
    StartDate,
    EndDate,
    Status,
}

/// Create/edit dialog state. Everything is edited as text; `to_draft`
/// validates on submit.
struct ProjectForm {
    editing: Option<Project>,
    name: TextField,
    description: TextField,
    budget: TextField,
    start_date: TextField,
    end_date: TextField,
    status: ProjectStatus,
    focus: FormField,
    validation: Option<String>,
}

impl ProjectForm {
    fn create() -> Self {
        Self {
            editing: None,
            name: TextField::new("Project name *"),
            description: TextField::new("Description"),
            budget: TextField::new("Budget"),
            start_date: TextField::new("Start date (YYYY-MM-DD) *"),
            end_date: TextField::new("End date (YYYY-MM-DD)"),
            status: ProjectStatus::Active,
            focus: FormField::Name,
            validation: None,
        }
    }

    /// Pre-fill from an existing project; timestamps come back as the
    /// calendar dates the user originally typed.
    fn edit(project: Project) -> Self {
        let draft = ProjectDraft::from_project(&project);
        Self {
            name: TextField::with_value("Project name *", &draft.name),
            description: TextField::with_value("Description", &draft.description),
            budget: TextField::with_value("Budget", &format!("{}", draft.budget)),
            start_date: TextField::with_value(
                "Start date (YYYY-MM-DD) *",
                &draft.start_date.format("%Y-%m-%d").to_string(),
            ),
            end_date: TextField::with_value(
                "End date (YYYY-MM-DD)",
                &draft
                    .end_date
                    .map(|d| d.format("%Y-%m-%d").to_string())
                    .unwrap_or_default(),
            ),
            status: draft.status,
            focus: FormField::Name,
            validation: None,
            editing: Some(project),
        }
    }

    fn title(&self) -> &'static str {
        if self.editing.is_some() {
            "Edit Project"
        } else {
            "New Project"
        }
    }

    fn focused_field(&mut self) -> Option<&mut TextField> {
        match self.focus {
            FormField::Name => Some(&mut self.name),
            FormField::Description => Some(&mut self.description),
            FormField::Budget => Some(&mut self.budget),
            FormField::StartDate => Some(&mut self.start_date),
            FormField::EndDate => Some(&mut self.end_date),
            FormField::Status => None,
        }
    }

    fn focus_next(&mut self) {
        self.focus = match self.focus {
            FormField::Name => FormField::Description,
            FormField::Description => FormField::Budget,
            FormField::Budget => FormField::StartDate,
            FormField::StartDate => FormField::EndDate,
            FormField::EndDate => FormField::Status,
            FormField::Status => FormField::Name,
        };
    }

    fn focus_prev(&mut self) {
        self.focus = match self.focus {
            FormField::Name => FormField::Status,
            FormField::Description => FormField::Name,
            FormField::Budget => FormField::Description,
            FormField::StartDate => FormField::Budget,
            FormField::EndDate => FormField::StartDate,
            FormField::Status => FormField::EndDate,
        };
    }

    fn can_submit(&self) -> bool {
        !self.name.is_empty() && parse_date(self.start_date.value()).is_some()
    }

    fn to_draft(&self) -> std::result::Result<ProjectDraft, String> {
        if self.name.is_empty() {
            return Err("Project name is required".to_string());
        }

        let start_date = parse_date(self.start_date.value())
            .ok_or_else(|| "Start date must be YYYY-MM-DD".to_string())?;

        let end_date = if self.end_date.is_empty() {
            None
        } else {
            Some(
                parse_date(self.end_date.value())
                    .ok_or_else(|| "End date must be YYYY-MM-DD".to_string())?,
            )
        };

        Ok(ProjectDraft {
            name: self.name.value().to_string(),
            description: self.description.value().to_string(),
            budget: ProjectDraft::parse_budget(self.budget.value()),
            start_date,
            end_date,
            status: self.status,
        })
    }
}

fn parse_date(input: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(input.trim(), "%Y-%m-%d").ok()
}

enum Modal {
    ProjectForm(Box<ProjectForm>),
    ConfirmDelete(Project),
}

pub struct App {
    controller: Arc<AppController>,

    // UI state
    mode: AppMode,
    active_tab: ActiveTab,
    modal: Option<Modal>,

    // Login form
    username: TextField,
    password: TextField,
    login_focus: LoginField,

    // Snapshots of controller state, refreshed after every action
    current_user: Option<User>,
    projects: Vec<Project>,
    stats: DashboardStats,
    is_loading: bool,
    error_message: Option<String>,

    project_table_state: TableState,
}

impl App {
    pub fn new(controller: Arc<AppController>) -> Self {
        Self {
            controller,
            mode: AppMode::Login,
            active_tab: ActiveTab::Dashboard,
            modal: None,
            username: TextField::new("Username"),
            password: TextField::masked("Password"),
            login_focus: LoginField::Username,
            current_user: None,
            projects: Vec::new(),
            stats: DashboardStats::default(),
            is_loading: false,
            error_message: None,
            project_table_state: TableState::default(),
        }
    }

    pub async fn initialize(&mut self) -> Result<()> {
        // A rejected stored token just lands us on the login screen with
        // the error banner set; not fatal.
        let _ = self.controller.initialize().await;
        self.sync().await;
        Ok(())
    }

    /// Pull the controller's state into the view. Also notices a forced
    /// logout (rejected token) and drops back to the login screen.
    async fn sync(&mut self) {
        self.current_user = self.controller.current_user().await;
        self.projects = self.controller.projects().await;
        self.stats = self.controller.stats().await;
        self.is_loading = self.controller.is_loading();
        self.error_message = self.controller.error_message().await;

        match self.controller.state().await {
            SessionState::LoggedIn => {
                if self.mode == AppMode::Login {
                    self.mode = AppMode::Main;
                    self.active_tab = ActiveTab::Dashboard;
                    self.password.clear();
                }
            }
            SessionState::LoggedOut => {
                if self.mode != AppMode::Login {
                    self.mode = AppMode::Login;
                    self.modal = None;
                    self.password.clear();
                }
            }
            SessionState::LoadingSession => {}
        }

        // Keep the table selection in bounds after a reload
        let len = self.projects.len();
        match self.project_table_state.selected() {
            Some(i) if i >= len && len > 0 => self.project_table_state.select(Some(len - 1)),
            Some(_) if len == 0 => self.project_table_state.select(None),
            None if len > 0 => self.project_table_state.select(Some(0)),
            _ => {}
        }
    }

    fn selected_project(&self) -> Option<Project> {
        self.project_table_state
            .selected()
            .and_then(|i| self.projects.get(i))
            .cloned()
    }

    fn user_can_edit(&self, project: &Project) -> bool {
        self.current_user
            .as_ref()
            .is_some_and(|user| project.editable_by(user))
    }

    pub async fn handle_event(&mut self, event: AppEvent) -> Result<bool> {
        if event == AppEvent::Quit {
            return Ok(true);
        }

        match self.mode {
            AppMode::Login => self.handle_login_event(event).await,
            AppMode::Help => {
                self.mode = AppMode::Main;
                Ok(false)
            }
            AppMode::Main => {
                if self.modal.is_some() {
                    self.handle_modal_event(event).await
                } else {
                    self.handle_main_event(event).await
                }
            }
        }
    }

    async fn handle_login_event(&mut self, event: AppEvent) -> Result<bool> {
        match event {
            AppEvent::Tab | AppEvent::BackTab | AppEvent::Up | AppEvent::Down => {
                self.login_focus = match self.login_focus {
                    LoginField::Username => LoginField::Password,
                    LoginField::Password => LoginField::Username,
                };
            }
            AppEvent::Character(c) => {
                match self.login_focus {
                    LoginField::Username => self.username.insert_char(c),
                    LoginField::Password => self.password.insert_char(c),
                }
            }
            AppEvent::Backspace => match self.login_focus {
                LoginField::Username => self.username.delete_char(),
                LoginField::Password => self.password.delete_char(),
            },
            AppEvent::Left | AppEvent::Right => {
                let field = match self.login_focus {
                    LoginField::Username => &mut self.username,
                    LoginField::Password => &mut self.password,
                };
                if event == AppEvent::Left {
                    field.move_left();
                } else {
                    field.move_right();
                }
            }
            AppEvent::Enter => {
                // Submit is disabled until both fields are non-empty
                if !self.username.is_empty() && !self.password.is_empty() {
                    let _ = self
                        .controller
                        .login(self.username.value(), self.password.value())
                        .await;
                    self.sync().await;
                }
            }
            AppEvent::Esc => {
                self.controller.dismiss_error().await;
                self.sync().await;
            }
            _ => {}
        }
        Ok(false)
    }

    async fn handle_main_event(&mut self, event: AppEvent) -> Result<bool> {
        match event {
            AppEvent::Character('q') => return Ok(true),
            AppEvent::Character('?') => self.mode = AppMode::Help,
            AppEvent::Character('1') => self.active_tab = ActiveTab::Dashboard,
            AppEvent::Character('2') => self.active_tab = ActiveTab::Projects,
            AppEvent::Tab => {
                self.active_tab = match self.active_tab {
                    ActiveTab::Dashboard => ActiveTab::Projects,
                    ActiveTab::Projects => ActiveTab::Dashboard,
                };
            }
            AppEvent::Character('x') | AppEvent::Esc => {
                self.controller.dismiss_error().await;
                self.sync().await;
            }
            AppEvent::Character('r') => {
                self.controller.refresh().await;
                self.sync().await;
            }
            AppEvent::Character('l') => {
                self.controller.logout().await;
                self.sync().await;
            }
            AppEvent::Character('j') | AppEvent::Down => self.next_project(),
            AppEvent::Character('k') | AppEvent::Up => self.previous_project(),
            AppEvent::Character('n') => {
                if self.active_tab == ActiveTab::Projects {
                    self.modal = Some(Modal::ProjectForm(Box::new(ProjectForm::create())));
                }
            }
            AppEvent::Character('e') => {
                if self.active_tab == ActiveTab::Projects {
                    if let Some(project) = self.selected_project() {
                        if self.user_can_edit(&project) {
                            self.modal =
                                Some(Modal::ProjectForm(Box::new(ProjectForm::edit(project))));
                        }
                    }
                }
            }
            AppEvent::Character('d') => {
                if self.active_tab == ActiveTab::Projects {
                    if let Some(project) = self.selected_project() {
                        if self.user_can_edit(&project) {
                            self.modal = Some(Modal::ConfirmDelete(project));
                        }
                    }
                }
            }
            _ => {}
        }
        Ok(false)
    }

    async fn handle_modal_event(&mut self, event: AppEvent) -> Result<bool> {
        match self.modal.take() {
            Some(Modal::ConfirmDelete(project)) => match event {
                AppEvent::Character('y') | AppEvent::Enter => {
                    let _ = self.controller.delete_project(&project.id).await;
                    self.sync().await;
                }
                AppEvent::Character('n') | AppEvent::Esc => {}
                // Keep waiting for an explicit answer
                _ => self.modal = Some(Modal::ConfirmDelete(project)),
            },
            Some(Modal::ProjectForm(mut form)) => match event {
                AppEvent::Esc => {}
                AppEvent::Tab | AppEvent::Down => {
                    form.focus_next();
                    self.modal = Some(Modal::ProjectForm(form));
                }
                AppEvent::BackTab | AppEvent::Up => {
                    form.focus_prev();
                    self.modal = Some(Modal::ProjectForm(form));
                }
                AppEvent::Character(c) => {
                    match form.focused_field() {
                        Some(field) => field.insert_char(c),
                        // Space or any key cycles the status selector
                        None => form.status = form.status.next(),
                    }
                    self.modal = Some(Modal::ProjectForm(form));
                }
                AppEvent::Backspace => {
                    if let Some(field) = form.focused_field() {
                        field.delete_char();
                    }
                    self.modal = Some(Modal::ProjectForm(form));
                }
                AppEvent::Left | AppEvent::Right => {
                    match form.focused_field() {
                        Some(field) => {
                            if event == AppEvent::Left {
                                field.move_left();
                            } else {
                                field.move_right();
                            }
                        }
                        None => form.status = form.status.next(),
                    }
                    self.modal = Some(Modal::ProjectForm(form));
                }
                AppEvent::Enter => {
                    self.submit_form(form).await;
                    self.sync().await;
                }
                _ => self.modal = Some(Modal::ProjectForm(form)),
            },
            None => {}
        }
        Ok(false)
    }

    async fn submit_form(&mut self, mut form: Box<ProjectForm>) {
        let draft = match form.to_draft() {
            Ok(draft) => draft,
            Err(message) => {
                form.validation = Some(message);
                self.modal = Some(Modal::ProjectForm(form));
                return;
            }
        };

        let result = match &form.editing {
            Some(project) => self
                .controller
                .update_project(&project.id, &ProjectPatch::from_draft(&draft))
                .await
                .map(|_| ()),
            None => self.controller.create_project(&draft).await.map(|_| ()),
        };

        // On failure the form stays open with the banner showing why
        if result.is_err() {
            self.modal = Some(Modal::ProjectForm(form));
        }
    }

    fn next_project(&mut self) {
        if self.projects.is_empty() {
            return;
        }
        let next = match self.project_table_state.selected() {
            Some(i) if i + 1 < self.projects.len() => i + 1,
            Some(i) => i,
            None => 0,
        };
        self.project_table_state.select(Some(next));
    }

    fn previous_project(&mut self) {
        if self.projects.is_empty() {
            return;
        }
        let prev = self
            .project_table_state
            .selected()
            .map(|i| i.saturating_sub(1))
            .unwrap_or(0);
        self.project_table_state.select(Some(prev));
    }

    // Rendering

    pub fn render(&mut self, frame: &mut Frame) {
        match self.mode {
            AppMode::Login => self.render_login(frame),
            AppMode::Help => self.render_help(frame),
            AppMode::Main => self.render_main(frame),
        }
    }

    fn render_login(&self, frame: &mut Frame) {
        let area = centered_rect(frame.area(), 44, 16);

        let block = Block::default()
            .title("ProManage")
            .borders(Borders::ALL)
            .border_type(BorderType::Rounded);
        frame.render_widget(Clear, area);
        frame.render_widget(block, area);

        let inner = area.inner(Margin::new(2, 1));
        let chunks = Layout::vertical([
            Constraint::Length(1), // subtitle
            Constraint::Length(3), // username
            Constraint::Length(3), // password
            Constraint::Length(2), // error / submit hint
            Constraint::Min(3),    // demo credentials
        ])
        .split(inner);

        let subtitle = Paragraph::new("Project management sign-in")
            .style(Style::default().fg(Color::Gray))
            .alignment(Alignment::Center);
        frame.render_widget(subtitle, chunks[0]);

        self.username
            .render(frame, chunks[1], self.login_focus == LoginField::Username);
        self.password
            .render(frame, chunks[2], self.login_focus == LoginField::Password);

        let status_line = if let Some(error) = &self.error_message {
            Paragraph::new(error.as_str()).style(Style::default().fg(Color::Red))
        } else if self.is_loading {
            Paragraph::new("Signing in...").style(Style::default().fg(Color::Gray))
        } else if self.username.is_empty() || self.password.is_empty() {
            Paragraph::new("Fill in both fields, then press Enter")
                .style(Style::default().fg(Color::DarkGray))
        } else {
            Paragraph::new("Press Enter to sign in").style(Style::default().fg(Color::Green))
        };
        frame.render_widget(status_line.alignment(Alignment::Center), chunks[3]);

        let hint = Paragraph::new("Demo accounts:\nadmin/admin123 · manager/manager123 · user/user123")
            .style(Style::default().fg(Color::DarkGray))
            .alignment(Alignment::Center)
            .wrap(Wrap { trim: true });
        frame.render_widget(hint, chunks[4]);
    }

    fn render_main(&mut self, frame: &mut Frame) {
        let has_error = self.error_message.is_some();
        let chunks = Layout::vertical([
            Constraint::Length(if has_error { 1 } else { 0 }),
            Constraint::Length(1), // header
            Constraint::Length(1), // tabs
            Constraint::Min(5),    // body
            Constraint::Length(1), // status bar
        ])
        .split(frame.area());

        if let Some(error) = &self.error_message {
            let banner = Paragraph::new(format!("{error}  (x to dismiss)"))
                .style(Style::default().fg(Color::White).bg(Color::Red));
            frame.render_widget(banner, chunks[0]);
        }

        self.render_header(frame, chunks[1]);
        self.render_tabs(frame, chunks[2]);

        match self.active_tab {
            ActiveTab::Dashboard => self.render_dashboard(frame, chunks[3]),
            ActiveTab::Projects => self.render_projects(frame, chunks[3]),
        }

        self.render_status_bar(frame, chunks[4]);

        match &self.modal {
            Some(Modal::ProjectForm(form)) => self.render_project_form(frame, form),
            Some(Modal::ConfirmDelete(project)) => self.render_confirm_delete(frame, project),
            None => {}
        }
    }

    fn render_header(&self, frame: &mut Frame, area: Rect) {
        let who = self
            .current_user
            .as_ref()
            .map(|u| format!("{} ({})", u.name, u.role))
            .unwrap_or_default();

        let header = Line::from(vec![
            Span::styled(
                "ProManage",
                Style::default().fg(Color::Blue).bold(),
            ),
            Span::raw("  "),
            Span::styled(who, Style::default().fg(Color::Gray)),
        ]);
        frame.render_widget(Paragraph::new(header), area);
    }

    fn render_tabs(&self, frame: &mut Frame, area: Rect) {
        let tab = |label: &'static str, active: bool| {
            if active {
                Span::styled(label, Style::default().fg(Color::Blue).underlined())
            } else {
                Span::styled(label, Style::default().fg(Color::Gray))
            }
        };

        let line = Line::from(vec![
            tab("[1] Dashboard", self.active_tab == ActiveTab::Dashboard),
            Span::raw("   "),
            tab("[2] Projects", self.active_tab == ActiveTab::Projects),
        ]);
        frame.render_widget(Paragraph::new(line), area);
    }

    fn render_dashboard(&self, frame: &mut Frame, area: Rect) {
        let chunks = Layout::vertical([
            Constraint::Length(3), // metric cards
            Constraint::Min(4),    // recent projects
        ])
        .split(area);

        let cards = Layout::horizontal([
            Constraint::Ratio(1, 4),
            Constraint::Ratio(1, 4),
            Constraint::Ratio(1, 4),
            Constraint::Ratio(1, 4),
        ])
        .split(chunks[0]);

        let card = |title: &'static str, value: String, color: Color| {
            Paragraph::new(value)
                .style(Style::default().fg(color).bold())
                .block(Block::default().title(title).borders(Borders::ALL))
        };

        frame.render_widget(
            card(
                "Total Projects",
                self.stats.total_projects.to_string(),
                Color::Blue,
            ),
            cards[0],
        );
        frame.render_widget(
            card(
                "Total Budget",
                format!("${:.2}", self.stats.total_budget),
                Color::Green,
            ),
            cards[1],
        );
        frame.render_widget(
            card(
                "Active",
                self.stats.status_count.active.to_string(),
                Color::Magenta,
            ),
            cards[2],
        );
        frame.render_widget(
            card(
                "Completed",
                self.stats.status_count.completed.to_string(),
                Color::Yellow,
            ),
            cards[3],
        );

        let block = Block::default()
            .title("Recent Projects")
            .borders(Borders::ALL)
            .border_type(BorderType::Rounded);

        if self.projects.is_empty() {
            let message = if self.is_loading {
                "Loading dashboard..."
            } else {
                "No projects yet"
            };
            let paragraph = Paragraph::new(message)
                .block(block)
                .style(Style::default().fg(Color::Gray));
            frame.render_widget(paragraph, chunks[1]);
            return;
        }

        let lines: Vec<Line> = self
            .projects
            .iter()
            .take(5)
            .map(|project| {
                Line::from(vec![
                    Span::raw(project.name.clone()),
                    Span::raw("  "),
                    Span::styled(
                        project.budget_display(),
                        Style::default().fg(Color::Green),
                    ),
                    Span::raw("  "),
                    Span::styled(
                        project.start_date_display(),
                        Style::default().fg(Color::DarkGray),
                    ),
                ])
            })
            .collect();

        frame.render_widget(Paragraph::new(lines).block(block), chunks[1]);
    }

    fn render_projects(&mut self, frame: &mut Frame, area: Rect) {
        let len = self.projects.len();
        let block = Block::default()
            .title(format!("Projects ({len})"))
            .borders(Borders::ALL)
            .border_type(BorderType::Rounded);

        if self.is_loading && self.projects.is_empty() {
            let paragraph = Paragraph::new("Loading projects...")
                .block(block)
                .style(Style::default().fg(Color::Gray));
            frame.render_widget(paragraph, area);
            return;
        }

        if self.projects.is_empty() {
            let paragraph = Paragraph::new("No projects yet (press n to create one)")
                .block(block)
                .style(Style::default().fg(Color::Gray));
            frame.render_widget(paragraph, area);
            return;
        }

        let header = Row::new(vec!["Project", "Budget", "Start", "Status", ""])
            .style(Style::default().fg(Color::DarkGray));

        let rows: Vec<Row> = self
            .projects
            .iter()
            .map(|project| {
                let status_color = match project.status {
                    ProjectStatus::Active => Color::Green,
                    ProjectStatus::Completed => Color::Blue,
                    ProjectStatus::Paused => Color::Yellow,
                };

                // Per-row permission gate, evaluated at render time
                let actions = if self.user_can_edit(project) {
                    "e/d"
                } else {
                    ""
                };

                Row::new(vec![
                    Cell::from(Line::from(vec![
                        Span::raw(project.name.clone()),
                        Span::raw(" "),
                        Span::styled(
                            project.description.clone(),
                            Style::default().fg(Color::DarkGray),
                        ),
                    ])),
                    Cell::from(project.budget_display()),
                    Cell::from(project.start_date_display()),
                    Cell::from(project.status.to_string())
                        .style(Style::default().fg(status_color)),
                    Cell::from(actions).style(Style::default().fg(Color::DarkGray)),
                ])
            })
            .collect();

        let table = Table::new(
            rows,
            [
                Constraint::Min(24),
                Constraint::Length(12),
                Constraint::Length(10),
                Constraint::Length(10),
                Constraint::Length(4),
            ],
        )
        .header(header)
        .block(block)
        .highlight_style(Style::default().bg(Color::DarkGray));

        frame.render_stateful_widget(table, area, &mut self.project_table_state);
    }

    fn render_status_bar(&self, frame: &mut Frame, area: Rect) {
        let help_text = match (&self.modal, self.active_tab) {
            (Some(Modal::ProjectForm(_)), _) => {
                "Tab: next field | Space/←→: cycle status | Enter: save | Esc: cancel"
            }
            (Some(Modal::ConfirmDelete(_)), _) => "y: delete | n: keep",
            (None, ActiveTab::Projects) => {
                "j/k: navigate | n: new | e: edit | d: delete | r: refresh | l: logout | q: quit | ?: help"
            }
            (None, ActiveTab::Dashboard) => {
                "1/2: switch tab | r: refresh | l: logout | q: quit | ?: help"
            }
        };

        let paragraph = Paragraph::new(help_text).style(Style::default().fg(Color::DarkGray));
        frame.render_widget(paragraph, area);
    }

    fn render_project_form(&self, frame: &mut Frame, form: &ProjectForm) {
        let area = centered_rect(frame.area(), 52, 24);
        frame.render_widget(Clear, area);

        let block = Block::default()
            .title(form.title())
            .borders(Borders::ALL)
            .border_type(BorderType::Rounded);
        frame.render_widget(block, area);

        let inner = area.inner(Margin::new(2, 1));
        let chunks = Layout::vertical([
            Constraint::Length(3), // name
            Constraint::Length(3), // description
            Constraint::Length(3), // budget
            Constraint::Length(3), // start date
            Constraint::Length(3), // end date
            Constraint::Length(1), // status
            Constraint::Length(1), // validation / hint
        ])
        .split(inner);

        form.name
            .render(frame, chunks[0], form.focus == FormField::Name);
        form.description
            .render(frame, chunks[1], form.focus == FormField::Description);
        form.budget
            .render(frame, chunks[2], form.focus == FormField::Budget);
        form.start_date
            .render(frame, chunks[3], form.focus == FormField::StartDate);
        form.end_date
            .render(frame, chunks[4], form.focus == FormField::EndDate);

        let status_style = if form.focus == FormField::Status {
            Style::default().fg(Color::Yellow)
        } else {
            Style::default().fg(Color::Gray)
        };
        let status = Paragraph::new(format!("Status: {}", form.status)).style(status_style);
        frame.render_widget(status, chunks[5]);

        let footer = if let Some(message) = &form.validation {
            Paragraph::new(message.as_str()).style(Style::default().fg(Color::Red))
        } else if form.can_submit() {
            Paragraph::new("Enter: save").style(Style::default().fg(Color::Green))
        } else {
            Paragraph::new("Name and start date are required")
                .style(Style::default().fg(Color::DarkGray))
        };
        frame.render_widget(footer, chunks[6]);
    }

    fn render_confirm_delete(&self, frame: &mut Frame, project: &Project) {
        let area = centered_rect(frame.area(), 46, 5);
        frame.render_widget(Clear, area);

        let block = Block::default()
            .title("Delete project")
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::Red));

        let text = format!("Delete \"{}\"? This cannot be undone.", project.name);
        let paragraph = Paragraph::new(text)
            .block(block)
            .wrap(Wrap { trim: true });
        frame.render_widget(paragraph, area);
    }

    fn render_help(&self, frame: &mut Frame) {
        let area = centered_rect(frame.area(), 56, 16);
        frame.render_widget(Clear, area);

        let block = Block::default()
            .title("Help")
            .borders(Borders::ALL)
            .border_type(BorderType::Rounded);

        let text = vec![
            Line::from("1 / 2       switch between dashboard and projects"),
            Line::from("j / k       move through the project table"),
            Line::from("n           create a project"),
            Line::from("e           edit the selected project (if allowed)"),
            Line::from("d           delete the selected project (if allowed)"),
            Line::from("r           reload projects and stats"),
            Line::from("x / Esc     dismiss the error banner"),
            Line::from("l           log out"),
            Line::from("q           quit"),
            Line::from(""),
            Line::from("Press any key to close"),
        ];

        frame.render_widget(Paragraph::new(text).block(block), area);
    }
}

fn centered_rect(area: Rect, width: u16, height: u16) -> Rect {
    let width = width.min(area.width);
    let height = height.min(area.height);
    Rect {
        x: area.x + (area.width - width) / 2,
        y: area.y + (area.height - height) / 2,
        width,
        height,
    }
}

pub async fn run_tui(mut app: App) -> Result<()> {
    // Set up terminal
    crossterm::terminal::enable_raw_mode()?;
    let mut stdout = std::io::stdout();
    crossterm::execute!(stdout, crossterm::terminal::EnterAlternateScreen)?;
    let backend = ratatui::backend::CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    // Initialize app
    app.initialize().await?;

    // Event handling
    let mut event_handler = EventHandler::new();

    // Main loop
    loop {
        terminal.draw(|frame| app.render(frame))?;

        let event = event_handler.next_event().await?;
        let should_quit = app.handle_event(event).await?;
        if should_quit || event_handler.should_quit() {
            break;
        }
    }

    // Cleanup
    crossterm::terminal::disable_raw_mode()?;
    crossterm::execute!(
        terminal.backend_mut(),
        crossterm::terminal::LeaveAlternateScreen
    )?;

    Ok(())
}
