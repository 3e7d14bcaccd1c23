use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use super::User;

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ProjectId(pub String);

impl fmt::Display for ProjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<String> for ProjectId {
    fn from(s: String) -> Self {
        ProjectId(s)
    }
}

impl From<&str> for ProjectId {
    fn from(s: &str) -> Self {
        ProjectId(s.to_string())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProjectStatus {
    #[default]
    Active,
    Completed,
    Paused,
}

impl ProjectStatus {
    pub const ALL: [ProjectStatus; 3] = [
        ProjectStatus::Active,
        ProjectStatus::Completed,
        ProjectStatus::Paused,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ProjectStatus::Active => "active",
            ProjectStatus::Completed => "completed",
            ProjectStatus::Paused => "paused",
        }
    }

    /// Cycle through statuses, for the form's status selector.
    pub fn next(&self) -> ProjectStatus {
        match self {
            ProjectStatus::Active => ProjectStatus::Completed,
            ProjectStatus::Completed => ProjectStatus::Paused,
            ProjectStatus::Paused => ProjectStatus::Active,
        }
    }
}

impl fmt::Display for ProjectStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Project {
    pub id: ProjectId,
    pub name: String,
    pub description: String,
    pub budget: f64,
    pub start_date: DateTime<Utc>,
    pub end_date: Option<DateTime<Utc>>,
    pub status: ProjectStatus,
    pub created_by: super::UserId,
}

impl Project {
    /// Business rule: admins may edit anything, everyone else only what
    /// they created.
    pub fn editable_by(&self, user: &User) -> bool {
        user.is_admin() || self.created_by == user.id
    }

    /// Calendar date shown in the edit form; time of day is discarded.
    pub fn start_day(&self) -> NaiveDate {
        self.start_date.date_naive()
    }

    pub fn end_day(&self) -> Option<NaiveDate> {
        self.end_date.map(|d| d.date_naive())
    }

    pub fn start_date_display(&self) -> String {
        self.start_date.format("%Y-%m-%d").to_string()
    }

    pub fn budget_display(&self) -> String {
        format!("${:.2}", self.budget)
    }
}

/// Form state for the create/edit dialog. Dates are plain calendar dates;
/// the wire layer widens them to full timestamps.
#[derive(Debug, Clone, PartialEq)]
pub struct ProjectDraft {
    pub name: String,
    pub description: String,
    pub budget: f64,
    pub start_date: NaiveDate,
    pub end_date: Option<NaiveDate>,
    pub status: ProjectStatus,
}

impl ProjectDraft {
    /// Pre-fill the edit form from an existing project, truncating
    /// timestamps back to calendar dates.
    pub fn from_project(project: &Project) -> Self {
        Self {
            name: project.name.clone(),
            description: project.description.clone(),
            budget: project.budget,
            start_date: project.start_day(),
            end_date: project.end_day(),
            status: project.status,
        }
    }

    /// Blank or unparseable budget input counts as zero.
    pub fn parse_budget(input: &str) -> f64 {
        input.trim().parse().unwrap_or(0.0)
    }
}

/// Partial update for PUT /projects/{id}. `None` means "leave unchanged";
/// the inner Option on `end_date` distinguishes clearing from not touching.
#[derive(Debug, Clone, Default)]
pub struct ProjectPatch {
    pub name: Option<String>,
    pub description: Option<String>,
    pub budget: Option<f64>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<Option<NaiveDate>>,
    pub status: Option<ProjectStatus>,
}

impl ProjectPatch {
    /// The edit form always submits every field, so a full patch is the
    /// common case.
    pub fn from_draft(draft: &ProjectDraft) -> Self {
        Self {
            name: Some(draft.name.clone()),
            description: Some(draft.description.clone()),
            budget: Some(draft.budget),
            start_date: Some(draft.start_date),
            end_date: Some(draft.end_date),
            status: Some(draft.status),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::UserId;

    fn user(id: &str, role: &str) -> User {
        User {
            id: UserId(id.to_string()),
            username: "u".to_string(),
            name: "U".to_string(),
            email: "u@example.com".to_string(),
            role: role.to_string(),
        }
    }

    fn project(created_by: &str) -> Project {
        Project {
            id: ProjectId("p1".to_string()),
            name: "Alpha".to_string(),
            description: String::new(),
            budget: 0.0,
            start_date: Utc::now(),
            end_date: None,
            status: ProjectStatus::Active,
            created_by: UserId(created_by.to_string()),
        }
    }

    #[test]
    fn admin_can_edit_any_project() {
        let admin = user("a1", "admin");
        assert!(project("a1").editable_by(&admin));
        assert!(project("someone-else").editable_by(&admin));
    }

    #[test]
    fn non_admin_can_edit_only_own_projects() {
        let member = user("m1", "user");
        assert!(project("m1").editable_by(&member));
        assert!(!project("someone-else").editable_by(&member));
    }

    #[test]
    fn manager_gets_no_special_rights() {
        let manager = user("g1", "manager");
        assert!(project("g1").editable_by(&manager));
        assert!(!project("someone-else").editable_by(&manager));
    }

    #[test]
    fn status_round_trips_through_serde() {
        let json = serde_json::to_string(&ProjectStatus::Paused).unwrap();
        assert_eq!(json, "\"paused\"");
        let back: ProjectStatus = serde_json::from_str("\"completed\"").unwrap();
        assert_eq!(back, ProjectStatus::Completed);
    }

    #[test]
    fn status_cycle_visits_all_variants() {
        let mut status = ProjectStatus::Active;
        for expected in [
            ProjectStatus::Completed,
            ProjectStatus::Paused,
            ProjectStatus::Active,
        ] {
            status = status.next();
            assert_eq!(status, expected);
        }
    }

    #[test]
    fn blank_or_invalid_budget_defaults_to_zero() {
        assert_eq!(ProjectDraft::parse_budget(""), 0.0);
        assert_eq!(ProjectDraft::parse_budget("not a number"), 0.0);
        assert_eq!(ProjectDraft::parse_budget(" 1500.50 "), 1500.50);
    }

    #[test]
    fn draft_recovers_calendar_dates_from_timestamps() {
        let mut p = project("m1");
        p.start_date = "2024-03-01T00:00:00Z".parse().unwrap();
        p.end_date = Some("2024-06-15T00:00:00Z".parse().unwrap());

        let draft = ProjectDraft::from_project(&p);
        assert_eq!(
            draft.start_date,
            NaiveDate::from_ymd_opt(2024, 3, 1).unwrap()
        );
        assert_eq!(draft.end_date, NaiveDate::from_ymd_opt(2024, 6, 15));
    }
}
