use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::*;

// Wire shapes for the ProManage API. All decoding goes through these so
// the domain types never see backend quirks (naive timestamps, extra
// fields).

#[derive(Debug, Deserialize)]
pub struct LoginResponseDto {
    pub access_token: String,
    pub user: UserDto,
}

#[derive(Debug, Deserialize)]
pub struct UserDto {
    pub id: String,
    pub username: String,
    pub name: String,
    #[serde(default)]
    pub email: String,
    pub role: String,
}

#[derive(Debug, Deserialize)]
pub struct ProjectDto {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub budget: f64,
    pub start_date: String,
    pub end_date: Option<String>,
    pub status: ProjectStatus,
    pub created_by: String,
}

#[derive(Debug, Deserialize)]
pub struct StatsDto {
    pub total_projects: u64,
    pub total_budget: f64,
    #[serde(default)]
    pub status_count: StatusCount,
    #[serde(default)]
    pub recent_projects: Vec<ProjectDto>,
}

// Request DTOs

#[derive(Debug, Serialize)]
pub struct LoginDto {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct RegisterDto {
    pub username: String,
    pub email: String,
    pub name: String,
    pub password: String,
    pub role: String,
}

/// Create payload. `end_date` is serialized unconditionally: an absent end
/// date goes out as an explicit null, not an omitted field.
#[derive(Debug, Serialize)]
pub struct ProjectCreateDto {
    pub name: String,
    pub description: String,
    pub budget: f64,
    pub start_date: String,
    pub end_date: Option<String>,
    pub status: ProjectStatus,
}

#[derive(Debug, Serialize)]
pub struct ProjectUpdateDto {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub budget: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start_date: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub end_date: Option<Option<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<ProjectStatus>,
}

/// Calendar date widened to a full ISO-8601 timestamp at UTC midnight,
/// matching what the backend stores.
fn date_to_timestamp(date: NaiveDate) -> String {
    date.and_hms_opt(0, 0, 0).unwrap().and_utc().to_rfc3339()
}

/// The backend emits both offset-qualified and naive timestamps; treat
/// naive ones as UTC.
fn parse_timestamp(s: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(s)
        .map(|dt| dt.with_timezone(&Utc))
        .ok()
        .or_else(|| {
            NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S%.f")
                .map(|dt| dt.and_utc())
                .ok()
        })
}

// Conversion implementations

impl From<UserDto> for User {
    fn from(dto: UserDto) -> Self {
        Self {
            id: UserId(dto.id),
            username: dto.username,
            name: dto.name,
            email: dto.email,
            role: dto.role,
        }
    }
}

impl From<ProjectDto> for Project {
    fn from(dto: ProjectDto) -> Self {
        Self {
            id: ProjectId(dto.id),
            name: dto.name,
            description: dto.description,
            budget: dto.budget,
            start_date: parse_timestamp(&dto.start_date).unwrap_or_else(Utc::now),
            end_date: dto.end_date.as_deref().and_then(parse_timestamp),
            status: dto.status,
            created_by: UserId(dto.created_by),
        }
    }
}

impl From<StatsDto> for DashboardStats {
    fn from(dto: StatsDto) -> Self {
        Self {
            total_projects: dto.total_projects,
            total_budget: dto.total_budget,
            status_count: dto.status_count,
            recent_projects: dto.recent_projects.into_iter().map(Into::into).collect(),
        }
    }
}

impl From<&NewUser> for RegisterDto {
    fn from(new_user: &NewUser) -> Self {
        Self {
            username: new_user.username.clone(),
            email: new_user.email.clone(),
            name: new_user.name.clone(),
            password: new_user.password.clone(),
            role: new_user.role.clone(),
        }
    }
}

impl From<&ProjectDraft> for ProjectCreateDto {
    fn from(draft: &ProjectDraft) -> Self {
        Self {
            name: draft.name.clone(),
            description: draft.description.clone(),
            budget: draft.budget,
            start_date: date_to_timestamp(draft.start_date),
            end_date: draft.end_date.map(date_to_timestamp),
            status: draft.status,
        }
    }
}

impl From<&ProjectPatch> for ProjectUpdateDto {
    fn from(patch: &ProjectPatch) -> Self {
        Self {
            name: patch.name.clone(),
            description: patch.description.clone(),
            budget: patch.budget,
            start_date: patch.start_date.map(date_to_timestamp),
            end_date: patch
                .end_date
                .map(|opt_date| opt_date.map(date_to_timestamp)),
            status: patch.status,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn draft() -> ProjectDraft {
        ProjectDraft {
            name: "Alpha".to_string(),
            description: "First".to_string(),
            budget: 1000.0,
            start_date: NaiveDate::from_ymd_opt(2024, 3, 1).unwrap(),
            end_date: None,
            status: ProjectStatus::Active,
        }
    }

    #[test]
    fn create_sends_iso_start_and_explicit_null_end_date() {
        let dto = ProjectCreateDto::from(&draft());
        let json: serde_json::Value = serde_json::to_value(&dto).unwrap();

        assert_eq!(json["start_date"], "2024-03-01T00:00:00+00:00");
        assert!(json["end_date"].is_null());
        assert_eq!(json["status"], "active");
        assert_eq!(json["budget"], 1000.0);
    }

    #[test]
    fn create_widens_end_date_when_present() {
        let mut d = draft();
        d.end_date = NaiveDate::from_ymd_opt(2024, 6, 15);

        let dto = ProjectCreateDto::from(&d);
        assert_eq!(dto.end_date.as_deref(), Some("2024-06-15T00:00:00+00:00"));
    }

    #[test]
    fn update_omits_untouched_fields() {
        let patch = ProjectPatch {
            name: Some("Renamed".to_string()),
            ..Default::default()
        };

        let json = serde_json::to_string(&ProjectUpdateDto::from(&patch)).unwrap();
        assert_eq!(json, r#"{"name":"Renamed"}"#);
    }

    #[test]
    fn update_sends_null_when_end_date_is_cleared() {
        let patch = ProjectPatch {
            end_date: Some(None),
            ..Default::default()
        };

        let json: serde_json::Value =
            serde_json::to_value(&ProjectUpdateDto::from(&patch)).unwrap();
        assert!(json.as_object().unwrap().contains_key("end_date"));
        assert!(json["end_date"].is_null());
    }

    #[test]
    fn parses_naive_backend_timestamps_as_utc() {
        let dto = ProjectDto {
            id: "p1".to_string(),
            name: "Alpha".to_string(),
            description: String::new(),
            budget: 0.0,
            start_date: "2024-03-01T00:00:00".to_string(),
            end_date: Some("2024-06-15T12:30:00.123456".to_string()),
            status: ProjectStatus::Active,
            created_by: "u1".to_string(),
        };

        let project: Project = dto.into();
        assert_eq!(project.start_date_display(), "2024-03-01");
        assert_eq!(
            project.end_day(),
            NaiveDate::from_ymd_opt(2024, 6, 15)
        );
    }

    #[test]
    fn created_project_reloads_into_the_same_calendar_date() {
        // Create with 2024-03-01, no end date; the server echoes the
        // timestamp back and the edit form must show 2024-03-01 again.
        let sent = ProjectCreateDto::from(&draft());

        let echoed = ProjectDto {
            id: "p1".to_string(),
            name: sent.name,
            description: sent.description,
            budget: sent.budget,
            start_date: sent.start_date,
            end_date: sent.end_date,
            status: sent.status,
            created_by: "u1".to_string(),
        };

        let reloaded = ProjectDraft::from_project(&Project::from(echoed));
        assert_eq!(reloaded.start_date, draft().start_date);
        assert_eq!(reloaded.end_date, None);
    }

    #[test]
    fn decodes_backend_stats_payload() {
        let json = r#"{
            "total_projects": 2,
            "total_budget": 1500.5,
            "status_count": {"active": 1, "completed": 1, "paused": 0},
            "recent_projects": [{
                "id": "p1", "name": "Alpha", "description": "",
                "budget": 1500.5, "start_date": "2024-03-01T00:00:00",
                "end_date": null, "status": "active", "created_by": "u1"
            }]
        }"#;

        let stats: DashboardStats = serde_json::from_str::<StatsDto>(json).unwrap().into();
        assert_eq!(stats.total_projects, 2);
        assert_eq!(stats.total_budget, 1500.5);
        assert_eq!(stats.status_count.completed, 1);
        assert_eq!(stats.recent_projects.len(), 1);
    }

    #[test]
    fn stats_tolerate_missing_optional_sections() {
        let json = r#"{"total_projects": 0, "total_budget": 0.0}"#;
        let stats: DashboardStats = serde_json::from_str::<StatsDto>(json).unwrap().into();
        assert!(stats.recent_projects.is_empty());
        assert_eq!(stats.status_count, StatusCount::default());
    }
}
