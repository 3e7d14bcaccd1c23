use serde::{Deserialize, Serialize};

use super::Project;

/// Server-computed aggregate over the projects visible to the current
/// user. Never derived client-side; re-fetched after every mutation.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct DashboardStats {
    pub total_projects: u64,
    pub total_budget: f64,
    pub status_count: StatusCount,
    #[serde(default)]
    pub recent_projects: Vec<Project>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct StatusCount {
    #[serde(default)]
    pub active: u64,
    #[serde(default)]
    pub completed: u64,
    #[serde(default)]
    pub paused: u64,
}
