use std::fmt;
use std::str::FromStr;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Normalize user-entered status/priority text ("In Progress", "in-progress")
/// to the snake_case form stored in the database.
fn normalize_label(s: &str) -> String {
    s.trim()
        .to_lowercase()
        .replace([' ', '-'], "_")
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProjectStatus {
    NotStarted,
    InProgress,
    Overdue,
    Completed,
    NotCompleted,
}

impl ProjectStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ProjectStatus::NotStarted => "not_started",
            ProjectStatus::InProgress => "in_progress",
            ProjectStatus::Overdue => "overdue",
            ProjectStatus::Completed => "completed",
            ProjectStatus::NotCompleted => "not_completed",
        }
    }

    pub fn from_str(s: &str) -> Self {
        match s {
            "not_started" => ProjectStatus::NotStarted,
            "in_progress" => ProjectStatus::InProgress,
            "overdue" => ProjectStatus::Overdue,
            "completed" => ProjectStatus::Completed,
            _ => ProjectStatus::NotCompleted,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            ProjectStatus::NotStarted => "Not Started",
            ProjectStatus::InProgress => "In Progress",
            ProjectStatus::Overdue => "Overdue",
            ProjectStatus::Completed => "Completed",
            ProjectStatus::NotCompleted => "Not Completed",
        }
    }

    pub fn symbol(&self) -> &'static str {
        match self {
            ProjectStatus::NotStarted => "○",
            ProjectStatus::InProgress => "●",
            ProjectStatus::Overdue => "!",
            ProjectStatus::Completed => "✓",
            ProjectStatus::NotCompleted => "◌",
        }
    }
}

impl fmt::Display for ProjectStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MilestoneStatus {
    NotStarted,
    InProgress,
    Overdue,
    Completed,
}

impl MilestoneStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            MilestoneStatus::NotStarted => "not_started",
            MilestoneStatus::InProgress => "in_progress",
            MilestoneStatus::Overdue => "overdue",
            MilestoneStatus::Completed => "completed",
        }
    }

    /// Lenient decoding of a stored value. Anything unrecognized is treated as
    /// `NotStarted`, which makes the evaluator fall back to the dates.
    pub fn from_str(s: &str) -> Self {
        match s {
            "in_progress" => MilestoneStatus::InProgress,
            "overdue" => MilestoneStatus::Overdue,
            "completed" => MilestoneStatus::Completed,
            _ => MilestoneStatus::NotStarted,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            MilestoneStatus::NotStarted => "Not Started",
            MilestoneStatus::InProgress => "In Progress",
            MilestoneStatus::Overdue => "Overdue",
            MilestoneStatus::Completed => "Completed",
        }
    }

    pub fn symbol(&self) -> &'static str {
        match self {
            MilestoneStatus::NotStarted => "☐",
            MilestoneStatus::InProgress => "●",
            MilestoneStatus::Overdue => "!",
            MilestoneStatus::Completed => "✓",
        }
    }

    /// Next status in the manual cycle used by the dashboard. Overdue work
    /// goes straight to completed, since the dates would flag it again.
    pub fn cycle(&self) -> Self {
        match self {
            MilestoneStatus::NotStarted => MilestoneStatus::InProgress,
            MilestoneStatus::InProgress | MilestoneStatus::Overdue => MilestoneStatus::Completed,
            MilestoneStatus::Completed => MilestoneStatus::NotStarted,
        }
    }
}

impl fmt::Display for MilestoneStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for MilestoneStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match normalize_label(s).as_str() {
            "not_started" => Ok(MilestoneStatus::NotStarted),
            "in_progress" => Ok(MilestoneStatus::InProgress),
            "overdue" => Ok(MilestoneStatus::Overdue),
            "completed" => Ok(MilestoneStatus::Completed),
            _ => Err(format!(
                "invalid milestone status '{s}' (expected not_started, in_progress, overdue or completed)"
            )),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Priority {
    Low,
    Medium,
    High,
}

impl Priority {
    pub fn as_str(&self) -> &'static str {
        match self {
            Priority::Low => "low",
            Priority::Medium => "medium",
            Priority::High => "high",
        }
    }

    pub fn from_str(s: &str) -> Self {
        match s {
            "low" => Priority::Low,
            "high" => Priority::High,
            _ => Priority::Medium,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Priority::Low => "Low",
            Priority::Medium => "Medium",
            Priority::High => "High",
        }
    }
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for Priority {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match normalize_label(s).as_str() {
            "low" => Ok(Priority::Low),
            "medium" => Ok(Priority::Medium),
            "high" => Ok(Priority::High),
            _ => Err(format!(
                "invalid priority '{s}' (expected low, medium or high)"
            )),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Project {
    pub id: i64,
    pub project_name: String,
    pub client_name: String,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub status: ProjectStatus,
    pub created_at: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Milestone {
    pub id: i64,
    pub project_id: i64,
    pub milestone_name: String,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub status: MilestoneStatus,
    pub priority: Priority,
}

/// A project together with its milestones, in display order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProjectWithMilestones {
    pub project: Project,
    pub milestones: Vec<Milestone>,
}
