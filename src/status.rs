//! Status derivation for milestones and projects.
//!
//! Every function here is pure: the reference date is always passed in, and
//! recompute helpers return new values instead of touching the store.

use chrono::NaiveDate;

use crate::store::{Milestone, MilestoneStatus, Project, ProjectStatus};

/// Effective status of a milestone on `today`.
///
/// A stored `Completed` always wins. A stored `InProgress` turns `Overdue` once
/// the end date has passed. Anything else is derived from the dates alone.
pub fn milestone_status(
    stored: MilestoneStatus,
    start_date: NaiveDate,
    end_date: NaiveDate,
    today: NaiveDate,
) -> MilestoneStatus {
    match stored {
        MilestoneStatus::Completed => MilestoneStatus::Completed,
        MilestoneStatus::InProgress => {
            if today > end_date {
                MilestoneStatus::Overdue
            } else {
                MilestoneStatus::InProgress
            }
        }
        MilestoneStatus::NotStarted | MilestoneStatus::Overdue => {
            if today < start_date {
                MilestoneStatus::NotStarted
            } else if today > end_date {
                MilestoneStatus::Overdue
            } else {
                MilestoneStatus::InProgress
            }
        }
    }
}

/// Date-derived status of a project that has not been marked complete.
pub fn project_auto_status(
    start_date: NaiveDate,
    end_date: NaiveDate,
    today: NaiveDate,
) -> ProjectStatus {
    if today > end_date {
        ProjectStatus::Overdue
    } else if start_date <= today {
        ProjectStatus::InProgress
    } else {
        ProjectStatus::NotStarted
    }
}

pub fn effective_milestone_status(milestone: &Milestone, today: NaiveDate) -> MilestoneStatus {
    milestone_status(
        milestone.status,
        milestone.start_date,
        milestone.end_date,
        today,
    )
}

/// Milestone with its stored status replaced by the effective status.
pub fn recompute_milestone(milestone: &Milestone, today: NaiveDate) -> Milestone {
    Milestone {
        status: effective_milestone_status(milestone, today),
        ..milestone.clone()
    }
}

/// Project with its automatic status applied. A project marked `Completed`
/// is returned unchanged.
pub fn recompute_project(project: &Project, today: NaiveDate) -> Project {
    if project.status == ProjectStatus::Completed {
        return project.clone();
    }
    Project {
        status: project_auto_status(project.start_date, project.end_date, today),
        ..project.clone()
    }
}

/// The cheap overdue sweep used by the dashboard: only flips unfinished
/// milestones whose end date has passed, without the full derivation.
pub fn flag_overdue(milestone: &Milestone, today: NaiveDate) -> Milestone {
    if milestone.end_date < today && milestone.status != MilestoneStatus::Completed {
        Milestone {
            status: MilestoneStatus::Overdue,
            ..milestone.clone()
        }
    } else {
        milestone.clone()
    }
}
