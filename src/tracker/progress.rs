use chrono::NaiveDate;
use serde::Serialize;

use crate::status;
use crate::store::{Milestone, MilestoneStatus, Project, ProjectStatus, ProjectWithMilestones};

/// `completed / total` as a whole percentage, rounded half up. Zero when
/// there is nothing to complete.
pub fn completion_percentage(completed: usize, total: usize) -> u8 {
    if total == 0 {
        return 0;
    }
    let completed = completed.min(total);
    ((200 * completed + total) / (2 * total)) as u8
}

/// Percentage of the given statuses that are `Completed`.
pub fn completion_of<I>(statuses: I) -> u8
where
    I: IntoIterator<Item = MilestoneStatus>,
{
    let (completed, total) = statuses.into_iter().fold((0, 0), |(done, total), s| {
        (done + usize::from(s == MilestoneStatus::Completed), total + 1)
    });
    completion_percentage(completed, total)
}

/// Whether every milestone evaluates to `Completed` on `today`. Trivially
/// true when there are none.
pub fn all_milestones_complete(milestones: &[Milestone], today: NaiveDate) -> bool {
    milestones
        .iter()
        .all(|m| status::effective_milestone_status(m, today) == MilestoneStatus::Completed)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToggleOutcome {
    /// The project is now marked complete.
    Completed,
    /// The completion mark was removed; the automatic status applies again.
    Reopened(ProjectStatus),
    /// Completion was requested but some milestone is unfinished.
    Unchanged,
}

impl ToggleOutcome {
    /// Status to persist, if any.
    pub fn new_status(&self) -> Option<ProjectStatus> {
        match self {
            ToggleOutcome::Completed => Some(ProjectStatus::Completed),
            ToggleOutcome::Reopened(status) => Some(*status),
            ToggleOutcome::Unchanged => None,
        }
    }
}

/// Decide what flipping a project's completion mark does.
pub fn toggle_completion(
    project: &Project,
    milestones: &[Milestone],
    today: NaiveDate,
) -> ToggleOutcome {
    if project.status == ProjectStatus::Completed {
        ToggleOutcome::Reopened(status::project_auto_status(
            project.start_date,
            project.end_date,
            today,
        ))
    } else if all_milestones_complete(milestones, today) {
        ToggleOutcome::Completed
    } else {
        ToggleOutcome::Unchanged
    }
}

/// Whether a milestone edit from `old` to `new` must clear its project's
/// completion mark.
pub fn breaks_completion(
    old: MilestoneStatus,
    new: MilestoneStatus,
    project_status: ProjectStatus,
) -> bool {
    old == MilestoneStatus::Completed
        && new != MilestoneStatus::Completed
        && project_status == ProjectStatus::Completed
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct DashboardSummary {
    pub total_projects: usize,
    pub active_projects: usize,
    pub overdue_projects: usize,
    pub completed_milestones: usize,
    pub pending_milestones: usize,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Dashboard {
    pub projects: Vec<ProjectWithMilestones>,
    pub summary: DashboardSummary,
}

/// Apply the dashboard's derived-field refresh to every project and count
/// the results. Projects marked `Completed` keep their status; unfinished
/// milestones past their end date are flagged `Overdue`.
pub fn refresh_dashboard(projects: &[ProjectWithMilestones], today: NaiveDate) -> Dashboard {
    let mut summary = DashboardSummary {
        total_projects: projects.len(),
        ..DashboardSummary::default()
    };

    let refreshed: Vec<ProjectWithMilestones> = projects
        .iter()
        .map(|entry| {
            let project = status::recompute_project(&entry.project, today);
            let milestones: Vec<Milestone> = entry
                .milestones
                .iter()
                .map(|m| status::flag_overdue(m, today))
                .collect();

            if project.status != ProjectStatus::Completed {
                summary.active_projects += 1;
            }
            if project.status == ProjectStatus::Overdue {
                summary.overdue_projects += 1;
            }
            for m in &milestones {
                if m.status == MilestoneStatus::Completed {
                    summary.completed_milestones += 1;
                } else {
                    summary.pending_milestones += 1;
                }
            }

            ProjectWithMilestones {
                project,
                milestones,
            }
        })
        .collect();

    Dashboard {
        projects: refreshed,
        summary,
    }
}
