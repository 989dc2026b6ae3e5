//! Operation surface: every user-facing action, wired through the store, the
//! status evaluator and the tracker rules.

use chrono::NaiveDate;
use serde::Serialize;

use crate::error::{Result, TrackerError};
use crate::status;
use crate::store::{
    Milestone, MilestoneStatus, Priority, Project, ProjectStatus, ProjectWithMilestones, Store,
};
use crate::tracker::{self, Dashboard, ToggleOutcome};

pub const DATE_INPUT_FORMAT: &str = "%Y-%m-%d";

pub fn parse_date(input: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(input.trim(), DATE_INPUT_FORMAT).map_err(|_| {
        TrackerError::MalformedInput(format!("invalid date '{input}' (expected YYYY-MM-DD)"))
    })
}

/// Parse a comma-separated id list such as `"3, 7, 99"`. Empty entries are
/// skipped; anything that is not an integer rejects the whole list.
pub fn parse_id_list(input: &str) -> Result<Vec<i64>> {
    input
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(|s| {
            s.parse::<i64>()
                .map_err(|_| TrackerError::MalformedInput(format!("invalid milestone id '{s}'")))
        })
        .collect()
}

fn require_name(value: &str, what: &str) -> Result<String> {
    if value.trim().is_empty() {
        return Err(TrackerError::MalformedInput(format!("{what} is required")));
    }
    Ok(value.to_string())
}

/// Project fields as submitted, before normalization.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProjectForm {
    pub project_name: String,
    pub client_name: String,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
}

impl ProjectForm {
    pub fn parse(project_name: &str, client_name: &str, start: &str, end: &str) -> Result<Self> {
        Ok(ProjectForm {
            project_name: require_name(project_name, "project name")?,
            client_name: require_name(client_name, "client name")?,
            start_date: parse_date(start)?,
            end_date: parse_date(end)?,
        })
    }
}

/// Milestone fields as submitted, before normalization.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MilestoneForm {
    pub milestone_name: String,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub status: MilestoneStatus,
    pub priority: Priority,
}

impl MilestoneForm {
    /// `status` defaults to not started and `priority` to medium.
    pub fn parse(
        milestone_name: &str,
        start: &str,
        end: &str,
        status: Option<&str>,
        priority: Option<&str>,
    ) -> Result<Self> {
        let status: MilestoneStatus = match status {
            Some(s) => s.parse().map_err(TrackerError::MalformedInput)?,
            None => MilestoneStatus::NotStarted,
        };
        let priority: Priority = match priority {
            Some(p) => p.parse().map_err(TrackerError::MalformedInput)?,
            None => Priority::Medium,
        };
        Ok(MilestoneForm {
            milestone_name: require_name(milestone_name, "milestone name")?,
            start_date: parse_date(start)?,
            end_date: parse_date(end)?,
            status,
            priority,
        })
    }
}

/// A project with milestone statuses evaluated for display.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProjectDetail {
    pub project: Project,
    pub milestones: Vec<Milestone>,
    pub completed_milestones: usize,
    pub completion_percentage: u8,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BulkDelete {
    pub deleted: usize,
    /// Project owning the first listed milestone, if that id existed.
    pub project_id: Option<i64>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TimelineProject {
    pub id: i64,
    pub project_name: String,
    pub client_name: String,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub status: ProjectStatus,
    pub completion_percentage: u8,
    pub milestones: Vec<Milestone>,
}

pub struct Tracker {
    store: Store,
}

impl Tracker {
    pub fn new(store: Store) -> Self {
        Tracker { store }
    }

    pub fn store(&self) -> &Store {
        &self.store
    }

    fn load_project(&self, id: i64) -> Result<Project> {
        self.store
            .get_project(id)?
            .ok_or_else(|| TrackerError::project_not_found(id))
    }

    fn load_milestone(&self, id: i64) -> Result<Milestone> {
        self.store
            .get_milestone(id)?
            .ok_or_else(|| TrackerError::milestone_not_found(id))
    }

    // ── Projects ──

    /// Refresh derived statuses for every project, persist what changed and
    /// return the aggregated view.
    pub fn dashboard(&self, today: NaiveDate) -> Result<Dashboard> {
        let mut current = Vec::new();
        for project in self.store.list_projects()? {
            let milestones = self.store.list_milestones_for_project(project.id)?;
            current.push(ProjectWithMilestones {
                project,
                milestones,
            });
        }

        let dashboard = tracker::refresh_dashboard(&current, today);

        for (before, after) in current.iter().zip(&dashboard.projects) {
            if before.project.status != after.project.status {
                tracing::debug!(
                    project = after.project.id,
                    from = before.project.status.as_str(),
                    to = after.project.status.as_str(),
                    "project status recomputed"
                );
                self.store
                    .update_project_status(after.project.id, after.project.status)?;
            }
            for (old, new) in before.milestones.iter().zip(&after.milestones) {
                if old.status != new.status {
                    self.store.update_milestone_status(new.id, new.status)?;
                }
            }
        }

        Ok(dashboard)
    }

    pub fn create_project(&self, form: &ProjectForm) -> Result<Project> {
        let project_name = tracker::title_case(&form.project_name);
        let client_name = tracker::title_case(&form.client_name);

        let existing = self.store.find_project_by_name(&project_name)?;
        tracker::check_name_available(&project_name, existing.as_ref(), None)?;
        tracker::validate_project_dates(form.start_date, form.end_date)?;

        let project =
            self.store
                .create_project(&project_name, &client_name, form.start_date, form.end_date)?;
        tracing::info!(project = project.id, name = %project.project_name, "project created");
        Ok(project)
    }

    pub fn edit_project(&self, id: i64, form: &ProjectForm) -> Result<Project> {
        let current = self.load_project(id)?;
        let project_name = tracker::title_case(&form.project_name);
        let client_name = tracker::title_case(&form.client_name);

        if project_name != current.project_name {
            let existing = self.store.find_project_by_name(&project_name)?;
            tracker::check_name_available(&project_name, existing.as_ref(), Some(id))?;
        }
        tracker::validate_project_dates(form.start_date, form.end_date)?;

        let updated = Project {
            project_name,
            client_name,
            start_date: form.start_date,
            end_date: form.end_date,
            ..current
        };
        self.store.update_project(&updated)?;
        tracing::info!(project = id, "project updated");
        Ok(updated)
    }

    /// Flip the completion mark. Asking to complete a project with unfinished
    /// milestones leaves it untouched and is not an error.
    pub fn toggle_project_status(&self, id: i64, today: NaiveDate) -> Result<ToggleOutcome> {
        let project = self.load_project(id)?;
        let milestones = self.store.list_milestones_for_project(id)?;
        let outcome = tracker::toggle_completion(&project, &milestones, today);

        match outcome.new_status() {
            Some(status) => {
                self.store.update_project_status(id, status)?;
                tracing::info!(project = id, status = status.as_str(), "project status toggled");
            }
            None => {
                tracing::info!(project = id, "completion refused: milestones still open");
            }
        }
        Ok(outcome)
    }

    pub fn delete_project(&self, id: i64) -> Result<()> {
        if !self.store.delete_project(id)? {
            return Err(TrackerError::project_not_found(id));
        }
        tracing::info!(project = id, "project deleted");
        Ok(())
    }

    /// Recompute a project's automatic status and persist it if it moved.
    fn refresh_project(&self, project: &Project, today: NaiveDate) -> Result<Project> {
        let refreshed = status::recompute_project(project, today);
        if refreshed.status != project.status {
            tracing::debug!(
                project = project.id,
                from = project.status.as_str(),
                to = refreshed.status.as_str(),
                "project status recomputed"
            );
            self.store
                .update_project_status(refreshed.id, refreshed.status)?;
        }
        Ok(refreshed)
    }

    /// Evaluate every milestone of a project, persisting the ones that moved.
    fn refresh_milestones(&self, project_id: i64, today: NaiveDate) -> Result<Vec<Milestone>> {
        let stored = self.store.list_milestones_for_project(project_id)?;
        let mut milestones = Vec::with_capacity(stored.len());
        for milestone in &stored {
            let refreshed = status::recompute_milestone(milestone, today);
            if refreshed.status != milestone.status {
                self.store
                    .update_milestone_status(refreshed.id, refreshed.status)?;
            }
            milestones.push(refreshed);
        }
        Ok(milestones)
    }

    /// Evaluate the project and each milestone, persist any status that
    /// moved, and compute the project's completion.
    pub fn project_detail(&self, id: i64, today: NaiveDate) -> Result<ProjectDetail> {
        let project = self.refresh_project(&self.load_project(id)?, today)?;
        let milestones = self.refresh_milestones(id, today)?;

        let completed_milestones = milestones
            .iter()
            .filter(|m| m.status == MilestoneStatus::Completed)
            .count();
        let completion_percentage =
            tracker::completion_percentage(completed_milestones, milestones.len());

        Ok(ProjectDetail {
            project,
            milestones,
            completed_milestones,
            completion_percentage,
        })
    }

    // ── Milestones ──

    pub fn create_milestone(&self, project_id: i64, form: &MilestoneForm) -> Result<Milestone> {
        let project = self.load_project(project_id)?;
        if let Err(e) = tracker::validate_milestone_dates(&project, form.start_date, form.end_date)
        {
            tracing::warn!(project = project_id, "milestone rejected: {e}");
            return Err(e.into());
        }

        let milestone = self.store.create_milestone(
            project_id,
            &tracker::title_case(&form.milestone_name),
            form.start_date,
            form.end_date,
            form.status,
            form.priority,
        )?;
        tracing::info!(
            project = project_id,
            milestone = milestone.id,
            "milestone created"
        );
        Ok(milestone)
    }

    pub fn edit_milestone(&self, id: i64, form: &MilestoneForm) -> Result<Milestone> {
        let current = self.load_milestone(id)?;
        let project = self.load_project(current.project_id)?;
        if let Err(e) = tracker::validate_milestone_dates(&project, form.start_date, form.end_date)
        {
            tracing::warn!(milestone = id, "milestone edit rejected: {e}");
            return Err(e.into());
        }

        let updated = Milestone {
            milestone_name: tracker::title_case(&form.milestone_name),
            start_date: form.start_date,
            end_date: form.end_date,
            status: form.status,
            priority: form.priority,
            ..current.clone()
        };
        self.store.update_milestone(&updated)?;

        if tracker::breaks_completion(current.status, updated.status, project.status) {
            self.store
                .update_project_status(project.id, ProjectStatus::NotCompleted)?;
            tracing::info!(
                project = project.id,
                milestone = id,
                "milestone reopened, project no longer completed"
            );
        }
        Ok(updated)
    }

    /// Returns the id of the project the milestone belonged to.
    pub fn delete_milestone(&self, id: i64) -> Result<i64> {
        let milestone = self.load_milestone(id)?;
        self.store.delete_milestone(id)?;
        tracing::info!(milestone = id, "milestone deleted");
        Ok(milestone.project_id)
    }

    /// Delete every listed milestone that exists; unknown ids are skipped.
    pub fn bulk_delete_milestones(&self, ids: &str) -> Result<BulkDelete> {
        let ids = parse_id_list(ids)?;

        // Owner of the first listed id only; a missing first id gives none.
        let project_id = match ids.first() {
            Some(&first) => self.store.get_milestone(first)?.map(|m| m.project_id),
            None => None,
        };

        let mut result = BulkDelete {
            deleted: 0,
            project_id,
        };
        for id in ids {
            if self.store.delete_milestone(id)? {
                result.deleted += 1;
            } else {
                tracing::debug!(milestone = id, "bulk delete: no such milestone");
            }
        }
        tracing::info!(deleted = result.deleted, "milestones bulk deleted");
        Ok(result)
    }

    /// Store a status as given, without date checks.
    pub fn set_milestone_status(&self, id: i64, status: MilestoneStatus) -> Result<Milestone> {
        let milestone = self.load_milestone(id)?;
        self.store.update_milestone_status(id, status)?;
        Ok(Milestone {
            status,
            ..milestone
        })
    }

    // ── Lookup ──

    pub fn search_projects(&self, term: &str) -> Result<Vec<String>> {
        Ok(self.store.search_project_names(term.trim())?)
    }

    pub fn search_clients(&self, term: &str) -> Result<Vec<String>> {
        Ok(self.store.search_client_names(term.trim())?)
    }

    pub fn project_exists(&self, project_name: &str) -> Result<Option<Project>> {
        let normalized = tracker::title_case(project_name);
        if normalized.is_empty() {
            return Ok(None);
        }
        Ok(self.store.find_project_by_name(&normalized)?)
    }

    /// Projects (optionally only those overlapping `window`) with their
    /// milestones, for the Gantt-style export. Statuses are evaluated on
    /// `today` and persisted like any other read.
    pub fn timeline(
        &self,
        window: Option<(NaiveDate, NaiveDate)>,
        today: NaiveDate,
    ) -> Result<Vec<TimelineProject>> {
        let projects = match window {
            Some((start, end)) => {
                if start > end {
                    return Err(TrackerError::MalformedInput(format!(
                        "timeline window starts after it ends ({start} > {end})"
                    )));
                }
                self.store.list_projects_overlapping(start, end)?
            }
            None => self.store.list_projects()?,
        };

        let mut timeline = Vec::with_capacity(projects.len());
        for project in projects {
            let project = self.refresh_project(&project, today)?;
            let milestones = self.refresh_milestones(project.id, today)?;
            timeline.push(TimelineProject {
                completion_percentage: tracker::completion_of(milestones.iter().map(|m| m.status)),
                id: project.id,
                project_name: project.project_name,
                client_name: project.client_name,
                start_date: project.start_date,
                end_date: project.end_date,
                status: project.status,
                milestones,
            });
        }
        Ok(timeline)
    }
}
