use std::time::Duration;

use anyhow::Result;
use chrono::NaiveDate;
use crossterm::event::{KeyCode, KeyModifiers};
use ratatui::DefaultTerminal;

use crate::config::Config;
use crate::service::{ProjectDetail, Tracker};
use crate::store::{Milestone, ProjectWithMilestones};
use crate::tracker::{DashboardSummary, ToggleOutcome};

use super::event::{self, AppEvent};
use super::ui;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Focus {
    Projects,
    Milestones,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputMode {
    Normal,
    ConfirmDelete,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeleteTarget {
    Project { id: i64, name: String },
    Milestone { id: i64, name: String },
}

impl DeleteTarget {
    pub fn describe(&self) -> String {
        match self {
            DeleteTarget::Project { name, .. } => {
                format!("project '{name}' and all its milestones")
            }
            DeleteTarget::Milestone { name, .. } => format!("milestone '{name}'"),
        }
    }
}

pub struct App {
    pub tracker: Tracker,
    pub config: Config,
    pub today: NaiveDate,
    pub should_quit: bool,
    pub focus: Focus,
    pub input_mode: InputMode,

    // Data
    pub projects: Vec<ProjectWithMilestones>,
    pub summary: DashboardSummary,
    pub detail: Option<ProjectDetail>,

    // Selection indices
    pub project_index: usize,
    pub milestone_index: usize,

    pub confirm_target: Option<DeleteTarget>,
    pub status_message: String,
}

impl App {
    pub fn new(tracker: Tracker, config: Config, today: NaiveDate) -> Result<Self> {
        let mut app = App {
            tracker,
            config,
            today,
            should_quit: false,
            focus: Focus::Projects,
            input_mode: InputMode::Normal,
            projects: vec![],
            summary: DashboardSummary::default(),
            detail: None,
            project_index: 0,
            milestone_index: 0,
            confirm_target: None,
            status_message: String::new(),
        };
        app.refresh_data()?;
        Ok(app)
    }

    pub fn refresh_data(&mut self) -> Result<()> {
        let dashboard = self.tracker.dashboard(self.today)?;
        self.projects = dashboard.projects;
        self.summary = dashboard.summary;

        // Clamp indices
        if self.project_index >= self.projects.len() {
            self.project_index = self.projects.len().saturating_sub(1);
        }

        self.detail = match self.projects.get(self.project_index) {
            Some(entry) => Some(self.tracker.project_detail(entry.project.id, self.today)?),
            None => None,
        };

        let milestone_count = self.detail.as_ref().map_or(0, |d| d.milestones.len());
        if self.milestone_index >= milestone_count {
            self.milestone_index = milestone_count.saturating_sub(1);
        }

        Ok(())
    }

    pub fn selected_project(&self) -> Option<&ProjectWithMilestones> {
        self.projects.get(self.project_index)
    }

    pub fn selected_milestone(&self) -> Option<&Milestone> {
        self.detail
            .as_ref()
            .and_then(|d| d.milestones.get(self.milestone_index))
    }

    pub fn run(&mut self, terminal: &mut DefaultTerminal) -> Result<()> {
        let tick_rate = Duration::from_millis(250);

        loop {
            terminal.draw(|frame| ui::draw(frame, self))?;

            match event::poll(tick_rate)? {
                AppEvent::Key(key) => match self.input_mode {
                    InputMode::Normal => self.handle_normal_key(key.code, key.modifiers)?,
                    InputMode::ConfirmDelete => self.handle_confirm_delete_key(key.code)?,
                },
                AppEvent::Resize | AppEvent::Tick => {}
            }

            if self.should_quit {
                return Ok(());
            }
        }
    }

    fn handle_normal_key(&mut self, code: KeyCode, modifiers: KeyModifiers) -> Result<()> {
        match (code, modifiers) {
            (KeyCode::Char('q'), _) | (KeyCode::Char('c'), KeyModifiers::CONTROL) => {
                self.should_quit = true;
            }

            (KeyCode::Tab, _) => {
                self.focus = match self.focus {
                    Focus::Projects => Focus::Milestones,
                    Focus::Milestones => Focus::Projects,
                };
            }

            // Navigation
            (KeyCode::Char('j') | KeyCode::Down, _) => self.move_down()?,
            (KeyCode::Char('k') | KeyCode::Up, _) => self.move_up()?,

            (KeyCode::Char('r'), _) => {
                self.refresh_data()?;
                self.status_message = "Refreshed".into();
            }

            // Toggle project completion
            (KeyCode::Char('t'), _) => {
                if let Some(id) = self.selected_project().map(|p| p.project.id) {
                    let outcome = self.tracker.toggle_project_status(id, self.today)?;
                    self.status_message = match outcome {
                        ToggleOutcome::Completed => "Project marked completed".into(),
                        ToggleOutcome::Reopened(status) => format!("Project reopened ({status})"),
                        ToggleOutcome::Unchanged => {
                            "Cannot complete: some milestones are not completed".into()
                        }
                    };
                    self.refresh_data()?;
                }
            }

            // Cycle milestone status
            (KeyCode::Char('s'), _) => {
                if self.focus == Focus::Milestones
                    && let Some((id, next)) = self.selected_milestone().map(|m| (m.id, m.status.cycle()))
                {
                    let milestone = self.tracker.set_milestone_status(id, next)?;
                    self.status_message = format!(
                        "'{}' set to {}",
                        milestone.milestone_name, milestone.status
                    );
                    self.refresh_data()?;
                }
            }

            // Delete (with confirmation)
            (KeyCode::Char('d'), _) => {
                let target = match self.focus {
                    Focus::Projects => self.selected_project().map(|p| DeleteTarget::Project {
                        id: p.project.id,
                        name: p.project.project_name.clone(),
                    }),
                    Focus::Milestones => {
                        self.selected_milestone().map(|m| DeleteTarget::Milestone {
                            id: m.id,
                            name: m.milestone_name.clone(),
                        })
                    }
                };
                if target.is_some() {
                    self.confirm_target = target;
                    self.input_mode = InputMode::ConfirmDelete;
                }
            }

            _ => {}
        }
        Ok(())
    }

    fn handle_confirm_delete_key(&mut self, code: KeyCode) -> Result<()> {
        match code {
            KeyCode::Char('y') | KeyCode::Enter => {
                if let Some(target) = self.confirm_target.take() {
                    match target {
                        DeleteTarget::Project { id, ref name } => {
                            self.tracker.delete_project(id)?;
                            self.status_message = format!("Removed project '{name}'");
                        }
                        DeleteTarget::Milestone { id, ref name } => {
                            self.tracker.delete_milestone(id)?;
                            self.status_message = format!("Removed milestone '{name}'");
                        }
                    }
                }
                self.input_mode = InputMode::Normal;
                self.refresh_data()?;
            }
            KeyCode::Char('n') | KeyCode::Esc => {
                self.confirm_target = None;
                self.input_mode = InputMode::Normal;
            }
            _ => {}
        }
        Ok(())
    }

    fn move_down(&mut self) -> Result<()> {
        match self.focus {
            Focus::Projects => {
                if self.project_index + 1 < self.projects.len() {
                    self.project_index += 1;
                    self.milestone_index = 0;
                    self.refresh_data()?;
                }
            }
            Focus::Milestones => {
                let count = self.detail.as_ref().map_or(0, |d| d.milestones.len());
                if self.milestone_index + 1 < count {
                    self.milestone_index += 1;
                }
            }
        }
        Ok(())
    }

    fn move_up(&mut self) -> Result<()> {
        match self.focus {
            Focus::Projects => {
                if self.project_index > 0 {
                    self.project_index -= 1;
                    self.milestone_index = 0;
                    self.refresh_data()?;
                }
            }
            Focus::Milestones => {
                self.milestone_index = self.milestone_index.saturating_sub(1);
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::service::{MilestoneForm, ProjectForm};
    use crate::store::{MilestoneStatus, ProjectStatus, Store};

    fn app_with_data() -> App {
        let tracker = Tracker::new(Store::open_in_memory().unwrap());
        for name in ["alpha", "beta"] {
            let form = ProjectForm::parse(name, "client", "2024-01-01", "2024-12-31").unwrap();
            let project = tracker.create_project(&form).unwrap();
            for start in ["2024-02-01", "2024-03-01"] {
                let form = MilestoneForm::parse("m", start, "2024-04-01", None, None).unwrap();
                tracker.create_milestone(project.id, &form).unwrap();
            }
        }
        let today = NaiveDate::from_ymd_opt(2024, 6, 1).unwrap();
        App::new(tracker, Config::default(), today).unwrap()
    }

    #[test]
    fn loads_dashboard_and_first_project_detail() {
        let app = app_with_data();
        assert_eq!(app.projects.len(), 2);
        assert_eq!(app.summary.total_projects, 2);
        let detail = app.detail.as_ref().unwrap();
        assert_eq!(detail.project.project_name, "Alpha");
        assert_eq!(detail.milestones.len(), 2);
        assert_eq!(detail.milestones[0].status, MilestoneStatus::Overdue);
    }

    #[test]
    fn navigation_switches_detail() {
        let mut app = app_with_data();
        app.handle_normal_key(KeyCode::Char('j'), KeyModifiers::NONE)
            .unwrap();
        assert_eq!(app.project_index, 1);
        assert_eq!(app.detail.as_ref().unwrap().project.project_name, "Beta");

        // Already at the bottom.
        app.handle_normal_key(KeyCode::Down, KeyModifiers::NONE)
            .unwrap();
        assert_eq!(app.project_index, 1);

        app.handle_normal_key(KeyCode::Tab, KeyModifiers::NONE)
            .unwrap();
        app.handle_normal_key(KeyCode::Char('j'), KeyModifiers::NONE)
            .unwrap();
        assert_eq!(app.milestone_index, 1);
    }

    #[test]
    fn toggle_refused_reports_message() {
        let mut app = app_with_data();
        app.handle_normal_key(KeyCode::Char('t'), KeyModifiers::NONE)
            .unwrap();
        assert!(app.status_message.starts_with("Cannot complete"));
        assert_ne!(app.projects[0].project.status, ProjectStatus::Completed);
    }

    #[test]
    fn cycling_milestones_to_completed_allows_toggle() {
        let mut app = app_with_data();
        app.handle_normal_key(KeyCode::Tab, KeyModifiers::NONE)
            .unwrap();
        for index in 0..2 {
            app.milestone_index = index;
            app.handle_normal_key(KeyCode::Char('s'), KeyModifiers::NONE)
                .unwrap();
        }
        assert!(
            app.detail
                .as_ref()
                .unwrap()
                .milestones
                .iter()
                .all(|m| m.status == MilestoneStatus::Completed)
        );

        app.handle_normal_key(KeyCode::Char('t'), KeyModifiers::NONE)
            .unwrap();
        assert_eq!(app.projects[0].project.status, ProjectStatus::Completed);
    }

    #[test]
    fn delete_requires_confirmation() {
        let mut app = app_with_data();
        app.handle_normal_key(KeyCode::Char('d'), KeyModifiers::NONE)
            .unwrap();
        assert_eq!(app.input_mode, InputMode::ConfirmDelete);

        app.handle_confirm_delete_key(KeyCode::Esc).unwrap();
        assert_eq!(app.input_mode, InputMode::Normal);
        assert_eq!(app.projects.len(), 2);

        app.handle_normal_key(KeyCode::Char('d'), KeyModifiers::NONE)
            .unwrap();
        app.handle_confirm_delete_key(KeyCode::Char('y')).unwrap();
        assert_eq!(app.projects.len(), 1);
        assert_eq!(app.status_message, "Removed project 'Alpha'");
    }
}
