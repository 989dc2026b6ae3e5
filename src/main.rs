use std::fs;
use std::path::PathBuf;

use anyhow::{Context, Result};
use chrono::NaiveDate;
use clap::{Parser, Subcommand};

use timeline::config::{self, Config};
use timeline::error::TrackerError;
use timeline::service::{self, MilestoneForm, ProjectForm, Tracker};
use timeline::store::{MilestoneStatus, Store};
use timeline::tracker::{DashboardSummary, ToggleOutcome};

#[derive(Parser)]
#[command(
    name = "timeline",
    version = timeline::VERSION,
    about = "Track projects and milestones"
)]
struct Cli {
    /// Evaluate statuses as of this date (YYYY-MM-DD) instead of today
    #[arg(long, global = true)]
    today: Option<String>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Launch the TUI dashboard (default)
    Dashboard,
    /// Initialize the timeline config directory
    Init,
    /// Print dashboard totals only
    Summary,
    /// List projects with refreshed statuses and dashboard totals
    ListProjects,
    /// Add a project
    AddProject {
        /// Project name (title-cased, must be unique)
        name: String,
        /// Client name
        client: String,
        /// Start date (YYYY-MM-DD)
        start: String,
        /// End date (YYYY-MM-DD)
        end: String,
    },
    /// Edit a project's names and dates
    EditProject {
        id: i64,
        name: String,
        client: String,
        start: String,
        end: String,
    },
    /// Mark a project completed, or clear the mark
    Toggle { id: i64 },
    /// Remove a project and all its milestones
    RemoveProject { id: i64 },
    /// Show a project with its milestones and completion
    Show { id: i64 },
    /// Add a milestone to a project
    AddMilestone {
        /// Project id
        project_id: i64,
        /// Milestone name
        name: String,
        /// Start date (YYYY-MM-DD)
        start: String,
        /// End date (YYYY-MM-DD)
        end: String,
        /// not_started, in_progress, overdue or completed
        #[arg(short, long)]
        status: Option<String>,
        /// low, medium or high
        #[arg(short, long)]
        priority: Option<String>,
    },
    /// Edit a milestone; omitted status/priority keep their current value
    EditMilestone {
        id: i64,
        name: String,
        start: String,
        end: String,
        #[arg(short, long)]
        status: Option<String>,
        #[arg(short, long)]
        priority: Option<String>,
    },
    /// Remove a milestone
    RemoveMilestone { id: i64 },
    /// Remove several milestones, e.g. "3, 7, 99"
    RemoveMilestones { ids: String },
    /// Set a milestone's status without any date checks
    SetStatus { id: i64, status: String },
    /// Search project (or client) names by prefix
    Search {
        #[arg(default_value = "")]
        term: String,
        /// Search client names instead of project names
        #[arg(short, long)]
        clients: bool,
    },
    /// Check whether a project name is taken
    Exists { name: String },
    /// Export the project timeline as JSON
    Export {
        /// Only projects ending on or after this date
        #[arg(long, requires = "to")]
        from: Option<String>,
        /// Only projects starting on or before this date
        #[arg(long, requires = "from")]
        to: Option<String>,
        /// Output path (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = config::load()?;
    let command = cli.command.unwrap_or(Commands::Dashboard);

    // The dashboard owns the terminal, so logs only go to stderr for CLI commands.
    if !matches!(command, Commands::Dashboard) {
        tracing_subscriber::fmt()
            .with_max_level(config.tracing_level())
            .with_writer(std::io::stderr)
            .init();
    }

    let today = resolve_today(cli.today.as_deref())?;
    run(command, config, today)
}

fn run(command: Commands, config: Config, today: NaiveDate) -> Result<()> {
    match command {
        Commands::Init => {
            config::ensure_dirs()?;
            println!("timeline initialized at ~/.timeline/");
            Ok(())
        }
        Commands::Dashboard => {
            let tracker = open_tracker(&config)?;
            timeline::tui::run(tracker, config, today)
        }
        Commands::Summary => {
            let tracker = open_tracker(&config)?;
            print_summary(&tracker.dashboard(today)?.summary);
            Ok(())
        }
        Commands::ListProjects => {
            let tracker = open_tracker(&config)?;
            let dashboard = tracker.dashboard(today)?;
            print_summary(&dashboard.summary);
            if dashboard.projects.is_empty() {
                println!("No projects. Use `timeline add-project` to add one.");
            }
            for entry in &dashboard.projects {
                let p = &entry.project;
                let completion = timeline::tracker::completion_of(
                    entry.milestones.iter().map(|m| m.status),
                );
                println!(
                    "  {} [{}] {} ({}) {} → {}, {}%",
                    p.status.symbol(),
                    p.id,
                    p.project_name,
                    p.client_name,
                    config.format_date(p.start_date),
                    config.format_date(p.end_date),
                    completion,
                );
            }
            Ok(())
        }
        Commands::AddProject {
            name,
            client,
            start,
            end,
        } => {
            let form = ProjectForm::parse(&name, &client, &start, &end)?;
            let tracker = open_tracker(&config)?;
            let project = tracker
                .create_project(&form)
                .inspect_err(|e| echo_project_form(&form, e))?;
            println!(
                "Added project '{}' for {} [{}]",
                project.project_name, project.client_name, project.id
            );
            Ok(())
        }
        Commands::EditProject {
            id,
            name,
            client,
            start,
            end,
        } => {
            let form = ProjectForm::parse(&name, &client, &start, &end)?;
            let tracker = open_tracker(&config)?;
            let project = tracker
                .edit_project(id, &form)
                .inspect_err(|e| echo_project_form(&form, e))?;
            println!("Updated project '{}' [{}]", project.project_name, project.id);
            Ok(())
        }
        Commands::Toggle { id } => {
            let tracker = open_tracker(&config)?;
            match tracker.toggle_project_status(id, today)? {
                ToggleOutcome::Completed => println!("Project {id} marked completed"),
                ToggleOutcome::Reopened(status) => {
                    println!("Project {id} reopened ({status})");
                }
                ToggleOutcome::Unchanged => {
                    println!("Project {id} unchanged: not every milestone is completed");
                }
            }
            Ok(())
        }
        Commands::RemoveProject { id } => {
            let tracker = open_tracker(&config)?;
            tracker.delete_project(id)?;
            println!("Removed project {id}");
            Ok(())
        }
        Commands::Show { id } => {
            let tracker = open_tracker(&config)?;
            let detail = tracker.project_detail(id, today)?;
            let p = &detail.project;
            println!("{} ({})", p.project_name, p.client_name);
            println!(
                "  {} → {}  status: {}",
                config.format_date(p.start_date),
                config.format_date(p.end_date),
                p.status
            );
            println!(
                "  {}/{} milestones completed ({}%)",
                detail.completed_milestones,
                detail.milestones.len(),
                detail.completion_percentage
            );
            for m in &detail.milestones {
                println!(
                    "  {} [{}] {} {} → {} [{}] ({})",
                    m.status.symbol(),
                    m.id,
                    m.milestone_name,
                    config.format_date(m.start_date),
                    config.format_date(m.end_date),
                    m.status,
                    m.priority,
                );
            }
            Ok(())
        }
        Commands::AddMilestone {
            project_id,
            name,
            start,
            end,
            status,
            priority,
        } => {
            let form = MilestoneForm::parse(
                &name,
                &start,
                &end,
                status.as_deref(),
                priority.as_deref(),
            )?;
            let tracker = open_tracker(&config)?;
            let milestone = tracker
                .create_milestone(project_id, &form)
                .inspect_err(|e| echo_milestone_form(&form, e))?;
            println!(
                "Added milestone '{}' [{}] to project {}",
                milestone.milestone_name, milestone.id, project_id
            );
            Ok(())
        }
        Commands::EditMilestone {
            id,
            name,
            start,
            end,
            status,
            priority,
        } => {
            let mut form =
                MilestoneForm::parse(&name, &start, &end, status.as_deref(), priority.as_deref())?;
            let tracker = open_tracker(&config)?;
            let current = tracker
                .store()
                .get_milestone(id)?
                .ok_or_else(|| TrackerError::milestone_not_found(id))?;
            if status.is_none() {
                form.status = current.status;
            }
            if priority.is_none() {
                form.priority = current.priority;
            }
            let milestone = tracker
                .edit_milestone(id, &form)
                .inspect_err(|e| echo_milestone_form(&form, e))?;
            println!("Updated milestone '{}' [{}]", milestone.milestone_name, milestone.id);
            Ok(())
        }
        Commands::RemoveMilestone { id } => {
            let tracker = open_tracker(&config)?;
            let project_id = tracker.delete_milestone(id)?;
            println!("Removed milestone {id} from project {project_id}");
            Ok(())
        }
        Commands::RemoveMilestones { ids } => {
            service::parse_id_list(&ids)?;
            let tracker = open_tracker(&config)?;
            let result = tracker.bulk_delete_milestones(&ids)?;
            if result.deleted > 0 {
                println!("Successfully deleted {} milestone(s)!", result.deleted);
            } else {
                println!("No milestones were deleted");
            }
            Ok(())
        }
        Commands::SetStatus { id, status } => {
            let status: MilestoneStatus = status.parse().map_err(TrackerError::MalformedInput)?;
            let tracker = open_tracker(&config)?;
            let milestone = tracker.set_milestone_status(id, status)?;
            println!(
                "Milestone '{}' is now {}",
                milestone.milestone_name, milestone.status
            );
            Ok(())
        }
        Commands::Search { term, clients } => {
            let tracker = open_tracker(&config)?;
            let names = if clients {
                tracker.search_clients(&term)?
            } else {
                tracker.search_projects(&term)?
            };
            for name in &names {
                println!("{name}");
            }
            Ok(())
        }
        Commands::Exists { name } => {
            let tracker = open_tracker(&config)?;
            match tracker.project_exists(&name)? {
                Some(project) => println!(
                    "A project named \"{}\" already exists. [{}]",
                    project.project_name, project.id
                ),
                None => println!("No project named \"{}\".", name.trim()),
            }
            Ok(())
        }
        Commands::Export { from, to, output } => {
            let window = match (from, to) {
                (Some(from), Some(to)) => {
                    Some((service::parse_date(&from)?, service::parse_date(&to)?))
                }
                _ => None,
            };
            let tracker = open_tracker(&config)?;
            let projects = tracker.timeline(window, today)?;
            let export = serde_json::json!({
                "generated_at": chrono::Local::now().to_rfc3339(),
                "today": today,
                "total_milestones": projects.iter().map(|p| p.milestones.len()).sum::<usize>(),
                "projects": projects,
            });
            let json = serde_json::to_string_pretty(&export)?;

            if let Some(path) = output {
                fs::write(&path, &json)
                    .with_context(|| format!("failed to write {}", path.display()))?;
                println!(
                    "Exported {} projects to {}",
                    projects.len(),
                    path.display()
                );
            } else {
                println!("{json}");
            }
            Ok(())
        }
    }
}

fn print_summary(s: &DashboardSummary) {
    println!(
        "{} projects, {} active, {} overdue | milestones: {} completed, {} pending",
        s.total_projects,
        s.active_projects,
        s.overdue_projects,
        s.completed_milestones,
        s.pending_milestones,
    );
}

fn resolve_today(arg: Option<&str>) -> Result<NaiveDate> {
    match arg {
        Some(s) => Ok(service::parse_date(s)?),
        None => Ok(chrono::Local::now().date_naive()),
    }
}

fn open_tracker(config: &Config) -> Result<Tracker> {
    let db_path = config.db_path()?;
    if let Some(parent) = db_path.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("failed to create {}", parent.display()))?;
    }
    let store = Store::open(&db_path)?;
    store.migrate()?;
    Ok(Tracker::new(store))
}

fn echo_project_form(form: &ProjectForm, err: &TrackerError) {
    if let TrackerError::Validation(_) = err {
        eprintln!(
            "Submitted: name='{}' client='{}' start={} end={}",
            form.project_name, form.client_name, form.start_date, form.end_date
        );
    }
}

fn echo_milestone_form(form: &MilestoneForm, err: &TrackerError) {
    if let TrackerError::Validation(_) = err {
        eprintln!(
            "Submitted: name='{}' start={} end={} status={} priority={}",
            form.milestone_name, form.start_date, form.end_date, form.status, form.priority
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config_in(dir: &tempfile::TempDir) -> Config {
        Config {
            database_path: Some(dir.path().join("timeline.db")),
            ..Config::default()
        }
    }

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 6, 1).unwrap()
    }

    #[test]
    fn malformed_input_never_creates_the_database() {
        let dir = tempfile::tempdir().unwrap();
        let config = config_in(&dir);
        let db = config.db_path().unwrap();

        let bad = [
            Commands::AddProject {
                name: "p".into(),
                client: "c".into(),
                start: "01/02/2024".into(),
                end: "2024-03-01".into(),
            },
            Commands::EditProject {
                id: 1,
                name: "p".into(),
                client: "c".into(),
                start: "2024-01-01".into(),
                end: "soon".into(),
            },
            Commands::AddMilestone {
                project_id: 1,
                name: "m".into(),
                start: "2024-01-01".into(),
                end: "2024-02-01".into(),
                status: Some("done".into()),
                priority: None,
            },
            Commands::EditMilestone {
                id: 1,
                name: "m".into(),
                start: "2024-01-01".into(),
                end: "2024-02-01".into(),
                status: None,
                priority: Some("urgent".into()),
            },
            Commands::RemoveMilestones { ids: "1, x".into() },
            Commands::SetStatus {
                id: 1,
                status: "finished".into(),
            },
        ];
        for command in bad {
            assert!(run(command, config.clone(), today()).is_err());
            assert!(!db.exists());
        }
    }

    #[test]
    fn valid_input_opens_the_database() {
        let dir = tempfile::tempdir().unwrap();
        let config = config_in(&dir);
        let command = Commands::AddProject {
            name: "p".into(),
            client: "c".into(),
            start: "2024-01-01".into(),
            end: "2024-03-01".into(),
        };
        run(command, config.clone(), today()).unwrap();
        assert!(config.db_path().unwrap().exists());
    }
}
