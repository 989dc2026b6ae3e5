//! Roll-ups and write-time checks built on top of the status evaluator.

mod naming;
mod progress;
mod validate;

pub use naming::title_case;
pub use progress::{
    Dashboard, DashboardSummary, ToggleOutcome, all_milestones_complete, breaks_completion,
    completion_of, completion_percentage, refresh_dashboard, toggle_completion,
};
pub use validate::{check_name_available, validate_milestone_dates, validate_project_dates};
