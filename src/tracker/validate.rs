use chrono::NaiveDate;

use crate::error::ValidationError;
use crate::store::Project;

/// Check a milestone's dates against its project. The checks run in a fixed
/// order and only the first failure is reported.
pub fn validate_milestone_dates(
    project: &Project,
    start_date: NaiveDate,
    end_date: NaiveDate,
) -> Result<(), ValidationError> {
    if start_date < project.start_date {
        return Err(ValidationError::MilestoneStartsBeforeProject {
            project_start: project.start_date,
        });
    }
    if end_date > project.end_date {
        return Err(ValidationError::MilestoneEndsAfterProject {
            project_end: project.end_date,
        });
    }
    if start_date > end_date {
        return Err(ValidationError::MilestoneStartAfterEnd);
    }
    Ok(())
}

pub fn validate_project_dates(
    start_date: NaiveDate,
    end_date: NaiveDate,
) -> Result<(), ValidationError> {
    if start_date > end_date {
        return Err(ValidationError::ProjectStartAfterEnd);
    }
    Ok(())
}

/// `existing` is the project currently holding the (already title-cased)
/// name, if any. `own_id` is the id of the project being renamed, or `None`
/// when creating.
pub fn check_name_available(
    project_name: &str,
    existing: Option<&Project>,
    own_id: Option<i64>,
) -> Result<(), ValidationError> {
    match existing {
        Some(other) if Some(other.id) != own_id => Err(ValidationError::DuplicateProjectName(
            project_name.to_string(),
        )),
        _ => Ok(()),
    }
}
