use chrono::NaiveDate;
use thiserror::Error;

/// Rejected write. Each variant renders as the message shown to the user.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("Milestone start date cannot be before project start date ({project_start})")]
    MilestoneStartsBeforeProject { project_start: NaiveDate },

    #[error("Milestone end date cannot be after project end date ({project_end})")]
    MilestoneEndsAfterProject { project_end: NaiveDate },

    #[error("Milestone start date cannot be after end date")]
    MilestoneStartAfterEnd,

    #[error("Start date cannot be after end date")]
    ProjectStartAfterEnd,

    #[error("A project with the name \"{0}\" already exists!")]
    DuplicateProjectName(String),
}

impl ValidationError {
    /// Whether the failure is about a milestone escaping its project's range.
    pub fn is_nesting_violation(&self) -> bool {
        matches!(
            self,
            ValidationError::MilestoneStartsBeforeProject { .. }
                | ValidationError::MilestoneEndsAfterProject { .. }
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Entity {
    Project,
    Milestone,
}

impl std::fmt::Display for Entity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Entity::Project => f.write_str("project"),
            Entity::Milestone => f.write_str("milestone"),
        }
    }
}

#[derive(Debug, Error)]
pub enum TrackerError {
    #[error("{entity} {id} not found")]
    NotFound { entity: Entity, id: i64 },

    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("malformed input: {0}")]
    MalformedInput(String),

    #[error(transparent)]
    Store(#[from] anyhow::Error),
}

impl TrackerError {
    pub fn project_not_found(id: i64) -> Self {
        TrackerError::NotFound {
            entity: Entity::Project,
            id,
        }
    }

    pub fn milestone_not_found(id: i64) -> Self {
        TrackerError::NotFound {
            entity: Entity::Milestone,
            id,
        }
    }
}

pub type Result<T> = std::result::Result<T, TrackerError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn messages_name_the_project_bounds() {
        let err = ValidationError::MilestoneStartsBeforeProject {
            project_start: NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
        };
        assert_eq!(
            err.to_string(),
            "Milestone start date cannot be before project start date (2024-01-01)"
        );
        assert!(err.is_nesting_violation());
        assert!(!ValidationError::MilestoneStartAfterEnd.is_nesting_violation());
    }

    #[test]
    fn not_found_message() {
        assert_eq!(
            TrackerError::milestone_not_found(7).to_string(),
            "milestone 7 not found"
        );
    }
}
