use std::ops::RangeInclusive;

use crate::models::{BugPayload, Field, Priority, Status};

pub const TITLE_CHARS: RangeInclusive<usize> = 3..=100;
pub const DESCRIPTION_CHARS: RangeInclusive<usize> = 1..=500;
pub const REPORTER_CHARS: RangeInclusive<usize> = 1..=50;

/// The first rule a candidate bug broke.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("Title is required and must be between 3 and 100 characters.")]
    Title,
    #[error("Description is required and cannot exceed 500 characters.")]
    Description,
    #[error("Status must be one of: open, in-progress, resolved, closed.")]
    Status,
    #[error("Priority must be one of: low, medium, high.")]
    Priority,
    #[error("Reporter is required and cannot exceed 50 characters.")]
    Reporter,
    #[error("Invalid status. Must be one of: open, in-progress, resolved, closed.")]
    InvalidStatus,
}

impl ValidationError {
    pub fn field(&self) -> &'static str {
        match self {
            ValidationError::Title => "title",
            ValidationError::Description => "description",
            ValidationError::Status | ValidationError::InvalidStatus => "status",
            ValidationError::Priority => "priority",
            ValidationError::Reporter => "reporter",
        }
    }
}

/// Checks a candidate bug field by field, in the order title, description,
/// status, priority, reporter, and reports the first failure.
///
/// With `partial` set, only fields present in the candidate are checked. An
/// explicit `null` counts as present.
pub fn validate_bug(candidate: &BugPayload, partial: bool) -> Result<(), ValidationError> {
    let checked = |field: &Field<String>| !partial || field.is_some();

    if checked(&candidate.title) && !trimmed_len_within(value_of(&candidate.title), &TITLE_CHARS) {
        return Err(ValidationError::Title);
    }
    if checked(&candidate.description)
        && !trimmed_len_within(value_of(&candidate.description), &DESCRIPTION_CHARS)
    {
        return Err(ValidationError::Description);
    }
    if checked(&candidate.status) && !parses::<Status>(value_of(&candidate.status)) {
        return Err(ValidationError::Status);
    }
    if checked(&candidate.priority) && !parses::<Priority>(value_of(&candidate.priority)) {
        return Err(ValidationError::Priority);
    }
    if checked(&candidate.reporter)
        && !trimmed_len_within(value_of(&candidate.reporter), &REPORTER_CHARS)
    {
        return Err(ValidationError::Reporter);
    }
    Ok(())
}

/// Checks a single status value on its own.
pub fn validate_status(status: Option<&str>) -> Result<(), ValidationError> {
    if parses::<Status>(status) {
        Ok(())
    } else {
        Err(ValidationError::InvalidStatus)
    }
}

fn value_of(field: &Field<String>) -> Option<&str> {
    field.as_ref().and_then(|value| value.as_deref())
}

fn trimmed_len_within(value: Option<&str>, bounds: &RangeInclusive<usize>) -> bool {
    value.is_some_and(|v| bounds.contains(&v.trim().chars().count()))
}

fn parses<T: std::str::FromStr>(value: Option<&str>) -> bool {
    value.is_some_and(|v| v.parse::<T>().is_ok())
}
