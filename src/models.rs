use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

use crate::validation::{ValidationError, validate_bug};

pub const STATUSES: [&str; 4] = ["open", "in-progress", "resolved", "closed"];
pub const PRIORITIES: [&str; 3] = ["low", "medium", "high"];

/// A request field that distinguishes "not sent" (`None`) from a value that
/// was sent but is not a string, `null` included (`Some(None)`).
pub type Field<T> = Option<Option<T>>;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown value `{0}`")]
pub struct UnknownValue(pub String);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Status {
    #[default]
    Open,
    InProgress,
    Resolved,
    Closed,
}

impl Status {
    pub fn as_str(&self) -> &'static str {
        match self {
            Status::Open => "open",
            Status::InProgress => "in-progress",
            Status::Resolved => "resolved",
            Status::Closed => "closed",
        }
    }
}

impl FromStr for Status {
    type Err = UnknownValue;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "open" => Ok(Status::Open),
            "in-progress" => Ok(Status::InProgress),
            "resolved" => Ok(Status::Resolved),
            "closed" => Ok(Status::Closed),
            other => Err(UnknownValue(other.to_string())),
        }
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    Low,
    #[default]
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
}

impl FromStr for Priority {
    type Err = UnknownValue;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "low" => Ok(Priority::Low),
            "medium" => Ok(Priority::Medium),
            "high" => Ok(Priority::High),
            other => Err(UnknownValue(other.to_string())),
        }
    }
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A stored bug as returned by the API.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Bug {
    pub id: Uuid,
    pub title: String,
    pub description: String,
    pub status: Status,
    pub priority: Priority,
    pub reporter: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Bug {
    /// The stored values as a fully populated candidate, used as the base of
    /// an update merge.
    pub fn as_payload(&self) -> BugPayload {
        BugPayload {
            title: Some(Some(self.title.clone())),
            description: Some(Some(self.description.clone())),
            status: Some(Some(self.status.to_string())),
            priority: Some(Some(self.priority.to_string())),
            reporter: Some(Some(self.reporter.clone())),
        }
    }
}

/// Unvalidated request body for create and update.
///
/// Status and priority stay raw strings; the validator checks them.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct BugPayload {
    #[serde(default, deserialize_with = "present")]
    pub title: Field<String>,
    #[serde(default, deserialize_with = "present")]
    pub description: Field<String>,
    #[serde(default, deserialize_with = "present")]
    pub status: Field<String>,
    #[serde(default, deserialize_with = "present")]
    pub priority: Field<String>,
    #[serde(default, deserialize_with = "present")]
    pub reporter: Field<String>,
}

/// A string becomes `Some(Some(_))`. `null` or any other JSON type becomes
/// `Some(None)`: present, but failing that field's own rule.
fn present<'de, D>(deserializer: D) -> Result<Field<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Some(match Value::deserialize(deserializer)? {
        Value::String(text) => Some(text),
        _ => None,
    }))
}

impl BugPayload {
    /// Fills an absent status/priority with the entity defaults. An explicit
    /// `null` is left for the validator to reject.
    pub fn with_defaults(mut self) -> Self {
        if self.status.is_none() {
            self.status = Some(Some(Status::default().to_string()));
        }
        if self.priority.is_none() {
            self.priority = Some(Some(Priority::default().to_string()));
        }
        self
    }

    /// Overlays every field present in `changes` on top of `self`.
    pub fn overlay(mut self, changes: &BugPayload) -> Self {
        if changes.title.is_some() {
            self.title = changes.title.clone();
        }
        if changes.description.is_some() {
            self.description = changes.description.clone();
        }
        if changes.status.is_some() {
            self.status = changes.status.clone();
        }
        if changes.priority.is_some() {
            self.priority = changes.priority.clone();
        }
        if changes.reporter.is_some() {
            self.reporter = changes.reporter.clone();
        }
        self
    }
}

/// A validated new bug, ready to insert.
#[derive(Debug, Clone, PartialEq)]
pub struct BugDraft {
    pub title: String,
    pub description: String,
    pub status: Status,
    pub priority: Priority,
    pub reporter: String,
}

impl BugDraft {
    pub fn from_payload(payload: BugPayload) -> Result<Self, ValidationError> {
        validate_bug(&payload, false)?;
        Ok(BugDraft {
            title: required(payload.title, ValidationError::Title)?,
            description: required(payload.description, ValidationError::Description)?,
            status: required_parsed(payload.status, ValidationError::Status)?,
            priority: required_parsed(payload.priority, ValidationError::Priority)?,
            reporter: required(payload.reporter, ValidationError::Reporter)?,
        })
    }
}

/// The validated subset of fields an update writes.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BugChanges {
    pub title: Option<String>,
    pub description: Option<String>,
    pub status: Option<Status>,
    pub priority: Option<Priority>,
    pub reporter: Option<String>,
}

impl BugChanges {
    pub fn from_payload(payload: &BugPayload) -> Result<Self, ValidationError> {
        validate_bug(payload, true)?;
        Ok(BugChanges {
            title: optional(&payload.title, ValidationError::Title)?,
            description: optional(&payload.description, ValidationError::Description)?,
            status: optional_parsed(&payload.status, ValidationError::Status)?,
            priority: optional_parsed(&payload.priority, ValidationError::Priority)?,
            reporter: optional(&payload.reporter, ValidationError::Reporter)?,
        })
    }

    pub fn is_empty(&self) -> bool {
        *self == BugChanges::default()
    }
}

fn required(field: Field<String>, err: ValidationError) -> Result<String, ValidationError> {
    field
        .flatten()
        .map(|value| value.trim().to_string())
        .ok_or(err)
}

fn required_parsed<T: FromStr>(
    field: Field<String>,
    err: ValidationError,
) -> Result<T, ValidationError> {
    field
        .flatten()
        .and_then(|value| value.parse().ok())
        .ok_or(err)
}

fn optional(field: &Field<String>, err: ValidationError) -> Result<Option<String>, ValidationError> {
    match field {
        None => Ok(None),
        Some(Some(value)) => Ok(Some(value.trim().to_string())),
        Some(None) => Err(err),
    }
}

fn optional_parsed<T: FromStr>(
    field: &Field<String>,
    err: ValidationError,
) -> Result<Option<T>, ValidationError> {
    match field {
        None => Ok(None),
        Some(Some(value)) => value.parse().map(Some).map_err(|_| err),
        Some(None) => Err(err),
    }
}
