use actix_web::http::StatusCode;
use actix_web::{HttpResponse, ResponseError};
use log::error;
use serde::{Deserialize, Serialize};
use std::error::Error;

use crate::config::{RunMode, run_mode};
use crate::validation::ValidationError;

#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error("Bug not found")]
    BugNotFound,
    #[error("Not Found - {0}")]
    RouteNotFound(String),
    #[error("{0}")]
    BadRequest(String),
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

/// JSON body of every error response.
#[derive(Debug, Serialize, Deserialize, PartialEq)]
pub struct ErrorBody {
    pub message: String,
    pub stack: Option<String>,
}

impl ErrorBody {
    pub fn from_error(err: &ApiError, mode: RunMode) -> Self {
        ErrorBody {
            message: err.to_string(),
            stack: (!mode.is_production()).then(|| error_chain(err)),
        }
    }
}

/// The error and each of its causes, one per line.
fn error_chain(err: &dyn Error) -> String {
    let mut lines = vec![err.to_string()];
    let mut source = err.source();
    while let Some(cause) = source {
        lines.push(format!("caused by: {cause}"));
        source = cause.source();
    }
    lines.join("\n")
}

impl ResponseError for ApiError {
    fn status_code(&self) -> StatusCode {
        match self {
            ApiError::Validation(_) | ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::BugNotFound | ApiError::RouteNotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Database(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        if let ApiError::Database(e) = self {
            error!("storage failure: {e:?}");
        }
        HttpResponse::build(self.status_code()).json(ErrorBody::from_error(self, run_mode()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn maps_errors_to_status_codes() {
        assert_eq!(
            ApiError::from(ValidationError::Title).status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(ApiError::BugNotFound.status_code(), StatusCode::NOT_FOUND);
        assert_eq!(
            ApiError::RouteNotFound("/nope".into()).status_code(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            ApiError::from(sqlx::Error::PoolTimedOut).status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn validation_message_passes_through() {
        let body = ErrorBody::from_error(&ValidationError::Reporter.into(), RunMode::Production);
        assert_eq!(body.message, "Reporter is required and cannot exceed 50 characters.");
    }

    #[test]
    fn stack_only_outside_production() {
        let err = ApiError::RouteNotFound("/api/nothing?x=1".into());

        let prod = ErrorBody::from_error(&err, RunMode::Production);
        assert_eq!(prod.message, "Not Found - /api/nothing?x=1");
        assert_eq!(prod.stack, None);

        let dev = ErrorBody::from_error(&err, RunMode::Development);
        assert_eq!(dev.message, prod.message);
        assert_eq!(dev.stack.as_deref(), Some("Not Found - /api/nothing?x=1"));
    }

    #[test]
    fn stack_lists_the_cause_chain() {
        let err = ApiError::from(sqlx::Error::PoolTimedOut);
        let stack = ErrorBody::from_error(&err, RunMode::Development)
            .stack
            .unwrap();
        let lines: Vec<&str> = stack.lines().collect();

        assert_eq!(lines.len(), 2);
        assert!(lines[0].starts_with("Database error: "));
        assert!(lines[1].starts_with("caused by: "));
        assert!(!stack.contains("PoolTimedOut"));
    }

    #[test]
    fn production_body_serializes_null_stack() {
        let body = ErrorBody::from_error(&ApiError::BugNotFound, RunMode::Production);
        assert_eq!(
            serde_json::to_value(body).unwrap(),
            serde_json::json!({ "message": "Bug not found", "stack": null })
        );
    }
}
