use std::collections::BTreeMap;

use axum::{
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use sea_orm::DbErr;
use thiserror::Error;
use tracing::{error, info, warn};
use validator::ValidationErrors;

use crate::schemas::ErrorResponse;

/// Field name to the messages a submitted form failed with.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FormErrors(BTreeMap<String, Vec<String>>);

impl FormErrors {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, field: &str, message: impl Into<String>) {
        self.0.entry(field.to_string()).or_default().push(message.into());
    }

    /// Record "This field is required." when `value` is blank.
    pub fn require(&mut self, field: &str, value: &str) {
        if value.trim().is_empty() {
            self.add(field, "This field is required.");
        }
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn has(&self, field: &str) -> bool {
        self.0.contains_key(field)
    }

    pub fn into_inner(self) -> BTreeMap<String, Vec<String>> {
        self.0
    }

    /// `Ok(())` when nothing was recorded, otherwise a validation error
    /// carrying every collected message.
    pub fn finish(self) -> Result<()> {
        if self.is_empty() {
            Ok(())
        } else {
            Err(AppError::Validation(self))
        }
    }
}

impl From<ValidationErrors> for FormErrors {
    fn from(errors: ValidationErrors) -> Self {
        let mut form_errors = FormErrors::new();
        for (field, field_errors) in errors.field_errors() {
            for field_error in field_errors.iter() {
                let message = field_error
                    .message
                    .as_ref()
                    .map(|m| m.to_string())
                    .unwrap_or_else(|| field_error.code.to_string());
                form_errors.add(&field, message);
            }
        }
        form_errors
    }
}

/// Every failure a handler can end with.
///
/// Role mismatches never reach this type: the guards answer them with a
/// redirect to the home page.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("form validation failed: {0:?}")]
    Validation(FormErrors),
    #[error("invalid credentials")]
    InvalidCredentials,
    #[error("{0} not found")]
    NotFound(String),
    #[error("database error: {0}")]
    Database(#[from] DbErr),
    #[error("internal error: {0}")]
    Internal(String),
}

impl From<ValidationErrors> for AppError {
    fn from(errors: ValidationErrors) -> Self {
        AppError::Validation(errors.into())
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, body) = match self {
            AppError::Validation(fields) => {
                warn!("Rejected form submission: {:?}", fields);
                (
                    StatusCode::BAD_REQUEST,
                    ErrorResponse {
                        error: "Please correct the errors below.".to_string(),
                        code: "VALIDATION_ERROR".to_string(),
                        success: false,
                        fields: Some(fields.into_inner()),
                    },
                )
            }
            AppError::InvalidCredentials => {
                warn!("Sign-in attempt with invalid credentials");
                (
                    StatusCode::UNAUTHORIZED,
                    ErrorResponse::new(
                        "Please enter a correct username and password. Note that both fields may be case-sensitive.",
                        "INVALID_CREDENTIALS",
                    ),
                )
            }
            AppError::NotFound(what) => {
                info!("Resource not found: {}", what);
                (
                    StatusCode::NOT_FOUND,
                    ErrorResponse::new(format!("{} not found", what), "NOT_FOUND"),
                )
            }
            AppError::Database(db_error) => {
                error!("Database error: {}", db_error);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    ErrorResponse::new("Database operation failed", "DATABASE_ERROR"),
                )
            }
            AppError::Internal(message) => {
                error!("Internal error: {}", message);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    ErrorResponse::new("Internal server error", "INTERNAL_ERROR"),
                )
            }
        };

        (status, Json(body)).into_response()
    }
}

pub type Result<T> = std::result::Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;
    use validator::Validate;

    #[derive(Validate)]
    struct Probe {
        #[validate(length(min = 1, message = "This field is required."))]
        topic: String,
        #[validate(email)]
        email: String,
    }

    #[test]
    fn test_validation_errors_are_grouped_by_field() {
        let probe = Probe {
            topic: String::new(),
            email: "not-an-email".to_string(),
        };
        let errors: FormErrors = probe.validate().unwrap_err().into();

        let fields = errors.into_inner();
        assert_eq!(fields["topic"], vec!["This field is required.".to_string()]);
        // no custom message: the validator code is used
        assert_eq!(fields["email"], vec!["email".to_string()]);
    }

    #[test]
    fn test_finish_only_fails_when_something_was_recorded() {
        assert!(FormErrors::new().finish().is_ok());

        let mut errors = FormErrors::new();
        errors.add("password2", "The two password fields didn't match.");
        errors.add("password2", "This password is too short.");
        assert!(errors.has("password2"));

        match errors.finish() {
            Err(AppError::Validation(fields)) => {
                assert_eq!(fields.into_inner()["password2"].len(), 2);
            }
            other => panic!("expected validation error, got {:?}", other),
        }
    }

    #[test]
    fn test_status_codes() {
        let cases = [
            (AppError::Validation(FormErrors::new()), StatusCode::BAD_REQUEST),
            (AppError::InvalidCredentials, StatusCode::UNAUTHORIZED),
            (AppError::NotFound("Order".to_string()), StatusCode::NOT_FOUND),
            (AppError::Internal("boom".to_string()), StatusCode::INTERNAL_SERVER_ERROR),
        ];
        for (err, status) in cases {
            assert_eq!(err.into_response().status(), status);
        }
    }
}
