use axum::{
    extract::rejection::{JsonRejection, PathRejection, QueryRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use std::fmt;

use crate::domain::{AuthError, ProjectError, RepositoryError, ScheduleError};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    ValidationFailed,
    BadRequest,
    InvalidCredentials,
    Unauthorized,
    TokenExpired,
    Forbidden,
    NotFound,
    Conflict,
    Internal,
}

#[derive(Serialize)]
struct ErrorBody {
    error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    code: Option<ErrorCode>,
}

#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    message: String,
    code: Option<ErrorCode>,
}

impl ApiError {
    pub fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
            code: None,
        }
    }

    pub fn with_code(mut self, code: ErrorCode) -> Self {
        self.code = Some(code);
        self
    }

    /// Storage and other unexpected failures. The message is deliberately
    /// generic; callers log the details.
    pub fn internal() -> Self {
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, "internal server error")
            .with_code(ErrorCode::Internal)
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, message).with_code(ErrorCode::BadRequest)
    }

    pub fn validation(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, message).with_code(ErrorCode::ValidationFailed)
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(StatusCode::NOT_FOUND, message).with_code(ErrorCode::NotFound)
    }

    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self::new(StatusCode::UNAUTHORIZED, message).with_code(ErrorCode::Unauthorized)
    }

    pub fn forbidden(message: impl Into<String>) -> Self {
        Self::new(StatusCode::FORBIDDEN, message).with_code(ErrorCode::Forbidden)
    }

    pub fn conflict(message: impl Into<String>) -> Self {
        Self::new(StatusCode::CONFLICT, message).with_code(ErrorCode::Conflict)
    }

    pub fn status(&self) -> StatusCode {
        self.status
    }

    pub fn code(&self) -> Option<ErrorCode> {
        self.code
    }
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.status, self.message)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = ErrorBody {
            error: self.message,
            code: self.code,
        };
        (self.status, Json(body)).into_response()
    }
}

impl From<RepositoryError> for ApiError {
    fn from(err: RepositoryError) -> Self {
        match err {
            RepositoryError::Conflict(ref constraint) => {
                Self::conflict(format!("conflicts with an existing record ({constraint})"))
            }
            RepositoryError::Database(ref e) => {
                tracing::error!("Database error: {:?}", e);
                Self::internal()
            }
        }
    }
}

impl From<AuthError> for ApiError {
    fn from(err: AuthError) -> Self {
        match err {
            AuthError::InvalidCredentials => Self::new(StatusCode::UNAUTHORIZED, err.to_string())
                .with_code(ErrorCode::InvalidCredentials),
            AuthError::TokenExpired => Self::new(StatusCode::UNAUTHORIZED, err.to_string())
                .with_code(ErrorCode::TokenExpired),
            AuthError::MalformedToken | AuthError::InvalidSignature | AuthError::UnknownUser => {
                Self::unauthorized(err.to_string())
            }
            AuthError::UsernameTaken(_) => Self::conflict(err.to_string()),
            AuthError::RegistrationDisabled => Self::forbidden(err.to_string()),
            AuthError::Validation(message) => Self::validation(message),
            AuthError::Crypto(message) => {
                tracing::error!("Auth crypto failure: {}", message);
                Self::internal()
            }
            AuthError::Repository(e) => e.into(),
        }
    }
}

impl From<ProjectError> for ApiError {
    fn from(err: ProjectError) -> Self {
        match err {
            ProjectError::NotFound(_) => Self::not_found(err.to_string()),
            ProjectError::NameTaken(_) => Self::conflict(err.to_string()),
            ProjectError::Validation(message) => Self::validation(message),
            ProjectError::Repository(e) => e.into(),
        }
    }
}

impl From<ScheduleError> for ApiError {
    fn from(err: ScheduleError) -> Self {
        match err {
            ScheduleError::NotFound(_) => Self::not_found(err.to_string()),
            ScheduleError::InvalidTimeRange { .. }
            | ScheduleError::InvalidDateRange
            | ScheduleError::UnknownProject(_) => Self::validation(err.to_string()),
            ScheduleError::Validation(message) => Self::validation(message),
            ScheduleError::Repository(e) => e.into(),
        }
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        Self::bad_request(rejection.body_text())
    }
}

impl From<QueryRejection> for ApiError {
    fn from(rejection: QueryRejection) -> Self {
        Self::bad_request(rejection.body_text())
    }
}

impl From<PathRejection> for ApiError {
    fn from(rejection: PathRejection) -> Self {
        Self::bad_request(rejection.body_text())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::models::{ProjectId, ScheduleId};

    #[test]
    fn auth_errors_map_to_statuses_and_codes() {
        let cases = [
            (AuthError::InvalidCredentials, StatusCode::UNAUTHORIZED, ErrorCode::InvalidCredentials),
            (AuthError::TokenExpired, StatusCode::UNAUTHORIZED, ErrorCode::TokenExpired),
            (AuthError::InvalidSignature, StatusCode::UNAUTHORIZED, ErrorCode::Unauthorized),
            (AuthError::MalformedToken, StatusCode::UNAUTHORIZED, ErrorCode::Unauthorized),
            (AuthError::UsernameTaken("a".into()), StatusCode::CONFLICT, ErrorCode::Conflict),
            (AuthError::RegistrationDisabled, StatusCode::FORBIDDEN, ErrorCode::Forbidden),
            (AuthError::Validation("x".into()), StatusCode::BAD_REQUEST, ErrorCode::ValidationFailed),
            (AuthError::Crypto("x".into()), StatusCode::INTERNAL_SERVER_ERROR, ErrorCode::Internal),
        ];

        for (err, status, code) in cases {
            let api: ApiError = err.into();
            assert_eq!(api.status(), status);
            assert_eq!(api.code(), Some(code));
        }
    }

    #[test]
    fn schedule_rule_violations_are_validation_errors() {
        let errors = [
            ScheduleError::InvalidTimeRange {
                start: "09:00".into(),
                end: "08:00".into(),
            },
            ScheduleError::InvalidDateRange,
            ScheduleError::UnknownProject(ProjectId::new(1)),
        ];
        for err in errors {
            let api: ApiError = err.into();
            assert_eq!(api.status(), StatusCode::BAD_REQUEST);
            assert_eq!(api.code(), Some(ErrorCode::ValidationFailed));
        }

        let api: ApiError = ScheduleError::NotFound(ScheduleId::new(1)).into();
        assert_eq!(api.status(), StatusCode::NOT_FOUND);
    }

    #[test]
    fn database_errors_hide_details() {
        let api: ApiError = ProjectError::Repository(RepositoryError::Database(
            sqlx::Error::PoolTimedOut,
        ))
        .into();
        assert_eq!(api.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(api.message, "internal server error");
    }
}
