use crate::config::ConfigError;
use crate::policy::{BoundaryServiceError, PolicyError};
use crate::telemetry::TelemetryError;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use std::fmt;

#[derive(Debug)]
pub enum AppError {
    Config(ConfigError),
    Telemetry(TelemetryError),
    Io(std::io::Error),
    Server(axum::Error),
    Policy(PolicyError),
    Boundary(BoundaryServiceError),
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppError::Config(err) => write!(f, "configuration error: {}", err),
            AppError::Telemetry(err) => write!(f, "telemetry error: {}", err),
            AppError::Io(err) => write!(f, "io error: {}", err),
            AppError::Server(err) => write!(f, "server error: {}", err),
            AppError::Policy(err) => write!(f, "policy error: {}", err),
            AppError::Boundary(err) => write!(f, "boundary error: {}", err),
        }
    }
}

impl std::error::Error for AppError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            AppError::Config(err) => Some(err),
            AppError::Telemetry(err) => Some(err),
            AppError::Io(err) => Some(err),
            AppError::Server(err) => Some(err),
            AppError::Policy(err) => Some(err),
            AppError::Boundary(err) => Some(err),
        }
    }
}

impl AppError {
    fn status(&self) -> StatusCode {
        let policy = match self {
            AppError::Policy(err) => err,
            AppError::Boundary(BoundaryServiceError::Policy(err)) => err,
            _ => return StatusCode::INTERNAL_SERVER_ERROR,
        };

        match policy {
            PolicyError::ContextNotFound(_) => StatusCode::NOT_FOUND,
            PolicyError::Validation(_) | PolicyError::Schema(_) | PolicyError::Reference(_) => {
                StatusCode::UNPROCESSABLE_ENTITY
            }
            PolicyError::Open { .. } | PolicyError::Read(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        let body = Json(json!({ "error": self.to_string() }));
        (status, body).into_response()
    }
}

impl From<ConfigError> for AppError {
    fn from(value: ConfigError) -> Self {
        Self::Config(value)
    }
}

impl From<TelemetryError> for AppError {
    fn from(value: TelemetryError) -> Self {
        Self::Telemetry(value)
    }
}

impl From<std::io::Error> for AppError {
    fn from(value: std::io::Error) -> Self {
        Self::Io(value)
    }
}

impl From<axum::Error> for AppError {
    fn from(value: axum::Error) -> Self {
        Self::Server(value)
    }
}

impl From<PolicyError> for AppError {
    fn from(value: PolicyError) -> Self {
        Self::Policy(value)
    }
}

impl From<BoundaryServiceError> for AppError {
    fn from(value: BoundaryServiceError) -> Self {
        Self::Boundary(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::policy::{ContextNotFoundError, ValidationError};

    #[test]
    fn policy_errors_map_to_client_statuses() {
        let missing = AppError::from(PolicyError::from(ContextNotFoundError {
            context_id: "nowhere".to_string(),
            version: "v1".to_string(),
        }));
        assert_eq!(missing.into_response().status(), StatusCode::NOT_FOUND);

        let blank = AppError::from(PolicyError::from(ValidationError::BlankAction));
        assert_eq!(
            blank.into_response().status(),
            StatusCode::UNPROCESSABLE_ENTITY
        );
    }

    #[test]
    fn infrastructure_errors_are_internal() {
        let io = AppError::from(std::io::Error::new(std::io::ErrorKind::Other, "disk"));
        assert_eq!(
            io.into_response().status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }
}
