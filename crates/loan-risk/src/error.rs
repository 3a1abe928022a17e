use crate::config::ConfigError;
use crate::telemetry::TelemetryError;
use crate::workflows::assessment::{
    AssessmentServiceError, ClassifierError, InvalidInputError, PolicyError, RepositoryError,
};
use crate::workflows::upload::UploadError;
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
    Policy(PolicyError),
    Upload(UploadError),
    Scoring(InvalidInputError),
    Classifier(ClassifierError),
    Repository(RepositoryError),
    ModelUnavailable,
    Serialization(serde_json::Error),
    Export(csv::Error),
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppError::Config(err) => write!(f, "configuration error: {}", err),
            AppError::Telemetry(err) => write!(f, "telemetry error: {}", err),
            AppError::Io(err) => write!(f, "io error: {}", err),
            AppError::Policy(err) => write!(f, "risk policy error: {}", err),
            AppError::Upload(err) => write!(f, "upload error: {}", err),
            AppError::Scoring(err) => write!(f, "scoring error: {}", err),
            AppError::Classifier(err) => write!(f, "classifier error: {}", err),
            AppError::Repository(err) => write!(f, "storage error: {}", err),
            AppError::ModelUnavailable => write!(f, "no classifier artifact is configured"),
            AppError::Serialization(err) => write!(f, "serialization error: {}", err),
            AppError::Export(err) => write!(f, "export error: {}", err),
        }
    }
}

impl std::error::Error for AppError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            AppError::Config(err) => Some(err),
            AppError::Telemetry(err) => Some(err),
            AppError::Io(err) => Some(err),
            AppError::Policy(err) => Some(err),
            AppError::Upload(err) => Some(err),
            AppError::Scoring(err) => Some(err),
            AppError::Classifier(err) => Some(err),
            AppError::Repository(err) => Some(err),
            AppError::ModelUnavailable => None,
            AppError::Serialization(err) => Some(err),
            AppError::Export(err) => Some(err),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = match self {
            AppError::Upload(_) | AppError::Scoring(_) | AppError::Classifier(_) => {
                StatusCode::UNPROCESSABLE_ENTITY
            }
            AppError::ModelUnavailable => StatusCode::SERVICE_UNAVAILABLE,
            AppError::Repository(RepositoryError::NotFound) => StatusCode::NOT_FOUND,
            AppError::Repository(RepositoryError::Conflict) => StatusCode::CONFLICT,
            AppError::Repository(RepositoryError::Unavailable(_)) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
            AppError::Config(_)
            | AppError::Telemetry(_)
            | AppError::Io(_)
            | AppError::Policy(_)
            | AppError::Serialization(_)
            | AppError::Export(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };

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

impl From<PolicyError> for AppError {
    fn from(value: PolicyError) -> Self {
        Self::Policy(value)
    }
}

impl From<UploadError> for AppError {
    fn from(value: UploadError) -> Self {
        Self::Upload(value)
    }
}

impl From<InvalidInputError> for AppError {
    fn from(value: InvalidInputError) -> Self {
        Self::Scoring(value)
    }
}

impl From<ClassifierError> for AppError {
    fn from(value: ClassifierError) -> Self {
        Self::Classifier(value)
    }
}

impl From<RepositoryError> for AppError {
    fn from(value: RepositoryError) -> Self {
        Self::Repository(value)
    }
}

impl From<AssessmentServiceError> for AppError {
    fn from(value: AssessmentServiceError) -> Self {
        match value {
            AssessmentServiceError::Upload(err) => Self::Upload(err),
            AssessmentServiceError::Scoring(err) => Self::Scoring(err),
            AssessmentServiceError::Repository(err) => Self::Repository(err),
        }
    }
}

impl From<serde_json::Error> for AppError {
    fn from(value: serde_json::Error) -> Self {
        Self::Serialization(value)
    }
}

impl From<csv::Error> for AppError {
    fn from(value: csv::Error) -> Self {
        Self::Export(value)
    }
}
