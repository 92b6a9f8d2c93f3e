use crate::config::ConfigError;
use crate::telemetry::TelemetryError;
use crate::workflows::grants::{GrantServiceError, ModelError, SignalImportError};
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
    Signals(SignalImportError),
    Grants(GrantServiceError),
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppError::Config(err) => write!(f, "configuration error: {}", err),
            AppError::Telemetry(err) => write!(f, "telemetry error: {}", err),
            AppError::Io(err) => write!(f, "io error: {}", err),
            AppError::Server(err) => write!(f, "server error: {}", err),
            AppError::Signals(err) => write!(f, "signal table error: {}", err),
            AppError::Grants(err) => write!(f, "grant scoring error: {}", err),
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
            AppError::Signals(err) => Some(err),
            AppError::Grants(err) => Some(err),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = match &self {
            AppError::Grants(GrantServiceError::Scoring(_))
            | AppError::Grants(GrantServiceError::Upstream(ModelError::MissingSignal { .. })) => {
                StatusCode::UNPROCESSABLE_ENTITY
            }
            AppError::Grants(GrantServiceError::Upstream(ModelError::NotLoaded)) => {
                StatusCode::SERVICE_UNAVAILABLE
            }
            AppError::Grants(GrantServiceError::Upstream(ModelError::Backend(_)))
            | AppError::Config(_)
            | AppError::Telemetry(_)
            | AppError::Io(_)
            | AppError::Server(_)
            | AppError::Signals(_) => StatusCode::INTERNAL_SERVER_ERROR,
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

impl From<axum::Error> for AppError {
    fn from(value: axum::Error) -> Self {
        Self::Server(value)
    }
}

impl From<SignalImportError> for AppError {
    fn from(value: SignalImportError) -> Self {
        Self::Signals(value)
    }
}

impl From<GrantServiceError> for AppError {
    fn from(value: GrantServiceError) -> Self {
        Self::Grants(value)
    }
}
