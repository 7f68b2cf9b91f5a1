use serde::Serialize;
use thiserror::Error;

use crate::constants::MAX_WAYPOINTS;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum AppError {
    #[error("Waypoint limit reached: at most {} points per route", MAX_WAYPOINTS)]
    CapacityExceeded,

    #[error("No waypoints to remove")]
    EmptyCollection,

    #[error("At least 2 waypoints are required to build a route")]
    InsufficientWaypoints,

    #[error("No route found between the selected points")]
    RouteNotFound,

    #[error("Directions provider quota exceeded")]
    ProviderQuotaExceeded,

    #[error("Directions provider denied the request")]
    ProviderRequestDenied,

    #[error("Directions provider error: {0}")]
    ProviderTransport(String),

    #[error("Invalid coordinates: {0}")]
    InvalidCoordinates(String),

    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Transport error{}: {message}", status_suffix(.status))]
    Transport { status: Option<u16>, message: String },

    #[error("Configuration error: {0}")]
    Config(String),
}

fn status_suffix(status: &Option<u16>) -> String {
    status.map(|s| format!(" (HTTP {s})")).unwrap_or_default()
}

impl AppError {
    pub fn transport(status: Option<u16>, message: impl Into<String>) -> Self {
        AppError::Transport {
            status,
            message: message.into(),
        }
    }

    /// Provider failures that mean the service itself is unavailable, as
    /// opposed to the points having no drivable connection.
    pub fn is_provider_unavailable(&self) -> bool {
        matches!(
            self,
            AppError::ProviderQuotaExceeded
                | AppError::ProviderRequestDenied
                | AppError::ProviderTransport(_)
        )
    }

    /// Convert the error into the notice shown to the user. Nothing in this
    /// crate is fatal, so every variant maps to a notice.
    pub fn notice(&self) -> UserNotice {
        let (severity, message) = match self {
            AppError::CapacityExceeded => (
                Severity::Warning,
                format!("You can add at most {MAX_WAYPOINTS} points."),
            ),
            AppError::EmptyCollection => (Severity::Info, "There are no points to remove.".into()),
            AppError::InsufficientWaypoints => (
                Severity::Warning,
                "Add at least 2 points to create a route.".into(),
            ),
            AppError::RouteNotFound => (
                Severity::Warning,
                "No route exists between these points.".into(),
            ),
            AppError::ProviderQuotaExceeded => (
                Severity::Error,
                "The directions service is unavailable: request limit exceeded.".into(),
            ),
            AppError::ProviderRequestDenied => (
                Severity::Error,
                "The directions service is unavailable: request denied, check the API settings."
                    .into(),
            ),
            AppError::ProviderTransport(e) => {
                tracing::warn!("Directions provider failure: {}", e);
                (
                    Severity::Error,
                    "The directions service is unavailable. Please try again.".into(),
                )
            }
            AppError::InvalidCoordinates(e) | AppError::Validation(e) => {
                (Severity::Warning, e.clone())
            }
            AppError::NotFound(e) => (Severity::Error, e.clone()),
            AppError::Conflict(e) => (Severity::Error, e.clone()),
            AppError::Unauthorized(_) => (
                Severity::Error,
                "Your session has expired. Please sign in again.".into(),
            ),
            AppError::Transport { status, message } => {
                tracing::warn!(status = ?status, "Transport error: {}", message);
                let text = match status {
                    Some(code) => format!("Server error ({code}): {message}"),
                    None => format!("Network error: {message}"),
                };
                (Severity::Error, text)
            }
            AppError::Config(e) => {
                tracing::error!("Configuration error: {}", e);
                (Severity::Error, format!("Configuration error: {e}"))
            }
        };

        UserNotice { severity, message }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Info,
    Warning,
    Error,
}

/// A non-fatal, user-facing message produced from an [`AppError`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UserNotice {
    pub severity: Severity,
    pub message: String,
}

pub type Result<T> = std::result::Result<T, AppError>;
