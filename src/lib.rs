// Library exports for the CLI and integration tests

pub mod config;
pub mod constants;
pub mod error;
pub mod models;
pub mod planner;
pub mod services;

// Re-export commonly used types
pub use error::{AppError, Result, Severity, UserNotice};
pub use planner::{ResolveOutcome, RoutePlanner};
