use crate::error::{AppError, Result};
use crate::models::Coordinates;
use async_trait::async_trait;
use serde::Deserialize;

/// Request for a driving route through an ordered list of stops.
#[derive(Debug, Clone, PartialEq)]
pub struct DirectionsRequest {
    pub origin: Coordinates,
    pub destination: Coordinates,
    /// Intermediate stops, in the order the user placed them
    pub waypoints: Vec<Coordinates>,
    /// Let the provider reorder intermediate stops. Origin and destination stay fixed.
    pub optimize_order: bool,
}

impl DirectionsRequest {
    /// First point is the origin, last the destination. `None` below 2 points.
    pub fn from_points(points: &[Coordinates], optimize_order: bool) -> Option<Self> {
        match points {
            [origin, interior @ .., destination] => Some(DirectionsRequest {
                origin: *origin,
                destination: *destination,
                waypoints: interior.to_vec(),
                optimize_order,
            }),
            _ => None,
        }
    }

    pub fn stop_count(&self) -> usize {
        self.waypoints.len() + 2
    }
}

/// Provider-level outcome of a directions request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DirectionsStatus {
    Ok,
    ZeroResults,
    #[serde(alias = "OVER_DAILY_LIMIT")]
    OverQueryLimit,
    RequestDenied,
    #[serde(other)]
    UnknownError,
}

impl DirectionsStatus {
    /// The error a non-OK status maps to
    pub fn into_error(self) -> Option<AppError> {
        match self {
            DirectionsStatus::Ok => None,
            DirectionsStatus::ZeroResults => Some(AppError::RouteNotFound),
            DirectionsStatus::OverQueryLimit => Some(AppError::ProviderQuotaExceeded),
            DirectionsStatus::RequestDenied => Some(AppError::ProviderRequestDenied),
            DirectionsStatus::UnknownError => Some(AppError::ProviderTransport(
                "provider reported an unknown error".to_string(),
            )),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RouteLeg {
    pub distance_meters: f64,
    pub duration_seconds: f64,
}

/// One candidate route returned by the provider.
#[derive(Debug, Clone, PartialEq)]
pub struct ProviderRoute {
    pub legs: Vec<RouteLeg>,
    /// Renderable path
    pub path: Vec<Coordinates>,
    /// Visiting order of the intermediate stops, as indices into
    /// [`DirectionsRequest::waypoints`]. Empty when the provider did not reorder.
    pub waypoint_order: Vec<usize>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct DirectionsResponse {
    pub status: DirectionsStatus,
    pub routes: Vec<ProviderRoute>,
}

impl DirectionsResponse {
    pub fn with_status(status: DirectionsStatus) -> Self {
        DirectionsResponse {
            status,
            routes: Vec::new(),
        }
    }
}

/// External service able to compute a driving route through ordered stops.
///
/// Implementations report provider-side outcomes through
/// [`DirectionsResponse::status`] and return `Err` only when no status could be
/// obtained (network failure, unparseable body).
#[async_trait]
pub trait DirectionsProvider: Send + Sync {
    async fn directions(&self, request: &DirectionsRequest) -> Result<DirectionsResponse>;

    fn provider_name(&self) -> &'static str;
}
