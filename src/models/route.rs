use crate::constants::{
    MAX_ROUTE_DESCRIPTION_CHARS, MAX_ROUTE_NAME_CHARS, MAX_WAYPOINTS, MIN_ROUTE_WAYPOINTS,
    SHARED_ROUTE_PATH,
};
use crate::models::{Coordinates, RouteMetrics};
use serde::{Deserialize, Serialize};
use time::PrimitiveDateTime;

pub type RouteId = i64;
pub type UserId = i64;

// The backend emits local date-times without offset, with 0 to 9 fractional digits.
time::serde::format_description!(
    local_datetime,
    PrimitiveDateTime,
    "[year]-[month]-[day]T[hour]:[minute]:[second][optional [.[subsecond]]]"
);

/// A persisted, named route owned by a user.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SavedRoute {
    pub id: RouteId,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Saved in visiting order
    pub waypoints: Vec<Coordinates>,
    pub distance_km: f64,
    pub duration_minutes: u32,
    pub start_location: String,
    pub end_location: String,
    pub owner_id: UserId,
    pub owner_name: String,
    #[serde(with = "local_datetime")]
    pub created_at: PrimitiveDateTime,
    pub is_public: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub share_token: Option<String>,
    #[serde(default)]
    pub shared_with_user_ids: Vec<UserId>,
}

impl SavedRoute {
    pub fn is_shared(&self) -> bool {
        self.share_token.is_some()
    }

    /// Metrics as stored at save time. Loading a route recomputes them instead.
    pub fn stored_metrics(&self) -> RouteMetrics {
        RouteMetrics {
            distance_km: self.distance_km,
            duration_minutes: self.duration_minutes,
        }
    }

    pub fn shared_view(&self) -> SharedRouteView {
        SharedRouteView {
            name: self.name.clone(),
            description: self.description.clone(),
            owner_name: self.owner_name.clone(),
            start_location: self.start_location.clone(),
            end_location: self.end_location.clone(),
            distance_km: self.distance_km,
            duration_minutes: self.duration_minutes,
            created_at: self.created_at,
        }
    }
}

/// Read-only public projection of a [`SavedRoute`], reachable by share token.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct SharedRouteView {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub owner_name: String,
    pub start_location: String,
    pub end_location: String,
    pub distance_km: f64,
    pub duration_minutes: u32,
    #[serde(with = "local_datetime")]
    pub created_at: PrimitiveDateTime,
}

/// Public link granting unauthenticated read access to one route
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct ShareLink {
    pub token: String,
    pub url: String,
}

impl ShareLink {
    pub fn new(public_base_url: &str, token: String) -> Self {
        let url = format!(
            "{}/{}/{}",
            public_base_url.trim_end_matches('/'),
            SHARED_ROUTE_PATH,
            urlencoding::encode(&token)
        );
        ShareLink { token, url }
    }
}

/// Validated payload for creating or re-saving a route.
#[derive(Debug, Clone, PartialEq)]
pub struct SaveRouteRequest {
    pub name: String,
    pub description: Option<String>,
    pub waypoints: Vec<Coordinates>,
    pub metrics: RouteMetrics,
    pub start_location: String,
    pub end_location: String,
    pub is_public: bool,
}

impl SaveRouteRequest {
    /// Trims the name/description and checks every save precondition.
    /// Location labels default to the formatted endpoint coordinates.
    pub fn new(
        name: &str,
        description: Option<&str>,
        waypoints: Vec<Coordinates>,
        metrics: Option<RouteMetrics>,
    ) -> Result<Self, String> {
        let name = name.trim().to_string();
        let description = description
            .map(str::trim)
            .filter(|d| !d.is_empty())
            .map(str::to_string);

        let metrics = metrics.ok_or("Create the route before saving it")?;

        let (first, last) = match (waypoints.first(), waypoints.last()) {
            (Some(first), Some(last)) => (*first, *last),
            _ => return Err(format!("A route needs at least {} points", MIN_ROUTE_WAYPOINTS)),
        };

        let request = SaveRouteRequest {
            name,
            description,
            start_location: first.to_string(),
            end_location: last.to_string(),
            waypoints,
            metrics,
            is_public: false,
        };
        request.validate()?;
        Ok(request)
    }

    pub fn with_locations(mut self, start: impl Into<String>, end: impl Into<String>) -> Self {
        self.start_location = start.into();
        self.end_location = end.into();
        self
    }

    pub fn validate(&self) -> Result<(), String> {
        if self.name.is_empty() {
            return Err("Route name is required".to_string());
        }
        if self.name.chars().count() > MAX_ROUTE_NAME_CHARS {
            return Err(format!(
                "Route name must be at most {} characters",
                MAX_ROUTE_NAME_CHARS
            ));
        }
        if let Some(ref description) = self.description {
            if description.chars().count() > MAX_ROUTE_DESCRIPTION_CHARS {
                return Err(format!(
                    "Route description must be at most {} characters",
                    MAX_ROUTE_DESCRIPTION_CHARS
                ));
            }
        }
        if self.waypoints.len() < MIN_ROUTE_WAYPOINTS {
            return Err(format!(
                "A route needs at least {} points",
                MIN_ROUTE_WAYPOINTS
            ));
        }
        if self.waypoints.len() > MAX_WAYPOINTS {
            return Err(format!("A route can have at most {} points", MAX_WAYPOINTS));
        }
        if self.start_location.trim().is_empty() || self.end_location.trim().is_empty() {
            return Err("Start and end locations are required".to_string());
        }
        Ok(())
    }
}

// Wire types of the backend route API

/// Every backend response is wrapped in this envelope.
#[derive(Debug, Deserialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    #[serde(default)]
    pub message: Option<String>,
    pub data: Option<T>,
}

/// The waypoint payload stored in the backend's opaque `routeData` text column.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct RouteData {
    pub waypoints: Vec<Coordinates>,
    pub distance_km: f64,
    pub duration_minutes: u32,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SaveRouteBody {
    pub name: String,
    pub description: Option<String>,
    /// JSON-encoded [`RouteData`]
    pub route_data: String,
    pub start_location: String,
    pub end_location: String,
    pub distance_km: f64,
    pub duration_minutes: u32,
    pub is_public: bool,
}

impl SaveRouteBody {
    pub fn from_request(request: &SaveRouteRequest) -> serde_json::Result<Self> {
        let route_data = serde_json::to_string(&RouteData {
            waypoints: request.waypoints.clone(),
            distance_km: request.metrics.distance_km,
            duration_minutes: request.metrics.duration_minutes,
        })?;

        Ok(SaveRouteBody {
            name: request.name.clone(),
            description: request.description.clone(),
            route_data,
            start_location: request.start_location.clone(),
            end_location: request.end_location.clone(),
            distance_km: request.metrics.distance_km,
            duration_minutes: request.metrics.duration_minutes,
            is_public: request.is_public,
        })
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ShareWithFriendsBody {
    pub friend_ids: Vec<UserId>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RouteDto {
    pub id: RouteId,
    pub name: String,
    pub description: Option<String>,
    pub route_data: String,
    pub start_location: String,
    pub end_location: String,
    pub distance_km: Option<f64>,
    pub duration_minutes: Option<u32>,
    #[serde(with = "local_datetime")]
    pub created_at: PrimitiveDateTime,
    #[serde(default)]
    pub is_public: Option<bool>,
    pub user_id: UserId,
    #[serde(default)]
    pub user_name: Option<String>,
    #[serde(default)]
    pub share_token: Option<String>,
    #[serde(default)]
    pub shared_with_user_ids: Option<Vec<UserId>>,
}

impl TryFrom<RouteDto> for SavedRoute {
    type Error = String;

    fn try_from(dto: RouteDto) -> Result<Self, Self::Error> {
        let data: RouteData = serde_json::from_str(&dto.route_data)
            .map_err(|e| format!("Malformed routeData for route {}: {}", dto.id, e))?;

        Ok(SavedRoute {
            id: dto.id,
            name: dto.name,
            description: dto.description.filter(|d| !d.is_empty()),
            waypoints: data.waypoints,
            distance_km: dto.distance_km.unwrap_or(data.distance_km),
            duration_minutes: dto.duration_minutes.unwrap_or(data.duration_minutes),
            start_location: dto.start_location,
            end_location: dto.end_location,
            owner_id: dto.user_id,
            owner_name: dto.user_name.unwrap_or_default(),
            created_at: dto.created_at,
            is_public: dto.is_public.unwrap_or(false),
            share_token: dto.share_token.filter(|t| !t.is_empty()),
            shared_with_user_ids: dto.shared_with_user_ids.unwrap_or_default(),
        })
    }
}
