//! Stable application-wide constants.
//!
//! Structural limits of the route builder and default fallbacks for
//! env-var-based configuration. See [`Config`](crate::config::Config) for the
//! values that can be overridden at runtime.

// --- Route builder limits ---

/// Maximum number of waypoints a single route may hold.
pub const MAX_WAYPOINTS: usize = 10;
/// Minimum number of waypoints needed before a route can be resolved or saved.
pub const MIN_ROUTE_WAYPOINTS: usize = 2;

// --- Saved route field limits (mirrors the backend column sizes) ---

/// Maximum route name length, in characters.
pub const MAX_ROUTE_NAME_CHARS: usize = 200;
/// Maximum route description length, in characters.
pub const MAX_ROUTE_DESCRIPTION_CHARS: usize = 1000;

// --- External service defaults (used when env vars are absent) ---

/// Google Directions web service endpoint. Overridden by `GOOGLE_DIRECTIONS_BASE_URL`.
pub const DEFAULT_GOOGLE_DIRECTIONS_BASE_URL: &str =
    "https://maps.googleapis.com/maps/api/directions/json";
/// Current-weather endpoint. Overridden by `OPENWEATHER_BASE_URL`.
pub const DEFAULT_OPENWEATHER_BASE_URL: &str = "https://api.openweathermap.org/data/2.5/weather";
/// Public web origin used to build share links. Overridden by `TRAVELSHARE_PUBLIC_BASE_URL`.
pub const DEFAULT_PUBLIC_BASE_URL: &str = "https://shareway.com.tr";
/// Path segment of the public shared-route page.
pub const SHARED_ROUTE_PATH: &str = "shared-route";

/// Bounded timeout for every provider and backend call. Overridden by
/// `REQUEST_TIMEOUT_SECS` (validated 1..=120).
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 15;

/// Capacity of the planner event channel. Slow subscribers that fall further
/// behind than this observe a lag and must resync from a snapshot.
pub const PLANNER_EVENT_CAPACITY: usize = 64;
