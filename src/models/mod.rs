pub mod coordinates;
pub mod metrics;
pub mod route;
pub mod waypoint;
pub mod weather;

pub use coordinates::Coordinates;
pub use metrics::RouteMetrics;
pub use route::{RouteId, SaveRouteRequest, SavedRoute, ShareLink, SharedRouteView, UserId};
pub use waypoint::Waypoint;
pub use weather::CurrentWeather;
