use crate::models::{Coordinates, RouteMetrics, Waypoint};

/// State changes published by a [`RoutePlanner`](super::RoutePlanner).
///
/// Events are emitted in the order the mutations happened. A subscriber that
/// applies them in order reproduces the planner's markers and overlay.
#[derive(Debug, Clone, PartialEq)]
pub enum PlannerEvent {
    PointAdded(Waypoint),
    PointRemoved(Waypoint),
    /// Every marker and the overlay are gone.
    Cleared { released_markers: usize },
    /// Bulk swap of the whole waypoint list. Previous markers, overlay and
    /// metrics are dropped.
    PointsReplaced(Vec<Waypoint>),
    MetricsInvalidated,
    OverlayReleased,
    /// A resolve result was applied; it replaces any previous overlay.
    RouteResolved {
        path: Vec<Coordinates>,
        metrics: RouteMetrics,
    },
}
