use crate::constants::{DEFAULT_REQUEST_TIMEOUT_SECS, MIN_ROUTE_WAYPOINTS};
use crate::error::{AppError, Result};
use crate::models::{Coordinates, RouteMetrics, Waypoint};
use crate::services::directions::{DirectionsProvider, DirectionsRequest};
use std::sync::Arc;
use std::time::Duration;

/// A drivable path through the collector's waypoints with its metrics.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedRoute {
    pub path: Vec<Coordinates>,
    pub metrics: RouteMetrics,
    /// Collector indices in the order the provider visits them. Origin is
    /// always first and destination always last.
    pub visit_order: Vec<usize>,
}

/// Turns ordered waypoints into a route by asking a [`DirectionsProvider`].
#[derive(Clone)]
pub struct RouteResolver {
    provider: Arc<dyn DirectionsProvider>,
    optimize_order: bool,
    timeout: Duration,
}

impl RouteResolver {
    pub fn new(provider: Arc<dyn DirectionsProvider>) -> Self {
        RouteResolver {
            provider,
            optimize_order: true,
            timeout: Duration::from_secs(DEFAULT_REQUEST_TIMEOUT_SECS),
        }
    }

    pub fn with_optimize_order(mut self, optimize_order: bool) -> Self {
        self.optimize_order = optimize_order;
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub async fn resolve(&self, waypoints: &[Waypoint]) -> Result<ResolvedRoute> {
        if waypoints.len() < MIN_ROUTE_WAYPOINTS {
            return Err(AppError::InsufficientWaypoints);
        }

        let points: Vec<Coordinates> = waypoints.iter().map(|w| w.coordinates).collect();
        let request = DirectionsRequest::from_points(&points, self.optimize_order)
            .ok_or(AppError::InsufficientWaypoints)?;

        let response = tokio::time::timeout(self.timeout, self.provider.directions(&request))
            .await
            .map_err(|_| {
                tracing::warn!(
                    provider = self.provider.provider_name(),
                    timeout_secs = self.timeout.as_secs(),
                    "Directions request timed out after {}s",
                    self.timeout.as_secs()
                );
                AppError::ProviderTransport(format!(
                    "No response within {}s",
                    self.timeout.as_secs()
                ))
            })??;

        if let Some(err) = response.status.into_error() {
            return Err(err);
        }

        let route = response
            .routes
            .into_iter()
            .next()
            .ok_or(AppError::RouteNotFound)?;

        let metrics = RouteMetrics::from_legs(
            route
                .legs
                .iter()
                .map(|leg| (leg.distance_meters, leg.duration_seconds)),
        );
        let visit_order = visit_order(points.len(), &route.waypoint_order);

        tracing::info!(
            provider = self.provider.provider_name(),
            waypoints = points.len(),
            distance_km = metrics.distance_km,
            duration_min = metrics.duration_minutes,
            "Route resolved: {} waypoints, {:.1}km, {}min",
            points.len(),
            metrics.distance_km,
            metrics.duration_minutes
        );

        Ok(ResolvedRoute {
            path: route.path,
            metrics,
            visit_order,
        })
    }
}

/// Expand the provider's intermediate-stop order into full collector indices.
/// Falls back to input order when the provider order is absent or malformed.
fn visit_order(point_count: usize, waypoint_order: &[usize]) -> Vec<usize> {
    let interior = point_count.saturating_sub(2);
    let mut seen = vec![false; interior];
    let valid = waypoint_order.len() == interior
        && waypoint_order
            .iter()
            .all(|&i| i < interior && !std::mem::replace(&mut seen[i], true));

    let mut order = Vec::with_capacity(point_count);
    order.push(0);
    if valid {
        order.extend(waypoint_order.iter().map(|i| i + 1));
    } else {
        order.extend(1..=interior);
    }
    order.push(point_count - 1);
    order
}
