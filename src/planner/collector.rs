use super::events::PlannerEvent;
use crate::constants::{MAX_WAYPOINTS, MIN_ROUTE_WAYPOINTS};
use crate::error::{AppError, Result};
use crate::models::{waypoint, Coordinates, RouteMetrics, Waypoint};
use crate::services::resolver::ResolvedRoute;
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum PlannerState {
    /// No waypoints
    Empty,
    /// One waypoint, nothing to resolve yet
    Building,
    /// Enough waypoints to resolve, but no current metrics
    Resolvable,
    /// Metrics match the current waypoints
    Resolved,
}

/// Point-in-time copy of the planner, used to render from scratch.
#[derive(Debug, Clone, PartialEq)]
pub struct PlannerSnapshot {
    pub waypoints: Vec<Waypoint>,
    pub metrics: Option<RouteMetrics>,
    pub path: Option<Vec<Coordinates>>,
    pub visit_order: Option<Vec<usize>>,
    pub state: PlannerState,
    pub revision: u64,
}

/// The waypoints a resolve was started with, tagged with the revision they
/// were read at.
#[derive(Debug, Clone)]
pub struct ResolveTicket {
    pub revision: u64,
    pub waypoints: Vec<Waypoint>,
}

/// Ordered, bounded list of waypoints plus the route derived from them.
///
/// Invariants:
/// - at most [`MAX_WAYPOINTS`] waypoints, each `sequence_index` equal to its position
/// - `metrics` is only present while it describes the current waypoints
/// - an overlay only exists while there are at least two waypoints
///
/// Every waypoint mutation bumps `revision`. Mutations queue events which the
/// owner drains with [`take_events`](Self::take_events).
#[derive(Debug, Default)]
pub struct WaypointCollector {
    waypoints: Vec<Waypoint>,
    metrics: Option<RouteMetrics>,
    path: Option<Vec<Coordinates>>,
    visit_order: Option<Vec<usize>>,
    revision: u64,
    pending: Vec<PlannerEvent>,
}

impl WaypointCollector {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_point(&mut self, coordinates: Coordinates) -> Result<Waypoint> {
        if self.waypoints.len() >= MAX_WAYPOINTS {
            return Err(AppError::CapacityExceeded);
        }

        let waypoint = Waypoint::new(coordinates, self.waypoints.len());
        self.waypoints.push(waypoint);
        self.revision += 1;
        self.pending.push(PlannerEvent::PointAdded(waypoint));
        self.invalidate_metrics();
        Ok(waypoint)
    }

    pub fn remove_last(&mut self) -> Result<Waypoint> {
        let waypoint = self.waypoints.pop().ok_or(AppError::EmptyCollection)?;
        self.revision += 1;
        self.pending.push(PlannerEvent::PointRemoved(waypoint));
        self.invalidate_metrics();
        if self.waypoints.len() < MIN_ROUTE_WAYPOINTS {
            self.release_overlay();
        }
        Ok(waypoint)
    }

    /// Drop all waypoints, markers, metrics and the overlay. Clearing an empty
    /// collector is a no-op.
    pub fn clear(&mut self) {
        if self.waypoints.is_empty() && self.path.is_none() && self.metrics.is_none() {
            return;
        }

        let released_markers = self.waypoints.len();
        self.waypoints.clear();
        self.metrics = None;
        self.path = None;
        self.visit_order = None;
        self.revision += 1;
        self.pending.push(PlannerEvent::Cleared { released_markers });
    }

    /// Swap in a whole new list at once, as when loading a saved route.
    /// Queues exactly one event; on error nothing changes.
    pub fn replace_all(&mut self, points: Vec<Coordinates>) -> Result<()> {
        if points.len() > MAX_WAYPOINTS {
            return Err(AppError::CapacityExceeded);
        }

        self.waypoints = waypoint::sequence(&points);
        self.metrics = None;
        self.path = None;
        self.visit_order = None;
        self.revision += 1;
        self.pending
            .push(PlannerEvent::PointsReplaced(self.waypoints.clone()));
        Ok(())
    }

    pub fn begin_resolve(&self) -> Result<ResolveTicket> {
        if self.waypoints.len() < MIN_ROUTE_WAYPOINTS {
            return Err(AppError::InsufficientWaypoints);
        }
        Ok(ResolveTicket {
            revision: self.revision,
            waypoints: self.waypoints.clone(),
        })
    }

    /// Apply a resolve result if the waypoints have not changed since the
    /// ticket was issued. Returns `false` when the result is stale.
    pub fn apply_resolution(&mut self, ticket: &ResolveTicket, resolved: &ResolvedRoute) -> bool {
        if ticket.revision != self.revision {
            return false;
        }

        self.metrics = Some(resolved.metrics);
        self.path = Some(resolved.path.clone());
        self.visit_order = Some(resolved.visit_order.clone());
        self.pending.push(PlannerEvent::RouteResolved {
            path: resolved.path.clone(),
            metrics: resolved.metrics,
        });
        true
    }

    pub fn state(&self) -> PlannerState {
        match (self.waypoints.len(), self.metrics) {
            (0, _) => PlannerState::Empty,
            (n, _) if n < MIN_ROUTE_WAYPOINTS => PlannerState::Building,
            (_, None) => PlannerState::Resolvable,
            (_, Some(_)) => PlannerState::Resolved,
        }
    }

    pub fn waypoints(&self) -> &[Waypoint] {
        &self.waypoints
    }

    pub fn coordinates(&self) -> Vec<Coordinates> {
        self.waypoints.iter().map(|w| w.coordinates).collect()
    }

    pub fn metrics(&self) -> Option<RouteMetrics> {
        self.metrics
    }

    pub fn path(&self) -> Option<&[Coordinates]> {
        self.path.as_deref()
    }

    pub fn revision(&self) -> u64 {
        self.revision
    }

    pub fn len(&self) -> usize {
        self.waypoints.len()
    }

    pub fn is_empty(&self) -> bool {
        self.waypoints.is_empty()
    }

    pub fn snapshot(&self) -> PlannerSnapshot {
        PlannerSnapshot {
            waypoints: self.waypoints.clone(),
            metrics: self.metrics,
            path: self.path.clone(),
            visit_order: self.visit_order.clone(),
            state: self.state(),
            revision: self.revision,
        }
    }

    pub fn take_events(&mut self) -> Vec<PlannerEvent> {
        std::mem::take(&mut self.pending)
    }

    fn invalidate_metrics(&mut self) {
        if self.metrics.take().is_some() {
            self.visit_order = None;
            self.pending.push(PlannerEvent::MetricsInvalidated);
        }
    }

    fn release_overlay(&mut self) {
        if self.path.take().is_some() {
            self.visit_order = None;
            self.pending.push(PlannerEvent::OverlayReleased);
        }
    }
}
