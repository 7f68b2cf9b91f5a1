//! Interactive route building: the waypoint collector, the resolver that
//! turns it into a drivable route, and the events that keep a map in sync.

pub mod collector;
pub mod events;
pub mod surface;

pub use collector::{PlannerSnapshot, PlannerState, WaypointCollector};
pub use events::PlannerEvent;
pub use surface::{MapSurface, SurfaceAdapter};

use crate::constants::PLANNER_EVENT_CAPACITY;
use crate::error::Result;
use crate::models::{Coordinates, RouteMetrics, Waypoint};
use crate::services::resolver::{ResolvedRoute, RouteResolver};
use std::sync::{Mutex, MutexGuard};
use tokio::sync::broadcast;

/// What happened to a resolve once the provider answered.
#[derive(Debug, Clone, PartialEq)]
pub enum ResolveOutcome {
    /// The route now backs the planner's overlay and metrics.
    Applied(ResolvedRoute),
    /// The waypoints changed while the request was in flight, so the result
    /// (success or failure) was dropped.
    Discarded,
}

impl ResolveOutcome {
    pub fn metrics(&self) -> Option<RouteMetrics> {
        match self {
            ResolveOutcome::Applied(route) => Some(route.metrics),
            ResolveOutcome::Discarded => None,
        }
    }
}

/// One route-building session: a [`WaypointCollector`] plus the resolver
/// that owns its single overlay.
///
/// Mutations may run while a resolve is in flight. The collector lock is only
/// held for the synchronous part of each call, never across the provider
/// request; the revision counter decides whether the answer still applies.
pub struct RoutePlanner {
    collector: Mutex<WaypointCollector>,
    resolver: RouteResolver,
    events: broadcast::Sender<PlannerEvent>,
}

impl RoutePlanner {
    pub fn new(resolver: RouteResolver) -> Self {
        let (events, _) = broadcast::channel(PLANNER_EVENT_CAPACITY);
        RoutePlanner {
            collector: Mutex::new(WaypointCollector::new()),
            resolver,
            events,
        }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<PlannerEvent> {
        self.events.subscribe()
    }

    pub fn add_point(&self, coordinates: Coordinates) -> Result<Waypoint> {
        let result = self.mutate(|c| c.add_point(coordinates));
        match &result {
            Ok(waypoint) => tracing::debug!(
                index = waypoint.sequence_index,
                "Added waypoint {} at {}",
                waypoint.label(),
                waypoint.coordinates
            ),
            Err(e) => tracing::debug!("Waypoint rejected: {}", e),
        }
        result
    }

    pub fn remove_last(&self) -> Result<Waypoint> {
        self.mutate(|c| c.remove_last())
    }

    pub fn clear(&self) {
        self.mutate(|c| c.clear())
    }

    pub fn replace_all(&self, points: Vec<Coordinates>) -> Result<()> {
        self.mutate(|c| c.replace_all(points))
    }

    /// Resolve the current waypoints into a route.
    ///
    /// Errors leave the collector, overlay and metrics exactly as they were.
    /// A result that arrives after the waypoints changed is reported as
    /// [`ResolveOutcome::Discarded`] and has no effect.
    pub async fn resolve(&self) -> Result<ResolveOutcome> {
        let ticket = self.lock().begin_resolve()?;

        let result = self.resolver.resolve(&ticket.waypoints).await;

        let outcome = {
            let mut collector = self.lock();
            let outcome = match result {
                Ok(resolved) => {
                    if collector.apply_resolution(&ticket, &resolved) {
                        Ok(ResolveOutcome::Applied(resolved))
                    } else {
                        Ok(ResolveOutcome::Discarded)
                    }
                }
                Err(_) if collector.revision() != ticket.revision => Ok(ResolveOutcome::Discarded),
                Err(e) => Err(e),
            };
            self.publish(&mut collector);
            outcome
        };

        match &outcome {
            Ok(ResolveOutcome::Discarded) => tracing::debug!(
                revision = ticket.revision,
                "Discarded resolve for stale revision {}",
                ticket.revision
            ),
            Err(e) => tracing::warn!(
                waypoints = ticket.waypoints.len(),
                "Route resolve failed: {}",
                e
            ),
            Ok(ResolveOutcome::Applied(_)) => {}
        }
        outcome
    }

    pub fn snapshot(&self) -> PlannerSnapshot {
        self.lock().snapshot()
    }

    pub fn waypoints(&self) -> Vec<Waypoint> {
        self.lock().waypoints().to_vec()
    }

    pub fn coordinates(&self) -> Vec<Coordinates> {
        self.lock().coordinates()
    }

    pub fn metrics(&self) -> Option<RouteMetrics> {
        self.lock().metrics()
    }

    pub fn state(&self) -> PlannerState {
        self.lock().state()
    }

    fn lock(&self) -> MutexGuard<'_, WaypointCollector> {
        self.collector.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn mutate<T>(&self, f: impl FnOnce(&mut WaypointCollector) -> T) -> T {
        let mut collector = self.lock();
        let result = f(&mut collector);
        self.publish(&mut collector);
        result
    }

    /// Send queued events while the collector is still locked, so the
    /// channel order always matches the revision order. `send` never blocks.
    fn publish(&self, collector: &mut WaypointCollector) {
        for event in collector.take_events() {
            // No subscribers is fine: the snapshot stays authoritative
            let _ = self.events.send(event);
        }
    }
}
