use super::collector::PlannerSnapshot;
use super::events::PlannerEvent;
use super::RoutePlanner;
use crate::models::{Coordinates, RouteMetrics};
use tokio::sync::broadcast::{self, error::RecvError, error::TryRecvError};

/// Rendering target for a planner: numbered markers and one path overlay.
pub trait MapSurface: Send {
    /// Place or move the marker for `index`. Labels are 1-based.
    fn place_marker(&mut self, index: usize, coordinates: Coordinates);

    fn remove_marker(&mut self, index: usize);

    fn draw_path(&mut self, path: &[Coordinates]);

    fn clear_path(&mut self);

    /// `None` hides the metrics panel.
    fn show_metrics(&mut self, metrics: Option<&RouteMetrics>);
}

/// Keeps a [`MapSurface`] in step with planner events.
///
/// The adapter tracks how many markers it placed and whether an overlay is
/// drawn, so a replacement never leaves a second overlay behind.
pub struct SurfaceAdapter<S: MapSurface> {
    surface: S,
    markers: usize,
    path_drawn: bool,
}

impl<S: MapSurface> SurfaceAdapter<S> {
    pub fn new(surface: S) -> Self {
        SurfaceAdapter {
            surface,
            markers: 0,
            path_drawn: false,
        }
    }

    pub fn surface(&self) -> &S {
        &self.surface
    }

    pub fn into_surface(self) -> S {
        self.surface
    }

    pub fn apply(&mut self, event: &PlannerEvent) {
        match event {
            PlannerEvent::PointAdded(waypoint) => {
                self.surface
                    .place_marker(waypoint.sequence_index, waypoint.coordinates);
                self.markers = self.markers.max(waypoint.sequence_index + 1);
            }
            PlannerEvent::PointRemoved(waypoint) => {
                if waypoint.sequence_index < self.markers {
                    self.surface.remove_marker(waypoint.sequence_index);
                    self.markers = waypoint.sequence_index;
                }
            }
            PlannerEvent::Cleared { .. } => {
                self.remove_all_markers();
                self.clear_path();
                self.surface.show_metrics(None);
            }
            PlannerEvent::PointsReplaced(waypoints) => {
                self.remove_all_markers();
                self.clear_path();
                self.surface.show_metrics(None);
                for waypoint in waypoints {
                    self.surface
                        .place_marker(waypoint.sequence_index, waypoint.coordinates);
                }
                self.markers = waypoints.len();
            }
            PlannerEvent::MetricsInvalidated => self.surface.show_metrics(None),
            PlannerEvent::OverlayReleased => self.clear_path(),
            PlannerEvent::RouteResolved { path, metrics } => {
                self.clear_path();
                self.surface.draw_path(path);
                self.path_drawn = true;
                self.surface.show_metrics(Some(metrics));
            }
        }
    }

    /// Redraw everything from a snapshot, discarding what the surface shows.
    pub fn resync(&mut self, snapshot: &PlannerSnapshot) {
        self.remove_all_markers();
        self.clear_path();

        for waypoint in &snapshot.waypoints {
            self.surface
                .place_marker(waypoint.sequence_index, waypoint.coordinates);
        }
        self.markers = snapshot.waypoints.len();

        if let Some(ref path) = snapshot.path {
            self.surface.draw_path(path);
            self.path_drawn = true;
        }
        self.surface.show_metrics(snapshot.metrics.as_ref());
    }

    /// Apply every event already queued on `events` without waiting.
    /// Returns the number of events applied.
    pub fn drain(
        &mut self,
        events: &mut broadcast::Receiver<PlannerEvent>,
        planner: &RoutePlanner,
    ) -> usize {
        let mut applied = 0;
        loop {
            match events.try_recv() {
                Ok(event) => {
                    self.apply(&event);
                    applied += 1;
                }
                Err(TryRecvError::Lagged(skipped)) => {
                    tracing::warn!(
                        skipped = skipped,
                        "Map surface fell behind by {} events, resyncing",
                        skipped
                    );
                    *events = events.resubscribe();
                    self.resync(&planner.snapshot());
                }
                Err(TryRecvError::Empty) | Err(TryRecvError::Closed) => break,
            }
        }
        applied
    }

    /// Follow the planner until its event channel closes.
    pub async fn run(
        mut self,
        mut events: broadcast::Receiver<PlannerEvent>,
        planner: &RoutePlanner,
    ) -> S {
        loop {
            match events.recv().await {
                Ok(event) => self.apply(&event),
                Err(RecvError::Lagged(skipped)) => {
                    tracing::warn!(
                        skipped = skipped,
                        "Map surface fell behind by {} events, resyncing",
                        skipped
                    );
                    events = events.resubscribe();
                    self.resync(&planner.snapshot());
                }
                Err(RecvError::Closed) => break,
            }
        }
        self.surface
    }

    fn remove_all_markers(&mut self) {
        for index in (0..self.markers).rev() {
            self.surface.remove_marker(index);
        }
        self.markers = 0;
    }

    fn clear_path(&mut self) {
        if self.path_drawn {
            self.surface.clear_path();
            self.path_drawn = false;
        }
    }
}
