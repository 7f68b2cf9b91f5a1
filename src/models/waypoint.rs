use crate::models::Coordinates;
use serde::{Deserialize, Serialize};

/// A point the user placed on the map. The sequence index is its position in
/// the collector; it is not part of the persisted form.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct Waypoint {
    pub coordinates: Coordinates,
    pub sequence_index: usize,
}

impl Waypoint {
    pub fn new(coordinates: Coordinates, sequence_index: usize) -> Self {
        Waypoint {
            coordinates,
            sequence_index,
        }
    }

    /// 1-based marker label
    pub fn label(&self) -> String {
        (self.sequence_index + 1).to_string()
    }
}

/// Re-index a list of coordinates into positional waypoints.
pub fn sequence(points: &[Coordinates]) -> Vec<Waypoint> {
    points
        .iter()
        .enumerate()
        .map(|(i, c)| Waypoint::new(*c, i))
        .collect()
}
