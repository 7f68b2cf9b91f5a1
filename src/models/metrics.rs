use serde::{Deserialize, Serialize};
use std::fmt;

/// Aggregate distance and duration of a resolved route.
/// Derived from provider legs, never authoritative.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct RouteMetrics {
    /// Rounded to one decimal place
    pub distance_km: f64,
    /// Rounded to the nearest minute
    pub duration_minutes: u32,
}

impl RouteMetrics {
    /// Build metrics from raw leg totals (meters, seconds)
    pub fn from_totals(distance_meters: f64, duration_seconds: f64) -> Self {
        RouteMetrics {
            distance_km: round_to_tenth(distance_meters / 1000.0),
            duration_minutes: (duration_seconds / 60.0).round().max(0.0) as u32,
        }
    }

    /// Sum (meters, seconds) leg pairs
    pub fn from_legs<I>(legs: I) -> Self
    where
        I: IntoIterator<Item = (f64, f64)>,
    {
        let (meters, seconds) = legs
            .into_iter()
            .fold((0.0, 0.0), |(m, s), (lm, ls)| (m + lm, s + ls));
        Self::from_totals(meters, seconds)
    }

    pub fn formatted_distance(&self) -> String {
        format!("{:.1} km", self.distance_km)
    }

    pub fn formatted_duration(&self) -> String {
        format_duration(self.duration_minutes)
    }
}

impl fmt::Display for RouteMetrics {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}, {}",
            self.formatted_distance(),
            self.formatted_duration()
        )
    }
}

fn round_to_tenth(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

/// `"1h 5m"` above an hour, `"45m"` below
pub fn format_duration(minutes: u32) -> String {
    let hours = minutes / 60;
    let mins = minutes % 60;
    if hours > 0 {
        format!("{}h {}m", hours, mins)
    } else {
        format!("{}m", mins)
    }
}
