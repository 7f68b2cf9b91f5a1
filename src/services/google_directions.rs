use crate::constants::DEFAULT_GOOGLE_DIRECTIONS_BASE_URL;
use crate::error::{AppError, Result};
use crate::models::Coordinates;
use crate::services::directions::{
    DirectionsProvider, DirectionsRequest, DirectionsResponse, DirectionsStatus, ProviderRoute,
    RouteLeg,
};
use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;

/// Google Directions web service client (driving mode).
#[derive(Clone)]
pub struct GoogleDirectionsClient {
    client: Client,
    api_key: String,
    base_url: String,
}

impl GoogleDirectionsClient {
    pub fn new(api_key: String, timeout: Duration) -> Result<Self> {
        Self::with_config(
            api_key,
            DEFAULT_GOOGLE_DIRECTIONS_BASE_URL.to_string(),
            timeout,
        )
    }

    pub fn with_config(api_key: String, base_url: String, timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| AppError::Config(format!("Failed to build HTTP client: {}", e)))?;

        Ok(GoogleDirectionsClient {
            client,
            api_key,
            base_url,
        })
    }

    fn query_params(&self, request: &DirectionsRequest) -> Vec<(&'static str, String)> {
        let mut params = vec![
            ("origin", request.origin.to_query_value()),
            ("destination", request.destination.to_query_value()),
            ("mode", "driving".to_string()),
        ];

        if !request.waypoints.is_empty() {
            let stops = request
                .waypoints
                .iter()
                .map(Coordinates::to_query_value)
                .collect::<Vec<_>>()
                .join("|");
            let value = if request.optimize_order {
                format!("optimize:true|{}", stops)
            } else {
                stops
            };
            params.push(("waypoints", value));
        }

        params.push(("key", self.api_key.clone()));
        params
    }
}

#[async_trait]
impl DirectionsProvider for GoogleDirectionsClient {
    async fn directions(&self, request: &DirectionsRequest) -> Result<DirectionsResponse> {
        tracing::debug!(
            stops = request.stop_count(),
            optimize = request.optimize_order,
            "Directions request: {} stops, optimize={}",
            request.stop_count(),
            request.optimize_order
        );

        let response = self
            .client
            .get(&self.base_url)
            .query(&self.query_params(request))
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    AppError::ProviderTransport("Request timed out".to_string())
                } else {
                    AppError::ProviderTransport(format!("Request failed: {}", e))
                }
            })?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            tracing::warn!(
                status = %status,
                stops = request.stop_count(),
                "Directions API HTTP error {}: {}",
                status, error_text
            );
            return Err(AppError::ProviderTransport(format!(
                "HTTP {}: {}",
                status, error_text
            )));
        }

        let body: GoogleDirectionsApiResponse = response
            .json()
            .await
            .map_err(|e| AppError::ProviderTransport(format!("Failed to parse response: {}", e)))?;

        if body.status != DirectionsStatus::Ok {
            tracing::warn!(
                status = ?body.status,
                stops = request.stop_count(),
                "Directions API returned {:?}: {}",
                body.status,
                body.error_message.as_deref().unwrap_or("no message")
            );
            return Ok(DirectionsResponse::with_status(body.status));
        }

        let routes = body
            .routes
            .into_iter()
            .map(GoogleRoute::into_provider_route)
            .collect::<std::result::Result<Vec<_>, String>>()
            .map_err(AppError::ProviderTransport)?;

        if let Some(route) = routes.first() {
            tracing::debug!(
                legs = route.legs.len(),
                path_points = route.path.len(),
                "Directions response: {} legs, {} path points",
                route.legs.len(),
                route.path.len()
            );
        }

        Ok(DirectionsResponse {
            status: body.status,
            routes,
        })
    }

    fn provider_name(&self) -> &'static str {
        "google"
    }
}

// Google Directions API response types

#[derive(Debug, Deserialize)]
struct GoogleDirectionsApiResponse {
    status: DirectionsStatus,
    #[serde(default)]
    routes: Vec<GoogleRoute>,
    #[serde(default)]
    error_message: Option<String>,
}

#[derive(Debug, Deserialize)]
struct GoogleRoute {
    legs: Vec<GoogleLeg>,
    overview_polyline: GooglePolyline,
    #[serde(default)]
    waypoint_order: Vec<usize>,
}

#[derive(Debug, Deserialize)]
struct GoogleLeg {
    distance: GoogleValue,
    duration: GoogleValue,
}

#[derive(Debug, Deserialize)]
struct GoogleValue {
    value: f64,
}

#[derive(Debug, Deserialize)]
struct GooglePolyline {
    points: String,
}

impl GoogleRoute {
    fn into_provider_route(self) -> std::result::Result<ProviderRoute, String> {
        Ok(ProviderRoute {
            legs: self
                .legs
                .iter()
                .map(|leg| RouteLeg {
                    distance_meters: leg.distance.value,
                    duration_seconds: leg.duration.value,
                })
                .collect(),
            path: decode_polyline(&self.overview_polyline.points)?,
            waypoint_order: self.waypoint_order,
        })
    }
}

/// Decode a Google encoded polyline (precision 1e5) into coordinates.
pub fn decode_polyline(encoded: &str) -> std::result::Result<Vec<Coordinates>, String> {
    let bytes = encoded.as_bytes();
    let mut index = 0;
    let mut lat: i64 = 0;
    let mut lng: i64 = 0;
    let mut path = Vec::new();

    while index < bytes.len() {
        lat += next_polyline_delta(bytes, &mut index)?;
        lng += next_polyline_delta(bytes, &mut index)?;
        path.push(Coordinates::new(lat as f64 / 1e5, lng as f64 / 1e5)?);
    }

    Ok(path)
}

fn next_polyline_delta(bytes: &[u8], index: &mut usize) -> std::result::Result<i64, String> {
    let mut result: i64 = 0;
    let mut shift = 0;

    loop {
        let byte = *bytes.get(*index).ok_or("Truncated polyline")?;
        *index += 1;

        if !(63..=126).contains(&byte) {
            return Err(format!("Invalid polyline character '{}'", byte as char));
        }
        if shift > 30 {
            return Err("Polyline value overflow".to_string());
        }

        let chunk = (byte - 63) as i64;
        result |= (chunk & 0x1f) << shift;
        shift += 5;

        if chunk < 0x20 {
            break;
        }
    }

    Ok(if result & 1 != 0 {
        !(result >> 1)
    } else {
        result >> 1
    })
}
