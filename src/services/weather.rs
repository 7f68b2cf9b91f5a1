use crate::constants::DEFAULT_OPENWEATHER_BASE_URL;
use crate::error::{AppError, Result};
use crate::models::weather::OpenWeatherResponse;
use crate::models::{Coordinates, CurrentWeather};
use reqwest::{Client, StatusCode};
use std::time::Duration;

/// Current-weather lookups against an OpenWeather-compatible endpoint.
#[derive(Clone)]
pub struct WeatherClient {
    client: Client,
    api_key: String,
    base_url: String,
}

impl WeatherClient {
    pub fn new(api_key: String, timeout: Duration) -> Result<Self> {
        Self::with_config(api_key, DEFAULT_OPENWEATHER_BASE_URL.to_string(), timeout)
    }

    pub fn with_config(api_key: String, base_url: String, timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| AppError::Config(format!("Failed to build HTTP client: {}", e)))?;

        Ok(WeatherClient {
            client,
            api_key,
            base_url,
        })
    }

    pub async fn current_by_coordinates(&self, coords: &Coordinates) -> Result<CurrentWeather> {
        self.fetch(
            vec![("lat", coords.lat.to_string()), ("lon", coords.lng.to_string())],
            &coords.to_string(),
        )
        .await
    }

    pub async fn current_by_city(&self, city: &str) -> Result<CurrentWeather> {
        let city = city.trim();
        if city.is_empty() {
            return Err(AppError::Validation("City name is required".to_string()));
        }
        self.fetch(vec![("q", city.to_string())], city).await
    }

    async fn fetch(
        &self,
        mut params: Vec<(&'static str, String)>,
        location: &str,
    ) -> Result<CurrentWeather> {
        params.push(("appid", self.api_key.clone()));
        params.push(("units", "metric".to_string()));

        let response = self
            .client
            .get(&self.base_url)
            .query(&params)
            .send()
            .await
            .map_err(|e| {
                let message = if e.is_timeout() {
                    "Request timed out".to_string()
                } else {
                    format!("Request failed: {}", e)
                };
                AppError::transport(None, message)
            })?;

        let status = response.status();
        if status == StatusCode::NOT_FOUND {
            tracing::debug!(location = location, "Weather location not found: {}", location);
            return Err(AppError::NotFound(format!("Location '{}' not found", location)));
        }
        if !status.is_success() {
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            tracing::warn!(
                status = %status,
                "Weather API HTTP error {}: {}",
                status, error_text
            );
            return Err(AppError::transport(Some(status.as_u16()), error_text));
        }

        let body: OpenWeatherResponse = response.json().await.map_err(|e| {
            AppError::transport(
                Some(status.as_u16()),
                format!("Failed to parse response: {}", e),
            )
        })?;

        let weather = CurrentWeather::from(body);
        tracing::debug!(
            location = location,
            temperature_c = weather.temperature_c,
            "Weather for {}: {:.1}°C, {}",
            location,
            weather.temperature_c,
            weather.conditions
        );
        Ok(weather)
    }
}
