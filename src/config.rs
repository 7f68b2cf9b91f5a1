use crate::constants::*;
use std::env;
use std::time::Duration;

#[derive(Debug, Clone)]
pub struct Config {
    /// Base URL of the TravelShare REST API, e.g. `https://api.example.com/api`
    pub api_base_url: String,
    /// Web origin that share links point at
    pub public_base_url: String,
    pub google_maps_api_key: String,
    pub google_directions_base_url: String,
    pub openweather_api_key: Option<String>,
    pub openweather_base_url: String,
    pub request_timeout_secs: u64,
    /// Ask the directions provider to reorder intermediate stops
    pub optimize_waypoints: bool,
    /// Bearer token for the backend, only used by the CLI
    pub auth_token: Option<String>,
}

impl Config {
    pub fn from_env() -> Result<Self, String> {
        dotenv::dotenv().ok();

        let request_timeout_secs: u64 = env::var("REQUEST_TIMEOUT_SECS")
            .unwrap_or_else(|_| DEFAULT_REQUEST_TIMEOUT_SECS.to_string())
            .parse()
            .map_err(|_| "Invalid REQUEST_TIMEOUT_SECS")?;

        if request_timeout_secs == 0 || request_timeout_secs > 120 {
            return Err("REQUEST_TIMEOUT_SECS must be between 1 and 120 seconds".to_string());
        }

        Ok(Config {
            api_base_url: env::var("TRAVELSHARE_API_BASE_URL")
                .map_err(|_| "TRAVELSHARE_API_BASE_URL must be set")?
                .trim_end_matches('/')
                .to_string(),
            public_base_url: env::var("TRAVELSHARE_PUBLIC_BASE_URL")
                .unwrap_or_else(|_| DEFAULT_PUBLIC_BASE_URL.to_string())
                .trim_end_matches('/')
                .to_string(),
            google_maps_api_key: env::var("GOOGLE_MAPS_API_KEY")
                .map_err(|_| "GOOGLE_MAPS_API_KEY must be set")?,
            google_directions_base_url: env::var("GOOGLE_DIRECTIONS_BASE_URL")
                .unwrap_or_else(|_| DEFAULT_GOOGLE_DIRECTIONS_BASE_URL.to_string()),
            openweather_api_key: env::var("OPENWEATHER_API_KEY").ok(),
            openweather_base_url: env::var("OPENWEATHER_BASE_URL")
                .unwrap_or_else(|_| DEFAULT_OPENWEATHER_BASE_URL.to_string()),
            request_timeout_secs,
            optimize_waypoints: env::var("OPTIMIZE_WAYPOINTS")
                .unwrap_or_else(|_| "true".to_string())
                .parse()
                .map_err(|_| "Invalid OPTIMIZE_WAYPOINTS (expected true or false)")?,
            auth_token: env::var("TRAVELSHARE_AUTH_TOKEN").ok(),
        })
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}
