use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct CurrentWeather {
    pub location_name: String,
    pub temperature_c: f64,
    pub conditions: String,
    /// Provider icon identifier, e.g. `"01d"`
    pub icon: String,
}

impl CurrentWeather {
    pub fn icon_url(&self) -> String {
        format!("https://openweathermap.org/img/wn/{}@2x.png", self.icon)
    }
}

// OpenWeather API response types

#[derive(Debug, Deserialize)]
pub(crate) struct OpenWeatherResponse {
    #[serde(default)]
    name: String,
    main: OpenWeatherMain,
    #[serde(default)]
    weather: Vec<OpenWeatherCondition>,
}

#[derive(Debug, Deserialize)]
struct OpenWeatherMain {
    temp: f64,
}

#[derive(Debug, Deserialize)]
struct OpenWeatherCondition {
    description: String,
    icon: String,
}

impl From<OpenWeatherResponse> for CurrentWeather {
    fn from(response: OpenWeatherResponse) -> Self {
        let (conditions, icon) = response
            .weather
            .into_iter()
            .next()
            .map(|w| (w.description, w.icon))
            .unwrap_or_default();

        CurrentWeather {
            location_name: response.name,
            temperature_c: response.main.temp,
            conditions,
            icon,
        }
    }
}
