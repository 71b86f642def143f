use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::query::NormalizedLocation;

/// A single reading from the weather provider, current or forecast.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WeatherPoint {
    pub at: DateTime<Utc>,
    pub temp_c: f64,
    pub weather: Option<String>,
    pub icon: Option<String>,
}

/// Query params for GET /weather/current.
#[derive(Debug, Default, Deserialize)]
pub struct CurrentWeatherParams {
    pub location: Option<String>,
    pub lat: Option<f64>,
    pub lon: Option<f64>,
}

/// Response of GET /weather/current.
#[derive(Debug, Clone, Serialize)]
pub struct CurrentWeatherView {
    pub location: NormalizedLocation,
    pub current: WeatherPoint,
    pub forecast: Vec<WeatherPoint>,
}
