//! OpenWeather client: current conditions and the 5-day / 3-hour forecast.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reqwest::Client;
use serde::{de::DeserializeOwned, Deserialize};

use crate::{config::Config, models::weather::WeatherPoint};

#[async_trait]
pub trait WeatherProvider: Send + Sync {
    async fn current(&self, lat: f64, lon: f64) -> anyhow::Result<WeatherPoint>;

    /// Forecast points in provider order (3-hour steps).
    async fn forecast(&self, lat: f64, lon: f64) -> anyhow::Result<Vec<WeatherPoint>>;
}

#[derive(Debug, Deserialize)]
struct OwEntry {
    dt: i64,
    main: OwMain,
    #[serde(default)]
    weather: Vec<OwCondition>,
}

#[derive(Debug, Deserialize)]
struct OwMain {
    temp: f64,
}

#[derive(Debug, Deserialize)]
struct OwCondition {
    description: Option<String>,
    icon: Option<String>,
}

#[derive(Debug, Deserialize)]
struct OwForecast {
    #[serde(default)]
    list: Vec<OwEntry>,
}

impl TryFrom<OwEntry> for WeatherPoint {
    type Error = anyhow::Error;

    fn try_from(entry: OwEntry) -> anyhow::Result<Self> {
        let at = DateTime::<Utc>::from_timestamp(entry.dt, 0)
            .ok_or_else(|| anyhow::anyhow!("Invalid timestamp from OpenWeather: {}", entry.dt))?;
        let condition = entry.weather.into_iter().next();
        let (weather, icon) = match condition {
            Some(c) => (c.description, c.icon),
            None => (None, None),
        };
        Ok(Self {
            at,
            temp_c: entry.main.temp,
            weather,
            icon,
        })
    }
}

pub struct OpenWeatherClient {
    client: Client,
    base_url: String,
    api_key: Option<String>,
}

impl OpenWeatherClient {
    pub fn new(client: Client, config: &Config) -> Self {
        Self {
            client,
            base_url: config.openweather_base_url.trim_end_matches('/').to_string(),
            api_key: config.openweather_api_key.clone(),
        }
    }

    async fn fetch<T: DeserializeOwned>(
        &self,
        endpoint: &str,
        label: &str,
        lat: f64,
        lon: f64,
    ) -> anyhow::Result<T> {
        let key = self
            .api_key
            .as_deref()
            .ok_or_else(|| anyhow::anyhow!("Missing OPENWEATHER_API_KEY"))?;

        let url = format!("{}/{}", self.base_url, endpoint);
        tracing::debug!("OpenWeather {} for ({}, {})", endpoint, lat, lon);
        let response = self
            .client
            .get(&url)
            .query(&[
                ("lat", lat.to_string()),
                ("lon", lon.to_string()),
                ("appid", key.to_string()),
                ("units", "metric".to_string()),
            ])
            .send()
            .await?;

        if !response.status().is_success() {
            anyhow::bail!("OpenWeather {} failed: {}", label, response.status().as_u16());
        }

        Ok(response.json().await?)
    }
}

#[async_trait]
impl WeatherProvider for OpenWeatherClient {
    async fn current(&self, lat: f64, lon: f64) -> anyhow::Result<WeatherPoint> {
        let entry: OwEntry = self.fetch("weather", "current", lat, lon).await?;
        entry.try_into()
    }

    async fn forecast(&self, lat: f64, lon: f64) -> anyhow::Result<Vec<WeatherPoint>> {
        let forecast: OwForecast = self.fetch("forecast", "forecast", lat, lon).await?;
        forecast.list.into_iter().map(WeatherPoint::try_from).collect()
    }
}
