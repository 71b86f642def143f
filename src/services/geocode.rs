//! Forward geocoding: free-text location to display name and coordinates.
//! Backed by the OpenCage API.

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;

use crate::{config::Config, models::query::NormalizedLocation};

#[async_trait]
pub trait Geocoder: Send + Sync {
    /// Resolve `query` to its best match. Fails when nothing matches.
    async fn geocode(&self, query: &str) -> anyhow::Result<NormalizedLocation>;
}

#[derive(Debug, Deserialize)]
struct OpenCageResponse {
    #[serde(default)]
    results: Vec<OpenCageResult>,
}

#[derive(Debug, Deserialize)]
struct OpenCageResult {
    formatted: String,
    geometry: OpenCageGeometry,
}

#[derive(Debug, Deserialize)]
struct OpenCageGeometry {
    lat: f64,
    lng: f64,
}

pub struct OpenCageGeocoder {
    client: Client,
    base_url: String,
    api_key: Option<String>,
}

impl OpenCageGeocoder {
    pub fn new(client: Client, config: &Config) -> Self {
        Self {
            client,
            base_url: config.geocode_base_url.clone(),
            api_key: config.opencage_api_key.clone(),
        }
    }
}

#[async_trait]
impl Geocoder for OpenCageGeocoder {
    async fn geocode(&self, query: &str) -> anyhow::Result<NormalizedLocation> {
        let key = self
            .api_key
            .as_deref()
            .ok_or_else(|| anyhow::anyhow!("Missing OPENCAGE_API_KEY"))?;

        tracing::debug!("Geocoding {:?}", query);
        let response = self
            .client
            .get(&self.base_url)
            .query(&[
                ("q", query),
                ("key", key),
                ("no_annotations", "1"),
                ("limit", "1"),
            ])
            .send()
            .await?;

        if !response.status().is_success() {
            anyhow::bail!("Geocode failed: {}", response.status().as_u16());
        }

        let body: OpenCageResponse = response.json().await?;
        let best = body
            .results
            .into_iter()
            .next()
            .ok_or_else(|| anyhow::anyhow!("Location not found"))?;

        Ok(NormalizedLocation {
            name: best.formatted,
            lat: best.geometry.lat,
            lon: best.geometry.lng,
        })
    }
}
