use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{types::Json, FromRow};
use uuid::Uuid;

use super::weather::WeatherPoint;

/// Geocoder-resolved display name and coordinates for a free-text location.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NormalizedLocation {
    pub name: String,
    pub lat: f64,
    pub lon: f64,
}

/// One stored observation or forecast point.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Snapshot {
    pub at: DateTime<Utc>,
    pub temp_c: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub weather: Option<String>,
}

impl From<WeatherPoint> for Snapshot {
    fn from(point: WeatherPoint) -> Self {
        Self {
            at: point.at,
            temp_c: point.temp_c,
            weather: point.weather,
        }
    }
}

/// A saved weather query with its derived snapshots.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WeatherQuery {
    #[serde(rename = "_id")]
    pub id: Uuid,
    pub location_input: String,
    pub normalized_location: NormalizedLocation,
    pub date_from: DateTime<Utc>,
    pub date_to: DateTime<Utc>,
    pub snapshots: Vec<Snapshot>,
    pub created_at: DateTime<Utc>,
}

/// Row layout of `weather_queries`.
#[derive(Debug, FromRow)]
pub struct WeatherQueryRow {
    pub id: Uuid,
    pub location_input: String,
    pub normalized_name: String,
    pub lat: f64,
    pub lon: f64,
    pub date_from: DateTime<Utc>,
    pub date_to: DateTime<Utc>,
    pub snapshots: Json<Vec<Snapshot>>,
    pub created_at: DateTime<Utc>,
}

impl From<WeatherQueryRow> for WeatherQuery {
    fn from(row: WeatherQueryRow) -> Self {
        Self {
            id: row.id,
            location_input: row.location_input,
            normalized_location: NormalizedLocation {
                name: row.normalized_name,
                lat: row.lat,
                lon: row.lon,
            },
            date_from: row.date_from,
            date_to: row.date_to,
            snapshots: row.snapshots.0,
            created_at: row.created_at,
        }
    }
}

/// A fully resolved query ready to be persisted.
#[derive(Debug, Clone)]
pub struct NewWeatherQuery {
    pub location_input: String,
    pub normalized_location: NormalizedLocation,
    pub date_from: DateTime<Utc>,
    pub date_to: DateTime<Utc>,
    pub snapshots: Vec<Snapshot>,
}

/// Fields to overwrite on an existing query; `None` keeps the stored value.
#[derive(Debug, Clone, Default)]
pub struct QueryPatch {
    pub location_input: Option<String>,
    pub normalized_location: Option<NormalizedLocation>,
    pub date_from: Option<DateTime<Utc>>,
    pub date_to: Option<DateTime<Utc>>,
    pub snapshots: Option<Vec<Snapshot>>,
}

/// Body for POST /queries.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateQueryRequest {
    pub location_input: Option<String>,
    pub date_from: Option<String>,
    pub date_to: Option<String>,
}

/// Body for PUT /queries/{id}. Every field is optional.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateQueryRequest {
    pub location_input: Option<String>,
    pub date_from: Option<String>,
    pub date_to: Option<String>,
}
