pub mod export;
pub mod geocode;
pub mod metrics;
pub mod nlp;
pub mod openweather;
pub mod queries;
pub mod weather;

use thiserror::Error;

use crate::{models::query::NormalizedLocation, AppState};

/// Failure of a request flow. Each variant maps to one HTTP status.
#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("{0}")]
    MissingInput(String),
    #[error("Invalid date: {0}")]
    InvalidDate(String),
    #[error("dateFrom must be <= dateTo")]
    DateOrder,
    /// A geocoding or weather call failed; carries the upstream message.
    #[error("{0}")]
    Upstream(anyhow::Error),
    #[error("Not found")]
    NotFound,
    #[error("Unsupported format. Use json|xml|csv|md")]
    UnsupportedFormat,
    #[error("{0}")]
    Store(anyhow::Error),
    #[error("{0}")]
    Internal(anyhow::Error),
}

/// Wrap an upstream error, counting it against `service`.
pub(crate) fn upstream(service: &'static str) -> impl FnOnce(anyhow::Error) -> ServiceError {
    move |e| {
        tracing::warn!("{} call failed: {}", service, e);
        metrics::record_upstream_failure(service);
        ServiceError::Upstream(e)
    }
}

pub(crate) async fn resolve_location(
    state: &AppState,
    input: &str,
) -> Result<NormalizedLocation, ServiceError> {
    state.geocoder.geocode(input).await.map_err(upstream("geocode"))
}

/// Trimmed, non-empty copy of an optional input field.
pub(crate) fn non_empty(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(String::from)
}
