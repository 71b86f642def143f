use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime, Utc};
use uuid::Uuid;

use super::{metrics::QUERIES_CREATED_COUNTER, non_empty, resolve_location, upstream, ServiceError};
use crate::{
    models::{
        query::{
            CreateQueryRequest, NewWeatherQuery, NormalizedLocation, QueryPatch, Snapshot,
            UpdateQueryRequest, WeatherQuery,
        },
        weather::WeatherPoint,
    },
    AppState,
};

/// Most recent queries returned by list and export.
pub const LATEST_LIMIT: i64 = 100;

/// Which end of a range a date string describes. A bare calendar date
/// expands to the first or last millisecond of that UTC day.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Bound {
    Start,
    End,
}

pub fn parse_date(raw: &str, bound: Bound) -> Result<DateTime<Utc>, ServiceError> {
    let raw = raw.trim();
    if let Ok(ts) = DateTime::parse_from_rfc3339(raw) {
        return Ok(ts.with_timezone(&Utc));
    }
    if let Ok(naive) = NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S") {
        return Ok(naive.and_utc());
    }
    let day = NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .map_err(|_| ServiceError::InvalidDate(raw.to_string()))?;
    let time = match bound {
        Bound::Start => NaiveTime::MIN,
        Bound::End => NaiveTime::from_hms_milli_opt(23, 59, 59, 999)
            .ok_or_else(|| ServiceError::InvalidDate(raw.to_string()))?,
    };
    Ok(day.and_time(time).and_utc())
}

/// True when both ends of the range fall on `today`.
pub fn is_today_only(from: DateTime<Utc>, to: DateTime<Utc>, today: NaiveDate) -> bool {
    from.date_naive() == today && to.date_naive() == today
}

/// Keep forecast points with `from <= at <= to`, in their original order.
pub fn filter_window(
    points: Vec<WeatherPoint>,
    from: DateTime<Utc>,
    to: DateTime<Utc>,
) -> Vec<Snapshot> {
    points
        .into_iter()
        .filter(|p| p.at >= from && p.at <= to)
        .map(Snapshot::from)
        .collect()
}

async fn derive_snapshots(
    state: &AppState,
    location: &NormalizedLocation,
    from: DateTime<Utc>,
    to: DateTime<Utc>,
    now: DateTime<Utc>,
) -> Result<Vec<Snapshot>, ServiceError> {
    if is_today_only(from, to, now.date_naive()) {
        let current = state
            .weather
            .current(location.lat, location.lon)
            .await
            .map_err(upstream("weather"))?;
        return Ok(vec![current.into()]);
    }

    let forecast = state
        .weather
        .forecast(location.lat, location.lon)
        .await
        .map_err(upstream("weather"))?;
    Ok(filter_window(forecast, from, to))
}

pub struct QueryService;

impl QueryService {
    /// Resolve, fetch and persist a new query. Missing dates are inferred
    /// from the location text by the parser.
    pub async fn create(
        state: &AppState,
        req: &CreateQueryRequest,
        now: DateTime<Utc>,
    ) -> Result<WeatherQuery, ServiceError> {
        let mut location = non_empty(req.location_input.as_deref())
            .ok_or_else(|| ServiceError::MissingInput("locationInput is required".into()))?;
        let mut date_from = non_empty(req.date_from.as_deref());
        let mut date_to = non_empty(req.date_to.as_deref());

        if date_from.is_none() || date_to.is_none() {
            let outcome = state.parser.parse(&location).await;
            if outcome.is_fallback() {
                tracing::debug!("Parser unavailable, keeping {:?} as typed", location);
            }
            let parsed = outcome.into_query();
            if let Some(found) = non_empty(parsed.location.as_deref()) {
                location = found;
            }
            if let (Some(f), Some(t)) = (
                non_empty(parsed.date_from.as_deref()),
                non_empty(parsed.date_to.as_deref()),
            ) {
                date_from = Some(f);
                date_to = Some(t);
            }
        }

        let (Some(raw_from), Some(raw_to)) = (date_from, date_to) else {
            return Err(ServiceError::MissingInput("dateFrom and dateTo are required".into()));
        };
        let from = parse_date(&raw_from, Bound::Start)?;
        let to = parse_date(&raw_to, Bound::End)?;
        if from > to {
            return Err(ServiceError::DateOrder);
        }

        let normalized = resolve_location(state, &location).await?;
        let snapshots = derive_snapshots(state, &normalized, from, to, now).await?;

        let saved = state
            .store
            .insert(NewWeatherQuery {
                location_input: location,
                normalized_location: normalized,
                date_from: from,
                date_to: to,
                snapshots,
            })
            .await
            .map_err(ServiceError::Store)?;

        QUERIES_CREATED_COUNTER.inc();
        tracing::info!(
            "Created weather query {} for {} with {} snapshot(s)",
            saved.id,
            saved.normalized_location.name,
            saved.snapshots.len()
        );
        Ok(saved)
    }

    pub async fn list(state: &AppState) -> Result<Vec<WeatherQuery>, ServiceError> {
        state
            .store
            .latest(LATEST_LIMIT)
            .await
            .map_err(ServiceError::Store)
    }

    pub async fn get(state: &AppState, id: Uuid) -> Result<WeatherQuery, ServiceError> {
        state
            .store
            .find(id)
            .await
            .map_err(ServiceError::Store)?
            .ok_or(ServiceError::NotFound)
    }

    /// Apply a partial update. Any supplied location or date re-geocodes the
    /// merged location and re-derives snapshots, even if the value is unchanged.
    pub async fn update(
        state: &AppState,
        id: Uuid,
        req: &UpdateQueryRequest,
        now: DateTime<Utc>,
    ) -> Result<WeatherQuery, ServiceError> {
        let location_input = non_empty(req.location_input.as_deref());
        let date_from = non_empty(req.date_from.as_deref())
            .map(|raw| parse_date(&raw, Bound::Start))
            .transpose()?;
        let date_to = non_empty(req.date_to.as_deref())
            .map(|raw| parse_date(&raw, Bound::End))
            .transpose()?;
        if let (Some(f), Some(t)) = (date_from, date_to) {
            if f > t {
                return Err(ServiceError::DateOrder);
            }
        }

        if location_input.is_none() && date_from.is_none() && date_to.is_none() {
            return Self::get(state, id).await;
        }

        let base = Self::get(state, id).await?;
        let from = date_from.unwrap_or(base.date_from);
        let to = date_to.unwrap_or(base.date_to);
        if from > to {
            return Err(ServiceError::DateOrder);
        }

        let location = location_input
            .clone()
            .unwrap_or_else(|| base.location_input.clone());
        let normalized = resolve_location(state, &location).await?;
        let snapshots = derive_snapshots(state, &normalized, from, to, now).await?;

        let patch = QueryPatch {
            location_input,
            normalized_location: Some(normalized),
            date_from,
            date_to,
            snapshots: Some(snapshots),
        };
        let updated = state
            .store
            .update(id, patch)
            .await
            .map_err(ServiceError::Store)?
            .ok_or(ServiceError::NotFound)?;

        tracing::info!("Updated weather query {}", id);
        Ok(updated)
    }

    pub async fn delete(state: &AppState, id: Uuid) -> Result<(), ServiceError> {
        let removed = state.store.delete(id).await.map_err(ServiceError::Store)?;
        if !removed {
            return Err(ServiceError::NotFound);
        }
        tracing::info!("Deleted weather query {}", id);
        Ok(())
    }
}
