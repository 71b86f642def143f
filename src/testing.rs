//! In-memory stand-ins for the store and the upstream services.

use std::sync::{
    atomic::{AtomicUsize, Ordering},
    Arc, Mutex,
};

use async_trait::async_trait;
use chrono::{DateTime, Duration, NaiveTime, Utc};
use uuid::Uuid;

use crate::{
    db::QueryStore,
    models::{
        query::{NewWeatherQuery, NormalizedLocation, QueryPatch, WeatherQuery},
        weather::WeatherPoint,
    },
    services::{
        geocode::Geocoder,
        nlp::{ParseOutcome, ParsedQuery, QueryParser},
        openweather::WeatherProvider,
    },
    AppState,
};

pub fn point(at: DateTime<Utc>, temp_c: f64) -> WeatherPoint {
    WeatherPoint {
        at,
        temp_c,
        weather: Some("scattered clouds".into()),
        icon: Some("03d".into()),
    }
}

#[derive(Default)]
pub struct MemoryStore {
    rows: Mutex<Vec<WeatherQuery>>,
}

impl MemoryStore {
    pub fn len(&self) -> usize {
        self.rows.lock().unwrap().len()
    }
}

#[async_trait]
impl QueryStore for MemoryStore {
    async fn ping(&self) -> anyhow::Result<()> {
        Ok(())
    }

    async fn insert(&self, query: NewWeatherQuery) -> anyhow::Result<WeatherQuery> {
        let saved = WeatherQuery {
            id: Uuid::new_v4(),
            location_input: query.location_input,
            normalized_location: query.normalized_location,
            date_from: query.date_from,
            date_to: query.date_to,
            snapshots: query.snapshots,
            created_at: Utc::now(),
        };
        self.rows.lock().unwrap().push(saved.clone());
        Ok(saved)
    }

    async fn latest(&self, limit: i64) -> anyhow::Result<Vec<WeatherQuery>> {
        let rows = self.rows.lock().unwrap();
        Ok(rows.iter().rev().take(limit as usize).cloned().collect())
    }

    async fn find(&self, id: Uuid) -> anyhow::Result<Option<WeatherQuery>> {
        let rows = self.rows.lock().unwrap();
        Ok(rows.iter().find(|q| q.id == id).cloned())
    }

    async fn update(&self, id: Uuid, patch: QueryPatch) -> anyhow::Result<Option<WeatherQuery>> {
        let mut rows = self.rows.lock().unwrap();
        let Some(row) = rows.iter_mut().find(|q| q.id == id) else {
            return Ok(None);
        };
        if let Some(v) = patch.location_input {
            row.location_input = v;
        }
        if let Some(v) = patch.normalized_location {
            row.normalized_location = v;
        }
        if let Some(v) = patch.date_from {
            row.date_from = v;
        }
        if let Some(v) = patch.date_to {
            row.date_to = v;
        }
        if let Some(v) = patch.snapshots {
            row.snapshots = v;
        }
        Ok(Some(row.clone()))
    }

    async fn delete(&self, id: Uuid) -> anyhow::Result<bool> {
        let mut rows = self.rows.lock().unwrap();
        let before = rows.len();
        rows.retain(|q| q.id != id);
        Ok(rows.len() != before)
    }
}

/// Resolves any text to "<text>, France"; "Atlantis" is never found.
#[derive(Default)]
pub struct FakeGeocoder {
    calls: AtomicUsize,
}

impl FakeGeocoder {
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Geocoder for FakeGeocoder {
    async fn geocode(&self, query: &str) -> anyhow::Result<NormalizedLocation> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if query.eq_ignore_ascii_case("atlantis") {
            anyhow::bail!("Location not found");
        }
        Ok(NormalizedLocation {
            name: format!("{query}, France"),
            lat: 48.8566,
            lon: 2.3522,
        })
    }
}

/// Current conditions at `now`; forty 3-hour forecast steps after `now`
/// aligned to UTC midnight.
pub struct FakeWeather {
    now: DateTime<Utc>,
    current_calls: AtomicUsize,
    forecast_calls: AtomicUsize,
}

impl FakeWeather {
    pub fn new(now: DateTime<Utc>) -> Self {
        Self {
            now,
            current_calls: AtomicUsize::new(0),
            forecast_calls: AtomicUsize::new(0),
        }
    }

    pub fn current_calls(&self) -> usize {
        self.current_calls.load(Ordering::SeqCst)
    }

    pub fn forecast_calls(&self) -> usize {
        self.forecast_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl WeatherProvider for FakeWeather {
    async fn current(&self, _lat: f64, _lon: f64) -> anyhow::Result<WeatherPoint> {
        self.current_calls.fetch_add(1, Ordering::SeqCst);
        Ok(WeatherPoint {
            at: self.now,
            temp_c: 12.0,
            weather: Some("current".into()),
            icon: Some("01d".into()),
        })
    }

    async fn forecast(&self, _lat: f64, _lon: f64) -> anyhow::Result<Vec<WeatherPoint>> {
        self.forecast_calls.fetch_add(1, Ordering::SeqCst);
        let midnight = self.now.date_naive().and_time(NaiveTime::MIN).and_utc();
        Ok((0..)
            .map(|step| midnight + Duration::hours(3 * step))
            .filter(|at| *at > self.now)
            .take(40)
            .enumerate()
            .map(|(i, at)| point(at, 10.0 + i as f64 * 0.5))
            .collect())
    }
}

/// Returns an empty parse unless told otherwise.
pub struct FakeParser {
    outcome: Mutex<ParseOutcome>,
}

impl Default for FakeParser {
    fn default() -> Self {
        Self {
            outcome: Mutex::new(ParseOutcome::Parsed(ParsedQuery::default())),
        }
    }
}

impl FakeParser {
    pub fn respond_with(&self, location: Option<&str>, from: Option<&str>, to: Option<&str>) {
        *self.outcome.lock().unwrap() = ParseOutcome::Parsed(ParsedQuery {
            location: location.map(String::from),
            date_from: from.map(String::from),
            date_to: to.map(String::from),
        });
    }

    pub fn fail(&self) {
        *self.outcome.lock().unwrap() = ParseOutcome::Fallback {
            query: ParsedQuery::default(),
            reason: "connection refused".into(),
        };
    }
}

#[async_trait]
impl QueryParser for FakeParser {
    async fn parse(&self, text: &str) -> ParseOutcome {
        match &*self.outcome.lock().unwrap() {
            ParseOutcome::Parsed(q) => ParseOutcome::Parsed(q.clone()),
            ParseOutcome::Fallback { reason, .. } => ParseOutcome::Fallback {
                query: ParsedQuery::fallback(text),
                reason: reason.clone(),
            },
        }
    }
}

pub struct TestHarness {
    pub state: AppState,
    pub store: Arc<MemoryStore>,
    pub geocoder: Arc<FakeGeocoder>,
    pub weather: Arc<FakeWeather>,
    pub parser: Arc<FakeParser>,
}

impl TestHarness {
    pub fn new(now: DateTime<Utc>) -> Self {
        let store = Arc::new(MemoryStore::default());
        let geocoder = Arc::new(FakeGeocoder::default());
        let weather = Arc::new(FakeWeather::new(now));
        let parser = Arc::new(FakeParser::default());
        let state = AppState {
            store: store.clone(),
            geocoder: geocoder.clone(),
            weather: weather.clone(),
            parser: parser.clone(),
        };
        Self {
            state,
            store,
            geocoder,
            weather,
            parser,
        }
    }
}
