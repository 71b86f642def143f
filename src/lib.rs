pub mod config;
pub mod db;
pub mod models;
pub mod routes;
pub mod services;

#[cfg(test)]
pub(crate) mod testing;

use std::sync::Arc;

use db::QueryStore;
use services::{geocode::Geocoder, nlp::QueryParser, openweather::WeatherProvider};

/// Application state shared across all handlers.
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn QueryStore>,
    pub geocoder: Arc<dyn Geocoder>,
    pub weather: Arc<dyn WeatherProvider>,
    pub parser: Arc<dyn QueryParser>,
}
