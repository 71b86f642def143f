use axum::{
    extract::{Query, State},
    Json,
};

use super::{error_response, ApiError};
use crate::{
    models::weather::{CurrentWeatherParams, CurrentWeatherView},
    services::weather::WeatherService,
    AppState,
};

/// GET /weather/current?location=... or ?lat=...&lon=...
pub async fn current_weather(
    State(state): State<AppState>,
    Query(params): Query<CurrentWeatherParams>,
) -> Result<Json<CurrentWeatherView>, ApiError> {
    WeatherService::lookup(&state, &params)
        .await
        .map(Json)
        .map_err(error_response)
}
