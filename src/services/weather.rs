use super::{metrics::LOOKUPS_COUNTER, non_empty, resolve_location, upstream, ServiceError};
use crate::{
    models::{
        query::NormalizedLocation,
        weather::{CurrentWeatherParams, CurrentWeatherView},
    },
    AppState,
};

pub struct WeatherService;

impl WeatherService {
    /// Current conditions plus the full forecast. Coordinates win over text
    /// when both are supplied.
    pub async fn lookup(
        state: &AppState,
        params: &CurrentWeatherParams,
    ) -> Result<CurrentWeatherView, ServiceError> {
        let location = match (params.lat, params.lon) {
            (Some(lat), Some(lon)) => NormalizedLocation {
                name: "Current Location".into(),
                lat,
                lon,
            },
            _ => {
                let text = non_empty(params.location.as_deref()).ok_or_else(|| {
                    ServiceError::MissingInput("Provide ?location= or ?lat=&lon=".into())
                })?;
                resolve_location(state, &text).await?
            }
        };

        let current = state
            .weather
            .current(location.lat, location.lon)
            .await
            .map_err(upstream("weather"))?;
        let forecast = state
            .weather
            .forecast(location.lat, location.lon)
            .await
            .map_err(upstream("weather"))?;

        LOOKUPS_COUNTER.inc();
        Ok(CurrentWeatherView {
            location,
            current,
            forecast,
        })
    }
}
