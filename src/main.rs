use std::{sync::Arc, time::Duration};

use axum::http::{header, HeaderValue, Method};
use tower_http::cors::{AllowOrigin, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use weather_query_api::{
    config::Config,
    db::{self, PgQueryStore},
    routes,
    services::{geocode::OpenCageGeocoder, nlp::NlpClient, openweather::OpenWeatherClient},
    AppState,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let _ = dotenvy::dotenv();

    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::from_default_env())
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::from_env()?;

    let pool = db::create_pool(&config.database_url).await?;
    db::run_migrations(&pool).await?;
    info!("Database connected and migrations applied");

    if config.opencage_api_key.is_none() {
        warn!("OPENCAGE_API_KEY not set; geocoding requests will fail");
    }
    if config.openweather_api_key.is_none() {
        warn!("OPENWEATHER_API_KEY not set; weather requests will fail");
    }

    let http = reqwest::Client::builder()
        .timeout(Duration::from_secs(config.http_timeout_secs))
        .build()?;

    let state = AppState {
        store: Arc::new(PgQueryStore::new(pool)),
        geocoder: Arc::new(OpenCageGeocoder::new(http.clone(), &config)),
        weather: Arc::new(OpenWeatherClient::new(http.clone(), &config)),
        parser: Arc::new(NlpClient::new(http, &config)),
    };

    let cors_origin = if config.allowed_origins.is_empty() {
        AllowOrigin::any()
    } else {
        let origins = config
            .allowed_origins
            .iter()
            .filter_map(|o| match HeaderValue::from_str(o) {
                Ok(v) => Some(v),
                Err(_) => {
                    warn!("Ignoring invalid origin in ALLOWED_ORIGINS: {}", o);
                    None
                }
            })
            .collect::<Vec<_>>();
        AllowOrigin::list(origins)
    };

    let cors = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION])
        .allow_origin(cors_origin);

    let app = routes::router()
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state);

    let addr = format!("{}:{}", config.host, config.port);
    info!("Weather query API listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
