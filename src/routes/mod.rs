pub mod export;
pub mod health;
pub mod metrics;
pub mod queries;
pub mod weather;

use axum::{
    http::StatusCode,
    routing::get,
    Json, Router,
};
use serde_json::{json, Value};

use crate::{services::ServiceError, AppState};

pub type ApiError = (StatusCode, Json<Value>);

/// Operational endpoints plus the API under `/api`.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/health", get(health::health_check))
        .route("/metrics", get(metrics::metrics_handler))
        .nest("/api", api_router())
}

fn api_router() -> Router<AppState> {
    Router::new()
        .route("/weather/current", get(weather::current_weather))
        .route("/queries", get(queries::list_queries).post(queries::create_query))
        .route(
            "/queries/{id}",
            get(queries::get_query)
                .put(queries::update_query)
                .delete(queries::delete_query),
        )
        .route("/export/{format}", get(export::export_queries))
}

pub fn error_response(err: ServiceError) -> ApiError {
    let status = match &err {
        ServiceError::MissingInput(_)
        | ServiceError::InvalidDate(_)
        | ServiceError::DateOrder
        | ServiceError::Upstream(_)
        | ServiceError::UnsupportedFormat => StatusCode::BAD_REQUEST,
        ServiceError::NotFound => StatusCode::NOT_FOUND,
        ServiceError::Store(e) | ServiceError::Internal(e) => {
            tracing::error!("Request failed: {:?}", e);
            StatusCode::INTERNAL_SERVER_ERROR
        }
    };
    (status, Json(json!({ "error": err.to_string() })))
}
