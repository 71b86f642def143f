use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use chrono::Utc;
use serde_json::{json, Value};
use uuid::Uuid;

use super::{error_response, ApiError};
use crate::{
    models::query::{CreateQueryRequest, UpdateQueryRequest, WeatherQuery},
    services::queries::QueryService,
    AppState,
};

pub async fn create_query(
    State(state): State<AppState>,
    Json(body): Json<CreateQueryRequest>,
) -> Result<(StatusCode, Json<WeatherQuery>), ApiError> {
    QueryService::create(&state, &body, Utc::now())
        .await
        .map(|query| (StatusCode::CREATED, Json(query)))
        .map_err(error_response)
}

/// GET /queries: latest 100, newest first
pub async fn list_queries(
    State(state): State<AppState>,
) -> Result<Json<Vec<WeatherQuery>>, ApiError> {
    QueryService::list(&state)
        .await
        .map(Json)
        .map_err(error_response)
}

pub async fn get_query(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<WeatherQuery>, ApiError> {
    QueryService::get(&state, id)
        .await
        .map(Json)
        .map_err(error_response)
}

pub async fn update_query(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(body): Json<UpdateQueryRequest>,
) -> Result<Json<WeatherQuery>, ApiError> {
    QueryService::update(&state, id, &body, Utc::now())
        .await
        .map(Json)
        .map_err(error_response)
}

pub async fn delete_query(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<Value>, ApiError> {
    QueryService::delete(&state, id)
        .await
        .map(|_| Json(json!({ "ok": true })))
        .map_err(error_response)
}
