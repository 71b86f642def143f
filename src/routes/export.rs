use axum::{
    extract::{Path, State},
    http::header,
    response::IntoResponse,
};

use super::{error_response, ApiError};
use crate::{services::export::ExportService, AppState};

/// GET /export/{format} with format json, xml, csv or md (markdown)
pub async fn export_queries(
    State(state): State<AppState>,
    Path(format): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let (format, body) = ExportService::export(&state, &format)
        .await
        .map_err(error_response)?;
    Ok(([(header::CONTENT_TYPE, format.content_type())], body))
}
