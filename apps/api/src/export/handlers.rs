use axum::{
    extract::{Path, State},
    http::header,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use tracing::debug;

use crate::errors::AppError;
use crate::export::{format_catalog, generate_document, FormatInfo};
use crate::layout::DocumentFormat;
use crate::state::AppState;

#[derive(Serialize)]
pub struct FormatListResponse {
    pub formats: Vec<FormatInfo>,
}

/// GET /api/v1/cv/:format
pub async fn handle_export(
    State(state): State<AppState>,
    Path(format): Path<String>,
) -> Result<Response, AppError> {
    let format: DocumentFormat = format
        .parse()
        .map_err(|e: crate::layout::profile::UnknownFormat| AppError::Validation(e.to_string()))?;

    let exported = generate_document(&state.loader, format, state.compose_options()).await?;

    let disposition = format!("attachment; filename=\"{}\"", exported.filename);
    Ok((
        [
            (header::CONTENT_TYPE, "application/pdf".to_string()),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        exported.bytes,
    )
        .into_response())
}

/// GET /api/v1/cv/formats
/// Descriptions come from the record when it can be loaded.
pub async fn handle_list_formats(State(state): State<AppState>) -> Json<FormatListResponse> {
    let record = match state.loader.load().await {
        Ok(record) => Some(record),
        Err(e) => {
            debug!("listing built-in format descriptions: {e}");
            None
        }
    };
    Json(FormatListResponse {
        formats: format_catalog(record.as_deref()),
    })
}
