use axum::extract::{Path, State};
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use base64::Engine as _;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokio_util::io::ReaderStream;

use crate::api::response::{ApiError, AppQuery, JSend};
use crate::file_store::FileStoreError;
use crate::storage::models::FacaRecord;
use crate::thumbnail::stem_of;
use crate::AppState;

// ============================================================================
// Types
// ============================================================================

#[derive(Debug, Deserialize)]
pub struct PreviewParams {
    /// Number of pages to render; capped by the configured maximum.
    #[serde(default)]
    pub pages: Option<usize>,
}

#[derive(Debug, Serialize)]
pub struct PreviewResponse {
    /// False when the document could not be rendered
    pub available: bool,
    /// Rendered pages as base64 PNG, in page order
    pub pages: Vec<String>,
}

// ============================================================================
// Handlers
// ============================================================================

/// Stream the primary PDF under its original filename.
/// Route: GET /facas/:id/pdf
pub async fn download_pdf(
    State(state): State<Arc<AppState>>,
    Path(id): Path<u64>,
) -> Result<Response, ApiError> {
    let faca = lookup(&state, id)?;
    serve_download(&state, &faca.pdf_filename, &faca.pdf_original_name).await
}

/// Stream the secondary vector asset under its original filename.
/// Route: GET /facas/:id/cdr
pub async fn download_cdr(
    State(state): State<Arc<AppState>>,
    Path(id): Path<u64>,
) -> Result<Response, ApiError> {
    let faca = lookup(&state, id)?;

    let stored = faca
        .cdr_filename
        .as_deref()
        .ok_or_else(|| ApiError::not_found("Entry has no secondary asset"))?;
    let original = faca.cdr_original_name.as_deref().unwrap_or(stored);

    serve_download(&state, stored, original).await
}

/// Serve the entry's thumbnail PNG, regenerating it from the stored PDF if
/// the file has gone missing.
/// Route: GET /facas/:id/thumb
pub async fn serve_thumbnail(
    State(state): State<Arc<AppState>>,
    Path(id): Path<u64>,
) -> Result<Response, ApiError> {
    let faca = lookup(&state, id)?;

    let thumb_name = faca
        .thumb
        .clone()
        .unwrap_or_else(|| format!("{}_p0.png", stem_of(&faca.pdf_filename)));

    let png = match state.thumbnailer.read(&thumb_name) {
        Ok(png) => png,
        Err(_) => regenerate_thumbnail(&state, &faca)
            .await
            .ok_or_else(|| ApiError::not_found("Thumbnail unavailable"))?,
    };

    let mut response = (StatusCode::OK, png).into_response();
    response.headers_mut().insert(
        header::CONTENT_TYPE,
        header::HeaderValue::from_static("image/png"),
    );
    Ok(response)
}

/// Render the first pages of the PDF for on-screen preview. Rendering
/// failures degrade to an empty, unavailable preview rather than an error.
/// Route: GET /facas/:id/preview?pages=N
pub async fn preview_faca(
    State(state): State<Arc<AppState>>,
    Path(id): Path<u64>,
    AppQuery(params): AppQuery<PreviewParams>,
) -> Result<Json<JSend<PreviewResponse>>, ApiError> {
    let faca = lookup(&state, id)?;

    let cap = state.config.preview.max_preview_pages;
    let max_pages = params.pages.unwrap_or(cap).clamp(1, cap);

    let pdf = match state.file_store.read(&faca.pdf_filename).await {
        Ok(data) => data,
        Err(e) => {
            tracing::warn!(faca_id = id, error = %e, "PDF missing for preview");
            return Ok(JSend::success(PreviewResponse {
                available: false,
                pages: Vec::new(),
            }));
        }
    };

    let thumbnailer = state.thumbnailer.clone();
    let stored = faca.pdf_filename.clone();
    let rendered =
        tokio::task::spawn_blocking(move || thumbnailer.preview_pages(&pdf, &stored, max_pages))
            .await;

    let pages = match rendered {
        Ok(Ok(pages)) => pages,
        Ok(Err(e)) => {
            tracing::warn!(faca_id = id, error = %e, "Preview rendering failed");
            return Ok(JSend::success(PreviewResponse {
                available: false,
                pages: Vec::new(),
            }));
        }
        Err(e) => {
            tracing::warn!(faca_id = id, error = %e, "Preview task panicked");
            return Ok(JSend::success(PreviewResponse {
                available: false,
                pages: Vec::new(),
            }));
        }
    };

    let encoded = pages
        .iter()
        .map(|png| base64::engine::general_purpose::STANDARD.encode(png))
        .collect();

    Ok(JSend::success(PreviewResponse {
        available: true,
        pages: encoded,
    }))
}

// ============================================================================
// Helpers
// ============================================================================

fn lookup(state: &AppState, id: u64) -> Result<FacaRecord, ApiError> {
    state
        .db
        .get_faca(id)
        .map_err(|e| ApiError::internal(e.to_string()))?
        .ok_or_else(|| ApiError::not_found("Catalog entry not found"))
}

async fn serve_download(
    state: &AppState,
    stored_name: &str,
    original_name: &str,
) -> Result<Response, ApiError> {
    let file = state
        .file_store
        .open(stored_name)
        .await
        .map_err(|e| match e {
            FileStoreError::NotFound(_) => ApiError::not_found("File content not found"),
            _ => ApiError::internal(format!("Failed to open file: {e}")),
        })?;

    let mime = mime_guess::from_path(original_name).first_or_octet_stream();
    let body = axum::body::Body::from_stream(ReaderStream::new(file));

    let mut response = (StatusCode::OK, body).into_response();
    let headers = response.headers_mut();

    headers.insert(
        header::CONTENT_TYPE,
        mime.as_ref()
            .parse()
            .unwrap_or(header::HeaderValue::from_static("application/octet-stream")),
    );

    // Downloads carry the user-facing filename, not the stored token
    if let Ok(value) = format!("attachment; filename=\"{original_name}\"").parse() {
        headers.insert(header::CONTENT_DISPOSITION, value);
    }

    Ok(response)
}

/// Re-render a missing thumbnail from the stored PDF. Returns `None` when
/// the source is gone or unrenderable.
async fn regenerate_thumbnail(state: &AppState, faca: &FacaRecord) -> Option<Vec<u8>> {
    let pdf = match state.file_store.read(&faca.pdf_filename).await {
        Ok(data) => data,
        Err(e) => {
            tracing::warn!(faca_id = faca.id, error = %e, "PDF missing for thumbnail regeneration");
            return None;
        }
    };

    let name = super::generate_thumbnail(state, pdf, &faca.pdf_filename).await?;
    state.thumbnailer.read(&name).ok()
}
