use axum::extract::{Multipart, Path, State};
use axum::Json;
use bytes::Bytes;
use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use super::{discard_stored, generate_thumbnail, repo_error};
use crate::api::response::{ApiError, AppQuery, JSend, JSendPaginated, Pagination};
use crate::file_store::SavedUpload;
use crate::storage::models::{AssetInfo, FacaRecord, NewFaca};
use crate::AppState;

// ============================================================================
// Types
// ============================================================================

#[derive(Debug, Serialize)]
pub struct FacaResponse {
    pub id: u64,
    pub name: String,
    pub description: Option<String>,
    pub pdf_original_name: String,
    pub cdr_original_name: Option<String>,
    /// Whether a secondary vector asset is available for download
    pub has_cdr: bool,
    /// Whether a generated thumbnail is available
    pub has_thumb: bool,
    pub uploaded_at: String,
}

#[derive(Debug, Deserialize)]
pub struct ListFacasParams {
    #[serde(default = "default_limit")]
    pub limit: u32,
    #[serde(default)]
    pub offset: u32,
    #[serde(default)]
    pub search: Option<String>,
}

fn default_limit() -> u32 {
    20
}

/// One file part of a multipart form: the bytes plus the client's filename.
struct UploadPart {
    data: Bytes,
    file_name: String,
}

/// Parsed multipart form shared by the add and edit flows.
#[derive(Default)]
struct FacaForm {
    name: Option<String>,
    description: Option<String>,
    pdf: Option<UploadPart>,
    cdr: Option<UploadPart>,
}

// ============================================================================
// Handlers
// ============================================================================

pub async fn create_faca(
    State(state): State<Arc<AppState>>,
    multipart: Multipart,
) -> Result<Json<JSend<FacaResponse>>, ApiError> {
    let form = read_faca_form(&state, multipart).await?;

    let name = required_name(&form)?;
    let pdf = form
        .pdf
        .as_ref()
        .ok_or_else(|| ApiError::bad_request("pdf field is required"))?;

    // Early duplicate probe so validation failures do not leave orphan
    // files behind. The insert re-checks inside its write transaction.
    if state
        .db
        .name_exists(&name)
        .map_err(|e| ApiError::internal(e.to_string()))?
    {
        return Err(ApiError::conflict(format!(
            "an entry named '{name}' already exists"
        )));
    }

    let saved_pdf = state
        .file_store
        .save(pdf.data.clone(), &pdf.file_name)
        .await
        .map_err(|e| ApiError::internal(format!("Failed to store PDF: {e}")))?;

    let saved_cdr = match &form.cdr {
        Some(part) => Some(
            state
                .file_store
                .save(part.data.clone(), &part.file_name)
                .await
                .map_err(|e| ApiError::internal(format!("Failed to store file: {e}")))?,
        ),
        None => None,
    };

    // Render failure degrades to "no thumbnail", never rejects the upload.
    let thumb = generate_thumbnail(&state, pdf.data.clone(), &saved_pdf.stored_name).await;

    let new = NewFaca {
        name,
        description: form.description.clone().filter(|d| !d.trim().is_empty()),
        pdf: asset_info(&saved_pdf),
        cdr: saved_cdr.as_ref().map(asset_info),
        thumb: thumb.clone(),
        uploaded_at: Utc::now(),
    };

    let record = match state.db.create_faca(new) {
        Ok(record) => record,
        Err(e) => {
            // Best-effort cleanup of the just-written files
            discard_stored(&state, &saved_pdf.stored_name).await;
            if let Some(ref cdr) = saved_cdr {
                discard_stored(&state, &cdr.stored_name).await;
            }
            if let Some(ref thumb) = thumb {
                if let Err(err) = state.thumbnailer.delete(thumb) {
                    tracing::warn!(thumb = %thumb, error = %err, "Failed to remove thumbnail during cleanup");
                }
            }
            return Err(repo_error(e));
        }
    };

    tracing::debug!(faca_id = record.id, name = %record.name, "Created catalog entry");

    Ok(JSend::success(faca_to_response(&record)))
}

pub async fn get_faca(
    State(state): State<Arc<AppState>>,
    Path(id): Path<u64>,
) -> Result<Json<JSend<FacaResponse>>, ApiError> {
    let faca = state
        .db
        .get_faca(id)
        .map_err(|e| ApiError::internal(e.to_string()))?
        .ok_or_else(|| ApiError::not_found("Catalog entry not found"))?;

    Ok(JSend::success(faca_to_response(&faca)))
}

pub async fn update_faca(
    State(state): State<Arc<AppState>>,
    Path(id): Path<u64>,
    multipart: Multipart,
) -> Result<Json<JSend<FacaResponse>>, ApiError> {
    let form = read_faca_form(&state, multipart).await?;
    let name = required_name(&form)?;

    let saved_pdf = match &form.pdf {
        Some(part) => Some(
            state
                .file_store
                .save(part.data.clone(), &part.file_name)
                .await
                .map_err(|e| ApiError::internal(format!("Failed to store PDF: {e}")))?,
        ),
        None => None,
    };

    let saved_cdr = match &form.cdr {
        Some(part) => Some(
            state
                .file_store
                .save(part.data.clone(), &part.file_name)
                .await
                .map_err(|e| ApiError::internal(format!("Failed to store file: {e}")))?,
        ),
        None => None,
    };

    // A replacement PDF gets a fresh thumbnail; otherwise the stored one
    // is left untouched.
    let new_thumb = match (&form.pdf, &saved_pdf) {
        (Some(part), Some(saved)) => {
            Some(generate_thumbnail(&state, part.data.clone(), &saved.stored_name).await)
        }
        _ => None,
    };

    let pdf_asset = saved_pdf.as_ref().map(asset_info);
    let cdr_asset = saved_cdr.as_ref().map(asset_info);
    let description = form.description.clone().filter(|d| !d.trim().is_empty());

    let result = state.db.update_faca(
        id,
        &name,
        description.as_deref(),
        pdf_asset.as_ref(),
        cdr_asset.as_ref(),
        new_thumb.as_ref().map(|t| t.as_deref()),
    );

    let previous = match result {
        Ok(Some(previous)) => previous,
        Ok(None) => {
            cleanup_new_assets(&state, &saved_pdf, &saved_cdr, &new_thumb).await;
            return Err(ApiError::not_found("Catalog entry not found"));
        }
        Err(e) => {
            cleanup_new_assets(&state, &saved_pdf, &saved_cdr, &new_thumb).await;
            return Err(repo_error(e));
        }
    };

    // The record update is committed; replaced asset files are now orphans.
    if saved_pdf.is_some() {
        discard_stored(&state, &previous.pdf_filename).await;
        if let Some(ref old_thumb) = previous.thumb {
            if let Err(e) = state.thumbnailer.delete(old_thumb) {
                tracing::warn!(thumb = %old_thumb, error = %e, "Failed to remove replaced thumbnail");
            }
        }
    }
    if saved_cdr.is_some() {
        if let Some(ref old_cdr) = previous.cdr_filename {
            discard_stored(&state, old_cdr).await;
        }
    }

    let faca = state
        .db
        .get_faca(id)
        .map_err(|e| ApiError::internal(e.to_string()))?
        .ok_or_else(|| ApiError::internal("Catalog entry not found after update"))?;

    tracing::debug!(faca_id = id, "Updated catalog entry");
    Ok(JSend::success(faca_to_response(&faca)))
}

pub async fn list_facas(
    State(state): State<Arc<AppState>>,
    AppQuery(params): AppQuery<ListFacasParams>,
) -> Result<Json<JSendPaginated<FacaResponse>>, ApiError> {
    if params.limit == 0 {
        return Err(ApiError::bad_request("limit must be greater than 0"));
    }

    let search = params.search.as_deref().unwrap_or("");
    match state.db.list_facas(search) {
        Ok(facas) => {
            let total = facas.len() as u64;
            let items: Vec<FacaResponse> = facas
                .iter()
                .skip(params.offset as usize)
                .take(params.limit as usize)
                .map(faca_to_response)
                .collect();

            Ok(JSendPaginated::success(
                items,
                Pagination {
                    limit: params.limit,
                    offset: params.offset,
                    total,
                },
            ))
        }
        Err(e) => Err(ApiError::internal(e.to_string())),
    }
}

// ============================================================================
// Helpers
// ============================================================================

/// Read the add/edit multipart form. Unknown fields are ignored; file parts
/// are size-checked against the configured upload limit.
async fn read_faca_form(
    state: &AppState,
    mut multipart: Multipart,
) -> Result<FacaForm, ApiError> {
    let mut form = FacaForm::default();

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::bad_request(format!("Invalid multipart data: {e}")))?
    {
        let field_name = field.name().unwrap_or("").to_string();

        match field_name.as_str() {
            "name" => {
                form.name = Some(
                    field
                        .text()
                        .await
                        .map_err(|e| ApiError::bad_request(format!("Invalid name: {e}")))?,
                );
            }
            "description" => {
                form.description = Some(
                    field
                        .text()
                        .await
                        .map_err(|e| ApiError::bad_request(format!("Invalid description: {e}")))?,
                );
            }
            "pdf" => {
                form.pdf = Some(read_upload_part(state, field, "pdf").await?);
            }
            "cdr" => {
                form.cdr = Some(read_upload_part(state, field, "cdr").await?);
            }
            _ => {
                // Ignore unknown fields
            }
        }
    }

    Ok(form)
}

async fn read_upload_part(
    state: &AppState,
    field: axum::extract::multipart::Field<'_>,
    part: &str,
) -> Result<UploadPart, ApiError> {
    let file_name = field
        .file_name()
        .map(|s| s.to_string())
        .ok_or_else(|| ApiError::bad_request(format!("{part} field must be a file upload")))?;

    let data = field
        .bytes()
        .await
        .map_err(|e| ApiError::bad_request(format!("Failed to read {part}: {e}")))?;

    if data.len() as u64 > state.config.max_upload_size {
        return Err(ApiError::payload_too_large(format!(
            "File exceeds maximum upload size of {} bytes",
            state.config.max_upload_size
        )));
    }

    Ok(UploadPart { data, file_name })
}

fn required_name(form: &FacaForm) -> Result<String, ApiError> {
    let name = form.name.as_deref().unwrap_or("").trim();
    if name.is_empty() {
        return Err(ApiError::bad_request("name is required"));
    }
    Ok(name.to_string())
}

fn asset_info(saved: &SavedUpload) -> AssetInfo {
    AssetInfo {
        stored_name: saved.stored_name.clone(),
        original_name: saved.original_name.clone(),
    }
}

async fn cleanup_new_assets(
    state: &AppState,
    pdf: &Option<SavedUpload>,
    cdr: &Option<SavedUpload>,
    thumb: &Option<Option<String>>,
) {
    if let Some(pdf) = pdf {
        discard_stored(state, &pdf.stored_name).await;
    }
    if let Some(cdr) = cdr {
        discard_stored(state, &cdr.stored_name).await;
    }
    if let Some(Some(thumb)) = thumb {
        if let Err(e) = state.thumbnailer.delete(thumb) {
            tracing::warn!(thumb = %thumb, error = %e, "Failed to remove thumbnail during cleanup");
        }
    }
}

pub(super) fn faca_to_response(faca: &FacaRecord) -> FacaResponse {
    FacaResponse {
        id: faca.id,
        name: faca.name.clone(),
        description: faca.description.clone(),
        pdf_original_name: faca.pdf_original_name.clone(),
        cdr_original_name: faca.cdr_original_name.clone(),
        has_cdr: faca.cdr_filename.is_some(),
        has_thumb: faca.thumb.is_some(),
        uploaded_at: faca.uploaded_at.to_rfc3339(),
    }
}
