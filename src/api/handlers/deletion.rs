use axum::extract::{Path, State};
use axum::Json;
use serde::Serialize;
use std::sync::{Arc, PoisonError};

use super::discard_stored;
use crate::api::response::{ApiError, JSend};
use crate::AppState;

// ============================================================================
// Types
// ============================================================================

#[derive(Debug, Serialize)]
pub struct PendingDeleteResponse {
    pub pending_id: u64,
}

#[derive(Debug, Serialize)]
pub struct ConfirmDeleteResponse {
    pub deleted_id: u64,
}

// ============================================================================
// Handlers
// ============================================================================

/// First step of the two-step delete: mark the entry as pending
/// confirmation. Requesting a different entry retargets the pending id.
/// Route: POST /facas/:id/delete
pub async fn request_delete(
    State(state): State<Arc<AppState>>,
    Path(id): Path<u64>,
) -> Result<Json<JSend<PendingDeleteResponse>>, ApiError> {
    state
        .db
        .get_faca(id)
        .map_err(|e| ApiError::internal(e.to_string()))?
        .ok_or_else(|| ApiError::not_found("Catalog entry not found"))?;

    state
        .delete_confirm
        .lock()
        .unwrap_or_else(PoisonError::into_inner)
        .request(id);

    Ok(JSend::success(PendingDeleteResponse { pending_id: id }))
}

/// Second step: delete the pending entry and its files. The record removal
/// is the operation of record; file cleanup is best-effort. Confirming an
/// id that has meanwhile disappeared is a no-op, not an error.
/// Route: POST /facas/delete/confirm
pub async fn confirm_delete(
    State(state): State<Arc<AppState>>,
) -> Result<Json<JSend<ConfirmDeleteResponse>>, ApiError> {
    let id = state
        .delete_confirm
        .lock()
        .unwrap_or_else(PoisonError::into_inner)
        .confirm()
        .ok_or_else(|| ApiError::bad_request("No deletion pending confirmation"))?;

    let removed = state
        .db
        .delete_faca(id)
        .map_err(|e| ApiError::internal(e.to_string()))?;

    if let Some(record) = removed {
        discard_stored(&state, &record.pdf_filename).await;
        if let Some(ref cdr) = record.cdr_filename {
            discard_stored(&state, cdr).await;
        }
        if let Some(ref thumb) = record.thumb {
            if let Err(e) = state.thumbnailer.delete(thumb) {
                tracing::warn!(thumb = %thumb, error = %e, "Failed to delete thumbnail");
            }
        }
        tracing::debug!(faca_id = id, "Deleted catalog entry");
    }

    Ok(JSend::success(ConfirmDeleteResponse { deleted_id: id }))
}

/// Abandon the pending deletion, returning the session to idle.
/// Route: POST /facas/delete/cancel
pub async fn cancel_delete(State(state): State<Arc<AppState>>) -> Json<JSend<()>> {
    state
        .delete_confirm
        .lock()
        .unwrap_or_else(PoisonError::into_inner)
        .cancel();

    JSend::success(())
}
