mod admin;
mod assets;
mod deletion;
mod facas;

pub use admin::{admin_purge, health};
pub use assets::{download_cdr, download_pdf, preview_faca, serve_thumbnail};
pub use deletion::{cancel_delete, confirm_delete, request_delete};
pub use facas::{create_faca, get_faca, list_facas, update_faca};

use bytes::Bytes;

use crate::api::response::ApiError;
use crate::storage::DatabaseError;
use crate::AppState;

/// Map a DatabaseError to an ApiError: duplicates surface as 409 inline
/// messages, everything else is a server fault.
fn repo_error(e: DatabaseError) -> ApiError {
    if e.is_duplicate() {
        ApiError::conflict(e.to_string())
    } else {
        ApiError::internal(e.to_string())
    }
}

/// Render the first page of `pdf` on a blocking thread. Failures are logged
/// and collapse to `None` -- a missing thumbnail never fails the request.
async fn generate_thumbnail(state: &AppState, pdf: Bytes, stored_name: &str) -> Option<String> {
    let thumbnailer = state.thumbnailer.clone();
    let stored = stored_name.to_string();

    match tokio::task::spawn_blocking(move || thumbnailer.generate(&pdf, &stored, 0)).await {
        Ok(Ok(name)) => Some(name),
        Ok(Err(e)) => {
            tracing::warn!(file = %stored_name, error = %e, "Thumbnail generation failed");
            None
        }
        Err(e) => {
            tracing::warn!(file = %stored_name, error = %e, "Thumbnail task panicked");
            None
        }
    }
}

/// Best-effort removal of a stored upload; failures are logged, never
/// propagated.
async fn discard_stored(state: &AppState, stored_name: &str) {
    if let Err(e) = state.file_store.delete(stored_name).await {
        tracing::warn!(file = %stored_name, error = %e, "Failed to delete stored file");
    }
}
