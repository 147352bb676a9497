//! faca-catalog - A catalog service for physical die-cutting templates
//!
//! Each catalog entry ("faca") pairs a required PDF rendering with an
//! optional vector source file (CDR or similar). The crate provides:
//! - Upload storage with collision-resistant stored names
//! - PDF thumbnail and page-preview rendering via mupdf
//! - redb embedded database for catalog metadata (ACID, crash-safe)
//! - REST API with multipart upload support

pub mod api;
pub mod config;
pub mod file_store;
pub mod session;
pub mod storage;
pub mod thumbnail;

use std::sync::{Arc, Mutex};

use config::Config;
use session::DeleteConfirm;
use storage::Database;
use thumbnail::Thumbnailer;

/// Shared application state
pub struct AppState {
    pub config: Config,
    pub db: Database,
    pub file_store: Arc<dyn file_store::FileStore>,
    pub thumbnailer: Thumbnailer,
    /// Delete-confirmation state for the single interactive session.
    pub delete_confirm: Mutex<DeleteConfirm>,
}
