use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid configuration: {0}")]
    ValidationError(String),
}

#[derive(Debug, Clone)]
pub struct Config {
    pub server: ServerConfig,
    pub storage: StorageConfig,
    pub preview: PreviewConfig,
    /// Enables dangerous operations like purge. Must never be true in production.
    pub test_mode: bool,
    /// Maximum upload size in bytes
    pub max_upload_size: u64,
}

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub bind_address: String,
    /// Directory holding the metadata database
    pub data_dir: String,
}

#[derive(Debug, Clone)]
pub struct StorageConfig {
    /// Directory for uploaded originals
    pub upload_dir: String,
    /// Directory for generated thumbnail PNGs
    pub thumb_dir: String,
}

#[derive(Debug, Clone)]
pub struct PreviewConfig {
    /// Linear scale applied to both axes when rendering thumbnails
    pub thumbnail_zoom: f32,
    /// Linear scale for on-screen page previews
    pub preview_zoom: f32,
    /// Upper bound on pages rendered per preview request
    pub max_preview_pages: usize,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            upload_dir: "./uploads".to_string(),
            thumb_dir: "./thumbs".to_string(),
        }
    }
}

impl Default for PreviewConfig {
    fn default() -> Self {
        Self {
            thumbnail_zoom: 2.0,
            preview_zoom: 1.5,
            max_preview_pages: 3,
        }
    }
}

impl Config {
    /// Load configuration from environment variables.
    pub fn load() -> Result<Self, ConfigError> {
        let bind_address =
            std::env::var("BIND_ADDRESS").unwrap_or_else(|_| "0.0.0.0:8080".to_string());

        let data_dir = std::env::var("DATA_DIR").unwrap_or_else(|_| "./data".to_string());

        let upload_dir = std::env::var("UPLOAD_DIR").unwrap_or_else(|_| "./uploads".to_string());

        let thumb_dir = std::env::var("THUMB_DIR").unwrap_or_else(|_| "./thumbs".to_string());

        let test_mode = std::env::var("TEST_MODE")
            .map(|v| v == "true" || v == "1")
            .unwrap_or(false);

        let max_upload_size = std::env::var("MAX_UPLOAD_SIZE")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(50 * 1024 * 1024); // 50MB

        let thumbnail_zoom = std::env::var("THUMBNAIL_ZOOM")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(2.0);

        let preview_zoom = std::env::var("PREVIEW_ZOOM")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(1.5);

        let max_preview_pages = std::env::var("MAX_PREVIEW_PAGES")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(3);

        let config = Config {
            server: ServerConfig {
                bind_address,
                data_dir,
            },
            storage: StorageConfig {
                upload_dir,
                thumb_dir,
            },
            preview: PreviewConfig {
                thumbnail_zoom,
                preview_zoom,
                max_preview_pages,
            },
            test_mode,
            max_upload_size,
        };

        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.storage.upload_dir == self.storage.thumb_dir {
            return Err(ConfigError::ValidationError(
                "UPLOAD_DIR and THUMB_DIR must be distinct directories".to_string(),
            ));
        }

        if self.preview.thumbnail_zoom <= 0.0 || self.preview.preview_zoom <= 0.0 {
            return Err(ConfigError::ValidationError(
                "zoom factors must be positive".to_string(),
            ));
        }

        if self.preview.max_preview_pages == 0 {
            return Err(ConfigError::ValidationError(
                "MAX_PREVIEW_PAGES must be at least 1".to_string(),
            ));
        }

        if self.max_upload_size == 0 {
            return Err(ConfigError::ValidationError(
                "MAX_UPLOAD_SIZE must be greater than 0".to_string(),
            ));
        }

        Ok(())
    }
}
