//! PDF rasterization for catalog thumbnails and page previews.
//!
//! Rendering goes through mupdf, which is synchronous -- callers inside the
//! async runtime are expected to wrap these calls in `spawn_blocking`.

use std::io::Cursor;
use std::path::{Path, PathBuf};

use mupdf::{Colorspace, Document, Matrix, Pixmap};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ThumbnailError {
    #[error("document could not be parsed: {0}")]
    Pdf(#[from] mupdf::error::Error),
    #[error("document has no pages")]
    EmptyDocument,
    #[error("page {0} is out of range")]
    PageOutOfRange(i32),
    #[error("pixmap buffer size mismatch")]
    BufferSize,
    #[error("PNG encoding failed: {0}")]
    Encode(#[from] image::ImageError),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Thumbnail not found: {0}")]
    NotFound(String),
}

/// Renders PDF pages to PNG. Persisted thumbnails land in `thumb_dir` under
/// `{stem}_p{page}.png`, so regenerating for the same source and page
/// overwrites rather than accumulates.
#[derive(Clone)]
pub struct Thumbnailer {
    thumb_dir: PathBuf,
    thumbnail_zoom: f32,
    preview_zoom: f32,
}

impl Thumbnailer {
    pub fn new<P: AsRef<Path>>(
        thumb_dir: P,
        thumbnail_zoom: f32,
        preview_zoom: f32,
    ) -> Result<Self, std::io::Error> {
        let thumb_dir = thumb_dir.as_ref().to_path_buf();
        std::fs::create_dir_all(&thumb_dir)?;
        Ok(Self {
            thumb_dir,
            thumbnail_zoom,
            preview_zoom,
        })
    }

    /// Render one page of `pdf` and persist it as a PNG in the thumbnail
    /// directory. Returns the thumbnail filename.
    pub fn generate(
        &self,
        pdf: &[u8],
        stored_name: &str,
        page_index: i32,
    ) -> Result<String, ThumbnailError> {
        let doc = Document::from_bytes(pdf, stored_name)?;
        let page_count = doc.page_count()?;
        if page_count == 0 {
            return Err(ThumbnailError::EmptyDocument);
        }
        if page_index < 0 || page_index >= page_count {
            return Err(ThumbnailError::PageOutOfRange(page_index));
        }

        let png = render_page_png(&doc, page_index, self.thumbnail_zoom)?;
        let name = format!("{}_p{page_index}.png", stem_of(stored_name));
        std::fs::write(self.thumb_dir.join(&name), &png)?;
        Ok(name)
    }

    /// Render up to `max_pages` pages (fewer if the document is shorter) and
    /// return the PNG buffers in page order, without persisting anything.
    pub fn preview_pages(
        &self,
        pdf: &[u8],
        stored_name: &str,
        max_pages: usize,
    ) -> Result<Vec<Vec<u8>>, ThumbnailError> {
        let doc = Document::from_bytes(pdf, stored_name)?;
        let page_count = doc.page_count()?;
        if page_count == 0 {
            return Err(ThumbnailError::EmptyDocument);
        }

        let pages = (page_count as usize).min(max_pages);
        let mut images = Vec::with_capacity(pages);
        for i in 0..pages {
            images.push(render_page_png(&doc, i as i32, self.preview_zoom)?);
        }
        Ok(images)
    }

    pub fn read(&self, thumb_name: &str) -> Result<Vec<u8>, ThumbnailError> {
        let path = self.thumb_dir.join(thumb_name);
        if !path.exists() {
            return Err(ThumbnailError::NotFound(thumb_name.to_string()));
        }
        Ok(std::fs::read(&path)?)
    }

    /// Remove a persisted thumbnail if present. Missing files are ignored.
    pub fn delete(&self, thumb_name: &str) -> Result<(), std::io::Error> {
        let path = self.thumb_dir.join(thumb_name);
        if path.exists() {
            std::fs::remove_file(&path)?;
        }
        Ok(())
    }

    pub fn exists(&self, thumb_name: &str) -> bool {
        self.thumb_dir.join(thumb_name).exists()
    }
}

/// Filename stem used to derive thumbnail names from stored PDF names.
pub fn stem_of(stored_name: &str) -> String {
    Path::new(stored_name)
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| stored_name.to_string())
}

fn render_page_png(doc: &Document, page_index: i32, zoom: f32) -> Result<Vec<u8>, ThumbnailError> {
    let page = doc.load_page(page_index)?;
    let matrix = Matrix::new_scale(zoom, zoom);
    let pixmap = page.to_pixmap(&matrix, &Colorspace::device_rgb(), false, false)?;

    let pixels = pixmap_to_rgb(&pixmap)?;
    let img = image::RgbImage::from_raw(pixmap.width(), pixmap.height(), pixels)
        .ok_or(ThumbnailError::BufferSize)?;

    let mut png = Vec::new();
    img.write_to(&mut Cursor::new(&mut png), image::ImageFormat::Png)?;
    Ok(png)
}

/// Repack the pixmap's samples into a tightly packed RGB buffer, dropping
/// any row padding and extra channels.
fn pixmap_to_rgb(pixmap: &Pixmap) -> Result<Vec<u8>, ThumbnailError> {
    let n = pixmap.n() as usize;
    if n < 3 {
        return Err(ThumbnailError::BufferSize);
    }

    let width = pixmap.width() as usize;
    let height = pixmap.height() as usize;
    let stride = pixmap.stride() as usize;
    let samples = pixmap.samples();
    let row_bytes = width * n;
    if samples.len() < stride.saturating_mul(height) || row_bytes > stride {
        return Err(ThumbnailError::BufferSize);
    }

    let mut out = Vec::with_capacity(width * height * 3);
    for y in 0..height {
        let row = &samples[y * stride..y * stride + row_bytes];
        if n == 3 {
            out.extend_from_slice(row);
        } else {
            for px in row.chunks_exact(n) {
                out.extend_from_slice(&px[..3]);
            }
        }
    }

    Ok(out)
}
