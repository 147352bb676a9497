mod common;

use faca_catalog::thumbnail::{stem_of, ThumbnailError, Thumbnailer};

const PNG_MAGIC: &[u8] = &[0x89, b'P', b'N', b'G'];

fn test_thumbnailer() -> (tempfile::TempDir, Thumbnailer) {
    let dir = tempfile::tempdir().unwrap();
    let thumbnailer = Thumbnailer::new(dir.path().join("thumbs"), 2.0, 1.5).unwrap();
    (dir, thumbnailer)
}

#[test]
fn test_generate_writes_png() {
    let (_dir, thumbnailer) = test_thumbnailer();
    let pdf = common::minimal_pdf(2);

    let name = thumbnailer.generate(&pdf, "a1b2c3.pdf", 0).unwrap();
    assert_eq!(name, "a1b2c3_p0.png");
    assert!(thumbnailer.exists(&name));

    let png = thumbnailer.read(&name).unwrap();
    assert_eq!(&png[..4], PNG_MAGIC);
}

#[test]
fn test_generate_is_idempotent_for_same_source_and_page() {
    let (_dir, thumbnailer) = test_thumbnailer();
    let pdf = common::minimal_pdf(1);

    let first = thumbnailer.generate(&pdf, "same.pdf", 0).unwrap();
    let second = thumbnailer.generate(&pdf, "same.pdf", 0).unwrap();
    assert_eq!(first, second);
}

#[test]
fn test_generate_page_out_of_range() {
    let (_dir, thumbnailer) = test_thumbnailer();
    let pdf = common::minimal_pdf(1);

    let err = thumbnailer.generate(&pdf, "short.pdf", 5).unwrap_err();
    assert!(matches!(err, ThumbnailError::PageOutOfRange(5)));
}

#[test]
fn test_generate_rejects_unparseable_input() {
    let (_dir, thumbnailer) = test_thumbnailer();

    // Garbage input must come back as an error, never a panic
    let result = thumbnailer.generate(b"definitely not a pdf", "bogus.pdf", 0);
    assert!(result.is_err());
}

#[test]
fn test_generate_rejects_empty_document() {
    let (_dir, thumbnailer) = test_thumbnailer();
    let pdf = common::minimal_pdf(0);

    assert!(thumbnailer.generate(&pdf, "empty.pdf", 0).is_err());
}

#[test]
fn test_preview_returns_pages_in_order_up_to_cap() {
    let (_dir, thumbnailer) = test_thumbnailer();
    let pdf = common::minimal_pdf(2);

    // Shorter document than the cap: all pages come back
    let pages = thumbnailer.preview_pages(&pdf, "doc.pdf", 3).unwrap();
    assert_eq!(pages.len(), 2);
    for page in &pages {
        assert_eq!(&page[..4], PNG_MAGIC);
    }

    // Cap below the page count limits the output
    let pages = thumbnailer.preview_pages(&pdf, "doc.pdf", 1).unwrap();
    assert_eq!(pages.len(), 1);

    // Previews are not persisted
    assert!(!thumbnailer.exists("doc_p0.png"));
}

#[test]
fn test_preview_rejects_unparseable_input() {
    let (_dir, thumbnailer) = test_thumbnailer();
    assert!(thumbnailer
        .preview_pages(b"garbage", "bogus.pdf", 3)
        .is_err());
}

#[test]
fn test_read_not_found() {
    let (_dir, thumbnailer) = test_thumbnailer();
    assert!(matches!(
        thumbnailer.read("missing.png"),
        Err(ThumbnailError::NotFound(_))
    ));
}

#[test]
fn test_delete_missing_is_ok() {
    let (_dir, thumbnailer) = test_thumbnailer();
    thumbnailer.delete("missing.png").unwrap();
}

#[test]
fn test_stem_of() {
    assert_eq!(stem_of("abc123.pdf"), "abc123");
    assert_eq!(stem_of("noext"), "noext");
}
