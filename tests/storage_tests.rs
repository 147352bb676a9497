use chrono::{Duration, Utc};
use faca_catalog::storage::models::{AssetInfo, NewFaca};
use faca_catalog::storage::{Database, DatabaseError};

fn test_db() -> (tempfile::TempDir, Database) {
    let dir = tempfile::tempdir().unwrap();
    let db = Database::open(dir.path().join("data")).unwrap();
    (dir, db)
}

fn sample_faca(name: &str, pdf_stored: &str) -> NewFaca {
    NewFaca {
        name: name.to_string(),
        description: None,
        pdf: AssetInfo {
            stored_name: pdf_stored.to_string(),
            original_name: "modelo.pdf".to_string(),
        },
        cdr: None,
        thumb: Some(format!("{}_p0.png", pdf_stored.trim_end_matches(".pdf"))),
        uploaded_at: Utc::now(),
    }
}

#[test]
fn test_create_and_get() {
    let (_dir, db) = test_db();
    let mut new = sample_faca("Faca Cartão 295", "a1.pdf");
    new.description = Some("canto arredondado".to_string());
    new.cdr = Some(AssetInfo {
        stored_name: "a1.cdr".to_string(),
        original_name: "cartao295.cdr".to_string(),
    });

    let record = db.create_faca(new).unwrap();
    assert_eq!(record.id, 1);

    let retrieved = db.get_faca(record.id).unwrap().expect("faca should exist");
    assert_eq!(retrieved.name, "Faca Cartão 295");
    assert_eq!(retrieved.description, Some("canto arredondado".to_string()));
    assert_eq!(retrieved.pdf_filename, "a1.pdf");
    assert_eq!(retrieved.pdf_original_name, "modelo.pdf");
    assert_eq!(retrieved.cdr_filename, Some("a1.cdr".to_string()));
    assert_eq!(retrieved.thumb, Some("a1_p0.png".to_string()));
}

#[test]
fn test_get_not_found() {
    let (_dir, db) = test_db();
    assert!(db.get_faca(42).unwrap().is_none());
}

#[test]
fn test_ids_are_monotonic_even_after_delete() {
    let (_dir, db) = test_db();
    let a = db.create_faca(sample_faca("a", "a.pdf")).unwrap();
    let b = db.create_faca(sample_faca("b", "b.pdf")).unwrap();
    assert!(b.id > a.id);

    db.delete_faca(b.id).unwrap();
    let c = db.create_faca(sample_faca("c", "c.pdf")).unwrap();
    assert!(c.id > b.id, "deleted ids must not be reassigned");
}

#[test]
fn test_create_duplicate_name_fails() {
    let (_dir, db) = test_db();
    db.create_faca(sample_faca("Faca 90x50", "x1.pdf")).unwrap();

    let err = db
        .create_faca(sample_faca("Faca 90x50", "x2.pdf"))
        .unwrap_err();
    assert!(matches!(err, DatabaseError::DuplicateName(_)));
    assert!(err.is_duplicate());

    // Nothing was inserted
    assert_eq!(db.list_facas("").unwrap().len(), 1);
    assert!(!db.pdf_exists("x2.pdf").unwrap());
}

#[test]
fn test_create_duplicate_pdf_fails() {
    let (_dir, db) = test_db();
    db.create_faca(sample_faca("first", "shared.pdf")).unwrap();

    let err = db
        .create_faca(sample_faca("second", "shared.pdf"))
        .unwrap_err();
    assert!(matches!(err, DatabaseError::DuplicatePdf(_)));
    assert_eq!(db.list_facas("").unwrap().len(), 1);
    assert!(!db.name_exists("second").unwrap());
}

#[test]
fn test_list_orders_newest_first() {
    let (_dir, db) = test_db();
    let base = Utc::now();

    let mut older = sample_faca("older", "o.pdf");
    older.uploaded_at = base - Duration::hours(2);
    let mut newer = sample_faca("newer", "n.pdf");
    newer.uploaded_at = base;
    let mut middle = sample_faca("middle", "m.pdf");
    middle.uploaded_at = base - Duration::hours(1);

    db.create_faca(older).unwrap();
    db.create_faca(newer).unwrap();
    db.create_faca(middle).unwrap();

    let names: Vec<String> = db
        .list_facas("")
        .unwrap()
        .into_iter()
        .map(|f| f.name)
        .collect();
    assert_eq!(names, vec!["newer", "middle", "older"]);
}

#[test]
fn test_list_search_is_substring_and_case_insensitive() {
    let (_dir, db) = test_db();
    let mut caixa = sample_faca("Faca Caixa Grande", "c1.pdf");
    caixa.description = Some("para papelão ondulado".to_string());
    db.create_faca(caixa).unwrap();
    db.create_faca(sample_faca("Faca Cartão", "c2.pdf")).unwrap();

    // Substring of the name, different case
    let hits = db.list_facas("caixa").unwrap();
    assert_eq!(hits.len(), 1);
    assert_eq!(hits[0].name, "Faca Caixa Grande");

    // Substring of the description
    let hits = db.list_facas("ondulado").unwrap();
    assert_eq!(hits.len(), 1);

    // Shared substring matches both
    assert_eq!(db.list_facas("faca").unwrap().len(), 2);

    // No match
    assert!(db.list_facas("etiqueta").unwrap().is_empty());

    // Empty term returns everything
    assert_eq!(db.list_facas("").unwrap().len(), 2);
}

#[test]
fn test_update_without_assets_keeps_files_and_timestamp() {
    let (_dir, db) = test_db();
    let mut new = sample_faca("original", "keep.pdf");
    new.cdr = Some(AssetInfo {
        stored_name: "keep.cdr".to_string(),
        original_name: "fonte.cdr".to_string(),
    });
    let created = db.create_faca(new).unwrap();

    let previous = db
        .update_faca(created.id, "renamed", Some("nova descrição"), None, None, None)
        .unwrap()
        .expect("entry should exist");
    assert_eq!(previous.name, "original");

    let updated = db.get_faca(created.id).unwrap().unwrap();
    assert_eq!(updated.name, "renamed");
    assert_eq!(updated.description, Some("nova descrição".to_string()));
    assert_eq!(updated.pdf_filename, "keep.pdf");
    assert_eq!(updated.cdr_filename, Some("keep.cdr".to_string()));
    assert_eq!(updated.thumb, Some("keep_p0.png".to_string()));
    assert_eq!(updated.uploaded_at, created.uploaded_at);

    // Name index follows the rename
    assert!(db.name_exists("renamed").unwrap());
    assert!(!db.name_exists("original").unwrap());
}

#[test]
fn test_update_replaces_pdf_and_maintains_index() {
    let (_dir, db) = test_db();
    let created = db.create_faca(sample_faca("faca", "old.pdf")).unwrap();

    let replacement = AssetInfo {
        stored_name: "new.pdf".to_string(),
        original_name: "v2.pdf".to_string(),
    };
    let previous = db
        .update_faca(
            created.id,
            "faca",
            None,
            Some(&replacement),
            None,
            Some(Some("new_p0.png")),
        )
        .unwrap()
        .unwrap();
    assert_eq!(previous.pdf_filename, "old.pdf");

    let updated = db.get_faca(created.id).unwrap().unwrap();
    assert_eq!(updated.pdf_filename, "new.pdf");
    assert_eq!(updated.pdf_original_name, "v2.pdf");
    assert_eq!(updated.thumb, Some("new_p0.png".to_string()));

    assert!(db.pdf_exists("new.pdf").unwrap());
    assert!(!db.pdf_exists("old.pdf").unwrap());
}

#[test]
fn test_update_rename_collision_fails() {
    let (_dir, db) = test_db();
    db.create_faca(sample_faca("taken", "t.pdf")).unwrap();
    let other = db.create_faca(sample_faca("other", "u.pdf")).unwrap();

    let err = db
        .update_faca(other.id, "taken", None, None, None, None)
        .unwrap_err();
    assert!(matches!(err, DatabaseError::DuplicateName(_)));

    // The failed update left the record untouched
    let unchanged = db.get_faca(other.id).unwrap().unwrap();
    assert_eq!(unchanged.name, "other");
    assert!(db.name_exists("other").unwrap());
}

#[test]
fn test_update_can_clear_thumb() {
    let (_dir, db) = test_db();
    let created = db.create_faca(sample_faca("faca", "f.pdf")).unwrap();

    db.update_faca(created.id, "faca", None, None, None, Some(None))
        .unwrap()
        .unwrap();

    let updated = db.get_faca(created.id).unwrap().unwrap();
    assert_eq!(updated.thumb, None);
}

#[test]
fn test_update_not_found() {
    let (_dir, db) = test_db();
    assert!(db
        .update_faca(99, "ghost", None, None, None, None)
        .unwrap()
        .is_none());
}

#[test]
fn test_delete_returns_record_and_cleans_indexes() {
    let (_dir, db) = test_db();
    let mut new = sample_faca("to delete", "d.pdf");
    new.cdr = Some(AssetInfo {
        stored_name: "d.cdr".to_string(),
        original_name: "fonte.cdr".to_string(),
    });
    let created = db.create_faca(new).unwrap();

    let removed = db
        .delete_faca(created.id)
        .unwrap()
        .expect("entry should exist");
    assert_eq!(removed.pdf_filename, "d.pdf");
    assert_eq!(removed.cdr_filename, Some("d.cdr".to_string()));

    assert!(db.get_faca(created.id).unwrap().is_none());
    assert!(!db.name_exists("to delete").unwrap());
    assert!(!db.pdf_exists("d.pdf").unwrap());
}

#[test]
fn test_delete_not_found_is_noop() {
    let (_dir, db) = test_db();
    assert!(db.delete_faca(7).unwrap().is_none());
}

#[test]
fn test_purge_all() {
    let (_dir, db) = test_db();
    db.create_faca(sample_faca("p1", "p1.pdf")).unwrap();
    db.create_faca(sample_faca("p2", "p2.pdf")).unwrap();

    let stats = db.purge_all().unwrap();
    assert_eq!(stats.facas, 2);

    assert!(db.list_facas("").unwrap().is_empty());
    assert!(!db.name_exists("p1").unwrap());
    assert!(!db.pdf_exists("p2.pdf").unwrap());

    // Purge keeps the sequence, so new entries still get fresh ids
    let next = db.create_faca(sample_faca("p3", "p3.pdf")).unwrap();
    assert!(next.id > 2);
}
