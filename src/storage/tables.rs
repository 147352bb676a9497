use redb::TableDefinition;

/// Catalog records: id -> FacaRecord (msgpack)
pub const FACAS: TableDefinition<u64, &[u8]> = TableDefinition::new("facas");

/// Unique-name index: name -> id (duplicate checks, rename maintenance)
pub const FACA_NAMES: TableDefinition<&str, u64> = TableDefinition::new("faca_names");

/// Stored-PDF index: pdf_filename -> id
pub const FACA_PDFS: TableDefinition<&str, u64> = TableDefinition::new("faca_pdfs");

/// Single-row metadata: currently only the id sequence counter
pub const META: TableDefinition<&str, u64> = TableDefinition::new("meta");

/// Key in `META` holding the last assigned catalog id.
pub const LAST_ID_KEY: &str = "last_faca_id";
