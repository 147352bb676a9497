use redb::ReadableTable;

use super::db::{Database, DatabaseError};
use super::models::{AssetInfo, FacaRecord, NewFaca};
use super::tables::*;

impl Database {
    // ========================================================================
    // Catalog operations
    // ========================================================================

    /// Insert a new catalog entry, assigning the next id. Fails with a
    /// duplicate error if the name or the stored PDF filename is already
    /// present; the check and the insert share one write transaction, so
    /// the duplicate check cannot race another writer.
    pub fn create_faca(&self, new: NewFaca) -> Result<FacaRecord, DatabaseError> {
        debug_assert!(!new.name.is_empty(), "faca name must not be empty");
        debug_assert!(
            !new.pdf.stored_name.is_empty(),
            "stored PDF name must not be empty"
        );

        let write_txn = self.begin_write()?;
        let record = {
            let mut facas = write_txn.open_table(FACAS)?;
            let mut names = write_txn.open_table(FACA_NAMES)?;
            let mut pdfs = write_txn.open_table(FACA_PDFS)?;
            let mut meta = write_txn.open_table(META)?;

            if names.get(new.name.as_str())?.is_some() {
                return Err(DatabaseError::DuplicateName(new.name));
            }
            if pdfs.get(new.pdf.stored_name.as_str())?.is_some() {
                return Err(DatabaseError::DuplicatePdf(new.pdf.stored_name));
            }

            // Ids come from a persisted sequence, so they stay monotonic
            // even after deletes.
            let id = meta.get(LAST_ID_KEY)?.map(|v| v.value()).unwrap_or(0) + 1;
            meta.insert(LAST_ID_KEY, id)?;

            let record = FacaRecord {
                id,
                name: new.name,
                description: new.description,
                pdf_filename: new.pdf.stored_name,
                pdf_original_name: new.pdf.original_name,
                cdr_filename: new.cdr.as_ref().map(|c| c.stored_name.clone()),
                cdr_original_name: new.cdr.map(|c| c.original_name),
                thumb: new.thumb,
                uploaded_at: new.uploaded_at,
            };

            let data = rmp_serde::to_vec_named(&record)?;
            facas.insert(id, data.as_slice())?;
            names.insert(record.name.as_str(), id)?;
            pdfs.insert(record.pdf_filename.as_str(), id)?;
            record
        };
        write_txn.commit()?;
        Ok(record)
    }

    /// Get a catalog entry by id
    pub fn get_faca(&self, id: u64) -> Result<Option<FacaRecord>, DatabaseError> {
        let read_txn = self.begin_read()?;
        let table = read_txn.open_table(FACAS)?;

        match table.get(id)? {
            Some(data) => {
                let faca: FacaRecord = rmp_serde::from_slice(data.value())?;
                Ok(Some(faca))
            }
            None => Ok(None),
        }
    }

    /// List catalog entries, newest first. A non-empty `search` keeps only
    /// entries whose name or description contains the term as a
    /// case-insensitive substring.
    pub fn list_facas(&self, search: &str) -> Result<Vec<FacaRecord>, DatabaseError> {
        let read_txn = self.begin_read()?;
        let table = read_txn.open_table(FACAS)?;

        let mut facas = Vec::new();
        for result in table.iter()? {
            let (_, value) = result?;
            let faca: FacaRecord = rmp_serde::from_slice(value.value())?;
            if faca.matches(search) {
                facas.push(faca);
            }
        }

        facas.sort_by(|a, b| {
            b.uploaded_at
                .cmp(&a.uploaded_at)
                .then_with(|| b.id.cmp(&a.id))
        });
        Ok(facas)
    }

    /// Update a catalog entry. Name and description are always overwritten;
    /// `pdf`, `cdr` and `thumb` only when supplied (`thumb` takes the
    /// nested-Option form so a failed regeneration can clear it).
    ///
    /// Returns the previous record so the caller can delete replaced asset
    /// files, or `None` if the id does not exist.
    pub fn update_faca(
        &self,
        id: u64,
        name: &str,
        description: Option<&str>,
        pdf: Option<&AssetInfo>,
        cdr: Option<&AssetInfo>,
        thumb: Option<Option<&str>>,
    ) -> Result<Option<FacaRecord>, DatabaseError> {
        let write_txn = self.begin_write()?;

        let existing = {
            let table = write_txn.open_table(FACAS)?;
            let result = match table.get(id)? {
                Some(data) => Some(rmp_serde::from_slice::<FacaRecord>(data.value())?),
                None => None,
            };
            result
        };

        let previous = match existing {
            Some(prev) => {
                let mut faca = prev.clone();
                faca.name = name.to_string();
                faca.description = description.map(|s| s.to_string());

                if name != prev.name {
                    let mut names = write_txn.open_table(FACA_NAMES)?;
                    if names.get(name)?.is_some() {
                        return Err(DatabaseError::DuplicateName(name.to_string()));
                    }
                    names.remove(prev.name.as_str())?;
                    names.insert(name, id)?;
                }

                if let Some(new_pdf) = pdf {
                    if new_pdf.stored_name != prev.pdf_filename {
                        let mut pdfs = write_txn.open_table(FACA_PDFS)?;
                        if pdfs.get(new_pdf.stored_name.as_str())?.is_some() {
                            return Err(DatabaseError::DuplicatePdf(
                                new_pdf.stored_name.clone(),
                            ));
                        }
                        pdfs.remove(prev.pdf_filename.as_str())?;
                        pdfs.insert(new_pdf.stored_name.as_str(), id)?;
                    }
                    faca.pdf_filename = new_pdf.stored_name.clone();
                    faca.pdf_original_name = new_pdf.original_name.clone();
                }

                if let Some(new_cdr) = cdr {
                    faca.cdr_filename = Some(new_cdr.stored_name.clone());
                    faca.cdr_original_name = Some(new_cdr.original_name.clone());
                }

                if let Some(new_thumb) = thumb {
                    faca.thumb = new_thumb.map(|s| s.to_string());
                }

                let serialized = rmp_serde::to_vec_named(&faca)?;
                let mut table = write_txn.open_table(FACAS)?;
                table.insert(id, serialized.as_slice())?;
                Some(prev)
            }
            None => None,
        };

        write_txn.commit()?;
        Ok(previous)
    }

    /// Delete a catalog entry and its index entries. Returns the removed
    /// record so the caller can clean up its files; `None` (not an error)
    /// when the id does not exist.
    pub fn delete_faca(&self, id: u64) -> Result<Option<FacaRecord>, DatabaseError> {
        let write_txn = self.begin_write()?;

        let record = {
            let table = write_txn.open_table(FACAS)?;
            let result = match table.get(id)? {
                Some(data) => Some(rmp_serde::from_slice::<FacaRecord>(data.value())?),
                None => None,
            };
            result
        };

        let removed = match record {
            Some(record) => {
                {
                    let mut table = write_txn.open_table(FACAS)?;
                    table.remove(id)?;
                }
                {
                    let mut names = write_txn.open_table(FACA_NAMES)?;
                    names.remove(record.name.as_str())?;
                }
                {
                    let mut pdfs = write_txn.open_table(FACA_PDFS)?;
                    pdfs.remove(record.pdf_filename.as_str())?;
                }
                Some(record)
            }
            None => None,
        };

        write_txn.commit()?;
        Ok(removed)
    }

    /// Check if a name is already in use
    pub fn name_exists(&self, name: &str) -> Result<bool, DatabaseError> {
        let read_txn = self.begin_read()?;
        let table = read_txn.open_table(FACA_NAMES)?;
        Ok(table.get(name)?.is_some())
    }

    /// Check if a stored PDF filename is already cataloged
    pub fn pdf_exists(&self, stored_name: &str) -> Result<bool, DatabaseError> {
        let read_txn = self.begin_read()?;
        let table = read_txn.open_table(FACA_PDFS)?;
        Ok(table.get(stored_name)?.is_some())
    }
}
