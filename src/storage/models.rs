use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Stored and user-facing names of an uploaded asset.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssetInfo {
    pub stored_name: String,
    pub original_name: String,
}

/// A catalog entry stored in redb: one physical die-cutting template.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FacaRecord {
    /// Monotonically assigned by the repository, never reused.
    pub id: u64,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,

    /// Generated on-disk name of the primary PDF asset
    pub pdf_filename: String,
    pub pdf_original_name: String,

    // Optional secondary vector asset (CDR or similar)
    #[serde(default)]
    pub cdr_filename: Option<String>,
    #[serde(default)]
    pub cdr_original_name: Option<String>,

    /// PNG preview filename, `None` when generation failed. Derived data:
    /// regenerable from `pdf_filename` on demand.
    #[serde(default)]
    pub thumb: Option<String>,

    /// Set once at creation, never mutated.
    pub uploaded_at: DateTime<Utc>,
}

impl FacaRecord {
    /// Case-insensitive substring match against name and description.
    pub fn matches(&self, term: &str) -> bool {
        if term.is_empty() {
            return true;
        }
        let term = term.to_lowercase();
        if self.name.to_lowercase().contains(&term) {
            return true;
        }
        self.description
            .as_deref()
            .is_some_and(|d| d.to_lowercase().contains(&term))
    }
}

/// Fields for a new catalog entry; the repository assigns the id.
#[derive(Debug, Clone)]
pub struct NewFaca {
    pub name: String,
    pub description: Option<String>,
    pub pdf: AssetInfo,
    pub cdr: Option<AssetInfo>,
    pub thumb: Option<String>,
    pub uploaded_at: DateTime<Utc>,
}
