//! Persisted row contracts. A row with an empty filename is a folder marker
//! (an otherwise-empty directory), modelled as its own variant so listing
//! logic cannot accidentally treat it as a file.

use serde::{Deserialize, Serialize};

use crate::cluster::Row;

/// The persisted file entity. Identity is `(cloudlet, folder, filename)`;
/// writes to an existing key overwrite. `content` is always text; binary
/// payloads cross the boundary base64-encoded.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct StoredFile {
    pub cloudlet: String,
    pub folder: String,
    pub filename: String,
    pub content: String,
}

/// Tagged view of a raw `files` row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoredRow {
    File(StoredFile),
    FolderMarker { cloudlet: String, folder: String },
}

impl StoredRow {
    /// Interpret a result row from a partition scan. `cloudlet` is supplied
    /// by the caller since scans do not always project it.
    pub fn from_row(cloudlet: &str, row: &Row) -> Option<StoredRow> {
        let folder = row.get("folder")?.to_string();
        let filename = row.get("filename")?;
        if filename.is_empty() {
            return Some(StoredRow::FolderMarker { cloudlet: cloudlet.to_string(), folder });
        }
        Some(StoredRow::File(StoredFile {
            cloudlet: cloudlet.to_string(),
            folder,
            filename: filename.to_string(),
            content: row.get("content").unwrap_or_default().to_string(),
        }))
    }

    pub fn is_marker(&self) -> bool {
        matches!(self, StoredRow::FolderMarker { .. })
    }

    pub fn into_file(self) -> Option<StoredFile> {
        match self {
            StoredRow::File(f) => Some(f),
            StoredRow::FolderMarker { .. } => None,
        }
    }
}
