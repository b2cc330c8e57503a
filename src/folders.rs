//! Folder service: the collaborator consulted before every mutating file
//! operation. `MarkerFolders` is the row-backed implementation that
//! materializes folders as empty-filename sentinel rows in the same table.

use tracing::debug;

use crate::cluster::Session;
use crate::error::FsResult;
use crate::statements::{DELETE_FILE, INSERT_FILE, SELECT_FILE, SELECT_SCOPE};
use crate::types::StoredRow;

/// Answers "does folder X exist" for an owner scope. Implementations decide
/// what existence means; the file store only gates mutations on the answer.
#[allow(async_fn_in_trait)]
pub trait FolderService {
    async fn folder_exists(&self, session: &Session, owner_scope: &str, folder: &str) -> FsResult<bool>;
}

/// Folder management over marker rows: a folder exists when a row with its
/// normalized name and an empty filename is present. The root folder `/`
/// always exists and carries no marker.
#[derive(Debug, Clone, Copy, Default)]
pub struct MarkerFolders;

impl MarkerFolders {
    pub fn new() -> Self {
        MarkerFolders
    }

    /// Create a folder by writing its marker row. Idempotent upsert.
    pub async fn create_folder(&self, session: &Session, owner_scope: &str, folder: &str) -> FsResult<()> {
        if folder == "/" {
            return Ok(());
        }
        let ins = session.prepare(INSERT_FILE)?;
        session.execute(&ins, &[owner_scope, folder, "", ""]).await?;
        debug!("FOLDERS create ok scope={} folder={}", owner_scope, folder);
        Ok(())
    }

    /// Remove a folder's marker row. Files under the folder are untouched.
    pub async fn delete_folder(&self, session: &Session, owner_scope: &str, folder: &str) -> FsResult<()> {
        if folder == "/" {
            return Ok(());
        }
        let del = session.prepare(DELETE_FILE)?;
        session.execute(&del, &[owner_scope, folder, ""]).await?;
        debug!("FOLDERS delete ok scope={} folder={}", owner_scope, folder);
        Ok(())
    }

    /// Enumerate folders known for an owner scope by scanning its partition
    /// for marker rows. Order is not guaranteed.
    pub async fn list_folders(&self, session: &Session, owner_scope: &str) -> FsResult<Vec<String>> {
        let sel = session.prepare(SELECT_SCOPE)?;
        let rows = session.execute(&sel, &[owner_scope]).await?;
        let out = rows
            .iter()
            .filter_map(|r| StoredRow::from_row(owner_scope, r))
            .filter_map(|r| match r {
                StoredRow::FolderMarker { folder, .. } => Some(folder),
                StoredRow::File(_) => None,
            })
            .collect();
        Ok(out)
    }
}

impl FolderService for MarkerFolders {
    async fn folder_exists(&self, session: &Session, owner_scope: &str, folder: &str) -> FsResult<bool> {
        if folder == "/" {
            return Ok(true);
        }
        let sel = session.prepare(SELECT_FILE)?;
        let rows = session.execute(&sel, &[owner_scope, folder, ""]).await?;
        Ok(!rows.is_empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cluster::Cluster;

    #[tokio::test]
    async fn marker_lifecycle() {
        let cluster = Cluster::new("127.0.0.1", None).unwrap();
        let session = cluster.connect("acme_app1").unwrap();
        let folders = MarkerFolders::new();

        assert!(folders.folder_exists(&session, "acme_app1", "/").await.unwrap());
        assert!(!folders.folder_exists(&session, "acme_app1", "/docs/").await.unwrap());

        folders.create_folder(&session, "acme_app1", "/docs/").await.unwrap();
        assert!(folders.folder_exists(&session, "acme_app1", "/docs/").await.unwrap());

        // Creating twice is an upsert, not an error
        folders.create_folder(&session, "acme_app1", "/docs/").await.unwrap();

        let listed = folders.list_folders(&session, "acme_app1").await.unwrap();
        assert_eq!(listed, ["/docs/"]);

        folders.delete_folder(&session, "acme_app1", "/docs/").await.unwrap();
        assert!(!folders.folder_exists(&session, "acme_app1", "/docs/").await.unwrap());
    }
}
