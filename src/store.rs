//! File store operations: the public CRUD/listing API over the `files`
//! table. Every operation acquires its own session and releases it on every
//! exit path; mutations are gated on the folder service before any write.

use std::sync::Arc;

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use tracing::debug;

use crate::cluster::Session;
use crate::config::StoreConfig;
use crate::error::{FsError, FsResult};
use crate::folders::{FolderService, MarkerFolders};
use crate::paths::{normalize_folder, RootFolder};
use crate::registry::ClusterRegistry;
use crate::statements::{DELETE_FILE, INSERT_FILE, SELECT_FILE, SELECT_FOLDER};
use crate::types::StoredRow;

/// Virtual hierarchical file store for one tenant/cloudlet root.
///
/// Operations are independently asynchronous; there is no operation-level
/// locking or transaction, so concurrent writers to the same key race and
/// the last completed write wins.
pub struct FileStore<F: FolderService = MarkerFolders> {
    config: StoreConfig,
    root: RootFolder,
    registry: Arc<ClusterRegistry>,
    folders: F,
}

impl FileStore<MarkerFolders> {
    pub fn new(config: StoreConfig, root: RootFolder, registry: Arc<ClusterRegistry>) -> Self {
        Self::with_folder_service(config, root, registry, MarkerFolders::new())
    }

    /// Create a folder under this root, e.g. `/acme/app1/docs/`.
    pub async fn create_folder(&self, folder_path: &str) -> FsResult<()> {
        let folder = normalize_folder(&self.root.relative_path(folder_path));
        let session = self.session()?;
        self.folders.create_folder(&session, &self.root.owner_scope(), &folder).await
    }

    /// Remove a folder's marker. Files under it are untouched.
    pub async fn delete_folder(&self, folder_path: &str) -> FsResult<()> {
        let folder = normalize_folder(&self.root.relative_path(folder_path));
        let session = self.session()?;
        self.folders.delete_folder(&session, &self.root.owner_scope(), &folder).await
    }

    /// Enumerate folders under this root as fully-qualified paths.
    pub async fn list_folders(&self) -> FsResult<Vec<String>> {
        let session = self.session()?;
        let folders = self.folders.list_folders(&session, &self.root.owner_scope()).await?;
        Ok(folders.into_iter().map(|f| format!("{}{}", self.root.prefix(), f)).collect())
    }
}

impl<F: FolderService> FileStore<F> {
    pub fn with_folder_service(
        config: StoreConfig,
        root: RootFolder,
        registry: Arc<ClusterRegistry>,
        folders: F,
    ) -> Self {
        Self { config, root, registry, folders }
    }

    pub fn root(&self) -> &RootFolder {
        &self.root
    }

    pub fn config(&self) -> &StoreConfig {
        &self.config
    }

    fn session(&self) -> FsResult<Session> {
        self.registry.acquire_session(&self.config, &self.root.owner_scope())
    }

    async fn fetch(
        &self,
        session: &Session,
        folder: &str,
        filename: &str,
    ) -> FsResult<Option<String>> {
        let sel = session.prepare(SELECT_FILE)?;
        let rows = session
            .execute(&sel, &[&self.root.owner_scope(), folder, filename])
            .await?;
        Ok(rows.first().map(|r| r.get("content").unwrap_or_default().to_string()))
    }

    async fn put(
        &self,
        session: &Session,
        folder: &str,
        filename: &str,
        content: &str,
    ) -> FsResult<()> {
        let ins = session.prepare(INSERT_FILE)?;
        session
            .execute(&ins, &[&self.root.owner_scope(), folder, filename, content])
            .await?;
        Ok(())
    }

    async fn require_folder(&self, session: &Session, folder: &str) -> FsResult<()> {
        let exists = self
            .folders
            .folder_exists(session, &self.root.owner_scope(), folder)
            .await?;
        if exists {
            Ok(())
        } else {
            Err(FsError::folder_not_found(folder))
        }
    }

    /// True iff a row exists at the exact key for `path`.
    pub async fn exists(&self, path: &str) -> FsResult<bool> {
        let (folder, filename) = self.root.break_down(path);
        let session = self.session()?;
        Ok(self.fetch(&session, &folder, &filename).await?.is_some())
    }

    /// Load text content. Fails with `FileNotFound` when no row exists.
    pub async fn load(&self, path: &str) -> FsResult<String> {
        let (folder, filename) = self.root.break_down(path);
        let session = self.session()?;
        self.fetch(&session, &folder, &filename)
            .await?
            .ok_or_else(|| FsError::file_not_found(path))
    }

    /// Load binary content written via `save_bytes`. Fails with a decode
    /// error when the stored content is not valid base64.
    pub async fn load_binary(&self, path: &str) -> FsResult<Vec<u8>> {
        let content = self.load(path).await?;
        BASE64
            .decode(content.as_bytes())
            .map_err(|e| FsError::decode(format!("{}: {}", path, e)))
    }

    /// Upsert text content at `path`. The destination folder must exist;
    /// on `FolderNotFound` nothing is written.
    pub async fn save(&self, path: &str, content: &str) -> FsResult<()> {
        let (folder, filename) = self.root.break_down(path);
        let session = self.session()?;
        self.require_folder(&session, &folder).await?;
        self.put(&session, &folder, &filename, content).await?;
        debug!(
            "FILESTORE save ok scope={} folder={} file={} bytes={}",
            self.root.owner_scope(),
            folder,
            filename,
            content.len()
        );
        Ok(())
    }

    /// Upsert binary content at `path`, base64-encoded at the boundary.
    pub async fn save_bytes(&self, path: &str, bytes: &[u8]) -> FsResult<()> {
        self.save(path, &BASE64.encode(bytes)).await
    }

    /// Delete the row at `path`. Idempotent; deleting a missing file is not
    /// an error.
    pub async fn delete(&self, path: &str) -> FsResult<()> {
        let (folder, filename) = self.root.break_down(path);
        let session = self.session()?;
        let del = session.prepare(DELETE_FILE)?;
        session
            .execute(&del, &[&self.root.owner_scope(), &folder, &filename])
            .await?;
        debug!(
            "FILESTORE delete ok scope={} folder={} file={}",
            self.root.owner_scope(),
            folder,
            filename
        );
        Ok(())
    }

    /// Copy `source` to `destination`, leaving the source untouched. The
    /// destination folder must exist and the source must be present.
    pub async fn copy(&self, source: &str, destination: &str) -> FsResult<()> {
        let (dst_folder, dst_file) = self.root.break_down(destination);
        let (src_folder, src_file) = self.root.break_down(source);
        let session = self.session()?;
        self.require_folder(&session, &dst_folder).await?;
        let content = self
            .fetch(&session, &src_folder, &src_file)
            .await?
            .ok_or_else(|| FsError::file_not_found(source))?;
        self.put(&session, &dst_folder, &dst_file, &content).await?;
        debug!("FILESTORE copy ok {} -> {}", source, destination);
        Ok(())
    }

    /// Move `source` to `destination`. Non-atomic: the destination is
    /// written before the source is deleted, so an interruption leaves a
    /// duplicate rather than losing data.
    pub async fn move_file(&self, source: &str, destination: &str) -> FsResult<()> {
        let (dst_folder, dst_file) = self.root.break_down(destination);
        let (src_folder, src_file) = self.root.break_down(source);
        let session = self.session()?;
        self.require_folder(&session, &dst_folder).await?;
        let content = self
            .fetch(&session, &src_folder, &src_file)
            .await?
            .ok_or_else(|| FsError::file_not_found(source))?;
        self.put(&session, &dst_folder, &dst_file, &content).await?;
        let del = session.prepare(DELETE_FILE)?;
        session
            .execute(&del, &[&self.root.owner_scope(), &src_folder, &src_file])
            .await?;
        debug!("FILESTORE move ok {} -> {}", source, destination);
        Ok(())
    }

    /// List files directly under `folder_path` as fully-qualified paths,
    /// optionally keeping only filenames ending with `extension`. Folder
    /// markers are excluded. Order is not guaranteed.
    pub async fn list_files(
        &self,
        folder_path: &str,
        extension: Option<&str>,
    ) -> FsResult<Vec<String>> {
        let folder = normalize_folder(&self.root.relative_path(folder_path));
        let session = self.session()?;
        self.require_folder(&session, &folder).await?;
        let sel = session.prepare(SELECT_FOLDER)?;
        let scope = self.root.owner_scope();
        let rows = session.execute(&sel, &[&scope, &folder]).await?;
        let out: Vec<String> = rows
            .iter()
            .filter_map(|r| StoredRow::from_row(&scope, r))
            .filter_map(StoredRow::into_file)
            .filter(|f| extension.map(|ext| f.filename.ends_with(ext)).unwrap_or(true))
            .map(|f| self.root.qualify(&f.folder, &f.filename))
            .collect();
        debug!(
            "FILESTORE list ok scope={} folder={} matches={}",
            scope,
            folder,
            out.len()
        );
        Ok(out)
    }
}

#[cfg(test)]
#[path = "store_tests.rs"]
mod store_tests;
