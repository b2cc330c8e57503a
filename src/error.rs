//! Unified error model for the file store.
//! Domain errors (`FolderNotFound`, `FileNotFound`, `Decode`) and transport
//! errors (`Connectivity`, `Query`) surface synchronously to the caller;
//! nothing is retried or suppressed inside this crate.

use std::fmt::{Display, Formatter};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FsError {
    /// Cluster unreachable or a query could not be executed against it.
    Connectivity { message: String },
    /// A mutating operation targeted a folder the folder service does not know.
    FolderNotFound { folder: String },
    /// No row at the exact key on load, copy-source or move-source.
    FileNotFound { path: String },
    /// Binary load against content that is not valid base64.
    Decode { message: String },
    /// Malformed query text or a statement used against the wrong key shape.
    Query { message: String },
}

impl FsError {
    pub fn connectivity<S: Into<String>>(msg: S) -> Self {
        FsError::Connectivity { message: msg.into() }
    }
    pub fn folder_not_found<S: Into<String>>(folder: S) -> Self {
        FsError::FolderNotFound { folder: folder.into() }
    }
    pub fn file_not_found<S: Into<String>>(path: S) -> Self {
        FsError::FileNotFound { path: path.into() }
    }
    pub fn decode<S: Into<String>>(msg: S) -> Self {
        FsError::Decode { message: msg.into() }
    }
    pub fn query<S: Into<String>>(msg: S) -> Self {
        FsError::Query { message: msg.into() }
    }

    pub fn code_str(&self) -> &'static str {
        match self {
            FsError::Connectivity { .. } => "connectivity",
            FsError::FolderNotFound { .. } => "folder_not_found",
            FsError::FileNotFound { .. } => "file_not_found",
            FsError::Decode { .. } => "decode_error",
            FsError::Query { .. } => "query_error",
        }
    }

    pub fn message(&self) -> &str {
        match self {
            FsError::Connectivity { message }
            | FsError::Decode { message }
            | FsError::Query { message } => message.as_str(),
            FsError::FolderNotFound { folder } => folder.as_str(),
            FsError::FileNotFound { path } => path.as_str(),
        }
    }
}

impl Display for FsError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.code_str(), self.message())
    }
}

impl std::error::Error for FsError {}

pub type FsResult<T> = Result<T, FsError>;
