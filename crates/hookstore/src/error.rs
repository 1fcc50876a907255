//! Error types for hookstore

use thiserror::Error;

/// Result type alias using hookstore's Error type
pub type Result<T> = std::result::Result<T, Error>;

/// Failure reported by a secret backend client
pub type BackendError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Store errors
///
/// `List` and `Delete` only ever reach a diagnostic sink during a clean;
/// `Write` and `CreateDirectory` are returned to the caller.
#[derive(Error, Debug)]
pub enum Error {
    /// Listing a path failed
    #[error("failed to list secrets under path {path:?}: {source}")]
    List {
        path: String,
        #[source]
        source: BackendError,
    },

    /// Deleting a leaf secret failed
    #[error("failed to delete secret with path {path:?}: {source}")]
    Delete {
        path: String,
        #[source]
        source: BackendError,
    },

    /// Writing a kubeconfig failed
    #[error("failed to write kubeconfig {name:?} under path {path:?}: {source}")]
    Write {
        path: String,
        name: String,
        #[source]
        source: BackendError,
    },

    /// A landscape directory could not be created
    #[error("failed to create landscape directory {directory:?}: {source}")]
    CreateDirectory {
        directory: String,
        #[source]
        source: BackendError,
    },

    /// The backend client could not be constructed
    #[error("failed to create secret store client: {0}")]
    Client(String),

    /// A kubeconfig secret manifest could not be parsed
    #[error("invalid kubeconfig secret: {0}")]
    InvalidSecret(String),
}

impl Error {
    /// Create a list error
    pub fn list(path: impl Into<String>, source: impl Into<BackendError>) -> Self {
        Self::List {
            path: path.into(),
            source: source.into(),
        }
    }

    /// Create a delete error
    pub fn delete(path: impl Into<String>, source: impl Into<BackendError>) -> Self {
        Self::Delete {
            path: path.into(),
            source: source.into(),
        }
    }

    /// Create a write error
    pub fn write(
        path: impl Into<String>,
        name: impl Into<String>,
        source: impl Into<BackendError>,
    ) -> Self {
        Self::Write {
            path: path.into(),
            name: name.into(),
            source: source.into(),
        }
    }

    /// Create a directory creation error
    pub fn create_directory(
        directory: impl Into<String>,
        source: impl Into<BackendError>,
    ) -> Self {
        Self::CreateDirectory {
            directory: directory.into(),
            source: source.into(),
        }
    }
}
