use std::path::PathBuf;

use thiserror::Error;

/// Errors surfaced by the catalog.
///
/// The first three variants are validation failures: they are raised before
/// any write reaches the store. Everything else comes from the store or the
/// filesystem and is passed through unchanged.
#[derive(Error, Debug)]
pub enum CatalogError {
    #[error("Missing required field: {0}")]
    MissingField(&'static str),

    #[error("Folder does not exist: {}", .0.display())]
    FolderNotFound(PathBuf),

    #[error("Update contains no fields")]
    EmptyUpdate,

    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Configuration error: {0}")]
    Config(String),
}

impl CatalogError {
    /// True for errors caused by caller input rather than the environment.
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            CatalogError::MissingField(_) | CatalogError::FolderNotFound(_) | CatalogError::EmptyUpdate
        )
    }
}

pub type Result<T> = std::result::Result<T, CatalogError>;
