//! Error handling for milspec-labels
//!
//! This module provides unified error handling using anyhow for better error propagation
//! and context information throughout the application.

use anyhow::Context;
use std::path::Path;

pub type Result<T> = anyhow::Result<T>;

/// Extension trait for Results to add context with file paths
pub trait ResultExt<T> {
    /// Add context with file path information
    fn with_path_context<P: AsRef<Path>>(self, operation: &str, path: P) -> Result<T>;
}

impl<T, E> ResultExt<T> for std::result::Result<T, E>
where
    E: Into<anyhow::Error> + Send + Sync + 'static,
{
    fn with_path_context<P: AsRef<Path>>(self, operation: &str, path: P) -> Result<T> {
        self.map_err(|e| e.into())
            .with_context(|| format!("Failed to {} file: {}", operation, path.as_ref().display()))
    }
}

/// Specific error types for label generation
#[derive(Debug, thiserror::Error)]
pub enum LabelError {
    #[error("Input data is missing required columns: {columns:?}")]
    MissingColumns { columns: Vec<String> },

    #[error("Input data contains no rows")]
    EmptyInput,

    #[error("Unknown label size: {key}")]
    UnknownSize { key: String },

    #[error("Unsupported output format: {format}")]
    UnsupportedFormat { format: String },

    #[error("No usable TrueType font found (searched {searched} locations)")]
    FontUnavailable { searched: usize },

    #[error("Product catalog is empty or unreadable: {path}")]
    CatalogUnreadable { path: String },

    #[error("Product id already exists in catalog: {id}")]
    DuplicateProduct { id: String },
}
