//! Catalog source module.
//!
//! This module defines where raw catalog documents come from. The
//! `CatalogSource` trait abstracts the origin of the document so the catalog
//! store can be loaded from a file on disk, an embedded string in tests, or
//! any other backend without changing the loader.

use async_trait::async_trait;
use std::path::PathBuf;
use thiserror::Error;

pub mod json;

pub use json::{InlineSource, JsonFileSource};

/// Errors that can occur when reading a catalog document.
#[derive(Debug, Error)]
pub enum ProviderError {
    /// The catalog document does not exist
    #[error("Component catalog not found: {}", .0.display())]
    NotFound(PathBuf),

    /// Failed to read from the data source
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

/// Result type for source operations.
pub type ProviderResult<T> = Result<T, ProviderError>;

/// Trait for sourcing raw catalog documents.
///
/// Implementations only fetch the document text; parsing and validation
/// happen in the catalog store so every source gets the same guarantees.
#[async_trait]
pub trait CatalogSource: Send + Sync {
    /// Read the full catalog document.
    ///
    /// # Errors
    /// Returns `ProviderError` if the document is missing or unreadable
    async fn read_document(&self) -> ProviderResult<String>;

    /// Get a human-readable name of this source, for logging.
    fn name(&self) -> &str;
}
