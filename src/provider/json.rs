//! JSON catalog sources.

use async_trait::async_trait;
use std::path::PathBuf;
use tracing::debug;

use super::{CatalogSource, ProviderError, ProviderResult};

/// Catalog document stored as a JSON file on disk.
#[derive(Debug, Clone)]
pub struct JsonFileSource {
    path: PathBuf,
    name: String,
}

impl JsonFileSource {
    /// Create a source reading from `path`. The file is not touched until
    /// [`CatalogSource::read_document`] is called.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let name = path.display().to_string();
        Self { path, name }
    }
}

#[async_trait]
impl CatalogSource for JsonFileSource {
    async fn read_document(&self) -> ProviderResult<String> {
        debug!("Reading catalog document from {}", self.path.display());

        match tokio::fs::read_to_string(&self.path).await {
            Ok(text) => Ok(text),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                Err(ProviderError::NotFound(self.path.clone()))
            }
            Err(e) => Err(ProviderError::IoError(e)),
        }
    }

    fn name(&self) -> &str {
        &self.name
    }
}

/// Catalog document held in memory.
#[derive(Debug, Clone)]
pub struct InlineSource {
    document: String,
}

impl InlineSource {
    pub fn new(document: impl Into<String>) -> Self {
        Self {
            document: document.into(),
        }
    }
}

#[async_trait]
impl CatalogSource for InlineSource {
    async fn read_document(&self) -> ProviderResult<String> {
        Ok(self.document.clone())
    }

    fn name(&self) -> &str {
        "inline"
    }
}
