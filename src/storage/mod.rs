//! Catalog store.
//!
//! The store owns every component for the life of the process. It is built
//! once from a [`CatalogSource`], validated as a whole (a single bad record
//! fails the load) and exposes read-only access plus the derived indices the
//! engines need: an uppercase-MPN index for O(1) lookups and pre-lowercased
//! search fields for the scorer.

pub mod handle;

use std::collections::{BTreeSet, HashMap};

use thiserror::Error;
use tracing::{debug, info, warn};

use crate::models::{CatalogDocument, Component, RawComponent};
use crate::provider::{CatalogSource, ProviderError};

pub use handle::CatalogHandle;

/// Errors that can occur while loading the catalog.
#[derive(Debug, Error)]
pub enum LoadError {
    /// The source could not be read
    #[error(transparent)]
    Source(#[from] ProviderError),

    /// The document is not a valid catalog document
    #[error("Malformed catalog document: {0}")]
    Malformed(String),

    /// A record is missing required fields or violates an invariant
    #[error("Invalid component record #{index} ({mpn}): {reason}")]
    InvalidRecord {
        index: usize,
        mpn: String,
        reason: String,
    },

    /// Two records share an MPN (compared case-insensitively)
    #[error("Duplicate MPN '{mpn}' in records #{first} and #{second}")]
    DuplicateMpn {
        mpn: String,
        first: usize,
        second: usize,
    },
}

/// Result type for load operations.
pub type LoadResult<T> = Result<T, LoadError>;

/// Lowercased copies of the fields the search engine matches against.
#[derive(Debug, Clone)]
pub struct SearchFields {
    pub mpn: String,
    pub manufacturer: String,
    pub category: String,
    pub description: String,
    pub interfaces: Vec<String>,
}

impl From<&Component> for SearchFields {
    fn from(component: &Component) -> Self {
        Self {
            mpn: component.mpn.to_lowercase(),
            manufacturer: component.manufacturer.to_lowercase(),
            category: component.category.to_lowercase(),
            description: component.description.to_lowercase(),
            interfaces: component
                .spec
                .interfaces
                .iter()
                .map(|i| i.to_lowercase())
                .collect(),
        }
    }
}

/// Immutable, fully-loaded component catalog.
#[derive(Debug)]
pub struct CatalogStore {
    /// Components in load order
    components: Vec<Component>,

    /// Uppercase MPN -> position in `components`
    mpn_index: HashMap<String, usize>,

    /// Parallel to `components`
    search_fields: Vec<SearchFields>,
}

impl CatalogStore {
    /// Load the catalog from a source.
    ///
    /// # Errors
    /// Returns `LoadError` if the source is missing or unreadable, the
    /// document cannot be parsed, or any record is invalid. No partial
    /// catalog is ever returned.
    pub async fn load<S>(source: &S) -> LoadResult<Self>
    where
        S: CatalogSource + ?Sized,
    {
        info!("Loading component catalog from {}", source.name());
        let document = source.read_document().await?;
        let store = Self::from_json_str(&document)?;
        info!(
            "Loaded {} components in {} categories",
            store.len(),
            store.categories().len()
        );
        Ok(store)
    }

    /// Parse and validate a catalog document.
    pub fn from_json_str(document: &str) -> LoadResult<Self> {
        let document: CatalogDocument =
            serde_json::from_str(document).map_err(|e| LoadError::Malformed(e.to_string()))?;

        if document.components.is_empty() {
            warn!("Catalog document contains no components");
        }

        let mut components = Vec::with_capacity(document.components.len());
        for (index, value) in document.components.into_iter().enumerate() {
            let mpn = value
                .get("mpn")
                .and_then(|v| v.as_str())
                .unwrap_or("<missing mpn>")
                .to_string();

            let raw: RawComponent =
                serde_json::from_value(value).map_err(|e| LoadError::InvalidRecord {
                    index,
                    mpn: mpn.clone(),
                    reason: e.to_string(),
                })?;

            let component = Component::try_from(raw).map_err(|e| LoadError::InvalidRecord {
                index,
                mpn,
                reason: e.to_string(),
            })?;

            components.push(component);
        }

        Self::from_components(components)
    }

    /// Build a store from already-validated components.
    ///
    /// # Errors
    /// Returns `LoadError::DuplicateMpn` if two components share an MPN.
    pub fn from_components(components: Vec<Component>) -> LoadResult<Self> {
        let mut mpn_index = HashMap::with_capacity(components.len());
        for (position, component) in components.iter().enumerate() {
            if let Some(first) = mpn_index.insert(Component::mpn_key(&component.mpn), position) {
                return Err(LoadError::DuplicateMpn {
                    mpn: component.mpn.clone(),
                    first,
                    second: position,
                });
            }
        }

        let search_fields = components.iter().map(SearchFields::from).collect();
        debug!("Built MPN index with {} entries", mpn_index.len());

        Ok(Self {
            components,
            mpn_index,
            search_fields,
        })
    }

    /// Case-insensitive exact MPN lookup.
    pub fn by_mpn(&self, mpn: &str) -> Option<&Component> {
        self.mpn_index
            .get(&Component::mpn_key(mpn))
            .map(|&position| &self.components[position])
    }

    /// Check whether a component with this MPN exists.
    pub fn contains(&self, mpn: &str) -> bool {
        self.mpn_index.contains_key(&Component::mpn_key(mpn))
    }

    /// All components in load order.
    pub fn all(&self) -> &[Component] {
        &self.components
    }

    /// Distinct categories, sorted.
    pub fn categories(&self) -> Vec<String> {
        self.components
            .iter()
            .map(|c| c.category.clone())
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }

    /// Number of components.
    pub fn len(&self) -> usize {
        self.components.len()
    }

    pub fn is_empty(&self) -> bool {
        self.components.is_empty()
    }

    /// Components paired with their lowercased search fields, in load order.
    pub fn indexed(&self) -> impl Iterator<Item = (&Component, &SearchFields)> {
        self.components.iter().zip(self.search_fields.iter())
    }
}
