//! MCP Component Search - an in-memory electronic component catalog engine.
//!
//! This library provides the core functionality for the component search
//! system: it loads a JSON catalog of parts once, then answers keyword
//! searches, MPN lookups, compatibility checks and alternative-part queries
//! against it. The same engine backs the MCP server and the search CLI.
//!
//! # Architecture
//!
//! The system is organized into several key modules:
//!
//! - **models**: Core data structures (Component, ComponentSpec, Pricing, etc.)
//! - **provider**: Where the catalog document comes from (file, inline)
//! - **storage**: The immutable, indexed catalog and its shared handle
//! - **query**: Keyword scoring and top-k ranking
//! - **compatibility**: Supply voltage and interface analysis
//! - **alternatives**: Resolution of declared substitute parts
//! - **server**: MCP server implementation
//!
//! # Workflow
//!
//! 1. Read the catalog document from a [`CatalogSource`]
//! 2. Validate every record and build the MPN index ([`CatalogStore`])
//! 3. Share the store through a [`CatalogHandle`]
//! 4. Answer tool calls against a snapshot of the store
//!
//! # Example
//!
//! ```ignore
//! use mcp_component_search::{
//!     provider::JsonFileSource,
//!     query::{KeywordSearchEngine, SearchQuery},
//!     storage::CatalogStore,
//! };
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let source = JsonFileSource::new("data/components.json");
//!     let store = CatalogStore::load(&source).await?;
//!
//!     let engine = KeywordSearchEngine::new(&store);
//!     for result in engine.search(&SearchQuery::new("temperature sensor", Some(5))) {
//!         println!("{}: {}", result.component.mpn, result.score);
//!     }
//!
//!     Ok(())
//! }
//! ```

// Public modules
pub mod alternatives;
pub mod compatibility;
pub mod models;
pub mod provider;
pub mod query;
pub mod server;
pub mod storage;

// Re-export commonly used types at the crate root
pub use alternatives::AlternativesResolver;
pub use compatibility::{CompatibilityAnalyzer, CompatibilityReport};
pub use models::{Component, ComponentSpec, Pricing, StockStatus, VoltageRange};
pub use provider::CatalogSource;
pub use query::{KeywordSearchEngine, SearchQuery, SearchResult};
pub use storage::{CatalogHandle, CatalogStore, LoadError};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Catalog location used when neither a flag nor the environment names one
pub const DEFAULT_CATALOG_PATH: &str = "data/components.json";

/// Environment variable overriding the catalog location
pub const CATALOG_PATH_ENV: &str = "COMPONENT_DB_PATH";
