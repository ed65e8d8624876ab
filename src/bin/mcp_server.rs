//! MCP server binary entry point.
//!
//! This binary loads the component catalog and serves the four catalog tools
//! to an MCP client over stdin/stdout. Logs go to stderr.
//!
//! # Examples
//!
//! ```bash
//! mcp_server --catalog data/components.json
//! COMPONENT_DB_PATH=/srv/parts.json mcp_server --log-level debug
//! ```

use anyhow::{Context, Result};
use clap::Parser;
use mcp_component_search::{
    provider::JsonFileSource,
    server::{transport::StdioTransport, McpServer, ServerConfig},
    storage::{CatalogHandle, CatalogStore},
    CATALOG_PATH_ENV, DEFAULT_CATALOG_PATH,
};
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// MCP server exposing the electronic component catalog
#[derive(Parser, Debug)]
#[command(
    name = "mcp_server",
    version,
    about = "Serve the component catalog to MCP clients over stdio",
    long_about = "Load a JSON component catalog and answer MCP tool calls \
                  (search_components, get_component_details, check_compatibility, \
                  suggest_alternatives) on stdin/stdout.

EXAMPLES:
  Default catalog:
    mcp_server

  Explicit catalog and verbose logs:
    mcp_server --catalog parts.json --log-level debug"
)]
struct Args {
    /// Catalog file path
    #[arg(long, value_name = "PATH", env = CATALOG_PATH_ENV, default_value = DEFAULT_CATALOG_PATH)]
    catalog: PathBuf,

    /// Number of results returned when a search omits its limit
    #[arg(long, value_name = "N", default_value = "10")]
    default_limit: usize,

    /// Logging verbosity level
    #[arg(long, default_value = "info", value_name = "LEVEL")]
    log_level: String,
}

/// Setup logging with the specified level
fn setup_logging(log_level: &str) {
    // stdout carries the protocol
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(log_level)))
        .init();
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    setup_logging(&args.log_level);

    info!("Loading catalog from: {}", args.catalog.display());
    let source = JsonFileSource::new(&args.catalog);
    let store = CatalogStore::load(&source)
        .await
        .with_context(|| format!("Failed to load catalog from {}", args.catalog.display()))?;

    if store.is_empty() {
        anyhow::bail!(
            "Catalog is empty (0 components found in {}).\n\
             Check that the file has a top-level \"components\" array.",
            args.catalog.display()
        );
    }

    let config = ServerConfig {
        default_limit: args.default_limit,
        ..ServerConfig::default()
    };
    let server = McpServer::new(config, CatalogHandle::new(store));

    let mut transport = StdioTransport::stdio();
    server
        .run(&mut transport)
        .await
        .with_context(|| "MCP server terminated with an error")?;

    Ok(())
}
