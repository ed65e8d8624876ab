//! Search binary entry point.
//!
//! This binary provides a command-line interface to the component catalog. It
//! supports single-query and interactive REPL modes, with table or JSON
//! output.
//!
//! # Examples
//!
//! Single query with default settings:
//! ```bash
//! search --query "temperature sensor"
//! ```
//!
//! JSON output, category listing:
//! ```bash
//! search --catalog parts.json --category regulator --format json
//! ```
//!
//! Interactive mode:
//! ```bash
//! search --interactive
//! ```

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use comfy_table::{presets::UTF8_FULL, Attribute, Cell, Color, ContentArrangement, Table};
use mcp_component_search::{
    compatibility::{CompatibilityReport, Severity},
    models::{Component, StockStatus},
    provider::JsonFileSource,
    query::{KeywordSearchEngine, SearchQuery, SearchResult},
    server::tools::{
        CatalogTools, CheckCompatibilityRequest, ComponentSummary, MpnRequest,
        SearchComponentsRequest,
    },
    storage::{CatalogHandle, CatalogStore},
    AlternativesResolver, CATALOG_PATH_ENV, DEFAULT_CATALOG_PATH,
};
use rustyline::error::ReadlineError;
use rustyline::DefaultEditor;
use std::path::{Path, PathBuf};
use std::time::Instant;
use tracing::{debug, error, info};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Output format for results
#[derive(Debug, Clone, Copy, ValueEnum)]
enum OutputFormat {
    /// Human-friendly table with colored stock status
    Table,
    /// Machine-readable JSON, same shape as the MCP tools return
    Json,
}

/// Search binary CLI for querying the component catalog
#[derive(Parser, Debug)]
#[command(
    name = "search",
    version,
    about = "Search the electronic component catalog",
    long_about = "Query the component catalog by keyword or category. Supports both \
                  single-query and interactive modes with flexible output formatting.

EXAMPLES:
  Single query:
    search --query \"wifi microcontroller\"

  JSON output, top 3:
    search --query \"ldo\" --limit 3 --format json

  Everything in a category:
    search --category sensor

  Interactive mode against another catalog:
    search --catalog parts.json --interactive"
)]
struct Args {
    /// Catalog file path
    #[arg(long, value_name = "PATH", env = CATALOG_PATH_ENV, default_value = DEFAULT_CATALOG_PATH)]
    catalog: PathBuf,

    /// Search query (required for single-query mode, omitted in interactive mode)
    #[arg(long, value_name = "TEXT", conflicts_with_all = ["interactive", "category"])]
    query: Option<String>,

    /// List components whose category contains TEXT
    #[arg(long, value_name = "TEXT", conflicts_with = "interactive")]
    category: Option<String>,

    /// Number of results to return
    #[arg(long, value_name = "N", default_value = "10")]
    limit: usize,

    /// Output format
    #[arg(long, value_enum, default_value = "table")]
    format: OutputFormat,

    /// Enable interactive REPL mode
    #[arg(long, short = 'i')]
    interactive: bool,

    /// Logging verbosity level
    #[arg(long, default_value = "warn", value_name = "LEVEL")]
    log_level: String,
}

/// Setup logging with the specified level
fn setup_logging(log_level: &str) {
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(log_level)),
        )
        .init();
}

async fn load_catalog(path: &Path) -> Result<CatalogStore> {
    info!("Loading catalog from: {}", path.display());
    let store = CatalogStore::load(&JsonFileSource::new(path))
        .await
        .with_context(|| format!("Failed to load catalog from {}", path.display()))?;

    if store.is_empty() {
        anyhow::bail!(
            "Catalog is empty (0 components found in {}).",
            path.display()
        );
    }

    info!("Catalog contains {} components", store.len());
    Ok(store)
}

fn stock_cell(status: &StockStatus) -> Cell {
    let color = match status {
        StockStatus::InStock => Color::Green,
        StockStatus::LowStock => Color::Yellow,
        StockStatus::OutOfStock => Color::Red,
        StockStatus::Discontinued | StockStatus::Obsolete => Color::DarkGrey,
        StockStatus::Other(_) => Color::White,
    };
    Cell::new(status.as_str()).fg(color)
}

fn truncate(text: &str, max: usize) -> String {
    if text.chars().count() > max {
        let head: String = text.chars().take(max - 3).collect();
        format!("{}...", head)
    } else {
        text.to_string()
    }
}

fn new_table(header: &[&str]) -> Table {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic);
    table.set_header(
        header
            .iter()
            .map(|h| Cell::new(h).add_attribute(Attribute::Bold))
            .collect::<Vec<_>>(),
    );
    table
}

/// Format search hits as a pretty table
fn format_results_table(results: &[SearchResult<'_>]) -> String {
    if results.is_empty() {
        return "No results found.".to_string();
    }

    let mut table = new_table(&[
        "Rank",
        "MPN",
        "Manufacturer",
        "Category",
        "Description",
        "Price",
        "Stock",
        "Score",
        "Matched on",
    ]);
    for (idx, result) in results.iter().enumerate() {
        let component = result.component;
        table.add_row(vec![
            Cell::new(idx + 1),
            Cell::new(&component.mpn),
            Cell::new(&component.manufacturer),
            Cell::new(&component.category),
            Cell::new(truncate(&component.description, 50)),
            Cell::new(&component.pricing.price),
            stock_cell(&component.pricing.stock_status),
            Cell::new(result.score),
            matched_on_cell(result),
        ]);
    }
    table.to_string()
}

/// Field that contributed most to a hit's score
fn matched_on_cell(result: &SearchResult<'_>) -> Cell {
    match result.breakdown.strongest() {
        Some(field) => Cell::new(field),
        None => Cell::new("-"),
    }
}

/// Format a plain component list (category listing, alternatives) as a table
fn format_components_table(components: &[&Component]) -> String {
    if components.is_empty() {
        return "No components found.".to_string();
    }

    let mut table =
        new_table(&["MPN", "Manufacturer", "Category", "Description", "Price", "Stock"]);
    for component in components {
        table.add_row(vec![
            Cell::new(&component.mpn),
            Cell::new(&component.manufacturer),
            Cell::new(&component.category),
            Cell::new(truncate(&component.description, 50)),
            Cell::new(&component.pricing.price),
            stock_cell(&component.pricing.stock_status),
        ]);
    }
    table.to_string()
}

fn format_report(report: &CompatibilityReport) -> String {
    let mut out = String::new();
    let verdict = if report.compatible { "COMPATIBLE" } else { "INCOMPATIBLE" };
    out.push_str(&format!("Result: {}\n", verdict));
    if let Some(message) = &report.message {
        out.push_str(&format!("{}\n", message));
    }
    out.push_str(&format!("Components: {}\n", report.components.join(", ")));
    if let Some(range) = &report.voltage_range {
        out.push_str(&format!("Common supply window: {}\n", range));
    }
    if !report.available_interfaces.is_empty() {
        out.push_str(&format!(
            "Available interfaces: {}\n",
            report.available_interfaces.join(", ")
        ));
    }

    if !report.issues.is_empty() {
        let mut table = new_table(&["Severity", "Issue"]);
        for issue in &report.issues {
            let color = match issue.severity {
                Severity::Error => Color::Red,
                Severity::Warning => Color::Yellow,
            };
            table.add_row(vec![
                Cell::new(format!("{:?}", issue.severity).to_uppercase()).fg(color),
                Cell::new(&issue.message),
            ]);
        }
        out.push_str(&table.to_string());
    }
    out
}

fn print_json<T: serde::Serialize>(value: &T) -> Result<()> {
    let json = serde_json::to_string_pretty(value)
        .with_context(|| "Failed to serialize output to JSON")?;
    println!("{}", json);
    Ok(())
}

/// Display detailed view of a single component
fn display_component_detail(component: &Component) {
    let spec = &component.spec;
    println!("\n{}", "═".repeat(80));
    println!("MPN: {}", component.mpn);
    println!("Manufacturer: {}", component.manufacturer);
    println!("Category: {}", component.category);
    println!("Package: {} ({} pins)", spec.package, spec.pin_count);
    if let Some(range) = spec.voltage_range() {
        println!("Supply: {}", range);
    }
    if let Some(out) = spec.voltage_out {
        println!("Output: {}V", out);
    }
    if let Some(current) = spec.current_max {
        println!("Max current: {}A", current);
    }
    if !spec.interfaces.is_empty() {
        println!("Interfaces: {}", spec.interfaces.join(", "));
    }
    for (attribute, value) in &spec.attributes {
        println!("{}: {}", attribute, value);
    }
    println!("Price: {} ({})", component.pricing.price, component.pricing.stock_status);
    if !component.datasheet_url.is_empty() {
        println!("Datasheet: {}", component.datasheet_url);
    }
    if !component.alternatives.is_empty() {
        println!("Alternatives: {}", component.alternatives.join(", "));
    }
    println!("\nDescription:\n{}", component.description);
    println!("{}", "═".repeat(80));
}

fn run_search(tools: &CatalogTools, query: &str, limit: usize, format: OutputFormat) -> Result<()> {
    debug!("Executing search for query: {}", query);
    match format {
        OutputFormat::Table => {
            let start = Instant::now();
            let store = tools.catalog().snapshot();
            let results =
                KeywordSearchEngine::new(&store).search(&SearchQuery::new(query, Some(limit)));
            let elapsed = start.elapsed();
            println!("{}", format_results_table(&results));
            println!(
                "\nFound {} results in {:.3}ms",
                results.len(),
                elapsed.as_secs_f64() * 1000.0
            );
        }
        OutputFormat::Json => {
            let response = tools.search_components(SearchComponentsRequest {
                query: query.to_string(),
                limit: i64::try_from(limit).ok(),
            })?;
            print_json(&response)?;
        }
    }
    Ok(())
}

fn run_category(
    tools: &CatalogTools,
    category: &str,
    limit: usize,
    format: OutputFormat,
) -> Result<()> {
    let store = tools.catalog().snapshot();
    let components = KeywordSearchEngine::new(&store).search_by_category(category, limit);
    match format {
        OutputFormat::Table => println!("{}", format_components_table(&components)),
        OutputFormat::Json => {
            let summaries: Vec<ComponentSummary> =
                components.into_iter().map(ComponentSummary::from).collect();
            print_json(&summaries)?;
        }
    }
    Ok(())
}

fn run_details(tools: &CatalogTools, mpn: &str, format: OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Table => {
            let store = tools.catalog().snapshot();
            match store.by_mpn(mpn) {
                Some(component) => display_component_detail(component),
                None => eprintln!("Component {} not found in database", mpn),
            }
        }
        OutputFormat::Json => print_json(&tools.get_component_details(MpnRequest {
            mpn: mpn.to_string(),
        }))?,
    }
    Ok(())
}

fn run_compat(tools: &CatalogTools, mpns: &[&str], format: OutputFormat) -> Result<()> {
    let report = tools.check_compatibility(CheckCompatibilityRequest {
        mpns: mpns.iter().map(|m| m.to_string()).collect(),
    });
    match format {
        OutputFormat::Table => println!("{}", format_report(&report)),
        OutputFormat::Json => print_json(&report)?,
    }
    Ok(())
}

fn run_alternatives(tools: &CatalogTools, mpn: &str, format: OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Table => {
            let store = tools.catalog().snapshot();
            if !store.contains(mpn) {
                eprintln!("Component {} not found in database", mpn);
                return Ok(());
            }
            let alternatives = AlternativesResolver::new(&store).alternatives_for(mpn);
            println!("{}", format_components_table(&alternatives));
        }
        OutputFormat::Json => print_json(&tools.suggest_alternatives(MpnRequest {
            mpn: mpn.to_string(),
        }))?,
    }
    Ok(())
}

fn print_help() {
    println!("Commands:");
    println!("  <query>            - Search for components");
    println!("  /limit N           - Set number of results to N");
    println!("  /details MPN       - Show full details for a component");
    println!("  /compat MPN MPN... - Check compatibility of several components");
    println!("  /alts MPN          - Show catalog alternatives for a component");
    println!("  /category TEXT     - List components in a category");
    println!("  /categories        - List all categories");
    println!("  /format table|json - Switch output format");
    println!("  /reload            - Reload the catalog from disk");
    println!("  /help              - Show this help");
    println!("  Ctrl+D or Ctrl+C   - Exit");
}

/// Run interactive REPL mode
async fn run_interactive(
    tools: CatalogTools,
    catalog_path: &Path,
    mut limit: usize,
    mut format: OutputFormat,
) -> Result<()> {
    println!("Interactive Component Search ({} components)", tools.catalog().snapshot().len());
    print_help();
    println!();

    let mut rl = DefaultEditor::new()
        .with_context(|| "Failed to create readline editor")?;

    loop {
        let readline = rl.readline("Search> ");
        match readline {
            Ok(line) => {
                let line = line.trim();

                if line.is_empty() {
                    continue;
                }

                rl.add_history_entry(line).ok();

                if !line.starts_with('/') {
                    if let Err(e) = run_search(&tools, line, limit, format) {
                        eprintln!("Search failed: {}", e);
                    }
                    continue;
                }

                let parts: Vec<&str> = line.split_whitespace().collect();
                let outcome = match parts[0] {
                    "/help" => {
                        print_help();
                        Ok(())
                    }
                    "/limit" => {
                        match parts.get(1).map(|n| n.parse::<usize>()) {
                            Some(Ok(n)) if n > 0 => {
                                limit = n;
                                println!("Set limit to {}", limit);
                            }
                            Some(_) => eprintln!("Invalid number: must be a positive integer"),
                            None => eprintln!("Usage: /limit N"),
                        }
                        Ok(())
                    }
                    "/details" => match parts.get(1) {
                        Some(mpn) => run_details(&tools, mpn, format),
                        None => {
                            eprintln!("Usage: /details MPN");
                            Ok(())
                        }
                    },
                    "/compat" => {
                        if parts.len() < 3 {
                            eprintln!("Usage: /compat MPN MPN...");
                            Ok(())
                        } else {
                            run_compat(&tools, &parts[1..], format)
                        }
                    }
                    "/alts" => match parts.get(1) {
                        Some(mpn) => run_alternatives(&tools, mpn, format),
                        None => {
                            eprintln!("Usage: /alts MPN");
                            Ok(())
                        }
                    },
                    "/category" => {
                        let category = parts[1..].join(" ");
                        run_category(&tools, &category, limit, format)
                    }
                    "/categories" => {
                        for category in tools.catalog().snapshot().categories() {
                            println!("  {}", category);
                        }
                        Ok(())
                    }
                    "/format" => {
                        match parts.get(1).copied() {
                            Some("table") => {
                                format = OutputFormat::Table;
                                println!("Set output format to table");
                            }
                            Some("json") => {
                                format = OutputFormat::Json;
                                println!("Set output format to JSON");
                            }
                            _ => eprintln!("Usage: /format [table|json]"),
                        }
                        Ok(())
                    }
                    "/reload" => match load_catalog(catalog_path).await {
                        Ok(store) => {
                            let count = store.len();
                            tools.catalog().replace(store);
                            println!("Reloaded {} components", count);
                            Ok(())
                        }
                        Err(e) => {
                            eprintln!("Reload failed, keeping current catalog: {:#}", e);
                            Ok(())
                        }
                    },
                    other => {
                        eprintln!("Unknown command: {}. Type /help for available commands.", other);
                        Ok(())
                    }
                };

                if let Err(e) = outcome {
                    eprintln!("Error: {:#}", e);
                }
            }
            Err(ReadlineError::Interrupted) | Err(ReadlineError::Eof) => {
                println!("Goodbye!");
                break;
            }
            Err(err) => {
                error!("Error reading input: {}", err);
                break;
            }
        }
    }

    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    setup_logging(&args.log_level);

    if !args.interactive && args.query.is_none() && args.category.is_none() {
        anyhow::bail!(
            "One of --query, --category or --interactive must be specified.\n\
             Use --help for usage information."
        );
    }

    let store = load_catalog(&args.catalog).await?;
    let tools = CatalogTools::new(CatalogHandle::new(store), args.limit);

    if args.interactive {
        run_interactive(tools, &args.catalog, args.limit, args.format).await?;
    } else if let Some(category) = &args.category {
        run_category(&tools, category, args.limit, args.format)?;
    } else if let Some(query) = &args.query {
        run_search(&tools, query, args.limit, args.format)?;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store() -> CatalogStore {
        let doc = r#"{"components": [{
            "mpn": "BME280",
            "manufacturer": "Bosch Sensortec",
            "category": "Sensor",
            "description": "Humidity and pressure sensor",
            "specs": {"package": "LGA-8", "interfaces": ["I2C", "SPI"], "pin_count": 8},
            "pricing": {"price_usd": 3.2}
        }]}"#;
        CatalogStore::from_json_str(doc).unwrap()
    }

    #[test]
    fn test_results_table_shows_matched_field() {
        let store = store();
        let engine = KeywordSearchEngine::new(&store);

        let results = engine.search(&SearchQuery::new("bosch", None));
        let table = format_results_table(&results);
        assert!(table.contains("Matched on"));
        assert!(table.contains("manufacturer"));

        let results = engine.search(&SearchQuery::new("spi", None));
        assert!(format_results_table(&results).contains("interface"));
    }

    #[test]
    fn test_empty_results_message() {
        assert_eq!(format_results_table(&[]), "No results found.");
    }
}
