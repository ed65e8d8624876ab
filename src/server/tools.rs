//! The four catalog tools exposed over MCP.
//!
//! Each handler takes a fresh snapshot of the catalog, so a reload between
//! two calls is seen by the second one while a call in flight keeps the
//! store it started with. Request and response types here are the wire
//! contract; engine types are converted into them at this boundary.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tracing::debug;

use super::protocol::ToolDefinition;
use super::{ServerError, ServerResult};
use crate::alternatives::AlternativesResolver;
use crate::compatibility::{CompatibilityAnalyzer, CompatibilityReport};
use crate::models::{AttributeValue, Component, StockStatus, INTERFACE_REQUIREMENTS_KEY};
use crate::query::{KeywordSearchEngine, SearchQuery};
use crate::storage::CatalogHandle;

pub const SEARCH_COMPONENTS: &str = "search_components";
pub const GET_COMPONENT_DETAILS: &str = "get_component_details";
pub const CHECK_COMPATIBILITY: &str = "check_compatibility";
pub const SUGGEST_ALTERNATIVES: &str = "suggest_alternatives";

/// Arguments of `search_components`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchComponentsRequest {
    /// Free-text query (e.g. "WiFi microcontroller")
    pub query: String,

    /// Maximum number of results; the server default applies when absent
    #[serde(default)]
    pub limit: Option<i64>,
}

impl SearchComponentsRequest {
    /// Resolve the effective limit.
    ///
    /// # Errors
    /// Returns `ServerError::InvalidRequest` for a negative limit
    pub fn effective_limit(&self, default: usize) -> ServerResult<usize> {
        match self.limit {
            None => Ok(default),
            Some(limit) => usize::try_from(limit).map_err(|_| {
                ServerError::InvalidRequest(format!("limit must be non-negative, got {}", limit))
            }),
        }
    }
}

/// Arguments of `get_component_details` and `suggest_alternatives`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MpnRequest {
    /// Manufacturer part number, matched case-insensitively
    pub mpn: String,
}

/// Arguments of `check_compatibility`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CheckCompatibilityRequest {
    pub mpns: Vec<String>,
}

/// One search hit as returned to clients.
#[derive(Debug, Clone, Serialize)]
pub struct ComponentSummary {
    pub mpn: String,
    pub manufacturer: String,
    pub category: String,
    pub description: String,
    pub price: f64,
    pub currency: String,
    pub interfaces: Vec<String>,
}

impl From<&Component> for ComponentSummary {
    fn from(component: &Component) -> Self {
        Self {
            mpn: component.mpn.clone(),
            manufacturer: component.manufacturer.clone(),
            category: component.category.clone(),
            description: component.description.clone(),
            price: component.pricing.price.amount,
            currency: component.pricing.price.currency.clone(),
            interfaces: component.spec.interfaces.clone(),
        }
    }
}

/// Response of `search_components`.
#[derive(Debug, Clone, Serialize)]
pub struct SearchComponentsResponse {
    /// The query as the client sent it
    pub query: String,
    pub count: usize,
    /// Hits, best first
    pub components: Vec<ComponentSummary>,
}

#[derive(Debug, Clone, Serialize)]
pub struct SpecDetails {
    pub voltage_min: Option<f64>,
    pub voltage_max: Option<f64>,
    pub voltage_out: Option<f64>,
    pub current_max: Option<f64>,
    pub package: String,
    pub interfaces: Vec<String>,
    pub pin_count: u32,
    /// Domain-specific attributes the record defines, keyed by name
    #[serde(flatten)]
    pub attributes: BTreeMap<String, Value>,
}

#[derive(Debug, Clone, Serialize)]
pub struct PricingDetails {
    pub price: f64,
    pub currency: String,
    pub stock_status: StockStatus,
}

/// Full record of a found component.
#[derive(Debug, Clone, Serialize)]
pub struct ComponentDetails {
    pub found: bool,
    pub mpn: String,
    pub manufacturer: String,
    pub category: String,
    pub description: String,
    pub specs: SpecDetails,
    pub pricing: PricingDetails,
    pub datasheet_url: String,
    pub compatibility: BTreeMap<String, Value>,
    pub alternatives: Vec<String>,
}

fn attribute_json(value: &AttributeValue) -> Value {
    match value {
        AttributeValue::Number(n) => json!(n),
        AttributeValue::Range([lo, hi]) => json!([lo, hi]),
        AttributeValue::Text(s) => json!(s),
    }
}

impl From<&Component> for ComponentDetails {
    fn from(component: &Component) -> Self {
        let spec = &component.spec;
        let attributes = spec
            .attributes
            .iter()
            .map(|(attr, value)| (attr.key().to_string(), attribute_json(value)))
            .collect();

        let mut compatibility = component.compatibility.extra.clone();
        if !component.compatibility.interface_requirements.is_empty() {
            compatibility.insert(
                INTERFACE_REQUIREMENTS_KEY.to_string(),
                json!(component.compatibility.interface_requirements),
            );
        }

        Self {
            found: true,
            mpn: component.mpn.clone(),
            manufacturer: component.manufacturer.clone(),
            category: component.category.clone(),
            description: component.description.clone(),
            specs: SpecDetails {
                voltage_min: spec.voltage_min,
                voltage_max: spec.voltage_max,
                voltage_out: spec.voltage_out,
                current_max: spec.current_max,
                package: spec.package.clone(),
                interfaces: spec.interfaces.clone(),
                pin_count: spec.pin_count,
                attributes,
            },
            pricing: PricingDetails {
                price: component.pricing.price.amount,
                currency: component.pricing.price.currency.clone(),
                stock_status: component.pricing.stock_status.clone(),
            },
            datasheet_url: component.datasheet_url.clone(),
            compatibility,
            alternatives: component.alternatives.clone(),
        }
    }
}

/// Structured "no such part" answer.
#[derive(Debug, Clone, Serialize)]
pub struct NotFound {
    pub found: bool,
    pub mpn: String,
    pub message: String,
}

impl NotFound {
    fn new(mpn: &str) -> Self {
        Self {
            found: false,
            mpn: mpn.to_string(),
            message: format!("Component {} not found in database", mpn),
        }
    }
}

/// Response of `get_component_details`.
#[derive(Debug, Clone, Serialize)]
#[serde(untagged)]
pub enum ComponentDetailsResponse {
    Found(Box<ComponentDetails>),
    NotFound(NotFound),
}

impl ComponentDetailsResponse {
    pub fn is_found(&self) -> bool {
        matches!(self, ComponentDetailsResponse::Found(_))
    }
}

/// Identity of the part alternatives were requested for.
#[derive(Debug, Clone, Serialize)]
pub struct ComponentRef {
    pub mpn: String,
    pub manufacturer: String,
    pub category: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct AlternativeSummary {
    pub mpn: String,
    pub manufacturer: String,
    pub category: String,
    pub description: String,
    pub price: f64,
    pub currency: String,
}

impl From<&Component> for AlternativeSummary {
    fn from(component: &Component) -> Self {
        Self {
            mpn: component.mpn.clone(),
            manufacturer: component.manufacturer.clone(),
            category: component.category.clone(),
            description: component.description.clone(),
            price: component.pricing.price.amount,
            currency: component.pricing.price.currency.clone(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct AlternativesFound {
    pub found: bool,
    /// MPN as requested
    pub mpn: String,
    pub original: ComponentRef,
    pub alternatives: Vec<AlternativeSummary>,
}

#[derive(Debug, Clone, Serialize)]
pub struct AlternativesNotFound {
    #[serde(flatten)]
    pub not_found: NotFound,
    /// Always empty
    pub alternatives: Vec<AlternativeSummary>,
}

/// Response of `suggest_alternatives`.
#[derive(Debug, Clone, Serialize)]
#[serde(untagged)]
pub enum SuggestAlternativesResponse {
    Found(AlternativesFound),
    NotFound(AlternativesNotFound),
}

impl SuggestAlternativesResponse {
    /// Resolved alternatives; empty when the part is unknown.
    pub fn alternatives(&self) -> &[AlternativeSummary] {
        match self {
            SuggestAlternativesResponse::Found(found) => &found.alternatives,
            SuggestAlternativesResponse::NotFound(missing) => &missing.alternatives,
        }
    }
}

/// Tool handlers over a shared catalog.
#[derive(Debug, Clone)]
pub struct CatalogTools {
    catalog: CatalogHandle,
    default_limit: usize,
}

impl CatalogTools {
    /// Create the tool set.
    ///
    /// # Arguments
    /// * `catalog` - Shared catalog handle
    /// * `default_limit` - Search limit used when a request omits one
    pub fn new(catalog: CatalogHandle, default_limit: usize) -> Self {
        Self {
            catalog,
            default_limit,
        }
    }

    pub fn catalog(&self) -> &CatalogHandle {
        &self.catalog
    }

    /// Rank catalog components against a free-text query.
    ///
    /// # Errors
    /// Returns `ServerError::InvalidRequest` if the limit is negative
    pub fn search_components(
        &self,
        request: SearchComponentsRequest,
    ) -> ServerResult<SearchComponentsResponse> {
        let limit = request.effective_limit(self.default_limit)?;
        let store = self.catalog.snapshot();
        let engine = KeywordSearchEngine::new(&store);

        let components: Vec<ComponentSummary> = engine
            .search(&SearchQuery::new(request.query.as_str(), Some(limit)))
            .into_iter()
            .map(|result| ComponentSummary::from(result.component))
            .collect();

        debug!("search '{}' -> {} hits", request.query, components.len());
        Ok(SearchComponentsResponse {
            query: request.query,
            count: components.len(),
            components,
        })
    }

    /// Look up one component by MPN.
    pub fn get_component_details(&self, request: MpnRequest) -> ComponentDetailsResponse {
        let store = self.catalog.snapshot();
        match store.by_mpn(&request.mpn) {
            Some(component) => ComponentDetailsResponse::Found(Box::new(component.into())),
            None => ComponentDetailsResponse::NotFound(NotFound::new(&request.mpn)),
        }
    }

    /// Check supply voltage and interface compatibility of a set of parts.
    pub fn check_compatibility(&self, request: CheckCompatibilityRequest) -> CompatibilityReport {
        let store = self.catalog.snapshot();
        CompatibilityAnalyzer::new(&store).check(request.mpns.as_slice())
    }

    /// List the declared alternatives of a part that exist in the catalog.
    pub fn suggest_alternatives(&self, request: MpnRequest) -> SuggestAlternativesResponse {
        let store = self.catalog.snapshot();
        let Some(original) = store.by_mpn(&request.mpn) else {
            return SuggestAlternativesResponse::NotFound(AlternativesNotFound {
                not_found: NotFound::new(&request.mpn),
                alternatives: Vec::new(),
            });
        };

        let alternatives = AlternativesResolver::new(&store)
            .alternatives_for(&request.mpn)
            .into_iter()
            .map(AlternativeSummary::from)
            .collect();

        SuggestAlternativesResponse::Found(AlternativesFound {
            found: true,
            mpn: request.mpn,
            original: ComponentRef {
                mpn: original.mpn.clone(),
                manufacturer: original.manufacturer.clone(),
                category: original.category.clone(),
            },
            alternatives,
        })
    }

    /// Dispatch a `tools/call` by name with raw JSON arguments.
    ///
    /// # Errors
    /// Returns `ServerError::UnknownTool` for a name not in [`CatalogTools::definitions`],
    /// and `ServerError::InvalidRequest` if the arguments do not fit the tool
    pub fn call(&self, name: &str, arguments: Value) -> ServerResult<Value> {
        let value = match name {
            SEARCH_COMPONENTS => {
                let request = parse_args(name, arguments)?;
                serde_json::to_value(self.search_components(request)?)?
            }
            GET_COMPONENT_DETAILS => {
                let request = parse_args(name, arguments)?;
                serde_json::to_value(self.get_component_details(request))?
            }
            CHECK_COMPATIBILITY => {
                let request = parse_args(name, arguments)?;
                serde_json::to_value(self.check_compatibility(request))?
            }
            SUGGEST_ALTERNATIVES => {
                let request = parse_args(name, arguments)?;
                serde_json::to_value(self.suggest_alternatives(request))?
            }
            other => return Err(ServerError::UnknownTool(other.to_string())),
        };
        Ok(value)
    }

    /// Definitions advertised by `tools/list`.
    pub fn definitions() -> Vec<ToolDefinition> {
        vec![
            ToolDefinition {
                name: SEARCH_COMPONENTS,
                description: "Search for electronic components by natural language query",
                input_schema: json!({
                    "type": "object",
                    "properties": {
                        "query": {
                            "type": "string",
                            "description": "Search query (e.g. \"WiFi microcontroller\", \"temperature sensor\")"
                        },
                        "limit": {
                            "type": "integer",
                            "minimum": 0,
                            "description": "Maximum number of results (default: 10)"
                        }
                    },
                    "required": ["query"]
                }),
            },
            ToolDefinition {
                name: GET_COMPONENT_DETAILS,
                description: "Get detailed specifications for a component by its MPN",
                input_schema: json!({
                    "type": "object",
                    "properties": {
                        "mpn": {
                            "type": "string",
                            "description": "Manufacturer part number (e.g. \"ESP32-S3-WROOM-1-N8R2\")"
                        }
                    },
                    "required": ["mpn"]
                }),
            },
            ToolDefinition {
                name: CHECK_COMPATIBILITY,
                description: "Check voltage and interface compatibility between multiple \
                              components",
                input_schema: json!({
                    "type": "object",
                    "properties": {
                        "mpns": {
                            "type": "array",
                            "items": { "type": "string" },
                            "description": "MPNs of the components to check together"
                        }
                    },
                    "required": ["mpns"]
                }),
            },
            ToolDefinition {
                name: SUGGEST_ALTERNATIVES,
                description: "Get alternative components for a given MPN",
                input_schema: json!({
                    "type": "object",
                    "properties": {
                        "mpn": {
                            "type": "string",
                            "description": "Manufacturer part number"
                        }
                    },
                    "required": ["mpn"]
                }),
            },
        ]
    }
}

fn parse_args<T: for<'de> Deserialize<'de>>(tool: &str, arguments: Value) -> ServerResult<T> {
    let arguments = if arguments.is_null() { json!({}) } else { arguments };
    serde_json::from_value(arguments)
        .map_err(|e| ServerError::InvalidRequest(format!("Invalid arguments for {}: {}", tool, e)))
}
