//! Query processing and ranking module.
//!
//! This module scores catalog components against a free-text query and
//! returns the top-k matches. Ranking is a fixed, additive keyword score:
//! every rule below is a case-insensitive substring test, all applicable
//! contributions are summed, and components scoring zero are left out.
//!
//! | Rule                                       | Points       |
//! |--------------------------------------------|--------------|
//! | query in MPN                               | 100          |
//! | query in manufacturer                      | 50           |
//! | query in category                          | 30           |
//! | query in description                       | 20           |
//! | query in an interface name                 | 15 each      |
//! | each query token in description            | 5 per token  |
//! | each query token in category               | 10 per token |
//!
//! # Usage
//!
//! ```rust,no_run
//! use mcp_component_search::query::{KeywordSearchEngine, SearchQuery};
//! use mcp_component_search::storage::CatalogStore;
//!
//! # fn example(store: &CatalogStore) {
//! let engine = KeywordSearchEngine::new(store);
//! let query = SearchQuery::new("wifi microcontroller", Some(5));
//!
//! // Results are sorted by descending score, catalog order on ties
//! for result in engine.search(&query) {
//!     println!("{} - Score: {}", result.component.mpn, result.score);
//! }
//! # }
//! ```

use std::fmt;

use crate::models::Component;
use crate::storage::{CatalogStore, SearchFields};

/// Default number of results returned by a search.
pub const DEFAULT_LIMIT: usize = 10;

pub const MPN_WEIGHT: u32 = 100;
pub const MANUFACTURER_WEIGHT: u32 = 50;
pub const CATEGORY_WEIGHT: u32 = 30;
pub const DESCRIPTION_WEIGHT: u32 = 20;
pub const INTERFACE_WEIGHT: u32 = 15;
pub const DESCRIPTION_TOKEN_WEIGHT: u32 = 5;
pub const CATEGORY_TOKEN_WEIGHT: u32 = 10;

/// Search query parameters.
#[derive(Debug, Clone)]
pub struct SearchQuery {
    /// The query text, matched case-insensitively
    pub query: String,

    /// Maximum number of results to return
    pub limit: usize,
}

impl SearchQuery {
    /// Create a new search query.
    ///
    /// # Arguments
    /// * `query` - The search query text
    /// * `limit` - Maximum number of results to return (default: 10)
    pub fn new(query: impl Into<String>, limit: Option<usize>) -> Self {
        Self {
            query: query.into(),
            limit: limit.unwrap_or(DEFAULT_LIMIT),
        }
    }
}

/// Field whose match contributed most to a component's score.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchField {
    Mpn,
    Manufacturer,
    Category,
    Description,
    Interface,
    Keyword,
}

impl fmt::Display for MatchField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            MatchField::Mpn => "MPN",
            MatchField::Manufacturer => "manufacturer",
            MatchField::Category => "category",
            MatchField::Description => "description",
            MatchField::Interface => "interface",
            MatchField::Keyword => "keywords",
        })
    }
}

/// Per-rule contributions to a component's score.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ScoreBreakdown {
    pub mpn: u32,
    pub manufacturer: u32,
    pub category: u32,
    pub description: u32,
    pub interfaces: u32,
    pub description_tokens: u32,
    pub category_tokens: u32,
}

impl ScoreBreakdown {
    pub fn total(&self) -> u32 {
        self.mpn
            + self.manufacturer
            + self.category
            + self.description
            + self.interfaces
            + self.description_tokens
            + self.category_tokens
    }

    /// The rule with the largest contribution, `None` if nothing matched.
    pub fn strongest(&self) -> Option<MatchField> {
        [
            (self.mpn, MatchField::Mpn),
            (self.manufacturer, MatchField::Manufacturer),
            (self.category, MatchField::Category),
            (self.description, MatchField::Description),
            (self.interfaces, MatchField::Interface),
            (self.description_tokens + self.category_tokens, MatchField::Keyword),
        ]
        .into_iter()
        .filter(|(points, _)| *points > 0)
        // max_by_key keeps the last maximum; reverse so the earlier rule wins ties
        .rev()
        .max_by_key(|(points, _)| *points)
        .map(|(_, field)| field)
    }
}

/// A ranked search hit.
#[derive(Debug, Clone, Copy)]
pub struct SearchResult<'a> {
    /// The matching component
    pub component: &'a Component,

    /// Total score (always > 0)
    pub score: u32,

    /// How the score was assembled
    pub breakdown: ScoreBreakdown,
}

/// Lowercased query phrase and its whitespace-delimited tokens.
#[derive(Debug, Clone)]
pub struct QueryTerms {
    phrase: String,
    tokens: Vec<String>,
}

impl QueryTerms {
    /// Normalize a query. Returns `None` for an empty or whitespace-only query.
    ///
    /// The phrase keeps surrounding whitespace: `"sensor "` is not a substring
    /// of `"humidity sensor"`.
    pub fn parse(query: &str) -> Option<Self> {
        let phrase = query.to_lowercase();
        let tokens: Vec<String> = phrase.split_whitespace().map(str::to_string).collect();
        if tokens.is_empty() {
            return None;
        }
        Some(Self { phrase, tokens })
    }
}

/// Score one component's search fields against a parsed query.
pub fn score_fields(fields: &SearchFields, terms: &QueryTerms) -> ScoreBreakdown {
    let phrase = terms.phrase.as_str();
    let hit = |haystack: &str, weight: u32| if haystack.contains(phrase) { weight } else { 0 };

    let interface_hits = fields
        .interfaces
        .iter()
        .filter(|i| i.contains(phrase))
        .count() as u32;

    let mut breakdown = ScoreBreakdown {
        mpn: hit(&fields.mpn, MPN_WEIGHT),
        manufacturer: hit(&fields.manufacturer, MANUFACTURER_WEIGHT),
        category: hit(&fields.category, CATEGORY_WEIGHT),
        description: hit(&fields.description, DESCRIPTION_WEIGHT),
        interfaces: interface_hits * INTERFACE_WEIGHT,
        ..ScoreBreakdown::default()
    };

    for token in &terms.tokens {
        if fields.description.contains(token.as_str()) {
            breakdown.description_tokens += DESCRIPTION_TOKEN_WEIGHT;
        }
        if fields.category.contains(token.as_str()) {
            breakdown.category_tokens += CATEGORY_TOKEN_WEIGHT;
        }
    }

    breakdown
}

/// Score a single component against a query. Empty queries score zero.
pub fn score(component: &Component, query: &str) -> u32 {
    QueryTerms::parse(query)
        .map(|terms| score_fields(&SearchFields::from(component), &terms).total())
        .unwrap_or(0)
}

/// Keyword search over an in-memory catalog.
///
/// The engine borrows the store and keeps no state of its own, so any
/// number of engines can search the same store concurrently.
#[derive(Debug, Clone, Copy)]
pub struct KeywordSearchEngine<'a> {
    store: &'a CatalogStore,
}

impl<'a> KeywordSearchEngine<'a> {
    pub fn new(store: &'a CatalogStore) -> Self {
        Self { store }
    }

    /// Execute a search query and return ranked results.
    ///
    /// # Returns
    /// At most `query.limit` results, sorted by descending score. Components
    /// with equal scores keep their catalog order.
    pub fn search(&self, query: &SearchQuery) -> Vec<SearchResult<'a>> {
        if query.limit == 0 {
            return Vec::new();
        }
        let Some(terms) = QueryTerms::parse(&query.query) else {
            return Vec::new();
        };

        // 1. Score every component, dropping the ones that match nothing
        let mut results: Vec<SearchResult<'a>> = self
            .store
            .indexed()
            .filter_map(|(component, fields)| {
                let breakdown = score_fields(fields, &terms);
                let score = breakdown.total();
                (score > 0).then_some(SearchResult {
                    component,
                    score,
                    breakdown,
                })
            })
            .collect();

        // 2. Stable sort by descending score
        results.sort_by(|a, b| b.score.cmp(&a.score));

        // 3. Top-k
        results.truncate(query.limit);

        results
    }

    /// Components whose category contains `category` (case-insensitive), in
    /// catalog order, at most `limit` of them.
    pub fn search_by_category(&self, category: &str, limit: usize) -> Vec<&'a Component> {
        let needle = category.trim().to_lowercase();
        self.store
            .indexed()
            .filter(|(_, fields)| fields.category.contains(needle.as_str()))
            .map(|(component, _)| component)
            .take(limit)
            .collect()
    }
}
