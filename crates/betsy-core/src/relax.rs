//! Fallback relaxation chain.
//!
//! Runs only after a strict match came back empty. Steps are tried in
//! order and the first one that yields records wins:
//!
//! 1. **Bare attribute value**: the query left exactly one free-text token;
//!    match any record with any attribute whose value equals it.
//! 2. **Size plus product type**: a size filter was present; match that
//!    size together with the product-type term (this query's or the one
//!    carried from context), dropping color and everything else.
//!
//! Every success carries a [`Relaxation`] describing which constraints
//! were honored so the reply can say so.

use serde::{Deserialize, Serialize};

use crate::catalog::Catalog;
use crate::compare::attribute_matches;
use crate::extract::{Extraction, StructuredFilters};
use crate::matcher::Matcher;
use crate::models::ProductRecord;

/// The relaxation step that produced results.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "step", rename_all = "snake_case")]
pub enum Relaxation {
    /// A single token matched as an attribute value under any name.
    AttributeValue { value: String },
    /// Size matched, optionally together with a product-type term.
    SizeWithTerm { size: String, term: Option<String> },
}

impl Relaxation {
    /// Human-readable description of the honored constraints.
    pub fn label(&self) -> String {
        match self {
            Relaxation::AttributeValue { value } => format!("attribute value {}", value),
            Relaxation::SizeWithTerm { size, term: None } => format!("size {}", size),
            Relaxation::SizeWithTerm {
                size,
                term: Some(term),
            } => format!("size {} {}", size, term),
        }
    }
}

/// Results of a successful relaxation step.
#[derive(Debug, Clone, PartialEq)]
pub struct Relaxed {
    pub relaxation: Relaxation,
    pub results: Vec<ProductRecord>,
}

/// Try each relaxation step in order; `None` means no-match.
pub fn relax(catalog: &Catalog, matcher: &Matcher, extraction: &Extraction) -> Option<Relaxed> {
    bare_attribute_value(catalog, extraction).or_else(|| size_with_term(catalog, matcher, extraction))
}

fn bare_attribute_value(catalog: &Catalog, extraction: &Extraction) -> Option<Relaxed> {
    let [token] = extraction.free_text.as_slice() else {
        return None;
    };
    let results: Vec<ProductRecord> = catalog
        .records()
        .filter(|r| r.attributes.iter().any(|a| attribute_matches(&a.value, token)))
        .cloned()
        .collect();
    if results.is_empty() {
        return None;
    }
    tracing::debug!(value = %token, count = results.len(), "relaxed to bare attribute value");
    Some(Relaxed {
        relaxation: Relaxation::AttributeValue {
            value: token.clone(),
        },
        results,
    })
}

fn size_with_term(catalog: &Catalog, matcher: &Matcher, extraction: &Extraction) -> Option<Relaxed> {
    let size = extraction.filters.size.clone()?;
    let product_type = extraction.filters.product_type.clone();
    let filters = StructuredFilters {
        size: Some(size.clone()),
        product_type: product_type.clone(),
        ..Default::default()
    };
    let results = matcher.find(catalog, &filters, &[], false);
    if results.is_empty() {
        return None;
    }
    let term = product_type.map(|t| t.term);
    tracing::debug!(%size, term = ?term, count = results.len(), "relaxed to size");
    Some(Relaxed {
        relaxation: Relaxation::SizeWithTerm { size, term },
        results,
    })
}
