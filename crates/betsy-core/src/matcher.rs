//! Strict matching of extracted filters against the catalog.
//!
//! Structured filters are AND-combined; free-text tokens are OR-combined
//! over each record's searchable text. Results keep catalog order.
//!
//! An extraction with no structured filter, no free text and no sale
//! intent matches nothing: a stop-word-only query never returns the whole
//! catalog.

use crate::catalog::{Catalog, IndexedProduct};
use crate::compare::attribute_matches;
use crate::extract::{Extraction, StructuredFilters};
use crate::models::ProductRecord;

/// Applies [`StructuredFilters`] and free text to catalog records.
#[derive(Debug, Clone)]
pub struct Matcher {
    color_attribute: String,
    size_attribute: String,
}

impl Default for Matcher {
    fn default() -> Self {
        Self::new("color", "size")
    }
}

impl Matcher {
    pub fn new(color_attribute: impl Into<String>, size_attribute: impl Into<String>) -> Self {
        Self {
            color_attribute: color_attribute.into(),
            size_attribute: size_attribute.into(),
        }
    }

    /// All records passing every filter, in catalog order.
    pub fn find(
        &self,
        catalog: &Catalog,
        filters: &StructuredFilters,
        free_text: &[String],
        sale_intent: bool,
    ) -> Vec<ProductRecord> {
        if filters.is_empty() && free_text.is_empty() && !sale_intent {
            return Vec::new();
        }
        catalog
            .products()
            .iter()
            .filter(|p| self.passes_filters(p, filters, sale_intent))
            .filter(|p| free_text.is_empty() || free_text_matches(&p.searchable, free_text))
            .map(|p| p.record.clone())
            .collect()
    }

    /// [`find`](Self::find) over a whole [`Extraction`].
    pub fn find_extracted(&self, catalog: &Catalog, extraction: &Extraction) -> Vec<ProductRecord> {
        self.find(
            catalog,
            &extraction.filters,
            &extraction.free_text,
            extraction.sale_intent,
        )
    }

    /// True if `product` satisfies every structured filter and sale intent.
    pub fn passes_filters(
        &self,
        product: &IndexedProduct,
        filters: &StructuredFilters,
        sale_intent: bool,
    ) -> bool {
        let record = &product.record;

        if let Some(color) = &filters.color {
            if !attribute_equals(record, &self.color_attribute, color) {
                return false;
            }
        }
        if let Some(size) = &filters.size {
            if !self.size_matches(record, size) {
                return false;
            }
        }
        if let Some(price) = &filters.price {
            if record.price_text() != *price {
                return false;
            }
        }
        for attr in &filters.attributes {
            let found = record
                .attributes
                .iter()
                .any(|a| a.is_named(&attr.name) && attribute_matches(&a.value, &attr.value));
            if !found {
                return false;
            }
        }
        if let Some(term) = &filters.product_type {
            if !term.words().all(|w| product.name_words.contains(w)) {
                return false;
            }
        }
        if sale_intent && !record.on_sale {
            return false;
        }
        true
    }

    /// Size attribute, stringified, equals `size` ignoring case.
    pub fn size_matches(&self, record: &ProductRecord, size: &str) -> bool {
        attribute_equals(record, &self.size_attribute, size)
    }
}

fn attribute_equals(record: &ProductRecord, name: &str, expected: &str) -> bool {
    record
        .attribute(name)
        .is_some_and(|v| v.to_string().to_lowercase() == expected.to_lowercase())
}

/// At least one token occurs in `searchable`.
pub fn free_text_matches(searchable: &str, tokens: &[String]) -> bool {
    tokens.iter().any(|t| token_matches(searchable, t))
}

/// Substring match with naive plural tolerance.
///
/// `sneakers` also matches text containing only `sneaker`. The reverse
/// direction (`sneaker` finding `sneakers`) is already covered by the
/// substring test.
pub fn token_matches(searchable: &str, token: &str) -> bool {
    if searchable.contains(token) {
        return true;
    }
    match token.strip_suffix('s') {
        Some(singular) if !singular.is_empty() => searchable.contains(singular),
        _ => false,
    }
}
