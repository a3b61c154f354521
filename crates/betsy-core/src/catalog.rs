//! Read-only product catalog.
//!
//! A [`Catalog`] is built once from raw records and shared, unchanged, by
//! every conversation. Construction drops out-of-stock records, validates
//! the rest, and precomputes for each record the lowercased searchable text
//! and the set of words in its name.
//!
//! Searchable text is assembled from an explicit list of
//! [`SearchableField`]s rather than from whatever fields a record happens
//! to carry. Adding a field to that list is a behavior change and bumps
//! [`SEARCHABLE_FIELDS_VERSION`].

use std::collections::{HashMap, HashSet};

use crate::error::CatalogError;
use crate::models::ProductRecord;
use crate::tokenize::words;

/// Version of the [`SEARCHABLE_FIELDS`] list.
pub const SEARCHABLE_FIELDS_VERSION: u32 = 1;

/// A record field that contributes to free-text matching.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchableField {
    Name,
    Sku,
    Price,
    Description,
    Categories,
    Tags,
    /// Attribute names and values, flattened as `name value` pairs.
    Attributes,
}

/// Fields searched by free-text tokens, in concatenation order.
pub const SEARCHABLE_FIELDS: &[SearchableField] = &[
    SearchableField::Name,
    SearchableField::Sku,
    SearchableField::Price,
    SearchableField::Description,
    SearchableField::Categories,
    SearchableField::Tags,
    SearchableField::Attributes,
];

impl SearchableField {
    /// The field's text for `record` (not yet lowercased).
    pub fn text(&self, record: &ProductRecord) -> String {
        match self {
            SearchableField::Name => record.name.clone(),
            SearchableField::Sku => record.sku.clone().unwrap_or_default(),
            SearchableField::Price => record.price_text(),
            SearchableField::Description => record.description.clone(),
            SearchableField::Categories => record.categories.join(" "),
            SearchableField::Tags => record.tags.join(" "),
            SearchableField::Attributes => record
                .attributes
                .iter()
                .map(|a| format!("{} {}", a.name, a.value))
                .collect::<Vec<_>>()
                .join(" "),
        }
    }
}

/// Lowercased concatenation of every [`SEARCHABLE_FIELDS`] entry.
pub fn searchable_text(record: &ProductRecord) -> String {
    SEARCHABLE_FIELDS
        .iter()
        .map(|f| f.text(record))
        .filter(|t| !t.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase()
}

/// A record plus the text derived from it for matching.
#[derive(Debug, Clone)]
pub struct IndexedProduct {
    pub record: ProductRecord,
    /// See [`searchable_text`].
    pub searchable: String,
    /// Normalized words of the record's name.
    pub name_words: HashSet<String>,
}

impl IndexedProduct {
    fn new(record: ProductRecord) -> Self {
        let searchable = searchable_text(&record);
        let name_words = words(&record.name).collect();
        Self {
            record,
            searchable,
            name_words,
        }
    }
}

/// The active (in-stock) catalog, in supply order.
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    products: Vec<IndexedProduct>,
    name_words: HashSet<String>,
    attribute_names: HashSet<String>,
    dropped_out_of_stock: usize,
}

impl Catalog {
    /// Build a catalog from raw records.
    ///
    /// Records with `stock == 0` are dropped before validation. Remaining
    /// records must have unique ids and finite, non-negative prices.
    pub fn new(records: Vec<ProductRecord>) -> Result<Self, CatalogError> {
        let total = records.len();
        let mut seen: HashMap<u64, String> = HashMap::new();
        let mut products = Vec::with_capacity(total);

        for record in records.into_iter().filter(|r| r.stock > 0) {
            if !record.price.is_finite() || record.price < 0.0 {
                return Err(CatalogError::InvalidPrice {
                    id: record.id,
                    name: record.name,
                    price: record.price,
                });
            }
            if let Some(first) = seen.get(&record.id) {
                return Err(CatalogError::DuplicateId {
                    id: record.id,
                    first: first.clone(),
                    second: record.name,
                });
            }
            seen.insert(record.id, record.name.clone());
            products.push(IndexedProduct::new(record));
        }

        let name_words = products
            .iter()
            .flat_map(|p| p.name_words.iter().cloned())
            .collect();
        let attribute_names = products
            .iter()
            .flat_map(|p| p.record.attributes.iter().map(|a| a.name.to_lowercase()))
            .collect();
        let dropped_out_of_stock = total - products.len();

        tracing::debug!(
            active = products.len(),
            dropped_out_of_stock,
            "catalog built"
        );

        Ok(Self {
            products,
            name_words,
            attribute_names,
            dropped_out_of_stock,
        })
    }

    pub fn len(&self) -> usize {
        self.products.len()
    }

    pub fn is_empty(&self) -> bool {
        self.products.is_empty()
    }

    /// Number of supplied records excluded for having no stock.
    pub fn dropped_out_of_stock(&self) -> usize {
        self.dropped_out_of_stock
    }

    pub fn products(&self) -> &[IndexedProduct] {
        &self.products
    }

    pub fn records(&self) -> impl Iterator<Item = &ProductRecord> {
        self.products.iter().map(|p| &p.record)
    }

    /// True if `word` appears as a whole word in some product name.
    pub fn is_name_word(&self, word: &str) -> bool {
        self.name_words.contains(word)
    }

    /// True if some record carries an attribute called `name` (any case).
    pub fn has_attribute_name(&self, name: &str) -> bool {
        self.attribute_names.contains(&name.to_lowercase())
    }

    /// Distinct lowercased values of attribute `name`, in first-seen order.
    pub fn distinct_values(&self, name: &str) -> Vec<String> {
        let mut seen = HashSet::new();
        let mut values = Vec::new();
        for record in self.records() {
            if let Some(v) = record.attribute(name) {
                let v = v.to_string().to_lowercase();
                if !v.trim().is_empty() && seen.insert(v.clone()) {
                    values.push(v);
                }
            }
        }
        values
    }
}
