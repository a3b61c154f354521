//! Filter extraction.
//!
//! Turns a raw query and its tokens into structured filters plus the
//! free-text tokens left over. Extraction is one ordered pipeline of
//! [`FilterKind`] steps ([`PIPELINE`]); each step inspects the lowercased
//! raw query and/or the remaining token pool, records what it found, and
//! removes the tokens it consumed so later steps and free text never see
//! them again.
//!
//! | Step | Detects | Consumes |
//! |------|---------|----------|
//! | `Color` | a catalog color value occurring anywhere in the query | the color's words and the color attribute name |
//! | `Size` | `size <number or small/medium/large/xl/xxl/xs/s/m/l>` | `size` and the value |
//! | `Price` | `price [$]<number>` | `price` and the value |
//! | `AttributePair` | `<catalog attribute name> <value>` token pairs | both tokens |
//! | `SaleIntent` | `sale`, `on sale`, `discount`, `special offer` | the matched words |
//! | `ProductType` | remaining tokens that are words of some product name | those tokens |
//!
//! When the query names no product type of its own, the session's last
//! product-type term is carried over (see [`ProductTerm::carried`]), but only
//! if the query produced at least one constraint of its own and asked for
//! no sale. A sale query covers every on-sale record.

use regex::Regex;
use serde::Serialize;
use std::sync::LazyLock;

use crate::catalog::Catalog;
use crate::compare::parse_number;
use crate::models::format_number;
use crate::session::SessionContext;
use crate::tokenize::{words, Tokenizer};

// A captured value must end its whole word: only edge punctuation may
// follow it before whitespace or the end of the query.
static SIZE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r#"\bsize\b\s*[:=]?\s*(xxl|xl|xs|small|medium|large|s|m|l|\d+(?:\.\d+)?)[?!,;:."')]*(?:\s|$)"#,
    )
    .expect("size regex is valid")
});

static PRICE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"\bprice\b\s*[:=]?\s*\$?\s*(\d+(?:\.\d+)?)[?!,;:."')]*(?:\s|$)"#)
        .expect("price regex is valid")
});

static SALE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\b(?:on\s+sale|sale|discount(?:s|ed)?|special\s+offers?)\b")
        .expect("sale regex is valid")
});

/// A named extraction step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FilterKind {
    Color,
    Size,
    Price,
    AttributePair,
    SaleIntent,
    ProductType,
}

/// Extraction steps in execution order.
pub const PIPELINE: &[FilterKind] = &[
    FilterKind::Color,
    FilterKind::Size,
    FilterKind::Price,
    FilterKind::AttributePair,
    FilterKind::SaleIntent,
    FilterKind::ProductType,
];

/// An `<attribute name> <value>` constraint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AttributeFilter {
    pub name: String,
    pub value: String,
}

/// A product-type term: one or more product-name words.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProductTerm {
    /// Space-separated words, in query order.
    pub term: String,
    /// True when the term came from session context rather than this query.
    pub carried: bool,
}

impl ProductTerm {
    pub fn words(&self) -> impl Iterator<Item = &str> {
        self.term.split_whitespace()
    }
}

/// Exact-match constraints; all of them must hold.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct StructuredFilters {
    pub color: Option<String>,
    pub size: Option<String>,
    pub price: Option<String>,
    pub attributes: Vec<AttributeFilter>,
    pub product_type: Option<ProductTerm>,
}

impl StructuredFilters {
    pub fn is_empty(&self) -> bool {
        self.color.is_none()
            && self.size.is_none()
            && self.price.is_none()
            && self.attributes.is_empty()
            && self.product_type.is_none()
    }
}

/// Output of [`FilterExtractor::extract`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Extraction {
    pub filters: StructuredFilters,
    pub free_text: Vec<String>,
    pub sale_intent: bool,
}

impl Extraction {
    /// True if nothing at all constrains the search.
    pub fn is_unconstrained(&self) -> bool {
        self.filters.is_empty() && self.free_text.is_empty() && !self.sale_intent
    }

    /// Product-type term detected in this query, ignoring carried context.
    pub fn detected_term(&self) -> Option<&str> {
        self.filters
            .product_type
            .as_ref()
            .filter(|t| !t.carried)
            .map(|t| t.term.as_str())
    }

    /// Kinds that produced a constraint, in pipeline order.
    pub fn kinds(&self) -> Vec<FilterKind> {
        PIPELINE
            .iter()
            .copied()
            .filter(|k| match k {
                FilterKind::Color => self.filters.color.is_some(),
                FilterKind::Size => self.filters.size.is_some(),
                FilterKind::Price => self.filters.price.is_some(),
                FilterKind::AttributePair => !self.filters.attributes.is_empty(),
                FilterKind::SaleIntent => self.sale_intent,
                FilterKind::ProductType => self.filters.product_type.is_some(),
            })
            .collect()
    }
}

/// Runs the extraction pipeline with a given stop-word set and designated
/// color/size attribute names.
#[derive(Debug, Clone)]
pub struct FilterExtractor {
    tokenizer: Tokenizer,
    color_attribute: String,
    size_attribute: String,
}

impl Default for FilterExtractor {
    fn default() -> Self {
        Self::new(Tokenizer::new(), "color", "size")
    }
}

/// Mutable state threaded through the pipeline steps.
struct Pass<'a> {
    query: String,
    pool: Vec<String>,
    catalog: &'a Catalog,
    out: Extraction,
}

impl Pass<'_> {
    /// Remove the first pool token equal to `word`.
    fn consume(&mut self, word: &str) -> bool {
        match self.pool.iter().position(|t| t == word) {
            Some(i) => {
                self.pool.remove(i);
                true
            }
            None => false,
        }
    }

    fn consume_words(&mut self, text: &str) {
        for w in words(text).collect::<Vec<_>>() {
            self.consume(&w);
        }
    }
}

impl FilterExtractor {
    pub fn new(
        tokenizer: Tokenizer,
        color_attribute: impl Into<String>,
        size_attribute: impl Into<String>,
    ) -> Self {
        Self {
            tokenizer,
            color_attribute: color_attribute.into().to_lowercase(),
            size_attribute: size_attribute.into().to_lowercase(),
        }
    }

    pub fn tokenizer(&self) -> &Tokenizer {
        &self.tokenizer
    }

    /// Run every [`PIPELINE`] step over `query` and its `tokens`.
    pub fn extract(
        &self,
        query: &str,
        tokens: &[String],
        catalog: &Catalog,
        context: &SessionContext,
    ) -> Extraction {
        let mut pass = Pass {
            query: query.to_lowercase(),
            pool: tokens.to_vec(),
            catalog,
            out: Extraction::default(),
        };

        for kind in PIPELINE {
            match kind {
                FilterKind::Color => self.extract_color(&mut pass),
                FilterKind::Size => self.extract_size(&mut pass),
                FilterKind::Price => self.extract_price(&mut pass),
                FilterKind::AttributePair => self.extract_attribute_pairs(&mut pass),
                FilterKind::SaleIntent => self.extract_sale_intent(&mut pass),
                FilterKind::ProductType => self.extract_product_type(&mut pass, context),
            }
        }

        let Pass { pool, mut out, .. } = pass;
        out.free_text = pool;
        out
    }

    /// Earliest catalog color occurring in the query; longest wins a tie.
    fn extract_color(&self, pass: &mut Pass<'_>) {
        let mut best: Option<(usize, String)> = None;
        for color in pass.catalog.distinct_values(&self.color_attribute) {
            if self.tokenizer.tokenize(&color).is_empty() {
                continue;
            }
            if let Some(pos) = pass.query.find(color.as_str()) {
                let better = match &best {
                    None => true,
                    Some((p, c)) => pos < *p || (pos == *p && color.len() > c.len()),
                };
                if better {
                    best = Some((pos, color));
                }
            }
        }
        if let Some((_, color)) = best {
            pass.consume_words(&color);
            let attr = self.color_attribute.clone();
            pass.consume(&attr);
            pass.out.filters.color = Some(color);
        }
    }

    fn extract_size(&self, pass: &mut Pass<'_>) {
        let Some(caps) = SIZE_RE.captures(&pass.query) else {
            return;
        };
        let (whole, value) = match (caps.get(0), caps.get(1)) {
            (Some(w), Some(v)) => (w.as_str().to_string(), v.as_str().to_string()),
            _ => return,
        };
        if self.tokenizer.is_stop_word(&value) {
            return;
        }
        pass.consume_words(&whole);
        pass.out.filters.size = Some(value);
    }

    fn extract_price(&self, pass: &mut Pass<'_>) {
        let Some(caps) = PRICE_RE.captures(&pass.query) else {
            return;
        };
        let (whole, value) = match (caps.get(0), caps.get(1).and_then(|v| parse_number(v.as_str()))) {
            (Some(w), Some(v)) => (w.as_str().to_string(), v),
            _ => return,
        };
        pass.consume_words(&whole);
        pass.out.filters.price = Some(format_number(value));
    }

    fn extract_attribute_pairs(&self, pass: &mut Pass<'_>) {
        let mut kept = Vec::with_capacity(pass.pool.len());
        let mut i = 0;
        while i < pass.pool.len() {
            let token = &pass.pool[i];
            let designated = (pass.out.filters.color.is_some() && *token == self.color_attribute)
                || (pass.out.filters.size.is_some() && *token == self.size_attribute);
            if !designated && i + 1 < pass.pool.len() && pass.catalog.has_attribute_name(token) {
                pass.out.filters.attributes.push(AttributeFilter {
                    name: token.clone(),
                    value: pass.pool[i + 1].clone(),
                });
                i += 2;
            } else {
                kept.push(token.clone());
                i += 1;
            }
        }
        pass.pool = kept;
    }

    fn extract_sale_intent(&self, pass: &mut Pass<'_>) {
        let matches: Vec<String> = SALE_RE
            .find_iter(&pass.query)
            .map(|m| m.as_str().to_string())
            .collect();
        if matches.is_empty() {
            return;
        }
        for m in &matches {
            pass.consume_words(m);
        }
        pass.out.sale_intent = true;
    }

    fn extract_product_type(&self, pass: &mut Pass<'_>, context: &SessionContext) {
        let (term_words, rest): (Vec<String>, Vec<String>) = pass
            .pool
            .iter()
            .cloned()
            .partition(|t| pass.catalog.is_name_word(t));

        if !term_words.is_empty() {
            pass.pool = rest;
            pass.out.filters.product_type = Some(ProductTerm {
                term: term_words.join(" "),
                carried: false,
            });
            return;
        }

        // Sale intent spans the whole catalog; never narrow it with context.
        if pass.out.sale_intent {
            return;
        }
        let has_own_constraint = !pass.out.filters.is_empty() || !pass.pool.is_empty();
        if !has_own_constraint {
            return;
        }
        if let Some(last) = context.last_search_term.as_deref() {
            pass.out.filters.product_type = Some(ProductTerm {
                term: last.to_string(),
                carried: true,
            });
        }
    }
}

/// Extract with the default stop words and `color` / `size` attributes.
pub fn extract_filters(
    query: &str,
    tokens: &[String],
    catalog: &Catalog,
    context: &SessionContext,
) -> Extraction {
    FilterExtractor::default().extract(query, tokens, catalog, context)
}
