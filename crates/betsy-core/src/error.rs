//! Error types for catalog ingestion.
//!
//! Conversation turns never fail; the only fallible step in the core is
//! building a [`Catalog`](crate::catalog::Catalog) from raw records.

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum CatalogError {
    /// Two in-stock records share the same id.
    #[error("duplicate product id {id} ('{first}' and '{second}')")]
    DuplicateId {
        id: u64,
        first: String,
        second: String,
    },

    /// A record has a negative or non-finite price.
    #[error("product {id} ('{name}') has invalid price {price}")]
    InvalidPrice { id: u64, name: String, price: f64 },
}
