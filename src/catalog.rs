//! Catalog file loading.
//!
//! The catalog is a JSON document holding either a bare array of product
//! records or an object with a `products` array:
//!
//! ```json
//! { "products": [ { "id": 1, "name": "Green Sneakers", "price": 89, "stock": 4 } ] }
//! ```
//!
//! Records with zero stock are accepted in the file but never become part
//! of the active catalog.

use anyhow::{Context, Result};
use betsy_core::{Catalog, ProductRecord};
use serde::Deserialize;
use std::path::Path;

use crate::config::Config;

#[derive(Deserialize)]
#[serde(untagged)]
enum CatalogFile {
    Bare(Vec<ProductRecord>),
    Wrapped { products: Vec<ProductRecord> },
}

impl CatalogFile {
    fn into_records(self) -> Vec<ProductRecord> {
        match self {
            CatalogFile::Bare(records) => records,
            CatalogFile::Wrapped { products } => products,
        }
    }
}

/// Parse catalog JSON text into product records.
pub fn parse_records(json: &str) -> Result<Vec<ProductRecord>> {
    let file: CatalogFile =
        serde_json::from_str(json).with_context(|| "Failed to parse catalog JSON")?;
    Ok(file.into_records())
}

/// Read and validate the catalog at `path`.
pub fn load_catalog(path: &Path) -> Result<Catalog> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read catalog file: {}", path.display()))?;
    let records = parse_records(&content)
        .with_context(|| format!("Invalid catalog file: {}", path.display()))?;
    let total = records.len();
    let catalog = Catalog::new(records)
        .with_context(|| format!("Invalid catalog file: {}", path.display()))?;

    tracing::info!(
        path = %path.display(),
        records = total,
        active = catalog.len(),
        dropped_out_of_stock = catalog.dropped_out_of_stock(),
        "catalog loaded"
    );
    Ok(catalog)
}

/// Load the catalog named in `[catalog].path`.
pub fn load_from_config(config: &Config) -> Result<Catalog> {
    load_catalog(&config.catalog.path)
}

/// Print the active catalog, one record per line.
pub fn run_catalog(config: &Config, json: bool) -> Result<()> {
    let catalog = load_from_config(config)?;

    if json {
        let records: Vec<&ProductRecord> = catalog.records().collect();
        println!("{}", serde_json::to_string_pretty(&records)?);
        return Ok(());
    }

    if catalog.is_empty() {
        println!("Catalog is empty.");
        return Ok(());
    }

    println!("{:<6} {:<36} {:>10} {:>6}  SALE", "ID", "NAME", "PRICE", "STOCK");
    for record in catalog.records() {
        println!(
            "{:<6} {:<36} {:>10} {:>6}  {}",
            record.id,
            record.name,
            record.price_text(),
            record.stock,
            if record.on_sale { "yes" } else { "" }
        );
    }
    println!();
    println!(
        "{} active products ({} out of stock hidden)",
        catalog.len(),
        catalog.dropped_out_of_stock()
    );
    Ok(())
}
