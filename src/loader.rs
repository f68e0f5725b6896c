//! # Product Loading
//!
//! The catalog reads its products from one static JSON file. Loading fails
//! open: any I/O or parse problem is logged and yields an empty product
//! list, which the rest of the system shows as "no results" instead of an
//! error. Callers that want the error use [`parse_products`] directly.

use std::path::{Path, PathBuf};

use crate::error::{CatalogError, Result};
use crate::model::{CatalogData, Product};

/// Something that can produce the catalog's products.
pub trait ProductSource {
    /// Fetch the product list. Never fails: problems yield an empty list.
    fn fetch_products(&self) -> Vec<Product>;
}

/// Reads products from a JSON file on disk.
#[derive(Debug, Clone)]
pub struct JsonFileSource {
    path: PathBuf,
}

impl JsonFileSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Directory that relative image references in this file resolve against.
    pub fn base_dir(&self) -> Option<PathBuf> {
        self.path.parent().map(Path::to_path_buf)
    }

    /// Read and parse the file, reporting what went wrong.
    pub fn try_fetch(&self) -> Result<Vec<Product>> {
        let json = std::fs::read_to_string(&self.path).map_err(|source| CatalogError::Io {
            path: self.path.clone(),
            source,
        })?;
        parse_products(&json)
    }
}

impl ProductSource for JsonFileSource {
    fn fetch_products(&self) -> Vec<Product> {
        match self.try_fetch() {
            Ok(products) => {
                log::debug!(
                    "Loaded {} products from {}",
                    products.len(),
                    self.path.display()
                );
                products
            }
            Err(e) => {
                log::error!("Failed to load products from {}: {}", self.path.display(), e);
                Vec::new()
            }
        }
    }
}

/// A source backed by products already in memory.
impl ProductSource for Vec<Product> {
    fn fetch_products(&self) -> Vec<Product> {
        self.clone()
    }
}

/// Parse catalog JSON. Accepts `{"products": [...]}`, the Portuguese
/// `{"produtos": [...]}`, or a bare array of products.
pub fn parse_products(json: &str) -> Result<Vec<Product>> {
    let value: serde_json::Value = serde_json::from_str(json)?;
    if value.is_array() {
        return Ok(serde_json::from_value(value)?);
    }
    let data: CatalogData = serde_json::from_value(value)?;
    Ok(data.products)
}
