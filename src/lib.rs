//! # Vitrine
//!
//! The core of a product-catalog browser: load a product list, search and
//! filter it, and export it as a paginated PDF catalog.
//!
//! The interesting part is the export. Products are grouped by category and
//! poured **into** pages one block at a time. Every block is placed with the
//! page boundary as a hard constraint: a product entry is never split, a
//! category header never sits alone at the bottom of a page, and a category
//! that runs past a page picks up again under a continuation header.
//!
//! ## Architecture
//!
//! ```text
//! Input (JSON file / API)
//!       ↓
//!   [loader]   : Fail-open product loading
//!       ↓
//!   [store]    : Product store, search, filters, cards
//!       ↓
//!   [layout]   : Category grouping + page layout engine
//!       ↓
//!   [render]   : Replay pages against a RenderSink
//!       ↓
//!   [pdf]      : RenderSink that serializes PDF bytes
//! ```

pub mod error;
pub mod model;
pub mod loader;
pub mod store;
pub mod font;
pub mod text;
pub mod layout;
pub mod render;
pub mod image_loader;
pub mod pdf;
pub mod export;

#[cfg(feature = "wasm")]
pub mod wasm;

pub use error::{CatalogError, Result};
pub use export::{export_catalog, ExportOptions, CATALOG_FILENAME};
pub use model::Product;
pub use render::CancelToken;

/// Export a catalog described as JSON product data to PDF bytes, using the
/// default export options.
pub fn export_json(json: &str) -> Result<Vec<u8>> {
    let products = loader::parse_products(json)?;
    let pdf = export_catalog(&products, &ExportOptions::default(), &CancelToken::new())?;
    Ok(pdf.bytes)
}
