//! # Catalog Export
//!
//! Ties the pipeline together: snapshot the products, group them by
//! category, lay the groups out into pages and replay the pages against a
//! render sink. [`export_catalog`] does all of it with the PDF sink.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::error::{CatalogError, Result};
use crate::layout::{
    group_by_category, EntryStyle, Layout, LayoutConfig, LayoutEngine, LayoutSettings,
    LayoutWarning,
};
use crate::model::{CoverPage, Metadata, PageConfig, Product};
use crate::pdf::{Labels, PdfSink};
use crate::render::{replay, CancelToken, RenderSink};

/// File name the exported catalog is saved under.
pub const CATALOG_FILENAME: &str = "catalogo-produtos.pdf";

/// Everything that shapes an export. Every field has a default, so `{}`
/// is a valid options document.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ExportOptions {
    pub page: PageConfig,
    pub layout: LayoutSettings,
    /// Entry geometry. Derived from the page when absent.
    pub entry: Option<EntryStyle>,
    pub cover: Option<CoverPage>,
    pub metadata: Metadata,
    pub labels: Labels,
    /// Directory relative image paths are resolved against.
    pub image_base_dir: Option<PathBuf>,
}

impl ExportOptions {
    /// Parse an options document.
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn layout_config(&self) -> LayoutConfig {
        self.layout.to_config(&self.page)
    }

    pub fn entry_style(&self) -> EntryStyle {
        self.entry
            .clone()
            .unwrap_or_else(|| EntryStyle::for_page(&self.page))
    }

    pub fn engine(&self) -> LayoutEngine {
        LayoutEngine::new(self.layout_config()).with_entry_style(self.entry_style())
    }
}

/// A finished catalog.
#[derive(Debug, Clone)]
pub struct CatalogPdf {
    pub filename: String,
    pub bytes: Vec<u8>,
    /// Pages in the document, cover included.
    pub page_count: usize,
    pub warnings: Vec<LayoutWarning>,
}

/// Lay out the catalog without drawing it.
pub fn layout_catalog(products: &[Product], options: &ExportOptions) -> Layout {
    options.engine().layout(&group_by_category(products))
}

/// Lay out `products` and replay the pages against `sink`.
///
/// The products are copied first so the caller's list may change while
/// the export runs. If no product has a category the sink is never
/// touched and [`CatalogError::NothingToExport`] is returned.
pub fn export_with_sink(
    products: &[Product],
    options: &ExportOptions,
    sink: &mut dyn RenderSink,
    cancel: &CancelToken,
) -> Result<Layout> {
    let snapshot = products.to_vec();
    let groups = group_by_category(&snapshot);
    if groups.is_empty() {
        return Err(CatalogError::NothingToExport);
    }

    let layout = options.engine().layout(&groups);
    log::info!(
        "Laid out {} products in {} categories on {} pages",
        layout.entry_count(),
        groups.len(),
        layout.pages.len()
    );

    replay(&layout.pages, sink, cancel)?;
    Ok(layout)
}

/// Export `products` as a PDF catalog.
pub fn export_catalog(
    products: &[Product],
    options: &ExportOptions,
    cancel: &CancelToken,
) -> Result<CatalogPdf> {
    let mut sink = PdfSink::new(options.page.clone(), options.entry_style())
        .with_labels(options.labels.clone())
        .with_metadata(options.metadata.clone())
        .with_cover(options.cover.clone())
        .with_image_base_dir(options.image_base_dir.clone());

    let layout = export_with_sink(products, options, &mut sink, cancel)?;
    let page_count = sink.page_count();
    let bytes = sink.finish()?;

    Ok(CatalogPdf {
        filename: CATALOG_FILENAME.to_string(),
        bytes,
        page_count,
        warnings: layout.warnings,
    })
}
