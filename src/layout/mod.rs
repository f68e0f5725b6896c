//! # Catalog Page Layout Engine
//!
//! This is the heart of the exporter.
//!
//! The catalog is a sequence of category sections. Each section is a
//! header followed by one block per product. Blocks are atomic: an entry is
//! a photo plus a few lines of text and is never split across pages.
//!
//! The engine never lays out onto a tall canvas and slices it afterwards.
//! It walks the blocks once with a cursor on the current page:
//!
//! 1. Open a page; the cursor sits at the top margin
//! 2. Before placing a block, ask: "does it fit above the bottom margin?"
//! 3. If it fits: place it, advance the cursor by its height
//! 4. If it doesn't: close the page, open a new one, repeat the category
//!    header as a continuation header, then place the block
//! 5. A category header only opens where its first entry fits too, so a
//!    header is never left alone at the bottom of a page
//!
//! Entry heights are nominal (`fixed-height` mode) or derived from the
//! text the entry will actually show (`measured-height` mode). In
//! fixed-height mode pagination depends only on counts and configured
//! heights; a long description is the renderer's problem, not the
//! engine's.
//!
//! A block taller than the whole usable page is still placed, alone on a
//! fresh page, and reported as a [`LayoutWarning`]. The engine always
//! terminates.

pub mod group;
pub mod measure;
pub mod page_break;

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::model::{PageConfig, Product};

pub use group::{group_by_category, CategoryGroup};
pub use measure::EntryStyle;
use page_break::{decide_break, BreakDecision};

/// How entry heights are determined.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum LayoutMode {
    /// Every entry takes `entry_height`.
    #[default]
    FixedHeight,
    /// Each entry is measured from its wrapped description.
    MeasuredHeight,
}

/// Top and bottom page margins.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct VerticalMargins {
    pub top: f64,
    pub bottom: f64,
}

/// Vertical geometry and policy for one layout pass.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LayoutConfig {
    pub page_height: f64,
    pub margins: VerticalMargins,
    pub header_height: f64,
    /// Nominal entry height for fixed-height mode.
    pub entry_height: f64,
    /// Spacer after every entry. Zero places no separators.
    pub separator_height: f64,
    pub mode: LayoutMode,
    /// Start every category on a fresh page.
    pub category_per_page: bool,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self::for_page(&PageConfig::default())
    }
}

impl LayoutConfig {
    /// Default block heights on the given page.
    pub fn for_page(page: &PageConfig) -> Self {
        let (_, page_height) = page.size.dimensions();
        let defaults = LayoutSettings::default();
        Self {
            page_height,
            margins: VerticalMargins {
                top: page.margin.top,
                bottom: page.margin.bottom,
            },
            header_height: defaults.header_height,
            entry_height: defaults.entry_height,
            separator_height: defaults.separator_height,
            mode: defaults.mode,
            category_per_page: defaults.category_per_page,
        }
    }

    /// Height between the margins.
    pub fn usable_height(&self) -> f64 {
        self.page_height - self.margins.top - self.margins.bottom
    }

    /// Lowest y content may reach.
    fn limit(&self) -> f64 {
        self.page_height - self.margins.bottom
    }
}

/// The user-facing part of [`LayoutConfig`]; page height and margins come
/// from the page configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct LayoutSettings {
    pub mode: LayoutMode,
    pub header_height: f64,
    pub entry_height: f64,
    pub separator_height: f64,
    pub category_per_page: bool,
}

impl Default for LayoutSettings {
    fn default() -> Self {
        use crate::model::mm;
        Self {
            mode: LayoutMode::FixedHeight,
            header_height: mm(18.0),
            entry_height: mm(35.0),
            separator_height: mm(7.0),
            category_per_page: false,
        }
    }
}

impl LayoutSettings {
    pub fn to_config(&self, page: &PageConfig) -> LayoutConfig {
        LayoutConfig {
            header_height: self.header_height,
            entry_height: self.entry_height,
            separator_height: self.separator_height,
            mode: self.mode,
            category_per_page: self.category_per_page,
            ..LayoutConfig::for_page(page)
        }
    }
}

/// A laid-out unit of vertical content.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type")]
pub enum ContentBlock {
    CategoryHeader { name: String, continuation: bool },
    ProductEntry(Product),
    Separator,
}

/// A block at its position on the page.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PlacedBlock {
    /// Offset of the block's top edge from the top of the page.
    pub y: f64,
    pub height: f64,
    pub block: ContentBlock,
}

/// One page of the catalog.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LayoutPage {
    /// 1-based page number within the laid-out catalog.
    pub number: usize,
    pub blocks: Vec<PlacedBlock>,
    /// Set when a block taller than the usable height had to be placed.
    pub overflow: bool,
}

impl LayoutPage {
    /// Sum of the heights of all blocks on the page.
    pub fn content_height(&self) -> f64 {
        self.blocks.iter().map(|b| b.height).sum()
    }

    /// The products placed on this page, in order.
    pub fn entries(&self) -> impl Iterator<Item = &Product> {
        self.blocks.iter().filter_map(|b| match &b.block {
            ContentBlock::ProductEntry(product) => Some(product),
            _ => None,
        })
    }
}

/// A configuration problem the engine worked around.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum LayoutWarning {
    /// An entry (with its separator) is taller than the page can hold.
    EntryTooTall {
        page: usize,
        category: String,
        product: String,
        height: f64,
        usable_height: f64,
    },
    /// A category header alone is taller than the page can hold.
    HeaderTooTall {
        page: usize,
        category: String,
        height: f64,
        usable_height: f64,
    },
}

impl fmt::Display for LayoutWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LayoutWarning::EntryTooTall {
                page,
                category,
                product,
                height,
                usable_height,
            } => write!(
                f,
                "page {page}: entry '{product}' in '{category}' is {height:.1}pt tall \
                 but the page only holds {usable_height:.1}pt"
            ),
            LayoutWarning::HeaderTooTall {
                page,
                category,
                height,
                usable_height,
            } => write!(
                f,
                "page {page}: header of '{category}' is {height:.1}pt tall \
                 but the page only holds {usable_height:.1}pt"
            ),
        }
    }
}

/// Result of a layout pass.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Layout {
    pub pages: Vec<LayoutPage>,
    pub warnings: Vec<LayoutWarning>,
}

impl Layout {
    pub fn is_empty(&self) -> bool {
        self.pages.is_empty()
    }

    pub fn entry_count(&self) -> usize {
        self.pages.iter().map(|p| p.entries().count()).sum()
    }
}

/// The layout engine.
#[derive(Debug, Clone)]
pub struct LayoutEngine {
    config: LayoutConfig,
    entry_style: EntryStyle,
}

/// Tracks where we are on the current page during layout.
#[derive(Debug)]
struct PageCursor {
    number: usize,
    y: f64,
    blocks: Vec<PlacedBlock>,
    overflow: bool,
}

impl PageCursor {
    fn new(config: &LayoutConfig, number: usize) -> Self {
        Self {
            number,
            y: config.margins.top,
            blocks: Vec::new(),
            overflow: false,
        }
    }

    fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }

    /// Breaking is pointless on an empty page and forbidden right after a
    /// header, which would strand it.
    fn can_break(&self) -> bool {
        !matches!(
            self.blocks.last(),
            None | Some(PlacedBlock {
                block: ContentBlock::CategoryHeader { .. },
                ..
            })
        )
    }

    fn place(&mut self, block: ContentBlock, height: f64) {
        self.blocks.push(PlacedBlock {
            y: self.y,
            height,
            block,
        });
        self.y += height;
    }

    fn finalize(self) -> LayoutPage {
        LayoutPage {
            number: self.number,
            blocks: self.blocks,
            overflow: self.overflow,
        }
    }
}

impl LayoutEngine {
    pub fn new(config: LayoutConfig) -> Self {
        Self {
            config,
            entry_style: EntryStyle::default(),
        }
    }

    /// Entry geometry used by measured-height mode.
    pub fn with_entry_style(mut self, entry_style: EntryStyle) -> Self {
        self.entry_style = entry_style;
        self
    }

    /// Height of the entry block for `product`, without its separator.
    pub fn entry_height(&self, product: &Product) -> f64 {
        match self.config.mode {
            LayoutMode::FixedHeight => self.config.entry_height,
            LayoutMode::MeasuredHeight => self.entry_style.measure(product),
        }
    }

    /// Lay out category groups into pages.
    pub fn layout(&self, groups: &[CategoryGroup]) -> Layout {
        let mut pages: Vec<LayoutPage> = Vec::new();
        let mut warnings: Vec<LayoutWarning> = Vec::new();
        let mut cursor = PageCursor::new(&self.config, 1);
        let limit = self.config.limit();
        let separator = self.config.separator_height.max(0.0);

        for group in groups {
            let heights: Vec<f64> = group.members.iter().map(|p| self.entry_height(p)).collect();
            let Some(&first_height) = heights.first() else {
                continue;
            };

            // The header opens only where its first entry fits too.
            let opening = self.config.header_height + first_height + separator;
            let decision = if self.config.category_per_page && !cursor.is_empty() {
                BreakDecision::MoveToNextPage
            } else {
                decide_break(cursor.y, opening, limit, cursor.can_break())
            };
            if decision == BreakDecision::MoveToNextPage {
                self.break_page(&mut cursor, &mut pages);
            }
            self.place_header(&mut cursor, &group.name, false, &mut warnings);

            for (product, &height) in group.members.iter().zip(&heights) {
                let footprint = height + separator;
                if decide_break(cursor.y, footprint, limit, cursor.can_break())
                    == BreakDecision::MoveToNextPage
                {
                    log::debug!(
                        "page {} full at y={:.1}, continuing '{}' on the next page",
                        cursor.number,
                        cursor.y,
                        group.name
                    );
                    self.break_page(&mut cursor, &mut pages);
                    self.place_header(&mut cursor, &group.name, true, &mut warnings);
                }

                if decide_break(cursor.y, footprint, limit, false) == BreakDecision::Overflow {
                    let warning = LayoutWarning::EntryTooTall {
                        page: cursor.number,
                        category: group.name.clone(),
                        product: product.name.clone(),
                        height: footprint,
                        usable_height: self.config.usable_height(),
                    };
                    log::warn!("{warning}");
                    warnings.push(warning);
                    cursor.overflow = true;
                }

                cursor.place(ContentBlock::ProductEntry(product.clone()), height);
                if separator > 0.0 {
                    cursor.place(ContentBlock::Separator, separator);
                }
            }
        }

        if !cursor.is_empty() {
            pages.push(cursor.finalize());
        }

        Layout { pages, warnings }
    }

    fn break_page(&self, cursor: &mut PageCursor, pages: &mut Vec<LayoutPage>) {
        let next = PageCursor::new(&self.config, cursor.number + 1);
        let full = std::mem::replace(cursor, next);
        pages.push(full.finalize());
    }

    fn place_header(
        &self,
        cursor: &mut PageCursor,
        name: &str,
        continuation: bool,
        warnings: &mut Vec<LayoutWarning>,
    ) {
        let height = self.config.header_height;
        if decide_break(cursor.y, height, self.config.limit(), false) == BreakDecision::Overflow {
            let warning = LayoutWarning::HeaderTooTall {
                page: cursor.number,
                category: name.to_string(),
                height,
                usable_height: self.config.usable_height(),
            };
            log::warn!("{warning}");
            warnings.push(warning);
            cursor.overflow = true;
        }
        cursor.place(
            ContentBlock::CategoryHeader {
                name: name.to_string(),
                continuation,
            },
            height,
        );
    }
}
