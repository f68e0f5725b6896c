//! # Entry Geometry
//!
//! How a product entry is arranged: a square image box on the left, the
//! name, code line and description stacked in a text column on the right.
//! The PDF sink draws with these numbers; the measured-height layout mode
//! derives the entry height from them.

use serde::{Deserialize, Serialize};

use crate::font::StandardFont;
use crate::model::{mm, PageConfig, Product};
use crate::text::{break_into_lines, truncate_description};

/// Geometry and typography of a product entry. Offsets are measured from
/// the top of the entry block.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct EntryStyle {
    /// Side of the square image box.
    pub image_size: f64,
    /// Space between the image box and the text column.
    pub gutter: f64,
    /// Width of the text column.
    pub text_width: f64,
    pub name_size: f64,
    pub code_size: f64,
    pub description_size: f64,
    /// Line height as a multiple of the font size.
    pub line_height: f64,
    /// Baseline of the name.
    pub name_offset: f64,
    /// Baseline of the code line.
    pub code_offset: f64,
    /// Baseline of the first description line.
    pub description_offset: f64,
    /// Space kept below the taller of image and text.
    pub bottom_padding: f64,
    /// Descriptions longer than this many characters are cut with "...".
    pub max_description_chars: Option<usize>,
}

impl Default for EntryStyle {
    fn default() -> Self {
        Self::for_page(&PageConfig::default())
    }
}

impl EntryStyle {
    /// The default entry arrangement, with the text column filling the
    /// page's content width.
    pub fn for_page(page: &PageConfig) -> Self {
        let image_size = mm(25.0);
        let gutter = mm(5.0);
        Self {
            image_size,
            gutter,
            text_width: (page.content_width() - image_size - gutter - mm(5.0)).max(0.0),
            name_size: 12.0,
            code_size: 10.0,
            description_size: 9.0,
            line_height: 1.15,
            name_offset: mm(5.0),
            code_offset: mm(12.0),
            description_offset: mm(19.0),
            bottom_padding: mm(10.0),
            max_description_chars: Some(100),
        }
    }

    /// Description text as it will be drawn.
    pub fn description_lines(&self, product: &Product) -> Vec<String> {
        let description = truncate_description(&product.description, self.max_description_chars);
        break_into_lines(
            StandardFont::Helvetica,
            &description,
            self.description_size,
            self.text_width,
        )
        .into_iter()
        .map(|line| line.text)
        .collect()
    }

    /// Distance between description baselines.
    pub fn description_step(&self) -> f64 {
        self.description_size * self.line_height
    }

    /// Height an entry needs for its actual content.
    pub fn measure(&self, product: &Product) -> f64 {
        let lines = self.description_lines(product).len();
        let text_bottom = if lines == 0 {
            self.code_offset + descent(self.code_size)
        } else {
            self.description_offset
                + (lines - 1) as f64 * self.description_step()
                + descent(self.description_size)
        };
        text_bottom.max(self.image_size) + self.bottom_padding
    }
}

/// Helvetica descends about 0.21 em below the baseline.
fn descent(font_size: f64) -> f64 {
    font_size * 0.21
}
