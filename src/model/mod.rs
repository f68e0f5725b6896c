//! # Catalog Model
//!
//! The input representation: products as they come out of the catalog's
//! JSON data file, plus the page geometry the exporter lays them out on.
//!
//! Product data in the wild often uses Portuguese field names
//! (`produtos`, `nome`, `imagem`, `tipo`, `descricao`, `codigo`). Those are
//! accepted as aliases so an existing `data.json` loads unchanged.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

/// Points per millimetre. All geometry is in points (1/72 inch).
pub const MM: f64 = 72.0 / 25.4;

/// Convert millimetres to points.
pub fn mm(v: f64) -> f64 {
    v * MM
}

/// A single catalog product. Immutable once loaded.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    #[serde(alias = "nome", default, deserialize_with = "text_or_empty")]
    pub name: String,

    /// File path, data URI or raw base64 of the product photo.
    #[serde(alias = "imagem", alias = "image", default, deserialize_with = "text_or_empty")]
    pub image_ref: String,

    /// Missing, empty or blank categories keep the product out of the PDF
    /// export. It still shows up in cards and search.
    #[serde(
        alias = "tipo",
        default,
        deserialize_with = "non_blank",
        skip_serializing_if = "Option::is_none"
    )]
    pub category: Option<String>,

    #[serde(alias = "descricao", default, deserialize_with = "text_or_empty")]
    pub description: String,

    /// One or more product codes. Accepts a bare string, a number or an
    /// array of them. Anything else is skipped.
    #[serde(alias = "codigo", alias = "code", default, deserialize_with = "one_or_many")]
    pub codes: Vec<String>,
}

impl Product {
    pub fn new(name: &str, category: Option<&str>) -> Self {
        Self {
            name: name.to_string(),
            image_ref: String::new(),
            category: category.map(str::to_string),
            description: String::new(),
            codes: vec![],
        }
    }

    /// The category, if it is present and not blank.
    pub fn category(&self) -> Option<&str> {
        self.category
            .as_deref()
            .filter(|c| !c.trim().is_empty())
    }

    /// All codes joined for single-line display.
    pub fn codes_joined(&self) -> String {
        self.codes.join(", ")
    }
}

// Text fields are read leniently, one record at a time: numbers become
// their digits, null and other mistyped values become empty.

fn text_or_empty<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(loose_text(Value::deserialize(deserializer)?).unwrap_or_default())
}

fn loose_text(value: Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

fn one_or_many<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Value::deserialize(deserializer)? {
        Value::Array(items) => items.into_iter().filter_map(loose_text).collect(),
        single => loose_text(single).into_iter().collect(),
    })
}

fn non_blank<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = loose_text(Value::deserialize(deserializer)?);
    Ok(value.filter(|c| !c.trim().is_empty()))
}

/// The top-level shape of a catalog data file.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CatalogData {
    #[serde(alias = "produtos", default)]
    pub products: Vec<Product>,
}

/// Capitalize the first letter of a category for display, the way filter
/// buttons and PDF headers show it.
pub fn display_category(name: &str) -> String {
    let mut chars = name.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// Document metadata embedded in the PDF.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Metadata {
    pub title: Option<String>,
    pub author: Option<String>,
    pub subject: Option<String>,
}

impl Default for Metadata {
    fn default() -> Self {
        Self {
            title: Some("Catálogo de Produtos".to_string()),
            author: None,
            subject: None,
        }
    }
}

/// Optional first page of the catalog.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CoverPage {
    pub title: String,
    #[serde(default)]
    pub subtitle: Option<String>,
    /// Already formatted date line. The CLI fills in today's date.
    #[serde(default)]
    pub date: Option<String>,
}

/// Configuration for a page: size and margins.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageConfig {
    /// Page size. Defaults to A4.
    #[serde(default)]
    pub size: PageSize,

    /// Page margins in points.
    #[serde(default = "default_margin")]
    pub margin: Edges,
}

impl Default for PageConfig {
    fn default() -> Self {
        Self {
            size: PageSize::A4,
            margin: default_margin(),
        }
    }
}

/// 15 mm around the page, with 30 mm kept free at the bottom.
fn default_margin() -> Edges {
    Edges {
        top: mm(15.0),
        right: mm(15.0),
        bottom: mm(30.0),
        left: mm(15.0),
    }
}

impl PageConfig {
    /// Width available between the left and right margins.
    pub fn content_width(&self) -> f64 {
        let (w, _) = self.size.dimensions();
        w - self.margin.horizontal()
    }
}

/// Standard page sizes in points.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub enum PageSize {
    #[default]
    A4,
    A5,
    Letter,
    Legal,
    Custom {
        width: f64,
        height: f64,
    },
}

impl PageSize {
    /// Returns (width, height) in points.
    pub fn dimensions(&self) -> (f64, f64) {
        match self {
            PageSize::A4 => (595.28, 841.89),
            PageSize::A5 => (419.53, 595.28),
            PageSize::Letter => (612.0, 792.0),
            PageSize::Legal => (612.0, 1008.0),
            PageSize::Custom { width, height } => (*width, *height),
        }
    }
}

/// Edge values (top, right, bottom, left).
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Edges {
    pub top: f64,
    pub right: f64,
    pub bottom: f64,
    pub left: f64,
}

impl Edges {
    pub fn horizontal(&self) -> f64 {
        self.left + self.right
    }
}
