//! Structured error types for Vitrine.
//!
//! Loading and image problems are mostly absorbed where they happen (the
//! loader fails open, a broken image just leaves its box empty). What is
//! left here are the errors a caller actually has to react to.

use std::path::PathBuf;

/// Result type alias for Vitrine operations.
pub type Result<T> = std::result::Result<T, CatalogError>;

/// The unified error type returned by the public Vitrine API.
#[derive(Debug, thiserror::Error)]
pub enum CatalogError {
    /// JSON input failed to parse as product data or export options.
    #[error("Failed to parse catalog data: {source}")]
    Parse {
        #[source]
        source: serde_json::Error,
        hint: String,
    },

    /// A file could not be read or written.
    #[error("I/O error on '{}': {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// An image reference could not be resolved or decoded.
    #[error("Image error: {0}")]
    Image(String),

    /// The render sink failed while drawing the catalog.
    #[error("Render error: {0}")]
    Render(String),

    /// No product carries a category, so the catalog would be empty.
    #[error("Nothing to export: no product has a category")]
    NothingToExport,

    /// The export was cancelled before it finished.
    #[error("Export cancelled")]
    Cancelled,
}

impl CatalogError {
    /// A short suggestion for fixing a parse error, if there is one.
    pub fn hint(&self) -> Option<&str> {
        match self {
            CatalogError::Parse { hint, .. } if !hint.is_empty() => Some(hint),
            _ => None,
        }
    }
}

impl From<serde_json::Error> for CatalogError {
    fn from(e: serde_json::Error) -> Self {
        let hint = match e.classify() {
            serde_json::error::Category::Syntax => {
                "Check for trailing commas, missing quotes, or unescaped characters.".to_string()
            }
            serde_json::error::Category::Data => {
                "The JSON is valid but doesn't match the catalog schema. Check field names and types.".to_string()
            }
            serde_json::error::Category::Eof => {
                "Unexpected end of input, is the JSON truncated?".to_string()
            }
            serde_json::error::Category::Io => String::new(),
        };
        CatalogError::Parse { source: e, hint }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn syntax_error_carries_hint() {
        let err: CatalogError = serde_json::from_str::<serde_json::Value>("{,}")
            .unwrap_err()
            .into();
        assert!(err.hint().unwrap().contains("trailing commas"));
        assert!(err.to_string().starts_with("Failed to parse catalog data"));
    }

    #[test]
    fn non_parse_errors_have_no_hint() {
        assert!(CatalogError::Cancelled.hint().is_none());
        assert_eq!(
            CatalogError::NothingToExport.to_string(),
            "Nothing to export: no product has a category"
        );
    }
}
