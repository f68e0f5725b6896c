use wasm_bindgen::prelude::*;

use crate::export::{export_catalog, ExportOptions};
use crate::loader::parse_products;
use crate::render::CancelToken;

/// Export product JSON to PDF bytes with the default options.
#[wasm_bindgen]
pub fn export_catalog_pdf(json: &str) -> Result<Vec<u8>, JsValue> {
    crate::export_json(json).map_err(|e| JsValue::from_str(&e.to_string()))
}

/// Export product JSON to PDF bytes, with export options passed as a JS
/// object in the same shape as the JSON options document.
#[wasm_bindgen]
pub fn export_catalog_pdf_with_options(json: &str, options: JsValue) -> Result<Vec<u8>, JsValue> {
    let options: ExportOptions = if options.is_undefined() || options.is_null() {
        ExportOptions::default()
    } else {
        serde_wasm_bindgen::from_value(options)?
    };
    let products = parse_products(json).map_err(|e| JsValue::from_str(&e.to_string()))?;
    export_catalog(&products, &options, &CancelToken::new())
        .map(|pdf| pdf.bytes)
        .map_err(|e| JsValue::from_str(&e.to_string()))
}
