//! # Product Image Loading
//!
//! Resolves a product's image reference and prepares the picture for PDF
//! embedding. A reference is a data URI, a file path (relative paths are
//! resolved against the catalog data file's directory) or raw base64.
//!
//! JPEG images pass through without re-encoding (PDF supports DCTDecode
//! natively). PNG and WebP images are decoded to RGB pixels with a
//! separate alpha channel for SMask transparency.

use std::io::Cursor;
use std::path::{Path, PathBuf};

use crate::error::{CatalogError, Result};

/// A fully decoded/loaded image ready for PDF embedding.
#[derive(Debug, Clone)]
pub struct LoadedImage {
    pub pixel_data: ImagePixelData,
    pub width_px: u32,
    pub height_px: u32,
}

impl LoadedImage {
    /// Largest (width, height) that fits in a `box_w` x `box_h` box while
    /// keeping the image's aspect ratio.
    pub fn fit_within(&self, box_w: f64, box_h: f64) -> (f64, f64) {
        fit_within(self.width_px, self.height_px, box_w, box_h)
    }
}

/// Scale a `width_px` x `height_px` picture to fit a box, keeping its
/// aspect ratio.
pub fn fit_within(width_px: u32, height_px: u32, box_w: f64, box_h: f64) -> (f64, f64) {
    if width_px == 0 || height_px == 0 {
        return (0.0, 0.0);
    }
    let scale = (box_w / width_px as f64).min(box_h / height_px as f64);
    (width_px as f64 * scale, height_px as f64 * scale)
}

/// The pixel data in a format the PDF serializer can consume directly.
#[derive(Debug, Clone)]
pub enum ImagePixelData {
    /// Raw JPEG bytes, embedded as-is with DCTDecode.
    Jpeg {
        data: Vec<u8>,
        color_space: JpegColorSpace,
    },
    /// Decoded RGB pixels + optional alpha channel.
    Decoded {
        /// width * height * 3 bytes (RGB)
        rgb: Vec<u8>,
        /// width * height bytes (grayscale alpha). None if fully opaque.
        alpha: Option<Vec<u8>>,
    },
}

/// JPEG color space for the PDF /ColorSpace entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JpegColorSpace {
    DeviceRGB,
    DeviceGray,
}

/// Load the image behind a product's image reference.
///
/// Supported `src` formats:
/// - `data:image/...;base64,...` data URI
/// - File path; relative paths are joined onto `base_dir` when given
/// - Raw base64-encoded image data
///
/// Remote URLs are not fetched.
pub fn load_image(src: &str, base_dir: Option<&Path>) -> Result<LoadedImage> {
    let raw_bytes = read_source_bytes(src.trim(), base_dir)?;
    decode_image_bytes(&raw_bytes)
}

/// Resolve the source string to raw image bytes.
fn read_source_bytes(src: &str, base_dir: Option<&Path>) -> Result<Vec<u8>> {
    if src.is_empty() {
        return Err(CatalogError::Image("empty image reference".to_string()));
    }

    // Data URI: data:image/png;base64,iVBOR...
    if src.starts_with("data:image/") {
        let comma_pos = src
            .find(',')
            .ok_or_else(|| CatalogError::Image("Invalid data URI: missing comma".to_string()))?;
        return base64_decode(&src[comma_pos + 1..]);
    }

    if src.starts_with("http://") || src.starts_with("https://") {
        return Err(CatalogError::Image(format!(
            "Remote images are not fetched: '{src}'"
        )));
    }

    if looks_like_path(src) {
        return read_file(&resolve_path(src, base_dir));
    }

    base64_decode(src)
}

/// Base64 also contains '/', so only explicit path prefixes and image
/// file extensions count as paths.
fn looks_like_path(src: &str) -> bool {
    if src.starts_with('/') || src.starts_with("./") || src.starts_with("../") {
        return true;
    }
    let lower = src.to_ascii_lowercase();
    [".jpg", ".jpeg", ".png", ".webp"]
        .iter()
        .any(|ext| lower.ends_with(ext))
}

fn resolve_path(src: &str, base_dir: Option<&Path>) -> PathBuf {
    let path = Path::new(src);
    match base_dir {
        Some(dir) if path.is_relative() => dir.join(path),
        _ => path.to_path_buf(),
    }
}

#[cfg(not(target_arch = "wasm32"))]
fn read_file(path: &Path) -> Result<Vec<u8>> {
    std::fs::read(path).map_err(|e| {
        CatalogError::Image(format!(
            "Failed to read image file '{}': {}",
            path.display(),
            e
        ))
    })
}

#[cfg(target_arch = "wasm32")]
fn read_file(path: &Path) -> Result<Vec<u8>> {
    Err(CatalogError::Image(format!(
        "File path images not supported in WASM: '{}'. Use data URIs or base64.",
        path.display()
    )))
}

fn base64_decode(input: &str) -> Result<Vec<u8>> {
    use base64::Engine;
    base64::engine::general_purpose::STANDARD
        .decode(input.trim())
        .map_err(|e| CatalogError::Image(format!("Base64 decode error: {e}")))
}

/// Detect image format from magic bytes and decode accordingly.
fn decode_image_bytes(data: &[u8]) -> Result<LoadedImage> {
    if data.len() < 4 {
        return Err(CatalogError::Image("Image data too short".to_string()));
    }

    if is_jpeg(data) {
        decode_jpeg(data)
    } else if is_png(data) || is_webp(data) {
        decode_to_rgb(data)
    } else {
        Err(CatalogError::Image(
            "Unsupported image format (expected JPEG, PNG or WebP)".to_string(),
        ))
    }
}

fn is_jpeg(data: &[u8]) -> bool {
    data.len() >= 2 && data[0] == 0xFF && data[1] == 0xD8
}

fn is_png(data: &[u8]) -> bool {
    data.len() >= 4 && data[..4] == [0x89, b'P', b'N', b'G']
}

fn is_webp(data: &[u8]) -> bool {
    data.len() >= 12 && &data[..4] == b"RIFF" && &data[8..12] == b"WEBP"
}

/// JPEG: read dimensions and color space without decoding pixels.
fn decode_jpeg(data: &[u8]) -> Result<LoadedImage> {
    let reader = image::io::Reader::new(Cursor::new(data))
        .with_guessed_format()
        .map_err(|e| CatalogError::Image(format!("JPEG format detection error: {e}")))?;

    let (width, height) = reader
        .into_dimensions()
        .map_err(|e| CatalogError::Image(format!("Failed to read JPEG dimensions: {e}")))?;

    Ok(LoadedImage {
        pixel_data: ImagePixelData::Jpeg {
            data: data.to_vec(),
            color_space: detect_jpeg_color_space(data),
        },
        width_px: width,
        height_px: height,
    })
}

/// Scan JPEG markers for the SOF segment and read the component count.
fn detect_jpeg_color_space(data: &[u8]) -> JpegColorSpace {
    let mut i = 2; // skip SOI
    while i + 1 < data.len() {
        if data[i] != 0xFF {
            break;
        }
        let marker = data[i + 1];
        let is_sof = matches!(marker, 0xC0..=0xC3 | 0xC5..=0xC7 | 0xC9..=0xCB | 0xCD..=0xCF);
        // length(2) + precision(1) + height(2) + width(2) + num_components(1)
        if is_sof && i + 9 < data.len() {
            return if data[i + 9] == 1 {
                JpegColorSpace::DeviceGray
            } else {
                JpegColorSpace::DeviceRGB
            };
        }
        if i + 3 < data.len() {
            let seg_len = u16::from_be_bytes([data[i + 2], data[i + 3]]) as usize;
            i += 2 + seg_len;
        } else {
            break;
        }
    }
    JpegColorSpace::DeviceRGB
}

/// Decode to RGBA and split into RGB + alpha.
fn decode_to_rgb(data: &[u8]) -> Result<LoadedImage> {
    let img = image::io::Reader::new(Cursor::new(data))
        .with_guessed_format()
        .map_err(|e| CatalogError::Image(format!("Image format detection error: {e}")))?
        .decode()
        .map_err(|e| CatalogError::Image(format!("Failed to decode image: {e}")))?;

    let rgba = img.to_rgba8();
    let (width, height) = rgba.dimensions();

    let pixel_count = width as usize * height as usize;
    let mut rgb = Vec::with_capacity(pixel_count * 3);
    let mut alpha = Vec::with_capacity(pixel_count);
    for pixel in rgba.pixels() {
        rgb.extend_from_slice(&pixel.0[..3]);
        alpha.push(pixel[3]);
    }
    let has_transparency = alpha.iter().any(|&a| a != 255);

    Ok(LoadedImage {
        pixel_data: ImagePixelData::Decoded {
            rgb,
            alpha: has_transparency.then_some(alpha),
        },
        width_px: width,
        height_px: height,
    })
}
