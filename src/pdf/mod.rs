//! # PDF Serializer
//!
//! A [`RenderSink`] that draws the laid-out catalog and writes a valid PDF
//! file.
//!
//! This is a from-scratch PDF 1.7 writer. The catalog only needs the two
//! standard Helvetica faces, straight lines and embedded photos, so the
//! subset of the format we write is small: no font embedding, no
//! annotations, one content stream per page.
//!
//! ## PDF Structure (simplified)
//!
//! ```text
//! %PDF-1.7            <- header
//! 1 0 obj ... endobj  <- objects (fonts, pages, content streams, etc.)
//! 2 0 obj ... endobj
//! ...
//! xref                <- cross-reference table (byte offsets of each object)
//! trailer             <- points to the root object
//! %%EOF
//! ```
//!
//! Objects are appended as the sink receives pages. The catalog and page
//! tree objects are reserved up front and filled in by [`PdfSink::finish`].

use std::collections::{BTreeSet, HashMap};
use std::fmt::Write as FmtWrite; // for write! on String
use std::io::Write as IoWrite; // for write! on Vec<u8>
use std::path::PathBuf;

use miniz_oxide::deflate::compress_to_vec_zlib;
use serde::{Deserialize, Serialize};

use crate::error::{CatalogError, Result};
use crate::font::StandardFont;
use crate::image_loader::{fit_within, load_image, ImagePixelData, JpegColorSpace, LoadedImage};
use crate::layout::EntryStyle;
use crate::model::{display_category, mm, CoverPage, Metadata, PageConfig, Product};
use crate::render::{BlockPosition, RenderSink};

/// Fixed strings printed in the catalog.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Labels {
    /// Prefix of the product code line.
    pub codes: String,
    /// Appended to a continuation header.
    pub continued: String,
    /// Shown instead of an empty product name.
    pub untitled: String,
}

impl Default for Labels {
    fn default() -> Self {
        Self {
            codes: "Código:".to_string(),
            continued: "(cont.)".to_string(),
            untitled: "Sem nome".to_string(),
        }
    }
}

const HEADER_SIZE: f64 = 16.0;
const GRAY_RULE: f64 = 200.0 / 255.0;
const DESCRIPTION_GRAY: f64 = 0.3;

struct PdfObject {
    data: Vec<u8>,
}

struct EmbeddedImage {
    obj_id: usize,
    width_px: u32,
    height_px: u32,
}

/// The page currently being drawn.
struct PageState {
    number: usize,
    stream: String,
    images: BTreeSet<usize>,
}

/// Draws catalog pages into an in-memory PDF.
pub struct PdfSink {
    page: PageConfig,
    entry: EntryStyle,
    labels: Labels,
    metadata: Metadata,
    cover: Option<CoverPage>,
    image_base_dir: Option<PathBuf>,

    objects: Vec<PdfObject>,
    font_objects: Vec<(StandardFont, usize)>,
    page_objects: Vec<usize>,
    images: Vec<EmbeddedImage>,
    /// Image reference -> index into `images`, or None if it failed to load.
    image_cache: HashMap<String, Option<usize>>,
    current: Option<PageState>,
}

impl PdfSink {
    pub fn new(page: PageConfig, entry: EntryStyle) -> Self {
        let mut sink = Self {
            page,
            entry,
            labels: Labels::default(),
            metadata: Metadata::default(),
            cover: None,
            image_base_dir: None,
            objects: Vec::new(),
            font_objects: Vec::new(),
            page_objects: Vec::new(),
            images: Vec::new(),
            image_cache: HashMap::new(),
            current: None,
        };

        // Reserve object IDs:
        // 0 = placeholder (PDF objects are 1-indexed)
        // 1 = Catalog
        // 2 = Pages (page tree root)
        // 3+ = fonts, then images, page objects and content streams
        for _ in 0..3 {
            sink.objects.push(PdfObject { data: vec![] });
        }
        for font in StandardFont::ALL {
            let obj_id = sink.add_object(
                format!(
                    "<< /Type /Font /Subtype /Type1 /BaseFont /{} \
                     /Encoding /WinAnsiEncoding >>",
                    font.pdf_name()
                )
                .into_bytes(),
            );
            sink.font_objects.push((font, obj_id));
        }
        sink
    }

    pub fn with_labels(mut self, labels: Labels) -> Self {
        self.labels = labels;
        self
    }

    pub fn with_metadata(mut self, metadata: Metadata) -> Self {
        self.metadata = metadata;
        self
    }

    /// Put a cover page in front of the catalog pages.
    pub fn with_cover(mut self, cover: Option<CoverPage>) -> Self {
        self.cover = cover;
        self
    }

    /// Directory relative image paths are resolved against.
    pub fn with_image_base_dir(mut self, dir: Option<PathBuf>) -> Self {
        self.image_base_dir = dir;
        self
    }

    /// Pages in the finished document, cover included.
    pub fn page_count(&self) -> usize {
        self.page_objects.len() + usize::from(self.cover.is_some())
    }

    /// Close the document and serialize it.
    pub fn finish(mut self) -> Result<Vec<u8>> {
        if let Some(page) = &self.current {
            return Err(CatalogError::Render(format!(
                "page {} was never closed",
                page.number
            )));
        }
        if self.page_count() == 0 {
            return Err(CatalogError::Render("no pages were drawn".to_string()));
        }

        let mut kids: Vec<usize> = Vec::with_capacity(self.page_count());
        if let Some(cover) = self.cover.take() {
            let stream = self.cover_stream(&cover);
            kids.push(self.add_page(&stream, &BTreeSet::new()));
        }
        kids.extend_from_slice(&self.page_objects);

        self.objects[1].data = b"<< /Type /Catalog /Pages 2 0 R >>".to_vec();

        let kids_refs: String = kids
            .iter()
            .map(|id| format!("{} 0 R", id))
            .collect::<Vec<_>>()
            .join(" ");
        self.objects[2].data = format!(
            "<< /Type /Pages /Kids [{}] /Count {} >>",
            kids_refs,
            kids.len()
        )
        .into_bytes();

        let info = self.info_dict();
        let info_obj_id = self.add_object(info.into_bytes());

        Ok(self.serialize(info_obj_id))
    }

    fn add_object(&mut self, data: Vec<u8>) -> usize {
        let id = self.objects.len();
        self.objects.push(PdfObject { data });
        id
    }

    fn page_size(&self) -> (f64, f64) {
        self.page.size.dimensions()
    }

    /// Write a content stream and its page object. Returns the page's
    /// object ID.
    fn add_page(&mut self, content: &str, images: &BTreeSet<usize>) -> usize {
        let compressed = compress_to_vec_zlib(content.as_bytes(), 6);
        let mut content_data: Vec<u8> = Vec::new();
        let _ = write!(
            content_data,
            "<< /Length {} /Filter /FlateDecode >>\nstream\n",
            compressed.len()
        );
        content_data.extend_from_slice(&compressed);
        content_data.extend_from_slice(b"\nendstream");
        let content_obj_id = self.add_object(content_data);

        let font_resources = self
            .font_objects
            .iter()
            .map(|(font, obj_id)| format!("/{} {} 0 R", font.resource_name(), obj_id))
            .collect::<Vec<_>>()
            .join(" ");
        let xobject_resources = images
            .iter()
            .map(|&idx| format!("/Im{} {} 0 R", idx, self.images[idx].obj_id))
            .collect::<Vec<_>>()
            .join(" ");
        let resources = if xobject_resources.is_empty() {
            format!("/Font << {} >>", font_resources)
        } else {
            format!("/Font << {} >> /XObject << {} >>", font_resources, xobject_resources)
        };

        let (width, height) = self.page_size();
        let page_dict = format!(
            "<< /Type /Page /Parent 2 0 R /MediaBox [0 0 {:.2} {:.2}] \
             /Contents {} 0 R /Resources << {} >> >>",
            width, height, content_obj_id, resources
        );
        self.add_object(page_dict.into_bytes())
    }

    fn info_dict(&self) -> String {
        let mut info = String::from("<< ");
        if let Some(ref title) = self.metadata.title {
            let _ = write!(info, "/Title ({}) ", encode_text(title));
        }
        if let Some(ref author) = self.metadata.author {
            let _ = write!(info, "/Author ({}) ", encode_text(author));
        }
        if let Some(ref subject) = self.metadata.subject {
            let _ = write!(info, "/Subject ({}) ", encode_text(subject));
        }
        let _ = write!(
            info,
            "/Producer (Vitrine {}) /Creator (Vitrine) >>",
            env!("CARGO_PKG_VERSION")
        );
        info
    }

    /// Cover page: title, subtitle and date centred on the page.
    fn cover_stream(&self, cover: &CoverPage) -> String {
        let (width, height) = self.page_size();
        let mut stream = String::new();
        let lines = [
            (Some(cover.title.as_str()), StandardFont::HelveticaBold, 28.0, mm(80.0)),
            (cover.subtitle.as_deref(), StandardFont::Helvetica, 20.0, mm(100.0)),
            (cover.date.as_deref(), StandardFont::Helvetica, 12.0, mm(120.0)),
        ];
        for (text, font, size, baseline) in lines {
            let Some(text) = text.filter(|t| !t.is_empty()) else {
                continue;
            };
            let x = ((width - font.measure_string(text, size)) / 2.0).max(0.0);
            write_text(&mut stream, font, size, 0.0, x, height - baseline, text);
        }
        stream
    }

    /// Load and embed an image the first time its reference is seen.
    /// Failures are logged once and remembered.
    fn embed_image(&mut self, src: &str) -> Option<usize> {
        let src = src.trim();
        if src.is_empty() {
            return None;
        }
        if let Some(&cached) = self.image_cache.get(src) {
            return cached;
        }

        let embedded = match load_image(src, self.image_base_dir.as_deref()) {
            Ok(image) => {
                let obj_id = self.write_image_xobject(&image);
                self.images.push(EmbeddedImage {
                    obj_id,
                    width_px: image.width_px,
                    height_px: image.height_px,
                });
                Some(self.images.len() - 1)
            }
            Err(e) => {
                let shown: String = src.chars().take(60).collect();
                log::warn!("Drawing entry without image '{}': {}", shown, e);
                None
            }
        };
        self.image_cache.insert(src.to_string(), embedded);
        embedded
    }

    /// Write a single image as one or two XObject PDF objects.
    /// Returns the main XObject ID.
    fn write_image_xobject(&mut self, image: &LoadedImage) -> usize {
        match &image.pixel_data {
            ImagePixelData::Jpeg { data, color_space } => {
                let color_space_str = match color_space {
                    JpegColorSpace::DeviceRGB => "/DeviceRGB",
                    JpegColorSpace::DeviceGray => "/DeviceGray",
                };

                let mut obj_data: Vec<u8> = Vec::new();
                let _ = write!(
                    obj_data,
                    "<< /Type /XObject /Subtype /Image \
                     /Width {} /Height {} \
                     /ColorSpace {} \
                     /BitsPerComponent 8 \
                     /Filter /DCTDecode \
                     /Length {} >>\nstream\n",
                    image.width_px,
                    image.height_px,
                    color_space_str,
                    data.len()
                );
                obj_data.extend_from_slice(data);
                obj_data.extend_from_slice(b"\nendstream");
                self.add_object(obj_data)
            }

            ImagePixelData::Decoded { rgb, alpha } => {
                // SMask first, so the image can reference it
                let smask_id = alpha.as_ref().map(|alpha_data| {
                    let compressed_alpha = compress_to_vec_zlib(alpha_data, 6);
                    let mut smask_data: Vec<u8> = Vec::new();
                    let _ = write!(
                        smask_data,
                        "<< /Type /XObject /Subtype /Image \
                         /Width {} /Height {} \
                         /ColorSpace /DeviceGray \
                         /BitsPerComponent 8 \
                         /Filter /FlateDecode \
                         /Length {} >>\nstream\n",
                        image.width_px,
                        image.height_px,
                        compressed_alpha.len()
                    );
                    smask_data.extend_from_slice(&compressed_alpha);
                    smask_data.extend_from_slice(b"\nendstream");
                    self.add_object(smask_data)
                });

                let compressed_rgb = compress_to_vec_zlib(rgb, 6);
                let smask_ref = smask_id
                    .map(|id| format!(" /SMask {} 0 R", id))
                    .unwrap_or_default();

                let mut obj_data: Vec<u8> = Vec::new();
                let _ = write!(
                    obj_data,
                    "<< /Type /XObject /Subtype /Image \
                     /Width {} /Height {} \
                     /ColorSpace /DeviceRGB \
                     /BitsPerComponent 8 \
                     /Filter /FlateDecode \
                     /Length {}{} >>\nstream\n",
                    image.width_px,
                    image.height_px,
                    compressed_rgb.len(),
                    smask_ref
                );
                obj_data.extend_from_slice(&compressed_rgb);
                obj_data.extend_from_slice(b"\nendstream");
                self.add_object(obj_data)
            }
        }
    }

    fn current_page(&mut self) -> Result<&mut PageState> {
        self.current
            .as_mut()
            .ok_or_else(|| CatalogError::Render("drawing outside of a page".to_string()))
    }

    /// Serialize all objects into the final PDF byte stream.
    fn serialize(&self, info_obj_id: usize) -> Vec<u8> {
        let mut output: Vec<u8> = Vec::new();
        let mut offsets: Vec<usize> = vec![0; self.objects.len()];

        // Header
        output.extend_from_slice(b"%PDF-1.7\n");
        output.extend_from_slice(b"%\xe2\xe3\xcf\xd3\n");

        for (i, obj) in self.objects.iter().enumerate().skip(1) {
            offsets[i] = output.len();
            let _ = write!(output, "{} 0 obj\n", i);
            output.extend_from_slice(&obj.data);
            output.extend_from_slice(b"\nendobj\n\n");
        }

        let xref_offset = output.len();
        let _ = write!(output, "xref\n0 {}\n", self.objects.len());
        let _ = write!(output, "0000000000 65535 f \n");
        for offset in offsets.iter().skip(1) {
            let _ = write!(output, "{:010} 00000 n \n", offset);
        }

        let _ = write!(
            output,
            "trailer\n<< /Size {} /Root 1 0 R /Info {} 0 R >>\nstartxref\n{}\n%%EOF\n",
            self.objects.len(),
            info_obj_id,
            xref_offset
        );

        output
    }
}

impl RenderSink for PdfSink {
    fn begin_page(&mut self, number: usize) -> Result<()> {
        if let Some(open) = &self.current {
            return Err(CatalogError::Render(format!(
                "page {} opened while page {} is still open",
                number, open.number
            )));
        }
        self.current = Some(PageState {
            number,
            stream: String::new(),
            images: BTreeSet::new(),
        });
        Ok(())
    }

    fn draw_header(&mut self, name: &str, continuation: bool, pos: BlockPosition) -> Result<()> {
        let (width, height) = self.page_size();
        let left = self.page.margin.left;
        let right = width - self.page.margin.right;
        let mut label = display_category(name);
        if continuation {
            label.push(' ');
            label.push_str(&self.labels.continued);
        }

        let state = self.current_page()?;
        write_text(
            &mut state.stream,
            StandardFont::HelveticaBold,
            HEADER_SIZE,
            0.0,
            left,
            height - (pos.y + mm(5.0)),
            &label,
        );
        write_rule(&mut state.stream, left, right, height - (pos.y + mm(8.0)), 0.5, 0.0);
        Ok(())
    }

    fn draw_entry(&mut self, product: &Product, pos: BlockPosition) -> Result<()> {
        self.current_page()?;
        let image = self.embed_image(&product.image_ref).map(|idx| {
            let img = &self.images[idx];
            (idx, img.width_px, img.height_px)
        });
        let description = self.entry.description_lines(product);
        let (_, height) = self.page_size();
        let left = self.page.margin.left;
        let style = self.entry.clone();
        let text_x = left + style.image_size + style.gutter;

        let name = if product.name.trim().is_empty() {
            self.labels.untitled.clone()
        } else {
            product.name.clone()
        };
        let codes = (!product.codes.is_empty())
            .then(|| format!("{} {}", self.labels.codes, product.codes_joined()));

        let state = self.current_page()?;

        if let Some((idx, width_px, height_px)) = image {
            let (w, h) = fit_within(width_px, height_px, style.image_size, style.image_size);
            let x = left + (style.image_size - w) / 2.0;
            let top = pos.y + (style.image_size - h) / 2.0;
            let _ = write!(
                state.stream,
                "q\n{:.4} 0 0 {:.4} {:.2} {:.2} cm\n/Im{} Do\nQ\n",
                w,
                h,
                x,
                height - top - h,
                idx
            );
            state.images.insert(idx);
        }

        write_text(
            &mut state.stream,
            StandardFont::HelveticaBold,
            style.name_size,
            0.0,
            text_x,
            height - (pos.y + style.name_offset),
            &name,
        );
        if let Some(codes) = codes {
            write_text(
                &mut state.stream,
                StandardFont::Helvetica,
                style.code_size,
                0.0,
                text_x,
                height - (pos.y + style.code_offset),
                &codes,
            );
        }
        for (i, line) in description.iter().enumerate() {
            let baseline = pos.y + style.description_offset + i as f64 * style.description_step();
            write_text(
                &mut state.stream,
                StandardFont::Helvetica,
                style.description_size,
                DESCRIPTION_GRAY,
                text_x,
                height - baseline,
                line.trim_end(),
            );
        }
        Ok(())
    }

    fn draw_separator(&mut self, pos: BlockPosition) -> Result<()> {
        let (width, height) = self.page_size();
        let left = self.page.margin.left;
        let right = width - self.page.margin.right;
        let state = self.current_page()?;
        write_rule(
            &mut state.stream,
            left,
            right,
            height - (pos.y + pos.height / 2.0),
            0.5,
            GRAY_RULE,
        );
        Ok(())
    }

    fn end_page(&mut self) -> Result<()> {
        let state = self
            .current
            .take()
            .ok_or_else(|| CatalogError::Render("end_page without an open page".to_string()))?;
        let page_id = self.add_page(&state.stream, &state.images);
        self.page_objects.push(page_id);
        Ok(())
    }
}

/// Emit one line of text. `y` is the baseline in PDF coordinates.
fn write_text(
    stream: &mut String,
    font: StandardFont,
    size: f64,
    gray: f64,
    x: f64,
    y: f64,
    text: &str,
) {
    if text.is_empty() {
        return;
    }
    let _ = write!(
        stream,
        "BT\n{:.3} {:.3} {:.3} rg\n/{} {:.1} Tf\n{:.2} {:.2} Td\n({}) Tj\nET\n",
        gray,
        gray,
        gray,
        font.resource_name(),
        size,
        x,
        y,
        encode_text(text)
    );
}

/// A horizontal line from `x1` to `x2` at height `y`.
fn write_rule(stream: &mut String, x1: f64, x2: f64, y: f64, width: f64, gray: f64) {
    let _ = write!(
        stream,
        "q\n{:.3} {:.3} {:.3} RG\n{:.2} w\n{:.2} {:.2} m\n{:.2} {:.2} l\nS\nQ\n",
        gray, gray, gray, width, x1, y, x2, y
    );
}

/// Encode text as the body of a PDF literal string in WinAnsiEncoding.
/// Characters outside the encoding become '?'.
fn encode_text(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for ch in text.chars() {
        let b = unicode_to_winansi(ch).unwrap_or(b'?');
        match b {
            b'\\' => out.push_str("\\\\"),
            b'(' => out.push_str("\\("),
            b')' => out.push_str("\\)"),
            0x20..=0x7E => out.push(b as char),
            _ => {
                // Octal escape for bytes outside ASCII printable range
                let _ = write!(out, "\\{:03o}", b);
            }
        }
    }
    out
}

/// Map a Unicode codepoint to a WinAnsiEncoding byte value.
///
/// WinAnsiEncoding is based on Windows-1252. Most codepoints in
/// 0x20..=0x7E and 0xA0..=0xFF map directly. The 0x80..=0x9F range
/// contains special mappings for smart quotes, bullets, dashes, etc.
fn unicode_to_winansi(ch: char) -> Option<u8> {
    let cp = ch as u32;
    if (0x20..=0x7E).contains(&cp) || (0xA0..=0xFF).contains(&cp) {
        return Some(cp as u8);
    }
    match cp {
        0x20AC => Some(0x80), // Euro sign
        0x201A => Some(0x82), // Single low-9 quotation mark
        0x0192 => Some(0x83), // Latin small letter f with hook
        0x201E => Some(0x84), // Double low-9 quotation mark
        0x2026 => Some(0x85), // Horizontal ellipsis
        0x2020 => Some(0x86), // Dagger
        0x2021 => Some(0x87), // Double dagger
        0x02C6 => Some(0x88), // Modifier letter circumflex accent
        0x2030 => Some(0x89), // Per mille sign
        0x0160 => Some(0x8A), // Latin capital letter S with caron
        0x2039 => Some(0x8B), // Single left-pointing angle quotation
        0x0152 => Some(0x8C), // Latin capital ligature OE
        0x017D => Some(0x8E), // Latin capital letter Z with caron
        0x2018 => Some(0x91), // Left single quotation mark
        0x2019 => Some(0x92), // Right single quotation mark
        0x201C => Some(0x93), // Left double quotation mark
        0x201D => Some(0x94), // Right double quotation mark
        0x2022 => Some(0x95), // Bullet
        0x2013 => Some(0x96), // En dash
        0x2014 => Some(0x97), // Em dash
        0x02DC => Some(0x98), // Small tilde
        0x2122 => Some(0x99), // Trade mark sign
        0x0161 => Some(0x9A), // Latin small letter s with caron
        0x203A => Some(0x9B), // Single right-pointing angle quotation
        0x0153 => Some(0x9C), // Latin small ligature oe
        0x017E => Some(0x9E), // Latin small letter z with caron
        0x0178 => Some(0x9F), // Latin capital letter Y with diaeresis
        _ => None,
    }
}
