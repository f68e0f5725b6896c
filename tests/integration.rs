//! Integration tests for the Vitrine catalog pipeline.
//!
//! These tests exercise the full path from JSON product data to PDF output.
//! They verify:
//! - Product JSON (Portuguese field names included) loads
//! - Categories are grouped, sorted and paginated the right way
//! - Continuation headers appear where a category runs over a page
//! - PDF output is structurally valid
//! - Browsing and export agree on which products exist

use std::path::PathBuf;

use vitrine::export::{export_catalog, export_with_sink, layout_catalog, ExportOptions};
use vitrine::layout::{
    group_by_category, CategoryGroup, ContentBlock, EntryStyle, LayoutConfig, LayoutEngine,
    LayoutMode, LayoutPage, VerticalMargins,
};
use vitrine::loader::{parse_products, JsonFileSource, ProductSource};
use vitrine::model::{CoverPage, PageConfig, Product};
use vitrine::render::{BlockPosition, RenderSink};
use vitrine::store::{BrowseEvent, BrowseState, CategoryFilter, ProductStore};
use vitrine::{CancelToken, CatalogError};

// ─── Helpers ────────────────────────────────────────────────────

fn product(name: &str, category: Option<&str>) -> Product {
    Product::new(name, category)
}

fn category(name: &str, count: usize) -> Vec<Product> {
    (0..count)
        .map(|i| product(&format!("{name} {i}"), Some(name)))
        .collect()
}

/// brakes(2) / filters(9) / oils(1), in scrambled store order.
fn scenario_products() -> Vec<Product> {
    let mut products = category("oils", 1);
    products.extend(category("filters", 9));
    products.extend(category("brakes", 2));
    products
}

fn scenario_config(separator_height: f64) -> LayoutConfig {
    LayoutConfig {
        page_height: 250.0,
        margins: VerticalMargins::default(),
        header_height: 8.0,
        entry_height: 35.0,
        separator_height,
        mode: LayoutMode::FixedHeight,
        category_per_page: false,
    }
}

fn headers(page: &LayoutPage) -> Vec<(String, bool)> {
    page.blocks
        .iter()
        .filter_map(|b| match &b.block {
            ContentBlock::CategoryHeader { name, continuation } => {
                Some((name.clone(), *continuation))
            }
            _ => None,
        })
        .collect()
}

fn temp_dir(tag: &str) -> PathBuf {
    let dir = std::env::temp_dir().join(format!("vitrine-{}-{}", tag, std::process::id()));
    std::fs::create_dir_all(&dir).unwrap();
    dir
}

fn assert_valid_pdf(bytes: &[u8]) {
    assert!(bytes.len() > 50, "PDF too small to be valid");
    assert!(bytes.starts_with(b"%PDF-1.7"), "Missing PDF header");
    assert!(
        bytes.windows(5).any(|w| w == b"%%EOF"),
        "Missing %%EOF marker"
    );
    assert!(bytes.windows(4).any(|w| w == b"xref"), "Missing xref table");
    assert!(
        bytes.windows(7).any(|w| w == b"trailer"),
        "Missing trailer"
    );
}

fn count_pages(bytes: &[u8]) -> usize {
    let text = String::from_utf8_lossy(bytes);
    text.matches("/Type /Page ").count()
}

// ─── Grouping ───────────────────────────────────────────────────

#[test]
fn test_groups_sorted_and_categoryless_dropped() {
    let mut products = scenario_products();
    products.push(product("Brinde", None));
    let groups = group_by_category(&products);

    let names: Vec<_> = groups.iter().map(|g| g.name.as_str()).collect();
    assert_eq!(names, vec!["brakes", "filters", "oils"]);
    let total: usize = groups.iter().map(|g| g.members.len()).sum();
    assert_eq!(total, 12);
}

// ─── Pagination scenarios ───────────────────────────────────────

#[test]
fn test_filters_continue_under_continuation_header() {
    let groups = group_by_category(&scenario_products());
    let layout = LayoutEngine::new(scenario_config(0.0)).layout(&groups);

    assert_eq!(layout.pages.len(), 2);
    assert_eq!(
        headers(&layout.pages[0]),
        vec![("brakes".into(), false), ("filters".into(), false)]
    );
    assert_eq!(
        headers(&layout.pages[1]),
        vec![("filters".into(), true), ("oils".into(), false)]
    );
    assert!(layout.warnings.is_empty());
}

#[test]
fn test_separators_push_oils_to_page_three() {
    let groups = group_by_category(&scenario_products());
    let layout = LayoutEngine::new(scenario_config(7.0)).layout(&groups);

    assert_eq!(layout.pages.len(), 3);
    assert_eq!(headers(&layout.pages[1]), vec![("filters".into(), true)]);
    assert_eq!(
        headers(&layout.pages[2]),
        vec![("filters".into(), true), ("oils".into(), false)]
    );
    for page in &layout.pages {
        assert!(page.content_height() <= 250.0 + 1e-6);
    }
}

#[test]
fn test_category_per_page_reproduces_classic_catalog() {
    let groups = group_by_category(&scenario_products());
    let config = LayoutConfig {
        category_per_page: true,
        ..scenario_config(0.0)
    };
    let layout = LayoutEngine::new(config).layout(&groups);

    let firsts: Vec<_> = layout.pages.iter().map(|p| headers(p)[0].clone()).collect();
    assert_eq!(
        firsts,
        vec![
            ("brakes".to_string(), false),
            ("filters".to_string(), false),
            ("filters".to_string(), true),
            ("oils".to_string(), false),
        ]
    );
}

#[test]
fn test_page_sequence_is_reproducible() {
    let groups = group_by_category(&scenario_products());
    let engine = LayoutEngine::new(scenario_config(7.0));
    let a = serde_json::to_string(&engine.layout(&groups)).unwrap();
    let b = serde_json::to_string(&engine.layout(&groups)).unwrap();
    assert_eq!(a, b);
}

#[test]
fn test_pathological_entry_height_terminates() {
    let groups = vec![CategoryGroup {
        name: "huge".into(),
        members: category("huge", 3),
    }];
    let config = LayoutConfig {
        entry_height: 400.0,
        ..scenario_config(0.0)
    };
    let layout = LayoutEngine::new(config).layout(&groups);

    assert_eq!(layout.pages.len(), 3);
    assert!(layout.pages.iter().all(|p| p.overflow));
    assert_eq!(layout.warnings.len(), 3);
    assert_eq!(layout.entry_count(), 3);
}

#[test]
fn test_measured_mode_grows_long_entries() {
    let products: Vec<Product> = (0..20)
        .map(|i| {
            let mut p = product(&format!("Filtro {i}"), Some("filtros"));
            p.description = "Elemento filtrante de alta eficiência para motores diesel. ".repeat(10);
            p
        })
        .collect();

    let fixed = ExportOptions::default();
    let mut measured = ExportOptions::default();
    measured.layout.mode = LayoutMode::MeasuredHeight;
    measured.entry = Some(EntryStyle {
        max_description_chars: None,
        ..EntryStyle::for_page(&PageConfig::default())
    });

    let fixed_pages = layout_catalog(&products, &fixed).pages.len();
    let measured_pages = layout_catalog(&products, &measured).pages.len();
    assert!(
        measured_pages > fixed_pages,
        "measured {measured_pages} should exceed fixed {fixed_pages}"
    );
}

// ─── Full pipeline ──────────────────────────────────────────────

#[test]
fn test_portuguese_json_to_pdf() {
    let json = r#"{
        "produtos": [
            { "nome": "Pastilha", "tipo": "freios", "descricao": "Dianteira", "codigo": "PD-01" },
            { "nome": "Filtro", "tipo": "filtros", "codigo": ["F1", "F2"] },
            { "nome": "Brinde", "descricao": "Sem categoria" }
        ]
    }"#;
    let bytes = vitrine::export_json(json).unwrap();
    assert_valid_pdf(&bytes);
    assert_eq!(count_pages(&bytes), 1);
}

#[test]
fn test_bare_array_input() {
    let products =
        parse_products(r#"[{ "name": "Óleo", "category": "óleos", "codes": "O-1" }]"#).unwrap();
    assert_eq!(products.len(), 1);
    assert_eq!(products[0].codes, vec!["O-1"]);
}

#[test]
fn test_cover_page_adds_a_page() {
    let products = scenario_products();
    let options = ExportOptions {
        cover: Some(CoverPage {
            title: "Catálogo de Produtos".into(),
            subtitle: Some("Autotech Distribuidora".into()),
            date: Some("18/10/2026".into()),
        }),
        ..ExportOptions::default()
    };
    let without = export_catalog(&products, &ExportOptions::default(), &CancelToken::new()).unwrap();
    let with = export_catalog(&products, &options, &CancelToken::new()).unwrap();

    assert_valid_pdf(&with.bytes);
    assert_eq!(with.page_count, without.page_count + 1);
    assert_eq!(count_pages(&with.bytes), with.page_count);
}

#[test]
fn test_relative_image_paths_resolve_against_data_dir() {
    let dir = temp_dir("images");
    std::fs::create_dir_all(dir.join("img")).unwrap();
    let png = {
        let img = image::RgbaImage::from_pixel(3, 3, image::Rgba([200, 10, 10, 255]));
        let mut buf = Vec::new();
        let encoder = image::codecs::png::PngEncoder::new(&mut buf);
        image::ImageEncoder::write_image(encoder, img.as_raw(), 3, 3, image::ColorType::Rgba8)
            .unwrap();
        buf
    };
    std::fs::write(dir.join("img/pastilha.png"), png).unwrap();
    std::fs::write(
        dir.join("data.json"),
        r#"{ "produtos": [
            { "nome": "Pastilha", "imagem": "img/pastilha.png", "tipo": "freios" },
            { "nome": "Disco", "imagem": "img/pastilha.png", "tipo": "freios" },
            { "nome": "Sem foto", "imagem": "img/nao-existe.jpg", "tipo": "freios" }
        ] }"#,
    )
    .unwrap();

    let source = JsonFileSource::new(dir.join("data.json"));
    let options = ExportOptions {
        image_base_dir: source.base_dir(),
        ..ExportOptions::default()
    };
    let pdf = export_catalog(&source.fetch_products(), &options, &CancelToken::new()).unwrap();

    assert_valid_pdf(&pdf.bytes);
    let text = String::from_utf8_lossy(&pdf.bytes);
    assert_eq!(text.matches("/Subtype /Image").count(), 1);

    std::fs::remove_dir_all(&dir).ok();
}

// ─── Errors and asymmetries ─────────────────────────────────────

#[derive(Default)]
struct CountingSink {
    calls: usize,
}

impl RenderSink for CountingSink {
    fn begin_page(&mut self, _: usize) -> vitrine::Result<()> {
        self.calls += 1;
        Ok(())
    }
    fn draw_header(&mut self, _: &str, _: bool, _: BlockPosition) -> vitrine::Result<()> {
        self.calls += 1;
        Ok(())
    }
    fn draw_entry(&mut self, _: &Product, _: BlockPosition) -> vitrine::Result<()> {
        self.calls += 1;
        Ok(())
    }
    fn end_page(&mut self) -> vitrine::Result<()> {
        self.calls += 1;
        Ok(())
    }
}

#[test]
fn test_empty_product_list_is_nothing_to_export() {
    let products: Vec<Product> = vec![];
    assert!(group_by_category(&products).is_empty());
    assert!(layout_catalog(&products, &ExportOptions::default()).is_empty());

    let mut sink = CountingSink::default();
    let err = export_with_sink(
        &products,
        &ExportOptions::default(),
        &mut sink,
        &CancelToken::new(),
    )
    .unwrap_err();
    assert!(matches!(err, CatalogError::NothingToExport));
    assert_eq!(sink.calls, 0);
}

#[test]
fn test_missing_data_file_fails_open() {
    let source = JsonFileSource::new("/definitely/not/here/data.json");
    let store = ProductStore::load(&source);
    assert!(store.is_empty());
    assert!(store.cards(&BrowseState::default()).is_empty());

    let err = source.try_fetch().unwrap_err();
    assert!(matches!(err, CatalogError::Io { .. }));
}

#[test]
fn test_categoryless_product_in_cards_not_in_pdf() {
    let products = vec![
        product("Pastilha", Some("freios")),
        product("Chaveiro", None),
    ];
    let store = ProductStore::new(products.clone());

    let cards = store.cards(&BrowseState::default());
    assert!(cards.iter().any(|c| c.name == "Chaveiro"));

    let layout = layout_catalog(store.products(), &ExportOptions::default());
    let names: Vec<_> = layout
        .pages
        .iter()
        .flat_map(|p| p.entries())
        .map(|p| p.name.as_str())
        .collect();
    assert_eq!(names, vec!["Pastilha"]);
}

#[test]
fn test_browse_then_export_same_store() {
    let mut products = scenario_products();
    products[0].codes = vec!["OL-77".into()];
    let store = ProductStore::new(products);

    let mut state = BrowseState::default();
    state.apply(BrowseEvent::SelectCategory(CategoryFilter::Only("filters".into())));
    assert_eq!(store.cards(&state).len(), 9);

    state.apply(BrowseEvent::SelectCategory(CategoryFilter::All));
    state.apply(BrowseEvent::Search("ol-77".into()));
    let cards = store.cards(&state);
    assert_eq!(cards.len(), 1);
    assert_eq!(cards[0].name, "oils 0");

    state.apply(BrowseEvent::OpenProduct(0));
    assert!(store.detail(&state).is_some());
    state.apply(BrowseEvent::CloseDetail);
    assert!(store.detail(&state).is_none());

    let pdf = export_catalog(&store.snapshot(), &ExportOptions::default(), &CancelToken::new())
        .unwrap();
    assert_valid_pdf(&pdf.bytes);
}
