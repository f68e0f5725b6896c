//! # Render Replay
//!
//! The layout engine only decides *where* blocks go. Drawing is done by a
//! [`RenderSink`], which receives the laid-out pages block by block. The
//! PDF writer is one sink; tests use a sink that records the calls.
//!
//! Replay is strictly sequential: pages in order, blocks in order within a
//! page. A sink never sees a block before the page it belongs to has been
//! opened.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use crate::error::{CatalogError, Result};
use crate::layout::{ContentBlock, LayoutPage};
use crate::model::Product;

/// Where a block sits on its page. `y` is measured from the top edge.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BlockPosition {
    pub page: usize,
    pub y: f64,
    pub height: f64,
}

/// Receives laid-out content in reading order.
pub trait RenderSink {
    /// Open page `number` (1-based, counting catalog pages only).
    fn begin_page(&mut self, number: usize) -> Result<()>;

    /// Draw a category header. `continuation` marks a header repeated at
    /// the top of a page because its category ran over.
    fn draw_header(&mut self, name: &str, continuation: bool, pos: BlockPosition) -> Result<()>;

    fn draw_entry(&mut self, product: &Product, pos: BlockPosition) -> Result<()>;

    fn draw_separator(&mut self, _pos: BlockPosition) -> Result<()> {
        Ok(())
    }

    fn end_page(&mut self) -> Result<()>;
}

/// Cooperative cancellation flag shared between an export and whoever
/// started it.
#[derive(Debug, Clone, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

/// Feed laid-out pages to a sink.
///
/// Cancellation is checked before each page; a cancelled replay stops
/// with [`CatalogError::Cancelled`] and leaves the sink with only whole
/// pages.
pub fn replay(pages: &[LayoutPage], sink: &mut dyn RenderSink, cancel: &CancelToken) -> Result<()> {
    for page in pages {
        if cancel.is_cancelled() {
            log::info!("export cancelled before page {}", page.number);
            return Err(CatalogError::Cancelled);
        }

        sink.begin_page(page.number)?;
        for placed in &page.blocks {
            let pos = BlockPosition {
                page: page.number,
                y: placed.y,
                height: placed.height,
            };
            match &placed.block {
                ContentBlock::CategoryHeader { name, continuation } => {
                    sink.draw_header(name, *continuation, pos)?
                }
                ContentBlock::ProductEntry(product) => sink.draw_entry(product, pos)?,
                ContentBlock::Separator => sink.draw_separator(pos)?,
            }
        }
        sink.end_page()?;
    }
    Ok(())
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::layout::{CategoryGroup, LayoutConfig, LayoutEngine, LayoutMode, VerticalMargins};

    /// Records every sink call as a line of text.
    #[derive(Default)]
    pub(crate) struct RecordingSink {
        pub calls: Vec<String>,
    }

    impl RenderSink for RecordingSink {
        fn begin_page(&mut self, number: usize) -> Result<()> {
            self.calls.push(format!("begin {number}"));
            Ok(())
        }

        fn draw_header(&mut self, name: &str, continuation: bool, pos: BlockPosition) -> Result<()> {
            let label = if continuation { " (cont.)" } else { "" };
            self.calls.push(format!("header {name}{label} @{}", pos.y));
            Ok(())
        }

        fn draw_entry(&mut self, product: &Product, pos: BlockPosition) -> Result<()> {
            self.calls.push(format!("entry {} @{}", product.name, pos.y));
            Ok(())
        }

        fn end_page(&mut self) -> Result<()> {
            self.calls.push("end".to_string());
            Ok(())
        }
    }

    fn pages() -> Vec<LayoutPage> {
        let engine = LayoutEngine::new(LayoutConfig {
            page_height: 100.0,
            margins: VerticalMargins::default(),
            header_height: 10.0,
            entry_height: 40.0,
            separator_height: 0.0,
            mode: LayoutMode::FixedHeight,
            category_per_page: false,
        });
        let group = CategoryGroup {
            name: "oils".into(),
            members: (0..3)
                .map(|i| Product::new(&format!("p{i}"), Some("oils")))
                .collect(),
        };
        engine.layout(&[group]).pages
    }

    #[test]
    fn replays_in_reading_order() {
        let mut sink = RecordingSink::default();
        replay(&pages(), &mut sink, &CancelToken::new()).unwrap();
        assert_eq!(
            sink.calls,
            vec![
                "begin 1",
                "header oils @0",
                "entry p0 @10",
                "entry p1 @50",
                "end",
                "begin 2",
                "header oils (cont.) @0",
                "entry p2 @10",
                "end",
            ]
        );
    }

    #[test]
    fn cancelled_replay_draws_nothing() {
        let cancel = CancelToken::new();
        cancel.cancel();
        let mut sink = RecordingSink::default();
        let err = replay(&pages(), &mut sink, &cancel).unwrap_err();
        assert!(matches!(err, CatalogError::Cancelled));
        assert!(sink.calls.is_empty());
    }

    #[test]
    fn sink_errors_stop_the_replay() {
        struct Failing;
        impl RenderSink for Failing {
            fn begin_page(&mut self, _: usize) -> Result<()> {
                Ok(())
            }
            fn draw_header(&mut self, _: &str, _: bool, _: BlockPosition) -> Result<()> {
                Err(CatalogError::Render("boom".into()))
            }
            fn draw_entry(&mut self, _: &Product, _: BlockPosition) -> Result<()> {
                panic!("entry drawn after a failed header");
            }
            fn end_page(&mut self) -> Result<()> {
                Ok(())
            }
        }
        let err = replay(&pages(), &mut Failing, &CancelToken::new()).unwrap_err();
        assert!(matches!(err, CatalogError::Render(_)));
    }

    #[test]
    fn cancel_token_is_shared_between_clones() {
        let a = CancelToken::new();
        let b = a.clone();
        assert!(!b.is_cancelled());
        a.cancel();
        assert!(b.is_cancelled());
    }
}
