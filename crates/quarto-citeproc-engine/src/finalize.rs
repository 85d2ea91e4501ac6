//! The finalize pass.
//!
//! Disambiguation (year suffixes, citation numbers) and bibliography sorting
//! look at the whole citation history and live outside the processor. The
//! processor calls its [`Finalizer`] lazily, before rendering, whenever
//! citations were appended since the last run.

use crate::citation::CitationQueue;
use crate::item::{ItemCache, ItemData};
use crate::style::Style;

pub trait Finalizer: Send + Sync {
    /// Assign year suffixes, citation numbers and other disambiguation data.
    ///
    /// Must be idempotent.
    fn finalize(&self, style: &Style, items: &mut ItemCache, citations: &CitationQueue);

    /// Items in bibliography order. Defaults to first-appearance order.
    fn sort_for_bibliography<'a>(
        &self,
        _style: &Style,
        items: &'a ItemCache,
        _citations: &CitationQueue,
    ) -> Vec<&'a ItemData> {
        items.iter().collect()
    }
}

/// Finalizer for styles that need neither disambiguation nor sorting.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopFinalizer;

impl Finalizer for NoopFinalizer {
    fn finalize(&self, _style: &Style, _items: &mut ItemCache, _citations: &CitationQueue) {}
}
