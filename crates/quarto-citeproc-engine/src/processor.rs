//! The citation processor.
//!
//! A [`Processor`] owns a compiled style, the item cache and the citation
//! queue. Citations are appended incrementally; rendering finalizes lazily.
//!
//! ```text
//! append_citations ──► ItemGetter (one batch per call)
//!        │
//!        ▼
//!   ItemCache + CitationQueue   (finalized = false)
//!        │
//!        ▼
//! render_citations / render_bibliography ──► Finalizer ──► Formatter
//! ```
//!
//! The processor is single-writer state. Appending needs `&mut self`, and so
//! do [`Processor::render_citations`] and [`Processor::render_bibliography`]
//! because they may have to finalize first. Once finalized, the
//! `render_finalized_*` variants take `&self` and may run concurrently.

use crate::citation::{Cite, Citation, CitationQueue, ItemSlot};
use crate::error::{Error, Result};
use crate::finalize::{Finalizer, NoopFinalizer};
use crate::format::Formatter;
use crate::item::{ItemCache, ItemGetter};
use crate::locale::LocaleGetter;
use crate::options::CiteprocOptions;
use crate::render::{Mode, RenderFlags, RenderMode, VarMap, render_item};
use crate::resolve::{StyleCompiler, resolve_style};
use crate::rich_text::RichText;
use crate::style::Style;

pub struct Processor {
    pub(crate) style: Style,
    pub(crate) items: ItemCache,
    pub(crate) queue: CitationQueue,
    pub(crate) finalized: bool,
    item_getter: Box<dyn ItemGetter>,
    pub(crate) finalizer: Box<dyn Finalizer>,
}

impl Processor {
    /// Create a processor for an already compiled style.
    ///
    /// The processor starts clean: empty cache, empty queue, nothing to
    /// finalize.
    pub fn new(style: Style, item_getter: impl ItemGetter + 'static) -> Self {
        Self {
            style,
            items: ItemCache::new(),
            queue: CitationQueue::new(),
            finalized: true,
            item_getter: Box::new(item_getter),
            finalizer: Box::new(NoopFinalizer),
        }
    }

    /// Resolve and compile `raw_style`, then create a processor for it.
    pub fn create<C>(
        raw_style: &str,
        compiler: &C,
        locales: &dyn LocaleGetter,
        item_getter: impl ItemGetter + 'static,
        preferred_locale: Option<&str>,
        force_locale: bool,
    ) -> Result<Self>
    where
        C: StyleCompiler + ?Sized,
    {
        let style = resolve_style(raw_style, compiler, locales, preferred_locale, force_locale)?;
        Ok(Self::new(style, item_getter))
    }

    /// [`Processor::create`] with locale preferences taken from `options`.
    pub fn from_options<C>(
        raw_style: &str,
        compiler: &C,
        locales: &dyn LocaleGetter,
        item_getter: impl ItemGetter + 'static,
        options: &CiteprocOptions,
    ) -> Result<Self>
    where
        C: StyleCompiler + ?Sized,
    {
        Self::create(
            raw_style,
            compiler,
            locales,
            item_getter,
            options.lang.as_deref(),
            options.force_lang,
        )
    }

    /// Replace the finalize pass.
    ///
    /// Existing items and citations have not been seen by the new finalizer,
    /// so a non-empty processor becomes dirty.
    pub fn with_finalizer(mut self, finalizer: impl Finalizer + 'static) -> Self {
        self.finalizer = Box::new(finalizer);
        self.finalized = self.items.is_empty() && self.queue.is_empty();
        self
    }

    pub fn style(&self) -> &Style {
        &self.style
    }

    pub fn items(&self) -> &ItemCache {
        &self.items
    }

    pub fn citations(&self) -> &CitationQueue {
        &self.queue
    }

    pub fn is_finalized(&self) -> bool {
        self.finalized
    }

    /// Ingest `citations` and queue them.
    ///
    /// Item ids not seen before are fetched in a single batch. On fetch
    /// failure nothing is cached and nothing is queued. Ids the getter does
    /// not return are cached unresolved: they keep their sequence number,
    /// are never fetched again, and render as `NO_ITEM_DATA:<id>`.
    pub fn append_citations(&mut self, citations: impl IntoIterator<Item = Citation>) -> Result<()> {
        let mut citations: Vec<Citation> = citations.into_iter().collect();

        self.ingest(citations.iter().flat_map(|c| c.ids()))?;

        for cite in citations.iter_mut().flat_map(|c| c.cites.iter_mut()) {
            let slot = if self.items.is_resolved(&cite.id) {
                ItemSlot::Cached
            } else {
                ItemSlot::Unprocessed
            };
            cite.attach(slot);
        }

        tracing::debug!(
            appended = citations.len(),
            queued = self.queue.len() + citations.len(),
            "appended citations"
        );
        self.queue.extend(citations);
        self.finalized = false;
        Ok(())
    }

    /// Ingest items that only appear in the bibliography.
    pub fn add_uncited<I, S>(&mut self, ids: I) -> Result<()>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let ids: Vec<S> = ids.into_iter().collect();
        self.ingest(ids.iter().map(|id| id.as_ref()))?;
        self.finalized = false;
        Ok(())
    }

    /// Fetch and cache the ids never ingested before. All or nothing.
    fn ingest<'a>(&mut self, ids: impl IntoIterator<Item = &'a str>) -> Result<()> {
        let new_ids = self.items.missing(ids);
        if new_ids.is_empty() {
            return Ok(());
        }

        let mut records = self
            .item_getter
            .fetch(&new_ids)
            .map_err(|e| Error::item_fetch(&new_ids, e))?;

        for id in new_ids {
            match records.remove(&id) {
                Some(record) => {
                    self.items.insert(id, record);
                }
                None => {
                    tracing::warn!(id = %id, "item getter returned no data; cites will render unprocessed");
                    self.items.insert_unresolved(id);
                }
            }
        }

        tracing::debug!(cached = self.items.len(), "ingested items");
        Ok(())
    }

    /// Drop all items and citations. The style and collaborators stay.
    pub fn clear(&mut self) {
        self.items.clear();
        self.queue.clear();
        self.finalized = true;
    }

    /// Run the finalize pass if anything changed since the last run.
    pub fn finalize(&mut self) {
        if self.finalized {
            return;
        }
        tracing::debug!(
            items = self.items.len(),
            citations = self.queue.len(),
            "finalizing"
        );
        self.finalizer
            .finalize(&self.style, &mut self.items, &self.queue);
        self.finalized = true;
    }

    /// Render every queued citation, in queue order.
    pub fn render_citations(&mut self, formatter: &dyn Formatter, no_links: bool) -> Vec<String> {
        self.finalize();
        self.citations_output(formatter, no_links)
    }

    /// [`Processor::render_citations`] for a finalized processor.
    ///
    /// Returns `None` when citations were added since the last finalize.
    pub fn render_finalized_citations(
        &self,
        formatter: &dyn Formatter,
        no_links: bool,
    ) -> Option<Vec<String>> {
        self.finalized
            .then(|| self.citations_output(formatter, no_links))
    }

    fn citations_output(&self, formatter: &dyn Formatter, no_links: bool) -> Vec<String> {
        self.queue
            .iter()
            .map(|citation| formatter.render_citation(citation, self, no_links))
            .collect()
    }

    /// Variables for rendering `cite`: the cached item overlaid with the
    /// cite's own fields.
    pub fn cite_vars(&self, cite: &Cite) -> VarMap {
        if cite.is_unprocessed() {
            return VarMap::unprocessed(&cite.id);
        }
        match self.items.get(&cite.id) {
            Some(item) if item.is_resolved() => VarMap::from_item(item).with_cite_fields(cite),
            _ => VarMap::unprocessed(&cite.id),
        }
    }

    /// Render one cite with the citation layout.
    pub fn render_cite(&self, cite: &Cite, render_mode: RenderMode, no_links: bool) -> RichText {
        let flags = RenderFlags {
            no_links,
            ..Default::default()
        };
        render_item(&self.cite_vars(cite), &self.style, Mode::Cite, render_mode, flags)
    }

    /// Render each cite of `citation` for display, in submission order.
    pub fn render_citation_items(&self, citation: &Citation, no_links: bool) -> Vec<RichText> {
        citation
            .cites
            .iter()
            .map(|cite| self.render_cite(cite, RenderMode::Display, no_links))
            .collect()
    }
}
