//! Shared fixtures for the integration tests.
#![allow(dead_code)]

use quarto_citeproc_engine::rich_text::{ISSUED_VAR, RENDERED_NAMES, RENDERED_VAR};
use quarto_citeproc_engine::{
    BoxError, Citation, CitationQueue, Finalizer, FormattingParams, Formatter, ItemCache,
    ItemData, ItemGetter, ItemRecord, Layout, Processor, RichText, Style,
};
use serde_json::json;
use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

pub fn record(id: &str, author: &str, title: &str, year: i64) -> ItemRecord {
    match json!({ "id": id, "author": author, "title": title, "issued": year }) {
        serde_json::Value::Object(map) => map,
        _ => unreachable!(),
    }
}

/// Item getter over fixed records that records every batch it is asked for.
#[derive(Clone, Default)]
pub struct FakeItemGetter {
    records: HashMap<String, ItemRecord>,
    calls: Arc<Mutex<Vec<Vec<String>>>>,
    fail: Arc<AtomicBool>,
}

impl FakeItemGetter {
    pub fn new(records: impl IntoIterator<Item = ItemRecord>) -> Self {
        let records = records
            .into_iter()
            .map(|r| (r["id"].as_str().unwrap().to_string(), r))
            .collect();
        Self {
            records,
            ..Default::default()
        }
    }

    pub fn library() -> Self {
        Self::new([
            record("doe2020", "Doe, J", "On Caching", 2020),
            record("doe2021", "Doe, J", "On Queues", 2021),
            record("roe2019", "Roe, R", "Layouts", 2019),
        ])
    }

    pub fn call_log(&self) -> Vec<Vec<String>> {
        self.calls.lock().unwrap().clone()
    }

    pub fn set_failing(&self, fail: bool) {
        self.fail.store(fail, Ordering::SeqCst);
    }
}

impl ItemGetter for FakeItemGetter {
    fn fetch(&self, ids: &[String]) -> Result<HashMap<String, ItemRecord>, BoxError> {
        self.calls.lock().unwrap().push(ids.to_vec());
        if self.fail.load(Ordering::SeqCst) {
            return Err("backend offline".into());
        }
        Ok(ids
            .iter()
            .filter_map(|id| self.records.get(id).map(|r| (id.clone(), r.clone())))
            .collect())
    }
}

/// `Author. Title Year`, with the author as a rendered-names group and the
/// year as the rendered `issued` variable.
pub fn entry_layout() -> Layout {
    Layout::new(|ctx| {
        RichText::group(vec![
            RichText::tagged(
                RENDERED_NAMES,
                true,
                vec![RichText::text(ctx.var_text("author").unwrap_or_default())],
            ),
            RichText::text(". "),
            RichText::text(ctx.var_text("title").unwrap_or_default()),
            RichText::text(" "),
            RichText::tagged(
                RENDERED_VAR,
                ISSUED_VAR,
                vec![RichText::text(ctx.var_text("issued").unwrap_or_default())],
            ),
        ])
    })
}

/// `Author Year`, plus `, locator` when the cite has one.
pub fn cite_layout() -> Layout {
    Layout::new(|ctx| {
        let mut children = vec![
            RichText::tagged(
                RENDERED_NAMES,
                true,
                vec![RichText::text(ctx.var_text("author").unwrap_or_default())],
            ),
            RichText::text(" "),
            RichText::tagged(
                RENDERED_VAR,
                ISSUED_VAR,
                vec![RichText::text(ctx.var_text("issued").unwrap_or_default())],
            ),
        ];
        if let Some(locator) = ctx.var_text("locator") {
            children.push(RichText::text(format!(", {}", locator)));
        }
        RichText::group(children)
    })
}

pub fn author_date_style() -> Style {
    Style::new("en-US", cite_layout()).with_bib_layout(entry_layout())
}

pub fn processor(getter: FakeItemGetter) -> Processor {
    Processor::new(author_date_style(), getter)
}

/// Plain-text formatter counting how often each hook runs.
#[derive(Default)]
pub struct PlainFormatter {
    pub rich_text_calls: Cell<usize>,
    pub bib_item_calls: Cell<usize>,
    pub bibliography_calls: Cell<usize>,
    pub last_params: RefCell<Option<FormattingParams>>,
}

impl Formatter for PlainFormatter {
    fn render_rich_text(&self, text: &RichText) -> String {
        self.rich_text_calls.set(self.rich_text_calls.get() + 1);
        text.to_plain()
    }

    fn render_bib_item(&self, item: &str, params: &FormattingParams) -> String {
        self.bib_item_calls.set(self.bib_item_calls.get() + 1);
        *self.last_params.borrow_mut() = Some(params.clone());
        item.to_string()
    }

    fn render_bibliography(&self, items: &[String], params: &FormattingParams) -> String {
        self.bibliography_calls.set(self.bibliography_calls.get() + 1);
        *self.last_params.borrow_mut() = Some(params.clone());
        items.join("\n")
    }

    fn render_citation(&self, citation: &Citation, processor: &Processor, no_links: bool) -> String {
        let parts: Vec<String> = processor
            .render_citation_items(citation, no_links)
            .iter()
            .map(|rt| self.render_rich_text(rt))
            .collect();
        format!("({})", parts.join("; "))
    }
}

/// Finalizer that counts its runs, gives year suffixes to items sharing
/// author and year, and can sort the bibliography by title.
#[derive(Clone, Default)]
pub struct TestFinalizer {
    pub(crate) finalize_calls: Arc<AtomicUsize>,
    pub(crate) sort_calls: Arc<AtomicUsize>,
    pub sort_by_title: bool,
}

impl TestFinalizer {
    pub fn finalize_calls(&self) -> usize {
        self.finalize_calls.load(Ordering::SeqCst)
    }

    pub fn sort_calls(&self) -> usize {
        self.sort_calls.load(Ordering::SeqCst)
    }
}

impl Finalizer for TestFinalizer {
    fn finalize(&self, _style: &Style, items: &mut ItemCache, _citations: &CitationQueue) {
        self.finalize_calls.fetch_add(1, Ordering::SeqCst);

        let mut groups: HashMap<(String, String), Vec<String>> = HashMap::new();
        for item in items.iter().filter(|item| item.is_resolved()) {
            let key = (
                item.field("author").map(|v| v.to_string()).unwrap_or_default(),
                item.field("issued").map(|v| v.to_string()).unwrap_or_default(),
            );
            groups.entry(key).or_default().push(item.id().to_string());
        }
        for ids in groups.values().filter(|ids| ids.len() > 1) {
            for (i, id) in ids.iter().enumerate() {
                if let Some(item) = items.get_mut(id) {
                    item.year_suffix = Some(((b'a' + i as u8) as char).to_string());
                }
            }
        }
    }

    fn sort_for_bibliography<'a>(
        &self,
        _style: &Style,
        items: &'a ItemCache,
        _citations: &CitationQueue,
    ) -> Vec<&'a ItemData> {
        self.sort_calls.fetch_add(1, Ordering::SeqCst);
        let mut sorted: Vec<&ItemData> = items.iter().collect();
        if self.sort_by_title {
            sorted.sort_by_key(|item| item.field("title").map(|v| v.to_string()));
        }
        sorted
    }
}
