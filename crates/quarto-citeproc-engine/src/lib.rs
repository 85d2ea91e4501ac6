//! Incremental citation processing.
//!
//! This crate provides the stateful core of a citation processor. It takes:
//! - A compiled [`Style`] (produced by a [`StyleCompiler`] for a locale)
//! - Bibliographic items, fetched on demand through an [`ItemGetter`]
//! - [`Citation`]s, appended incrementally
//!
//! And produces a [`RichText`] tree per cite and per bibliography entry,
//! which a [`Formatter`] turns into a concrete output format.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────┐
//! │                            Processor                                │
//! │   resolve_style ─► Style      append_citations ─► ItemCache         │
//! │                                                  + CitationQueue    │
//! └───────────────┬───────────────────────────────────┬─────────────────┘
//!                 │ render_citations                  │ render_bibliography
//!                 ▼                                   ▼
//! ┌───────────────────────────────┐   ┌─────────────────────────────────┐
//! │ render_item (cite mode)       │   │ sort ─► render_item (bib mode)  │
//! │                               │   │ max-offset ─► substitution      │
//! │                               │   │ derive_params                   │
//! └───────────────┬───────────────┘   └────────────────┬────────────────┘
//!                 └───────────────► Formatter ◄────────┘
//! ```
//!
//! Parsing the style language, locale files, disambiguation and sorting are
//! the job of collaborators ([`StyleCompiler`], [`LocaleGetter`],
//! [`Finalizer`]).
//!
//! # Example
//!
//! ```rust
//! use quarto_citeproc_engine::{
//!     Citation, FormattingParams, Formatter, JsonItemGetter, Layout, Processor, RichText, Style,
//! };
//!
//! struct Plain;
//!
//! impl Formatter for Plain {
//!     fn render_rich_text(&self, text: &RichText) -> String {
//!         text.to_plain()
//!     }
//!
//!     fn render_bib_item(&self, item: &str, _params: &FormattingParams) -> String {
//!         item.to_string()
//!     }
//!
//!     fn render_bibliography(&self, items: &[String], _params: &FormattingParams) -> String {
//!         items.join("\n")
//!     }
//!
//!     fn render_citation(&self, citation: &Citation, processor: &Processor, no_links: bool) -> String {
//!         let parts: Vec<String> = processor
//!             .render_citation_items(citation, no_links)
//!             .iter()
//!             .map(RichText::to_plain)
//!             .collect();
//!         format!("({})", parts.join("; "))
//!     }
//! }
//!
//! // A real style comes from a `StyleCompiler`; a layout is any function of the render context.
//! let title = Layout::new(|ctx| RichText::text(ctx.var_text("title").unwrap_or_default()));
//! let style = Style::new("en-US", title.clone()).with_bib_layout(title);
//! let items = JsonItemGetter::from_json(r#"[{"id": "smith2020", "title": "Caching"}]"#)?;
//!
//! let mut processor = Processor::new(style, items);
//! processor.append_citations([Citation::of_ids(["smith2020", "ghost"])])?;
//!
//! assert_eq!(
//!     processor.render_citations(&Plain, false),
//!     ["(Caching; NO_ITEM_DATA:ghost)"]
//! );
//! let (bibliography, _params) = processor.render_bibliography(&Plain, false);
//! assert_eq!(bibliography, "Caching\nNO_ITEM_DATA:ghost");
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

pub mod bibliography;
pub mod citation;
pub mod error;
pub mod finalize;
pub mod format;
pub mod item;
pub mod locale;
pub mod options;
pub mod params;
pub mod processor;
pub mod render;
pub mod resolve;
pub mod rich_text;
pub mod style;

// Re-export main types
pub use bibliography::{NO_BIBLIOGRAPHY_LAYOUT, max_offset, substitute_subsequent_authors};
pub use citation::{Cite, Citation, CitationQueue, ItemSlot};
pub use error::{BoxError, Error, Result};
pub use finalize::{Finalizer, NoopFinalizer};
pub use format::Formatter;
pub use item::{ItemCache, ItemData, ItemGetter, ItemRecord, JsonItemGetter};
pub use locale::{LocaleGetter, LocaleRecord, MapLocaleGetter};
pub use options::CiteprocOptions;
pub use params::{FormattingParams, SecondFieldAlign, derive_params};
pub use processor::Processor;
pub use render::{Mode, NO_ITEM_DATA_PREFIX, RenderContext, RenderFlags, RenderMode, VarMap, render_item};
pub use resolve::{DEFAULT_LOCALE, ParsedStyle, StyleCompiler, effective_locale, resolve_style};
pub use rich_text::{AttrValue, Attrs, RichText};
pub use style::{Layout, OptionScope, OptionTable, Style};
