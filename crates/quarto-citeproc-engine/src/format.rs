//! Output formatter interface.
//!
//! A formatter turns finalized rich text into one concrete output format
//! (plain text, HTML, ...). Choosing a format means choosing the formatter
//! value handed to [`Processor::render_citations`] or
//! [`Processor::render_bibliography`].

use crate::citation::Citation;
use crate::params::FormattingParams;
use crate::processor::Processor;
use crate::rich_text::RichText;

pub trait Formatter {
    /// Render a rich-text tree.
    fn render_rich_text(&self, text: &RichText) -> String;

    /// Wrap one rendered bibliography entry.
    fn render_bib_item(&self, item: &str, params: &FormattingParams) -> String;

    /// Combine rendered entries into a bibliography.
    fn render_bibliography(&self, items: &[String], params: &FormattingParams) -> String;

    /// Render a whole citation.
    ///
    /// Implementations typically call [`Processor::render_citation_items`]
    /// and join the results.
    fn render_citation(&self, citation: &Citation, processor: &Processor, no_links: bool) -> String;
}
