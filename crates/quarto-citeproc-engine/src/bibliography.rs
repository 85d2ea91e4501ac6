//! Bibliography assembly.
//!
//! ```text
//! finalize ─► sort ─► render (bib mode) ─► max-offset ─► substitute ─► format
//! ```
//!
//! `max-offset` is measured on the entries before subsequent-author
//! substitution, so a replaced author group never shrinks the alignment
//! column.

use crate::format::Formatter;
use crate::params::{FormattingParams, derive_params};
use crate::processor::Processor;
use crate::render::{Mode, RenderFlags, RenderMode, VarMap, render_item};
use crate::rich_text::RichText;

/// Returned in place of a bibliography when the style has no bibliography
/// layout.
pub const NO_BIBLIOGRAPHY_LAYOUT: &str = "[NO BIBLIOGRAPHY LAYOUT IN CSL STYLE]";

/// Replace repeated author groups with `replacement`.
///
/// An entry is substituted when its first rendered-names group is equal,
/// as a tree, to the one of the entry right before it. The first entry is
/// never substituted. Entries without a names group break the chain.
pub fn substitute_subsequent_authors(entries: Vec<RichText>, replacement: &str) -> Vec<RichText> {
    let mut previous: Option<RichText> = None;
    let mut substituted = 0usize;

    let out = entries
        .into_iter()
        .map(|entry| {
            let names = entry.find_names().cloned();
            if names.is_some() && names == previous {
                substituted += 1;
                entry.replace_first(RichText::is_rendered_names, RichText::text(replacement))
            } else {
                previous = names;
                entry
            }
        })
        .collect();

    tracing::debug!(substituted, "subsequent-author substitution");
    out
}

/// Widest entry, in characters of plain text.
pub fn max_offset(entries: &[RichText]) -> usize {
    entries.iter().map(RichText::width).max().unwrap_or(0)
}

impl Processor {
    /// Render the bibliography.
    ///
    /// Returns the combined output and the parameters it was formatted
    /// with, so callers can apply spacing themselves. A style without a
    /// bibliography layout yields [`NO_BIBLIOGRAPHY_LAYOUT`] and default
    /// parameters; nothing is finalized, sorted, rendered or formatted.
    pub fn render_bibliography(
        &mut self,
        formatter: &dyn Formatter,
        no_link_targets: bool,
    ) -> (String, FormattingParams) {
        if !self.style.has_bibliography() {
            tracing::debug!("style has no bibliography layout");
            return (NO_BIBLIOGRAPHY_LAYOUT.to_string(), FormattingParams::default());
        }
        self.finalize();
        self.bibliography_output(formatter, no_link_targets)
    }

    /// [`Processor::render_bibliography`] for a finalized processor.
    ///
    /// Returns `None` when items were added since the last finalize. The
    /// missing-layout sentinel is returned regardless.
    pub fn render_finalized_bibliography(
        &self,
        formatter: &dyn Formatter,
        no_link_targets: bool,
    ) -> Option<(String, FormattingParams)> {
        if !self.style.has_bibliography() {
            return Some((NO_BIBLIOGRAPHY_LAYOUT.to_string(), FormattingParams::default()));
        }
        self.finalized
            .then(|| self.bibliography_output(formatter, no_link_targets))
    }

    fn bibliography_output(
        &self,
        formatter: &dyn Formatter,
        no_link_targets: bool,
    ) -> (String, FormattingParams) {
        let flags = RenderFlags {
            no_links: no_link_targets,
            ..Default::default()
        };
        let sorted = self
            .finalizer
            .sort_for_bibliography(&self.style, &self.items, &self.queue);
        let entries: Vec<RichText> = sorted
            .into_iter()
            .map(|item| {
                render_item(
                    &VarMap::from_item(item),
                    &self.style,
                    Mode::Bib,
                    RenderMode::Display,
                    flags,
                )
            })
            .collect();

        let mut params = derive_params(&self.style.bib_options);
        if params.second_field_align.is_aligned() {
            params.max_offset = max_offset(&entries);
        }

        let entries = match self.style.subsequent_author_substitute() {
            Some(replacement) => substitute_subsequent_authors(entries, replacement),
            None => entries,
        };

        let rendered: Vec<String> = entries
            .iter()
            .map(|entry| formatter.render_bib_item(&formatter.render_rich_text(entry), &params))
            .collect();

        tracing::debug!(
            entries = rendered.len(),
            max_offset = params.max_offset,
            "rendered bibliography"
        );
        (formatter.render_bibliography(&rendered, &params), params)
    }
}
