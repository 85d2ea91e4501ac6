//! Compiled style handle.
//!
//! A [`Style`] is what a style compiler produces: one layout per render mode,
//! option tables, locale terms and the resolved locale. The processor treats
//! layouts as opaque functions from a [`RenderContext`] to a [`RichText`].

use crate::locale::LocaleRecord;
use crate::render::{Mode, RenderContext};
use crate::rich_text::RichText;
use hashlink::LinkedHashMap;
use std::fmt;
use std::sync::Arc;

/// Raw option values by name, in declaration order.
pub type OptionTable = LinkedHashMap<String, String>;

/// Which option table an option lives in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OptionScope {
    Cite,
    Bib,
    Locale,
    Global,
}

/// Defaults filled in for options a style leaves unset.
const OPTION_DEFAULTS: &[(OptionScope, &str, &str)] = &[
    (OptionScope::Cite, "near-note-distance", "5"),
    (OptionScope::Locale, "punctuation-in-quote", "false"),
    (OptionScope::Locale, "limit-day-ordinals-to-day-1", "false"),
    (OptionScope::Bib, "hanging-indent", "false"),
    (OptionScope::Bib, "line-spacing", "1"),
    (OptionScope::Bib, "entry-spacing", "1"),
    (OptionScope::Global, "initialize-with-hyphen", "true"),
    (
        OptionScope::Global,
        "demote-non-dropping-particle",
        "display-and-sort",
    ),
];

/// A compiled layout function.
#[derive(Clone)]
pub struct Layout(Arc<dyn Fn(&RenderContext<'_>) -> RichText + Send + Sync>);

impl Layout {
    pub fn new<F>(f: F) -> Self
    where
        F: Fn(&RenderContext<'_>) -> RichText + Send + Sync + 'static,
    {
        Layout(Arc::new(f))
    }

    pub fn evaluate(&self, ctx: &RenderContext<'_>) -> RichText {
        (self.0)(ctx)
    }
}

impl fmt::Debug for Layout {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Layout(..)")
    }
}

/// A compiled style bound to a locale.
#[derive(Debug, Clone)]
pub struct Style {
    locale: String,
    cite_layout: Layout,
    bib_layout: Option<Layout>,
    uses_year_suffix_var: bool,

    pub cite_options: OptionTable,
    pub bib_options: OptionTable,
    pub locale_options: OptionTable,
    pub global_options: OptionTable,

    /// Locale terms; style-embedded terms take precedence over locale files.
    pub terms: LinkedHashMap<String, String>,
}

impl Style {
    /// Create a style with a citation layout and no bibliography.
    pub fn new(locale: impl Into<String>, cite_layout: Layout) -> Self {
        Self {
            locale: locale.into(),
            cite_layout,
            bib_layout: None,
            uses_year_suffix_var: false,
            cite_options: OptionTable::new(),
            bib_options: OptionTable::new(),
            locale_options: OptionTable::new(),
            global_options: OptionTable::new(),
            terms: LinkedHashMap::new(),
        }
    }

    pub fn with_bib_layout(mut self, layout: Layout) -> Self {
        self.bib_layout = Some(layout);
        self
    }

    /// Mark the style as rendering the `year-suffix` variable itself.
    pub fn with_year_suffix_var(mut self, uses: bool) -> Self {
        self.uses_year_suffix_var = uses;
        self
    }

    pub fn with_option(mut self, scope: OptionScope, name: &str, value: &str) -> Self {
        self.options_mut(scope)
            .insert(name.to_string(), value.to_string());
        self
    }

    /// Resolved locale tag.
    pub fn locale(&self) -> &str {
        &self.locale
    }

    pub fn cite_layout(&self) -> &Layout {
        &self.cite_layout
    }

    pub fn bib_layout(&self) -> Option<&Layout> {
        self.bib_layout.as_ref()
    }

    pub fn has_bibliography(&self) -> bool {
        self.bib_layout.is_some()
    }

    pub fn layout(&self, mode: Mode) -> Option<&Layout> {
        match mode {
            Mode::Cite => Some(&self.cite_layout),
            Mode::Bib => self.bib_layout.as_ref(),
        }
    }

    pub fn uses_year_suffix_var(&self) -> bool {
        self.uses_year_suffix_var
    }

    pub fn options(&self, scope: OptionScope) -> &OptionTable {
        match scope {
            OptionScope::Cite => &self.cite_options,
            OptionScope::Bib => &self.bib_options,
            OptionScope::Locale => &self.locale_options,
            OptionScope::Global => &self.global_options,
        }
    }

    fn options_mut(&mut self, scope: OptionScope) -> &mut OptionTable {
        match scope {
            OptionScope::Cite => &mut self.cite_options,
            OptionScope::Bib => &mut self.bib_options,
            OptionScope::Locale => &mut self.locale_options,
            OptionScope::Global => &mut self.global_options,
        }
    }

    pub fn option(&self, scope: OptionScope, name: &str) -> Option<&str> {
        self.options(scope).get(name).map(String::as_str)
    }

    /// Replacement string for repeated bibliography authors, if configured.
    pub fn subsequent_author_substitute(&self) -> Option<&str> {
        self.option(OptionScope::Bib, "subsequent-author-substitute")
    }

    pub fn term(&self, name: &str) -> Option<&str> {
        self.terms.get(name).map(String::as_str)
    }

    /// Merge locale options and terms the style does not define itself.
    pub fn merge_locale(&mut self, locale: &LocaleRecord) {
        for (name, value) in &locale.options {
            if !self.locale_options.contains_key(name) {
                self.locale_options.insert(name.clone(), value.clone());
            }
        }
        for (name, value) in &locale.terms {
            if !self.terms.contains_key(name) {
                self.terms.insert(name.clone(), value.clone());
            }
        }
    }

    /// Fill every unset option with its documented default.
    pub fn fill_option_defaults(&mut self) {
        for (scope, name, value) in OPTION_DEFAULTS {
            let table = self.options_mut(*scope);
            if !table.contains_key(*name) {
                table.insert((*name).to_string(), (*value).to_string());
            }
        }
    }
}
