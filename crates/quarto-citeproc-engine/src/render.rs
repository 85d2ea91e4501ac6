//! Per-item rendering.
//!
//! [`render_item`] builds a [`RenderContext`] for one item, runs the style's
//! layout for the requested mode, and then injects processor-owned metadata
//! into the resulting tree: the item number and the disambiguating year
//! suffix.

use crate::citation::Cite;
use crate::item::ItemData;
use crate::rich_text::{BIB_ITEM_NO, CITED_ITEM_NO, RichText};
use crate::style::Style;
use hashlink::LinkedHashMap;
use serde_json::Value;

/// Leaf text prefix for cites whose item could not be fetched.
pub const NO_ITEM_DATA_PREFIX: &str = "NO_ITEM_DATA:";

/// Which layout to render with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Mode {
    Cite,
    Bib,
}

impl Mode {
    /// Attribute recording the item number in this mode.
    pub fn item_no_attr(self) -> &'static str {
        match self {
            Mode::Cite => CITED_ITEM_NO,
            Mode::Bib => BIB_ITEM_NO,
        }
    }
}

/// Whether the output is displayed or used as a sort key.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum RenderMode {
    #[default]
    Display,
    Sort,
}

/// Optional switches for [`render_item`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RenderFlags {
    /// Do not record the item number on the outermost node.
    pub suppress_item_no: bool,
    /// Ask the layout not to produce links.
    pub no_links: bool,
}

/// Variables for rendering one item (or one cite of an item).
#[derive(Debug, Clone, Default, PartialEq)]
pub struct VarMap {
    pub id: String,
    pub vars: LinkedHashMap<String, Value>,
    pub item_no: Option<usize>,
    pub year_suffix: Option<String>,
    /// The item getter returned nothing for `id`.
    pub unprocessed: bool,
}

impl VarMap {
    /// Variables of a cached item. Unresolved items yield the placeholder.
    pub fn from_item(item: &ItemData) -> Self {
        if !item.is_resolved() {
            return Self::unprocessed(item.id());
        }
        Self {
            id: item.id().to_string(),
            vars: item
                .fields()
                .iter()
                .map(|(k, v)| (k.clone(), v.clone()))
                .collect(),
            item_no: Some(item.item_no()),
            year_suffix: item.year_suffix.clone(),
            unprocessed: false,
        }
    }

    /// Placeholder for an id without item data.
    pub fn unprocessed(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            unprocessed: true,
            ..Default::default()
        }
    }

    /// Overlay the cite's own fields (locator, label, prefix, ...).
    pub fn with_cite_fields(mut self, cite: &Cite) -> Self {
        for (name, value) in cite.fields() {
            self.vars.insert(name, value);
        }
        self
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.vars.get(name)
    }
}

/// Everything a layout function can see while rendering one item.
#[derive(Debug, Clone, Copy)]
pub struct RenderContext<'a> {
    pub vars: &'a VarMap,
    pub style: &'a Style,
    pub mode: Mode,
    pub render_mode: RenderMode,
    pub no_links: bool,
}

impl<'a> RenderContext<'a> {
    pub fn new(vars: &'a VarMap, style: &'a Style, mode: Mode, render_mode: RenderMode) -> Self {
        Self {
            vars,
            style,
            mode,
            render_mode,
            no_links: false,
        }
    }

    pub fn id(&self) -> &'a str {
        &self.vars.id
    }

    pub fn var(&self, name: &str) -> Option<&'a Value> {
        self.vars.get(name)
    }

    /// A variable rendered as text: strings as-is, numbers formatted.
    pub fn var_text(&self, name: &str) -> Option<String> {
        match self.var(name)? {
            Value::String(s) => Some(s.clone()),
            Value::Number(n) => Some(n.to_string()),
            _ => None,
        }
    }

    pub fn term(&self, name: &str) -> Option<&'a str> {
        self.style.term(name)
    }

    pub fn item_no(&self) -> Option<usize> {
        self.vars.item_no
    }
}

/// Render one item with the style's layout for `mode`.
///
/// Unprocessed items render as a `NO_ITEM_DATA:<id>` leaf. A bibliography
/// request against a style without a bibliography layout renders the
/// missing-layout sentinel.
pub fn render_item(
    vars: &VarMap,
    style: &Style,
    mode: Mode,
    render_mode: RenderMode,
    flags: RenderFlags,
) -> RichText {
    if vars.unprocessed {
        return RichText::text(format!("{}{}", NO_ITEM_DATA_PREFIX, vars.id));
    }

    let Some(layout) = style.layout(mode) else {
        tracing::warn!(id = %vars.id, "style has no bibliography layout");
        return RichText::text(crate::bibliography::NO_BIBLIOGRAPHY_LAYOUT);
    };

    let mut ctx = RenderContext::new(vars, style, mode, render_mode);
    ctx.no_links = flags.no_links;
    let mut rendered = layout.evaluate(&ctx);

    if !flags.suppress_item_no {
        if let Some(item_no) = vars.item_no {
            rendered = rendered.with_attr(mode.item_no_attr(), item_no);
        }
    }

    if let Some(suffix) = vars.year_suffix.as_deref() {
        // The style prints year-suffix itself; only mark the date.
        let suffix = if style.uses_year_suffix_var() {
            ""
        } else {
            suffix
        };
        rendered = rendered.add_year_suffix(suffix);
    }

    tracing::trace!(id = %vars.id, ?mode, "rendered item");
    rendered
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rich_text::{AttrValue, ISSUED_VAR, RENDERED_VAR};
    use crate::style::Layout;
    use serde_json::json;

    fn vars(id: &str, item_no: usize) -> VarMap {
        let mut vars = VarMap {
            id: id.to_string(),
            item_no: Some(item_no),
            ..Default::default()
        };
        vars.vars.insert("title".to_string(), json!("A Title"));
        vars.vars.insert("issued".to_string(), json!(2020));
        vars
    }

    fn structured_style() -> Style {
        let layout = Layout::new(|ctx| {
            RichText::group(vec![
                RichText::text(ctx.var_text("title").unwrap_or_default()),
                RichText::text(", "),
                RichText::tagged(
                    RENDERED_VAR,
                    ISSUED_VAR,
                    vec![RichText::text(ctx.var_text("issued").unwrap_or_default())],
                ),
            ])
        });
        Style::new("en-US", layout.clone()).with_bib_layout(layout)
    }

    #[test]
    fn test_unprocessed_renders_sentinel_leaf() {
        let rt = render_item(
            &VarMap::unprocessed("ghost"),
            &structured_style(),
            Mode::Cite,
            RenderMode::Display,
            RenderFlags::default(),
        );
        assert_eq!(rt, RichText::text("NO_ITEM_DATA:ghost"));
    }

    #[test]
    fn test_item_no_attr_per_mode() {
        let style = structured_style();
        let cite = render_item(&vars("a", 4), &style, Mode::Cite, RenderMode::Display, RenderFlags::default());
        assert_eq!(cite.attr(CITED_ITEM_NO), Some(&AttrValue::Int(4)));
        assert!(!cite.has_attr(BIB_ITEM_NO));

        let bib = render_item(&vars("a", 4), &style, Mode::Bib, RenderMode::Display, RenderFlags::default());
        assert_eq!(bib.attr(BIB_ITEM_NO), Some(&AttrValue::Int(4)));
    }

    #[test]
    fn test_suppress_item_no() {
        let flags = RenderFlags {
            suppress_item_no: true,
            ..Default::default()
        };
        let rt = render_item(&vars("a", 1), &structured_style(), Mode::Cite, RenderMode::Display, flags);
        assert!(!rt.has_attr(CITED_ITEM_NO));
    }

    #[test]
    fn test_leaf_layout_is_wrapped() {
        let style = Style::new("en-US", Layout::new(|ctx| RichText::text(ctx.id())));
        let rt = render_item(&vars("leafy", 2), &style, Mode::Cite, RenderMode::Display, RenderFlags::default());
        assert_eq!(
            rt,
            RichText::tagged(CITED_ITEM_NO, 2usize, vec![RichText::text("leafy")])
        );
    }

    #[test]
    fn test_year_suffix_folded_in() {
        let mut v = vars("a", 1);
        v.year_suffix = Some("b".to_string());
        let rt = render_item(&v, &structured_style(), Mode::Cite, RenderMode::Display, RenderFlags::default());
        assert_eq!(rt.to_plain(), "A Title, 2020b");
    }

    #[test]
    fn test_year_suffix_empty_when_style_renders_it() {
        let mut v = vars("a", 1);
        v.year_suffix = Some("b".to_string());
        let style = structured_style().with_year_suffix_var(true);
        let rt = render_item(&v, &style, Mode::Cite, RenderMode::Display, RenderFlags::default());
        assert_eq!(rt.to_plain(), "A Title, 2020");
    }

    #[test]
    fn test_missing_bib_layout_degrades() {
        let style = Style::new("en-US", Layout::new(|_| RichText::text("x")));
        let rt = render_item(&vars("a", 1), &style, Mode::Bib, RenderMode::Display, RenderFlags::default());
        assert_eq!(rt.to_plain(), crate::bibliography::NO_BIBLIOGRAPHY_LAYOUT);
    }

    #[test]
    fn test_no_links_reaches_layout() {
        let style = Style::new(
            "en-US",
            Layout::new(|ctx| RichText::text(if ctx.no_links { "plain" } else { "linked" })),
        );
        let flags = RenderFlags {
            no_links: true,
            suppress_item_no: true,
        };
        let rt = render_item(&vars("a", 1), &style, Mode::Cite, RenderMode::Display, flags);
        assert_eq!(rt, RichText::text("plain"));
    }
}
