//! Rich-text trees: the format-agnostic intermediate form of rendered output.
//!
//! A tree is either a [`RichText::Text`] leaf or a [`RichText::Node`] that
//! carries an ordered attribute map and child trees. Layout evaluation
//! produces trees; the processor rewrites them (item numbers, year suffixes,
//! subsequent-author substitution) before a formatter turns them into strings.
//!
//! Trees are treated as immutable values. Every rewrite consumes the tree and
//! returns a new one.

use hashlink::LinkedHashMap;
use serde::{Deserialize, Serialize};

/// Marks the subtree rendered from a `<names>` element.
pub const RENDERED_NAMES: &str = "rendered-names";

/// Names the variable a subtree was rendered from.
pub const RENDERED_VAR: &str = "rendered-var";

/// Item number attached to the outermost node of a rendered cite.
pub const CITED_ITEM_NO: &str = "cited-item-no";

/// Item number attached to the outermost node of a bibliography entry.
pub const BIB_ITEM_NO: &str = "bib-item-no";

/// Value of [`RENDERED_VAR`] on the node holding a year suffix.
pub const YEAR_SUFFIX_VAR: &str = "year-suffix";

/// Value of [`RENDERED_VAR`] on the date node a year suffix follows.
pub const ISSUED_VAR: &str = "issued";

/// An attribute value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AttrValue {
    Flag(bool),
    Int(i64),
    Text(String),
}

impl AttrValue {
    pub fn as_str(&self) -> Option<&str> {
        match self {
            AttrValue::Text(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_int(&self) -> Option<i64> {
        match self {
            AttrValue::Int(n) => Some(*n),
            _ => None,
        }
    }
}

impl From<bool> for AttrValue {
    fn from(value: bool) -> Self {
        AttrValue::Flag(value)
    }
}

impl From<i64> for AttrValue {
    fn from(value: i64) -> Self {
        AttrValue::Int(value)
    }
}

impl From<usize> for AttrValue {
    fn from(value: usize) -> Self {
        AttrValue::Int(i64::try_from(value).unwrap_or(i64::MAX))
    }
}

impl From<&str> for AttrValue {
    fn from(value: &str) -> Self {
        AttrValue::Text(value.to_string())
    }
}

impl From<String> for AttrValue {
    fn from(value: String) -> Self {
        AttrValue::Text(value)
    }
}

/// Ordered attribute map. Keys are unique by construction.
pub type Attrs = LinkedHashMap<String, AttrValue>;

/// A rich-text tree.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RichText {
    /// A leaf string.
    Text(String),
    /// Attributed content.
    Node {
        attrs: Attrs,
        children: Vec<RichText>,
    },
}

impl RichText {
    /// Create a leaf.
    pub fn text(s: impl Into<String>) -> Self {
        RichText::Text(s.into())
    }

    /// Create an internal node.
    pub fn node(attrs: Attrs, children: Vec<RichText>) -> Self {
        RichText::Node { attrs, children }
    }

    /// Create an internal node with a single attribute.
    pub fn tagged(key: &str, value: impl Into<AttrValue>, children: Vec<RichText>) -> Self {
        let mut attrs = Attrs::new();
        attrs.insert(key.to_string(), value.into());
        RichText::Node { attrs, children }
    }

    /// Create an internal node without attributes.
    pub fn group(children: Vec<RichText>) -> Self {
        RichText::Node {
            attrs: Attrs::new(),
            children,
        }
    }

    pub fn is_text(&self) -> bool {
        matches!(self, RichText::Text(_))
    }

    /// Attributes of a node; `None` for a leaf.
    pub fn attrs(&self) -> Option<&Attrs> {
        match self {
            RichText::Text(_) => None,
            RichText::Node { attrs, .. } => Some(attrs),
        }
    }

    /// Children of a node; empty for a leaf.
    pub fn children(&self) -> &[RichText] {
        match self {
            RichText::Text(_) => &[],
            RichText::Node { children, .. } => children,
        }
    }

    pub fn attr(&self, key: &str) -> Option<&AttrValue> {
        self.attrs().and_then(|attrs| attrs.get(key))
    }

    pub fn has_attr(&self, key: &str) -> bool {
        self.attr(key).is_some()
    }

    /// True for the subtree a `<names>` element rendered.
    pub fn is_rendered_names(&self) -> bool {
        self.has_attr(RENDERED_NAMES)
    }

    /// True for a node rendered from the variable `var`.
    pub fn is_rendered_var(&self, var: &str) -> bool {
        self.attr(RENDERED_VAR).and_then(AttrValue::as_str) == Some(var)
    }

    /// Set an attribute on the outermost node.
    ///
    /// A leaf is first wrapped into a node holding only the new attribute.
    /// An existing value under the same key is replaced.
    pub fn with_attr(self, key: &str, value: impl Into<AttrValue>) -> Self {
        match self {
            RichText::Text(_) => RichText::tagged(key, value, vec![self]),
            RichText::Node {
                mut attrs,
                children,
            } => {
                attrs.insert(key.to_string(), value.into());
                RichText::Node { attrs, children }
            }
        }
    }

    /// Concatenated leaf text, ignoring all attributes.
    pub fn to_plain(&self) -> String {
        let mut out = String::new();
        self.push_plain(&mut out);
        out
    }

    fn push_plain(&self, out: &mut String) {
        match self {
            RichText::Text(s) => out.push_str(s),
            RichText::Node { children, .. } => {
                for child in children {
                    child.push_plain(out);
                }
            }
        }
    }

    /// Width of the plain text in characters.
    pub fn width(&self) -> usize {
        match self {
            RichText::Text(s) => s.chars().count(),
            RichText::Node { children, .. } => children.iter().map(RichText::width).sum(),
        }
    }

    /// First subtree (pre-order, self included) matching `pred`.
    pub fn find_first<P>(&self, pred: P) -> Option<&RichText>
    where
        P: Fn(&RichText) -> bool,
    {
        self.find_first_inner(&pred)
    }

    fn find_first_inner<P>(&self, pred: &P) -> Option<&RichText>
    where
        P: Fn(&RichText) -> bool,
    {
        if pred(self) {
            return Some(self);
        }
        self.children()
            .iter()
            .find_map(|child| child.find_first_inner(pred))
    }

    /// First rendered-names subtree, if any.
    pub fn find_names(&self) -> Option<&RichText> {
        self.find_first(RichText::is_rendered_names)
    }

    /// Replace the first subtree (pre-order) matching `pred` with `replacement`.
    ///
    /// Returns the tree unchanged when nothing matches.
    pub fn replace_first<P>(self, pred: P, replacement: RichText) -> Self
    where
        P: Fn(&RichText) -> bool,
    {
        let mut slot = Some(replacement);
        self.replace_first_inner(&pred, &mut slot)
    }

    fn replace_first_inner<P>(self, pred: &P, slot: &mut Option<RichText>) -> Self
    where
        P: Fn(&RichText) -> bool,
    {
        if slot.is_none() {
            return self;
        }
        if pred(&self) {
            if let Some(replacement) = slot.take() {
                return replacement;
            }
        }
        match self {
            RichText::Text(_) => self,
            RichText::Node { attrs, children } => RichText::Node {
                attrs,
                children: children
                    .into_iter()
                    .map(|child| child.replace_first_inner(pred, slot))
                    .collect(),
            },
        }
    }

    /// Fold a disambiguating year suffix into the tree.
    ///
    /// The suffix becomes a `rendered-var = year-suffix` node appended to the
    /// first node rendered from `issued`. Without such a node the tree is
    /// returned unchanged.
    pub fn add_year_suffix(self, suffix: &str) -> Self {
        let mut added = false;
        let result = self.add_year_suffix_inner(suffix, &mut added);
        // An empty suffix only marks the date.
        if !added && !suffix.is_empty() {
            tracing::warn!(suffix, "no issued date to attach year suffix to");
        }
        result
    }

    fn add_year_suffix_inner(self, suffix: &str, added: &mut bool) -> Self {
        if *added {
            return self;
        }
        match self {
            RichText::Text(_) => self,
            RichText::Node {
                attrs,
                mut children,
            } => {
                let is_date = attrs.get(RENDERED_VAR).and_then(AttrValue::as_str) == Some(ISSUED_VAR);
                if is_date {
                    *added = true;
                    children.push(RichText::tagged(
                        RENDERED_VAR,
                        YEAR_SUFFIX_VAR,
                        vec![RichText::text(suffix)],
                    ));
                    return RichText::Node { attrs, children };
                }
                RichText::Node {
                    attrs,
                    children: children
                        .into_iter()
                        .map(|child| child.add_year_suffix_inner(suffix, added))
                        .collect(),
                }
            }
        }
    }
}

impl From<&str> for RichText {
    fn from(value: &str) -> Self {
        RichText::text(value)
    }
}

impl From<String> for RichText {
    fn from(value: String) -> Self {
        RichText::Text(value)
    }
}
