//! Citations, cites and the citation queue.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::VecDeque;

/// How a cite relates to the item cache after ingestion.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ItemSlot {
    /// Not ingested yet.
    #[default]
    Pending,
    /// The item is in the processor's cache under the cite's id.
    Cached,
    /// The item getter returned nothing for the cite's id.
    Unprocessed,
}

/// A single reference to an item within a citation.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Cite {
    /// Item id.
    pub id: String,

    /// Locator value (e.g., "42-45").
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub locator: Option<String>,

    /// Locator type (e.g., "page", "chapter").
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prefix: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub suffix: Option<String>,

    #[serde(rename = "suppress-author", default, skip_serializing_if = "Option::is_none")]
    pub suppress_author: Option<bool>,

    #[serde(rename = "author-only", default, skip_serializing_if = "Option::is_none")]
    pub author_only: Option<bool>,

    /// Any other caller-supplied field.
    #[serde(flatten)]
    pub extra: serde_json::Map<String, Value>,

    #[serde(skip)]
    slot: ItemSlot,
}

impl Cite {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            ..Default::default()
        }
    }

    pub fn with_locator(mut self, label: &str, locator: &str) -> Self {
        self.label = Some(label.to_string());
        self.locator = Some(locator.to_string());
        self
    }

    pub fn slot(&self) -> ItemSlot {
        self.slot
    }

    pub fn is_unprocessed(&self) -> bool {
        self.slot == ItemSlot::Unprocessed
    }

    pub(crate) fn attach(&mut self, slot: ItemSlot) {
        self.slot = slot;
    }

    /// The cite's own fields as render variables.
    pub fn fields(&self) -> Vec<(String, Value)> {
        let mut fields = Vec::new();
        let optional = [
            ("locator", &self.locator),
            ("label", &self.label),
            ("prefix", &self.prefix),
            ("suffix", &self.suffix),
        ];
        for (name, value) in optional {
            if let Some(value) = value {
                fields.push((name.to_string(), Value::String(value.clone())));
            }
        }
        if let Some(flag) = self.suppress_author {
            fields.push(("suppress-author".to_string(), Value::Bool(flag)));
        }
        if let Some(flag) = self.author_only {
            fields.push(("author-only".to_string(), Value::Bool(flag)));
        }
        fields.extend(self.extra.iter().map(|(k, v)| (k.clone(), v.clone())));
        fields
    }
}

/// An ordered group of cites, as submitted by the caller.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Citation {
    /// Optional citation ID.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,

    /// Note number (for note-based styles).
    #[serde(rename = "noteNumber", default, skip_serializing_if = "Option::is_none")]
    pub note_number: Option<i32>,

    #[serde(rename = "citationItems")]
    pub cites: Vec<Cite>,
}

impl Citation {
    pub fn new(cites: Vec<Cite>) -> Self {
        Self {
            cites,
            ..Default::default()
        }
    }

    /// Citation of bare ids.
    pub fn of_ids<I, S>(ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::new(ids.into_iter().map(Cite::new).collect())
    }

    pub fn ids(&self) -> impl Iterator<Item = &str> {
        self.cites.iter().map(|cite| cite.id.as_str())
    }
}

/// Citations in append order.
#[derive(Debug, Clone, Default)]
pub struct CitationQueue {
    citations: VecDeque<Citation>,
}

impl CitationQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, citation: Citation) {
        self.citations.push_back(citation);
    }

    pub fn get(&self, index: usize) -> Option<&Citation> {
        self.citations.get(index)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Citation> {
        self.citations.iter()
    }

    pub fn len(&self) -> usize {
        self.citations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.citations.is_empty()
    }

    pub fn clear(&mut self) {
        self.citations.clear();
    }
}

impl Extend<Citation> for CitationQueue {
    fn extend<T: IntoIterator<Item = Citation>>(&mut self, iter: T) {
        self.citations.extend(iter);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_citation() {
        let json = r#"{
            "citationItems": [
                {"id": "smith2020", "locator": "42", "label": "page"}
            ]
        }"#;

        let citation: Citation = serde_json::from_str(json).unwrap();
        assert_eq!(citation.cites.len(), 1);
        assert_eq!(citation.cites[0].id, "smith2020");
        assert_eq!(citation.cites[0].locator, Some("42".to_string()));
        assert_eq!(citation.cites[0].slot(), ItemSlot::Pending);
    }

    #[test]
    fn test_unknown_cite_fields_kept() {
        let json = r#"{
            "citationItems": [
                {"id": "jones2021", "prefix": "see also", "note": "trans. mine"}
            ],
            "noteNumber": 1
        }"#;

        let citation: Citation = serde_json::from_str(json).unwrap();
        assert_eq!(citation.note_number, Some(1));
        let fields = citation.cites[0].fields();
        assert_eq!(
            fields,
            vec![
                ("prefix".to_string(), Value::String("see also".into())),
                ("note".to_string(), Value::String("trans. mine".into())),
            ]
        );
    }

    #[test]
    fn test_queue_preserves_order() {
        let mut queue = CitationQueue::new();
        queue.push(Citation::of_ids(["a"]));
        queue.extend([Citation::of_ids(["b", "c"]), Citation::of_ids(["d"])]);
        let ids: Vec<Vec<&str>> = queue.iter().map(|c| c.ids().collect()).collect();
        assert_eq!(ids, vec![vec!["a"], vec!["b", "c"], vec!["d"]]);
    }
}
