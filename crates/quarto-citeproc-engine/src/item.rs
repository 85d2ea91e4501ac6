//! Bibliographic item data, the item cache and item retrieval.

use crate::error::BoxError;
use hashlink::LinkedHashMap;
use serde_json::Value;
use std::collections::HashMap;

/// A CSL-JSON item record: field name to value.
pub type ItemRecord = serde_json::Map<String, Value>;

/// A cached item.
///
/// The record itself never changes once cached. The finalize pass may set
/// the year suffix and renumber the item.
///
/// An id the item getter had no data for is cached unresolved: it keeps its
/// sequence number, has no fields, and renders as `NO_ITEM_DATA:<id>`.
#[derive(Debug, Clone, PartialEq)]
pub struct ItemData {
    id: String,
    seq: usize,
    fields: ItemRecord,
    resolved: bool,
    citation_number: Option<usize>,

    /// Disambiguating year suffix ("a", "b", ...), set by finalize.
    pub year_suffix: Option<String>,
}

impl ItemData {
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Position of first appearance across the processor's history (1-based).
    pub fn seq(&self) -> usize {
        self.seq
    }

    /// False when the item getter returned nothing for this id.
    pub fn is_resolved(&self) -> bool {
        self.resolved
    }

    pub fn fields(&self) -> &ItemRecord {
        &self.fields
    }

    pub fn field(&self, name: &str) -> Option<&Value> {
        self.fields.get(name)
    }

    /// Number rendered for the item: the finalize-assigned citation number,
    /// else the sequence number.
    pub fn item_no(&self) -> usize {
        self.citation_number.unwrap_or(self.seq)
    }

    pub fn set_citation_number(&mut self, number: usize) {
        self.citation_number = Some(number);
    }
}

/// Items by id in first-appearance order.
///
/// Each id is stored at most once; the sequence counter only moves forward.
#[derive(Debug, Clone, Default)]
pub struct ItemCache {
    items: LinkedHashMap<String, ItemData>,
    last_seq: usize,
}

impl ItemCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Cache a record under `id`, returning its sequence number.
    ///
    /// An id already cached keeps its record and number.
    pub fn insert(&mut self, id: String, fields: ItemRecord) -> usize {
        self.insert_entry(id, fields, true)
    }

    /// Cache `id` without data, so it keeps its sequence number and is not
    /// fetched again.
    pub fn insert_unresolved(&mut self, id: String) -> usize {
        self.insert_entry(id, ItemRecord::new(), false)
    }

    fn insert_entry(&mut self, id: String, fields: ItemRecord, resolved: bool) -> usize {
        if let Some(existing) = self.items.get(&id) {
            return existing.seq;
        }
        self.last_seq += 1;
        let seq = self.last_seq;
        self.items.insert(
            id.clone(),
            ItemData {
                id,
                seq,
                fields,
                resolved,
                citation_number: None,
                year_suffix: None,
            },
        );
        seq
    }

    /// True once `id` has been ingested, resolved or not.
    pub fn contains(&self, id: &str) -> bool {
        self.items.contains_key(id)
    }

    /// True when `id` is cached with item data.
    pub fn is_resolved(&self, id: &str) -> bool {
        self.items.get(id).is_some_and(ItemData::is_resolved)
    }

    pub fn get(&self, id: &str) -> Option<&ItemData> {
        self.items.get(id)
    }

    pub fn get_mut(&mut self, id: &str) -> Option<&mut ItemData> {
        self.items.get_mut(id)
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Items in sequence order.
    pub fn iter(&self) -> impl Iterator<Item = &ItemData> {
        self.items.values()
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut ItemData> {
        self.items.values_mut()
    }

    pub fn ids(&self) -> impl Iterator<Item = &str> {
        self.items.keys().map(String::as_str)
    }

    /// Ids never ingested, deduplicated, in first-occurrence order.
    pub fn missing<'a>(&self, ids: impl IntoIterator<Item = &'a str>) -> Vec<String> {
        let mut seen = std::collections::HashSet::new();
        ids.into_iter()
            .filter(|id| !self.contains(id))
            .filter(|id| seen.insert(*id))
            .map(str::to_string)
            .collect()
    }

    pub fn clear(&mut self) {
        self.items.clear();
        self.last_seq = 0;
    }
}

/// Fetches item records in batches.
///
/// Ids the getter cannot resolve are simply left out of the result.
pub trait ItemGetter: Send + Sync {
    fn fetch(&self, ids: &[String]) -> Result<HashMap<String, ItemRecord>, BoxError>;
}

impl<F> ItemGetter for F
where
    F: Fn(&[String]) -> Result<HashMap<String, ItemRecord>, BoxError> + Send + Sync,
{
    fn fetch(&self, ids: &[String]) -> Result<HashMap<String, ItemRecord>, BoxError> {
        self(ids)
    }
}

/// Item getter over an in-memory CSL-JSON bibliography.
#[derive(Debug, Clone, Default)]
pub struct JsonItemGetter {
    items: HashMap<String, ItemRecord>,
}

impl JsonItemGetter {
    /// Parse a CSL-JSON array of items.
    ///
    /// Records without a string or numeric `id` are skipped.
    pub fn from_json(json: &str) -> serde_json::Result<Self> {
        let records: Vec<ItemRecord> = serde_json::from_str(json)?;
        Ok(Self::from_records(records))
    }

    pub fn from_records(records: impl IntoIterator<Item = ItemRecord>) -> Self {
        let mut items = HashMap::new();
        for record in records {
            let id = match record.get("id") {
                Some(Value::String(s)) => s.clone(),
                Some(Value::Number(n)) => n.to_string(),
                _ => {
                    tracing::warn!("skipping CSL-JSON item without an id");
                    continue;
                }
            };
            items.insert(id, record);
        }
        Self { items }
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

impl ItemGetter for JsonItemGetter {
    fn fetch(&self, ids: &[String]) -> Result<HashMap<String, ItemRecord>, BoxError> {
        Ok(ids
            .iter()
            .filter_map(|id| self.items.get(id).map(|record| (id.clone(), record.clone())))
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn record(title: &str) -> ItemRecord {
        let mut r = ItemRecord::new();
        r.insert("title".to_string(), json!(title));
        r
    }

    #[test]
    fn test_insert_assigns_sequence() {
        let mut cache = ItemCache::new();
        assert_eq!(cache.insert("a".into(), record("A")), 1);
        assert_eq!(cache.insert("b".into(), record("B")), 2);
        assert_eq!(cache.insert("a".into(), record("other")), 1);
        assert_eq!(cache.len(), 2);
        assert_eq!(
            cache.get("a").and_then(|i| i.field("title")),
            Some(&json!("A"))
        );
    }

    #[test]
    fn test_missing_dedups_and_filters() {
        let mut cache = ItemCache::new();
        cache.insert("a".into(), record("A"));
        let missing = cache.missing(["b", "a", "c", "b"]);
        assert_eq!(missing, vec!["b".to_string(), "c".to_string()]);
    }

    #[test]
    fn test_item_no_prefers_citation_number() {
        let mut cache = ItemCache::new();
        cache.insert("a".into(), record("A"));
        cache.insert("b".into(), record("B"));
        let item = cache.get_mut("b").unwrap();
        assert_eq!(item.item_no(), 2);
        item.set_citation_number(1);
        assert_eq!(item.item_no(), 1);
        assert_eq!(item.seq(), 2);
    }

    #[test]
    fn test_unresolved_ids_keep_their_number() {
        let mut cache = ItemCache::new();
        cache.insert("a".into(), record("A"));
        assert_eq!(cache.insert_unresolved("ghost".into()), 2);
        assert_eq!(cache.insert("b".into(), record("B")), 3);

        assert!(cache.contains("ghost"));
        assert!(!cache.is_resolved("ghost"));
        assert!(cache.is_resolved("b"));
        assert_eq!(cache.missing(["ghost", "c"]), vec!["c".to_string()]);

        // A later record for the same id does not replace the placeholder.
        assert_eq!(cache.insert("ghost".into(), record("Late")), 2);
        assert!(!cache.is_resolved("ghost"));
    }

    #[test]
    fn test_clear_resets_sequence() {
        let mut cache = ItemCache::new();
        cache.insert("a".into(), record("A"));
        cache.clear();
        assert!(cache.is_empty());
        assert_eq!(cache.insert("b".into(), record("B")), 1);
    }

    #[test]
    fn test_json_item_getter() {
        let getter = JsonItemGetter::from_json(
            r#"[
                {"id": "smith2020", "title": "Alpha"},
                {"id": 42, "title": "Numeric"},
                {"title": "No id"}
            ]"#,
        )
        .unwrap();
        assert_eq!(getter.len(), 2);

        let found = getter
            .fetch(&["smith2020".to_string(), "42".to_string(), "nope".to_string()])
            .unwrap();
        assert_eq!(found.len(), 2);
        assert_eq!(found["42"]["title"], json!("Numeric"));
    }
}
