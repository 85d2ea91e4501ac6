//! Locale records and locale retrieval.
//!
//! The processor never reads locale files itself. A [`LocaleGetter`] supplies
//! a [`LocaleRecord`] for the effective locale tag; the style compiler then
//! merges its options and terms into the compiled style.

use crate::error::BoxError;
use crate::style::OptionTable;
use hashlink::LinkedHashMap;
use serde::{Deserialize, Serialize};

/// Locale data as delivered by a locale getter.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LocaleRecord {
    /// Language tag of the locale (e.g. "en-US").
    pub lang: String,

    /// Locale options (`punctuation-in-quote`, `limit-day-ordinals-to-day-1`).
    #[serde(default)]
    pub options: OptionTable,

    /// Terms by name.
    #[serde(default)]
    pub terms: LinkedHashMap<String, String>,
}

impl LocaleRecord {
    pub fn new(lang: impl Into<String>) -> Self {
        Self {
            lang: lang.into(),
            ..Default::default()
        }
    }

    pub fn with_option(mut self, name: &str, value: &str) -> Self {
        self.options.insert(name.to_string(), value.to_string());
        self
    }

    pub fn with_term(mut self, name: &str, value: &str) -> Self {
        self.terms.insert(name.to_string(), value.to_string());
        self
    }
}

/// Supplies locale data by tag.
pub trait LocaleGetter {
    fn fetch(&self, tag: &str) -> Result<LocaleRecord, BoxError>;
}

impl<F> LocaleGetter for F
where
    F: Fn(&str) -> Result<LocaleRecord, BoxError>,
{
    fn fetch(&self, tag: &str) -> Result<LocaleRecord, BoxError> {
        self(tag)
    }
}

/// In-memory locale table.
///
/// Lookup tries the exact tag, then falls back on the base language: a bare
/// `de` finds the first registered `de-*` locale, and `de-AT` finds `de` or
/// the first `de-*` locale.
#[derive(Debug, Clone, Default)]
pub struct MapLocaleGetter {
    locales: LinkedHashMap<String, LocaleRecord>,
}

impl MapLocaleGetter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a locale under its own language tag.
    pub fn with_locale(mut self, locale: LocaleRecord) -> Self {
        self.insert(locale);
        self
    }

    pub fn insert(&mut self, locale: LocaleRecord) {
        self.locales.insert(locale.lang.clone(), locale);
    }

    fn lookup(&self, tag: &str) -> Option<&LocaleRecord> {
        if let Some(locale) = self.locales.get(tag) {
            return Some(locale);
        }

        let base = tag.split('-').next().unwrap_or(tag);
        if base != tag {
            if let Some(locale) = self.locales.get(base) {
                return Some(locale);
            }
        }

        let prefix = format!("{}-", base);
        self.locales
            .iter()
            .find(|(lang, _)| lang.starts_with(&prefix))
            .map(|(_, locale)| locale)
    }
}

impl LocaleGetter for MapLocaleGetter {
    fn fetch(&self, tag: &str) -> Result<LocaleRecord, BoxError> {
        self.lookup(tag)
            .cloned()
            .ok_or_else(|| format!("no locale data for '{}'", tag).into())
    }
}
