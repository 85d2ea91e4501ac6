//! Error types for citation processing.
//!
//! Only creation and ingestion can fail. Rendering never returns an error:
//! missing item data and missing layouts degrade to visible sentinel text
//! (see [`crate::render::NO_ITEM_DATA_PREFIX`] and
//! [`crate::bibliography::NO_BIBLIOGRAPHY_LAYOUT`]).

use thiserror::Error;

/// Result type alias for quarto-citeproc-engine operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Error type returned by collaborators (item/locale getters, style compiler).
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Errors that can occur while creating a processor or ingesting citations.
#[derive(Debug, Clone, Error)]
pub enum Error {
    /// The locale getter could not provide the effective locale.
    #[error("Locale '{locale}' is unavailable: {message}")]
    LocaleUnavailable { locale: String, message: String },

    /// The style could not be parsed or compiled.
    #[error("Failed to compile style: {message}")]
    StyleCompile { message: String },

    /// The item getter failed; no item was cached and no citation queued.
    #[error("Failed to fetch items [{}]: {message}", ids.join(", "))]
    ItemFetch { ids: Vec<String>, message: String },
}

impl Error {
    /// Stable diagnostic code.
    ///
    /// Citeproc errors use Q-10-* error codes (subsystem 10).
    pub fn code(&self) -> &'static str {
        match self {
            Error::LocaleUnavailable { .. } => "Q-10-20",
            Error::StyleCompile { .. } => "Q-10-21",
            Error::ItemFetch { .. } => "Q-10-22",
        }
    }

    /// Short human-readable title for diagnostics.
    pub fn title(&self) -> &'static str {
        match self {
            Error::LocaleUnavailable { .. } => "Locale Unavailable",
            Error::StyleCompile { .. } => "Style Compile Error",
            Error::ItemFetch { .. } => "Item Fetch Error",
        }
    }

    pub(crate) fn locale_unavailable(locale: &str, err: BoxError) -> Self {
        Error::LocaleUnavailable {
            locale: locale.to_string(),
            message: err.to_string(),
        }
    }

    pub(crate) fn style_compile(err: BoxError) -> Self {
        Error::StyleCompile {
            message: err.to_string(),
        }
    }

    pub(crate) fn item_fetch(ids: &[String], err: BoxError) -> Self {
        Error::ItemFetch {
            ids: ids.to_vec(),
            message: err.to_string(),
        }
    }
}
