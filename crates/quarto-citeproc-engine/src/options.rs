//! Document-level citeproc options.
//!
//! These are the knobs a host reads from document front matter. They only
//! influence processor creation (locale precedence) and the link arguments
//! of the render calls.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case", default)]
pub struct CiteprocOptions {
    /// Preferred locale (e.g. "de-DE").
    pub lang: Option<String>,

    /// Use `lang` even when the style declares its own default locale.
    pub force_lang: bool,

    /// Link citations to their bibliography entries.
    pub link_citations: bool,

    /// Emit link targets in the bibliography.
    pub link_bibliography: bool,
}

impl Default for CiteprocOptions {
    fn default() -> Self {
        Self {
            lang: None,
            force_lang: false,
            link_citations: true,
            link_bibliography: true,
        }
    }
}

impl CiteprocOptions {
    /// `no_links` argument for [`crate::Processor::render_citations`].
    pub fn no_links(&self) -> bool {
        !self.link_citations
    }

    /// `no_link_targets` argument for [`crate::Processor::render_bibliography`].
    pub fn no_link_targets(&self) -> bool {
        !self.link_bibliography
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let options: CiteprocOptions = serde_json::from_str("{}").unwrap();
        assert_eq!(options, CiteprocOptions::default());
        assert!(!options.no_links());
        assert!(!options.no_link_targets());
    }

    #[test]
    fn test_kebab_case_keys() {
        let options: CiteprocOptions = serde_json::from_str(
            r#"{"lang": "de-DE", "force-lang": true, "link-citations": false}"#,
        )
        .unwrap();
        assert_eq!(options.lang.as_deref(), Some("de-DE"));
        assert!(options.force_lang);
        assert!(options.no_links());
        assert!(!options.no_link_targets());
    }
}
