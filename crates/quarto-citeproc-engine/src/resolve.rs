//! Style resolution: pick the effective locale and compile a style for it.
//!
//! Parsing and compiling the style language are the job of a
//! [`StyleCompiler`]. This module owns only the locale precedence:
//!
//! 1. a forced locale (the caller's preferred one),
//! 2. the style's declared default locale,
//! 3. the caller's preferred locale,
//! 4. [`DEFAULT_LOCALE`].

use crate::error::{BoxError, Error, Result};
use crate::locale::{LocaleGetter, LocaleRecord};
use crate::style::Style;

/// Locale used when neither the style nor the caller names one.
pub const DEFAULT_LOCALE: &str = "en-US";

/// The facts the resolver needs from a parsed (not yet compiled) style.
pub trait ParsedStyle {
    /// The style's declared `default-locale`.
    fn default_locale(&self) -> Option<&str>;

    /// Whether the style renders the `year-suffix` variable explicitly.
    fn uses_year_suffix_var(&self) -> bool;
}

/// Turns raw style text into a compiled [`Style`].
pub trait StyleCompiler {
    type Parsed: ParsedStyle;

    fn parse(&self, raw: &str) -> std::result::Result<Self::Parsed, BoxError>;

    /// Compile a parsed style for the language `lang`.
    fn compile(
        &self,
        parsed: Self::Parsed,
        uses_year_suffix_var: bool,
        lang: &str,
    ) -> std::result::Result<Style, BoxError>;

    /// Apply the locale's options and terms to the compiled style.
    fn apply_locale_overrides(&self, style: &mut Style, locale: &LocaleRecord) {
        style.merge_locale(locale);
    }

    /// Fill options the style leaves unset.
    fn apply_option_defaults(&self, style: &mut Style) {
        style.fill_option_defaults();
    }
}

/// Pick the effective locale tag.
pub fn effective_locale<'a>(
    style_default: Option<&'a str>,
    preferred: Option<&'a str>,
    force: bool,
) -> &'a str {
    if force {
        return preferred.unwrap_or(DEFAULT_LOCALE);
    }
    style_default.or(preferred).unwrap_or(DEFAULT_LOCALE)
}

/// Parse and compile `raw` against the effective locale.
pub fn resolve_style<C>(
    raw: &str,
    compiler: &C,
    locales: &dyn LocaleGetter,
    preferred: Option<&str>,
    force: bool,
) -> Result<Style>
where
    C: StyleCompiler + ?Sized,
{
    let parsed = compiler.parse(raw).map_err(Error::style_compile)?;

    let tag = effective_locale(parsed.default_locale(), preferred, force).to_string();
    let locale = locales
        .fetch(&tag)
        .map_err(|e| Error::locale_unavailable(&tag, e))?;

    let lang = if locale.lang.is_empty() {
        tag.clone()
    } else {
        locale.lang.clone()
    };

    let uses_year_suffix_var = parsed.uses_year_suffix_var();
    let mut style = compiler
        .compile(parsed, uses_year_suffix_var, &lang)
        .map_err(Error::style_compile)?;

    compiler.apply_locale_overrides(&mut style, &locale);
    compiler.apply_option_defaults(&mut style);

    tracing::debug!(requested = %tag, lang = %lang, "resolved style locale");
    Ok(style)
}
