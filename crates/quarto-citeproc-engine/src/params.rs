//! Bibliography formatting parameters.
//!
//! Styles carry their bibliography options as raw strings
//! (`hanging-indent="true"`, `line-spacing="2"`, ...). Formatters need typed
//! values, so the four layout-relevant options are coerced through a fixed
//! schema. Coercion never fails: unparsable values degrade to a best-effort
//! number and options outside the schema are dropped.

use crate::style::OptionTable;
use serde::{Deserialize, Serialize};

/// Second-field alignment mode of a bibliography.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SecondFieldAlign {
    /// Entries are not aligned.
    #[default]
    None,
    /// The first field starts at the margin, the rest is aligned.
    Flush,
    /// The first field hangs into the margin.
    Margin,
}

impl SecondFieldAlign {
    pub fn is_aligned(self) -> bool {
        self != SecondFieldAlign::None
    }
}

/// Parameters handed to the item and bibliography formatters.
///
/// Options the style leaves unset stay `None` and are omitted when
/// serialized. `second-field-align` is always present.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct FormattingParams {
    /// Widest rendered entry, in characters; 0 unless aligned.
    #[serde(default)]
    pub max_offset: usize,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hanging_indent: Option<bool>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub line_spacing: Option<i64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub entry_spacing: Option<i64>,

    #[serde(default)]
    pub second_field_align: SecondFieldAlign,
}

/// Value kind expected for a formatting option.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum OptionKind {
    Boolean,
    Integer,
    Alignment,
}

const FORMATTING_OPTIONS: &[(&str, OptionKind)] = &[
    ("hanging-indent", OptionKind::Boolean),
    ("line-spacing", OptionKind::Integer),
    ("entry-spacing", OptionKind::Integer),
    ("second-field-align", OptionKind::Alignment),
];

fn option_kind(name: &str) -> Option<OptionKind> {
    FORMATTING_OPTIONS
        .iter()
        .find(|(option, _)| *option == name)
        .map(|(_, kind)| *kind)
}

/// Derive formatting parameters from raw bibliography options.
///
/// `max_offset` is left at 0; the bibliography pipeline fills it in.
pub fn derive_params(bib_options: &OptionTable) -> FormattingParams {
    let mut params = FormattingParams::default();

    for (name, value) in bib_options {
        match option_kind(name) {
            Some(OptionKind::Boolean) => params.hanging_indent = Some(coerce_bool(value)),
            Some(OptionKind::Integer) => {
                let n = coerce_integer(value);
                if name == "line-spacing" {
                    params.line_spacing = Some(n);
                } else {
                    params.entry_spacing = Some(n);
                }
            }
            Some(OptionKind::Alignment) => params.second_field_align = coerce_alignment(value),
            None => {
                tracing::trace!(option = %name, "not a formatting option, skipped");
            }
        }
    }

    params
}

/// `"true"`/`"false"`, otherwise any non-zero number.
pub fn coerce_bool(value: &str) -> bool {
    match value.trim() {
        "true" => true,
        "false" => false,
        other => leading_number(other) != 0,
    }
}

/// Best-effort integer: the leading numeric prefix, truncated; 0 if none.
pub fn coerce_integer(value: &str) -> i64 {
    match value.trim() {
        "true" => 1,
        "false" => 0,
        other => leading_number(other),
    }
}

pub fn coerce_alignment(value: &str) -> SecondFieldAlign {
    match value.trim() {
        "flush" | "true" => SecondFieldAlign::Flush,
        "margin" => SecondFieldAlign::Margin,
        _ => SecondFieldAlign::None,
    }
}

/// Parse the longest numeric prefix of `s` (`"2em"` -> 2, `"1.5"` -> 1).
fn leading_number(s: &str) -> i64 {
    let mut end = 0;
    let mut seen_dot = false;
    for (i, c) in s.char_indices() {
        let accepted = c.is_ascii_digit()
            || (i == 0 && (c == '-' || c == '+'))
            || (c == '.' && !seen_dot);
        if !accepted {
            break;
        }
        if c == '.' {
            seen_dot = true;
        }
        end = i + c.len_utf8();
    }
    let prefix = &s[..end];
    let integral = prefix.split('.').next().unwrap_or_default();
    integral.parse::<i64>().unwrap_or(0)
}
