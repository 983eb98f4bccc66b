//! Visitor language.

use serde::Serialize;

/// Language of the page the visitor submitted from.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Lang {
    /// English (default).
    #[default]
    En,
    /// Portuguese.
    Pt,
}

impl Lang {
    /// Resolves a language code, defaulting to English for anything
    /// unrecognized or absent.
    #[must_use]
    pub fn from_code(code: Option<&str>) -> Self {
        match code.map(str::trim) {
            Some(c) if c.eq_ignore_ascii_case("pt") => Self::Pt,
            _ => Self::En,
        }
    }

    /// Two-letter code used in URL paths.
    #[must_use]
    pub const fn code(self) -> &'static str {
        match self {
            Self::En => "en",
            Self::Pt => "pt",
        }
    }
}
