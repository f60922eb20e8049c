//! Localized content

use std::fmt;

use serde::{Deserialize, Serialize};

/// Storefront display language.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Locale {
    /// Vietnamese
    #[default]
    Vi,

    /// English
    En,
}

impl fmt::Display for Locale {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Locale::Vi => f.write_str("vi"),
            Locale::En => f.write_str("en"),
        }
    }
}

/// Text carried in every storefront locale.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LocalizedText {
    /// Vietnamese text
    pub vi: String,

    /// English text
    pub en: String,
}

impl LocalizedText {
    /// Creates localized text from its Vietnamese and English forms.
    pub fn new(vi: impl Into<String>, en: impl Into<String>) -> Self {
        Self {
            vi: vi.into(),
            en: en.into(),
        }
    }

    /// Returns the text for `locale`, falling back to the other locale when empty.
    pub fn get(&self, locale: Locale) -> &str {
        let (preferred, fallback) = match locale {
            Locale::Vi => (&self.vi, &self.en),
            Locale::En => (&self.en, &self.vi),
        };

        if preferred.is_empty() {
            fallback
        } else {
            preferred
        }
    }
}
