//! Locale-keyed display text and the single fallback rule used everywhere.
//!
//! # Invariants
//! - Lookup order is: requested locale, then default locale.
//! - Blank translations count as missing.
//! - Locale keys compare case-insensitively (`en-US` == `en-us`).

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Display text keyed by locale tag.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LocalizedText(BTreeMap<String, String>);

impl LocalizedText {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert, mostly for fixtures.
    pub fn with(mut self, locale: impl Into<String>, text: impl Into<String>) -> Self {
        self.0.insert(locale.into(), text.into());
        self
    }

    /// Returns the non-blank translation for `locale`, if any.
    pub fn get(&self, locale: &str) -> Option<&str> {
        self.0
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(locale))
            .map(|(_, value)| value.as_str())
            .filter(|value| !value.trim().is_empty())
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl From<BTreeMap<String, String>> for LocalizedText {
    fn from(value: BTreeMap<String, String>) -> Self {
        Self(value)
    }
}

/// Resolves display text for `requested`, falling back to `default_locale`.
pub fn resolve_text<'a>(
    text: &'a LocalizedText,
    requested: &str,
    default_locale: &str,
) -> Option<&'a str> {
    text.get(requested).or_else(|| text.get(default_locale))
}
