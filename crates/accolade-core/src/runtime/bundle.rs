// crates/accolade-core/src/runtime/bundle.rs
// ============================================================================
// Module: Message Bundles
// Description: Locales, message bundles, and an in-memory bundle source.
// Purpose: Resolve localized achievement titles and descriptions.
// Dependencies: crate::interfaces, serde
// ============================================================================

//! ## Overview
//! A [`MessageBundle`] maps localization keys such as `first_blood.title` to
//! display strings. Bundles are located by base name and [`Locale`]; lookup
//! tries the most specific candidate (`en_US`), then the language (`en`),
//! then the root bundle.
//!
//! ## Invariants
//! - Bundles are read-only once loaded.
//! - Missing keys are reported as `None`; callers decide on fallbacks.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeMap;
use std::fmt;

use serde::Deserialize;
use serde::Serialize;

use crate::interfaces::BundleSource;
use crate::interfaces::LocalizationError;

// ============================================================================
// SECTION: Locale
// ============================================================================

/// Language tag with an optional region.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Locale {
    /// Lowercase language subtag.
    language: String,
    /// Uppercase region subtag.
    region: Option<String>,
}

impl Locale {
    /// Parses tags such as `en`, `en-US`, or `pt_br`.
    ///
    /// # Errors
    ///
    /// Returns [`LocalizationError::InvalidLocale`] for malformed tags.
    pub fn parse(tag: &str) -> Result<Self, LocalizationError> {
        let invalid = || LocalizationError::InvalidLocale(tag.to_string());
        let mut parts = tag.trim().split(['-', '_']);
        let language = parts.next().filter(|part| is_subtag(part, 2, 8, false)).ok_or_else(invalid)?;
        let region = match parts.next() {
            Some(part) if is_subtag(part, 2, 3, true) => Some(part.to_ascii_uppercase()),
            Some(_) => return Err(invalid()),
            None => None,
        };
        if parts.next().is_some() {
            return Err(invalid());
        }
        Ok(Self {
            language: language.to_ascii_lowercase(),
            region,
        })
    }

    /// Returns the language subtag.
    #[must_use]
    pub fn language(&self) -> &str {
        &self.language
    }

    /// Returns the region subtag.
    #[must_use]
    pub fn region(&self) -> Option<&str> {
        self.region.as_deref()
    }

    /// Returns bundle suffixes from most to least specific.
    #[must_use]
    pub fn candidates(&self) -> Vec<String> {
        let mut out = Vec::with_capacity(2);
        if let Some(region) = &self.region {
            out.push(format!("{}_{region}", self.language));
        }
        out.push(self.language.clone());
        out
    }
}

impl Default for Locale {
    fn default() -> Self {
        Self {
            language: "en".to_string(),
            region: None,
        }
    }
}

impl fmt::Display for Locale {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.region {
            Some(region) => write!(f, "{}_{region}", self.language),
            None => f.write_str(&self.language),
        }
    }
}

impl TryFrom<String> for Locale {
    type Error = LocalizationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<Locale> for String {
    fn from(value: Locale) -> Self {
        value.to_string()
    }
}

/// Returns true when `part` is an ASCII subtag of the allowed length.
fn is_subtag(part: &str, min: usize, max: usize, allow_digits: bool) -> bool {
    (min ..= max).contains(&part.len())
        && part.bytes().all(|b| b.is_ascii_alphabetic() || (allow_digits && b.is_ascii_digit()))
}

// ============================================================================
// SECTION: Message Bundle
// ============================================================================

/// Localized messages for one base name and locale.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MessageBundle {
    /// Locale the bundle was resolved for; `None` for the root bundle.
    locale: Option<Locale>,
    /// Messages keyed by localization key.
    messages: BTreeMap<String, String>,
}

impl MessageBundle {
    /// Creates an empty bundle.
    #[must_use]
    pub const fn new(locale: Option<Locale>) -> Self {
        Self {
            locale,
            messages: BTreeMap::new(),
        }
    }

    /// Creates a bundle from key/message pairs.
    #[must_use]
    pub fn from_entries<K, V>(locale: Option<Locale>, entries: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: Into<String>,
        V: Into<String>,
    {
        Self {
            locale,
            messages: entries.into_iter().map(|(key, value)| (key.into(), value.into())).collect(),
        }
    }

    /// Adds or replaces a message.
    #[must_use]
    pub fn with_message(mut self, key: impl Into<String>, message: impl Into<String>) -> Self {
        self.messages.insert(key.into(), message.into());
        self
    }

    /// Returns the message for `key`.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&str> {
        self.messages.get(key).map(String::as_str)
    }

    /// Returns the bundle locale.
    #[must_use]
    pub const fn locale(&self) -> Option<&Locale> {
        self.locale.as_ref()
    }

    /// Returns the number of messages.
    #[must_use]
    pub fn len(&self) -> usize {
        self.messages.len()
    }

    /// Returns true when the bundle holds no messages.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }
}

// ============================================================================
// SECTION: Static Source
// ============================================================================

/// In-memory bundle source for tests and embedded catalogs.
#[derive(Debug, Clone, Default)]
pub struct StaticBundleSource {
    /// Bundles keyed by base name, then by locale suffix (`""` for root).
    bundles: BTreeMap<String, BTreeMap<String, MessageBundle>>,
}

impl StaticBundleSource {
    /// Creates an empty source.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a bundle; a bundle without a locale is the root bundle.
    #[must_use]
    pub fn with_bundle(mut self, base_name: impl Into<String>, bundle: MessageBundle) -> Self {
        let suffix = bundle.locale().map(ToString::to_string).unwrap_or_default();
        self.bundles.entry(base_name.into()).or_default().insert(suffix, bundle);
        self
    }
}

impl BundleSource for StaticBundleSource {
    fn load(&self, base_name: &str, locale: &Locale) -> Result<MessageBundle, LocalizationError> {
        let missing = || LocalizationError::MissingBundle {
            base_name: base_name.to_string(),
            locale: locale.to_string(),
        };
        let by_locale = self.bundles.get(base_name).ok_or_else(missing)?;
        locale
            .candidates()
            .into_iter()
            .chain(std::iter::once(String::new()))
            .find_map(|suffix| by_locale.get(&suffix).cloned())
            .ok_or_else(missing)
    }
}
