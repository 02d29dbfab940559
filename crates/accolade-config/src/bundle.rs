// crates/accolade-config/src/bundle.rs
// ============================================================================
// Module: TOML Message Bundles
// Description: BundleSource reading localized messages from TOML files.
// Purpose: Resolve `<base>_<locale>.toml` with fallback to the root bundle.
// Dependencies: accolade-core, toml
// ============================================================================

//! ## Overview
//! A bundle file is a TOML table of strings. Nested tables flatten into
//! dotted keys, so both of these define `first_click.title`:
//!
//! ```toml
//! "first_click.title" = "First click"
//!
//! [first_click]
//! title = "First click"
//! ```
//!
//! Lookup tries `<base>_<lang>_<REGION>.toml`, then `<base>_<lang>.toml`,
//! then `<base>.toml`. The first file that exists wins; a file that exists
//! but is malformed is an error rather than a reason to fall back.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;
use std::path::PathBuf;

use accolade_core::BundleSource;
use accolade_core::Locale;
use accolade_core::LocalizationError;
use accolade_core::MessageBundle;

use crate::config::MAX_CONFIG_FILE_SIZE;
use crate::config::MAX_PATH_COMPONENT_LENGTH;

// ============================================================================
// SECTION: Source
// ============================================================================

/// Bundle source over a directory of TOML files.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TomlBundleSource {
    /// Directory holding the bundle files.
    dir: PathBuf,
}

impl TomlBundleSource {
    /// Creates a source rooted at `dir`.
    #[must_use]
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
        }
    }

    /// Returns the bundle directory.
    #[must_use]
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Returns candidate files from most to least specific.
    fn candidates(&self, base_name: &str, locale: &Locale) -> Vec<(Option<Locale>, PathBuf)> {
        let mut out: Vec<(Option<Locale>, PathBuf)> = locale
            .candidates()
            .into_iter()
            .map(|suffix| {
                let path = self.dir.join(format!("{base_name}_{suffix}.toml"));
                (Locale::parse(&suffix).ok(), path)
            })
            .collect();
        out.push((None, self.dir.join(format!("{base_name}.toml"))));
        out
    }
}

impl BundleSource for TomlBundleSource {
    fn load(&self, base_name: &str, locale: &Locale) -> Result<MessageBundle, LocalizationError> {
        if base_name.is_empty()
            || base_name.len() > MAX_PATH_COMPONENT_LENGTH
            || base_name.contains(['/', '\\'])
            || base_name.contains("..")
        {
            return Err(LocalizationError::Invalid(format!("unusable bundle base name `{base_name}`")));
        }
        for (bundle_locale, path) in self.candidates(base_name, locale) {
            if path.is_file() {
                return read_bundle(&path, bundle_locale);
            }
        }
        Err(LocalizationError::MissingBundle {
            base_name: base_name.to_string(),
            locale: locale.to_string(),
        })
    }
}

// ============================================================================
// SECTION: Parsing
// ============================================================================

/// Reads and flattens one bundle file.
fn read_bundle(path: &Path, locale: Option<Locale>) -> Result<MessageBundle, LocalizationError> {
    let bytes = fs::read(path).map_err(|err| LocalizationError::Io(format!("{}: {err}", path.display())))?;
    if bytes.len() > MAX_CONFIG_FILE_SIZE {
        return Err(LocalizationError::Invalid(format!("{} exceeds size limit", path.display())));
    }
    let content = std::str::from_utf8(&bytes)
        .map_err(|_| LocalizationError::Invalid(format!("{} must be utf-8", path.display())))?;
    let table: toml::Table = toml::from_str(content)
        .map_err(|err| LocalizationError::Invalid(format!("{}: {err}", path.display())))?;
    let mut messages = BTreeMap::new();
    flatten(None, table, &mut messages)
        .map_err(|key| LocalizationError::Invalid(format!("{}: `{key}` is not a string", path.display())))?;
    Ok(MessageBundle::from_entries(locale, messages))
}

/// Flattens nested tables into dotted keys; returns the offending key on error.
fn flatten(
    prefix: Option<&str>,
    table: toml::Table,
    out: &mut BTreeMap<String, String>,
) -> Result<(), String> {
    for (key, value) in table {
        let full = prefix.map_or_else(|| key.clone(), |prefix| format!("{prefix}.{key}"));
        match value {
            toml::Value::String(message) => {
                out.insert(full, message);
            }
            toml::Value::Table(nested) => flatten(Some(&full), nested, out)?,
            _ => return Err(full),
        }
    }
    Ok(())
}
