//! Config defaults and loading tests for accolade-config.
// crates/accolade-config/tests/config_defaults.rs
// =============================================================================
// Module: Config Defaults and Loading Tests
// Description: Validate default behavior and file loading limits.
// Purpose: Ensure an empty config is valid and load fails closed.
// =============================================================================

use std::fs;

use accolade_config::AccoladeConfig;
use accolade_config::AuditSinkKind;
use accolade_config::ConfigError;
use accolade_config::StoreKind;
use accolade_core::Locale;
use tempfile::TempDir;

mod common;

type TestResult = Result<(), String>;

#[test]
fn empty_config_uses_defaults() -> TestResult {
    let config = common::minimal_config().map_err(|err| err.to_string())?;
    config.validate().map_err(|err| err.to_string())?;
    if config.store.kind != StoreKind::Memory {
        return Err("default store should be memory".to_string());
    }
    if config.audit.sink != AuditSinkKind::None {
        return Err("default audit sink should be none".to_string());
    }
    if config.localization.base_name.is_some() {
        return Err("localization should be off by default".to_string());
    }
    if config.localization.locale != Locale::default() {
        return Err("default locale should be en".to_string());
    }
    if config.clock.utc_offset_minutes != 0 {
        return Err("default clock should be utc".to_string());
    }
    Ok(())
}

#[test]
fn full_config_parses() -> TestResult {
    let config = AccoladeConfig::from_toml_str(
        r#"
        [localization]
        base_name = "messages"
        locale = "pt-BR"
        bundle_dir = "i18n"

        [store]
        kind = "sqlite"
        path = "data/accolade.db"
        busy_timeout_ms = 2500
        journal_mode = "delete"
        sync_mode = "normal"

        [audit]
        sink = "file"
        path = "logs/audit.jsonl"

        [clock]
        utc_offset_minutes = -180
        "#,
    )
    .map_err(|err| err.to_string())?;
    if config.localization.locale.to_string() != "pt_BR" {
        return Err(format!("unexpected locale {}", config.localization.locale));
    }
    let sqlite = config
        .store
        .sqlite_config()
        .map_err(|err| err.to_string())?
        .ok_or_else(|| "sqlite config expected".to_string())?;
    if sqlite.busy_timeout_ms != 2500 {
        return Err("busy timeout not carried over".to_string());
    }
    let offset = config.clock.offset().map_err(|err| err.to_string())?;
    if offset.whole_minutes() != -180 {
        return Err("offset not carried over".to_string());
    }
    Ok(())
}

#[test]
fn unknown_store_kind_is_a_parse_error() -> TestResult {
    match AccoladeConfig::from_toml_str("[store]\nkind = \"redis\"\n") {
        Err(ConfigError::Parse(_)) => Ok(()),
        Err(err) => Err(format!("expected parse error, got {err}")),
        Ok(_) => Err("expected parse error".to_string()),
    }
}

#[test]
fn malformed_locale_is_a_parse_error() -> TestResult {
    match AccoladeConfig::from_toml_str("[localization]\nlocale = \"english!\"\n") {
        Err(ConfigError::Parse(_)) => Ok(()),
        Err(err) => Err(format!("expected parse error, got {err}")),
        Ok(_) => Err("expected parse error".to_string()),
    }
}

#[test]
fn load_reads_file_from_path() -> TestResult {
    let temp = TempDir::new().map_err(|err| err.to_string())?;
    let path = temp.path().join("accolade.toml");
    fs::write(&path, "[clock]\nutc_offset_minutes = 60\n").map_err(|err| err.to_string())?;
    let config = AccoladeConfig::load(Some(&path)).map_err(|err| err.to_string())?;
    if config.clock.utc_offset_minutes != 60 {
        return Err("clock offset not loaded".to_string());
    }
    Ok(())
}

#[test]
fn load_missing_file_is_io_error() -> TestResult {
    let temp = TempDir::new().map_err(|err| err.to_string())?;
    match AccoladeConfig::load(Some(&temp.path().join("absent.toml"))) {
        Err(ConfigError::Io(_)) => Ok(()),
        Err(err) => Err(format!("expected io error, got {err}")),
        Ok(_) => Err("expected io error".to_string()),
    }
}

#[test]
fn load_rejects_oversized_file() -> TestResult {
    let temp = TempDir::new().map_err(|err| err.to_string())?;
    let path = temp.path().join("accolade.toml");
    let padding = format!("# {}\n", "x".repeat(1024 * 1024));
    fs::write(&path, padding).map_err(|err| err.to_string())?;
    common::assert_invalid(AccoladeConfig::load(Some(&path)).map(|_| ()), "size limit")
}

#[test]
fn load_rejects_non_utf8() -> TestResult {
    let temp = TempDir::new().map_err(|err| err.to_string())?;
    let path = temp.path().join("accolade.toml");
    fs::write(&path, [0xff_u8, 0xfe, 0x00]).map_err(|err| err.to_string())?;
    common::assert_invalid(AccoladeConfig::load(Some(&path)).map(|_| ()), "utf-8")
}

#[test]
fn load_rejects_overlong_path_component() -> TestResult {
    let temp = TempDir::new().map_err(|err| err.to_string())?;
    let path = temp.path().join(format!("{}.toml", "c".repeat(300)));
    common::assert_invalid(AccoladeConfig::load(Some(&path)).map(|_| ()), "component too long")
}
