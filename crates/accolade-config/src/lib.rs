// crates/accolade-config/src/lib.rs
// ============================================================================
// Module: Accolade Config Library
// Description: Engine configuration model, validation, and bundle loading.
// Purpose: Single source of truth for accolade.toml semantics.
// Dependencies: accolade-core, accolade-providers, accolade-store-sqlite, toml
// ============================================================================

//! ## Overview
//! `accolade-config` loads `accolade.toml`, validates it fail-closed, and turns
//! it into a wired engine: stores, audit sink, clock, and message bundles.
//! Config inputs are untrusted and go through size and path limits.

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod bundle;
pub mod config;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use bundle::TomlBundleSource;
pub use config::*;
