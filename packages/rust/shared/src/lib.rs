//! Shared types, error model, and configuration for crateprov.
//!
//! This crate is the foundation depended on by all other crateprov crates.
//! It provides:
//! - [`ProvenanceError`], the unified error type
//! - Domain types shared across stages ([`EntitySummary`], crate constants)
//! - Presence helpers that decide when a JSON-LD value counts as absent
//! - Configuration ([`AppConfig`], [`ExtractConfig`], config loading)

pub mod config;
pub mod error;
pub mod paths;
pub mod types;
pub mod values;

// Re-export public API at crate root for ergonomic imports.
pub use config::{
    AppConfig, DefaultsConfig, ExtractConfig, LimitsConfig, config_dir, config_file_path,
    init_config, load_config, load_config_from, write_default_config,
};
pub use error::{ProvenanceError, Result};
pub use paths::resolve_path;
pub use types::{
    DEFAULT_CRATE_DIR, DEFAULT_INTERFACE_ID, DEFAULT_LINK_LIMIT, EntitySummary, MANIFEST_FILE_NAME,
    MAX_INLINE_BYTES, ROOT_DATASET_ID,
};
