//! Shared types, error model, and configuration for La Sfera.
//!
//! This crate is the foundation depended on by all other La Sfera crates.
//! It provides:
//! - [`SferaError`]: the unified error type
//! - Domain types ([`EntityKind`], [`RecordOrdering`], [`BuildReport`])
//! - Configuration ([`AppConfig`], [`BuildConfig`], config loading)

pub mod config;
pub mod error;
pub mod types;

// Re-export public API at crate root for ergonomic imports.
pub use config::{
    ApiConfig, AppConfig, BuildConfig, BuildPolicyConfig, CONFIG_FILE_NAME, PathsConfig,
    config_file_path, init_config, load_config, load_config_from,
};
pub use error::{Result, SferaError};
pub use types::{
    BuildReport, EntityKind, EntityReport, LINE_CODE_FIELD, RecordOrdering, SOURCE_EXTENSION,
};
