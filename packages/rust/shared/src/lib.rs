//! Shared types, error model, and configuration for stackbind.
//!
//! This crate is the foundation depended on by the other stackbind crates.
//! It provides:
//! - [`BindError`] — the unified error type
//! - Domain types ([`SiteFile`], [`QuerySpec`], [`Entry`], [`Binding`])
//! - Configuration ([`AppConfig`], [`Credentials`], config loading)

pub mod config;
pub mod error;
pub mod types;

// Re-export public API at crate root for ergonomic imports.
pub use config::{
    AppConfig, DefaultsConfig, StackConfig, config_dir, config_file_path, init_config,
    load_config, load_config_from,
};
pub use error::{BindError, Result};
pub use types::{
    Binding, Credentials, Entry, FieldMap, FileMap, FilterSet, QuerySpec, SiteFile,
};
