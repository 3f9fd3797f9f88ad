//! Shared error model and configuration for folio.
//!
//! This crate is the foundation depended on by all other folio crates.
//! It provides:
//! - [`FolioError`]: the unified error type
//! - Configuration ([`AppConfig`], [`SitePaths`], config loading)

pub mod config;
pub mod error;

// Re-export public API at crate root for ergonomic imports.
pub use config::{
    AppConfig, PathsConfig, PublishConfig, SitePaths, config_dir, config_file_path, init_config,
    init_config_at, load_config, load_config_from,
};
pub use error::{FolioError, Result};
