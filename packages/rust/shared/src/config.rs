//! Application configuration for folio.
//!
//! User config lives at `~/.folio/folio.toml`, or wherever `--config` points.
//! CLI flags override config file values, which override defaults.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{FolioError, Result};

/// Default configuration file name.
const CONFIG_FILE_NAME: &str = "folio.toml";

/// Default config directory name under the user's home.
const CONFIG_DIR_NAME: &str = ".folio";

// ---------------------------------------------------------------------------
// Config structs (matching folio.toml schema)
// ---------------------------------------------------------------------------

/// Top-level application config, deserialized from TOML.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// Where the content document, manifest and public assets live.
    #[serde(default)]
    pub paths: PathsConfig,

    /// Version-control publish settings.
    #[serde(default)]
    pub publish: PublishConfig,
}

/// `[paths]` section. Every path is relative to the repository root.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PathsConfig {
    /// Primary content document.
    #[serde(default = "default_content_path")]
    pub content: String,

    /// PWA manifest document.
    #[serde(default = "default_manifest_path")]
    pub manifest: String,

    /// Directory receiving `sitemap.xml` and `robots.txt`.
    #[serde(default = "default_public_dir")]
    pub public_dir: String,
}

impl Default for PathsConfig {
    fn default() -> Self {
        Self {
            content: default_content_path(),
            manifest: default_manifest_path(),
            public_dir: default_public_dir(),
        }
    }
}

fn default_content_path() -> String {
    "client/src/data/template.json".into()
}
fn default_manifest_path() -> String {
    "client/public/manifest.json".into()
}
fn default_public_dir() -> String {
    "client/public".into()
}

/// `[publish]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PublishConfig {
    /// Committer name offered when none is configured.
    #[serde(default = "default_identity_name")]
    pub default_identity_name: String,

    /// Committer email offered when none is configured.
    #[serde(default = "default_identity_email")]
    pub default_identity_email: String,

    /// Prefix of the auto-generated commit message.
    #[serde(default = "default_commit_prefix")]
    pub commit_message_prefix: String,

    /// Version-control executable.
    #[serde(default = "default_git_binary")]
    pub git_binary: String,
}

impl Default for PublishConfig {
    fn default() -> Self {
        Self {
            default_identity_name: default_identity_name(),
            default_identity_email: default_identity_email(),
            commit_message_prefix: default_commit_prefix(),
            git_binary: default_git_binary(),
        }
    }
}

fn default_identity_name() -> String {
    "Ghost".into()
}
fn default_identity_email() -> String {
    "ghost@folio.local".into()
}
fn default_commit_prefix() -> String {
    "Update from Manager".into()
}
fn default_git_binary() -> String {
    "git".into()
}

// ---------------------------------------------------------------------------
// Resolved paths (runtime, config + repository root)
// ---------------------------------------------------------------------------

/// Absolute locations of everything the pipeline reads or writes.
#[derive(Debug, Clone)]
pub struct SitePaths {
    /// Repository root (version-control working tree).
    pub root: PathBuf,
    /// Primary content document.
    pub content: PathBuf,
    /// PWA manifest document.
    pub manifest: PathBuf,
    /// Directory receiving generated artifacts.
    pub public_dir: PathBuf,
}

impl SitePaths {
    /// Resolve the configured relative paths against `root`.
    pub fn resolve(config: &AppConfig, root: impl Into<PathBuf>) -> Self {
        let root = root.into();
        Self {
            content: root.join(&config.paths.content),
            manifest: root.join(&config.paths.manifest),
            public_dir: root.join(&config.paths.public_dir),
            root,
        }
    }
}

// ---------------------------------------------------------------------------
// Config loading
// ---------------------------------------------------------------------------

/// Get the path to the config directory (`~/.folio/`).
pub fn config_dir() -> Result<PathBuf> {
    let home =
        dirs::home_dir().ok_or_else(|| FolioError::config("could not determine home directory"))?;
    Ok(home.join(CONFIG_DIR_NAME))
}

/// Get the path to the config file (`~/.folio/folio.toml`).
pub fn config_file_path() -> Result<PathBuf> {
    Ok(config_dir()?.join(CONFIG_FILE_NAME))
}

/// Load the application config from disk. Returns defaults if the file does not exist.
pub fn load_config() -> Result<AppConfig> {
    let path = config_file_path()?;

    if !path.exists() {
        tracing::debug!(?path, "config file not found, using defaults");
        return Ok(AppConfig::default());
    }

    load_config_from(&path)
}

/// Load the application config from a specific file path.
pub fn load_config_from(path: &Path) -> Result<AppConfig> {
    let content = std::fs::read_to_string(path).map_err(|e| FolioError::io(path, e))?;

    toml::from_str(&content)
        .map_err(|e| FolioError::config(format!("failed to parse {}: {e}", path.display())))
}

/// Write a default config file at `path`, creating parent directories.
pub fn init_config_at(path: &Path) -> Result<()> {
    if let Some(dir) = path.parent() {
        std::fs::create_dir_all(dir).map_err(|e| FolioError::io(dir, e))?;
    }

    let content = toml::to_string_pretty(&AppConfig::default())
        .map_err(|e| FolioError::config(e.to_string()))?;

    std::fs::write(path, content).map_err(|e| FolioError::io(path, e))?;
    tracing::info!(?path, "created default config file");

    Ok(())
}

/// Create the config directory and write a default config file.
/// Returns the path to the created file.
pub fn init_config() -> Result<PathBuf> {
    let path = config_file_path()?;
    init_config_at(&path)?;
    Ok(path)
}
