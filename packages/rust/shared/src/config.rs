//! Project configuration for the La Sfera build.
//!
//! Config lives at `<project root>/lasfera.toml` and is optional.
//! CLI flags override config file values, which override defaults.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{Result, SferaError};
use crate::types::RecordOrdering;

/// Default configuration file name.
pub const CONFIG_FILE_NAME: &str = "lasfera.toml";

// ---------------------------------------------------------------------------
// Config structs (matching lasfera.toml schema)
// ---------------------------------------------------------------------------

/// Top-level project config, deserialized from TOML.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// Source and output locations.
    #[serde(default)]
    pub paths: PathsConfig,

    /// Build policies.
    #[serde(default)]
    pub build: BuildPolicyConfig,

    /// Annotation API client settings.
    #[serde(default)]
    pub api: ApiConfig,
}

/// `[paths]` section. Relative paths resolve against the project root.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PathsConfig {
    /// Directory holding one subdirectory of YAML records per entity.
    #[serde(default = "default_data_dir")]
    pub data_dir: String,

    /// Directory receiving the JSON collections.
    #[serde(default = "default_output_dir")]
    pub output_dir: String,
}

impl Default for PathsConfig {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
            output_dir: default_output_dir(),
        }
    }
}

fn default_data_dir() -> String {
    "data".into()
}
fn default_output_dir() -> String {
    "src/_data".into()
}

/// `[build]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BuildPolicyConfig {
    /// Order of manuscripts and locations: "listing" or "key".
    #[serde(default)]
    pub ordering: RecordOrdering,

    /// Fail the build when line codes are not uniformly zero-padded.
    #[serde(default = "default_true")]
    pub strict_line_codes: bool,
}

impl Default for BuildPolicyConfig {
    fn default() -> Self {
        Self {
            ordering: RecordOrdering::default(),
            strict_line_codes: true,
        }
    }
}

fn default_true() -> bool {
    true
}

/// `[api]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    /// Origin serving `/text-annotations/...`.
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Request timeout in seconds.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// `Cookie` header value for an authenticated session, e.g. `sessionid=...`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub session_cookie: Option<String>,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            timeout_secs: default_timeout_secs(),
            session_cookie: None,
        }
    }
}

fn default_base_url() -> String {
    "http://localhost:8000".into()
}
fn default_timeout_secs() -> u64 {
    30
}

// ---------------------------------------------------------------------------
// Build config (runtime, merged from config + CLI flags)
// ---------------------------------------------------------------------------

/// Runtime build configuration with paths resolved against the project root.
#[derive(Debug, Clone)]
pub struct BuildConfig {
    /// Directory holding `manuscripts/`, `stanzas/`, `translations/`, `locations/`.
    pub data_dir: PathBuf,
    /// Directory receiving `<entity>.json`.
    pub output_dir: PathBuf,
    /// Order of the unsorted collections.
    pub ordering: RecordOrdering,
    /// Whether a line-code shape violation is fatal.
    pub strict_line_codes: bool,
}

impl BuildConfig {
    /// Resolve a config against a project root.
    pub fn resolve(config: &AppConfig, root: &Path) -> Self {
        Self {
            data_dir: root.join(&config.paths.data_dir),
            output_dir: root.join(&config.paths.output_dir),
            ordering: config.build.ordering,
            strict_line_codes: config.build.strict_line_codes,
        }
    }
}

// ---------------------------------------------------------------------------
// Config loading
// ---------------------------------------------------------------------------

/// Path of the config file for a project root.
pub fn config_file_path(root: &Path) -> PathBuf {
    root.join(CONFIG_FILE_NAME)
}

/// Load the project config. Returns defaults if the file does not exist.
pub fn load_config(root: &Path) -> Result<AppConfig> {
    let path = config_file_path(root);

    if !path.exists() {
        tracing::debug!(?path, "config file not found, using defaults");
        return Ok(AppConfig::default());
    }

    load_config_from(&path)
}

/// Load the project config from a specific file path.
pub fn load_config_from(path: &Path) -> Result<AppConfig> {
    let content = std::fs::read_to_string(path).map_err(|e| SferaError::io(path, e))?;

    toml::from_str(&content)
        .map_err(|e| SferaError::config(format!("failed to parse {}: {e}", path.display())))
}

/// Write a default config file into the project root.
/// Refuses to overwrite an existing file. Returns the path to the created file.
pub fn init_config(root: &Path) -> Result<PathBuf> {
    let path = config_file_path(root);
    if path.exists() {
        return Err(SferaError::config(format!(
            "{} already exists",
            path.display()
        )));
    }

    let content = toml::to_string_pretty(&AppConfig::default())
        .map_err(|e| SferaError::config(e.to_string()))?;

    std::fs::write(&path, content).map_err(|e| SferaError::io(&path, e))?;
    tracing::info!(?path, "created default config file");

    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_dir() -> PathBuf {
        let dir = std::env::temp_dir().join(format!("lasfera-config-test-{}", uuid::Uuid::now_v7()));
        std::fs::create_dir_all(&dir).unwrap();
        dir
    }

    #[test]
    fn default_config_serializes() {
        let toml_str = toml::to_string_pretty(&AppConfig::default()).expect("serialize");
        assert!(toml_str.contains("data_dir"));
        assert!(toml_str.contains("src/_data"));
        assert!(toml_str.contains("ordering = \"listing\""));
    }

    #[test]
    fn partial_config_fills_defaults() {
        let toml_str = r#"
[build]
ordering = "key"
"#;
        let config: AppConfig = toml::from_str(toml_str).expect("parse");
        assert_eq!(config.build.ordering, RecordOrdering::Key);
        assert!(config.build.strict_line_codes);
        assert_eq!(config.paths.data_dir, "data");
        assert_eq!(config.api.timeout_secs, 30);
        assert_eq!(config.api.session_cookie, None);
    }

    #[test]
    fn api_session_cookie_is_read() {
        let toml_str = "[api]\nbase_url = \"https://lasfera.example/\"\nsession_cookie = \"sessionid=abc\"\n";
        let config: AppConfig = toml::from_str(toml_str).expect("parse");
        assert_eq!(config.api.session_cookie.as_deref(), Some("sessionid=abc"));
    }

    #[test]
    fn unknown_ordering_rejected() {
        let toml_str = "[build]\nordering = \"random\"\n";
        assert!(toml::from_str::<AppConfig>(toml_str).is_err());
    }

    #[test]
    fn build_config_resolves_against_root() {
        let root = Path::new("/srv/lasfera");
        let build = BuildConfig::resolve(&AppConfig::default(), root);
        assert_eq!(build.data_dir, Path::new("/srv/lasfera/data"));
        assert_eq!(build.output_dir, Path::new("/srv/lasfera/src/_data"));
        assert_eq!(build.ordering, RecordOrdering::Listing);
    }

    #[test]
    fn missing_file_yields_defaults() {
        let root = temp_dir();
        let config = load_config(&root).expect("defaults");
        assert_eq!(config.paths.output_dir, "src/_data");
    }

    #[test]
    fn init_then_load_roundtrip() {
        let root = temp_dir();
        let path = init_config(&root).expect("init");
        assert!(path.ends_with(CONFIG_FILE_NAME));

        let loaded = load_config(&root).expect("load");
        assert!(loaded.build.strict_line_codes);

        let err = init_config(&root).unwrap_err();
        assert!(err.to_string().contains("already exists"));
    }

    #[test]
    fn malformed_file_is_config_error() {
        let root = temp_dir();
        std::fs::write(config_file_path(&root), "[paths\n").unwrap();
        let err = load_config(&root).unwrap_err();
        assert!(matches!(err, SferaError::Config { .. }));
    }
}
