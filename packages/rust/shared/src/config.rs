//! Application configuration for crateprov.
//!
//! User config lives at `~/.crateprov/crateprov.toml`.
//! CLI flags override config file values, which override defaults.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{ProvenanceError, Result};
use crate::types::{DEFAULT_CRATE_DIR, DEFAULT_INTERFACE_ID, DEFAULT_LINK_LIMIT, MAX_INLINE_BYTES};

/// Default configuration file name.
const CONFIG_FILE_NAME: &str = "crateprov.toml";

/// Default config directory name under the user's home.
const CONFIG_DIR_NAME: &str = ".crateprov";

// ---------------------------------------------------------------------------
// Config structs (matching crateprov.toml schema)
// ---------------------------------------------------------------------------

/// Top-level application config, deserialized from TOML.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// Global defaults.
    #[serde(default)]
    pub defaults: DefaultsConfig,

    /// Output-volume limits.
    #[serde(default)]
    pub limits: LimitsConfig,
}

/// `[defaults]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DefaultsConfig {
    /// Crate directory used when none is given on the command line.
    #[serde(default = "default_crate_dir")]
    pub crate_dir: String,

    /// Identifier of the interface entity whose workflow is extracted.
    #[serde(default = "default_interface_id")]
    pub interface_id: String,

    /// Optional site filter applied to example links.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub site: Option<String>,
}

impl Default for DefaultsConfig {
    fn default() -> Self {
        Self {
            crate_dir: default_crate_dir(),
            interface_id: default_interface_id(),
            site: None,
        }
    }
}

fn default_crate_dir() -> String {
    DEFAULT_CRATE_DIR.into()
}
fn default_interface_id() -> String {
    DEFAULT_INTERFACE_ID.into()
}

/// `[limits]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LimitsConfig {
    /// Maximum bytes of work-example content inlined per notebook cell.
    #[serde(default = "default_inline_bytes")]
    pub inline_bytes: usize,

    /// Maximum markdown links listed before a `… (+N more)` marker.
    #[serde(default = "default_link_limit")]
    pub link_limit: usize,
}

impl Default for LimitsConfig {
    fn default() -> Self {
        Self {
            inline_bytes: default_inline_bytes(),
            link_limit: default_link_limit(),
        }
    }
}

fn default_inline_bytes() -> usize {
    MAX_INLINE_BYTES
}
fn default_link_limit() -> usize {
    DEFAULT_LINK_LIMIT
}

// ---------------------------------------------------------------------------
// Extract config (runtime, merged from config + CLI flags)
// ---------------------------------------------------------------------------

/// Runtime extraction configuration, merged from config file and CLI flags.
#[derive(Debug, Clone)]
pub struct ExtractConfig {
    /// Interface entity to start from.
    pub interface_id: String,
    /// Byte cap for inlined work-example content.
    pub inline_bytes: usize,
    /// Cap for markdown link lists.
    pub link_limit: usize,
    /// Substring narrowing example links in prompt payloads.
    pub site: Option<String>,
}

impl ExtractConfig {
    /// Defaults for everything but the interface identifier.
    pub fn new(interface_id: impl Into<String>) -> Self {
        Self {
            interface_id: interface_id.into(),
            inline_bytes: MAX_INLINE_BYTES,
            link_limit: DEFAULT_LINK_LIMIT,
            site: None,
        }
    }

    /// Set the site filter.
    pub fn with_site(mut self, site: Option<String>) -> Self {
        self.site = site.filter(|s| !s.is_empty());
        self
    }
}

impl Default for ExtractConfig {
    fn default() -> Self {
        Self::new(DEFAULT_INTERFACE_ID)
    }
}

impl From<&AppConfig> for ExtractConfig {
    fn from(config: &AppConfig) -> Self {
        Self {
            interface_id: config.defaults.interface_id.clone(),
            inline_bytes: config.limits.inline_bytes,
            link_limit: config.limits.link_limit,
            site: config.defaults.site.clone().filter(|s| !s.is_empty()),
        }
    }
}

// ---------------------------------------------------------------------------
// Settings file
// ---------------------------------------------------------------------------

/// Header written above the generated settings.
const SETTINGS_HEADER: &str = "\
# crateprov settings.
# [defaults].crate_dir is used when `crateprov steps|views|context` gets no
# crate path; --interface and --site override the other [defaults] keys.
# [limits] caps inlined notebook-cell bytes and listed markdown links.

";

/// `~/.crateprov`, the directory holding `crateprov.toml`.
pub fn config_dir() -> Result<PathBuf> {
    let home = dirs::home_dir()
        .ok_or_else(|| ProvenanceError::config("no home directory to look for crateprov.toml in"))?;
    Ok(home.join(CONFIG_DIR_NAME))
}

/// `~/.crateprov/crateprov.toml`.
pub fn config_file_path() -> Result<PathBuf> {
    Ok(config_dir()?.join(CONFIG_FILE_NAME))
}

/// Read the user's settings, falling back to built-in defaults when
/// `crateprov.toml` has not been created.
pub fn load_config() -> Result<AppConfig> {
    let path = config_file_path()?;
    if !path.is_file() {
        tracing::debug!(?path, "no settings file, using built-in defaults");
        return Ok(AppConfig::default());
    }
    load_config_from(&path)
}

/// Read and check a settings file.
///
/// Missing keys take their defaults. `[defaults].interface_id`,
/// `[limits].inline_bytes` and `[limits].link_limit` must not be empty or zero.
pub fn load_config_from(path: &Path) -> Result<AppConfig> {
    let content = std::fs::read_to_string(path).map_err(|e| ProvenanceError::io(path, e))?;
    let config: AppConfig = toml::from_str(&content)
        .map_err(|e| ProvenanceError::config(format!("failed to parse {}: {e}", path.display())))?;
    config
        .check()
        .map_err(|problem| ProvenanceError::config(format!("{}: {problem}", path.display())))?;
    Ok(config)
}

impl AppConfig {
    fn check(&self) -> std::result::Result<(), String> {
        if self.defaults.interface_id.trim().is_empty() {
            return Err("[defaults].interface_id must name an interface entity".into());
        }
        if self.limits.inline_bytes == 0 {
            return Err("[limits].inline_bytes must be at least 1".into());
        }
        if self.limits.link_limit == 0 {
            return Err("[limits].link_limit must be at least 1".into());
        }
        Ok(())
    }
}

/// Write the default settings to `path`, creating parent directories.
pub fn write_default_config(path: &Path) -> Result<()> {
    if let Some(dir) = path.parent() {
        std::fs::create_dir_all(dir).map_err(|e| ProvenanceError::io(dir, e))?;
    }
    let body = toml::to_string_pretty(&AppConfig::default())
        .map_err(|e| ProvenanceError::config(format!("cannot render default settings: {e}")))?;
    std::fs::write(path, format!("{SETTINGS_HEADER}{body}")).map_err(|e| ProvenanceError::io(path, e))
}

/// Create `~/.crateprov/crateprov.toml` with `[defaults]` pointing at
/// `interface.crate` and the stock `[limits]`. Returns the file's path.
pub fn init_config() -> Result<PathBuf> {
    let path = config_file_path()?;
    write_default_config(&path)?;
    tracing::info!(?path, "wrote default crateprov settings");
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_serializes() {
        let toml_str = toml::to_string_pretty(&AppConfig::default()).expect("serialize");
        assert!(toml_str.contains("crate_dir"));
        assert!(toml_str.contains("interface.crate"));
        assert!(!toml_str.contains("site"));
    }

    #[test]
    fn config_roundtrip() {
        let toml_str = toml::to_string_pretty(&AppConfig::default()).expect("serialize");
        let parsed: AppConfig = toml::from_str(&toml_str).expect("deserialize");
        assert_eq!(parsed.defaults.interface_id, "E2.2-wms");
        assert_eq!(parsed.limits.inline_bytes, 20_000);
        assert_eq!(parsed.limits.link_limit, 5);
    }

    #[test]
    fn partial_config_fills_defaults() {
        let toml_str = r#"
[defaults]
site = "nzd0001"

[limits]
link_limit = 3
"#;
        let config: AppConfig = toml::from_str(toml_str).expect("parse");
        assert_eq!(config.defaults.crate_dir, "interface.crate");
        assert_eq!(config.defaults.site.as_deref(), Some("nzd0001"));
        assert_eq!(config.limits.link_limit, 3);
        assert_eq!(config.limits.inline_bytes, 20_000);
    }

    #[test]
    fn extract_config_from_app_config() {
        let mut app = AppConfig::default();
        app.defaults.site = Some(String::new());
        let extract = ExtractConfig::from(&app);
        assert_eq!(extract.interface_id, "E2.2-wms");
        assert_eq!(extract.inline_bytes, 20_000);
        assert!(extract.site.is_none());
    }

    fn settings_path() -> PathBuf {
        std::env::temp_dir()
            .join(format!("crateprov-config-{}", uuid::Uuid::now_v7()))
            .join(CONFIG_FILE_NAME)
    }

    #[test]
    fn load_config_from_reports_bad_toml() {
        let path = settings_path();
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(&path, "[defaults\ncrate_dir = 1").unwrap();
        let err = load_config_from(&path).unwrap_err();
        assert!(err.to_string().contains("failed to parse"));
        let _ = std::fs::remove_dir_all(path.parent().unwrap());
    }

    #[test]
    fn zero_limits_name_the_offending_key() {
        let path = settings_path();
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();

        std::fs::write(&path, "[limits]\nlink_limit = 0\n").unwrap();
        let err = load_config_from(&path).unwrap_err();
        assert!(err.to_string().contains("[limits].link_limit"));

        std::fs::write(&path, "[defaults]\ninterface_id = \" \"\n").unwrap();
        let err = load_config_from(&path).unwrap_err();
        assert!(err.to_string().contains("[defaults].interface_id"));

        let _ = std::fs::remove_dir_all(path.parent().unwrap());
    }

    #[test]
    fn default_settings_file_loads_back() {
        let path = settings_path();
        write_default_config(&path).unwrap();

        let written = std::fs::read_to_string(&path).unwrap();
        assert!(written.starts_with("# crateprov settings."));
        assert!(written.contains("[limits]"));

        let config = load_config_from(&path).unwrap();
        assert_eq!(config.defaults.crate_dir, "interface.crate");
        assert_eq!(config.limits.link_limit, 5);

        let _ = std::fs::remove_dir_all(path.parent().unwrap());
    }
}
