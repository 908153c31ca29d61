//! Configuration management with layered loading
//!
//! Precedence (lowest to highest):
//! 1. Compiled defaults
//! 2. Global config: `$XDG_CONFIG_HOME/splittree/splittree.toml`
//! 3. Local config: `<data_dir>/.splittree.toml`
//! 4. Environment variables: `SPLITTREE_*` prefix

use std::path::{Path, PathBuf};

use config::{Config, ConfigError, Environment};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};

use crate::application::ApplicationError;
use crate::domain::expand_env_vars;

/// How amounts and trees are presented.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct DisplayConfig {
    /// Prefix printed before every amount
    pub currency: String,
    /// Fraction digits of amounts
    pub decimals: usize,
    /// Render children of nodes collapsed in the editor
    pub expand_collapsed: bool,
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            currency: "¥".into(),
            decimals: 0,
            expand_collapsed: false,
        }
    }
}

/// Raw display config for intermediate parsing (`None` → not specified, inherit).
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct RawDisplayConfig {
    pub currency: Option<String>,
    pub decimals: Option<usize>,
    pub expand_collapsed: Option<bool>,
}

impl DisplayConfig {
    /// Merge overlay config onto self (base). Overlay wins if specified.
    pub fn merge(&self, overlay: &RawDisplayConfig) -> Self {
        Self {
            currency: overlay
                .currency
                .clone()
                .unwrap_or_else(|| self.currency.clone()),
            decimals: overlay.decimals.unwrap_or(self.decimals),
            expand_collapsed: overlay.expand_collapsed.unwrap_or(self.expand_collapsed),
        }
    }
}

/// Raw settings for intermediate parsing.
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct RawSettings {
    pub data_dir: Option<PathBuf>,
    pub display: RawDisplayConfig,
}

/// Unified configuration for splittree.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct Settings {
    /// Directory scanned for project files when no paths are given
    pub data_dir: PathBuf,
    pub display: DisplayConfig,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("."),
            display: DisplayConfig::default(),
        }
    }
}

/// Get the XDG config directory for splittree.
pub fn global_config_dir() -> Option<PathBuf> {
    ProjectDirs::from("", "", "splittree").map(|dirs| dirs.config_dir().to_path_buf())
}

/// Get the path to the global config file.
pub fn global_config_path() -> Option<PathBuf> {
    global_config_dir().map(|dir| dir.join("splittree.toml"))
}

/// Get the path to the local config file in a data directory.
pub fn local_config_path(data_dir: &Path) -> PathBuf {
    data_dir.join(".splittree.toml")
}

/// Load a TOML file into RawSettings for manual merging.
fn load_raw_settings(path: &Path) -> Result<RawSettings, ApplicationError> {
    let content = std::fs::read_to_string(path).map_err(|e| ApplicationError::Config {
        message: format!("read {}: {}", path.display(), e),
    })?;
    toml::from_str(&content).map_err(|e| ApplicationError::Config {
        message: format!("parse {}: {}", path.display(), e),
    })
}

impl Settings {
    /// Expand shell variables and tilde in path-like fields.
    fn expand_paths(&mut self) {
        let expanded = expand_env_vars(self.data_dir.to_string_lossy().as_ref());
        self.data_dir = PathBuf::from(expanded);
    }

    fn merge_with(&self, overlay: &RawSettings) -> Self {
        Self {
            data_dir: overlay
                .data_dir
                .clone()
                .unwrap_or_else(|| self.data_dir.clone()),
            display: self.display.merge(&overlay.display),
        }
    }

    /// Load settings with layered precedence.
    ///
    /// # Arguments
    /// * `data_dir` - Optional data directory holding a local `.splittree.toml`
    ///
    /// # Precedence (lowest to highest)
    /// 1. Compiled defaults
    /// 2. Global config: `$XDG_CONFIG_HOME/splittree/splittree.toml`
    /// 3. Local config: `<data_dir>/.splittree.toml`
    /// 4. Environment variables: `SPLITTREE_*` prefix, `__` between nested keys
    ///
    /// A local config that does not set `data_dir` keeps the directory it was
    /// loaded from.
    pub fn load(data_dir: Option<&Path>) -> Result<Self, ApplicationError> {
        Self::load_layers(global_config_path().as_deref(), data_dir)
    }

    /// Layered load with an explicit global config file.
    ///
    /// Without `data_dir` the local layer is read from the data directory
    /// known so far: the global config's `data_dir`, else `.`.
    pub fn load_layers(
        global_path: Option<&Path>,
        data_dir: Option<&Path>,
    ) -> Result<Self, ApplicationError> {
        let mut current = Self::default();

        if let Some(global_path) = global_path {
            if global_path.exists() {
                let raw = load_raw_settings(global_path)?;
                current = current.merge_with(&raw);
            }
        }

        let dir = data_dir.map(Path::to_path_buf).unwrap_or_else(|| {
            PathBuf::from(expand_env_vars(&current.data_dir.to_string_lossy()))
        });
        current.data_dir = dir.clone();
        let local_path = local_config_path(&dir);
        if local_path.exists() {
            let raw = load_raw_settings(&local_path)?;
            current = current.merge_with(&raw);
        }

        current = Self::apply_env_overrides(current)?;
        current.expand_paths();

        Ok(current)
    }

    /// Apply SPLITTREE_* environment variables as explicit overrides.
    fn apply_env_overrides(mut settings: Self) -> Result<Self, ApplicationError> {
        let config = Config::builder()
            .add_source(
                Environment::with_prefix("SPLITTREE")
                    .prefix_separator("_")
                    .separator("__"),
            )
            .build()
            .map_err(config_err)?;

        if let Ok(val) = config.get_string("data_dir") {
            settings.data_dir = PathBuf::from(val);
        }
        if let Ok(val) = config.get_string("display.currency") {
            settings.display.currency = val;
        }
        if let Ok(val) = config.get::<usize>("display.decimals") {
            settings.display.decimals = val;
        }
        if let Ok(val) = config.get_bool("display.expand_collapsed") {
            settings.display.expand_collapsed = val;
        }

        Ok(settings)
    }

    /// Show the effective configuration as TOML.
    pub fn to_toml(&self) -> Result<String, ApplicationError> {
        toml::to_string_pretty(self).map_err(|e| ApplicationError::Config {
            message: format!("serialize config: {e}"),
        })
    }

    /// Generate a template config file.
    pub fn template() -> String {
        r#"# splittree configuration
#
# Locations (by precedence, lowest to highest):
#   Global: ~/.config/splittree/splittree.toml
#   Local:  <data_dir>/.splittree.toml
#   Env:    SPLITTREE_* environment variables (e.g. SPLITTREE_DISPLAY__DECIMALS=2)

# Directory scanned for *.json project files by `splittree stats`
# data_dir = "~/allocations"

[display]
# Prefix printed before amounts
# currency = "¥"

# Fraction digits of amounts
# decimals = 0

# Show children of nodes collapsed in the editor
# expand_collapsed = false
"#
        .to_string()
    }
}

fn config_err(e: ConfigError) -> ApplicationError {
    ApplicationError::Config {
        message: e.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn given_no_config_when_loading_then_uses_defaults() {
        let settings = Settings::load(None).expect("load defaults");
        assert_eq!(settings.display, DisplayConfig::default());
    }

    #[test]
    fn given_tilde_in_data_dir_when_expand_paths_then_expands_to_home() {
        let mut settings = Settings {
            data_dir: PathBuf::from("~/allocations"),
            display: DisplayConfig::default(),
        };

        settings.expand_paths();

        let home = std::env::var("HOME").expect("HOME should be set");
        let dir = settings.data_dir.to_string_lossy();
        assert!(dir.starts_with(&home), "data_dir should start with home: {}", dir);
        assert!(!dir.contains('~'));
    }

    #[test]
    fn given_partial_overlay_when_merging_display_then_keeps_unset_fields() {
        let base = DisplayConfig::default();
        let overlay = RawDisplayConfig {
            currency: Some("$".into()),
            decimals: None,
            expand_collapsed: Some(true),
        };

        let merged = base.merge(&overlay);

        assert_eq!(merged.currency, "$");
        assert_eq!(merged.decimals, 0);
        assert!(merged.expand_collapsed);
    }

    #[test]
    fn given_template_when_parsed_then_is_valid_toml() {
        let raw: RawSettings = toml::from_str(&Settings::template()).expect("parse template");
        assert!(raw.data_dir.is_none());
        assert!(raw.display.currency.is_none());
    }

    #[test]
    fn given_settings_when_serialized_then_roundtrips_through_toml() {
        let settings = Settings::default();
        let text = settings.to_toml().expect("serialize");
        let parsed: Settings = toml::from_str(&text).expect("parse");
        assert_eq!(parsed, settings);
    }
}
