//! Configuration management with layered loading
//!
//! Precedence (lowest to highest):
//! 1. Compiled defaults
//! 2. Global config: `$XDG_CONFIG_HOME/lfmerge/lfmerge.toml`
//! 3. Environment variables: `LFMERGE_*` prefix

use std::path::{Path, PathBuf};

use config::{Config, ConfigError, Environment};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};

use crate::application::ApplicationError;
use crate::domain::UnresolvedMembers;

/// Unified configuration for lfmerge.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Settings {
    /// Template document whose filters `lfmerge template` imports
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default_template: Option<PathBuf>,
    /// Directory the interactive picker scans for candidate documents
    pub search_dir: PathBuf,
    /// What to do with group members the cloner could not map
    pub on_unresolved: UnresolvedMembers,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            default_template: None,
            search_dir: PathBuf::from("."),
            on_unresolved: UnresolvedMembers::Drop,
        }
    }
}

/// Raw settings for intermediate parsing (all fields optional to detect
/// "not specified").
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
struct RawSettings {
    default_template: Option<PathBuf>,
    search_dir: Option<PathBuf>,
    on_unresolved: Option<UnresolvedMembers>,
}

/// Get the XDG config directory for lfmerge.
pub fn global_config_dir() -> Option<PathBuf> {
    ProjectDirs::from("", "", "lfmerge").map(|dirs| dirs.config_dir().to_path_buf())
}

/// Get the path to the global config file.
pub fn global_config_path() -> Option<PathBuf> {
    global_config_dir().map(|dir| dir.join("lfmerge.toml"))
}

fn load_raw_settings(path: &Path) -> Result<RawSettings, ApplicationError> {
    let content = std::fs::read_to_string(path).map_err(|e| ApplicationError::Config {
        message: format!("read {}: {}", path.display(), e),
    })?;
    toml::from_str(&content).map_err(|e| ApplicationError::Config {
        message: format!("parse {}: {}", path.display(), e),
    })
}

impl Settings {
    /// Load settings with layered precedence.
    pub fn load() -> Result<Self, ApplicationError> {
        let mut current = Self::default();

        if let Some(global_path) = global_config_path() {
            if global_path.exists() {
                let raw = load_raw_settings(&global_path)?;
                current = current.merge_with(&raw);
            }
        }

        current = Self::apply_env_overrides(current)?;
        current.expand_paths();

        Ok(current)
    }

    /// Overlay raw settings onto self; specified values win.
    fn merge_with(&self, overlay: &RawSettings) -> Self {
        Self {
            default_template: overlay
                .default_template
                .clone()
                .or_else(|| self.default_template.clone()),
            search_dir: overlay
                .search_dir
                .clone()
                .unwrap_or_else(|| self.search_dir.clone()),
            on_unresolved: overlay.on_unresolved.unwrap_or(self.on_unresolved),
        }
    }

    /// Apply LFMERGE_* environment variables as explicit overrides.
    fn apply_env_overrides(mut settings: Self) -> Result<Self, ApplicationError> {
        let builder =
            Config::builder().add_source(Environment::with_prefix("LFMERGE").separator("__"));
        let config = builder.build().map_err(config_err)?;

        if let Ok(val) = config.get_string("default_template") {
            settings.default_template = Some(PathBuf::from(val));
        }
        if let Ok(val) = config.get_string("search_dir") {
            settings.search_dir = PathBuf::from(val);
        }
        if let Ok(val) = config.get_string("on_unresolved") {
            settings.on_unresolved = val
                .parse()
                .map_err(|message: String| ApplicationError::Config { message })?;
        }

        Ok(settings)
    }

    /// Expand shell variables and tilde in path-like fields.
    ///
    /// Handles `~`, `$VAR`, and `${VAR}` syntax.
    fn expand_paths(&mut self) {
        if let Some(template) = &self.default_template {
            self.default_template = Some(PathBuf::from(expand(&template.to_string_lossy())));
        }
        self.search_dir = PathBuf::from(expand(&self.search_dir.to_string_lossy()));
    }

    /// Show the effective configuration as TOML.
    pub fn to_toml(&self) -> Result<String, ApplicationError> {
        toml::to_string_pretty(self).map_err(|e| ApplicationError::Config {
            message: format!("serialize config: {e}"),
        })
    }

    /// Generate a template config file.
    pub fn template() -> String {
        r#"# lfmerge configuration
#
# Location: ~/.config/lfmerge/lfmerge.toml
# Any key can be overridden with LFMERGE_* environment variables,
# e.g. LFMERGE_DEFAULT_TEMPLATE=~/templates/base.toml

# Template document whose layer filters `lfmerge template` imports
# default_template = "~/templates/base.toml"

# Directory the interactive picker scans for candidate documents
# search_dir = "."

# Group members without a destination mapping: "drop" (omit them, the
# default) or "fail" (abort the import before anything is written)
# on_unresolved = "drop"
"#
        .to_string()
    }
}

fn expand(path: &str) -> String {
    shellexpand::full(path)
        .map(|s| s.into_owned())
        .unwrap_or_else(|_| path.to_string())
}

fn config_err(e: ConfigError) -> ApplicationError {
    ApplicationError::Config {
        message: e.to_string(),
    }
}
