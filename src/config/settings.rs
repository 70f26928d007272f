//! TOML-based configuration for Captain.
//!
//! Supports a config file (captain.toml) with environment variable expansion.
//!
//! Example configuration:
//! ```toml
//! [store]
//! path = "${RESULTS_DIR}/results.json"
//!
//! [naming]
//! template_prefix = "pipeline_"
//! template_suffix = ".captain"
//! no_step_sentinel = "-"
//! id_column = "ID"
//! parent_column = "parent"
//! file_column = "FILE"
//! ```

use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use crate::compile::CompileOptions;
use crate::store::Naming;

/// Error type for settings.
#[derive(Debug, thiserror::Error)]
pub enum SettingsError {
    #[error("Config file not found: {0}")]
    FileNotFound(PathBuf),

    #[error("Failed to read config file: {0}")]
    ReadError(#[from] std::io::Error),

    #[error("Failed to parse config file: {0}")]
    ParseError(#[from] toml::de::Error),

    #[error("Missing environment variable: {0}")]
    MissingEnvVar(String),
}

/// Root configuration structure.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct Settings {
    /// Default result store.
    pub store: StoreSettings,

    /// Naming conventions of the result store.
    pub naming: Naming,
}

/// Result store location.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct StoreSettings {
    /// Path to the store file (supports ${ENV_VAR} expansion).
    pub path: Option<String>,
}

impl Settings {
    /// Load settings from a TOML file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, SettingsError> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(SettingsError::FileNotFound(path.to_path_buf()));
        }

        let content = fs::read_to_string(path)?;
        let settings: Settings = toml::from_str(&content)?;
        tracing::debug!(path = %path.display(), "loaded settings");
        Ok(settings)
    }

    /// Load settings from the default config file locations.
    ///
    /// Searches in order:
    /// 1. Environment variable `CAPTAIN_CONFIG`
    /// 2. `./captain.toml`
    /// 3. `~/.config/captain/config.toml`
    pub fn load() -> Result<Self, SettingsError> {
        if let Ok(path) = env::var("CAPTAIN_CONFIG") {
            return Self::from_file(&path);
        }

        let local_config = PathBuf::from("captain.toml");
        if local_config.exists() {
            return Self::from_file(&local_config);
        }

        if let Some(config_dir) = dirs::config_dir() {
            let user_config = config_dir.join("captain").join("config.toml");
            if user_config.exists() {
                return Self::from_file(&user_config);
            }
        }

        Ok(Settings::default())
    }

    /// The configured store path with environment variables expanded.
    pub fn store_path(&self) -> Result<Option<PathBuf>, SettingsError> {
        self.store
            .path
            .as_deref()
            .map(|path| expand_env_vars(path).map(PathBuf::from))
            .transpose()
    }

    /// Compilation options carrying the configured naming conventions.
    pub fn compile_options(&self) -> CompileOptions {
        CompileOptions::default().with_naming(self.naming.clone())
    }
}

impl From<&Settings> for CompileOptions {
    fn from(settings: &Settings) -> Self {
        settings.compile_options()
    }
}

/// Expand environment variables in a string.
///
/// Supports `${VAR}` and `$VAR` syntax. A lone `$` is kept.
pub fn expand_env_vars(s: &str) -> Result<String, SettingsError> {
    let mut result = String::with_capacity(s.len());
    let mut chars = s.chars().peekable();

    while let Some(c) = chars.next() {
        if c != '$' {
            result.push(c);
            continue;
        }

        let var_name: String = if chars.peek() == Some(&'{') {
            chars.next();
            chars.by_ref().take_while(|&ch| ch != '}').collect()
        } else {
            let mut name = String::new();
            while let Some(ch) = chars.next_if(|ch| ch.is_alphanumeric() || *ch == '_') {
                name.push(ch);
            }
            if name.is_empty() {
                result.push('$');
                continue;
            }
            name
        };

        let value =
            env::var(&var_name).map_err(|_| SettingsError::MissingEnvVar(var_name.clone()))?;
        result.push_str(&value);
    }

    Ok(result)
}
