//! Configuration module for Captain.
//!
//! Handles the config file, environment variables, and naming settings.

mod settings;

pub use settings::{expand_env_vars, Settings, SettingsError, StoreSettings};
