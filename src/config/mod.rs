//! Configuration module for Reportsmith.
//!
//! Handles the TOML settings file and environment variable expansion.

mod settings;

pub use settings::{
    expand_env_vars, LogFormat, LoggingSettings, NormalizerSettings, Settings, SettingsError,
    StoreBackend, StoreSettings, ValidationSettings,
};
