//! Store configuration.

use crate::error::{CoreError, CoreResult};
use nskv_storage::BackendOptions;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Environment variable overriding [`Config::path`].
pub const PATH_ENV: &str = "NSKV_PATH";

/// Configuration for a [`crate::Store`].
///
/// Populated once at startup, either through the builder methods or from a
/// TOML file:
///
/// ```toml
/// path = "/var/lib/nskv"
/// create_if_missing = true
/// sync_on_write = false
/// set_lock_stripes = 64
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Store directory used by [`crate::Store::open`].
    pub path: Option<PathBuf>,

    /// Whether to create the directory if it doesn't exist.
    pub create_if_missing: bool,

    /// Whether to sync the data log after every write.
    pub sync_on_write: bool,

    /// Number of lock stripes serializing set mutations.
    pub set_lock_stripes: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            path: None,
            create_if_missing: true,
            sync_on_write: false,
            set_lock_stripes: 64,
        }
    }
}

impl Config {
    /// Creates a new configuration with default values.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Parses a configuration from TOML text.
    ///
    /// Missing fields take their default values.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::Config`] if the text is not valid TOML for this
    /// structure or fails [`Config::validate`].
    pub fn from_toml_str(text: &str) -> CoreResult<Self> {
        let config: Self = toml::from_str(text).map_err(|e| CoreError::config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Loads a configuration from a TOML file.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::Config`] if the file cannot be read, plus the
    /// errors of [`Config::from_toml_str`].
    pub fn from_toml_file(path: &Path) -> CoreResult<Self> {
        let text = std::fs::read_to_string(path).map_err(|e| {
            CoreError::config(format!("cannot read {}: {e}", path.display()))
        })?;
        Self::from_toml_str(&text)
    }

    /// Applies overrides from the process environment.
    ///
    /// Currently only [`PATH_ENV`] is recognized.
    #[must_use]
    pub fn apply_env(mut self) -> Self {
        if let Some(path) = std::env::var_os(PATH_ENV) {
            if !path.is_empty() {
                self.path = Some(PathBuf::from(path));
            }
        }
        self
    }

    /// Sets the store directory.
    #[must_use]
    pub fn path(mut self, path: impl Into<PathBuf>) -> Self {
        self.path = Some(path.into());
        self
    }

    /// Sets whether to create the directory if missing.
    #[must_use]
    pub const fn create_if_missing(mut self, value: bool) -> Self {
        self.create_if_missing = value;
        self
    }

    /// Sets whether to sync after every write.
    #[must_use]
    pub const fn sync_on_write(mut self, value: bool) -> Self {
        self.sync_on_write = value;
        self
    }

    /// Sets the number of set lock stripes.
    #[must_use]
    pub const fn set_lock_stripes(mut self, stripes: usize) -> Self {
        self.set_lock_stripes = stripes;
        self
    }

    /// Checks the configuration for unusable values.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::Config`] if `set_lock_stripes` is zero.
    pub fn validate(&self) -> CoreResult<()> {
        if self.set_lock_stripes == 0 {
            return Err(CoreError::config("set_lock_stripes must be at least 1"));
        }
        Ok(())
    }

    /// Backend options derived from this configuration.
    #[must_use]
    pub fn backend_options(&self) -> BackendOptions {
        BackendOptions::default()
            .create_if_missing(self.create_if_missing)
            .sync_on_write(self.sync_on_write)
    }
}
