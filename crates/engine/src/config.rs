//! Session configuration via `keyhold.toml`
//!
//! Every setting has a default, so an empty (or absent) file behaves exactly
//! like [`KeyholdConfig::default`]. Environment-level settings are applied to
//! each environment right after it is created, before any caller
//! configuration, so `set_mapsize` and friends still override them.

use serde::{Deserialize, Serialize};
use std::path::Path;

use keyhold_core::{Error, Result};

/// Config file name looked up in the working directory.
pub const CONFIG_FILE_NAME: &str = "keyhold.toml";

/// Session configuration loaded from `keyhold.toml`.
///
/// # Example
///
/// ```toml
/// file_mode = 0o664
/// legacy_fixedmap = false
/// map_size = 10485760
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeyholdConfig {
    /// Permission bits for files created by environment open.
    #[serde(default = "default_file_mode")]
    pub file_mode: u32,
    /// Start environment open with the fixed-map flag set.
    #[serde(default)]
    pub legacy_fixedmap: bool,
    /// Map size applied after environment create.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub map_size: Option<u64>,
    /// Reader slot limit applied after environment create.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_readers: Option<u32>,
    /// Named database limit applied after environment create.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_dbs: Option<u32>,
}

fn default_file_mode() -> u32 {
    0o664
}

impl Default for KeyholdConfig {
    fn default() -> Self {
        Self {
            file_mode: default_file_mode(),
            legacy_fixedmap: false,
            map_size: None,
            max_readers: None,
            max_dbs: None,
        }
    }
}

impl KeyholdConfig {
    /// Returns the default config file content with comments.
    pub fn default_toml() -> &'static str {
        r#"# keyhold configuration
#
# Permission bits for files created when an environment is opened.
file_mode = 0o664

# Open environments with the fixed-map flag unless -fixedmap says otherwise.
legacy_fixedmap = false

# Applied to every environment right after creation; the set_mapsize,
# set_maxreaders and set_maxdbs subcommands still override these.
# map_size = 10485760
# max_readers = 126
# max_dbs = 16
"#
    }

    /// Read and parse config from a file path.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            Error::config(format!(
                "Failed to read config file '{}': {}",
                path.display(),
                e
            ))
        })?;
        let config: KeyholdConfig = toml::from_str(&content).map_err(|e| {
            Error::config(format!(
                "Failed to parse config file '{}': {}",
                path.display(),
                e
            ))
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Reject settings the engine would refuse later anyway.
    pub fn validate(&self) -> Result<()> {
        if self.file_mode > 0o7777 {
            return Err(Error::config(format!(
                "file_mode {:o} is not a permission mask",
                self.file_mode
            )));
        }
        if let Some(size) = self.map_size {
            if usize::try_from(size).is_err() {
                return Err(Error::config(format!(
                    "map_size {} does not fit in the address space",
                    size
                )));
            }
        }
        Ok(())
    }

    /// Write the default config file if it does not already exist.
    pub fn write_default_if_missing(path: &Path) -> Result<()> {
        if !path.exists() {
            std::fs::write(path, Self::default_toml()).map_err(|e| {
                Error::config(format!(
                    "Failed to write default config file '{}': {}",
                    path.display(),
                    e
                ))
            })?;
        }
        Ok(())
    }

    /// Serialize this config to TOML and write it to the given path.
    pub fn write_to_file(&self, path: &Path) -> Result<()> {
        let content = toml::to_string_pretty(self)
            .map_err(|e| Error::config(format!("Failed to serialize config: {}", e)))?;
        std::fs::write(path, content).map_err(|e| {
            Error::config(format!(
                "Failed to write config file '{}': {}",
                path.display(),
                e
            ))
        })
    }
}
