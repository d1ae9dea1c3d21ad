//! Configuration for the Gradebook server.
//!
//! Settings are read from an optional `gradebook.json` and may be overridden
//! from the command line. Every field has a default, so running without a
//! config file serves on port 4000 with `students.json` as the data file.

use std::net::{IpAddr, SocketAddr};
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{GradebookError, Result};

/// The default config file name.
pub const CONFIG_FILE_NAME: &str = "gradebook.json";

/// Default address the HTTP server listens on.
fn default_host() -> String {
    "0.0.0.0".to_string()
}

/// Default port for the HTTP server.
const fn default_port() -> u16 {
    4000
}

/// Default path of the JSON file holding every student record.
fn default_data_file() -> String {
    "students.json".to_string()
}

/// Main configuration for the Gradebook server.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Config {
    /// IP address to bind the HTTP listener to.
    #[serde(default = "default_host")]
    pub host: String,

    /// TCP port to bind the HTTP listener to.
    #[serde(default = "default_port")]
    pub port: u16,

    /// Path of the student data file.
    #[serde(default = "default_data_file")]
    pub data_file: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            data_file: default_data_file(),
        }
    }
}

impl Config {
    /// Loads configuration from the current working directory.
    ///
    /// Looks for `gradebook.json` in the current directory, falling back to
    /// the defaults when it does not exist.
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but contains invalid JSON.
    pub fn load() -> Result<Self> {
        let current_dir = std::env::current_dir().map_err(|e| {
            GradebookError::config_parse(
                "<current directory>",
                format!("cannot determine current directory: {e}"),
            )
        })?;
        Self::load_from_dir(&current_dir)
    }

    /// Loads configuration from `gradebook.json` in a specific directory.
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but contains invalid JSON.
    pub fn load_from_dir(dir: &Path) -> Result<Self> {
        Self::load_from_file(&dir.join(CONFIG_FILE_NAME))
    }

    /// Loads configuration from a specific file path.
    ///
    /// If the file does not exist, returns default configuration.
    ///
    /// # Errors
    ///
    /// Returns `GradebookError::ConfigParseError` if the file cannot be read
    /// or contains invalid JSON, and `GradebookError::ConfigValidationError`
    /// if the parsed values are invalid.
    pub fn load_from_file(path: &Path) -> Result<Self> {
        let contents = match std::fs::read_to_string(path) {
            Ok(contents) => contents,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                let config = Self::default();
                config.validate()?;
                return Ok(config);
            }
            Err(e) => {
                return Err(GradebookError::config_parse(
                    path,
                    format!("failed to read file: {e}"),
                ));
            }
        };

        let config: Self = serde_json::from_str(&contents)
            .map_err(|e| GradebookError::config_parse(path, e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Validates the configuration values.
    ///
    /// - `host` must be a valid IP address
    /// - `port` must be greater than 0
    /// - `data_file` must not be empty
    ///
    /// # Errors
    ///
    /// Returns `GradebookError::ConfigValidationError` if any check fails.
    pub fn validate(&self) -> Result<()> {
        if self.host.trim().parse::<IpAddr>().is_err() {
            return Err(GradebookError::config_validation(
                format!("host '{}' is not a valid IP address", self.host),
                "Use an address such as 0.0.0.0 or 127.0.0.1 in your gradebook.json",
            ));
        }

        if self.port == 0 {
            return Err(GradebookError::config_validation(
                "port must be greater than 0",
                "Set port to a free TCP port in your gradebook.json (default 4000)",
            ));
        }

        if self.data_file.trim().is_empty() {
            return Err(GradebookError::config_validation(
                "dataFile must not be empty",
                "Provide a path for the student data file in your gradebook.json",
            ));
        }

        Ok(())
    }

    /// Returns the socket address the server should bind to.
    ///
    /// # Errors
    ///
    /// Returns `GradebookError::ConfigValidationError` if `host` is not an IP address.
    pub fn socket_addr(&self) -> Result<SocketAddr> {
        let ip: IpAddr = self.host.trim().parse().map_err(|_| {
            GradebookError::config_validation(
                format!("host '{}' is not a valid IP address", self.host),
                "Use an address such as 0.0.0.0 or 127.0.0.1",
            )
        })?;
        Ok(SocketAddr::new(ip, self.port))
    }

    /// Returns the data file location as a path.
    #[must_use]
    pub fn data_path(&self) -> PathBuf {
        PathBuf::from(&self.data_file)
    }
}
