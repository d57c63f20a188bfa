//! Configuration loading.
//!
//! DevGate reads an optional TOML file at `~/.config/devgate/config.toml`
//! supplying defaults for the global CLI flags. Command-line flags always
//! override configuration values, and a missing file simply yields the
//! built-in defaults. The file is read once per invocation and never
//! written by the CLI.
//!
//! ```toml
//! [defaults]
//! transport = "usb"
//! path = ""
//! format = "text"
//! node = "localhost:8545"
//! catalog_url = "https://releases.devgate.dev/firmware"
//! ```

use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::error::ConfigError;

/// Relative location of the config file under the home directory.
const CONFIG_RELATIVE_PATH: &str = ".config/devgate/config.toml";

/// Top-level configuration document.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    /// Default values for global CLI flags.
    #[serde(default)]
    pub defaults: Defaults,
}

/// Defaults for the global CLI flags.
///
/// Every field is optional; `None` falls through to the built-in default
/// for that flag.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Defaults {
    /// Default transport kind (`usb`, `udp`, `pipe`, or `bridge`).
    pub transport: Option<String>,
    /// Default transport path (device address, socket path, ...).
    pub path: Option<String>,
    /// Default output format (`text` or `json`).
    pub format: Option<String>,
    /// Default Ethereum node address as `host:port`.
    pub node: Option<String>,
    /// Default firmware release catalog URL.
    pub catalog_url: Option<String>,
}

impl Config {
    /// Load the configuration from the default location.
    ///
    /// A missing file (or an unset home directory) yields the default
    /// configuration.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if the file exists but cannot be read or
    /// parsed.
    pub fn load() -> Result<Self, ConfigError> {
        match default_path() {
            Some(path) if path.exists() => Self::load_from(&path),
            _ => Ok(Self::default()),
        }
    }

    /// Load the configuration from an explicit path.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Read`] if the file cannot be read and
    /// [`ConfigError::Parse`] if it is not valid TOML.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        let raw = std::fs::read_to_string(path).map_err(|e| ConfigError::Read {
            path: path.display().to_string(),
            message: e.to_string(),
        })?;
        toml::from_str(&raw).map_err(|e| ConfigError::Parse {
            path: path.display().to_string(),
            message: e.to_string(),
        })
    }
}

/// Path of the config file under the user's home directory, if known.
fn default_path() -> Option<PathBuf> {
    std::env::var_os("HOME").map(|home| PathBuf::from(home).join(CONFIG_RELATIVE_PATH))
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;

    #[test]
    fn test_load_from_full_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        let mut file = std::fs::File::create(&path).unwrap();
        writeln!(
            file,
            "[defaults]\ntransport = \"udp\"\nnode = \"10.0.0.1:8545\""
        )
        .unwrap();

        let config = Config::load_from(&path).unwrap();
        assert_eq!(config.defaults.transport.as_deref(), Some("udp"));
        assert_eq!(config.defaults.node.as_deref(), Some("10.0.0.1:8545"));
        assert!(config.defaults.format.is_none());
    }

    #[test]
    fn test_load_from_empty_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::File::create(&path).unwrap();

        let config = Config::load_from(&path).unwrap();
        assert!(config.defaults.transport.is_none());
    }

    #[test]
    fn test_load_from_invalid_toml() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "defaults = nonsense[").unwrap();

        let err = Config::load_from(&path).unwrap_err();
        assert!(matches!(err, ConfigError::Parse { .. }));
    }

    #[test]
    fn test_load_from_unknown_key_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[defaults]\nspeed = \"fast\"").unwrap();

        let err = Config::load_from(&path).unwrap_err();
        assert!(matches!(err, ConfigError::Parse { .. }));
    }
}
