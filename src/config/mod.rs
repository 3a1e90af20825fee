use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{Result, ScanError};

/// Environment variable consulted for the config path when `--config` is absent.
pub const CONFIG_ENV: &str = "SCANWARD_CONFIG";

/// Default config file name, looked up in the working directory.
pub const DEFAULT_CONFIG_FILE: &str = "scanward.toml";

/// Recognised configuration keys.
pub mod keys {
    pub const SCAN_DIR: &str = "scan_dir";
    pub const PROFILE: &str = "profile";
    pub const DICTIONARY: &str = "dictionary";
    pub const DATASTREAM: &str = "datastream";
    pub const OSCAP: &str = "oscap";
    pub const FIX_SHELL: &str = "fix_shell";
    pub const DEFINITIONS_DIR: &str = "definitions_dir";
}

/// Flat key/value configuration from `scanward.toml`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Config {
    values: BTreeMap<String, String>,
}

impl Config {
    /// Load config from a TOML file. Returns an empty config if the file
    /// doesn't exist; required keys then surface as `ConfigMissing`.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            tracing::debug!(path = %path.display(), "config file not found, using empty config");
            return Ok(Self::default());
        }
        let content = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)?;
        Ok(config)
    }

    pub fn from_pairs<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        Self {
            values: pairs
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }

    /// Look up a key. Blank values count as missing.
    pub fn get(&self, key: &str) -> Result<&str> {
        self.get_opt(key)
            .ok_or_else(|| ScanError::ConfigMissing(key.to_string()))
    }

    pub fn get_opt(&self, key: &str) -> Option<&str> {
        self.values
            .get(key)
            .map(|v| v.trim())
            .filter(|v| !v.is_empty())
    }

    pub fn get_or<'a>(&'a self, key: &str, default: &'a str) -> &'a str {
        self.get_opt(key).unwrap_or(default)
    }

    pub fn scan_dir(&self) -> Result<PathBuf> {
        self.get(keys::SCAN_DIR).map(PathBuf::from)
    }

    pub fn oscap(&self) -> &str {
        self.get_or(keys::OSCAP, "oscap")
    }

    pub fn fix_shell(&self) -> &str {
        self.get_or(keys::FIX_SHELL, "bash")
    }

    /// Directory holding the check definition files referenced by result
    /// documents. Falls back to the datastream's directory.
    pub fn definitions_dir(&self) -> Option<PathBuf> {
        if let Some(dir) = self.get_opt(keys::DEFINITIONS_DIR) {
            return Some(PathBuf::from(dir));
        }
        self.get_opt(keys::DATASTREAM)
            .and_then(|ds| Path::new(ds).parent().map(Path::to_path_buf))
    }

    /// Generate a starter config file.
    pub fn starter_toml() -> &'static str {
        r#"# scanward configuration

# Where suffixed artifacts and their aliases are written.
scan_dir = "/var/lib/scanward"

# Profile evaluated when `scanward scan` is called without one.
profile = "xccdf_org.ssgproject.content_profile_standard"

# CPE dictionary and SCAP datastream handed to the engine.
dictionary = "/usr/share/xml/scap/ssg/content/ssg-rhel9-cpe-dictionary.xml"
datastream = "/usr/share/xml/scap/ssg/content/ssg-rhel9-ds.xml"

# Optional overrides.
# oscap = "/usr/bin/oscap"
# fix_shell = "bash"
# definitions_dir = "/usr/share/xml/scap/ssg/content"
"#
    }
}

/// Pick the config path: explicit flag, then environment, then the default
/// file in the working directory.
pub fn resolve_path(explicit: Option<PathBuf>) -> PathBuf {
    explicit
        .or_else(|| std::env::var_os(CONFIG_ENV).map(PathBuf::from))
        .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_FILE))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_file_yields_empty_config() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::load(&dir.path().join("absent.toml")).unwrap();
        assert!(matches!(
            config.scan_dir(),
            Err(ScanError::ConfigMissing(key)) if key == keys::SCAN_DIR
        ));
    }

    #[test]
    fn starter_config_parses() {
        let config: Config = toml::from_str(Config::starter_toml()).unwrap();
        assert_eq!(config.get(keys::SCAN_DIR).unwrap(), "/var/lib/scanward");
        assert_eq!(config.oscap(), "oscap");
        assert_eq!(config.fix_shell(), "bash");
    }

    #[test]
    fn blank_value_counts_as_missing() {
        let config = Config::from_pairs([(keys::PROFILE, "   ")]);
        assert!(config.get(keys::PROFILE).is_err());
    }

    #[test]
    fn definitions_dir_defaults_to_datastream_parent() {
        let config = Config::from_pairs([(keys::DATASTREAM, "/opt/content/ds.xml")]);
        assert_eq!(
            config.definitions_dir(),
            Some(PathBuf::from("/opt/content"))
        );

        let config = Config::from_pairs([
            (keys::DATASTREAM, "/opt/content/ds.xml"),
            (keys::DEFINITIONS_DIR, "/srv/oval"),
        ]);
        assert_eq!(config.definitions_dir(), Some(PathBuf::from("/srv/oval")));
    }
}
