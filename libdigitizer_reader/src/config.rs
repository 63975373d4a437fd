use serde::{Deserialize, Serialize};
use std::path::Path;

use super::constants::{DEFAULT_TIMESTAMP_KEY, DEFAULT_TREE_NAME};
use super::error::ConfigError;

/// Structure representing the reader configuration. Contains the data source layout and the
/// policy for sources without any channels.
/// Configs are seralizable and deserializable to YAML using serde and serde_yaml
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReaderConfig {
    /// Name of the group holding the channel and timestamp datasets
    pub tree_name: String,
    pub timestamp_key: String,
    /// If true, a source with no channel<N>_waveforms keys yields an empty event map instead
    /// of an error
    pub allow_empty_source: bool,
}

impl Default for ReaderConfig {
    fn default() -> Self {
        Self {
            tree_name: String::from(DEFAULT_TREE_NAME),
            timestamp_key: String::from(DEFAULT_TIMESTAMP_KEY),
            allow_empty_source: false,
        }
    }
}

impl ReaderConfig {
    /// Read the configuration in a YAML file
    /// Returns a ReaderConfig if successful
    pub fn read_config_file(config_path: &Path) -> Result<Self, ConfigError> {
        if !config_path.exists() {
            return Err(ConfigError::BadFilePath(config_path.to_path_buf()));
        }

        let yaml_str = std::fs::read_to_string(config_path)?;

        Ok(serde_yaml::from_str::<Self>(&yaml_str)?)
    }

    /// Write the configuration to a YAML file, overwriting anything already there
    pub fn write_config_file(&self, config_path: &Path) -> Result<(), ConfigError> {
        let yaml_str = serde_yaml::to_string(self)?;
        std::fs::write(config_path, yaml_str)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_yaml_uses_defaults() {
        let config: ReaderConfig = serde_yaml::from_str("allow_empty_source: true\n").unwrap();
        assert!(config.allow_empty_source);
        assert_eq!(config.tree_name, "tree");
        assert_eq!(config.timestamp_key, "timestamp");
    }

    #[test]
    fn test_missing_config_file() {
        let path = Path::new("/this/path/does/not/exist.yml");
        match ReaderConfig::read_config_file(path) {
            Err(ConfigError::BadFilePath(p)) => assert_eq!(p, path),
            _ => panic!(),
        }
    }

    #[test]
    fn test_config_file_round_trip() {
        let path = std::env::temp_dir().join(format!("reader_config_{}.yml", std::process::id()));
        let config = ReaderConfig {
            tree_name: String::from("acq"),
            timestamp_key: String::from("ts"),
            allow_empty_source: true,
        };
        config.write_config_file(&path).unwrap();
        let loaded = ReaderConfig::read_config_file(&path).unwrap();
        std::fs::remove_file(&path).unwrap();
        assert_eq!(config, loaded);
    }
}
