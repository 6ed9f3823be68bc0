//! Configuration — loads optional ~/.gridpilot/config.yaml.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::history::DEFAULT_UNDO_DEPTH;

/// Settings loaded from ~/.gridpilot/config.yaml.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct Config {
    /// Number of executed batches that can be undone.
    #[serde(default = "default_undo_depth")]
    pub undo_depth: usize,
    /// Snapshot COPY targets of at most this many used cells so COPY can
    /// be undone. `None` records no inverse for COPY.
    #[serde(default)]
    pub copy_snapshot_limit: Option<usize>,
}

fn default_undo_depth() -> usize {
    DEFAULT_UNDO_DEPTH
}

impl Default for Config {
    fn default() -> Self {
        Self {
            undo_depth: DEFAULT_UNDO_DEPTH,
            copy_snapshot_limit: None,
        }
    }
}

/// The ~/.gridpilot directory holding config, workbook and history.
/// Falls back to `./.gridpilot` when there is no home directory.
pub fn data_dir() -> PathBuf {
    let mut path = dirs::home_dir().unwrap_or_else(|| PathBuf::from("."));
    path.push(".gridpilot");
    path
}

/// Get the config file path.
pub fn config_path() -> PathBuf {
    data_dir().join("config.yaml")
}

/// Load configuration from ~/.gridpilot/config.yaml.
/// Returns None if the file doesn't exist or can't be parsed.
pub fn load_config() -> Option<Config> {
    load_config_from(&config_path())
}

/// Load configuration from an explicit path.
pub fn load_config_from(path: &Path) -> Option<Config> {
    let content = std::fs::read_to_string(path).ok()?;
    serde_yaml::from_str(&content).ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config() {
        let config = Config::default();
        assert_eq!(config.undo_depth, 20);
        assert!(config.copy_snapshot_limit.is_none());
    }

    #[test]
    fn config_lives_in_data_dir() {
        let path = config_path();
        assert_eq!(path.parent(), Some(data_dir().as_path()));
        assert!(data_dir().ends_with(".gridpilot"));
    }

    #[test]
    fn missing_config_returns_none() {
        let dir = tempfile::tempdir().unwrap();
        assert!(load_config_from(&dir.path().join("config.yaml")).is_none());
    }

    #[test]
    fn parse_yaml_config() {
        let yaml = "undo_depth: 5\ncopy_snapshot_limit: 200\n";
        let config: Config = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(config.undo_depth, 5);
        assert_eq!(config.copy_snapshot_limit, Some(200));
    }

    #[test]
    fn partial_yaml_config() {
        let config: Config = serde_yaml::from_str("copy_snapshot_limit: 10\n").unwrap();
        assert_eq!(config.undo_depth, 20);
        assert_eq!(config.copy_snapshot_limit, Some(10));
    }

    #[test]
    fn load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.yaml");
        std::fs::write(&path, "undo_depth: 3\n").unwrap();
        assert_eq!(load_config_from(&path).unwrap().undo_depth, 3);
    }
}
