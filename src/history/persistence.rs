//! History persistence — YAML load/save for the undo history.

use std::io;
use std::path::Path;

use super::UndoHistory;

/// Load an undo history from a YAML file, trimmed to `depth`.
/// Returns an empty history if the file doesn't exist.
pub fn load_history(path: &Path, depth: usize) -> Result<UndoHistory, io::Error> {
    if !path.exists() {
        return Ok(UndoHistory::with_depth(depth));
    }
    let content = std::fs::read_to_string(path)?;
    let mut history: UndoHistory = serde_yaml::from_str(&content)
        .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;
    history.set_depth(depth);
    Ok(history)
}

/// Save an undo history to a YAML file, creating parent directories as needed.
pub fn save_history(path: &Path, history: &UndoHistory) -> Result<(), io::Error> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let yaml = serde_yaml::to_string(history).map_err(io::Error::other)?;
    std::fs::write(path, yaml)
}

/// Remove a saved history, returning a fresh one.
pub fn reset_history(path: &Path, depth: usize) -> Result<UndoHistory, io::Error> {
    if path.exists() {
        std::fs::remove_file(path)?;
    }
    Ok(UndoHistory::with_depth(depth))
}
