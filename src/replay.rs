//! Replay store.
//! Persists an assembled context, one JSON file per template name, so a
//! later run can skip prompting entirely.

use crate::error::{Error, Result};
use log::debug;
use serde_json::Value;
use std::path::{Path, PathBuf};

/// Path of the replay file for a template name.
///
/// Only the last path segment of the template name is used, with a `.json`
/// suffix appended when missing.
pub fn get_file_name(replay_dir: &Path, template_name: &str) -> PathBuf {
    let base = template_name.rsplit('/').next().unwrap_or(template_name);
    let file_name = if base.ends_with(".json") {
        base.to_string()
    } else {
        format!("{}.json", base)
    };
    replay_dir.join(file_name)
}

/// Writes the context as pretty-printed JSON, overwriting the whole file.
///
/// # Errors
/// * `Error::ReplayError` when the context is empty
/// * `Error::IoError` when the replay directory cannot be created or written
pub fn dump(replay_dir: &Path, template_name: &str, context: &Value) -> Result<()> {
    if !context.as_object().is_some_and(|map| !map.is_empty()) {
        return Err(Error::ReplayError(
            "context is required to not be empty".to_string(),
        ));
    }

    std::fs::create_dir_all(replay_dir)?;
    let replay_file = get_file_name(replay_dir, template_name);
    debug!("Dumping replay file {}", replay_file.display());

    let pretty = serde_json::to_string_pretty(context)
        .map_err(|e| Error::ReplayError(e.to_string()))?;
    std::fs::write(replay_file, pretty)?;
    Ok(())
}

/// Reads a dumped context back from an explicit file path.
///
/// # Errors
/// * `Error::IoError` when the file does not exist
/// * `Error::ReplayError` when the file is empty or not valid JSON
pub fn load_file(replay_file: &Path) -> Result<Value> {
    debug!("Loading replay file {}", replay_file.display());

    let content = std::fs::read_to_string(replay_file)?;
    let context: Value = serde_json::from_str(&content).map_err(|e| {
        Error::ReplayError(format!(
            "invalid replay file {}: {}",
            replay_file.display(),
            e
        ))
    })?;

    if !context.as_object().is_some_and(|map| !map.is_empty()) {
        return Err(Error::ReplayError(
            "context is required to not be empty".to_string(),
        ));
    }
    Ok(context)
}

/// Reads a previously dumped context back by template name.
pub fn load(replay_dir: &Path, template_name: &str) -> Result<Value> {
    load_file(&get_file_name(replay_dir, template_name))
}
