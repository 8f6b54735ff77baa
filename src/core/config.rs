//! JSON configuration files

use std::path::Path;

use serde::Serialize;
use serde::de::DeserializeOwned;

use super::types::Result;

/// Load a configuration struct from a JSON file
pub fn load_json<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let json = std::fs::read_to_string(path)?;
    Ok(serde_json::from_str(&json)?)
}

/// Save a configuration struct as pretty-printed JSON, creating parent directories
pub fn save_json<T: Serialize>(path: &Path, value: &T) -> Result<()> {
    let json = serde_json::to_string_pretty(value)?;

    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    std::fs::write(path, json)?;
    Ok(())
}
