use std::fs;
use std::path::{Path, PathBuf};

use serde::{de::DeserializeOwned, Serialize};
use thiserror::Error;

/// Writes `value` as pretty-printed UTF-8 JSON, creating parent directories.
pub fn write_pretty_json<T: Serialize + ?Sized>(path: &Path, value: &T) -> Result<(), JsonFileError> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(|source| JsonFileError::Io {
            path: parent.to_path_buf(),
            source,
        })?;
    }

    let body = serde_json::to_string_pretty(value)
        .map_err(|source| JsonFileError::Serialize { source })?;

    fs::write(path, body).map_err(|source| JsonFileError::Io {
        path: path.to_path_buf(),
        source,
    })
}

pub fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T, JsonFileError> {
    let body = fs::read_to_string(path).map_err(|source| JsonFileError::Io {
        path: path.to_path_buf(),
        source,
    })?;

    serde_json::from_str(&body).map_err(|source| JsonFileError::Deserialize {
        path: path.to_path_buf(),
        source,
    })
}

#[derive(Debug, Error)]
pub enum JsonFileError {
    #[error("Io({}): {source}", .path.display())]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Serialize: {source}")]
    Serialize {
        source: serde_json::Error,
    },

    #[error("Deserialize({}): {source}", .path.display())]
    Deserialize {
        path: PathBuf,
        source: serde_json::Error,
    },
}
