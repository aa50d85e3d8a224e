//! File-backed persistence for credentials, structure snapshots, and alert
//! state.
//!
//! Each store owns its on-disk representation exclusively and partitions
//! documents per tenant, so concurrent writers to different tenants touch
//! disjoint files. Writes go to a temp file followed by an atomic rename so
//! a reader (or a crash) never observes a partially written document.

pub mod alert;
pub mod channel;
pub mod credential;
pub mod structure;

use std::fs;
use std::path::Path;

use serde::{de::DeserializeOwned, Serialize};

use crate::error::store::StoreError;

/// Reads a JSON document, returning `None` when the file does not exist.
pub(crate) fn read_document<T: DeserializeOwned>(path: &Path) -> Result<Option<T>, StoreError> {
    let raw = match fs::read_to_string(path) {
        Ok(raw) => raw,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
        Err(e) => {
            return Err(StoreError::Read {
                path: path.to_path_buf(),
                source: e,
            })
        }
    };

    serde_json::from_str(&raw)
        .map(Some)
        .map_err(|e| StoreError::Decode {
            path: path.to_path_buf(),
            source: e,
        })
}

/// Writes a JSON document atomically (temp file + rename).
pub(crate) fn write_document<T: Serialize>(path: &Path, value: &T) -> Result<(), StoreError> {
    let encoded = serde_json::to_string_pretty(value).map_err(|e| StoreError::Encode {
        path: path.to_path_buf(),
        source: e,
    })?;

    let mut tmp = path.as_os_str().to_owned();
    tmp.push(".tmp");
    let tmp = Path::new(&tmp);

    fs::write(tmp, encoded).map_err(|e| StoreError::Write {
        path: tmp.to_path_buf(),
        source: e,
    })?;
    fs::rename(tmp, path).map_err(|e| StoreError::Write {
        path: path.to_path_buf(),
        source: e,
    })
}

/// Deletes a document, treating a missing file as already removed.
pub(crate) fn remove_document(path: &Path) -> Result<(), StoreError> {
    match fs::remove_file(path) {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
        Err(e) => Err(StoreError::Write {
            path: path.to_path_buf(),
            source: e,
        }),
    }
}

pub(crate) fn ensure_dir(dir: &Path) -> Result<(), StoreError> {
    fs::create_dir_all(dir).map_err(|e| StoreError::Write {
        path: dir.to_path_buf(),
        source: e,
    })
}
