//! JSON document loading and saving.

use serde::de::DeserializeOwned;
use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};

use crate::error::{DataError, Result};

/// Load and parse a JSON document.
///
/// A missing file is reported as [`DataError::MissingInput`] so callers can
/// tell "never produced" apart from "produced but broken".
pub fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T> {
    if !path.exists() {
        return Err(DataError::MissingInput(path.to_path_buf()));
    }

    let content = fs::read_to_string(path).map_err(|source| DataError::Read {
        path: path.to_path_buf(),
        source,
    })?;

    serde_json::from_str(&content).map_err(|source| DataError::Parse {
        path: path.to_path_buf(),
        source,
    })
}

/// Render a document the way every output file is written: pretty-printed
/// with two-space indentation and non-ASCII text left as-is.
pub fn to_pretty_json<T: Serialize>(value: &T) -> Result<String> {
    Ok(serde_json::to_string_pretty(value)?)
}

/// Write a document, creating parent directories as needed.
pub fn write_json<T: Serialize>(path: &Path, value: &T) -> Result<()> {
    write_text(path, &to_pretty_json(value)?)
}

/// Write already-rendered text, creating parent directories as needed.
pub fn write_text(path: &Path, contents: &str) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(|source| DataError::Write {
            path: parent.to_path_buf(),
            source,
        })?;
    }

    fs::write(path, contents).map_err(|source| DataError::Write {
        path: path.to_path_buf(),
        source,
    })?;

    tracing::debug!("Wrote {}", path.display());
    Ok(())
}

/// Output files rendered up front and written together.
///
/// Rendering every document before touching the disk means a failure while
/// building outputs leaves the output directory as it was.
#[derive(Debug, Default)]
pub struct StagedWrites {
    files: Vec<(PathBuf, String)>,
}

impl StagedWrites {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn stage<T: Serialize>(&mut self, path: PathBuf, value: &T) -> Result<()> {
        let json = to_pretty_json(value)?;
        self.files.push((path, json));
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.files.len()
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    /// Write every staged file, returning the paths in staging order
    pub fn commit(self) -> Result<Vec<PathBuf>> {
        let mut written = Vec::with_capacity(self.files.len());
        for (path, json) in self.files {
            write_text(&path, &json)?;
            written.push(path);
        }
        Ok(written)
    }
}
