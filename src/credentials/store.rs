//! Token persistence between runs.

use livestream_common::{Error, Result};
use std::io::Write;
use std::path::{Path, PathBuf};

use super::Credential;

/// JSON file holding the credential of the last run.
#[derive(Debug, Clone)]
pub struct TokenStore {
    path: PathBuf,
}

impl TokenStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load the stored credential; `None` when nothing was stored yet.
    pub fn load(&self) -> Result<Option<Credential>> {
        let content = match std::fs::read(&self.path) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };
        Ok(Some(serde_json::from_slice(&content)?))
    }

    /// Replace the stored credential.
    ///
    /// Writes to a temporary file next to the store and renames it over the
    /// old one, so readers never see a partial file.
    pub fn save(&self, credential: &Credential) -> Result<()> {
        let dir = match self.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };

        let mut file = tempfile::NamedTempFile::new_in(dir)?;
        serde_json::to_writer_pretty(&mut file, credential)?;
        file.write_all(b"\n")?;
        file.as_file().sync_all()?;
        file.persist(&self.path).map_err(|e| Error::from(e.error))?;
        Ok(())
    }
}
