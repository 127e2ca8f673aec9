//! File persistence for the credential store.

use anyhow::{Context, Result};
use getrandom::fill;
use std::fs::{self, File, OpenOptions};
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};

use crate::store::CredentialStore;

/// JSON credential file on disk.
#[derive(Clone, Debug)]
pub struct Storage {
    path: PathBuf,
}

impl Storage {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn exists(&self) -> bool {
        self.path.exists()
    }

    /// Reads the store, or returns an empty one if the file does not exist
    /// yet.
    pub fn load(&self) -> Result<CredentialStore> {
        let data = match fs::read(&self.path) {
            Ok(data) => data,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                tracing::debug!(path = %self.path.display(), "no credential file yet");
                return Ok(CredentialStore::new());
            }
            Err(e) => {
                return Err(e).with_context(|| {
                    format!("failed to read credential file {}", self.path.display())
                });
            }
        };

        serde_json::from_slice(&data).with_context(|| {
            format!("credential file {} is corrupted", self.path.display())
        })
    }

    /// Writes the store atomically.
    ///
    /// Data goes to a fresh temporary file next to the target, is synced, then
    /// renamed over the target; the parent directory is synced afterwards. A
    /// crash leaves either the old or the new file, never a partial one.
    pub fn save(&self, store: &CredentialStore) -> Result<()> {
        let data = serde_json::to_vec_pretty(store)?;

        if let Some(parent) = self.parent_dir() {
            fs::create_dir_all(parent)?;
        }

        let tmp_path = self.random_tmp_path()?;
        if let Err(e) = self.write_and_replace(&tmp_path, &data) {
            let _ = fs::remove_file(&tmp_path);
            return Err(e);
        }

        #[cfg(unix)]
        if let Some(parent) = self.parent_dir() {
            File::open(parent)?.sync_all()?;
        }

        tracing::debug!(path = %self.path.display(), users = store.len(), "saved credential file");
        Ok(())
    }

    fn write_and_replace(&self, tmp_path: &Path, data: &[u8]) -> Result<()> {
        let mut tmp_file = OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(tmp_path)
            .context("failed to create temporary file")?;
        tmp_file.write_all(data)?;
        tmp_file.sync_all()?;
        drop(tmp_file);

        // std's rename replaces an existing target on every platform
        fs::rename(tmp_path, &self.path).context("failed to replace credential file")
    }

    fn parent_dir(&self) -> Option<&Path> {
        self.path.parent().filter(|p| !p.as_os_str().is_empty())
    }

    /// `<file name>.tmp.<16 hex chars>` in the target's directory.
    fn random_tmp_path(&self) -> Result<PathBuf> {
        let mut buf = [0u8; 8];
        fill(&mut buf).map_err(|e| anyhow::anyhow!("OS random generator unavailable: {e}"))?;
        let suffix: String = buf.iter().map(|b| format!("{b:02x}")).collect();

        let file_name = self
            .path
            .file_name()
            .context("credential path has no file name")?
            .to_string_lossy();

        Ok(self.path.with_file_name(format!("{file_name}.tmp.{suffix}")))
    }
}
