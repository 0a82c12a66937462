//! File Tree Adapter: the SDE working directory, its staging sibling,
//! and the `.sde-hash` fingerprint file.

use crate::error::SdeError;
use std::path::{Path, PathBuf};

const FINGERPRINT_FILENAME: &str = ".sde-hash";

/// Owns the SDE data directory and its staging sibling. All file
/// operations here are whole-file: read whole, write whole (truncate),
/// list, remove — no random access is needed.
#[derive(Debug, Clone)]
pub struct DataDir {
    data_dir: PathBuf,
    temp_dir: PathBuf,
}

impl DataDir {
    pub fn new(data_dir: impl Into<PathBuf>, temp_dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: data_dir.into(),
            temp_dir: temp_dir.into(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.data_dir
    }

    pub fn temp_path(&self) -> &Path {
        &self.temp_dir
    }

    /// Load the persisted fingerprint. Absence is equivalent to "no known
    /// version": returns an empty string, not an error.
    pub async fn read_fingerprint(&self) -> Result<String, SdeError> {
        let path = self.data_dir.join(FINGERPRINT_FILENAME);
        match tokio::fs::read_to_string(&path).await {
            Ok(contents) => Ok(contents.trim_end().to_string()),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(String::new()),
            Err(err) => Err(SdeError::Io(err)),
        }
    }

    /// Persist the fingerprint without a trailing newline.
    pub async fn write_fingerprint(&self, digest: &str) -> Result<(), SdeError> {
        tokio::fs::create_dir_all(&self.data_dir).await?;
        let path = self.data_dir.join(FINGERPRINT_FILENAME);
        tokio::fs::write(path, digest).await?;
        Ok(())
    }

    /// Remove and recreate the staging tree.
    pub async fn reset_staging(&self) -> Result<(), SdeError> {
        if tokio::fs::try_exists(&self.temp_dir).await? {
            tokio::fs::remove_dir_all(&self.temp_dir).await?;
        }
        tokio::fs::create_dir_all(&self.temp_dir).await?;
        Ok(())
    }

    pub async fn read_whole(&self, basename: &str) -> Result<String, SdeError> {
        let path = self.data_dir.join(basename);
        Ok(tokio::fs::read_to_string(path).await?)
    }

    pub async fn write_whole(&self, basename: &str, contents: &str) -> Result<(), SdeError> {
        tokio::fs::create_dir_all(&self.data_dir).await?;
        let path = self.data_dir.join(basename);
        tokio::fs::write(path, contents).await?;
        Ok(())
    }

    pub async fn list(&self) -> Result<Vec<String>, SdeError> {
        let mut names = Vec::new();
        let mut entries = tokio::fs::read_dir(&self.data_dir).await?;
        while let Some(entry) = entries.next_entry().await? {
            if entry.file_type().await?.is_file() {
                if let Some(name) = entry.file_name().to_str() {
                    names.push(name.to_string());
                }
            }
        }
        Ok(names)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn missing_fingerprint_reads_as_empty_string() {
        let dir = tempfile::tempdir().unwrap();
        let data_dir = DataDir::new(dir.path().join("data"), dir.path().join("tmp"));
        assert_eq!(data_dir.read_fingerprint().await.unwrap(), "");
    }

    #[tokio::test]
    async fn write_then_read_fingerprint_roundtrips_without_trailing_newline() {
        let dir = tempfile::tempdir().unwrap();
        let data_dir = DataDir::new(dir.path().join("data"), dir.path().join("tmp"));
        data_dir.write_fingerprint("abc123").await.unwrap();

        let raw = tokio::fs::read(dir.path().join("data").join(".sde-hash"))
            .await
            .unwrap();
        assert_eq!(raw, b"abc123");
        assert_eq!(data_dir.read_fingerprint().await.unwrap(), "abc123");
    }

    #[tokio::test]
    async fn reset_staging_is_idempotent() {
        let dir = tempfile::tempdir().unwrap();
        let data_dir = DataDir::new(dir.path().join("data"), dir.path().join("tmp"));
        data_dir.reset_staging().await.unwrap();
        data_dir.reset_staging().await.unwrap();
        assert!(data_dir.temp_path().is_dir());
    }
}
