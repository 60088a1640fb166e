//! System prompt loading.
//!
//! The prompt lives in a plain text file and is read again on every request,
//! so edits on disk take effect without a restart.

use async_trait::async_trait;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// The system prompt could not be read.
///
/// Displays only the I/O error kind, never the file path.
#[derive(Debug, Error)]
#[error("{0}")]
pub struct PromptError(#[from] std::io::Error);

/// Source of the system prompt.
#[async_trait]
pub trait PromptLoader: Send + Sync {
    /// Return the prompt with leading/trailing whitespace removed.
    async fn load(&self) -> Result<String, PromptError>;
}

/// Reads the prompt from a file on disk.
#[derive(Debug, Clone)]
pub struct FilePromptLoader {
    path: PathBuf,
}

impl FilePromptLoader {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[async_trait]
impl PromptLoader for FilePromptLoader {
    async fn load(&self) -> Result<String, PromptError> {
        let content = tokio::fs::read_to_string(&self.path).await?;
        Ok(content.trim().to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[tokio::test]
    async fn test_load_trims_whitespace() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("system.txt");
        std::fs::write(&path, "\n  You are a helpful assistant.  \n\n").unwrap();

        let loader = FilePromptLoader::new(&path);
        assert_eq!(loader.path(), path.as_path());
        assert_eq!(loader.load().await.unwrap(), "You are a helpful assistant.");
    }

    #[tokio::test]
    async fn test_load_rereads_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("system.txt");
        std::fs::write(&path, "first").unwrap();

        let loader = FilePromptLoader::new(&path);
        assert_eq!(loader.load().await.unwrap(), "first");

        std::fs::write(&path, "second").unwrap();
        assert_eq!(loader.load().await.unwrap(), "second");
    }

    #[tokio::test]
    async fn test_missing_file_hides_path() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("secret-location").join("system.txt");

        let err = FilePromptLoader::new(&path).load().await.unwrap_err();
        let message = err.to_string();
        assert!(!message.is_empty());
        assert!(!message.contains("secret-location"));
    }

    #[tokio::test]
    async fn test_non_utf8_file_fails() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("system.txt");
        std::fs::write(&path, [0xff, 0xfe, 0xfd]).unwrap();

        assert!(FilePromptLoader::new(&path).load().await.is_err());
    }
}
