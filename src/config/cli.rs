use crate::core::Storage;
use crate::utils::error::Result;
use std::path::PathBuf;

/// Read-only file source rooted at a base directory. The input file is
/// opened once per run, at load time.
#[derive(Debug, Clone)]
pub struct LocalStorage {
    base_dir: PathBuf,
}

impl LocalStorage {
    pub fn new(base_dir: impl Into<PathBuf>) -> Self {
        Self {
            base_dir: base_dir.into(),
        }
    }

    pub fn current_dir() -> Self {
        Self::new(".")
    }
}

impl Storage for LocalStorage {
    async fn read_file(&self, path: &str) -> Result<Vec<u8>> {
        let full_path = self.base_dir.join(path);
        tracing::debug!("Opening {} read-only", full_path.display());
        let data = tokio::fs::read(&full_path).await?;
        Ok(data)
    }
}
