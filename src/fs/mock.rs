use std::io;
use std::sync::Arc;

use tempfile::TempDir;
use tokio::sync::Mutex;

use crate::{ArcFile, ArcPath, ArcStr};

/// Mock implementation of the Fs actor for testing purposes.
///
/// Uses a temporary directory to back the same operations as the real actor,
/// allowing tests to run without touching the actual filesystem layout.
/// Relative paths are resolved inside the temporary directory.
#[derive(Debug, Clone)]
pub struct Mock {
    temp_dir: Arc<Mutex<TempDir>>,
}

impl Mock {
    /// Creates a new mock instance with a fresh temporary directory.
    pub fn new() -> Self {
        let temp_dir = TempDir::new().expect("Failed to create temp dir for Fs mock");
        Self {
            temp_dir: Arc::new(Mutex::new(temp_dir)),
        }
    }

    /// Resolves a path inside the mock's temporary directory.
    async fn mock_path(&self, path: &ArcPath) -> std::path::PathBuf {
        let temp_dir = self.temp_dir.lock().await;
        let relative = path.strip_prefix("/").unwrap_or(&**path);
        temp_dir.path().join(relative)
    }

    pub async fn open_file(&self, path: ArcPath) -> Result<ArcFile, io::Error> {
        let real_path = self.mock_path(&path).await;
        if let Some(parent) = real_path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        let file = tokio::fs::OpenOptions::new()
            .write(true)
            .create(true)
            .append(true)
            .open(real_path)
            .await?;
        Ok(Arc::new(tokio::sync::RwLock::new(file)))
    }

    pub async fn read_to_string(&self, path: ArcPath) -> Result<ArcStr, io::Error> {
        let real_path = self.mock_path(&path).await;
        tokio::fs::read_to_string(real_path).await.map(Arc::from)
    }

    pub async fn write_string(&self, path: ArcPath, content: ArcStr) -> Result<(), io::Error> {
        let real_path = self.mock_path(&path).await;
        if let Some(parent) = real_path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        tokio::fs::write(real_path, content.as_bytes()).await
    }

    pub async fn mkdir(&self, path: ArcPath) -> Result<(), io::Error> {
        let real_path = self.mock_path(&path).await;
        tokio::fs::create_dir_all(real_path).await
    }

    pub async fn read_dir(&self, path: ArcPath) -> Result<Vec<ArcPath>, io::Error> {
        let real_path = self.mock_path(&path).await;
        let mut entries = Vec::new();
        let mut rd = tokio::fs::read_dir(real_path).await?;
        while let Some(entry) = rd.next_entry().await? {
            entries.push(ArcPath::from(entry.path().as_path()));
        }
        Ok(entries)
    }

    pub async fn remove_file(&self, path: ArcPath) -> Result<(), io::Error> {
        let real_path = self.mock_path(&path).await;
        tokio::fs::remove_file(real_path).await
    }
}
