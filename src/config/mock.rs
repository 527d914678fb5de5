use std::sync::Arc;

use tokio::sync::Mutex;

use super::data::{Data, PathOpt, StrOpt, USizeOpt};
use crate::log::LogLevel;
use crate::{ArcPath, ArcSlice, ArcStr};

/// Mock implementation of the Config actor for testing purposes.
///
/// Stores configuration data in memory; load and save are no-ops.
#[derive(Debug, Clone)]
pub struct Mock {
    data: Arc<Mutex<Data>>,
}

impl Mock {
    /// Creates a new mock instance with the provided configuration data.
    pub fn new(data: Data) -> Self {
        Self {
            data: Arc::new(Mutex::new(data)),
        }
    }

    pub async fn load(&self) -> anyhow::Result<()> {
        Ok(())
    }

    pub async fn save(&self) -> anyhow::Result<()> {
        Ok(())
    }

    pub async fn path(&self, opt: PathOpt) -> ArcPath {
        self.data.lock().await.path(opt)
    }

    pub async fn set_path(&self, opt: PathOpt, path: ArcPath) {
        self.data.lock().await.set_path(opt, path);
    }

    pub async fn str(&self, opt: StrOpt) -> ArcStr {
        self.data.lock().await.str(opt)
    }

    pub async fn set_str(&self, opt: StrOpt, value: ArcStr) {
        self.data.lock().await.set_str(opt, value);
    }

    pub async fn usize(&self, opt: USizeOpt) -> usize {
        self.data.lock().await.usize(opt)
    }

    pub async fn set_usize(&self, opt: USizeOpt, size: usize) {
        self.data.lock().await.set_usize(opt, size);
    }

    pub async fn log_level(&self) -> LogLevel {
        self.data.lock().await.log_level()
    }

    pub async fn set_log_level(&self, level: LogLevel) {
        self.data.lock().await.set_log_level(level);
    }

    pub async fn fields(&self) -> ArcSlice<ArcStr> {
        self.data.lock().await.fields()
    }

    pub async fn set_fields(&self, fields: Vec<ArcStr>) {
        self.data.lock().await.set_fields(fields);
    }
}
