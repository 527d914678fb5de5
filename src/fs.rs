use anyhow::Context;
use tokio::sync::mpsc::Sender;

use crate::{ArcFile, ArcPath, ArcStr};

mod core;
pub mod message;
mod mock;
#[cfg(test)]
mod tests;

use message::Message;

/// The filesystem actor that provides a thread-safe interface for file
/// operations.
///
/// This enum represents either a real filesystem actor or a mock
/// implementation for testing purposes. The real actor wraps `tokio::fs` and
/// caches open file handles so the same file is not reopened on every write.
/// The mock operates inside a temporary directory that is removed when the
/// last handle is dropped.
///
/// # Examples
/// ```ignore
/// let fs = Fs::spawn();
/// let content = fs.read_to_string(path).await?;
/// ```
///
/// # Thread Safety
/// This type is designed to be safely shared between threads. Cloning is
/// cheap as it only copies the channel sender or mock reference.
#[derive(Debug, Clone)]
pub enum Fs {
    /// A real filesystem actor
    Actual(Sender<Message>),
    /// A mock implementation rooted in a temporary directory
    Mock(mock::Mock),
}

impl Fs {
    /// Creates a new filesystem actor and spawns its core.
    pub fn spawn() -> Self {
        let (fs, _) = core::Core::new().spawn();
        fs
    }

    /// Creates a new mock filesystem rooted in a fresh temporary directory.
    pub fn mock() -> Self {
        Self::Mock(mock::Mock::new())
    }

    /// Opens a file for writing, creating it if needed. Handles are cached,
    /// so repeated calls for the same path return the same [`ArcFile`].
    pub async fn open_file(&self, path: ArcPath) -> anyhow::Result<ArcFile> {
        match self {
            Self::Actual(sender) => {
                let (tx, rx) = tokio::sync::oneshot::channel();
                sender
                    .send(Message::OpenFile { path, tx })
                    .await
                    .context("Sending message to Fs actor")
                    .expect("Fs actor died");
                rx.await
                    .context("Awaiting response from Fs actor")
                    .expect("Fs actor died")
                    .context("Opening file")
            }
            Self::Mock(mock) => mock.open_file(path).await.context("Opening mock file"),
        }
    }

    /// Drops the cached handle for a path, if any.
    pub async fn close_file(&self, path: ArcPath) {
        match self {
            Self::Actual(sender) => {
                let _ = sender.send(Message::CloseFile { path }).await;
            }
            Self::Mock(_) => {}
        }
    }

    /// Reads a whole file into a string.
    pub async fn read_to_string(&self, path: ArcPath) -> anyhow::Result<ArcStr> {
        match self {
            Self::Actual(sender) => {
                let (tx, rx) = tokio::sync::oneshot::channel();
                sender
                    .send(Message::ReadToString { path, tx })
                    .await
                    .context("Sending message to Fs actor")
                    .expect("Fs actor died");
                rx.await
                    .context("Awaiting response from Fs actor")
                    .expect("Fs actor died")
                    .context("Reading file")
            }
            Self::Mock(mock) => mock.read_to_string(path).await.context("Reading mock file"),
        }
    }

    /// Writes a string to a file, replacing any previous content.
    pub async fn write_string(&self, path: ArcPath, content: ArcStr) -> anyhow::Result<()> {
        match self {
            Self::Actual(sender) => {
                let (tx, rx) = tokio::sync::oneshot::channel();
                sender
                    .send(Message::WriteString { path, content, tx })
                    .await
                    .context("Sending message to Fs actor")
                    .expect("Fs actor died");
                rx.await
                    .context("Awaiting response from Fs actor")
                    .expect("Fs actor died")
                    .context("Writing file")
            }
            Self::Mock(mock) => mock
                .write_string(path, content)
                .await
                .context("Writing mock file"),
        }
    }

    /// Creates a directory and any missing parents.
    pub async fn mkdir(&self, path: ArcPath) -> anyhow::Result<()> {
        match self {
            Self::Actual(sender) => {
                let (tx, rx) = tokio::sync::oneshot::channel();
                sender
                    .send(Message::MkDir { path, tx })
                    .await
                    .context("Sending message to Fs actor")
                    .expect("Fs actor died");
                rx.await
                    .context("Awaiting response from Fs actor")
                    .expect("Fs actor died")
                    .context("Creating directory")
            }
            Self::Mock(mock) => mock.mkdir(path).await.context("Creating mock directory"),
        }
    }

    /// Lists the entries of a directory.
    pub async fn read_dir(&self, path: ArcPath) -> anyhow::Result<Vec<ArcPath>> {
        match self {
            Self::Actual(sender) => {
                let (tx, rx) = tokio::sync::oneshot::channel();
                sender
                    .send(Message::ReadDir { path, tx })
                    .await
                    .context("Sending message to Fs actor")
                    .expect("Fs actor died");
                rx.await
                    .context("Awaiting response from Fs actor")
                    .expect("Fs actor died")
                    .context("Reading directory")
            }
            Self::Mock(mock) => mock.read_dir(path).await.context("Reading mock directory"),
        }
    }

    /// Removes a file.
    pub async fn remove_file(&self, path: ArcPath) -> anyhow::Result<()> {
        match self {
            Self::Actual(sender) => {
                let (tx, rx) = tokio::sync::oneshot::channel();
                sender
                    .send(Message::RemoveFile { path, tx })
                    .await
                    .context("Sending message to Fs actor")
                    .expect("Fs actor died");
                rx.await
                    .context("Awaiting response from Fs actor")
                    .expect("Fs actor died")
                    .context("Removing file")
            }
            Self::Mock(mock) => mock.remove_file(path).await.context("Removing mock file"),
        }
    }
}
