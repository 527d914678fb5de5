use std::collections::HashMap;
use std::io;
use std::sync::Arc;

use tokio::fs::OpenOptions;
use tokio::task::JoinHandle;

use super::{Fs, message::Message};
use crate::{ArcFile, ArcPath, ArcStr};

/// The core of the Fs actor, responsible for handling filesystem operations.
///
/// Wraps tokio's filesystem functions. Files opened for writing are cached so
/// callers holding an [`ArcFile`] keep appending to the same descriptor.
#[derive(Debug, Default)]
pub struct Core {
    /// The cache of open files, mapping paths to their file handles
    files: HashMap<ArcPath, ArcFile>,
}

impl Core {
    /// Creates a new Fs core instance.
    pub fn new() -> Self {
        Default::default()
    }

    /// Transforms an instance of [`Core`] into an actor ready to receive
    /// messages.
    ///
    /// # Returns
    /// A tuple containing:
    /// - A [`Fs`] instance that can be used to send messages to the actor
    /// - A join handle for the spawned task
    pub fn spawn(mut self) -> (Fs, JoinHandle<()>) {
        let (tx, mut rx) = tokio::sync::mpsc::channel(crate::BUFFER_SIZE);
        let handle = tokio::spawn(async move {
            while let Some(msg) = rx.recv().await {
                use Message::*;
                match msg {
                    OpenFile { path, tx } => self.open_file(tx, path).await,
                    CloseFile { path } => self.close_file(path),
                    ReadToString { path, tx } => self.read_to_string(tx, path).await,
                    WriteString { path, content, tx } => self.write_string(tx, path, content).await,
                    MkDir { path, tx } => self.mkdir(tx, path).await,
                    ReadDir { path, tx } => self.read_dir(tx, path).await,
                    RemoveFile { path, tx } => self.remove_file(tx, path).await,
                }
            }
        });

        (Fs::Actual(tx), handle)
    }

    /// Opens a file for writing or returns the cached handle if one exists.
    async fn open_file(
        &mut self,
        tx: tokio::sync::oneshot::Sender<Result<ArcFile, io::Error>>,
        path: ArcPath,
    ) {
        let file = match self.files.get(&path) {
            Some(file) => Ok(file.clone()),
            None => match OpenOptions::new()
                .write(true)
                .create(true)
                .append(true)
                .open(&path)
                .await
            {
                Ok(file) => {
                    let file = Arc::new(tokio::sync::RwLock::new(file));
                    self.files.insert(path, file.clone());
                    Ok(file)
                }
                Err(err) => Err(err),
            },
        };
        let _ = tx.send(file);
    }

    fn close_file(&mut self, path: ArcPath) {
        self.files.remove(&path);
    }

    async fn read_to_string(
        &self,
        tx: tokio::sync::oneshot::Sender<Result<ArcStr, io::Error>>,
        path: ArcPath,
    ) {
        let content = tokio::fs::read_to_string(&path).await.map(Arc::from);
        let _ = tx.send(content);
    }

    async fn write_string(
        &mut self,
        tx: tokio::sync::oneshot::Sender<Result<(), io::Error>>,
        path: ArcPath,
        content: ArcStr,
    ) {
        // A cached append handle would bypass the truncation this op implies.
        self.files.remove(&path);
        let result = tokio::fs::write(&path, content.as_bytes()).await;
        let _ = tx.send(result);
    }

    async fn mkdir(&self, tx: tokio::sync::oneshot::Sender<Result<(), io::Error>>, path: ArcPath) {
        let result = tokio::fs::create_dir_all(&path).await;
        let _ = tx.send(result);
    }

    async fn read_dir(
        &self,
        tx: tokio::sync::oneshot::Sender<Result<Vec<ArcPath>, io::Error>>,
        path: ArcPath,
    ) {
        let result = async {
            let mut entries = Vec::new();
            let mut rd = tokio::fs::read_dir(&path).await?;
            while let Some(entry) = rd.next_entry().await? {
                entries.push(ArcPath::from(entry.path().as_path()));
            }
            Ok(entries)
        }
        .await;
        let _ = tx.send(result);
    }

    async fn remove_file(
        &mut self,
        tx: tokio::sync::oneshot::Sender<Result<(), io::Error>>,
        path: ArcPath,
    ) {
        self.files.remove(&path);
        let result = tokio::fs::remove_file(&path).await;
        let _ = tx.send(result);
    }
}
