use std::io;

use crate::{ArcFile, ArcPath, ArcStr};

/// Messages that can be sent to the Fs actor.
#[derive(Debug)]
pub enum Message {
    /// Opens a file for writing, creating it if needed
    OpenFile {
        path: ArcPath,
        tx: tokio::sync::oneshot::Sender<Result<ArcFile, io::Error>>,
    },
    /// Drops the cached handle for a path
    CloseFile { path: ArcPath },
    /// Reads a whole file into a string
    ReadToString {
        path: ArcPath,
        tx: tokio::sync::oneshot::Sender<Result<ArcStr, io::Error>>,
    },
    /// Writes a string to a file, replacing previous content
    WriteString {
        path: ArcPath,
        content: ArcStr,
        tx: tokio::sync::oneshot::Sender<Result<(), io::Error>>,
    },
    /// Creates a directory and any missing parents
    MkDir {
        path: ArcPath,
        tx: tokio::sync::oneshot::Sender<Result<(), io::Error>>,
    },
    /// Lists the entries of a directory
    ReadDir {
        path: ArcPath,
        tx: tokio::sync::oneshot::Sender<Result<Vec<ArcPath>, io::Error>>,
    },
    /// Removes a file
    RemoveFile {
        path: ArcPath,
        tx: tokio::sync::oneshot::Sender<Result<(), io::Error>>,
    },
}
