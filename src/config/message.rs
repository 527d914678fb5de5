use super::data::{PathOpt, StrOpt, USizeOpt};
use crate::log::LogLevel;
use crate::{ArcPath, ArcSlice, ArcStr};

/// Messages that can be sent to the Config actor.
#[derive(Debug)]
pub enum Message {
    /// Loads the configuration from the file
    Load {
        tx: tokio::sync::oneshot::Sender<anyhow::Result<()>>,
    },
    /// Saves the configuration to the file
    Save {
        tx: tokio::sync::oneshot::Sender<anyhow::Result<()>>,
    },
    /// Gets a path-based configuration value
    GetPath {
        opt: PathOpt,
        tx: tokio::sync::oneshot::Sender<ArcPath>,
    },
    /// Sets a path-based configuration value
    SetPath { opt: PathOpt, path: ArcPath },
    /// Gets a string configuration value
    GetStr {
        opt: StrOpt,
        tx: tokio::sync::oneshot::Sender<ArcStr>,
    },
    /// Sets a string configuration value
    SetStr { opt: StrOpt, value: ArcStr },
    /// Gets a numeric configuration value
    GetUSize {
        opt: USizeOpt,
        tx: tokio::sync::oneshot::Sender<usize>,
    },
    /// Sets a numeric configuration value
    SetUSize { opt: USizeOpt, size: usize },
    /// Gets the current log level
    GetLogLevel {
        tx: tokio::sync::oneshot::Sender<LogLevel>,
    },
    /// Sets the log level
    SetLogLevel { level: LogLevel },
    /// Gets the tracked field set
    GetFields {
        tx: tokio::sync::oneshot::Sender<ArcSlice<ArcStr>>,
    },
    /// Sets the tracked field set
    SetFields { fields: Vec<ArcStr> },
}
