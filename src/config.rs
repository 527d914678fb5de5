use anyhow::Context;

use crate::log::LogLevel;
use crate::{ArcPath, ArcSlice, ArcStr, env::Env, fs::Fs};

mod core;
mod data;
mod message;
mod mock;

pub use data::{Data, PathOpt, StrOpt, USizeOpt};
use message::Message;

/// The configuration actor that provides a thread-safe interface for
/// configuration operations.
///
/// This enum represents either a real configuration actor or a mock
/// implementation for testing purposes. The real actor persists its data as a
/// TOML file through the [`Fs`] actor and honors environment-variable
/// overrides (`ISSUE_HUB_URL`, `ISSUE_HUB_TOKEN`, `ISSUE_HUB_LOG_LEVEL`)
/// resolved through the [`Env`] actor.
///
/// # Examples
/// ```ignore
/// let config = Config::spawn(env, fs, config_path);
/// config.load().await?;
/// let url = config.str(StrOpt::TrackerUrl).await;
/// ```
///
/// # Thread Safety
/// This type is designed to be safely shared between threads. Cloning is
/// cheap as it only copies the channel sender or mock reference.
#[derive(Debug, Clone)]
pub enum Config {
    /// A real configuration actor that reads from and writes to a file
    Actual(tokio::sync::mpsc::Sender<Message>),
    /// A mock implementation for testing that stores data in memory
    Mock(mock::Mock),
}

impl Config {
    /// Creates a new configuration instance and spawns its actor.
    ///
    /// # Arguments
    /// * `env` - The environment actor for override lookup
    /// * `fs` - The filesystem actor for file operations
    /// * `path` - The path to the configuration file
    pub fn spawn(env: Env, fs: Fs, path: ArcPath) -> Self {
        let (config, _) = core::Core::new(env, fs, path).spawn();
        config
    }

    /// Creates a new mock configuration instance for testing.
    pub fn mock(data: Data) -> Self {
        Self::Mock(mock::Mock::new(data))
    }

    /// Loads the configuration from the file and applies environment
    /// overrides.
    pub async fn load(&self) -> anyhow::Result<()> {
        match self {
            Self::Actual(sender) => {
                let (tx, rx) = tokio::sync::oneshot::channel();
                sender
                    .send(Message::Load { tx })
                    .await
                    .context("Sending message to Config actor")
                    .expect("Config actor died");
                rx.await
                    .context("Awaiting response from Config actor")
                    .expect("Config actor died")
            }
            Self::Mock(mock) => mock.load().await,
        }
    }

    /// Saves the current configuration to the file.
    pub async fn save(&self) -> anyhow::Result<()> {
        match self {
            Self::Actual(sender) => {
                let (tx, rx) = tokio::sync::oneshot::channel();
                sender
                    .send(Message::Save { tx })
                    .await
                    .context("Sending message to Config actor")
                    .expect("Config actor died");
                rx.await
                    .context("Awaiting response from Config actor")
                    .expect("Config actor died")
            }
            Self::Mock(mock) => mock.save().await,
        }
    }

    /// Gets a path-based configuration value.
    pub async fn path(&self, opt: PathOpt) -> ArcPath {
        match self {
            Self::Actual(sender) => {
                let (tx, rx) = tokio::sync::oneshot::channel();
                sender
                    .send(Message::GetPath { opt, tx })
                    .await
                    .context("Sending message to Config actor")
                    .expect("Config actor died");
                rx.await
                    .context("Awaiting response from Config actor")
                    .expect("Config actor died")
            }
            Self::Mock(mock) => mock.path(opt).await,
        }
    }

    /// Sets a path-based configuration value.
    pub async fn set_path(&self, opt: PathOpt, path: ArcPath) {
        match self {
            Self::Actual(sender) => {
                let _ = sender.send(Message::SetPath { opt, path }).await;
            }
            Self::Mock(mock) => mock.set_path(opt, path).await,
        }
    }

    /// Gets a string configuration value.
    pub async fn str(&self, opt: StrOpt) -> ArcStr {
        match self {
            Self::Actual(sender) => {
                let (tx, rx) = tokio::sync::oneshot::channel();
                sender
                    .send(Message::GetStr { opt, tx })
                    .await
                    .context("Sending message to Config actor")
                    .expect("Config actor died");
                rx.await
                    .context("Awaiting response from Config actor")
                    .expect("Config actor died")
            }
            Self::Mock(mock) => mock.str(opt).await,
        }
    }

    /// Sets a string configuration value.
    pub async fn set_str(&self, opt: StrOpt, value: ArcStr) {
        match self {
            Self::Actual(sender) => {
                let _ = sender.send(Message::SetStr { opt, value }).await;
            }
            Self::Mock(mock) => mock.set_str(opt, value).await,
        }
    }

    /// Gets a numeric configuration value.
    pub async fn usize(&self, opt: USizeOpt) -> usize {
        match self {
            Self::Actual(sender) => {
                let (tx, rx) = tokio::sync::oneshot::channel();
                sender
                    .send(Message::GetUSize { opt, tx })
                    .await
                    .context("Sending message to Config actor")
                    .expect("Config actor died");
                rx.await
                    .context("Awaiting response from Config actor")
                    .expect("Config actor died")
            }
            Self::Mock(mock) => mock.usize(opt).await,
        }
    }

    /// Sets a numeric configuration value.
    pub async fn set_usize(&self, opt: USizeOpt, size: usize) {
        match self {
            Self::Actual(sender) => {
                let _ = sender.send(Message::SetUSize { opt, size }).await;
            }
            Self::Mock(mock) => mock.set_usize(opt, size).await,
        }
    }

    /// Gets the current log level.
    pub async fn log_level(&self) -> LogLevel {
        match self {
            Self::Actual(sender) => {
                let (tx, rx) = tokio::sync::oneshot::channel();
                sender
                    .send(Message::GetLogLevel { tx })
                    .await
                    .context("Sending message to Config actor")
                    .expect("Config actor died");
                rx.await
                    .context("Awaiting response from Config actor")
                    .expect("Config actor died")
            }
            Self::Mock(mock) => mock.log_level().await,
        }
    }

    /// Sets the log level.
    pub async fn set_log_level(&self, level: LogLevel) {
        match self {
            Self::Actual(sender) => {
                let _ = sender.send(Message::SetLogLevel { level }).await;
            }
            Self::Mock(mock) => mock.set_log_level(level).await,
        }
    }

    /// Gets the tracked field set.
    pub async fn fields(&self) -> ArcSlice<ArcStr> {
        match self {
            Self::Actual(sender) => {
                let (tx, rx) = tokio::sync::oneshot::channel();
                sender
                    .send(Message::GetFields { tx })
                    .await
                    .context("Sending message to Config actor")
                    .expect("Config actor died");
                rx.await
                    .context("Awaiting response from Config actor")
                    .expect("Config actor died")
            }
            Self::Mock(mock) => mock.fields().await,
        }
    }

    /// Sets the tracked field set.
    pub async fn set_fields(&self, fields: Vec<ArcStr>) {
        match self {
            Self::Actual(sender) => {
                let _ = sender.send(Message::SetFields { fields }).await;
            }
            Self::Mock(mock) => mock.set_fields(fields).await,
        }
    }
}
