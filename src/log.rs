use std::fmt::Display;

use tokio::sync::mpsc::Sender;

use crate::{ArcPath, fs::Fs};

mod core;
mod data;
mod message;
mod mock;
#[cfg(test)]
mod tests;

pub use data::{LogLevel, LogMessage};
use message::Message;

/// The logging actor that provides a thread-safe interface for logging.
///
/// Messages go to a timestamped log file plus a `latest.log` through the
/// [`Fs`] actor; messages at or above the configured print level are echoed
/// to stderr when the logger is flushed at shutdown. The mock variant keeps
/// messages in memory for assertions.
///
/// Logging methods are fire-and-forget: they enqueue the message without
/// awaiting, so callers inside actor loops never block on the logger. If the
/// logger's mailbox is full, the message is dropped.
///
/// # Examples
/// ```ignore
/// let log = Log::spawn(fs, LogLevel::Info, 7, log_dir).await?;
/// log.info("cache", "cache spawned");
/// ```
#[derive(Debug, Clone)]
pub enum Log {
    /// A real logging actor writing through the filesystem actor
    Actual(Sender<Message>),
    /// A mock implementation that stores messages in memory
    Mock(mock::Mock),
}

impl Log {
    /// Creates a new logging actor and spawns its core.
    ///
    /// # Arguments
    /// * `fs` - Filesystem actor for file operations
    /// * `level` - Minimum log level for messages to be printed to stderr
    /// * `max_age` - Maximum age of log files in days before they are deleted
    /// * `log_dir` - Directory where log files will be stored
    ///
    /// # Errors
    /// Returns an error if the log files cannot be created.
    pub async fn spawn(
        fs: Fs,
        level: LogLevel,
        max_age: usize,
        log_dir: ArcPath,
    ) -> anyhow::Result<Self> {
        let core = core::Core::build(fs, level, max_age, log_dir).await?;
        let (log, _) = core.spawn();
        Ok(log)
    }

    /// Creates a new mock logging actor for testing.
    pub fn mock() -> Self {
        Self::Mock(mock::Mock::new())
    }

    fn log(&self, scope: &'static str, message: String, level: LogLevel) {
        match self {
            Self::Actual(sender) => {
                let _ = sender.try_send(Message::Log(LogMessage {
                    level,
                    scope,
                    message,
                }));
            }
            Self::Mock(mock) => mock.log(scope, message, level),
        }
    }

    /// Log a message with the `INFO` level.
    pub fn info<M: Display>(&self, scope: &'static str, message: M) {
        self.log(scope, message.to_string(), LogLevel::Info);
    }

    /// Log a message with the `WARNING` level.
    pub fn warn<M: Display>(&self, scope: &'static str, message: M) {
        self.log(scope, message.to_string(), LogLevel::Warning);
    }

    /// Log a message with the `ERROR` level.
    pub fn error<M: Display>(&self, scope: &'static str, message: M) {
        self.log(scope, message.to_string(), LogLevel::Error);
    }

    /// Log a warning if the result is an error and return the result as is.
    pub fn warn_on_error<T, E: Display>(
        &self,
        scope: &'static str,
        result: Result<T, E>,
    ) -> Result<T, E> {
        match result {
            Ok(value) => Ok(value),
            Err(err) => {
                self.log(scope, err.to_string(), LogLevel::Warning);
                Err(err)
            }
        }
    }

    /// Log an error if the result is an error and return the result as is.
    pub fn error_on_error<T, E: Display>(
        &self,
        scope: &'static str,
        result: Result<T, E>,
    ) -> Result<T, E> {
        match result {
            Ok(value) => Ok(value),
            Err(err) => {
                self.log(scope, err.to_string(), LogLevel::Error);
                Err(err)
            }
        }
    }

    /// Flushes buffered messages to stderr and destroys the logger.
    pub async fn flush(self) {
        match self {
            Self::Actual(sender) => {
                let _ = sender.send(Message::Flush).await;
            }
            Self::Mock(mock) => {
                let _ = mock.flush().await;
            }
        }
    }

    /// Runs the log garbage collector to delete old log files.
    pub async fn collect_garbage(&self) {
        match self {
            Self::Actual(sender) => {
                let _ = sender.send(Message::CollectGarbage).await;
            }
            Self::Mock(_) => {}
        }
    }

    /// Gets all logged messages from the mock implementation.
    ///
    /// # Returns
    /// `Some` with the messages for the mock variant, `None` for the real one.
    pub async fn get_messages(&self) -> Option<Vec<LogMessage>> {
        match self {
            Self::Actual(_) => None,
            Self::Mock(mock) => Some(mock.get_messages().await),
        }
    }
}
