use anyhow::Context;
use tokio::{io::AsyncWriteExt, task::JoinHandle};

use super::data::{LogLevel, LogMessage};
use super::message::Message;
use crate::{ArcFile, ArcPath, fs::Fs};

/// The core of the logging system that manages logging to both stderr and log
/// files.
///
/// Messages are appended to a timestamped log file and to a "latest" log
/// file. Messages at or above the configured print level are also buffered
/// and written to stderr when the logger is flushed at shutdown. Old log
/// files are deleted by the garbage collector based on their age.
#[derive(Debug)]
pub struct Core {
    /// Filesystem actor for file operations
    fs: Fs,
    /// Directory where log files are stored
    log_dir: ArcPath,
    /// Path to the current timestamped log file
    log_path: ArcPath,
    /// Handle to the current log file
    log_file: ArcFile,
    /// Handle to the "latest" log file
    latest_log_file: ArcFile,
    /// Buffer of messages to be printed to stderr
    logs_to_print: Vec<LogMessage>,
    /// Minimum level of messages to be printed to stderr
    print_level: LogLevel,
    /// Maximum age of log files in days before they are deleted
    max_age: usize,
}

impl Core {
    /// Creates a new logger instance with the specified configuration.
    ///
    /// # Arguments
    /// * `fs` - Filesystem actor for file operations
    /// * `level` - Minimum log level for messages to be printed to stderr
    /// * `max_age` - Maximum age of log files in days before they are deleted
    /// * `log_dir` - Directory where log files will be stored
    ///
    /// # Errors
    /// Returns an error if the log directory or either log file cannot be
    /// created.
    pub async fn build(
        fs: Fs,
        level: LogLevel,
        max_age: usize,
        log_dir: ArcPath,
    ) -> anyhow::Result<Self> {
        let log_path = ArcPath::from(
            log_dir
                .join(format!(
                    "issue-hub_{}.log",
                    chrono::Utc::now().format("%Y-%m-%d-%H-%M-%S")
                ))
                .as_path(),
        );
        let latest_log_path = ArcPath::from(log_dir.join("latest.log").as_path());

        fs.mkdir(log_dir.clone())
            .await
            .with_context(|| format!("Failed to create log directory: {}", log_dir.display()))?;

        let log_file = fs
            .open_file(log_path.clone())
            .await
            .with_context(|| format!("Failed to create log file: {}", log_path.display()))?;

        let latest_log_file = fs.open_file(latest_log_path.clone()).await.with_context(|| {
            format!(
                "Failed to create latest log file: {}",
                latest_log_path.display()
            )
        })?;

        Ok(Self {
            fs,
            log_dir,
            log_path,
            log_file,
            latest_log_file,
            logs_to_print: Vec::new(),
            print_level: level,
            max_age,
        })
    }

    /// Transforms the logger core instance into an actor.
    ///
    /// # Returns
    /// A tuple containing:
    /// - A [`super::Log`] instance that can be used to send messages to the actor
    /// - A join handle for the spawned task
    pub fn spawn(mut self) -> (super::Log, JoinHandle<()>) {
        let (tx, mut rx) = tokio::sync::mpsc::channel(100);
        let handle = tokio::spawn(async move {
            while let Some(command) = rx.recv().await {
                match command {
                    Message::Log(msg) => {
                        self.log(msg).await;
                    }
                    Message::Flush => {
                        self.flush();
                        rx.close();
                        break;
                    }
                    Message::CollectGarbage => {
                        self.collect_garbage().await;
                    }
                }
            }
        });

        (super::Log::Actual(tx), handle)
    }

    /// Writes a log message to both log files and potentially to the stderr
    /// buffer.
    async fn log(&mut self, message: LogMessage) {
        let line = format!("{}\n", &message);

        let mut lock = self.log_file.write().await;
        if lock.write_all(line.as_bytes()).await.is_ok() {
            let _ = lock.flush().await;
        }
        drop(lock);

        let mut lock = self.latest_log_file.write().await;
        if lock.write_all(line.as_bytes()).await.is_ok() {
            let _ = lock.flush().await;
        }
        drop(lock);

        if message.level >= self.print_level {
            self.logs_to_print.push(message);
        }
    }

    /// Writes buffered log messages to stderr and destroys the logger.
    fn flush(self) {
        for message in &self.logs_to_print {
            eprintln!("{}", message);
        }

        if !self.logs_to_print.is_empty() {
            eprintln!("Check the full log file: {}", self.log_path.display());
        }
    }

    /// Runs the garbage collector to delete old log files.
    ///
    /// Scans the log directory and deletes any `issue-hub_*.log` file older
    /// than the configured maximum age. A `max_age` of 0 disables deletion.
    async fn collect_garbage(&mut self) {
        if self.max_age == 0 {
            return;
        }

        let now = std::time::SystemTime::now();

        let Ok(logs) = self.fs.read_dir(self.log_dir.clone()).await else {
            self.log(LogMessage {
                level: LogLevel::Error,
                scope: "log",
                message: "Failed to read the logs directory during garbage collection".into(),
            })
            .await;
            return;
        };

        for log in logs {
            let Some(filename) = log.file_name() else {
                continue;
            };

            if !filename.to_string_lossy().ends_with(".log")
                || !filename.to_string_lossy().starts_with("issue-hub_")
            {
                continue;
            }

            let Ok(Ok(created_date)) = log.metadata().map(|meta| meta.created()) else {
                continue;
            };
            let Ok(age) = now.duration_since(created_date) else {
                continue;
            };
            let age = age.as_secs() / 60 / 60 / 24;

            if age as usize > self.max_age && self.fs.remove_file(log.clone()).await.is_err() {
                self.log(LogMessage {
                    level: LogLevel::Warning,
                    scope: "log",
                    message: format!("Failed to remove the log file: {}", log.display()),
                })
                .await;
            }
        }
    }
}
