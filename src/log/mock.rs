use std::{collections::VecDeque, sync::Arc};

use tokio::sync::Mutex;
use tokio::task::JoinHandle;

use super::data::{LogLevel, LogMessage};

/// Mock implementation of the Log actor for testing purposes.
///
/// Stores log messages in memory, allowing tests to run without writing to
/// actual files or stderr, and to assert on what was logged.
#[derive(Debug, Clone)]
pub struct Mock {
    messages: Arc<Mutex<VecDeque<LogMessage>>>,
}

impl Mock {
    /// Creates a new mock instance with an empty message store.
    pub fn new() -> Self {
        Self {
            messages: Arc::new(Mutex::new(VecDeque::new())),
        }
    }

    /// Records a message with the specified level and scope.
    pub fn log(&self, scope: &'static str, message: String, level: LogLevel) {
        let messages = self.messages.clone();
        tokio::spawn(async move {
            let mut lock = messages.lock().await;
            lock.push_back(LogMessage {
                level,
                scope,
                message,
            });
        });
    }

    /// Flushes the mock logger by printing its messages to stderr.
    pub fn flush(self) -> JoinHandle<()> {
        tokio::spawn(async move {
            let lock = self.messages.lock().await;
            for message in lock.iter() {
                eprintln!("{message}");
            }
        })
    }

    /// Gets all logged messages.
    pub async fn get_messages(&self) -> Vec<LogMessage> {
        let lock = self.messages.lock().await;
        lock.iter().cloned().collect()
    }
}
