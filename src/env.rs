use std::collections::HashMap;
use std::env::VarError;
use std::ffi::OsString;
use std::sync::Arc;

use anyhow::Context;
use tokio::sync::{Mutex, mpsc::Sender};

use crate::{ArcOsStr, ArcStr};

mod core;
mod message;
#[cfg(test)]
mod tests;

use message::Message;

/// The environment actor that provides a thread-safe interface for
/// environment variable operations.
///
/// The underlying `std::env` setters modify global process state and are
/// unsafe to call concurrently; routing every access through one actor task
/// serializes them.
///
/// # Examples
/// ```ignore
/// let env = Env::spawn();
/// let home = env.env(ArcOsStr::from("HOME")).await?;
/// ```
#[derive(Debug, Clone)]
pub enum Env {
    /// A real environment actor backed by `std::env`
    Actual(Sender<Message>),
    /// A mock implementation for testing backed by an in-memory map
    Mock(Arc<Mutex<HashMap<ArcOsStr, ArcStr>>>),
}

impl Env {
    /// Creates a new environment actor and spawns its core.
    pub fn spawn() -> Self {
        let (env, _) = core::Core::new().spawn();
        env
    }

    /// Creates a new empty mock environment for testing.
    pub fn mock() -> Self {
        Self::Mock(Arc::new(Mutex::new(HashMap::new())))
    }

    /// Creates a new mock environment with the given variables preset.
    pub fn mock_with(vars: HashMap<ArcOsStr, ArcStr>) -> Self {
        Self::Mock(Arc::new(Mutex::new(vars)))
    }

    /// Reads an environment variable.
    ///
    /// # Errors
    /// Returns [`VarError::NotPresent`] if the variable is unset, or
    /// [`VarError::NotUnicode`] if its value is not valid UTF-8.
    pub async fn env(&self, key: ArcOsStr) -> Result<ArcStr, VarError> {
        match self {
            Self::Actual(sender) => {
                let (tx, rx) = tokio::sync::oneshot::channel();
                sender
                    .send(Message::GetEnv { key, tx })
                    .await
                    .context("Sending message to Env actor")
                    .expect("Env actor died");
                rx.await
                    .context("Awaiting response from Env actor")
                    .expect("Env actor died")
            }
            Self::Mock(vars) => {
                let vars = vars.lock().await;
                vars.get(&key).cloned().ok_or(VarError::NotPresent)
            }
        }
    }

    /// Sets an environment variable.
    pub async fn set_env(&self, key: ArcOsStr, value: impl Into<OsString>) {
        match self {
            Self::Actual(sender) => {
                sender
                    .send(Message::SetEnv {
                        key,
                        value: value.into(),
                    })
                    .await
                    .context("Sending message to Env actor")
                    .expect("Env actor died");
            }
            Self::Mock(vars) => {
                let value = value.into().to_string_lossy().into_owned();
                let mut vars = vars.lock().await;
                vars.insert(key, ArcStr::from(value));
            }
        }
    }

    /// Removes an environment variable.
    pub async fn unset_env(&self, key: ArcOsStr) {
        match self {
            Self::Actual(sender) => {
                sender
                    .send(Message::UnsetEnv { key })
                    .await
                    .context("Sending message to Env actor")
                    .expect("Env actor died");
            }
            Self::Mock(vars) => {
                let mut vars = vars.lock().await;
                vars.remove(&key);
            }
        }
    }
}
