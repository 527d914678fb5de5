use std::env::VarError;
use std::ffi::OsString;
use std::sync::Arc;

use tokio::task::JoinHandle;

use super::{Env, message::Message};
use crate::{ArcOsStr, ArcStr};

/// The core of the Env actor, responsible for handling environment variable
/// operations.
///
/// Wraps the standard library's environment functions. The setters are unsafe
/// because they mutate global process state; confining them to this actor's
/// task is what makes the wrapper sound.
#[derive(Debug, Default)]
pub struct Core {}

impl Core {
    /// Creates a new Env core instance.
    pub fn new() -> Self {
        Default::default()
    }

    /// Transforms an instance of [`Core`] into an actor ready to receive
    /// messages.
    ///
    /// # Returns
    /// A tuple containing:
    /// - An [`Env`] instance that can be used to send messages to the actor
    /// - A join handle for the spawned task
    pub fn spawn(self) -> (Env, JoinHandle<()>) {
        let (tx, mut rx) = tokio::sync::mpsc::channel(crate::BUFFER_SIZE);
        let handle = tokio::spawn(async move {
            while let Some(msg) = rx.recv().await {
                use Message::*;
                match msg {
                    SetEnv { key, value } => self.set_env(key, value),
                    UnsetEnv { key } => self.unset_env(key),
                    GetEnv { key, tx } => self.get_env(tx, key),
                }
            }
        });

        (Env::Actual(tx), handle)
    }

    fn set_env(&self, key: ArcOsStr, value: OsString) {
        unsafe {
            std::env::set_var(key, value);
        }
    }

    fn unset_env(&self, key: ArcOsStr) {
        unsafe {
            std::env::remove_var(key);
        }
    }

    fn get_env(&self, tx: tokio::sync::oneshot::Sender<Result<ArcStr, VarError>>, key: ArcOsStr) {
        let _ = tx.send(std::env::var(key).map(Arc::from));
    }
}
