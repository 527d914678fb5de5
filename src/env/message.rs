use std::env::VarError;
use std::ffi::OsString;

use crate::{ArcOsStr, ArcStr};

/// Messages that can be sent to the Env actor.
#[derive(Debug)]
pub enum Message {
    /// Sets an environment variable to a specified value
    SetEnv {
        /// The environment variable name
        key: ArcOsStr,
        /// The value to set
        value: OsString,
    },
    /// Removes an environment variable
    UnsetEnv {
        /// The environment variable name
        key: ArcOsStr,
    },
    /// Reads an environment variable
    GetEnv {
        /// The environment variable name
        key: ArcOsStr,
        /// Channel for the reply
        tx: tokio::sync::oneshot::Sender<Result<ArcStr, VarError>>,
    },
}
