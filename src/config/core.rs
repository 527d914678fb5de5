use std::ffi::OsStr;

use anyhow::Context;

use super::data::{Data, StrOpt};
use super::message::Message;
use crate::{ArcOsStr, ArcPath, env::Env, fs::Fs};

/// The core configuration actor that handles file I/O and data management.
///
/// Responsible for reading and writing the TOML configuration file through
/// the [`Fs`] actor and for applying environment-variable overrides through
/// the [`Env`] actor.
pub struct Core {
    /// The environment actor for override lookup
    env: Env,
    /// The filesystem actor for file operations
    fs: Fs,
    /// The path to the configuration file
    path: ArcPath,
    /// The current configuration data
    data: Data,
}

impl Core {
    /// Creates a new configuration core instance.
    pub fn new(env: Env, fs: Fs, path: ArcPath) -> Self {
        Self {
            env,
            fs,
            path,
            data: Data::default(),
        }
    }

    /// Spawns the configuration actor and returns a handle to it.
    pub fn spawn(mut self) -> (super::Config, tokio::task::JoinHandle<()>) {
        let (tx, mut rx) = tokio::sync::mpsc::channel(32);
        let handle = tokio::spawn(async move {
            while let Some(msg) = rx.recv().await {
                match msg {
                    Message::Load { tx } => {
                        let res = self.load().await;
                        let _ = tx.send(res);
                    }
                    Message::Save { tx } => {
                        let res = self.save().await;
                        let _ = tx.send(res);
                    }
                    Message::GetPath { opt, tx } => {
                        let _ = tx.send(self.data.path(opt));
                    }
                    Message::SetPath { opt, path } => {
                        self.data.set_path(opt, path);
                    }
                    Message::GetStr { opt, tx } => {
                        let _ = tx.send(self.data.str(opt));
                    }
                    Message::SetStr { opt, value } => {
                        self.data.set_str(opt, value);
                    }
                    Message::GetUSize { opt, tx } => {
                        let _ = tx.send(self.data.usize(opt));
                    }
                    Message::SetUSize { opt, size } => {
                        self.data.set_usize(opt, size);
                    }
                    Message::GetLogLevel { tx } => {
                        let _ = tx.send(self.data.log_level());
                    }
                    Message::SetLogLevel { level } => {
                        self.data.set_log_level(level);
                    }
                    Message::GetFields { tx } => {
                        let _ = tx.send(self.data.fields());
                    }
                    Message::SetFields { fields } => {
                        self.data.set_fields(fields);
                    }
                }
            }
        });
        (super::Config::Actual(tx), handle)
    }

    /// Loads the configuration from the file and applies environment
    /// overrides.
    ///
    /// Overrides are applied even when the file is missing or malformed, so a
    /// fresh installation still honors its environment.
    async fn load(&mut self) -> anyhow::Result<()> {
        let result = async {
            let content = self
                .fs
                .read_to_string(self.path.clone())
                .await
                .with_context(|| format!("Reading config file: {}", self.path.display()))?;
            self.data = toml::from_str(&content)
                .with_context(|| format!("Parsing config file: {}", self.path.display()))?;
            Ok(())
        }
        .await;

        self.apply_env_overrides().await;
        result
    }

    /// Saves the current configuration to the file.
    async fn save(&self) -> anyhow::Result<()> {
        if let Some(parent) = self.path.parent() {
            self.fs
                .mkdir(ArcPath::from(parent))
                .await
                .context("Creating config directory")?;
        }

        let content = toml::to_string_pretty(&self.data).context("Serializing config data")?;
        self.fs
            .write_string(self.path.clone(), content.into())
            .await
            .with_context(|| format!("Writing config file: {}", self.path.display()))
    }

    async fn apply_env_overrides(&mut self) {
        if let Ok(url) = self.env.env(ArcOsStr::from(OsStr::new("ISSUE_HUB_URL"))).await {
            self.data.set_str(StrOpt::TrackerUrl, url);
        }
        if let Ok(token) = self.env.env(ArcOsStr::from(OsStr::new("ISSUE_HUB_TOKEN"))).await {
            self.data.set_str(StrOpt::ApiToken, token);
        }
        if let Ok(level) = self.env.env(ArcOsStr::from(OsStr::new("ISSUE_HUB_LOG_LEVEL"))).await
            && let Ok(level) = level.parse()
        {
            self.data.set_log_level(level);
        }
    }
}
