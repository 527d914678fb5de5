use serde::{Deserialize, Serialize};

use crate::log::LogLevel;
use crate::{ArcPath, ArcSlice, ArcStr};

/// Options for path-based configuration values.
#[derive(Debug, Clone, Copy)]
pub enum PathOpt {
    /// Directory where log files are stored
    LogDir,
}

/// Options for numeric configuration values.
#[derive(Debug, Clone, Copy)]
pub enum USizeOpt {
    /// Seconds between change-feed polls of the tracker
    PollInterval,
    /// Timeout for network requests in seconds
    Timeout,
    /// Maximum age of log files in days before they are deleted
    MaxAge,
}

/// Options for string configuration values.
#[derive(Debug, Clone, Copy)]
pub enum StrOpt {
    /// Base URL of the issue tracker
    TrackerUrl,
    /// API token sent as a bearer credential; never persisted to the config
    /// file, only read from the environment
    ApiToken,
}

/// The configuration data structure that holds all configurable values.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Data {
    /// Base URL of the issue tracker
    tracker_url: ArcStr,
    /// API token for the tracker; environment-only
    #[serde(skip)]
    api_token: ArcStr,
    /// The issue fields the cache requests and stores
    fields: Vec<ArcStr>,
    /// Seconds between change-feed polls
    poll_interval: usize,
    /// Timeout for network requests in seconds
    timeout: usize,
    /// Directory where log files are stored
    log_dir: ArcPath,
    /// Current log level
    log_level: LogLevel,
    /// Maximum age of log files in days before they are deleted
    max_age: usize,
}

impl Default for Data {
    fn default() -> Self {
        Self {
            tracker_url: ArcStr::from("http://localhost:8080"),
            api_token: ArcStr::from(""),
            fields: vec![
                ArcStr::from("key"),
                ArcStr::from("summary"),
                ArcStr::from("status"),
                ArcStr::from("assignee"),
            ],
            poll_interval: 30,
            timeout: 30,
            log_dir: ArcPath::from(std::path::Path::new("/tmp/issue-hub/logs")),
            log_level: LogLevel::Warning,
            max_age: 7,
        }
    }
}

impl Data {
    /// Gets a path-based configuration value.
    pub fn path(&self, opt: PathOpt) -> ArcPath {
        match opt {
            PathOpt::LogDir => self.log_dir.clone(),
        }
    }

    /// Sets a path-based configuration value.
    pub fn set_path(&mut self, opt: PathOpt, path: ArcPath) {
        match opt {
            PathOpt::LogDir => self.log_dir = path,
        }
    }

    /// Gets a string configuration value.
    pub fn str(&self, opt: StrOpt) -> ArcStr {
        match opt {
            StrOpt::TrackerUrl => self.tracker_url.clone(),
            StrOpt::ApiToken => self.api_token.clone(),
        }
    }

    /// Sets a string configuration value.
    pub fn set_str(&mut self, opt: StrOpt, value: ArcStr) {
        match opt {
            StrOpt::TrackerUrl => self.tracker_url = value,
            StrOpt::ApiToken => self.api_token = value,
        }
    }

    /// Gets a numeric configuration value.
    pub fn usize(&self, opt: USizeOpt) -> usize {
        match opt {
            USizeOpt::PollInterval => self.poll_interval,
            USizeOpt::Timeout => self.timeout,
            USizeOpt::MaxAge => self.max_age,
        }
    }

    /// Sets a numeric configuration value.
    pub fn set_usize(&mut self, opt: USizeOpt, value: usize) {
        match opt {
            USizeOpt::PollInterval => self.poll_interval = value,
            USizeOpt::Timeout => self.timeout = value,
            USizeOpt::MaxAge => self.max_age = value,
        }
    }

    /// Gets the current log level.
    pub fn log_level(&self) -> LogLevel {
        self.log_level
    }

    /// Sets the log level.
    pub fn set_log_level(&mut self, level: LogLevel) {
        self.log_level = level;
    }

    /// Gets the tracked field set.
    pub fn fields(&self) -> ArcSlice<ArcStr> {
        ArcSlice::from(self.fields.clone())
    }

    /// Sets the tracked field set.
    pub fn set_fields(&mut self, fields: Vec<ArcStr>) {
        self.fields = fields;
    }
}
