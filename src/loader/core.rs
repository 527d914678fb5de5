use std::collections::HashSet;
use std::time::Duration;

use tokio::task::JoinHandle;

use super::data::LoadResult;
use super::message::Message;
use crate::{ArcSlice, FieldId, IssueId, api::TrackerApi, log::Log};

const SCOPE: &str = "loader";

/// Delay between attempts when the tracker rejects a fetch.
const RETRY_DELAY: Duration = Duration::from_secs(2);

/// The core of the issue loader actor.
///
/// Loads are errorless from the caller's point of view: a failed tracker
/// request is retried after a delay, for as long as it takes. Each load runs
/// in its own task, so a load stuck in retries never delays the others.
pub struct Core {
    /// The tracker API actor used for fetching
    api: TrackerApi,
    /// Logging actor
    log: Log,
    /// Delay between retries of a failed fetch
    retry_delay: Duration,
}

impl Core {
    /// Creates a new issue loader core instance.
    pub fn new(api: TrackerApi, log: Log) -> Self {
        Self {
            api,
            log,
            retry_delay: RETRY_DELAY,
        }
    }

    /// Overrides the retry delay. Used by tests to keep retries fast.
    pub fn with_retry_delay(mut self, retry_delay: Duration) -> Self {
        self.retry_delay = retry_delay;
        self
    }

    /// Transforms the issue loader core instance into an actor.
    ///
    /// # Returns
    /// A tuple containing:
    /// - The [`super::IssueLoader`] interface
    /// - A join handle for the spawned task
    pub fn spawn(self) -> (super::IssueLoader, JoinHandle<()>) {
        let (tx, mut rx) = tokio::sync::mpsc::channel(32);

        let handle = tokio::spawn(async move {
            while let Some(message) = rx.recv().await {
                match message {
                    Message::Load { issues, fields, tx } => {
                        let api = self.api.clone();
                        let log = self.log.clone();
                        let retry_delay = self.retry_delay;
                        tokio::spawn(async move {
                            let result =
                                Self::load(api, log, retry_delay, issues, fields).await;
                            let _ = tx.send(result);
                        });
                    }
                }
            }
        });

        (super::IssueLoader::Actual(tx), handle)
    }

    /// Fetches until the tracker answers. The contract promises eventual
    /// completion, not promptness.
    async fn load(
        api: TrackerApi,
        log: Log,
        retry_delay: Duration,
        issues: HashSet<IssueId>,
        fields: ArcSlice<FieldId>,
    ) -> LoadResult {
        loop {
            match api.fetch_fields(issues.clone(), fields.clone()).await {
                Ok(values) => {
                    log.info(
                        SCOPE,
                        format!("Loaded {} of {} requested issues", values.len(), issues.len()),
                    );
                    return LoadResult::new(values);
                }
                Err(err) => {
                    log.warn(
                        SCOPE,
                        format!(
                            "Fetch of issues {:?} failed, retrying in {:?}: {:#}",
                            issues, retry_delay, err
                        ),
                    );
                    tokio::time::sleep(retry_delay).await;
                }
            }
        }
    }
}
