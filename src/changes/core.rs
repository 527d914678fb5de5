use std::collections::HashSet;
use std::time::Duration;

use chrono::{DateTime, Utc};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use super::{ChangeFeed, message::Message};
use crate::{IssueId, api::TrackerApi, log::Log};

const SCOPE: &str = "changes";

/// The core of the change feed actor.
///
/// Polls the tracker for issues updated since the last successful poll and
/// fans the resulting ID batches out to every subscribed receiver. Batches
/// injected through [`ChangeFeed::record`] take the same path as polled
/// ones. Receivers that have gone away are pruned on delivery failure.
pub struct Core {
    /// The tracker API actor used for polling
    api: TrackerApi,
    /// Logging actor
    log: Log,
    /// Time between polls of the tracker
    poll_interval: Duration,
    /// Instant the next poll asks about; advanced only on success
    cursor: DateTime<Utc>,
    /// Registered receivers for change batches
    subscribers: Vec<mpsc::Sender<HashSet<IssueId>>>,
}

impl Core {
    /// Creates a new change feed core instance.
    pub fn new(api: TrackerApi, log: Log, poll_interval: Duration) -> Self {
        Self {
            api,
            log,
            poll_interval,
            cursor: Utc::now(),
            subscribers: Vec::new(),
        }
    }

    /// Transforms the change feed core instance into an actor.
    ///
    /// # Returns
    /// A tuple containing:
    /// - The [`ChangeFeed`] interface
    /// - A join handle for the spawned task
    pub fn spawn(mut self) -> (ChangeFeed, JoinHandle<()>) {
        let (tx, mut rx) = tokio::sync::mpsc::channel(32);

        let handle = tokio::spawn(async move {
            let mut ticker = tokio::time::interval(self.poll_interval);
            ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
            // The first tick fires immediately; skip it so spawning does not
            // race the initial cursor.
            ticker.tick().await;

            loop {
                tokio::select! {
                    msg = rx.recv() => match msg {
                        Some(Message::Subscribe { tx }) => {
                            let (batch_tx, batch_rx) = mpsc::channel(32);
                            self.subscribers.push(batch_tx);
                            let _ = tx.send(batch_rx);
                        }
                        Some(Message::Record { issues }) => {
                            self.broadcast(issues).await;
                        }
                        None => break,
                    },
                    _ = ticker.tick() => self.poll().await,
                }
            }
        });

        (ChangeFeed::Actual(tx), handle)
    }

    /// Asks the tracker for issues updated since the cursor and fans any
    /// non-empty batch out. The cursor only advances on a successful poll,
    /// so changes are re-reported rather than lost after a failure.
    async fn poll(&mut self) {
        let poll_started = Utc::now();
        match self.api.changed_since(self.cursor).await {
            Ok(issues) => {
                self.cursor = poll_started;
                if !issues.is_empty() {
                    self.log
                        .info(SCOPE, format!("Poll reported changed issues {:?}", issues));
                    self.broadcast(issues).await;
                }
            }
            Err(err) => {
                self.log
                    .warn(SCOPE, format!("Poll failed, keeping cursor: {:#}", err));
            }
        }
    }

    /// Delivers a batch to every live subscriber, dropping the closed ones.
    async fn broadcast(&mut self, issues: HashSet<IssueId>) {
        let mut live = Vec::with_capacity(self.subscribers.len());
        for subscriber in self.subscribers.drain(..) {
            if subscriber.send(issues.clone()).await.is_ok() {
                live.push(subscriber);
            }
        }
        self.subscribers = live;
    }
}
