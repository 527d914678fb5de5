use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use tokio::sync::{Mutex, mpsc, mpsc::Sender, oneshot};

use crate::{IssueId, api::TrackerApi, log::Log};

mod core;
pub mod message;
mod mock;
#[cfg(test)]
mod tests;

use message::Message;

/// The change feed actor: the upstream source of "these issues may have
/// changed" events.
///
/// Consumers call [`subscribe`](ChangeFeed::subscribe) once and then receive
/// every subsequent batch of possibly-changed issue IDs on the returned
/// channel. Batches may contain unknown or already-consistent IDs; it is the
/// consumer's job to filter them.
///
/// The real actor discovers changes by polling the tracker's search endpoint
/// on a fixed interval. The mock delivers only what tests inject through
/// [`record`](ChangeFeed::record).
///
/// # Examples
/// ```ignore
/// let feed = ChangeFeed::spawn(api, log, Duration::from_secs(30));
/// let mut updates = feed.subscribe().await;
/// while let Some(ids) = updates.recv().await { /* ... */ }
/// ```
#[derive(Debug, Clone)]
pub enum ChangeFeed {
    /// A real change feed actor that polls the tracker
    Actual(Sender<Message>),
    /// A mock implementation fed by tests
    Mock(Arc<Mutex<mock::MockFeed>>),
}

impl ChangeFeed {
    /// Creates a new change feed actor and spawns its core.
    pub fn spawn(api: TrackerApi, log: Log, poll_interval: Duration) -> Self {
        let (feed, _) = core::Core::new(api, log, poll_interval).spawn();
        feed
    }

    /// Creates a new mock change feed for testing.
    pub fn mock() -> Self {
        Self::Mock(Arc::new(Mutex::new(mock::MockFeed::default())))
    }

    /// Registers a receiver for future change batches.
    pub async fn subscribe(&self) -> mpsc::Receiver<HashSet<IssueId>> {
        match self {
            Self::Actual(sender) => {
                let (tx, rx) = oneshot::channel();
                sender
                    .send(Message::Subscribe { tx })
                    .await
                    .context("Sending message to ChangeFeed actor")
                    .expect("ChangeFeed actor died");
                rx.await
                    .context("Awaiting response from ChangeFeed actor")
                    .expect("ChangeFeed actor died")
            }
            Self::Mock(feed) => feed.lock().await.subscribe(),
        }
    }

    /// Injects a change batch by hand, bypassing the poller. Batches take
    /// the same delivery path as polled ones.
    pub async fn record(&self, issues: HashSet<IssueId>) {
        match self {
            Self::Actual(sender) => {
                sender
                    .send(Message::Record { issues })
                    .await
                    .context("Sending message to ChangeFeed actor")
                    .expect("ChangeFeed actor died");
            }
            Self::Mock(feed) => feed.lock().await.record(issues).await,
        }
    }
}
