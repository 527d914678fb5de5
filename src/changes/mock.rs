use std::collections::HashSet;

use tokio::sync::mpsc;

use crate::IssueId;

/// Mock implementation of the ChangeFeed actor for testing purposes.
///
/// Holds the subscriber list in memory; tests fire change batches through
/// [`super::ChangeFeed::record`], which fans them out exactly like the real
/// actor does.
#[derive(Debug, Default)]
pub struct MockFeed {
    subscribers: Vec<mpsc::Sender<HashSet<IssueId>>>,
}

impl MockFeed {
    pub fn subscribe(&mut self) -> mpsc::Receiver<HashSet<IssueId>> {
        let (tx, rx) = mpsc::channel(32);
        self.subscribers.push(tx);
        rx
    }

    pub async fn record(&mut self, issues: HashSet<IssueId>) {
        let mut live = Vec::with_capacity(self.subscribers.len());
        for subscriber in self.subscribers.drain(..) {
            if subscriber.send(issues.clone()).await.is_ok() {
                live.push(subscriber);
            }
        }
        self.subscribers = live;
    }
}
