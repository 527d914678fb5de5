use std::collections::HashSet;

use crate::IssueId;

/// Messages that can be sent to the ChangeFeed actor.
#[derive(Debug)]
pub enum Message {
    /// Registers a new receiver for future change batches
    Subscribe {
        tx: tokio::sync::oneshot::Sender<tokio::sync::mpsc::Receiver<HashSet<IssueId>>>,
    },
    /// Injects a change batch by hand, bypassing the poller
    Record { issues: HashSet<IssueId> },
}
