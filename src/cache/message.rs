use std::collections::HashSet;

use super::data::{Listener, SubscriptionId};
use crate::loader::LoadResult;
use crate::{ArcSlice, FieldId, FieldValue, IssueId};

/// Messages that can be sent to the IssueCache actor.
///
/// The first four correspond to the public API; the last two arrive from the
/// change-feed bridge and from completed load tasks, which is how every
/// mutation of cache state funnels through the one mailbox.
#[derive(Debug)]
pub enum Message {
    /// Registers a listener for a set of issues
    Subscribe {
        issues: HashSet<IssueId>,
        listener: Listener,
        tx: tokio::sync::oneshot::Sender<SubscriptionId>,
    },
    /// Removes a subscription; the reply confirms eviction has happened
    Unsubscribe {
        subscription: SubscriptionId,
        tx: tokio::sync::oneshot::Sender<()>,
    },
    /// Reads one stored field value
    GetField {
        issue: IssueId,
        field: FieldId,
        tx: tokio::sync::oneshot::Sender<Option<FieldValue>>,
    },
    /// Reads the fixed field set
    GetFieldIds {
        tx: tokio::sync::oneshot::Sender<ArcSlice<FieldId>>,
    },
    /// A change-feed batch: these issues may have changed
    IssuesChanged { issues: HashSet<IssueId> },
    /// A load finished; diff and notify
    LoadFinished { result: LoadResult },
}
