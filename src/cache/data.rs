use std::collections::{HashMap, HashSet};
use std::fmt::Display;

use tokio::sync::mpsc;

use crate::{FieldValues, IssueId};

/// An opaque handle identifying one `subscribe` call.
///
/// Unsubscription is keyed on this handle rather than on listener identity,
/// so registering the same listener twice yields two independently removable
/// subscriptions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SubscriptionId(u64);

impl SubscriptionId {
    /// Builds a handle directly, outside the allocator. Only the mock cache
    /// needs this.
    pub(crate) fn mock(id: u64) -> Self {
        Self(id)
    }
}

impl Display for SubscriptionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "sub-{}", self.0)
    }
}

/// One notification delivered to a listener: the issue that changed and the
/// fields that actually differ from what was cached before.
#[derive(Debug, Clone, PartialEq)]
pub struct IssueUpdate {
    /// The issue whose fields changed
    pub issue: IssueId,
    /// Only the changed fields, with their new values
    pub changed: FieldValues,
}

/// The receiving end a subscriber hands to the cache.
///
/// Wraps an unbounded sender so the cache never blocks on a slow consumer;
/// delivery to a dropped receiver is silently discarded, the subscription
/// itself stays until unsubscribed.
#[derive(Debug, Clone)]
pub struct Listener {
    tx: mpsc::UnboundedSender<IssueUpdate>,
}

impl Listener {
    /// Creates a listener and the channel its updates arrive on.
    pub fn channel() -> (Self, mpsc::UnboundedReceiver<IssueUpdate>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx }, rx)
    }

    /// Delivers one update.
    pub(crate) fn notify(&self, issue: IssueId, changed: FieldValues) {
        let _ = self.tx.send(IssueUpdate { issue, changed });
    }
}

/// The issue set and listener registered by one `subscribe` call.
#[derive(Debug)]
pub struct Subscription {
    /// The issues this subscription covers
    pub issues: HashSet<IssueId>,
    /// The listener to notify
    pub listener: Listener,
}

/// The cache's entire mutable state: subscriptions, the per-issue watcher
/// index and the stored field values.
///
/// Invariants maintained by [`register`](Data::register) and
/// [`remove`](Data::remove):
/// - `values` has an entry for an issue iff `watchers` has a non-empty list
///   for it (modulo values not yet loaded);
/// - a watcher list is never stored empty, it is deleted instead.
#[derive(Debug, Default)]
pub struct Data {
    /// All live subscriptions by handle
    subscriptions: HashMap<SubscriptionId, Subscription>,
    /// Issue ID to the subscriptions watching it, in registration order
    watchers: HashMap<IssueId, Vec<SubscriptionId>>,
    /// Stored field values per issue
    values: HashMap<IssueId, FieldValues>,
    /// Source of the next subscription handle
    next_subscription: u64,
}

impl Data {
    /// Registers a subscription covering `issues`, returning its handle.
    pub fn register(&mut self, issues: HashSet<IssueId>, listener: Listener) -> SubscriptionId {
        let id = SubscriptionId(self.next_subscription);
        self.next_subscription += 1;

        for issue in &issues {
            self.watchers.entry(*issue).or_default().push(id);
        }
        self.subscriptions
            .insert(id, Subscription { issues, listener });
        id
    }

    /// Removes a subscription, evicting the stored values of every issue
    /// that loses its last watcher.
    ///
    /// # Returns
    /// The evicted issue IDs, or `None` if the handle is unknown.
    pub fn remove(&mut self, id: SubscriptionId) -> Option<Vec<IssueId>> {
        let subscription = self.subscriptions.remove(&id)?;

        let mut evicted = Vec::new();
        for issue in subscription.issues {
            let Some(watching) = self.watchers.get_mut(&issue) else {
                continue;
            };
            watching.retain(|watcher| *watcher != id);
            if watching.is_empty() {
                self.watchers.remove(&issue);
                self.values.remove(&issue);
                evicted.push(issue);
            }
        }
        Some(evicted)
    }

    /// Whether any subscription currently covers the issue.
    pub fn is_watched(&self, issue: IssueId) -> bool {
        self.watchers.contains_key(&issue)
    }

    /// The subset of `issues` that currently has watchers.
    pub fn watched_subset(&self, issues: &HashSet<IssueId>) -> HashSet<IssueId> {
        issues
            .iter()
            .copied()
            .filter(|issue| self.is_watched(*issue))
            .collect()
    }

    /// The listeners of every subscription watching the issue, in
    /// registration order.
    pub fn listeners_of(&self, issue: IssueId) -> Vec<&Listener> {
        self.watchers
            .get(&issue)
            .into_iter()
            .flatten()
            .filter_map(|id| self.subscriptions.get(id))
            .map(|subscription| &subscription.listener)
            .collect()
    }

    /// The stored field values of the issue, if loaded.
    pub fn value_of(&self, issue: IssueId) -> Option<&FieldValues> {
        self.values.get(&issue)
    }

    /// Replaces the stored field values of the issue wholesale.
    pub fn store(&mut self, issue: IssueId, values: FieldValues) {
        self.values.insert(issue, values);
    }
}
