use std::collections::HashSet;

use tokio::sync::mpsc::Sender;
use tokio::task::JoinHandle;

use super::data::{Data, Listener, SubscriptionId};
use super::message::Message;
use crate::loader::{IssueLoader, LoadResult};
use crate::{
    ArcSlice, FieldId, FieldValue, FieldValues, IssueId, changes::ChangeFeed, log::Log,
};

const SCOPE: &str = "cache";

/// The core of the issue cache actor: subscription bookkeeping, load
/// orchestration and the diff/notify path.
///
/// All state lives inside the actor task and every operation (public calls,
/// change-feed batches, load completions) is one message on one mailbox, so
/// mutations never race. The only asynchronous boundary is the loader call,
/// which runs in its own task and posts its result back as a message;
/// between issuing a load and handling its completion, any number of other
/// messages may interleave, which is why load completion re-checks watcher
/// presence before storing or notifying anything.
pub struct Core {
    /// The change feed announcing possibly-changed issues
    changes: ChangeFeed,
    /// The bulk loader fetching field values
    loader: IssueLoader,
    /// Logging actor
    log: Log,
    /// The fixed field set, in construction order
    fields: ArcSlice<FieldId>,
    /// The same field set, for membership checks
    field_set: HashSet<FieldId>,
    /// Subscriptions, watcher index and stored values
    data: Data,
    /// The actor's own mailbox, for load completions; set at spawn time
    mailbox: Option<Sender<Message>>,
}

impl Core {
    /// Creates a new issue cache core instance.
    pub fn new(changes: ChangeFeed, loader: IssueLoader, log: Log, fields: ArcSlice<FieldId>) -> Self {
        let field_set = fields.iter().cloned().collect();
        Self {
            changes,
            loader,
            log,
            fields,
            field_set,
            data: Data::default(),
            mailbox: None,
        }
    }

    /// Transforms the issue cache core instance into an actor.
    ///
    /// Subscribes to the change feed and bridges its batches into the
    /// mailbox, so change handling is serialized with everything else.
    ///
    /// # Returns
    /// A tuple containing:
    /// - The [`super::IssueCache`] interface
    /// - A join handle for the spawned task
    pub async fn spawn(mut self) -> (super::IssueCache, JoinHandle<()>) {
        let (tx, mut rx) = tokio::sync::mpsc::channel(crate::BUFFER_SIZE);
        self.mailbox = Some(tx.clone());

        let mut updates = self.changes.subscribe().await;
        let bridge = tx.clone();
        tokio::spawn(async move {
            while let Some(issues) = updates.recv().await {
                if bridge.send(Message::IssuesChanged { issues }).await.is_err() {
                    break;
                }
            }
        });

        let handle = tokio::spawn(async move {
            while let Some(message) = rx.recv().await {
                match message {
                    Message::Subscribe {
                        issues,
                        listener,
                        tx,
                    } => {
                        let id = self.handle_subscribe(issues, listener);
                        let _ = tx.send(id);
                    }
                    Message::Unsubscribe { subscription, tx } => {
                        self.handle_unsubscribe(subscription);
                        let _ = tx.send(());
                    }
                    Message::GetField { issue, field, tx } => {
                        let _ = tx.send(self.handle_get_field(issue, &field));
                    }
                    Message::GetFieldIds { tx } => {
                        let _ = tx.send(self.fields.clone());
                    }
                    Message::IssuesChanged { issues } => {
                        self.handle_issues_changed(issues);
                    }
                    Message::LoadFinished { result } => {
                        self.handle_load_finished(result);
                    }
                }
            }
        });

        (super::IssueCache::Actual(tx), handle)
    }

    /// Registers a subscription, replays already-cached values to the new
    /// listener and issues one load for whatever is missing.
    ///
    /// The replay happens before the subscribe reply is sent, so by the time
    /// the caller's `subscribe` returns, the replayed updates are already in
    /// its channel.
    fn handle_subscribe(&mut self, issues: HashSet<IssueId>, listener: Listener) -> SubscriptionId {
        self.log
            .info(SCOPE, format!("New subscription for issues {:?}", issues));

        let mut missing = HashSet::new();
        for issue in &issues {
            match self.data.value_of(*issue) {
                Some(values) => listener.notify(*issue, values.clone()),
                None => {
                    missing.insert(*issue);
                }
            }
        }

        let id = self.data.register(issues, listener);
        self.spawn_load(missing);
        id
    }

    /// Removes a subscription and evicts issues that lost their last
    /// watcher. An in-flight load for an evicted issue is not aborted; its
    /// result is dropped at completion time by the watcher re-check.
    fn handle_unsubscribe(&mut self, subscription: SubscriptionId) {
        match self.data.remove(subscription) {
            Some(evicted) if evicted.is_empty() => {}
            Some(evicted) => {
                self.log.info(
                    SCOPE,
                    format!(
                        "Last watcher of issues {:?} unsubscribed, evicting",
                        evicted
                    ),
                );
            }
            None => {
                self.log
                    .warn(SCOPE, format!("Unknown subscription {}", subscription));
            }
        }
    }

    /// Reads a stored field value. Never triggers a load: an unknown field
    /// or an uncached issue is a soft miss, not a fault.
    fn handle_get_field(&self, issue: IssueId, field: &FieldId) -> Option<FieldValue> {
        if !self.field_set.contains(field) {
            self.log
                .warn(SCOPE, format!("Field {} is not tracked by the cache", field));
            return None;
        }

        self.data
            .value_of(issue)
            .and_then(|values| values.get(field))
            .cloned()
    }

    /// Intersects a change batch with the watched issues and issues one load
    /// for the intersection. Unwatched issues never cause a load.
    fn handle_issues_changed(&mut self, issues: HashSet<IssueId>) {
        self.log
            .info(SCOPE, format!("Change feed reported issues {:?}", issues));
        let watched = self.data.watched_subset(&issues);
        self.spawn_load(watched);
    }

    /// Issues one load for the given issues; a no-op for an empty set. The
    /// load runs in its own task and posts its result back to the mailbox.
    fn spawn_load(&self, issues: HashSet<IssueId>) {
        if issues.is_empty() {
            return;
        }
        let Some(mailbox) = self.mailbox.clone() else {
            return;
        };

        self.log
            .info(SCOPE, format!("Requesting load of issues {:?}", issues));
        let loader = self.loader.clone();
        let fields = self.fields.clone();
        tokio::spawn(async move {
            let result = loader.load(issues, fields).await;
            let _ = mailbox.send(Message::LoadFinished { result }).await;
        });
    }

    /// Diffs a load result against the stored values and notifies watchers
    /// of actual changes.
    ///
    /// Per reported issue: an issue with no stored value counts as entirely
    /// changed; otherwise only fields whose value differs count. An empty
    /// changed set means no store mutation and no notification. An issue
    /// with no watchers left is dropped entirely, which is what makes
    /// unsubscribe-during-load safe.
    fn handle_load_finished(&mut self, result: LoadResult) {
        for (issue, new_values) in result.into_values() {
            let changed = self.changed_fields(issue, &new_values);
            if changed.is_empty() {
                continue;
            }

            let listeners = self.data.listeners_of(issue);
            if listeners.is_empty() {
                self.log.info(
                    SCOPE,
                    format!("Dropping load result for unwatched issue {}", issue),
                );
                continue;
            }

            self.log.info(
                SCOPE,
                format!("Issue {} changed fields {:?}", issue, changed.keys()),
            );
            for listener in listeners {
                listener.notify(issue, changed.clone());
            }
            self.data.store(issue, new_values);
        }
    }

    /// The subset of `new_values` that differs from what is stored.
    ///
    /// A missing previous value and a missing previous field entry are
    /// distinct cases: with no previous value everything counts as changed,
    /// while a previous value is compared field by field.
    fn changed_fields(&self, issue: IssueId, new_values: &FieldValues) -> FieldValues {
        match self.data.value_of(issue) {
            None => new_values.clone(),
            Some(old_values) => new_values
                .iter()
                .filter(|(field, value)| old_values.get(*field) != Some(*value))
                .map(|(field, value)| (field.clone(), value.clone()))
                .collect(),
        }
    }
}
