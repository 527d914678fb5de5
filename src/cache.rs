use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use anyhow::Context;
use tokio::sync::{Mutex, mpsc::Sender, oneshot};

use crate::loader::IssueLoader;
use crate::{
    ArcSlice, ArcStr, FieldId, FieldValue, FieldValues, IssueId, changes::ChangeFeed, log::Log,
};

mod core;
mod data;
pub mod message;
mod mock;
#[cfg(test)]
mod tests;

pub use data::{IssueUpdate, Listener, SubscriptionId};
use message::Message;

/// The issue cache actor: a live, in-memory cache of a fixed set of fields
/// for the issues someone is subscribed to.
///
/// Subscribers register a [`Listener`] for a set of issue IDs and from then
/// on receive an [`IssueUpdate`] whenever any tracked field of a subscribed
/// issue actually changes. Values already in the cache are replayed to a new
/// subscriber immediately; missing ones are fetched from the bulk loader.
/// When the change feed reports issues as possibly changed, the cache
/// reloads exactly the watched subset and notifies only if the diff against
/// the stored values is non-empty.
///
/// An issue stays cached for as long as at least one subscription covers it;
/// when the last one goes away, its values are evicted, so memory is bounded
/// by live subscriptions rather than by history.
///
/// # Examples
/// ```ignore
/// let cache = IssueCache::spawn(changes, loader, log, fields).await;
/// let (listener, mut updates) = Listener::channel();
/// let subscription = cache.subscribe(HashSet::from([1, 2]), listener).await;
/// while let Some(update) = updates.recv().await { /* ... */ }
/// cache.unsubscribe(subscription).await;
/// ```
///
/// # Thread Safety
/// This type is designed to be safely shared between threads. Cloning is
/// cheap as it only copies the channel sender or mock reference. All cache
/// state is confined to the actor task, so operations never race.
#[derive(Debug, Clone)]
pub enum IssueCache {
    /// A real issue cache actor
    Actual(Sender<Message>),
    /// A mock implementation serving prefilled values
    Mock(Arc<Mutex<mock::MockCache>>),
}

impl IssueCache {
    /// Creates a new issue cache actor and spawns its core.
    ///
    /// # Arguments
    /// * `changes` - The change feed announcing possibly-changed issues
    /// * `loader` - The bulk loader fetching field values
    /// * `log` - The logging actor
    /// * `fields` - The field set to request and store, fixed for the
    ///   cache's lifetime
    pub async fn spawn(
        changes: ChangeFeed,
        loader: IssueLoader,
        log: Log,
        fields: ArcSlice<FieldId>,
    ) -> Self {
        let (cache, _) = core::Core::new(changes, loader, log, fields).spawn().await;
        cache
    }

    /// Creates a new mock cache with the given field set and prefilled
    /// values.
    pub fn mock(fields: ArcSlice<FieldId>, values: HashMap<IssueId, FieldValues>) -> Self {
        Self::Mock(Arc::new(Mutex::new(mock::MockCache::new(fields, values))))
    }

    /// Subscribes a listener to updates on the specified issues.
    ///
    /// Values already cached are replayed to the listener before this call
    /// returns, one update per issue with the full stored value; the rest is
    /// requested from the loader in a single bulk load. Subscribing the same
    /// listener again creates a second, independent subscription.
    ///
    /// # Returns
    /// The handle to pass to [`unsubscribe`](Self::unsubscribe).
    pub async fn subscribe(
        &self,
        issues: HashSet<IssueId>,
        listener: Listener,
    ) -> SubscriptionId {
        match self {
            Self::Actual(sender) => {
                let (tx, rx) = oneshot::channel();
                sender
                    .send(Message::Subscribe {
                        issues,
                        listener,
                        tx,
                    })
                    .await
                    .context("Sending message to IssueCache actor")
                    .expect("IssueCache actor died");
                rx.await
                    .context("Awaiting response from IssueCache actor")
                    .expect("IssueCache actor died")
            }
            Self::Mock(cache) => cache.lock().await.subscribe(issues, listener),
        }
    }

    /// Removes a subscription.
    ///
    /// Issues that lose their last watcher are evicted before this call
    /// returns; a load still in flight for such an issue completes into the
    /// void.
    pub async fn unsubscribe(&self, subscription: SubscriptionId) {
        match self {
            Self::Actual(sender) => {
                let (tx, rx) = oneshot::channel();
                sender
                    .send(Message::Unsubscribe { subscription, tx })
                    .await
                    .context("Sending message to IssueCache actor")
                    .expect("IssueCache actor died");
                rx.await
                    .context("Awaiting response from IssueCache actor")
                    .expect("IssueCache actor died")
            }
            Self::Mock(cache) => cache.lock().await.unsubscribe(subscription),
        }
    }

    /// Returns the currently stored value of one field of one issue.
    ///
    /// A pure read: it never causes a tracker request. Returns `None` for an
    /// uncached issue and for a field the cache does not track.
    pub async fn field(&self, issue: IssueId, field: &str) -> Option<FieldValue> {
        let field = ArcStr::from(field);
        match self {
            Self::Actual(sender) => {
                let (tx, rx) = oneshot::channel();
                sender
                    .send(Message::GetField { issue, field, tx })
                    .await
                    .context("Sending message to IssueCache actor")
                    .expect("IssueCache actor died");
                rx.await
                    .context("Awaiting response from IssueCache actor")
                    .expect("IssueCache actor died")
            }
            Self::Mock(cache) => cache.lock().await.field(issue, &field),
        }
    }

    /// Returns the field set the cache requests and stores for each issue,
    /// fixed at construction.
    pub async fn field_ids(&self) -> ArcSlice<FieldId> {
        match self {
            Self::Actual(sender) => {
                let (tx, rx) = oneshot::channel();
                sender
                    .send(Message::GetFieldIds { tx })
                    .await
                    .context("Sending message to IssueCache actor")
                    .expect("IssueCache actor died");
                rx.await
                    .context("Awaiting response from IssueCache actor")
                    .expect("IssueCache actor died")
            }
            Self::Mock(cache) => cache.lock().await.fields.clone(),
        }
    }
}
