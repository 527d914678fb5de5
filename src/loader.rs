use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use anyhow::Context;
use tokio::sync::{Mutex, mpsc::Sender, oneshot};

use crate::{ArcSlice, FieldId, FieldValues, IssueId, api::TrackerApi, log::Log};

mod core;
mod data;
pub mod message;
mod mock;
#[cfg(test)]
mod tests;

pub use data::LoadResult;
use message::Message;

/// The bulk loader actor: given a set of issue IDs and a field set, it
/// asynchronously produces the current field values for the subset of those
/// issues the tracker knows about.
///
/// Loads are errorless by contract. The real actor retries failed tracker
/// requests internally until they succeed, so `load` resolves eventually or
/// never, but it does not fail. The mock parks every call until the test
/// resolves it, which is how tests model an in-flight request.
///
/// # Examples
/// ```ignore
/// let loader = IssueLoader::spawn(api, log);
/// let result = loader.load(issues, fields).await;
/// ```
#[derive(Debug, Clone)]
pub enum IssueLoader {
    /// A real loader actor fetching through the tracker API
    Actual(Sender<Message>),
    /// A mock implementation resolved by tests
    Mock(Arc<Mutex<mock::MockLoads>>),
}

impl IssueLoader {
    /// Creates a new issue loader actor and spawns its core.
    pub fn spawn(api: TrackerApi, log: Log) -> Self {
        let (loader, _) = core::Core::new(api, log).spawn();
        loader
    }

    /// Creates a new mock loader for testing.
    pub fn mock() -> Self {
        Self::Mock(Arc::new(Mutex::new(mock::MockLoads::default())))
    }

    /// Fetches the given fields of the given issues.
    ///
    /// Resolves with values for the subset of `issues` the tracker knows
    /// about; every reported issue carries a complete value for every
    /// requested field. Does not fail: the loader keeps retrying internally.
    pub async fn load(&self, issues: HashSet<IssueId>, fields: ArcSlice<FieldId>) -> LoadResult {
        match self {
            Self::Actual(sender) => {
                let (tx, rx) = oneshot::channel();
                sender
                    .send(Message::Load { issues, fields, tx })
                    .await
                    .context("Sending message to IssueLoader actor")
                    .expect("IssueLoader actor died");
                rx.await
                    .context("Awaiting response from IssueLoader actor")
                    .expect("IssueLoader actor died")
            }
            Self::Mock(loads) => {
                let (tx, rx) = oneshot::channel();
                {
                    let mut loads = loads.lock().await;
                    let mut issues: Vec<IssueId> = issues.into_iter().collect();
                    issues.sort_unstable();
                    loads.pending.push_back(mock::PendingLoad { issues, fields, tx });
                }
                // A dropped pending load resolves to an empty result.
                rx.await.unwrap_or_default()
            }
        }
    }

    /// The issue IDs of every pending mock request, oldest first. Empty for
    /// the real actor.
    pub async fn pending_requests(&self) -> Vec<Vec<IssueId>> {
        match self {
            Self::Actual(_) => Vec::new(),
            Self::Mock(loads) => loads.lock().await.requests(),
        }
    }

    /// Resolves the oldest pending mock request with the given values.
    /// No-op for the real actor.
    ///
    /// # Panics
    /// Panics if no request is pending or if `values` reports an issue the
    /// request did not ask for.
    pub async fn reply(&self, values: HashMap<IssueId, FieldValues>) {
        if let Self::Mock(loads) = self {
            loads.lock().await.reply(values);
        }
    }
}
