use std::collections::{HashMap, VecDeque};

use tokio::sync::oneshot;

use super::data::LoadResult;
use crate::{ArcSlice, FieldId, FieldValues, IssueId};

/// A load call parked by the mock, waiting for the test to resolve it.
#[derive(Debug)]
pub struct PendingLoad {
    /// The requested issue IDs, sorted for stable assertions
    pub issues: Vec<IssueId>,
    /// The requested field set
    pub fields: ArcSlice<FieldId>,
    /// Resolves the parked `load` call
    pub tx: oneshot::Sender<LoadResult>,
}

/// Mock implementation of the IssueLoader actor for testing purposes.
///
/// Every `load` call is recorded and parked until the test resolves it with
/// [`reply`](MockLoads::reply), mirroring an in-flight request. Requests
/// resolve in FIFO order.
#[derive(Debug, Default)]
pub struct MockLoads {
    /// Parked load calls, oldest first
    pub pending: VecDeque<PendingLoad>,
}

impl MockLoads {
    /// The issue IDs of every pending request, oldest first.
    pub fn requests(&self) -> Vec<Vec<IssueId>> {
        self.pending.iter().map(|load| load.issues.clone()).collect()
    }

    /// Resolves the oldest pending request with the given values.
    ///
    /// # Panics
    /// Panics if no request is pending, or if `values` contains an issue the
    /// request did not ask for. A loader never invents issues.
    pub fn reply(&mut self, values: HashMap<IssueId, FieldValues>) {
        let load = self
            .pending
            .pop_front()
            .expect("reply() called with no pending load");
        for issue in values.keys() {
            assert!(
                load.issues.contains(issue),
                "reply() contains issue {} that was not requested",
                issue
            );
        }
        let _ = load.tx.send(LoadResult::new(values));
    }
}
