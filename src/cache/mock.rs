use std::collections::HashMap;

use super::data::{Listener, SubscriptionId};
use crate::{ArcSlice, FieldId, FieldValue, FieldValues, IssueId};

/// Mock implementation of the IssueCache actor for testing purposes.
///
/// Serves reads and subscription replay from a prefilled value map; no
/// loading, change handling or eviction happens. Subscriptions only count
/// handles so unsubscribe can be called symmetrically.
#[derive(Debug)]
pub struct MockCache {
    /// The fixed field set
    pub fields: ArcSlice<FieldId>,
    /// Prefilled field values per issue
    pub values: HashMap<IssueId, FieldValues>,
    /// Source of the next fake subscription handle
    registered: Vec<SubscriptionId>,
    next_subscription: u64,
}

impl MockCache {
    /// Creates a new mock with the given field set and prefilled values.
    pub fn new(fields: ArcSlice<FieldId>, values: HashMap<IssueId, FieldValues>) -> Self {
        Self {
            fields,
            values,
            registered: Vec::new(),
            next_subscription: 0,
        }
    }

    pub fn subscribe(
        &mut self,
        issues: std::collections::HashSet<IssueId>,
        listener: Listener,
    ) -> SubscriptionId {
        for issue in issues {
            if let Some(values) = self.values.get(&issue) {
                listener.notify(issue, values.clone());
            }
        }
        let id = SubscriptionId::mock(self.next_subscription);
        self.next_subscription += 1;
        self.registered.push(id);
        id
    }

    pub fn unsubscribe(&mut self, subscription: SubscriptionId) {
        self.registered.retain(|id| *id != subscription);
    }

    pub fn field(&self, issue: IssueId, field: &FieldId) -> Option<FieldValue> {
        if !self.fields.contains(field) {
            return None;
        }
        self.values
            .get(&issue)
            .and_then(|values| values.get(field))
            .cloned()
    }
}
