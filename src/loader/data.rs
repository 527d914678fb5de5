use std::collections::HashMap;

use crate::{FieldValues, IssueId};

/// The outcome of one bulk load.
///
/// Carries values for the subset of requested issues the tracker knows
/// about. Every reported issue has a complete value for every requested
/// field.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LoadResult {
    values: HashMap<IssueId, FieldValues>,
}

impl LoadResult {
    /// Wraps per-issue field values into a load result.
    pub fn new(values: HashMap<IssueId, FieldValues>) -> Self {
        Self { values }
    }

    /// The IDs of the issues this result has values for.
    pub fn issues(&self) -> impl Iterator<Item = IssueId> + '_ {
        self.values.keys().copied()
    }

    /// The field values reported for one issue, if it was resolved.
    pub fn values(&self, issue: IssueId) -> Option<&FieldValues> {
        self.values.get(&issue)
    }

    /// Consumes the result, yielding the per-issue field values.
    pub fn into_values(self) -> HashMap<IssueId, FieldValues> {
        self.values
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}
