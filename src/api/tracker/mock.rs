use std::collections::{HashMap, HashSet, VecDeque};

use crate::{ArcSlice, FieldId, FieldValues, IssueId};

/// Mock implementation of the TrackerApi actor for testing purposes.
///
/// Serves field values from an in-memory map and change batches from a
/// queue. A configurable number of upcoming calls can be made to fail, to
/// exercise retry paths.
#[derive(Debug, Default)]
pub struct MockTracker {
    /// Field values per issue, as the tracker would report them
    pub values: HashMap<IssueId, FieldValues>,
    /// Queued change batches, returned one per `changed_since` call
    pub changed: VecDeque<HashSet<IssueId>>,
    /// Number of upcoming calls that fail before the mock recovers
    pub failures: usize,
}

impl MockTracker {
    fn take_failure(&mut self) -> bool {
        if self.failures > 0 {
            self.failures -= 1;
            true
        } else {
            false
        }
    }

    pub fn fetch_fields(
        &mut self,
        issues: &HashSet<IssueId>,
        fields: &ArcSlice<FieldId>,
    ) -> anyhow::Result<HashMap<IssueId, FieldValues>> {
        if self.take_failure() {
            anyhow::bail!("injected tracker failure");
        }

        let mut result = HashMap::new();
        for id in issues {
            let Some(stored) = self.values.get(id) else {
                continue;
            };
            let mut issue_values = FieldValues::with_capacity(fields.len());
            for field in fields.iter() {
                let value = stored
                    .get(field)
                    .cloned()
                    .unwrap_or(serde_json::Value::Null);
                issue_values.insert(field.clone(), value);
            }
            result.insert(*id, issue_values);
        }
        Ok(result)
    }

    pub fn changed_since(&mut self) -> anyhow::Result<HashSet<IssueId>> {
        if self.take_failure() {
            anyhow::bail!("injected tracker failure");
        }
        Ok(self.changed.pop_front().unwrap_or_default())
    }
}
