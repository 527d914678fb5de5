use std::collections::{HashMap, HashSet};

use chrono::{DateTime, Utc};

use crate::{ArcSlice, FieldId, FieldValues, IssueId};

/// Messages that can be sent to the TrackerApi actor.
#[derive(Debug)]
pub enum Message {
    /// Fetches the given fields of the given issues in one search request
    FetchFields {
        issues: HashSet<IssueId>,
        fields: ArcSlice<FieldId>,
        tx: tokio::sync::oneshot::Sender<anyhow::Result<HashMap<IssueId, FieldValues>>>,
    },
    /// Fetches the IDs of issues updated at or after the given instant
    ChangedSince {
        since: DateTime<Utc>,
        tx: tokio::sync::oneshot::Sender<anyhow::Result<HashSet<IssueId>>>,
    },
}
