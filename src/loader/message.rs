use std::collections::HashSet;

use super::data::LoadResult;
use crate::{ArcSlice, FieldId, IssueId};

/// Messages that can be sent to the IssueLoader actor.
#[derive(Debug)]
pub enum Message {
    /// Fetches the given fields of the given issues
    Load {
        issues: HashSet<IssueId>,
        fields: ArcSlice<FieldId>,
        tx: tokio::sync::oneshot::Sender<LoadResult>,
    },
}
