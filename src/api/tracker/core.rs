use std::collections::{HashMap, HashSet};

use anyhow::Context;
use chrono::{DateTime, Utc};
use tokio::task::JoinHandle;

use super::{TrackerApi, message::Message, parse};
use crate::{ArcSlice, ArcStr, FieldId, FieldValues, IssueId, net::Net};

/// Upper bound on issues returned by one changed-since search.
const CHANGE_PAGE_SIZE: usize = 1000;

/// The core of the tracker API actor that builds and interprets search
/// requests against a Jira-style REST endpoint.
///
/// All requests go through the `/rest/api/2/search` resource: bulk field
/// fetches use an `id in (...)` JQL clause, change detection an
/// `updated >= "..."` clause.
#[derive(Debug)]
pub struct Core {
    /// The networking actor for making HTTP requests
    net: Net,
    /// The base URL of the tracker
    base_url: ArcStr,
    /// Bearer token for the tracker; empty means unauthenticated
    token: ArcStr,
}

impl Core {
    /// Creates a new tracker API core instance.
    pub fn new(net: Net, base_url: ArcStr, token: ArcStr) -> Self {
        Self {
            net,
            base_url,
            token,
        }
    }

    /// Transforms the tracker API core instance into an actor.
    ///
    /// # Returns
    /// A tuple containing:
    /// - The [`TrackerApi`] interface
    /// - A join handle for the spawned task
    pub fn spawn(self) -> (TrackerApi, JoinHandle<()>) {
        let (tx, mut rx) = tokio::sync::mpsc::channel(100);

        let handle = tokio::spawn(async move {
            while let Some(message) = rx.recv().await {
                match message {
                    Message::FetchFields { issues, fields, tx } => {
                        let response = self
                            .handle_fetch_fields(&issues, &fields)
                            .await
                            .with_context(|| format!("Fetching fields of issues {:?}", issues));
                        let _ = tx.send(response);
                    }
                    Message::ChangedSince { since, tx } => {
                        let response = self
                            .handle_changed_since(since)
                            .await
                            .with_context(|| format!("Fetching issues changed since {}", since));
                        let _ = tx.send(response);
                    }
                }
            }
        });

        (TrackerApi::Actual(tx), handle)
    }

    async fn handle_fetch_fields(
        &self,
        issues: &HashSet<IssueId>,
        fields: &ArcSlice<FieldId>,
    ) -> anyhow::Result<HashMap<IssueId, FieldValues>> {
        let mut ids: Vec<IssueId> = issues.iter().copied().collect();
        ids.sort_unstable();
        let id_list = ids
            .iter()
            .map(IssueId::to_string)
            .collect::<Vec<_>>()
            .join(",");

        let field_names: Vec<&str> = fields.iter().map(|f| &**f).collect();
        let payload = serde_json::json!({
            "jql": format!("id in ({})", id_list),
            "fields": field_names,
            "startAt": 0,
            "maxResults": ids.len(),
        });

        let response = self
            .net
            .post(
                self.search_url(),
                Some(self.headers()),
                Some(ArcStr::from(payload.to_string())),
            )
            .await?;

        parse::parse_search_values(&response, fields).context("Parsing search response")
    }

    async fn handle_changed_since(
        &self,
        since: DateTime<Utc>,
    ) -> anyhow::Result<HashSet<IssueId>> {
        let payload = serde_json::json!({
            "jql": format!(
                "updated >= \"{}\" order by updated",
                since.format("%Y-%m-%d %H:%M")
            ),
            "fields": ["updated"],
            "startAt": 0,
            "maxResults": CHANGE_PAGE_SIZE,
        });

        let response = self
            .net
            .post(
                self.search_url(),
                Some(self.headers()),
                Some(ArcStr::from(payload.to_string())),
            )
            .await?;

        parse::parse_search_ids(&response).context("Parsing search response")
    }

    fn search_url(&self) -> ArcStr {
        ArcStr::from(format!(
            "{}/rest/api/2/search",
            self.base_url.trim_end_matches('/')
        ))
    }

    fn headers(&self) -> HashMap<ArcStr, ArcStr> {
        let mut headers = HashMap::new();
        headers.insert(ArcStr::from("Content-Type"), ArcStr::from("application/json"));
        headers.insert(ArcStr::from("Accept"), ArcStr::from("application/json"));
        if !self.token.is_empty() {
            headers.insert(
                ArcStr::from("Authorization"),
                ArcStr::from(format!("Bearer {}", self.token)),
            );
        }
        headers
    }
}
