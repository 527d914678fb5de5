use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use anyhow::Context;
use chrono::{DateTime, Utc};
use tokio::sync::{Mutex, mpsc::Sender, oneshot};

use crate::{
    ArcSlice, FieldId, FieldValues, IssueId,
    config::{Config, StrOpt},
    net::Net,
};

mod core;
pub mod message;
mod mock;
pub mod parse;

use message::Message;
pub use parse::ParseError;

/// The tracker API actor that provides a high-level interface for querying a
/// Jira-style issue tracker.
///
/// This actor intermediates calls to the networking actor, providing
/// domain-specific methods for bulk field fetches and change detection
/// against the tracker's search endpoint.
///
/// # Examples
/// ```ignore
/// let api = TrackerApi::spawn(net, config).await;
/// let values = api.fetch_fields(issues, fields).await?;
/// ```
///
/// # Thread Safety
/// This type is designed to be safely shared between threads. Cloning is
/// cheap as it only copies the channel sender or mock reference.
#[derive(Debug, Clone)]
pub enum TrackerApi {
    /// A real tracker API actor that performs HTTP requests
    Actual(Sender<Message>),
    /// A mock implementation for testing
    Mock(Arc<Mutex<mock::MockTracker>>),
}

impl TrackerApi {
    /// Creates a new tracker API actor and spawns its core.
    ///
    /// The tracker base URL and API token are read from the configuration
    /// once, at spawn time.
    pub async fn spawn(net: Net, config: Config) -> Self {
        let base_url = config.str(StrOpt::TrackerUrl).await;
        let token = config.str(StrOpt::ApiToken).await;
        let (api, _) = core::Core::new(net, base_url, token).spawn();
        api
    }

    /// Creates a new empty mock tracker API instance for testing.
    pub fn mock() -> Self {
        Self::Mock(Arc::new(Mutex::new(mock::MockTracker::default())))
    }

    /// Fetches the given fields of the given issues in one search request.
    ///
    /// # Returns
    /// A mapping for the subset of `issues` the tracker knows about; every
    /// reported issue carries a value for every requested field.
    pub async fn fetch_fields(
        &self,
        issues: HashSet<IssueId>,
        fields: ArcSlice<FieldId>,
    ) -> anyhow::Result<HashMap<IssueId, FieldValues>> {
        match self {
            Self::Actual(sender) => {
                let (tx, rx) = oneshot::channel();
                sender
                    .send(Message::FetchFields { issues, fields, tx })
                    .await
                    .context("Sending message to TrackerApi actor")
                    .expect("TrackerApi actor died");
                rx.await
                    .context("Awaiting response from TrackerApi actor")
                    .expect("TrackerApi actor died")
            }
            Self::Mock(data) => {
                let mut data = data.lock().await;
                data.fetch_fields(&issues, &fields)
            }
        }
    }

    /// Fetches the IDs of issues updated at or after the given instant.
    pub async fn changed_since(&self, since: DateTime<Utc>) -> anyhow::Result<HashSet<IssueId>> {
        match self {
            Self::Actual(sender) => {
                let (tx, rx) = oneshot::channel();
                sender
                    .send(Message::ChangedSince { since, tx })
                    .await
                    .context("Sending message to TrackerApi actor")
                    .expect("TrackerApi actor died");
                rx.await
                    .context("Awaiting response from TrackerApi actor")
                    .expect("TrackerApi actor died")
            }
            Self::Mock(data) => {
                let mut data = data.lock().await;
                data.changed_since()
            }
        }
    }

    /// Stores field values for an issue in the mock. No-op for the real
    /// actor.
    pub async fn set_mock_value(&self, issue: IssueId, values: FieldValues) {
        if let Self::Mock(data) = self {
            data.lock().await.values.insert(issue, values);
        }
    }

    /// Queues a change batch in the mock. No-op for the real actor.
    pub async fn queue_mock_changes(&self, issues: HashSet<IssueId>) {
        if let Self::Mock(data) = self {
            data.lock().await.changed.push_back(issues);
        }
    }

    /// Makes the next `count` mock calls fail. No-op for the real actor.
    pub async fn fail_next(&self, count: usize) {
        if let Self::Mock(data) = self {
            data.lock().await.failures = count;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::net::MockRequestKey;
    use crate::{ArcStr, arc_slice};

    fn field_set() -> ArcSlice<FieldId> {
        arc_slice!["key", "summary"]
    }

    #[tokio::test]
    async fn test_mock_fetch_fields_serves_requested_subset() {
        let api = TrackerApi::mock();
        api.set_mock_value(
            1,
            FieldValues::from([(ArcStr::from("key"), serde_json::json!("IH-1"))]),
        )
        .await;

        let values = api
            .fetch_fields(HashSet::from([1, 2]), field_set())
            .await
            .unwrap();
        assert_eq!(values.len(), 1);
        assert_eq!(values[&1][&ArcStr::from("key")], "IH-1");
        // Missing fields are reported as null, like the real endpoint
        assert_eq!(values[&1][&ArcStr::from("summary")], serde_json::Value::Null);
    }

    #[tokio::test]
    async fn test_mock_changed_since_drains_queue() {
        let api = TrackerApi::mock();
        api.queue_mock_changes(HashSet::from([4])).await;

        assert_eq!(
            api.changed_since(Utc::now()).await.unwrap(),
            HashSet::from([4])
        );
        assert!(api.changed_since(Utc::now()).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_mock_injected_failures() {
        let api = TrackerApi::mock();
        api.fail_next(1).await;

        assert!(api.changed_since(Utc::now()).await.is_err());
        assert!(api.changed_since(Utc::now()).await.is_ok());
    }

    #[tokio::test]
    async fn test_actual_fetch_fields_against_mock_net() {
        let net = Net::mock_empty();
        net.set_mock_response(
            MockRequestKey::post("https://tracker.example.com/rest/api/2/search"),
            ArcStr::from(
                r#"{"issues": [{"id": "1", "fields": {"key": "IH-1", "summary": "s"}}]}"#,
            ),
        )
        .await;

        let config = Config::mock(crate::config::Data::default());
        config
            .set_str(StrOpt::TrackerUrl, ArcStr::from("https://tracker.example.com"))
            .await;

        let api = TrackerApi::spawn(net, config).await;
        let values = api
            .fetch_fields(HashSet::from([1]), field_set())
            .await
            .unwrap();
        assert_eq!(values[&1][&ArcStr::from("summary")], "s");
    }
}
