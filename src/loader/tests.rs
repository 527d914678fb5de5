use std::collections::{HashMap, HashSet};
use std::time::Duration;

use super::IssueLoader;
use super::core::Core;
use crate::api::TrackerApi;
use crate::log::Log;
use crate::{ArcSlice, ArcStr, FieldId, FieldValues};

fn field_set() -> ArcSlice<FieldId> {
    crate::arc_slice!["key", "summary"]
}

fn issue(key: &str, summary: &str) -> FieldValues {
    FieldValues::from([
        (ArcStr::from("key"), serde_json::json!(key)),
        (ArcStr::from("summary"), serde_json::json!(summary)),
    ])
}

#[tokio::test]
async fn test_mock_load_parks_until_reply() {
    let loader = IssueLoader::mock();

    let pending = {
        let loader = loader.clone();
        tokio::spawn(async move { loader.load(HashSet::from([2, 1]), field_set()).await })
    };

    // Wait for the load call to register itself.
    tokio::time::sleep(Duration::from_millis(20)).await;
    assert_eq!(loader.pending_requests().await, vec![vec![1, 2]]);

    loader
        .reply(HashMap::from([(1, issue("IH-1", "s1"))]))
        .await;

    let result = pending.await.unwrap();
    assert_eq!(result.len(), 1);
    assert_eq!(
        result.values(1).unwrap()[&ArcStr::from("key")],
        "IH-1"
    );
    assert!(loader.pending_requests().await.is_empty());
}

#[tokio::test]
async fn test_mock_replies_resolve_in_fifo_order() {
    let loader = IssueLoader::mock();

    let first = {
        let loader = loader.clone();
        tokio::spawn(async move { loader.load(HashSet::from([1]), field_set()).await })
    };
    tokio::time::sleep(Duration::from_millis(20)).await;
    let second = {
        let loader = loader.clone();
        tokio::spawn(async move { loader.load(HashSet::from([2]), field_set()).await })
    };
    tokio::time::sleep(Duration::from_millis(20)).await;

    assert_eq!(loader.pending_requests().await, vec![vec![1], vec![2]]);

    loader.reply(HashMap::from([(1, issue("IH-1", "s1"))])).await;
    loader.reply(HashMap::from([(2, issue("IH-2", "s2"))])).await;

    assert!(first.await.unwrap().values(1).is_some());
    assert!(second.await.unwrap().values(2).is_some());
}

#[tokio::test]
#[should_panic(expected = "no pending load")]
async fn test_mock_reply_without_pending_panics() {
    let loader = IssueLoader::mock();
    loader.reply(HashMap::new()).await;
}

#[tokio::test]
async fn test_actual_load_fetches_from_tracker() {
    let api = TrackerApi::mock();
    api.set_mock_value(3, issue("IH-3", "three")).await;

    let loader = IssueLoader::spawn(api, Log::mock());
    let result = loader.load(HashSet::from([3, 4]), field_set()).await;

    // Issue 4 is unknown to the tracker and simply absent from the result.
    assert_eq!(result.len(), 1);
    assert_eq!(
        result.values(3).unwrap()[&ArcStr::from("summary")],
        "three"
    );
}

#[tokio::test]
async fn test_actual_load_retries_until_success() {
    let api = TrackerApi::mock();
    api.set_mock_value(9, issue("IH-9", "nine")).await;
    api.fail_next(2).await;

    let (loader, _) = Core::new(api, Log::mock())
        .with_retry_delay(Duration::from_millis(10))
        .spawn();
    let result = loader.load(HashSet::from([9]), field_set()).await;

    assert!(result.values(9).is_some());
}
