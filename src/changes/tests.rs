use std::collections::HashSet;
use std::time::Duration;

use super::ChangeFeed;
use crate::api::TrackerApi;
use crate::log::Log;

#[tokio::test]
async fn test_mock_record_reaches_all_subscribers() {
    let feed = ChangeFeed::mock();
    let mut first = feed.subscribe().await;
    let mut second = feed.subscribe().await;

    feed.record(HashSet::from([1, 2])).await;

    assert_eq!(first.recv().await.unwrap(), HashSet::from([1, 2]));
    assert_eq!(second.recv().await.unwrap(), HashSet::from([1, 2]));
}

#[tokio::test]
async fn test_mock_prunes_dropped_subscribers() {
    let feed = ChangeFeed::mock();
    let dropped = feed.subscribe().await;
    let mut kept = feed.subscribe().await;
    drop(dropped);

    feed.record(HashSet::from([3])).await;
    assert_eq!(kept.recv().await.unwrap(), HashSet::from([3]));
}

#[tokio::test]
async fn test_actual_record_is_delivered() {
    // A day-long interval keeps the poller quiet for the whole test.
    let feed = ChangeFeed::spawn(
        TrackerApi::mock(),
        Log::mock(),
        Duration::from_secs(60 * 60 * 24),
    );
    let mut updates = feed.subscribe().await;

    feed.record(HashSet::from([7])).await;
    let batch = tokio::time::timeout(Duration::from_secs(1), updates.recv())
        .await
        .expect("timed out waiting for batch")
        .expect("feed closed");
    assert_eq!(batch, HashSet::from([7]));
}

#[tokio::test]
async fn test_actual_poll_broadcasts_tracker_changes() {
    let api = TrackerApi::mock();
    api.queue_mock_changes(HashSet::from([11])).await;

    let feed = ChangeFeed::spawn(api, Log::mock(), Duration::from_millis(20));
    let mut updates = feed.subscribe().await;

    let batch = tokio::time::timeout(Duration::from_secs(1), updates.recv())
        .await
        .expect("timed out waiting for poll")
        .expect("feed closed");
    assert_eq!(batch, HashSet::from([11]));
}

#[tokio::test]
async fn test_actual_poll_survives_tracker_failure() {
    let api = TrackerApi::mock();
    api.fail_next(1).await;
    api.queue_mock_changes(HashSet::from([5])).await;

    let feed = ChangeFeed::spawn(api, Log::mock(), Duration::from_millis(20));
    let mut updates = feed.subscribe().await;

    // The failed poll is skipped; the next one delivers.
    let batch = tokio::time::timeout(Duration::from_secs(1), updates.recv())
        .await
        .expect("timed out waiting for poll")
        .expect("feed closed");
    assert_eq!(batch, HashSet::from([5]));
}
