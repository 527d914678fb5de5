use std::collections::{HashMap, HashSet};
use std::time::Duration;

use tokio::sync::mpsc::UnboundedReceiver;

use super::{IssueCache, IssueUpdate, Listener};
use crate::changes::ChangeFeed;
use crate::loader::IssueLoader;
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

struct Fixture {
    cache: IssueCache,
    loader: IssueLoader,
    feed: ChangeFeed,
}

async fn fixture() -> Fixture {
    let feed = ChangeFeed::mock();
    let loader = IssueLoader::mock();
    let cache = IssueCache::spawn(feed.clone(), loader.clone(), Log::mock(), field_set()).await;
    Fixture {
        cache,
        loader,
        feed,
    }
}

/// Lets spawned load tasks and mailbox messages drain.
async fn settle() {
    tokio::time::sleep(Duration::from_millis(30)).await;
}

async fn next_update(updates: &mut UnboundedReceiver<IssueUpdate>) -> IssueUpdate {
    tokio::time::timeout(Duration::from_secs(1), updates.recv())
        .await
        .expect("timed out waiting for update")
        .expect("listener channel closed")
}

fn assert_no_update(updates: &mut UnboundedReceiver<IssueUpdate>) {
    assert!(updates.try_recv().is_err(), "unexpected update delivered");
}

/// Subscribes a fresh listener to issues 1 and 2 and resolves the initial
/// load, leaving both issues cached.
async fn cache_issues_1_and_2(f: &Fixture) -> UnboundedReceiver<IssueUpdate> {
    let (listener, mut updates) = Listener::channel();
    f.cache
        .subscribe(HashSet::from([1, 2]), listener)
        .await;
    settle().await;
    f.loader
        .reply(HashMap::from([(1, issue("k1", "s1")), (2, issue("k2", "s2"))]))
        .await;
    next_update(&mut updates).await;
    next_update(&mut updates).await;
    updates
}

#[tokio::test]
async fn test_subscribe_loads_missing_issues_and_notifies() {
    let f = fixture().await;
    let (listener, mut updates) = Listener::channel();

    assert!(f.cache.field(1, "key").await.is_none());

    f.cache.subscribe(HashSet::from([1, 2]), listener).await;
    settle().await;
    assert_eq!(f.loader.pending_requests().await, vec![vec![1, 2]]);

    // Nothing is cached until the load resolves.
    assert!(f.cache.field(1, "key").await.is_none());

    f.loader
        .reply(HashMap::from([(1, issue("k1", "s1")), (2, issue("k2", "s2"))]))
        .await;

    let mut seen = vec![
        next_update(&mut updates).await,
        next_update(&mut updates).await,
    ];
    seen.sort_by_key(|update| update.issue);
    assert_eq!(seen[0].issue, 1);
    assert_eq!(seen[0].changed, issue("k1", "s1"));
    assert_eq!(seen[1].issue, 2);
    assert_eq!(seen[1].changed, issue("k2", "s2"));

    // One coalesced update per issue, nothing more.
    settle().await;
    assert_no_update(&mut updates);

    assert_eq!(f.cache.field(1, "key").await, Some(serde_json::json!("k1")));
    assert_eq!(
        f.cache.field(2, "summary").await,
        Some(serde_json::json!("s2"))
    );
}

#[tokio::test]
async fn test_replay_on_subscribe_is_synchronous() {
    let f = fixture().await;
    cache_issues_1_and_2(&f).await;

    let (listener, mut updates) = Listener::channel();
    f.cache.subscribe(HashSet::from([1]), listener).await;

    // The replay is already in the channel when subscribe returns.
    let update = updates.try_recv().expect("replay should precede the reply");
    assert_eq!(update.issue, 1);
    assert_eq!(update.changed, issue("k1", "s1"));

    // A fully cached subscription issues no load.
    settle().await;
    assert!(f.loader.pending_requests().await.is_empty());
}

#[tokio::test]
async fn test_subscribe_loads_only_missing_issues() {
    let f = fixture().await;
    cache_issues_1_and_2(&f).await;

    let (listener, mut updates) = Listener::channel();
    f.cache.subscribe(HashSet::from([2, 3]), listener).await;

    let replayed = updates.try_recv().expect("cached issue should replay");
    assert_eq!(replayed.issue, 2);

    settle().await;
    assert_eq!(f.loader.pending_requests().await, vec![vec![3]]);
}

#[tokio::test]
async fn test_change_event_loads_only_watched_issues() {
    let f = fixture().await;
    let mut updates = cache_issues_1_and_2(&f).await;

    f.feed.record(HashSet::from([2, 99])).await;
    settle().await;
    assert_eq!(f.loader.pending_requests().await, vec![vec![2]]);

    f.loader
        .reply(HashMap::from([(2, issue("k21", "s21"))]))
        .await;
    let update = next_update(&mut updates).await;
    assert_eq!(update.issue, 2);
    assert_eq!(update.changed, issue("k21", "s21"));

    assert_eq!(f.cache.field(2, "key").await, Some(serde_json::json!("k21")));
}

#[tokio::test]
async fn test_change_event_for_unwatched_issues_is_ignored() {
    let f = fixture().await;
    cache_issues_1_and_2(&f).await;

    f.feed.record(HashSet::from([98, 99])).await;
    settle().await;
    assert!(f.loader.pending_requests().await.is_empty());
}

#[tokio::test]
async fn test_unchanged_load_result_is_suppressed() {
    let f = fixture().await;
    let mut updates = cache_issues_1_and_2(&f).await;

    f.feed.record(HashSet::from([2])).await;
    settle().await;
    f.loader
        .reply(HashMap::from([(2, issue("k2", "s2"))]))
        .await;

    settle().await;
    assert_no_update(&mut updates);
    assert_eq!(f.cache.field(2, "key").await, Some(serde_json::json!("k2")));
}

#[tokio::test]
async fn test_diff_reports_only_changed_fields() {
    let f = fixture().await;
    let mut updates = cache_issues_1_and_2(&f).await;

    f.feed.record(HashSet::from([1])).await;
    settle().await;
    f.loader
        .reply(HashMap::from([(1, issue("k1", "s2"))]))
        .await;

    let update = next_update(&mut updates).await;
    assert_eq!(update.issue, 1);
    assert_eq!(
        update.changed,
        FieldValues::from([(ArcStr::from("summary"), serde_json::json!("s2"))])
    );

    // The store still holds the full new value.
    assert_eq!(f.cache.field(1, "key").await, Some(serde_json::json!("k1")));
    assert_eq!(
        f.cache.field(1, "summary").await,
        Some(serde_json::json!("s2"))
    );
}

#[tokio::test]
async fn test_last_unsubscribe_evicts_issues() {
    let f = fixture().await;
    let (listener, mut updates) = Listener::channel();
    let subscription = f.cache.subscribe(HashSet::from([1]), listener).await;
    settle().await;
    f.loader.reply(HashMap::from([(1, issue("k1", "s1"))])).await;
    next_update(&mut updates).await;

    f.cache.unsubscribe(subscription).await;

    assert!(f.cache.field(1, "key").await.is_none());
    assert!(f.cache.field(1, "summary").await.is_none());

    // A change event for the evicted issue no longer triggers a load.
    f.feed.record(HashSet::from([1])).await;
    settle().await;
    assert!(f.loader.pending_requests().await.is_empty());
}

#[tokio::test]
async fn test_unsubscribe_during_inflight_load_discards_result() {
    let f = fixture().await;
    let (listener, mut updates) = Listener::channel();
    let subscription = f.cache.subscribe(HashSet::from([3]), listener).await;
    settle().await;
    assert_eq!(f.loader.pending_requests().await, vec![vec![3]]);

    f.cache.unsubscribe(subscription).await;
    f.loader.reply(HashMap::from([(3, issue("k3", "s3"))])).await;

    settle().await;
    assert_no_update(&mut updates);
    assert!(f.cache.field(3, "key").await.is_none());
}

#[tokio::test]
async fn test_load_result_discarded_per_issue() {
    let f = fixture().await;

    // First subscription covers 1 and 2, then goes away entirely.
    let (first, mut first_updates) = Listener::channel();
    let subscription = f.cache.subscribe(HashSet::from([1, 2]), first).await;
    settle().await;
    f.cache.unsubscribe(subscription).await;

    // Second subscription arrives for issue 2 only, while the first load is
    // still in flight, and issues an overlapping load.
    let (second, mut second_updates) = Listener::channel();
    f.cache.subscribe(HashSet::from([2]), second).await;
    settle().await;
    assert_eq!(
        f.loader.pending_requests().await,
        vec![vec![1, 2], vec![2]]
    );

    f.loader
        .reply(HashMap::from([(1, issue("k1", "s1")), (2, issue("k2", "s2"))]))
        .await;

    // Issue 1 lost its watchers and is dropped; issue 2 lands.
    let update = next_update(&mut second_updates).await;
    assert_eq!(update.issue, 2);
    assert!(f.cache.field(1, "key").await.is_none());
    assert_eq!(f.cache.field(2, "key").await, Some(serde_json::json!("k2")));

    // The overlapping load resolves to the same values and is suppressed.
    f.loader.reply(HashMap::from([(2, issue("k2", "s2"))])).await;
    settle().await;
    assert_no_update(&mut second_updates);
    assert_no_update(&mut first_updates);
}

#[tokio::test]
async fn test_duplicate_subscriptions_are_independent() {
    let f = fixture().await;
    let (listener, mut updates) = Listener::channel();

    let first = f
        .cache
        .subscribe(HashSet::from([1]), listener.clone())
        .await;
    let second = f.cache.subscribe(HashSet::from([1]), listener).await;
    settle().await;

    // The issue was uncached both times, so two overlapping loads exist.
    assert_eq!(f.loader.pending_requests().await, vec![vec![1], vec![1]]);

    f.loader.reply(HashMap::from([(1, issue("k1", "s1"))])).await;

    // Both subscriptions watch issue 1, so the one listener hears it twice.
    assert_eq!(next_update(&mut updates).await.issue, 1);
    assert_eq!(next_update(&mut updates).await.issue, 1);

    // The second load reports no change.
    f.loader.reply(HashMap::from([(1, issue("k1", "s1"))])).await;
    settle().await;
    assert_no_update(&mut updates);

    // One subscription keeps the issue alive; removing both evicts it.
    f.cache.unsubscribe(first).await;
    assert_eq!(f.cache.field(1, "key").await, Some(serde_json::json!("k1")));
    f.cache.unsubscribe(second).await;
    assert!(f.cache.field(1, "key").await.is_none());
}

#[tokio::test]
async fn test_multiple_listeners_each_notified_once() {
    let f = fixture().await;
    let (first, mut first_updates) = Listener::channel();
    let (second, mut second_updates) = Listener::channel();

    f.cache.subscribe(HashSet::from([1]), first).await;
    f.cache.subscribe(HashSet::from([1]), second).await;
    settle().await;

    f.loader.reply(HashMap::from([(1, issue("k1", "s1"))])).await;
    f.loader.reply(HashMap::from([(1, issue("k1", "s1"))])).await;

    assert_eq!(next_update(&mut first_updates).await.issue, 1);
    assert_eq!(next_update(&mut second_updates).await.issue, 1);
    settle().await;
    assert_no_update(&mut first_updates);
    assert_no_update(&mut second_updates);
}

#[tokio::test]
async fn test_unknown_field_reads_absent() {
    let f = fixture().await;
    assert!(f.cache.field(1, "nonexistent").await.is_none());

    cache_issues_1_and_2(&f).await;
    assert!(f.cache.field(1, "nonexistent").await.is_none());
    assert_eq!(f.cache.field(1, "key").await, Some(serde_json::json!("k1")));
}

#[tokio::test]
async fn test_empty_subscription_is_inert() {
    let f = fixture().await;
    let (listener, mut updates) = Listener::channel();

    let subscription = f.cache.subscribe(HashSet::new(), listener).await;
    settle().await;
    assert!(f.loader.pending_requests().await.is_empty());
    assert_no_update(&mut updates);

    f.cache.unsubscribe(subscription).await;
}

#[tokio::test]
async fn test_unsubscribe_twice_is_harmless() {
    let f = fixture().await;
    let (listener, _updates) = Listener::channel();
    let subscription = f.cache.subscribe(HashSet::from([1]), listener).await;

    f.cache.unsubscribe(subscription).await;
    f.cache.unsubscribe(subscription).await;
}

#[tokio::test]
async fn test_field_ids_reports_construction_set() {
    let f = fixture().await;
    let fields = f.cache.field_ids().await;
    assert_eq!(&*fields, &*field_set());
}

#[tokio::test]
async fn test_mock_cache_replays_and_reads() {
    let cache = IssueCache::mock(
        field_set(),
        HashMap::from([(1, issue("k1", "s1"))]),
    );

    let (listener, mut updates) = Listener::channel();
    let subscription = cache.subscribe(HashSet::from([1, 2]), listener).await;

    let update = updates.try_recv().expect("mock replays cached issues");
    assert_eq!(update.issue, 1);
    assert!(updates.try_recv().is_err());

    assert_eq!(cache.field(1, "key").await, Some(serde_json::json!("k1")));
    assert!(cache.field(1, "nonexistent").await.is_none());
    assert!(cache.field(2, "key").await.is_none());

    cache.unsubscribe(subscription).await;
}
