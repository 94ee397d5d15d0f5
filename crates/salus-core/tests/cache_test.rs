#![allow(clippy::unwrap_used)]
// Polling cache: sequence numbers, failure handling and serialization.

mod common;

use std::sync::Arc;
use std::sync::atomic::Ordering;
use std::time::Duration;

use common::{THERMOSTAT, Transports};
use salus_core::{
    Category, Command, CoreError, DeviceId, GatewaySession, HvacMode, PollingCache, SessionState,
};

async fn connected_cache(transports: &Transports) -> PollingCache {
    let session = Arc::new(GatewaySession::from_config(common::local_config(), transports));
    session.connect().await.unwrap();
    PollingCache::new(session)
}

#[tokio::test]
async fn empty_until_first_refresh() {
    let transports = Transports::new();
    let cache = connected_cache(&transports).await;

    assert_eq!(cache.sequence(), 0);
    assert!(cache.current().is_none());
    assert!(cache.snapshot().is_none());
}

#[tokio::test]
async fn refresh_increments_sequence() {
    let transports = Transports::new();
    let cache = connected_cache(&transports).await;

    let first = cache.refresh().await.unwrap();
    let second = cache.refresh().await.unwrap();

    assert_eq!(first.sequence, 1);
    assert_eq!(second.sequence, 2);
    assert_eq!(cache.sequence(), 2);
    assert!(Arc::ptr_eq(&cache.current().unwrap(), &second));
    assert!(cache.changed_since(1).is_some());
    assert!(cache.changed_since(2).is_none());
}

#[tokio::test]
async fn failed_refresh_leaves_cache_untouched() {
    let transports = Transports::new();
    let cache = connected_cache(&transports).await;
    let before = cache.refresh().await.unwrap();

    transports.local.script.fail_poll.store(true, Ordering::SeqCst);
    let result = cache.refresh().await;

    assert!(matches!(result, Err(CoreError::Poll { .. })));
    assert_eq!(cache.sequence(), 1);
    assert!(Arc::ptr_eq(&cache.current().unwrap(), &before));
}

#[tokio::test]
async fn refresh_before_connect_is_a_state_error() {
    let transports = Transports::new();
    let session = Arc::new(GatewaySession::from_config(common::local_config(), &transports));
    let cache = PollingCache::new(session);

    let result = cache.refresh().await;
    assert!(matches!(
        result,
        Err(CoreError::State {
            state: SessionState::Disconnected,
            ..
        })
    ));
    assert_eq!(cache.sequence(), 0);
}

#[tokio::test]
async fn new_data_replaces_old_snapshot_whole() {
    let transports = Transports::new();
    let cache = connected_cache(&transports).await;
    cache.refresh().await.unwrap();

    transports.local.status.lock().unwrap().cover.clear();
    let refreshed = cache.refresh().await.unwrap();

    assert!(refreshed.snapshot.devices(Category::Cover).is_empty());
    assert!(refreshed.snapshot.contains(Category::Climate, THERMOSTAT));
}

#[tokio::test]
async fn readers_can_wait_for_a_sequence() {
    let transports = Transports::new();
    let cache = Arc::new(connected_cache(&transports).await);
    let mut updates = cache.subscribe();

    let waiter = {
        let cache = Arc::clone(&cache);
        tokio::spawn(async move { cache.wait_for(1).await })
    };

    cache.refresh().await.unwrap();
    let seen = waiter.await.unwrap().unwrap();
    assert_eq!(seen.sequence, 1);

    updates.changed().await.unwrap();
    assert_eq!(*updates.borrow(), 1);
}

#[tokio::test]
async fn polls_and_commands_never_overlap() {
    let transports = Transports::new();
    let cache = connected_cache(&transports).await;
    transports.local.script.set_delay(Duration::from_millis(20));

    let session = Arc::clone(cache.session());
    let thermostat = DeviceId::new(THERMOSTAT).unwrap();
    let command = Command::SetMode {
        mode: HvacMode::Off,
    };

    let (first, sent, second) = tokio::join!(
        cache.refresh(),
        session.command(&thermostat, &command),
        cache.refresh(),
    );
    first.unwrap();
    sent.unwrap();
    second.unwrap();

    assert_eq!(transports.local.script.max_in_flight(), 1);
    assert_eq!(cache.sequence(), 2);
}
