//! Contract Test: Loop Scheduling & Shutdown
//!
//! This test verifies how the update loop is driven over time.
//!
//! Constraints verified:
//! - One tick immediately, then one tick per refresh interval
//! - Failing ticks never stop the loop, and are not retried early
//! - The loop stops promptly on the shutdown signal
//! - Started/Stopped events bracket the run
//!
//! All tests run on a paused clock, so refresh intervals elapse instantly.

mod common;

use common::*;
use ddns_core::engine::EngineEvent;
use ddns_core::DdnsEngine;
use std::time::Duration;
use tokio::sync::oneshot;

const REFRESH: Duration = Duration::from_secs(300);

fn spawn_engine(
    resolver: &ScriptedResolver,
    store: &RecordingStore,
) -> (
    oneshot::Sender<()>,
    tokio::task::JoinHandle<DdnsEngine>,
    tokio::sync::mpsc::Receiver<EngineEvent>,
) {
    let (mut engine, event_rx) = DdnsEngine::new(
        Box::new(ScriptedResolver::sharing_counters_with(resolver)),
        Box::new(RecordingStore::sharing_counters_with(store)),
        &minimal_config("www"),
    )
    .expect("engine construction succeeds");

    let (shutdown_tx, shutdown_rx) = oneshot::channel();
    let handle = tokio::spawn(async move {
        engine.run(shutdown_rx).await;
        engine
    });

    (shutdown_tx, handle, event_rx)
}

#[tokio::test(start_paused = true)]
async fn ticks_once_immediately_then_once_per_interval() {
    let resolver = ScriptedResolver::fixed(ip(1, 2, 3, 4));
    let store = RecordingStore::new(Registered::Value(ip(1, 2, 3, 4)));
    let (shutdown_tx, handle, _event_rx) = spawn_engine(&resolver, &store);

    // Ticks at t=0, 300, 600, 900; stop halfway to the next one
    tokio::time::sleep(REFRESH * 3 + REFRESH / 2).await;
    shutdown_tx.send(()).unwrap();
    let engine = handle.await.unwrap();

    assert_eq!(resolver.resolve_call_count(), 4);
    assert_eq!(store.get_call_count(), 1);
    assert_eq!(store.set_call_count(), 0);
    assert_eq!(engine.state().registered_ip(), Some(ip(1, 2, 3, 4)));
}

#[tokio::test(start_paused = true)]
async fn persistent_failures_do_not_stop_the_loop() {
    let resolver = ScriptedResolver::new([Probe::Unreachable]);
    let store = RecordingStore::new(Registered::Value(ip(1, 2, 3, 4)));
    let (shutdown_tx, handle, mut event_rx) = spawn_engine(&resolver, &store);

    tokio::time::sleep(REFRESH * 3 + REFRESH / 2).await;
    assert!(!handle.is_finished(), "Loop must survive failing ticks");

    shutdown_tx.send(()).unwrap();
    handle.await.unwrap();

    // One attempt per interval: no retry, no backoff
    assert_eq!(resolver.resolve_call_count(), 4);
    assert_eq!(store.get_call_count(), 0);

    let mut failures = 0;
    while let Ok(event) = event_rx.try_recv() {
        if matches!(event, EngineEvent::ResolutionFailed { .. }) {
            failures += 1;
        }
    }
    assert_eq!(failures, 4);
}

#[tokio::test(start_paused = true)]
async fn address_change_is_picked_up_on_a_later_tick() {
    let resolver = ScriptedResolver::new([
        Probe::Address(ip(1, 2, 3, 4)),
        Probe::Address(ip(1, 2, 3, 4)),
        Probe::Address(ip(1, 2, 3, 5)),
    ]);
    let store = RecordingStore::new(Registered::Value(ip(1, 2, 3, 4)));
    let (shutdown_tx, handle, _event_rx) = spawn_engine(&resolver, &store);

    tokio::time::sleep(REFRESH * 3 + REFRESH / 2).await;
    shutdown_tx.send(()).unwrap();
    let engine = handle.await.unwrap();

    assert_eq!(store.set_values(), vec![ip(1, 2, 3, 5)]);
    assert_eq!(engine.state().registered_ip(), Some(ip(1, 2, 3, 5)));
}

#[tokio::test(start_paused = true)]
async fn shutdown_signal_terminates_engine() {
    let resolver = ScriptedResolver::fixed(ip(1, 2, 3, 4));
    let store = RecordingStore::new(Registered::Value(ip(1, 2, 3, 4)));
    let (shutdown_tx, handle, mut event_rx) = spawn_engine(&resolver, &store);

    tokio::time::sleep(Duration::from_secs(1)).await;
    shutdown_tx.send(()).expect("shutdown signal send succeeds");

    let result = tokio::time::timeout(Duration::from_secs(5), handle).await;
    assert!(result.is_ok(), "Engine should terminate within 5 seconds");
    result.unwrap().expect("engine task does not panic");

    let mut events = Vec::new();
    while let Ok(event) = event_rx.try_recv() {
        events.push(event);
    }
    assert!(matches!(events.first(), Some(EngineEvent::Started { .. })));
    assert!(matches!(events.last(), Some(EngineEvent::Stopped { .. })));
}

#[tokio::test(start_paused = true)]
async fn dropped_shutdown_sender_terminates_engine() {
    let resolver = ScriptedResolver::fixed(ip(1, 2, 3, 4));
    let store = RecordingStore::new(Registered::Value(ip(1, 2, 3, 4)));
    let (shutdown_tx, handle, _event_rx) = spawn_engine(&resolver, &store);

    drop(shutdown_tx);

    let result = tokio::time::timeout(Duration::from_secs(5), handle).await;
    assert!(result.is_ok(), "Engine should terminate when the sender is gone");
}
