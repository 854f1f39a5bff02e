//! Negotiator task integration tests
//!
//! Runs the real tokio task with the event bus and a short recovery delay:
//! - Commands return post-transition snapshots
//! - PlayerBound / PlayerDetached events drive the browser player
//! - Recovery timer fires through the command channel
//! - Notifications and state changes reach the event bus

use camview_common::config::PlayerConfig;
use camview_common::events::{
    BindingId, CamviewEvent, DeliveryMode, EventBus, NotificationTopic, PlaybackState,
    PlayerSignal,
};
use camview_player::NegotiatorHandle;
use std::time::Duration;
use tokio::sync::broadcast;
use tokio::time::timeout;

const FRONT_CAMERA: &str = "rtsp://cam.local:554/front";
const EVENT_TIMEOUT: Duration = Duration::from_secs(2);

fn test_config(recovery_delay: Duration) -> PlayerConfig {
    PlayerConfig {
        primary_base: "http://relay:8889".to_string(),
        fallback_base: "http://relay:8888".to_string(),
        recovery_delay,
        ..PlayerConfig::default()
    }
}

fn spawn(recovery_delay: Duration) -> (NegotiatorHandle, broadcast::Receiver<CamviewEvent>) {
    let event_bus = EventBus::new(64);
    let rx = event_bus.subscribe();
    let (handle, _task) = NegotiatorHandle::spawn(&test_config(recovery_delay), event_bus);
    (handle, rx)
}

/// Receive events until one matches, failing after EVENT_TIMEOUT
async fn wait_for<F>(rx: &mut broadcast::Receiver<CamviewEvent>, mut matches: F) -> CamviewEvent
where
    F: FnMut(&CamviewEvent) -> bool,
{
    timeout(EVENT_TIMEOUT, async {
        loop {
            let event = rx.recv().await.expect("event bus closed");
            if matches(&event) {
                return event;
            }
        }
    })
    .await
    .expect("timed out waiting for event")
}

fn drain(rx: &mut broadcast::Receiver<CamviewEvent>) -> Vec<CamviewEvent> {
    let mut events = Vec::new();
    while let Ok(event) = rx.try_recv() {
        events.push(event);
    }
    events
}

fn notification_topics(events: &[CamviewEvent]) -> Vec<NotificationTopic> {
    events
        .iter()
        .filter_map(|e| match e {
            CamviewEvent::Notification { notification, .. } => Some(notification.topic),
            _ => None,
        })
        .collect()
}

async fn fail_both_modes(handle: &NegotiatorHandle) {
    for _ in 0..2 {
        let binding = handle.snapshot().await.unwrap().binding.unwrap();
        handle.player_signal(binding, PlayerSignal::Error).await.unwrap();
    }
}

#[tokio::test]
async fn test_connect_binds_primary_player() {
    let (handle, mut rx) = spawn(Duration::from_secs(30));

    handle.set_locator(FRONT_CAMERA).await.unwrap();
    let snapshot = handle.set_playing_intent(true).await.unwrap();

    assert_eq!(
        snapshot.state,
        PlaybackState::Loading {
            mode: DeliveryMode::Primary,
            retry_count: 0
        }
    );
    assert_eq!(snapshot.derived_url, "http://relay:8889/stream/front");

    let events = drain(&mut rx);
    let bound = events
        .iter()
        .find_map(|e| match e {
            CamviewEvent::PlayerBound {
                binding, url, options, ..
            } => Some((*binding, url.clone(), options.force_hls)),
            _ => None,
        })
        .expect("PlayerBound should be published");
    assert_eq!(Some(bound.0), snapshot.binding);
    assert_eq!(bound.1, "http://relay:8889/stream/front");
    assert!(!bound.2);

    assert!(events
        .iter()
        .any(|e| matches!(e, CamviewEvent::PlaybackStateChanged { .. })));
}

#[tokio::test]
async fn test_snapshot_without_change_publishes_nothing() {
    let (handle, mut rx) = spawn(Duration::from_secs(30));

    let snapshot = handle.snapshot().await.unwrap();

    assert_eq!(snapshot.state, PlaybackState::Idle);
    assert!(drain(&mut rx).is_empty());
}

#[tokio::test]
async fn test_fallback_detaches_then_binds() {
    let (handle, mut rx) = spawn(Duration::from_secs(30));
    handle.set_locator(FRONT_CAMERA).await.unwrap();
    let primary = handle.set_playing_intent(true).await.unwrap().binding.unwrap();
    drain(&mut rx);

    let snapshot = handle.player_signal(primary, PlayerSignal::Error).await.unwrap();
    assert_eq!(snapshot.derived_url, "http://relay:8888/front/index.m3u8");

    let events = drain(&mut rx);
    let detach_pos = events
        .iter()
        .position(|e| matches!(e, CamviewEvent::PlayerDetached { binding, .. } if *binding == primary))
        .expect("primary binding should be detached");
    let bind_pos = events
        .iter()
        .position(|e| matches!(e, CamviewEvent::PlayerBound { options, .. } if options.force_hls))
        .expect("fallback binding should be published");
    assert!(detach_pos < bind_pos);
    assert_eq!(
        notification_topics(&events),
        vec![NotificationTopic::SwitchedToFallback]
    );
}

#[tokio::test]
async fn test_stale_signal_changes_nothing() {
    let (handle, mut rx) = spawn(Duration::from_secs(30));
    handle.set_locator(FRONT_CAMERA).await.unwrap();
    handle.set_playing_intent(true).await.unwrap();
    drain(&mut rx);

    let snapshot = handle
        .player_signal(BindingId(9999), PlayerSignal::Error)
        .await
        .unwrap();

    assert_eq!(snapshot.mode(), Some(DeliveryMode::Primary));
    assert!(drain(&mut rx).is_empty());
}

#[tokio::test]
async fn test_recovery_timer_fires_through_task() {
    let (handle, mut rx) = spawn(Duration::from_millis(100));
    handle.set_locator(FRONT_CAMERA).await.unwrap();
    handle.set_playing_intent(true).await.unwrap();

    fail_both_modes(&handle).await;
    assert!(handle.snapshot().await.unwrap().state.is_failed());

    let event = wait_for(&mut rx, |e| {
        matches!(e, CamviewEvent::Notification { notification, .. }
            if notification.topic == NotificationTopic::Reconnecting)
    })
    .await;
    if let CamviewEvent::Notification { notification, .. } = event {
        assert!(notification.message.contains("attempt 1"));
    }

    let snapshot = handle.snapshot().await.unwrap();
    assert_eq!(
        snapshot.state,
        PlaybackState::Loading {
            mode: DeliveryMode::Primary,
            retry_count: 1
        }
    );
    assert_eq!(snapshot.derived_url, "http://relay:8889/stream/front");
}

#[tokio::test]
async fn test_disconnect_cancels_recovery() {
    let (handle, mut rx) = spawn(Duration::from_millis(100));
    handle.set_locator(FRONT_CAMERA).await.unwrap();
    handle.set_playing_intent(true).await.unwrap();
    fail_both_modes(&handle).await;

    let snapshot = handle.set_playing_intent(false).await.unwrap();
    assert_eq!(snapshot.state, PlaybackState::Idle);
    drain(&mut rx);

    tokio::time::sleep(Duration::from_millis(300)).await;

    assert_eq!(handle.snapshot().await.unwrap().state, PlaybackState::Idle);
    assert!(notification_topics(&drain(&mut rx)).is_empty());
}

#[tokio::test]
async fn test_manual_retry_through_task() {
    let (handle, mut rx) = spawn(Duration::from_secs(30));
    handle.set_locator(FRONT_CAMERA).await.unwrap();
    handle.set_playing_intent(true).await.unwrap();
    fail_both_modes(&handle).await;
    drain(&mut rx);

    let snapshot = handle.request_manual_retry().await.unwrap();

    assert_eq!(snapshot.state.retry_count(), 1);
    assert_eq!(snapshot.mode(), Some(DeliveryMode::Primary));
    assert_eq!(
        notification_topics(&drain(&mut rx)),
        vec![NotificationTopic::Reconnecting]
    );
}

#[tokio::test]
async fn test_invalid_locator_notification_published() {
    let (handle, mut rx) = spawn(Duration::from_secs(30));
    handle.set_locator("not a camera").await.unwrap();

    let snapshot = handle.set_playing_intent(true).await.unwrap();

    assert_eq!(snapshot.state, PlaybackState::Idle);
    assert!(snapshot.playing_intent);
    let events = drain(&mut rx);
    assert_eq!(
        notification_topics(&events),
        vec![NotificationTopic::InvalidLocator]
    );
    assert!(!events
        .iter()
        .any(|e| matches!(e, CamviewEvent::PlayerBound { .. })));
}
