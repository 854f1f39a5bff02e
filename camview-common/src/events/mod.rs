//! Event types for the camview event system
//!
//! Provides shared event definitions and the EventBus used to fan events out
//! to SSE clients.

// Sub-modules (supporting types)
mod feed_types;
mod notification_types;
mod playback_types;

pub use feed_types::FeedInfo;
pub use notification_types::{Notification, NotificationKind, NotificationTopic};
pub use playback_types::{
    BindOptions, BindingId, DeliveryMode, PlaybackSnapshot, PlaybackState, PlayerSignal,
};

use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;
use uuid::Uuid;

/// Camview event types
///
/// Events are broadcast via EventBus and serialized for SSE transmission.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum CamviewEvent {
    /// Negotiation state changed
    ///
    /// Triggers:
    /// - SSE: Update spinner / error overlay / fallback badge
    PlaybackStateChanged {
        /// State before the change
        old_state: PlaybackState,
        /// Full snapshot after the change
        snapshot: PlaybackSnapshot,
        /// When state changed
        timestamp: chrono::DateTime<chrono::Utc>,
    },

    /// Toast-style message for the user
    Notification {
        notification: Notification,
        timestamp: chrono::DateTime<chrono::Utc>,
    },

    /// Player primitive must attach to a new URL
    ///
    /// Any previous binding has already been detached.
    PlayerBound {
        binding: BindingId,
        url: String,
        options: BindOptions,
        timestamp: chrono::DateTime<chrono::Utc>,
    },

    /// Player primitive must release a binding
    PlayerDetached {
        binding: BindingId,
        timestamp: chrono::DateTime<chrono::Utc>,
    },

    /// Feed list or selection changed
    FeedsChanged {
        feeds: Vec<FeedInfo>,
        selected: Option<Uuid>,
        timestamp: chrono::DateTime<chrono::Utc>,
    },
}

impl CamviewEvent {
    /// Event name used as the SSE `event:` field
    pub fn event_type(&self) -> &'static str {
        match self {
            CamviewEvent::PlaybackStateChanged { .. } => "PlaybackStateChanged",
            CamviewEvent::Notification { .. } => "Notification",
            CamviewEvent::PlayerBound { .. } => "PlayerBound",
            CamviewEvent::PlayerDetached { .. } => "PlayerDetached",
            CamviewEvent::FeedsChanged { .. } => "FeedsChanged",
        }
    }
}

// ========================================
// EventBus Implementation
// ========================================

/// Central event distribution bus
///
/// Uses tokio::broadcast internally:
/// - Non-blocking publish (slow subscribers don't block producers)
/// - Multiple concurrent subscribers
/// - Lagged message detection for slow subscribers
///
/// # Examples
///
/// ```
/// use camview_common::events::{CamviewEvent, EventBus, BindingId};
///
/// let event_bus = EventBus::new(100);
/// let mut rx = event_bus.subscribe();
///
/// event_bus.emit_lossy(CamviewEvent::PlayerDetached {
///     binding: BindingId(1),
///     timestamp: chrono::Utc::now(),
/// });
///
/// assert!(rx.try_recv().is_ok());
/// ```
#[derive(Clone)]
pub struct EventBus {
    tx: broadcast::Sender<CamviewEvent>,
    capacity: usize,
}

impl EventBus {
    /// Creates a new EventBus with specified channel capacity
    ///
    /// * `capacity` - Number of events to buffer before dropping old events
    pub fn new(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity);
        Self { tx, capacity }
    }

    /// Subscribe to all future events
    ///
    /// Events emitted before subscription are not received.
    pub fn subscribe(&self) -> broadcast::Receiver<CamviewEvent> {
        self.tx.subscribe()
    }

    /// Emit an event to all subscribers
    ///
    /// Returns `Err` if no subscribers are listening.
    #[allow(clippy::result_large_err)]
    pub fn emit(
        &self,
        event: CamviewEvent,
    ) -> Result<usize, broadcast::error::SendError<CamviewEvent>> {
        self.tx.send(event)
    }

    /// Emit an event, ignoring if no subscribers are listening
    pub fn emit_lossy(&self, event: CamviewEvent) {
        let _ = self.tx.send(event);
    }

    /// Get the current number of active subscribers
    pub fn subscriber_count(&self) -> usize {
        self.tx.receiver_count()
    }

    /// Get the configured channel capacity
    pub fn capacity(&self) -> usize {
        self.capacity
    }
}
