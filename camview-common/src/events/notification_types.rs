//! User-facing notification types
//!
//! Notifications are toast-style messages the negotiator yields alongside
//! its state transitions. Host UIs decide how to render them.

use serde::{Deserialize, Serialize};

/// Severity of a notification
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum NotificationKind {
    Info,
    Error,
}

/// What a notification is about
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum NotificationTopic {
    /// Locator could not be turned into a relay URL
    InvalidLocator,
    /// Primary delivery failed, fallback delivery is being tried
    SwitchedToFallback,
    /// Both delivery modes failed
    ConnectionFailed,
    /// A recovery attempt started
    Reconnecting,
}

impl NotificationTopic {
    pub fn kind(&self) -> NotificationKind {
        match self {
            NotificationTopic::InvalidLocator | NotificationTopic::ConnectionFailed => {
                NotificationKind::Error
            }
            NotificationTopic::SwitchedToFallback | NotificationTopic::Reconnecting => {
                NotificationKind::Info
            }
        }
    }
}

/// A toast-style message for the host UI
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Notification {
    pub topic: NotificationTopic,
    pub kind: NotificationKind,
    pub title: String,
    pub message: String,
}

impl Notification {
    fn new(topic: NotificationTopic, title: &str, message: String) -> Self {
        Self {
            topic,
            kind: topic.kind(),
            title: title.to_string(),
            message,
        }
    }

    pub fn invalid_locator(locator: &str) -> Self {
        Self::new(
            NotificationTopic::InvalidLocator,
            "Invalid stream URL",
            format!(
                "'{}' is not a valid camera URL. Use the form rtsp://host:port/path.",
                locator
            ),
        )
    }

    pub fn switched_to_fallback() -> Self {
        Self::new(
            NotificationTopic::SwitchedToFallback,
            "Switching to HLS",
            "Low-latency stream unavailable, trying the HLS fallback.".to_string(),
        )
    }

    pub fn connection_failed() -> Self {
        Self::new(
            NotificationTopic::ConnectionFailed,
            "Connection Error",
            "Failed to connect to the RTSP stream. Please check the URL and try again."
                .to_string(),
        )
    }

    pub fn reconnecting(attempt: u32) -> Self {
        Self::new(
            NotificationTopic::Reconnecting,
            "Reconnecting",
            format!("Attempting to reconnect to the stream (attempt {}).", attempt),
        )
    }
}
