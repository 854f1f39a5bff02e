//! Playback-related type definitions
//!
//! Supporting types for the playback negotiation state machine and the
//! player primitive it drives.

use serde::{Deserialize, Serialize};

/// Relay delivery mode
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum DeliveryMode {
    /// Low-latency republishing (WebRTC)
    Primary,
    /// Segment-based republishing (HLS)
    Fallback,
}

impl std::fmt::Display for DeliveryMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DeliveryMode::Primary => write!(f, "primary"),
            DeliveryMode::Fallback => write!(f, "fallback"),
        }
    }
}

/// Playback negotiation state
///
/// Every non-idle state carries the active delivery mode and the number of
/// recovery attempts made in the current session, so a `Failed` state always
/// names the mode that failed last.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum PlaybackState {
    /// No playing intent, or no usable locator
    Idle,
    /// Player bound to a derived URL, waiting for ready/buffer-end
    Loading { mode: DeliveryMode, retry_count: u32 },
    /// Player reported ready
    Playing { mode: DeliveryMode, retry_count: u32 },
    /// Both delivery modes failed; recovery pending
    Failed { mode: DeliveryMode, retry_count: u32 },
}

impl PlaybackState {
    /// Active delivery mode (None while idle)
    pub fn mode(&self) -> Option<DeliveryMode> {
        match self {
            PlaybackState::Idle => None,
            PlaybackState::Loading { mode, .. }
            | PlaybackState::Playing { mode, .. }
            | PlaybackState::Failed { mode, .. } => Some(*mode),
        }
    }

    /// Recovery attempts made in the current session
    pub fn retry_count(&self) -> u32 {
        match self {
            PlaybackState::Idle => 0,
            PlaybackState::Loading { retry_count, .. }
            | PlaybackState::Playing { retry_count, .. }
            | PlaybackState::Failed { retry_count, .. } => *retry_count,
        }
    }

    pub fn is_idle(&self) -> bool {
        matches!(self, PlaybackState::Idle)
    }

    pub fn is_failed(&self) -> bool {
        matches!(self, PlaybackState::Failed { .. })
    }
}

impl std::fmt::Display for PlaybackState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PlaybackState::Idle => write!(f, "idle"),
            PlaybackState::Loading { mode, .. } => write!(f, "loading ({})", mode),
            PlaybackState::Playing { mode, .. } => write!(f, "playing ({})", mode),
            PlaybackState::Failed { mode, .. } => write!(f, "failed ({})", mode),
        }
    }
}

/// Identifies one bind of the player primitive to a URL
///
/// Ids increase monotonically; signals tagged with an id other than the
/// active one come from a detached binding and are ignored.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[serde(transparent)]
pub struct BindingId(pub u64);

impl std::fmt::Display for BindingId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Options passed to the player primitive alongside the URL
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct BindOptions {
    /// Force the HLS container (set when bound in fallback mode)
    pub force_hls: bool,
    /// CORS mode for the media element
    pub cross_origin: String,
}

impl BindOptions {
    pub fn for_mode(mode: DeliveryMode) -> Self {
        Self {
            force_hls: mode == DeliveryMode::Fallback,
            cross_origin: "anonymous".to_string(),
        }
    }
}

/// Signals emitted by the player primitive
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum PlayerSignal {
    Ready,
    BufferEnd,
    Error,
}

impl std::fmt::Display for PlayerSignal {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PlayerSignal::Ready => write!(f, "ready"),
            PlayerSignal::BufferEnd => write!(f, "buffer_end"),
            PlayerSignal::Error => write!(f, "error"),
        }
    }
}

/// Rendering snapshot of a negotiation session
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct PlaybackSnapshot {
    /// Current state (carries mode and retry count)
    pub state: PlaybackState,
    /// URL the player is bound to (empty while idle)
    pub derived_url: String,
    /// Active player binding
    pub binding: Option<BindingId>,
    /// Locator as last supplied by the collaborator
    pub locator: String,
    /// Whether the collaborator wants playback
    pub playing_intent: bool,
}

impl PlaybackSnapshot {
    pub fn mode(&self) -> Option<DeliveryMode> {
        self.state.mode()
    }
}
