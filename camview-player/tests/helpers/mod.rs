//! Test helper modules for camview-player integration tests
//!
//! Provides reusable test infrastructure components:
//! - RecordingPlayer: PlayerPrimitive that records bind/detach calls
//! - ManualScheduler: RecoveryScheduler whose timers fire only when a test says so

#![allow(dead_code)]

pub mod fakes;

pub use fakes::{ManualScheduler, PlayerCall, RecordingPlayer};

use camview_common::events::BindingId;
use camview_player::negotiator::{Negotiator, RelayEndpoints};
use std::time::Duration;

pub const PRIMARY_BASE: &str = "http://relay:8889";
pub const FALLBACK_BASE: &str = "http://relay:8888";
pub const FRONT_CAMERA: &str = "rtsp://cam.local:554/front";
pub const RECOVERY_DELAY: Duration = Duration::from_secs(30);

pub type TestNegotiator = Negotiator<RecordingPlayer, ManualScheduler>;

pub fn negotiator() -> TestNegotiator {
    Negotiator::new(
        RelayEndpoints::new(PRIMARY_BASE, FALLBACK_BASE),
        RECOVERY_DELAY,
        RecordingPlayer::default(),
        ManualScheduler::default(),
    )
}

/// Negotiator already loading FRONT_CAMERA in primary mode
pub fn loading_negotiator() -> TestNegotiator {
    let mut negotiator = negotiator();
    negotiator.set_locator(FRONT_CAMERA);
    negotiator.set_playing_intent(true);
    negotiator
}

pub fn active_binding(negotiator: &TestNegotiator) -> BindingId {
    negotiator
        .snapshot()
        .binding
        .expect("negotiator should have an active binding")
}
