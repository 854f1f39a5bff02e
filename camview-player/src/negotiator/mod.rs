//! Playback negotiator
//!
//! Owns one locator-to-player binding and drives it through
//! `Idle → Loading → Playing`, falling back from the primary (low-latency)
//! relay output to the fallback (HLS) output on error, and into `Failed`
//! with a single scheduled recovery once both have failed.
//!
//! The negotiator is synchronous and single-owner. Every inbound call returns
//! the notifications produced by the transition it caused; the player
//! primitive and the recovery scheduler are injected seams.

mod player;
mod recovery;
mod url_deriver;

pub use player::PlayerPrimitive;
pub use recovery::{RecoveryHandle, RecoveryScheduler, RecoveryTicket};
pub use url_deriver::{stream_path, RelayEndpoints};

use camview_common::events::{
    BindOptions, BindingId, DeliveryMode, Notification, PlaybackSnapshot, PlaybackState,
    PlayerSignal,
};
use std::time::Duration;
use tracing::{debug, info, warn};

pub struct Negotiator<P, S> {
    relay: RelayEndpoints,
    recovery_delay: Duration,
    player: P,
    scheduler: S,

    playing_intent: bool,
    locator: String,

    state: PlaybackState,
    derived_url: String,
    binding: Option<BindingId>,
    /// Present only while `Failed`
    recovery: Option<RecoveryHandle>,

    next_binding: u64,
    next_ticket: u64,
}

impl<P: PlayerPrimitive, S: RecoveryScheduler> Negotiator<P, S> {
    pub fn new(relay: RelayEndpoints, recovery_delay: Duration, player: P, scheduler: S) -> Self {
        Self {
            relay,
            recovery_delay,
            player,
            scheduler,
            playing_intent: false,
            locator: String::new(),
            state: PlaybackState::Idle,
            derived_url: String::new(),
            binding: None,
            recovery: None,
            next_binding: 1,
            next_ticket: 1,
        }
    }

    pub fn state(&self) -> PlaybackState {
        self.state
    }

    pub fn snapshot(&self) -> PlaybackSnapshot {
        PlaybackSnapshot {
            state: self.state,
            derived_url: self.derived_url.clone(),
            binding: self.binding,
            locator: self.locator.clone(),
            playing_intent: self.playing_intent,
        }
    }

    pub fn playing_intent(&self) -> bool {
        self.playing_intent
    }

    pub fn locator(&self) -> &str {
        &self.locator
    }

    pub fn relay(&self) -> &RelayEndpoints {
        &self.relay
    }

    pub fn has_pending_recovery(&self) -> bool {
        self.recovery.is_some()
    }

    pub fn player(&self) -> &P {
        &self.player
    }

    pub fn scheduler(&self) -> &S {
        &self.scheduler
    }

    // ------------------------------------------------------------------
    // Inbound from the collaborator
    // ------------------------------------------------------------------

    /// Turn playback on or off
    ///
    /// Off tears the session down from any state: pending recovery is
    /// cancelled, the player detached, the derived URL cleared.
    pub fn set_playing_intent(&mut self, playing: bool) -> Vec<Notification> {
        if playing == self.playing_intent {
            debug!("Playing intent already {}", playing);
            return Vec::new();
        }
        self.playing_intent = playing;

        if playing {
            self.start_session()
        } else {
            self.teardown();
            Vec::new()
        }
    }

    /// Replace the locator
    ///
    /// While playing, a changed locator restarts the session from scratch.
    pub fn set_locator(&mut self, locator: impl Into<String>) -> Vec<Notification> {
        let locator = locator.into();
        if locator == self.locator {
            return Vec::new();
        }
        self.locator = locator;

        if !self.playing_intent {
            return Vec::new();
        }
        self.teardown();
        self.start_session()
    }

    /// Retry immediately after both delivery modes failed
    pub fn request_manual_retry(&mut self) -> Vec<Notification> {
        if !self.state.is_failed() {
            debug!("Manual retry ignored in state {}", self.state);
            return Vec::new();
        }
        self.recover("manual retry")
    }

    // ------------------------------------------------------------------
    // Inbound from the timer and the player primitive
    // ------------------------------------------------------------------

    /// The recovery timer armed under `ticket` elapsed
    pub fn on_recovery_due(&mut self, ticket: RecoveryTicket) -> Vec<Notification> {
        match self.recovery.take() {
            Some(handle) if handle.ticket() == ticket => handle.fired(),
            other => {
                self.recovery = other;
                debug!("Ignoring stale {}", ticket);
                return Vec::new();
            }
        }

        if !self.playing_intent || !self.state.is_failed() {
            return Vec::new();
        }
        self.recover("recovery timer")
    }

    /// A signal from the player primitive
    ///
    /// Signals from any binding but the active one are swallowed.
    pub fn on_player_signal(&mut self, binding: BindingId, signal: PlayerSignal) -> Vec<Notification> {
        if self.binding != Some(binding) {
            debug!("Ignoring {} from stale binding {}", signal, binding);
            return Vec::new();
        }

        match signal {
            PlayerSignal::Ready | PlayerSignal::BufferEnd => {
                if let PlaybackState::Loading { mode, retry_count } = self.state {
                    self.transition(PlaybackState::Playing { mode, retry_count });
                }
                Vec::new()
            }
            PlayerSignal::Error => self.on_player_error(),
        }
    }

    // ------------------------------------------------------------------
    // Transitions
    // ------------------------------------------------------------------

    fn on_player_error(&mut self) -> Vec<Notification> {
        match self.state {
            PlaybackState::Idle => Vec::new(),
            PlaybackState::Loading { mode: DeliveryMode::Primary, retry_count }
            | PlaybackState::Playing { mode: DeliveryMode::Primary, retry_count } => {
                self.fall_back(retry_count)
            }
            PlaybackState::Loading { mode: DeliveryMode::Fallback, retry_count }
            | PlaybackState::Playing { mode: DeliveryMode::Fallback, retry_count } => {
                self.exhaust(DeliveryMode::Fallback, retry_count)
            }
            PlaybackState::Failed { .. } => {
                debug!("Error while already failed, recovery already scheduled");
                self.arm_recovery();
                Vec::new()
            }
        }
    }

    fn start_session(&mut self) -> Vec<Notification> {
        if self.locator.trim().is_empty() {
            debug!("No locator, staying idle");
            return Vec::new();
        }

        let url = self.relay.derive(&self.locator, DeliveryMode::Primary);
        if url.is_empty() {
            warn!("Cannot derive relay URL from locator '{}'", self.locator);
            return vec![Notification::invalid_locator(&self.locator)];
        }

        self.bind(url, DeliveryMode::Primary);
        self.transition(PlaybackState::Loading {
            mode: DeliveryMode::Primary,
            retry_count: 0,
        });
        Vec::new()
    }

    fn fall_back(&mut self, retry_count: u32) -> Vec<Notification> {
        let url = self.relay.derive(&self.locator, DeliveryMode::Fallback);
        if url.is_empty() {
            return self.exhaust(DeliveryMode::Primary, retry_count);
        }

        warn!("Primary delivery failed for '{}', switching to fallback", self.locator);
        self.bind(url, DeliveryMode::Fallback);
        self.transition(PlaybackState::Loading {
            mode: DeliveryMode::Fallback,
            retry_count,
        });
        vec![Notification::switched_to_fallback()]
    }

    fn exhaust(&mut self, mode: DeliveryMode, retry_count: u32) -> Vec<Notification> {
        warn!("All delivery modes failed for '{}'", self.locator);
        self.transition(PlaybackState::Failed { mode, retry_count });
        self.arm_recovery();
        vec![Notification::connection_failed()]
    }

    fn recover(&mut self, trigger: &str) -> Vec<Notification> {
        // Cancels the pending timer when triggered manually.
        self.recovery = None;

        let retry_count = self.state.retry_count() + 1;
        let url = self.relay.derive(&self.locator, DeliveryMode::Primary);
        if url.is_empty() {
            self.teardown();
            return vec![Notification::invalid_locator(&self.locator)];
        }

        info!("Reconnecting '{}' (attempt {}, {})", self.locator, retry_count, trigger);
        self.bind(url, DeliveryMode::Primary);
        self.transition(PlaybackState::Loading {
            mode: DeliveryMode::Primary,
            retry_count,
        });
        vec![Notification::reconnecting(retry_count)]
    }

    fn teardown(&mut self) {
        self.recovery = None;
        if let Some(binding) = self.binding.take() {
            self.player.detach(binding);
        }
        self.derived_url.clear();
        self.transition(PlaybackState::Idle);
    }

    /// Detach the current binding, then attach `url` under a fresh id.
    fn bind(&mut self, url: String, mode: DeliveryMode) {
        if let Some(previous) = self.binding.take() {
            self.player.detach(previous);
        }

        let binding = BindingId(self.next_binding);
        self.next_binding += 1;

        debug!("Binding player {} to {} ({})", binding, url, mode);
        self.player.bind(binding, &url, BindOptions::for_mode(mode));
        self.binding = Some(binding);
        self.derived_url = url;
    }

    /// Arming is idempotent: an outstanding timer is kept as is.
    fn arm_recovery(&mut self) {
        if self.recovery.is_some() {
            return;
        }

        let ticket = RecoveryTicket(self.next_ticket);
        self.next_ticket += 1;

        info!("Scheduling {} in {:?}", ticket, self.recovery_delay);
        self.recovery = Some(self.scheduler.arm(ticket, self.recovery_delay));
    }

    fn transition(&mut self, next: PlaybackState) {
        if self.state != next {
            info!("Playback state: {} -> {}", self.state, next);
        }
        self.state = next;
    }
}
