//! In-memory player primitive and recovery scheduler

use camview_common::events::{BindOptions, BindingId};
use camview_player::negotiator::{
    PlayerPrimitive, RecoveryHandle, RecoveryScheduler, RecoveryTicket,
};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PlayerCall {
    Bind {
        binding: BindingId,
        url: String,
        options: BindOptions,
    },
    Detach(BindingId),
}

/// Records calls and panics if a bind arrives while another binding is attached
#[derive(Debug, Default)]
pub struct RecordingPlayer {
    pub calls: Vec<PlayerCall>,
    attached: Option<BindingId>,
}

impl RecordingPlayer {
    pub fn attached(&self) -> Option<BindingId> {
        self.attached
    }

    pub fn bind_count(&self) -> usize {
        self.calls
            .iter()
            .filter(|c| matches!(c, PlayerCall::Bind { .. }))
            .count()
    }

    pub fn last_bind(&self) -> Option<&PlayerCall> {
        self.calls
            .iter()
            .rev()
            .find(|c| matches!(c, PlayerCall::Bind { .. }))
    }
}

impl PlayerPrimitive for RecordingPlayer {
    fn bind(&mut self, binding: BindingId, url: &str, options: BindOptions) {
        assert!(
            self.attached.is_none(),
            "bind {} while {:?} still attached",
            binding,
            self.attached
        );
        self.attached = Some(binding);
        self.calls.push(PlayerCall::Bind {
            binding,
            url: url.to_string(),
            options,
        });
    }

    fn detach(&mut self, binding: BindingId) {
        assert_eq!(self.attached, Some(binding), "detach of unattached binding");
        self.attached = None;
        self.calls.push(PlayerCall::Detach(binding));
    }
}

#[derive(Debug)]
pub struct ArmedTimer {
    pub ticket: RecoveryTicket,
    pub delay: Duration,
    cancelled: Arc<AtomicBool>,
}

impl ArmedTimer {
    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst)
    }
}

/// Records every arming; tests deliver the ticket themselves
#[derive(Debug, Default)]
pub struct ManualScheduler {
    pub armed: Vec<ArmedTimer>,
}

impl ManualScheduler {
    pub fn last_ticket(&self) -> RecoveryTicket {
        self.armed.last().expect("no timer armed").ticket
    }

    /// Timers that were never cancelled (fired ones included)
    pub fn uncancelled_count(&self) -> usize {
        self.armed.iter().filter(|t| !t.is_cancelled()).count()
    }
}

impl RecoveryScheduler for ManualScheduler {
    fn arm(&mut self, ticket: RecoveryTicket, delay: Duration) -> RecoveryHandle {
        let cancelled = Arc::new(AtomicBool::new(false));
        let flag = cancelled.clone();
        self.armed.push(ArmedTimer {
            ticket,
            delay,
            cancelled,
        });
        RecoveryHandle::new(ticket, move || flag.store(true, Ordering::SeqCst))
    }
}
