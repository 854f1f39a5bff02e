//! Recovery timer seam
//!
//! After both delivery modes fail the negotiator arms one recovery timer.
//! The timer is an owned handle: dropping it cancels the pending callback, so
//! every path out of `Failed` releases it simply by letting go of the handle.

use std::time::Duration;

/// Identifies one arming of the recovery timer
///
/// A due notification carrying a ticket other than the armed one is stale.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct RecoveryTicket(pub u64);

impl std::fmt::Display for RecoveryTicket {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "recovery#{}", self.0)
    }
}

/// Owned, cancelable handle to an armed recovery timer
///
/// Cancels on drop unless the timer already fired.
pub struct RecoveryHandle {
    ticket: RecoveryTicket,
    cancel: Option<Box<dyn FnOnce() + Send>>,
}

impl RecoveryHandle {
    pub fn new(ticket: RecoveryTicket, cancel: impl FnOnce() + Send + 'static) -> Self {
        Self {
            ticket,
            cancel: Some(Box::new(cancel)),
        }
    }

    pub fn ticket(&self) -> RecoveryTicket {
        self.ticket
    }

    /// Consume a handle whose timer has fired; nothing is left to cancel.
    pub fn fired(mut self) {
        self.cancel = None;
    }
}

impl Drop for RecoveryHandle {
    fn drop(&mut self) {
        if let Some(cancel) = self.cancel.take() {
            cancel();
        }
    }
}

impl std::fmt::Debug for RecoveryHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RecoveryHandle")
            .field("ticket", &self.ticket)
            .finish()
    }
}

/// Schedules recovery callbacks
///
/// When `delay` elapses the implementation must deliver `ticket` back to the
/// negotiator (`Negotiator::on_recovery_due`). Dropping the returned handle
/// before then must prevent delivery.
pub trait RecoveryScheduler {
    fn arm(&mut self, ticket: RecoveryTicket, delay: Duration) -> RecoveryHandle;
}
