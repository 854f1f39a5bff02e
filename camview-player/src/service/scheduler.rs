//! Tokio-backed recovery scheduler

use super::Command;
use crate::negotiator::{RecoveryHandle, RecoveryScheduler, RecoveryTicket};
use std::time::Duration;
use tokio::sync::mpsc;
use tracing::debug;

/// Arms recovery timers as sleeping tasks that post back into the command channel
///
/// Holds a weak sender so pending timers never keep the negotiator task alive.
pub struct TokioScheduler {
    tx: mpsc::WeakSender<Command>,
}

impl TokioScheduler {
    pub fn new(tx: mpsc::WeakSender<Command>) -> Self {
        Self { tx }
    }
}

impl RecoveryScheduler for TokioScheduler {
    fn arm(&mut self, ticket: RecoveryTicket, delay: Duration) -> RecoveryHandle {
        let tx = self.tx.clone();
        let task = tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            if let Some(tx) = tx.upgrade() {
                let _ = tx.send(Command::RecoveryDue(ticket)).await;
            }
        });

        RecoveryHandle::new(ticket, move || {
            debug!("Cancelling {}", ticket);
            task.abort();
        })
    }
}
