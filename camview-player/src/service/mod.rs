//! Negotiator task
//!
//! A single tokio task owns the negotiator and applies commands one at a time,
//! so the state machine never sees concurrent access. Handlers, the recovery
//! timer and the browser player all reach it through the command channel.
//! After each command the task publishes notifications and, when the snapshot
//! changed, a `PlaybackStateChanged` event.

mod relay_player;
mod scheduler;

pub use relay_player::RelayPlayer;
pub use scheduler::TokioScheduler;

use crate::error::{Error, Result};
use crate::negotiator::{Negotiator, RecoveryTicket, RelayEndpoints};
use camview_common::config::PlayerConfig;
use camview_common::events::{
    BindingId, CamviewEvent, EventBus, Notification, PlaybackSnapshot, PlayerSignal,
};
use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;
use tracing::{debug, info};

const COMMAND_CHANNEL_CAPACITY: usize = 64;

/// Commands accepted by the negotiator task
#[derive(Debug)]
pub enum Command {
    SetPlayingIntent {
        playing: bool,
        reply: oneshot::Sender<PlaybackSnapshot>,
    },
    SetLocator {
        locator: String,
        reply: oneshot::Sender<PlaybackSnapshot>,
    },
    ManualRetry {
        reply: oneshot::Sender<PlaybackSnapshot>,
    },
    PlayerSignal {
        binding: BindingId,
        signal: PlayerSignal,
        reply: oneshot::Sender<PlaybackSnapshot>,
    },
    /// Posted by the recovery timer
    RecoveryDue(RecoveryTicket),
    Snapshot {
        reply: oneshot::Sender<PlaybackSnapshot>,
    },
}

type ServiceNegotiator = Negotiator<RelayPlayer, TokioScheduler>;

/// Cloneable handle to the negotiator task
#[derive(Clone)]
pub struct NegotiatorHandle {
    tx: mpsc::Sender<Command>,
}

impl NegotiatorHandle {
    /// Spawn the negotiator task
    ///
    /// The task stops once every handle has been dropped.
    pub fn spawn(config: &PlayerConfig, event_bus: EventBus) -> (Self, JoinHandle<()>) {
        let (tx, rx) = mpsc::channel(COMMAND_CHANNEL_CAPACITY);

        let negotiator = Negotiator::new(
            RelayEndpoints::new(config.primary_base.clone(), config.fallback_base.clone()),
            config.recovery_delay,
            RelayPlayer::new(event_bus.clone()),
            TokioScheduler::new(tx.downgrade()),
        );

        let task = tokio::spawn(run(negotiator, rx, event_bus));
        (Self { tx }, task)
    }

    pub async fn set_playing_intent(&self, playing: bool) -> Result<PlaybackSnapshot> {
        self.request(|reply| Command::SetPlayingIntent { playing, reply })
            .await
    }

    pub async fn set_locator(&self, locator: impl Into<String>) -> Result<PlaybackSnapshot> {
        let locator = locator.into();
        self.request(|reply| Command::SetLocator { locator, reply })
            .await
    }

    pub async fn request_manual_retry(&self) -> Result<PlaybackSnapshot> {
        self.request(|reply| Command::ManualRetry { reply }).await
    }

    pub async fn player_signal(
        &self,
        binding: BindingId,
        signal: PlayerSignal,
    ) -> Result<PlaybackSnapshot> {
        self.request(|reply| Command::PlayerSignal {
            binding,
            signal,
            reply,
        })
        .await
    }

    pub async fn snapshot(&self) -> Result<PlaybackSnapshot> {
        self.request(|reply| Command::Snapshot { reply }).await
    }

    async fn request(
        &self,
        command: impl FnOnce(oneshot::Sender<PlaybackSnapshot>) -> Command,
    ) -> Result<PlaybackSnapshot> {
        let (reply, response) = oneshot::channel();
        self.tx
            .send(command(reply))
            .await
            .map_err(|_| Error::NegotiatorUnavailable)?;
        response.await.map_err(|_| Error::NegotiatorUnavailable)
    }
}

async fn run(mut negotiator: ServiceNegotiator, mut rx: mpsc::Receiver<Command>, event_bus: EventBus) {
    info!("Negotiator task started");

    while let Some(command) = rx.recv().await {
        let before = negotiator.snapshot();

        let (notifications, reply) = match command {
            Command::SetPlayingIntent { playing, reply } => {
                (negotiator.set_playing_intent(playing), Some(reply))
            }
            Command::SetLocator { locator, reply } => (negotiator.set_locator(locator), Some(reply)),
            Command::ManualRetry { reply } => (negotiator.request_manual_retry(), Some(reply)),
            Command::PlayerSignal {
                binding,
                signal,
                reply,
            } => (negotiator.on_player_signal(binding, signal), Some(reply)),
            Command::RecoveryDue(ticket) => (negotiator.on_recovery_due(ticket), None),
            Command::Snapshot { reply } => (Vec::new(), Some(reply)),
        };

        let after = negotiator.snapshot();
        publish(&event_bus, &before, &after, notifications);

        if let Some(reply) = reply {
            // Requester may have gone away; nothing to do.
            let _ = reply.send(after);
        }
    }

    debug!("Negotiator task stopped");
}

fn publish(
    event_bus: &EventBus,
    before: &PlaybackSnapshot,
    after: &PlaybackSnapshot,
    notifications: Vec<Notification>,
) {
    if before != after {
        event_bus.emit_lossy(CamviewEvent::PlaybackStateChanged {
            old_state: before.state,
            snapshot: after.clone(),
            timestamp: chrono::Utc::now(),
        });
    }

    for notification in notifications {
        info!("Notification [{:?}] {}: {}", notification.kind, notification.title, notification.message);
        event_bus.emit_lossy(CamviewEvent::Notification {
            notification,
            timestamp: chrono::Utc::now(),
        });
    }
}
